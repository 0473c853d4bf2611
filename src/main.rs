use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use compact_str::CompactString;
use gitlab_rest::{
    client::{GitlabApi, IssueQuery, MilestoneFilter},
    config::{AppConfig, default_config_path, load_config, save_config},
    domain::{IssueState, MembershipScope, MergeRequestState},
    id::ResourceId,
    logging::{LoggingConfig, init_logging},
    result::Result,
};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "gitlab-rest", version, about = "Query the GitLab REST API")]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// GitLab instance URL, overrides the configuration file
    #[arg(long, global = true)]
    url: Option<CompactString>,

    /// Private access token, overrides the configuration file
    #[arg(long, global = true)]
    token: Option<CompactString>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List projects visible to the token
    Projects,
    /// Show one project by ID or full path
    Project { id: ResourceId },
    /// List projects of a group
    GroupProjects { group: ResourceId },
    /// List issues
    Issues {
        #[arg(long)]
        group: Option<ResourceId>,
        #[arg(long, value_enum)]
        state: Option<IssueStateArg>,
        #[arg(long, value_enum)]
        milestone: Option<MilestoneArg>,
    },
    /// List labels of a project
    Labels { project: ResourceId },
    /// List members of a group or project
    Members {
        #[arg(value_enum)]
        scope: ScopeArg,
        id: ResourceId,
    },
    /// List merge requests of a group or project
    MergeRequests {
        #[arg(value_enum)]
        scope: ScopeArg,
        id: ResourceId,
        #[arg(long = "state", value_enum, default_value = "opened")]
        states: Vec<MergeRequestStateArg>,
    },
    /// List branches of a project
    Branches { project: ResourceId },
    /// List tags of a project
    Tags { project: ResourceId },
    /// Save the effective URL and token to the configuration file
    Config,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ScopeArg {
    Groups,
    Projects,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum IssueStateArg {
    Opened,
    Closed,
    Reopened,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MilestoneArg {
    Backlog,
    NoMilestone,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MergeRequestStateArg {
    Opened,
    Closed,
    Locked,
    Merged,
}

impl From<ScopeArg> for MembershipScope {
    fn from(scope: ScopeArg) -> Self {
        match scope {
            ScopeArg::Groups => MembershipScope::Groups,
            ScopeArg::Projects => MembershipScope::Projects,
        }
    }
}

impl From<IssueStateArg> for IssueState {
    fn from(state: IssueStateArg) -> Self {
        match state {
            IssueStateArg::Opened => IssueState::Opened,
            IssueStateArg::Closed => IssueState::Closed,
            IssueStateArg::Reopened => IssueState::Reopened,
        }
    }
}

impl From<MilestoneArg> for MilestoneFilter {
    fn from(milestone: MilestoneArg) -> Self {
        match milestone {
            MilestoneArg::Backlog => MilestoneFilter::Backlog,
            MilestoneArg::NoMilestone => MilestoneFilter::NoMilestone,
        }
    }
}

impl From<MergeRequestStateArg> for MergeRequestState {
    fn from(state: MergeRequestStateArg) -> Self {
        match state {
            MergeRequestStateArg::Opened => MergeRequestState::Opened,
            MergeRequestStateArg::Closed => MergeRequestState::Closed,
            MergeRequestStateArg::Locked => MergeRequestState::Locked,
            MergeRequestStateArg::Merged => MergeRequestState::Merged,
        }
    }
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let config = load_config(&config_path)?.with_overrides(cli.url.clone(), cli.token.clone());

    let _log_guard = init_logging(LoggingConfig::new(
        config.log_level.as_deref(),
        cli.verbose,
        config.log_directory.clone(),
    ))?;
    info!(version = env!("CARGO_PKG_VERSION"), "gitlab-rest starting up");

    run(cli.command, &config_path, config).await?;
    Ok(())
}

async fn run(command: Command, config_path: &Path, config: AppConfig) -> Result<()> {
    if let Command::Config = command {
        config.client_config()?;
        save_config(config_path, &config)?;
        info!(path = %config_path.display(), "Configuration saved");
        return Ok(());
    }

    let api = GitlabApi::new(config.client_config()?)?;

    match command {
        Command::Projects => print_json(&api.get_projects().await?),
        Command::Project { id } => print_json(&api.get_project(id).await?),
        Command::GroupProjects { group } => print_json(&api.get_projects_for_group(group).await?),
        Command::Issues { group, state, milestone } => {
            let mut query = IssueQuery::new();
            query.group_id = group;
            query.state = state.map(Into::into);
            query.milestone = milestone.map(Into::into);
            print_json(&api.get_issues(&query).await?)
        },
        Command::Labels { project } => print_json(&api.get_labels(project).await?),
        Command::Members { scope, id } => print_json(&api.get_members(scope.into(), id).await?),
        Command::MergeRequests { scope, id, states } => {
            let states: Vec<MergeRequestState> = states.into_iter().map(Into::into).collect();
            print_json(&api.get_merge_requests(scope.into(), id, &states).await?)
        },
        Command::Branches { project } => print_json(&api.get_branches_for_project(project).await?),
        Command::Tags { project } => print_json(&api.get_tags(project).await?),
        Command::Config => Ok(()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
