//! Endpoint façade for the GitLab REST API

use compact_str::{CompactString, format_compact};
use itertools::Itertools;
use reqwest::header::HeaderValue;
use tracing::debug;
use url::Url;

use super::{
    config::{ClientConfig, IssueQuery, RequestConfig},
    encode::{encode_component, encode_file_path, encode_path_segment},
    error::{ClientError, Result},
    request::{Method, RequestOptions, ResponseFormat},
    transport::{FormBody, ReqwestTransport, Transport},
    validate::{normalize_label_color, normalize_label_color_update},
};
use crate::{
    domain::{
        AccessLevel, Branch, Discussion, Group, Issue, Label, LabelUpdate, Member,
        MembershipScope, MergeRequest, MergeRequestApproval, MergeRequestState, Milestone, Note,
        NoteScope, Project, Tag, TreeFile, User,
    },
    id::ResourceId,
};

/// Path appended to a root URL that does not point at the API yet.
const API_PREFIX: &str = "api/v4/";

/// Typed client for the GitLab REST API
///
/// Every operation maps to one path and verb and goes through
/// [`GitlabApi::execute`]. The root URL and token are fixed at construction,
/// so a single instance can serve concurrent calls.
#[derive(Debug)]
pub struct GitlabApi<T = ReqwestTransport> {
    pub(crate) root_url: CompactString,
    pub(crate) private_token: HeaderValue,
    pub(crate) request: RequestConfig,
    pub(crate) transport: T,
}

/// Resolve the API root: always ends in `/`, and gets `api/v4/` appended
/// unless it already names an `/api/` path.
pub fn resolve_root_url(root_url: &str) -> Result<CompactString> {
    let mut root = Url::parse(root_url)?.to_string();
    if !root.ends_with('/') {
        root.push('/');
    }
    if !root.contains("/api/") {
        root.push_str(API_PREFIX);
    }
    Ok(root.into())
}

impl GitlabApi<ReqwestTransport> {
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = ReqwestTransport::new(&config.request)?;
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> GitlabApi<T> {
    /// Create a client on top of a custom transport
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self> {
        config.validate()?;

        let root_url = resolve_root_url(&config.root_url)?;
        let mut private_token = HeaderValue::from_str(&config.private_token).map_err(|_| {
            ClientError::config_validation("gitlab_token", "Private token is not a valid header")
        })?;
        private_token.set_sensitive(true);

        debug!(root_url = %root_url, "GitLab client configured");

        Ok(Self {
            root_url,
            private_token,
            request: config.request,
            transport,
        })
    }

    /// API root every path is resolved against
    pub fn root_url(&self) -> &str {
        &self.root_url
    }

    /// List all projects visible to the token
    pub async fn get_projects(&self) -> Result<Vec<Project>> {
        self.request("projects", RequestOptions::default()).await
    }

    /// Get a single project by ID or full path
    pub async fn get_project(&self, project: impl Into<ResourceId>) -> Result<Project> {
        let path = format_compact!("projects/{}", project.into().to_path_segment());
        self.request(&path, RequestOptions::default()).await
    }

    /// List projects owned by a user
    pub async fn get_projects_for_user(&self, user: impl Into<ResourceId>) -> Result<Vec<Project>> {
        let path = format_compact!("users/{}/projects", user.into().to_path_segment());
        self.request(&path, RequestOptions::default()).await
    }

    /// List projects of a group
    pub async fn get_projects_for_group(
        &self,
        group: impl Into<ResourceId>,
    ) -> Result<Vec<Project>> {
        let path = format_compact!("groups/{}/projects", group.into().to_path_segment());
        self.request(&path, RequestOptions::default()).await
    }

    /// List users with access to a project
    pub async fn get_project_users(&self, project: impl Into<ResourceId>) -> Result<Vec<User>> {
        let path = format_compact!("projects/{}/users", project.into().to_path_segment());
        self.request(&path, RequestOptions::default()).await
    }

    /// List direct subgroups of a group
    pub async fn get_sub_groups_for_group(&self, group: impl Into<ResourceId>) -> Result<Vec<Group>> {
        let path = format_compact!("groups/{}/subgroups", group.into().to_path_segment());
        self.request(&path, RequestOptions::default()).await
    }

    /// Add a user to a group or project
    pub async fn add_member(
        &self,
        scope: MembershipScope,
        id: impl Into<ResourceId>,
        user_id: u64,
        access_level: AccessLevel,
    ) -> Result<Member> {
        let path = format_compact!("{}/{}/members", scope, id.into().to_path_segment());
        let body = FormBody::new()
            .field("access_level", access_level)
            .field("user_id", user_id);
        self.request(&path, RequestOptions::new(Method::Post).with_body(body))
            .await
    }

    /// Change the access level of a member
    pub async fn edit_member(
        &self,
        scope: MembershipScope,
        id: impl Into<ResourceId>,
        user_id: u64,
        access_level: AccessLevel,
    ) -> Result<Member> {
        let path = format_compact!(
            "{}/{}/members/{}",
            scope,
            id.into().to_path_segment(),
            user_id
        );
        let body = FormBody::new().field("access_level", access_level);
        self.request(&path, RequestOptions::new(Method::Put).with_body(body))
            .await
    }

    /// Remove a member from a group or project
    pub async fn delete_member(
        &self,
        scope: MembershipScope,
        id: impl Into<ResourceId>,
        user_id: u64,
    ) -> Result<()> {
        let path = format_compact!(
            "{}/{}/members/{}",
            scope,
            id.into().to_path_segment(),
            user_id
        );
        self.request_unit(&path, RequestOptions::new(Method::Delete))
            .await
    }

    /// List members of a group or project
    pub async fn get_members(
        &self,
        scope: MembershipScope,
        id: impl Into<ResourceId>,
    ) -> Result<Vec<Member>> {
        let path = format_compact!("{}/{}/members", scope, id.into().to_path_segment());
        self.request(&path, RequestOptions::default()).await
    }

    /// Create an issue; the description may contain quick actions
    pub async fn create_issue(
        &self,
        project: impl Into<ResourceId>,
        title: &str,
        description: &str,
    ) -> Result<Issue> {
        let path = format_compact!("projects/{}/issues", project.into().to_path_segment());
        let body = FormBody::new()
            .field("description", description)
            .field("title", title);
        self.request(&path, RequestOptions::new(Method::Post).with_body(body))
            .await
    }

    /// List issues, optionally restricted to a group, milestone or state
    pub async fn get_issues(&self, query: &IssueQuery) -> Result<Vec<Issue>> {
        let mut path = match &query.group_id {
            Some(group) => format_compact!("groups/{}/issues", group.to_path_segment()),
            None => CompactString::from("issues"),
        };
        let mut divider = '?';

        if let Some(milestone) = &query.milestone {
            path.push_str(&format_compact!(
                "{}milestone={}",
                divider,
                encode_component(milestone.as_str())
            ));
            divider = '&';
        }

        if let Some(state) = query.state {
            path.push_str(&format_compact!("{}state={}", divider, state.as_str()));
        }

        self.request(&path, RequestOptions::default()).await
    }

    /// Assign an issue to a user
    pub async fn set_assignee_for_issue(&self, issue: &Issue, user_id: u64) -> Result<Issue> {
        let path = format_compact!(
            "projects/{}/issues/{}?assignee_ids={}",
            issue.project_id,
            issue.iid,
            user_id
        );
        self.request(&path, RequestOptions::new(Method::Put)).await
    }

    /// Set or clear (`None`) the milestone of an issue
    pub async fn set_milestone_for_issue(
        &self,
        issue: &Issue,
        milestone_id: Option<u64>,
    ) -> Result<Issue> {
        let milestone = milestone_id
            .map(|id| id.to_string())
            .unwrap_or_default();
        let path = format_compact!(
            "projects/{}/issues/{}?milestone_id={}",
            issue.project_id,
            issue.iid,
            milestone
        );
        self.request(&path, RequestOptions::new(Method::Put)).await
    }

    /// List notes of an issue, oldest first
    pub async fn get_notes(&self, project: impl Into<ResourceId>, issue: &Issue) -> Result<Vec<Note>> {
        let path = format_compact!(
            "projects/{}/issues/{}/notes?sort=asc",
            project.into().to_path_segment(),
            issue.iid
        );
        self.request(&path, RequestOptions::default()).await
    }

    /// Comment on an issue or merge request
    ///
    /// Yields `None` when GitLab answers with an empty body.
    pub async fn create_note(
        &self,
        project: impl Into<ResourceId>,
        scope: NoteScope,
        iid: u64,
        body: &str,
    ) -> Result<Option<Note>> {
        let path = format_compact!(
            "projects/{}/{}/{}/notes",
            project.into().to_path_segment(),
            scope,
            iid
        );
        let form = FormBody::new().field("body", body);
        self.request(&path, RequestOptions::new(Method::Post).with_body(form))
            .await
    }

    /// List labels of a project
    pub async fn get_labels(&self, project: impl Into<ResourceId>) -> Result<Vec<Label>> {
        let path = format_compact!("projects/{}/labels", project.into().to_path_segment());
        self.request(&path, RequestOptions::default()).await
    }

    /// Create a label; an invalid or missing color becomes `#000000`
    pub async fn create_label(
        &self,
        project: impl Into<ResourceId>,
        name: &str,
        description: Option<&str>,
        color: Option<&str>,
    ) -> Result<Label> {
        let color = normalize_label_color(color);
        if color.adjusted {
            debug!(name, color = %color.value, "Label color replaced with default");
        }

        let path = format_compact!("projects/{}/labels", project.into().to_path_segment());
        let body = FormBody::new()
            .field("color", color.value)
            .optional_field("description", description)
            .field("name", name);
        self.request(&path, RequestOptions::new(Method::Post).with_body(body))
            .await
    }

    /// Update a label; an invalid color is left out of the update
    pub async fn edit_label(
        &self,
        project: impl Into<ResourceId>,
        name: &str,
        update: &LabelUpdate,
    ) -> Result<Label> {
        let color = normalize_label_color_update(update.color.as_deref());
        if color.adjusted {
            debug!(name, "Invalid label color dropped from update");
        }

        let path = format_compact!("projects/{}/labels", project.into().to_path_segment());
        let body = FormBody::new()
            .optional_field("color", color.value)
            .optional_field("description", update.description.as_ref())
            .field("name", name)
            .optional_field("new_name", update.name.as_ref());
        self.request(&path, RequestOptions::new(Method::Put).with_body(body))
            .await
    }

    /// Delete a label by name
    pub async fn delete_label(&self, project: impl Into<ResourceId>, name: &str) -> Result<()> {
        let path = format_compact!(
            "projects/{}/labels?name={}",
            project.into().to_path_segment(),
            encode_component(name)
        );
        self.request_unit(&path, RequestOptions::new(Method::Delete))
            .await
    }

    /// Create a milestone in a project
    ///
    /// Yields `None` when GitLab answers with an empty body.
    pub async fn create_milestone(
        &self,
        project: impl Into<ResourceId>,
        title: &str,
    ) -> Result<Option<Milestone>> {
        let path = format_compact!(
            "projects/{}/milestones?title={}",
            project.into().to_path_segment(),
            encode_component(title)
        );
        self.request(&path, RequestOptions::new(Method::Post)).await
    }

    /// List milestones of a project
    pub async fn get_milestones_for_project(
        &self,
        project: impl Into<ResourceId>,
    ) -> Result<Vec<Milestone>> {
        let path = format_compact!("projects/{}/milestones", project.into().to_path_segment());
        self.request(&path, RequestOptions::default()).await
    }

    /// List branches of a project
    pub async fn get_branches_for_project(
        &self,
        project: impl Into<ResourceId>,
    ) -> Result<Vec<Branch>> {
        let path = format_compact!(
            "projects/{}/repository/branches",
            project.into().to_path_segment()
        );
        self.request(&path, RequestOptions::default()).await
    }

    /// Protect a branch so that developers can neither push nor merge
    pub async fn protect_branch(
        &self,
        project: impl Into<ResourceId>,
        branch: &str,
    ) -> Result<Branch> {
        let path = format_compact!(
            "projects/{}/repository/branches/{}/protect?developers_can_push=false&developers_can_merge=false",
            project.into().to_path_segment(),
            encode_path_segment(branch)
        );
        self.request(&path, RequestOptions::new(Method::Put)).await
    }

    /// List tags of a project
    pub async fn get_tags(&self, project: impl Into<ResourceId>) -> Result<Vec<Tag>> {
        let path = format_compact!(
            "projects/{}/repository/tags",
            project.into().to_path_segment()
        );
        self.request(&path, RequestOptions::default()).await
    }

    /// Fetch the raw content of a file at a commit, branch or tag
    pub async fn get_file(
        &self,
        project: impl Into<ResourceId>,
        file_path: &str,
        commitish: &str,
    ) -> Result<String> {
        let path = format_compact!(
            "projects/{}/repository/files/{}/raw?ref={}",
            project.into().to_path_segment(),
            encode_file_path(file_path),
            encode_component(commitish)
        );
        self.request(
            &path,
            RequestOptions::default().with_format(ResponseFormat::Text),
        )
        .await
    }

    /// List the repository tree of a project
    pub async fn get_file_list(&self, project: impl Into<ResourceId>) -> Result<Vec<TreeFile>> {
        let path = format_compact!(
            "projects/{}/repository/tree",
            project.into().to_path_segment()
        );
        self.request(&path, RequestOptions::default()).await
    }

    /// List merge requests of a group or project in any of the given states
    pub async fn get_merge_requests(
        &self,
        scope: MembershipScope,
        id: impl Into<ResourceId>,
        states: &[MergeRequestState],
    ) -> Result<Vec<MergeRequest>> {
        let path = format_compact!(
            "{}/{}/merge_requests?state={}",
            scope,
            id.into().to_path_segment(),
            states.iter().map(MergeRequestState::as_str).join(",")
        );
        self.request(&path, RequestOptions::default()).await
    }

    /// Get the approval state of a merge request
    pub async fn get_merge_request_approval(
        &self,
        project: impl Into<ResourceId>,
        merge_request_iid: u64,
    ) -> Result<MergeRequestApproval> {
        let path = format_compact!(
            "projects/{}/merge_requests/{}/approvals",
            project.into().to_path_segment(),
            merge_request_iid
        );
        self.request(&path, RequestOptions::default()).await
    }

    /// List discussions of a merge request
    pub async fn get_merge_request_discussions(
        &self,
        project: impl Into<ResourceId>,
        merge_request_iid: u64,
    ) -> Result<Vec<Discussion>> {
        let path = format_compact!(
            "projects/{}/merge_requests/{}/discussions",
            project.into().to_path_segment(),
            merge_request_iid
        );
        self.request(&path, RequestOptions::default()).await
    }

    /// Assign a merge request to a user
    pub async fn set_assignee_for_merge_request(
        &self,
        merge_request: &MergeRequest,
        user_id: u64,
    ) -> Result<MergeRequest> {
        let path = format_compact!(
            "projects/{}/merge_requests/{}?assignee_ids={}",
            merge_request.project_id,
            merge_request.iid,
            user_id
        );
        self.request(&path, RequestOptions::new(Method::Put)).await
    }
}
