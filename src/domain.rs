//! Records exchanged with the GitLab REST API
//!
//! These are pass-through shapes: the client never checks their contents,
//! and every field tolerates being absent from the payload.

use chrono::{DateTime, NaiveDate, Utc};
use compact_str::CompactString;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Whether an ID refers to a group or a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipScope {
    Groups,
    Projects,
}

/// Kind of noteable a note is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteScope {
    Issues,
    MergeRequests,
}

impl MembershipScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipScope::Groups => "groups",
            MembershipScope::Projects => "projects",
        }
    }
}

impl NoteScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteScope::Issues => "issues",
            NoteScope::MergeRequests => "merge_requests",
        }
    }
}

impl std::fmt::Display for MembershipScope {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Display for NoteScope {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeRequestState {
    Closed,
    Locked,
    Merged,
    #[default]
    Opened,
    #[serde(other)]
    Unknown,
}

impl MergeRequestState {
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeRequestState::Closed => "closed",
            MergeRequestState::Locked => "locked",
            MergeRequestState::Merged => "merged",
            MergeRequestState::Opened => "opened",
            MergeRequestState::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueState {
    Closed,
    #[default]
    Opened,
    Reopened,
    #[serde(other)]
    Unknown,
}

impl IssueState {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueState::Closed => "closed",
            IssueState::Opened => "opened",
            IssueState::Reopened => "reopened",
            IssueState::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneState {
    #[default]
    Active,
    Closed,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserState {
    #[default]
    Active,
    Blocked,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStatus {
    CanBeMerged,
    CannotBeMerged,
    Checking,
    #[default]
    Unchecked,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoteType {
    DiffNote,
    DiscussionNote,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoteableType {
    Issue,
    MergeRequest,
    Commit,
    Snippet,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Member access level, sent and received as its integer value.
///
/// Levels outside the usual five (no access, minimal access, planner, admin)
/// are kept as [`AccessLevel::Other`] with their raw value.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessLevel {
    #[default]
    Guest,
    Reporter,
    Developer,
    Maintainer,
    Owner,
    Other(u64),
}

impl AccessLevel {
    pub fn value(&self) -> u64 {
        match self {
            AccessLevel::Guest => 10,
            AccessLevel::Reporter => 20,
            AccessLevel::Developer => 30,
            AccessLevel::Maintainer => 40,
            AccessLevel::Owner => 50,
            AccessLevel::Other(value) => *value,
        }
    }

    pub fn from_value(value: u64) -> Self {
        match value {
            10 => AccessLevel::Guest,
            20 => AccessLevel::Reporter,
            30 => AccessLevel::Developer,
            40 => AccessLevel::Maintainer,
            50 => AccessLevel::Owner,
            other => AccessLevel::Other(other),
        }
    }
}

impl std::fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl Serialize for AccessLevel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(self.value())
    }
}

impl<'de> Deserialize<'de> for AccessLevel {
    fn deserialize<D>(deserializer: D) -> Result<AccessLevel, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(AccessLevel::from_value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Label {
    pub color: CompactString,
    pub description: Option<CompactString>,
    pub name: CompactString,
}

/// New values for an existing label; unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelUpdate {
    pub name: Option<CompactString>,
    pub description: Option<CompactString>,
    pub color: Option<CompactString>,
}

impl LabelUpdate {
    pub fn with_name(mut self, name: impl Into<CompactString>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<CompactString>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<CompactString>) -> Self {
        self.color = Some(color.into());
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Commit {
    pub id: CompactString,
    pub message: CompactString,
    pub parent_ids: Vec<CompactString>,
    pub author_name: CompactString,
    pub author_email: CompactString,
    pub authored_date: Option<DateTime<Utc>>,
    pub committer_name: CompactString,
    pub committer_email: CompactString,
    pub committed_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tag {
    pub commit: Commit,
    pub message: Option<CompactString>,
    pub name: CompactString,
    pub release: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Namespace {
    pub id: u64,
    pub name: CompactString,
    pub path: CompactString,
    pub kind: CompactString,
    pub full_path: CompactString,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub id: u64,
    pub name: CompactString,
    pub name_with_namespace: CompactString,
    pub path: CompactString,
    pub path_with_namespace: CompactString,
    pub description: Option<CompactString>,
    pub namespace: Namespace,
    pub default_branch: Option<CompactString>,
    pub visibility: CompactString,
    pub archived: bool,
    pub avatar_url: Option<CompactString>,
    pub web_url: CompactString,
    pub http_url_to_repo: CompactString,
    pub ssh_url_to_repo: CompactString,
    pub created_at: Option<DateTime<Utc>>,
    pub last_activity_at: Option<DateTime<Utc>>,
    pub creator_id: Option<u64>,
    pub forks_count: u64,
    pub star_count: u64,
    pub open_issues_count: Option<u64>,
    pub tag_list: Vec<CompactString>,
    pub container_registry_enabled: Option<bool>,
    pub issues_enabled: Option<bool>,
    pub jobs_enabled: Option<bool>,
    pub lfs_enabled: Option<bool>,
    pub merge_requests_enabled: Option<bool>,
    pub snippets_enabled: Option<bool>,
    pub wiki_enabled: Option<bool>,
    pub public_jobs: Option<bool>,
    pub request_access_enabled: Option<bool>,
    pub shared_runners_enabled: Option<bool>,
    pub only_allow_merge_if_all_discussions_are_resolved: Option<bool>,
    pub only_allow_merge_if_pipeline_succeeds: Option<bool>,
    pub shared_with_groups: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeFile {
    pub id: CompactString,
    pub mode: CompactString,
    pub name: CompactString,
    pub path: CompactString,
    #[serde(rename = "type")]
    pub kind: CompactString,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: u64,
    pub name: CompactString,
    pub username: CompactString,
    pub state: UserState,
    pub avatar_url: Option<CompactString>,
    pub web_url: CompactString,
}

/// A user together with their access level in a group or project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Member {
    #[serde(flatten)]
    pub user: User,
    pub access_level: AccessLevel,
    pub expires_at: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Milestone {
    pub id: u64,
    pub iid: u64,
    pub project_id: Option<u64>,
    pub title: CompactString,
    pub description: Option<CompactString>,
    pub state: MilestoneState,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Branch {
    pub name: CompactString,
    pub commit: Commit,
    pub merged: bool,
    pub protected: bool,
    pub developers_can_push: bool,
    pub developers_can_merge: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeStats {
    pub time_estimate: u64,
    pub total_time_spent: u64,
    pub human_time_estimate: Option<CompactString>,
    pub human_total_time_spent: Option<CompactString>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Issue {
    pub id: u64,
    pub iid: u64,
    pub project_id: u64,
    pub title: CompactString,
    pub description: Option<CompactString>,
    pub state: IssueState,
    pub author: User,
    pub assignee: Option<User>,
    pub assignees: Vec<User>,
    pub labels: Vec<CompactString>,
    pub milestone: Option<Milestone>,
    pub confidential: bool,
    pub discussion_locked: Option<bool>,
    pub upvotes: u64,
    pub downvotes: u64,
    pub user_notes_count: u64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub due_date: Option<NaiveDate>,
    pub web_url: CompactString,
    pub time_stats: TimeStats,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeRequest {
    pub id: u64,
    pub iid: u64,
    pub project_id: u64,
    pub title: CompactString,
    pub description: Option<CompactString>,
    pub state: MergeRequestState,
    pub author: User,
    pub assignee: Option<User>,
    /// Label names; newer GitLab versions can also return label objects
    /// when asked to, which land in `serde_json::Value`.
    pub labels: Vec<serde_json::Value>,
    pub milestone: Option<Milestone>,
    pub source_branch: CompactString,
    pub target_branch: CompactString,
    pub source_project_id: u64,
    pub target_project_id: u64,
    pub sha: Option<CompactString>,
    pub merge_commit_sha: Option<CompactString>,
    pub merge_status: MergeStatus,
    pub merge_when_pipeline_succeeds: bool,
    pub should_remove_source_branch: Option<bool>,
    pub force_remove_source_branch: Option<bool>,
    pub work_in_progress: bool,
    pub discussion_locked: Option<bool>,
    pub upvotes: u64,
    pub downvotes: u64,
    pub user_notes_count: u64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub web_url: CompactString,
    pub time_stats: TimeStats,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApprovedBy {
    pub user: User,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeRequestApproval {
    pub id: u64,
    pub iid: u64,
    pub project_id: u64,
    pub title: CompactString,
    pub description: Option<CompactString>,
    pub state: MergeRequestState,
    pub merge_status: MergeStatus,
    pub approvals_required: u32,
    pub approvals_left: u32,
    pub approved_by: Vec<ApprovedBy>,
    pub approvers: Vec<User>,
    pub approver_groups: Vec<Group>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Group {
    pub id: u64,
    pub name: CompactString,
    pub path: CompactString,
    pub full_name: CompactString,
    pub full_path: CompactString,
    pub description: Option<CompactString>,
    pub parent_id: Option<u64>,
    pub visibility: CompactString,
    pub lfs_enabled: Option<bool>,
    pub request_access_enabled: Option<bool>,
    pub ldap_access: Option<CompactString>,
    pub ldap_cn: Option<CompactString>,
    pub avatar_url: Option<CompactString>,
    pub web_url: CompactString,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotePosition {
    pub base_sha: CompactString,
    pub start_sha: CompactString,
    pub head_sha: CompactString,
    pub old_path: CompactString,
    pub new_path: CompactString,
    pub old_line: Option<u64>,
    pub new_line: Option<u64>,
    pub position_type: CompactString,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Note {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: Option<NoteType>,
    pub body: CompactString,
    pub author: User,
    pub attachment: Option<serde_json::Value>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub system: bool,
    pub noteable_id: Option<u64>,
    pub noteable_iid: Option<u64>,
    pub noteable_type: NoteableType,
    pub position: Option<NotePosition>,
    pub resolvable: bool,
    pub resolved: Option<bool>,
    pub resolved_by: Option<User>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Discussion {
    pub id: CompactString,
    pub individual_note: bool,
    pub notes: Vec<Note>,
}
