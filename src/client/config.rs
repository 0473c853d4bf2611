//! Configuration management for the GitLab client

use std::time::Duration;

use compact_str::CompactString;
use reqwest::header::HeaderValue;

use super::error::{ClientError, Result};
use crate::{domain::IssueState, id::ResourceId};

/// Main configuration for the GitLab client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// GitLab instance root URL, with or without the `/api/v4/` suffix
    pub root_url: CompactString,
    /// Private access token, sent as `PRIVATE-TOKEN`
    pub private_token: CompactString,
    /// Request configuration
    pub request: RequestConfig,
}

/// HTTP request configuration
#[derive(Debug, Clone)]
pub struct RequestConfig {
    /// Request timeout, applied to every page fetch
    pub timeout: Duration,
    /// Transport-level retries after the first attempt
    pub max_retries: u32,
    /// Base delay between transport retries, doubled on each attempt
    pub retry_delay: Duration,
    /// Follow HTTP redirects
    pub follow_redirects: bool,
}

/// Filters for listing issues
#[derive(Debug, Clone, Default)]
pub struct IssueQuery {
    /// Only list issues of this group
    pub group_id: Option<ResourceId>,
    /// Milestone filter
    pub milestone: Option<MilestoneFilter>,
    /// Issue state filter
    pub state: Option<IssueState>,
}

/// Milestone filter for issue listings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MilestoneFilter {
    Backlog,
    NoMilestone,
    Title(CompactString),
}

impl MilestoneFilter {
    pub fn as_str(&self) -> &str {
        match self {
            MilestoneFilter::Backlog => "Backlog",
            MilestoneFilter::NoMilestone => "No Milestone",
            MilestoneFilter::Title(title) => title,
        }
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            max_retries: 5,
            retry_delay: Duration::from_secs(1),
            follow_redirects: true,
        }
    }
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(root_url: impl Into<CompactString>, private_token: impl Into<CompactString>) -> Self {
        Self {
            root_url: root_url.into(),
            private_token: private_token.into(),
            request: RequestConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.root_url.is_empty() {
            return Err(ClientError::config_validation(
                "gitlab_url",
                "Root URL cannot be empty",
            ));
        }

        if !self.root_url.starts_with("http://") && !self.root_url.starts_with("https://") {
            return Err(ClientError::config_validation(
                "gitlab_url",
                "Root URL must start with http:// or https://",
            ));
        }

        if url::Url::parse(&self.root_url).is_err() {
            return Err(ClientError::config_validation(
                "gitlab_url",
                "Root URL is not a valid URL format",
            ));
        }

        if self.private_token.is_empty() {
            return Err(ClientError::config_validation(
                "gitlab_token",
                "Private token cannot be empty",
            ));
        }

        if HeaderValue::from_str(&self.private_token).is_err() {
            return Err(ClientError::config_validation(
                "gitlab_token",
                "Private token contains characters not allowed in an HTTP header",
            ));
        }

        if self.request.timeout.is_zero() {
            return Err(ClientError::config_validation(
                "timeout",
                "Timeout must be greater than zero",
            ));
        }

        Ok(())
    }

    /// Set request configuration
    pub fn with_request(mut self, request: RequestConfig) -> Self {
        self.request = request;
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request.timeout = timeout;
        self
    }

    /// Set the transport retry budget and its base delay
    pub fn with_retries(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.request.max_retries = max_retries;
        self.request.retry_delay = retry_delay;
        self
    }
}

impl IssueQuery {
    /// Create an unfiltered issue query
    pub fn new() -> Self {
        Self::default()
    }

    /// Set group filter
    pub fn with_group(mut self, group_id: impl Into<ResourceId>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    /// Set milestone filter
    pub fn with_milestone(mut self, milestone: MilestoneFilter) -> Self {
        self.milestone = Some(milestone);
        self
    }

    /// Set state filter
    pub fn with_state(mut self, state: IssueState) -> Self {
        self.state = Some(state);
        self
    }
}
