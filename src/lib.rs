//! Typed client for the GitLab REST API
//!
//! [`GitlabApi`] turns method calls into authenticated requests, walks every
//! page of list responses and decodes the payloads into the records of
//! [`domain`].
//!
//! ```no_run
//! # async fn run() -> gitlab_rest::client::Result<()> {
//! use gitlab_rest::{ClientConfig, GitlabApi};
//!
//! let api = GitlabApi::new(ClientConfig::new("https://gitlab.example.com", "glpat-token"))?;
//! let project = api.get_project("group/project").await?;
//! let labels = api.get_labels(project.id).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod domain;
pub mod id;
pub mod logging;
pub mod result;

pub use client::{ClientConfig, ClientError, GitlabApi};
pub use id::ResourceId;
