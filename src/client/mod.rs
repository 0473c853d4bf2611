//! GitLab client modules
//!
//! The façade in [`api`] maps each operation onto a path and verb, the
//! engine in [`request`] performs and paginates the call, and [`transport`]
//! does the HTTP.

pub mod api;
pub mod config;
pub mod encode;
pub mod error;
pub mod request;
pub mod transport;
pub mod validate;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types for convenience
pub use api::GitlabApi;
pub use config::{ClientConfig, IssueQuery, MilestoneFilter, RequestConfig};
pub use error::{ClientError, Result};
pub use request::{Method, RequestOptions, ResponseFormat};
pub use transport::{FormBody, ReqwestTransport, Transport, TransportRequest, TransportResponse};
pub use validate::Normalized;
