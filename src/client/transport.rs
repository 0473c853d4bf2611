//! HTTP capability used by the request engine
//!
//! The engine only ever talks to a [`Transport`]. [`ReqwestTransport`] is the
//! production implementation; tests swap in scripted ones.

use std::{future::Future, time::Duration};

use backon::{ExponentialBuilder, Retryable};
use compact_str::{CompactString, ToCompactString};
use reqwest::{Client, RequestBuilder, header::HeaderMap, redirect::Policy};
use tracing::{debug, warn};

use super::{
    config::RequestConfig,
    error::{ClientError, Result},
    request::Method,
};

/// Statuses worth another attempt for idempotent verbs.
const RETRYABLE_STATUSES: [u16; 7] = [408, 413, 429, 500, 502, 503, 504];

const MAX_REDIRECTS: usize = 10;

const MAX_RETRY_DELAY: Duration = Duration::from_secs(60);

/// Form-encoded request payload, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormBody {
    fields: Vec<(CompactString, CompactString)>,
}

impl FormBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<CompactString>, value: impl std::fmt::Display) -> Self {
        self.fields.push((name.into(), value.to_compact_string()));
        self
    }

    /// Add a field only when a value is present.
    pub fn optional_field<V: std::fmt::Display>(
        self,
        name: impl Into<CompactString>,
        value: Option<V>,
    ) -> Self {
        match value {
            Some(value) => self.field(name, value),
            None => self,
        }
    }

    pub fn fields(&self) -> &[(CompactString, CompactString)] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }
}

/// One HTTP call, as handed to a [`Transport`].
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: CompactString,
    pub headers: HeaderMap,
    pub form: Option<FormBody>,
    pub timeout: Duration,
    pub follow_redirects: bool,
    /// Retries the transport may spend after the first attempt
    pub retries: u32,
}

/// A successful HTTP response.
#[derive(Debug, Clone, Default)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

impl TransportResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Performs HTTP calls on behalf of the request engine.
///
/// Implementations return `Err` for anything other than a 2xx response; the
/// engine never inspects failures.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: TransportRequest,
    ) -> impl Future<Output = Result<TransportResponse>> + Send;
}

/// [`Transport`] backed by reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    following: Client,
    direct: Client,
    retry_delay: Duration,
}

impl ReqwestTransport {
    pub fn new(config: &RequestConfig) -> Result<Self> {
        let following = Client::builder()
            .redirect(Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(ClientError::Http)?;
        let direct = Client::builder()
            .redirect(Policy::none())
            .build()
            .map_err(ClientError::Http)?;

        Ok(Self {
            following,
            direct,
            retry_delay: config.retry_delay,
        })
    }

    /// Map the verb onto the matching reqwest call
    fn builder(&self, request: &TransportRequest) -> RequestBuilder {
        let client = if request.follow_redirects {
            &self.following
        } else {
            &self.direct
        };
        let url = request.url.as_str();

        let builder = match request.method {
            Method::Get => client.get(url),
            Method::Post => client.post(url),
            Method::Put => client.put(url),
            Method::Delete => client.delete(url),
        }
        .headers(request.headers.clone())
        .timeout(request.timeout);

        match &request.form {
            Some(form) => builder.form(form.fields()),
            None => builder,
        }
    }

    /// One attempt: any non-2xx response becomes [`ClientError::Status`]
    async fn send_once(&self, request: &TransportRequest) -> Result<TransportResponse> {
        let response = self.builder(request).send().await?;
        let status = response.status().as_u16();

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::status(status, request.url.clone(), body));
        }

        let headers = response.headers().clone();
        let body = response.text().await?;
        debug!(url = %request.url, status, "Request succeeded");

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }

    /// Exponential backoff starting at the configured delay
    fn backoff(&self, max_times: u32) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.retry_delay)
            .with_max_delay(MAX_RETRY_DELAY)
            .with_max_times(max_times as usize)
    }
}

/// Transient failures: throttling, gateway errors, timeouts and refused connections.
fn is_retryable(error: &ClientError) -> bool {
    match error {
        ClientError::Status { status, .. } => RETRYABLE_STATUSES.contains(status),
        ClientError::Http(e) => e.is_connect() || e.is_timeout(),
        _ => false,
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        let retries = if request.method.is_idempotent() {
            request.retries
        } else {
            0
        };

        (|| self.send_once(&request))
            .retry(self.backoff(retries))
            .when(is_retryable)
            .notify(|err, delay| {
                warn!(
                    url = %request.url,
                    error = %err,
                    ?delay,
                    "Retrying request"
                );
            })
            .await
    }
}
