//! Request engine: the single path every API call goes through
//!
//! One logical call may span several HTTP requests. List endpoints are
//! walked page by page, driven by the `X-Total-Pages` response header, and
//! the per-page arrays are concatenated before the caller sees anything.

use compact_str::format_compact;
use reqwest::header::{HeaderMap, HeaderName};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, instrument};

use super::{
    api::GitlabApi,
    error::{ClientError, Result},
    transport::{FormBody, Transport, TransportRequest},
    validate::Normalized,
};

/// Items requested per page. GitLab caps `per_page` at 100.
pub const PER_PAGE: u32 = 100;

/// Response header carrying the number of pages of a list query.
pub const TOTAL_PAGES_HEADER: &str = "x-total-pages";

/// Header carrying the private token.
pub const PRIVATE_TOKEN_HEADER: HeaderName = HeaderName::from_static("private-token");

/// HTTP verb of a request.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// Parse an upper-case verb. Anything unrecognized becomes GET.
    pub fn from_verb(verb: &str) -> Normalized<Method> {
        match verb {
            "GET" => Normalized::kept(Method::Get),
            "POST" => Normalized::kept(Method::Post),
            "PUT" => Normalized::kept(Method::Put),
            "DELETE" => Normalized::kept(Method::Delete),
            _ => Normalized::replaced(Method::Get),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    pub fn is_idempotent(&self) -> bool {
        !matches!(self, Method::Post)
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a response body is turned into a value.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    #[default]
    Json,
    /// Raw text, returned as a JSON string
    Text,
}

/// Parameters of one logical call.
///
/// `retry_on_any_error` and `max_tries` are carried for callers that set
/// them but do not change how the call is made; retries happen only in the
/// transport, bounded by [`RequestConfig::max_retries`](super::config::RequestConfig).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    pub body: Option<FormBody>,
    pub method: Method,
    pub retry_on_any_error: bool,
    pub max_tries: u32,
    pub format: ResponseFormat,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            body: None,
            method: Method::Get,
            retry_on_any_error: false,
            max_tries: 5,
            format: ResponseFormat::Json,
        }
    }
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Set the verb from its name, falling back to GET for unknown verbs.
    pub fn with_verb(mut self, verb: &str) -> Self {
        let method = Method::from_verb(verb);
        if method.adjusted {
            debug!(verb, "Unknown HTTP verb, using GET");
        }
        self.method = method.value;
        self
    }

    pub fn with_body(mut self, body: FormBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_retry_on_any_error(mut self, retry: bool) -> Self {
        self.retry_on_any_error = retry;
        self
    }

    pub fn with_max_tries(mut self, tries: u32) -> Self {
        self.max_tries = tries;
        self
    }

    pub fn with_format(mut self, format: ResponseFormat) -> Self {
        self.format = format;
        self
    }
}

/// Pagination state of one logical call.
#[derive(Debug)]
struct PageCursor {
    current_page: u32,
    total_pages: u32,
    accumulated: Option<Value>,
}

impl PageCursor {
    fn new() -> Self {
        Self {
            current_page: 0,
            total_pages: 1,
            accumulated: None,
        }
    }

    /// Move to the next page; `false` once every page has been fetched.
    fn advance(&mut self) -> bool {
        self.current_page += 1;
        self.current_page <= self.total_pages
    }

    fn observe_total_pages(&mut self, headers: &HeaderMap) {
        if let Some(total) = headers
            .get(TOTAL_PAGES_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u32>().ok())
        {
            self.total_pages = total;
        }
    }

    /// Append to an array collected from earlier pages, otherwise replace.
    fn merge(&mut self, body: Value) {
        if self.current_page > 1
            && let Some(Value::Array(items)) = self.accumulated.as_mut()
        {
            match body {
                Value::Array(page) => items.extend(page),
                other => items.push(other),
            }
            return;
        }

        self.accumulated = Some(body);
    }

    /// Only array payloads are aggregated; anything else ends the walk.
    fn is_collecting(&self) -> bool {
        matches!(self.accumulated, Some(Value::Array(_)))
    }

    fn finish(self) -> Option<Value> {
        self.accumulated
    }
}

fn decode_body(path: &str, body: String, format: ResponseFormat) -> Result<Value> {
    match format {
        ResponseFormat::Text => Ok(Value::String(body)),
        ResponseFormat::Json if body.trim().is_empty() => Ok(Value::Null),
        ResponseFormat::Json => serde_json::from_str(&body)
            .map_err(|e| ClientError::json_parse(path, "Invalid JSON", e)),
    }
}

impl<T: Transport> GitlabApi<T> {
    /// Perform one logical call and return the merged response.
    ///
    /// `path` is relative to the API root and may carry a query string.
    /// DELETE calls always yield `None`. Any failing page fails the call.
    #[instrument(skip(self, options), fields(method = %options.method))]
    pub async fn execute(&self, path: &str, options: RequestOptions) -> Result<Option<Value>> {
        let path = path.trim_start_matches('/');
        let concatenator = if path.contains('?') { '&' } else { '?' };
        let mut cursor = PageCursor::new();

        while cursor.advance() {
            if cursor.current_page > 1 {
                info!(
                    "Automatically paging call to '{}'... Getting page {} of {}.",
                    path, cursor.current_page, cursor.total_pages
                );
            }

            let url = format_compact!(
                "{}{}{}page={}&per_page={}",
                self.root_url,
                path,
                concatenator,
                cursor.current_page,
                PER_PAGE
            );
            let response = self.transport.send(self.transport_request(url, &options)).await?;
            cursor.observe_total_pages(&response.headers);

            if options.method == Method::Delete {
                return Ok(None);
            }

            cursor.merge(decode_body(path, response.body, options.format)?);
            if !cursor.is_collecting() {
                break;
            }
        }

        Ok(cursor.finish())
    }

    /// Perform a call and decode the merged response into `R`.
    pub async fn request<R>(&self, path: &str, options: RequestOptions) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let value = self.execute(path, options).await?.unwrap_or(Value::Null);
        serde_json::from_value(value)
            .map_err(|e| ClientError::json_parse(path, "Unexpected response shape", e))
    }

    /// Perform a call whose response body is irrelevant.
    pub async fn request_unit(&self, path: &str, options: RequestOptions) -> Result<()> {
        self.execute(path, options).await.map(|_| ())
    }

    fn transport_request(
        &self,
        url: compact_str::CompactString,
        options: &RequestOptions,
    ) -> TransportRequest {
        let mut headers = HeaderMap::new();
        headers.insert(PRIVATE_TOKEN_HEADER, self.private_token.clone());

        TransportRequest {
            method: options.method,
            url,
            headers,
            form: options.body.clone(),
            timeout: self.request.timeout,
            follow_redirects: self.request.follow_redirects,
            retries: self.request.max_retries,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use tracing::Level;
    use tracing_subscriber::layer::SubscriberExt;

    use super::*;
    use crate::client::{
        ClientConfig,
        testing::{CapturedLogs, ScriptedTransport},
    };

    fn api(transport: ScriptedTransport) -> GitlabApi<ScriptedTransport> {
        GitlabApi::with_transport(ClientConfig::new("http://gitlab.test", "secret"), transport)
            .unwrap()
    }

    fn page_of(start: usize, len: usize) -> Value {
        Value::Array((start..start + len).map(|i| json!({ "id": i })).collect())
    }

    #[test]
    fn verbs_are_normalized() {
        assert_eq!(Method::from_verb("PUT"), Normalized::kept(Method::Put));
        assert_eq!(Method::from_verb("PATCH"), Normalized::replaced(Method::Get));
        assert_eq!(Method::from_verb("delete"), Normalized::replaced(Method::Get));
    }

    #[test]
    fn request_options_defaults() {
        let options = RequestOptions::default();
        assert_eq!(options.method, Method::Get);
        assert!(options.body.is_none());
        assert!(!options.retry_on_any_error);
        assert_eq!(options.max_tries, 5);
    }

    #[test]
    fn cursor_concatenates_arrays_after_first_page() {
        let mut cursor = PageCursor::new();
        assert!(cursor.advance());
        cursor.merge(json!([1, 2]));
        cursor.total_pages = 3;
        assert!(cursor.advance());
        cursor.merge(json!([3]));
        assert!(cursor.advance());
        cursor.merge(json!(4));
        assert!(!cursor.advance());
        assert_eq!(cursor.finish(), Some(json!([1, 2, 3, 4])));
    }

    #[test]
    fn cursor_ignores_unparseable_totals() {
        let mut cursor = PageCursor::new();
        let mut headers = HeaderMap::new();
        headers.insert(TOTAL_PAGES_HEADER, "many".parse().unwrap());
        cursor.observe_total_pages(&headers);
        assert_eq!(cursor.total_pages, 1);

        headers.insert(TOTAL_PAGES_HEADER, "7".parse().unwrap());
        cursor.observe_total_pages(&headers);
        assert_eq!(cursor.total_pages, 7);
    }

    #[tokio::test]
    async fn single_page_array_is_returned_unchanged() {
        let body = page_of(0, 3);
        let transport = ScriptedTransport::new().respond(body.clone(), None);
        let api = api(transport);

        let result = api.execute("projects", RequestOptions::default()).await.unwrap();

        assert_eq!(result, Some(body));
        assert_eq!(api.transport.urls(), ["http://gitlab.test/api/v4/projects?page=1&per_page=100"]);
    }

    #[tokio::test]
    async fn pages_are_concatenated_in_order() {
        for pages in [1usize, 2, 5] {
            let mut transport = ScriptedTransport::new();
            for page in 0..pages {
                transport = transport.respond(page_of(page * 10, 10), Some(pages as u32));
            }
            let api = api(transport);

            let result = api.execute("issues", RequestOptions::default()).await.unwrap();

            assert_eq!(result, Some(page_of(0, pages * 10)), "{pages} pages");
            assert_eq!(api.transport.urls().len(), pages);
            assert!(api.transport.urls()[pages - 1].ends_with(&format!("page={pages}&per_page=100")));
        }
    }

    #[tokio::test]
    async fn every_later_page_is_logged_once() {
        let logs = CapturedLogs::default();
        let _guard = tracing::subscriber::set_default(tracing_subscriber::registry().with(logs.clone()));

        let transport = ScriptedTransport::new()
            .respond(page_of(0, 2), Some(3))
            .respond(page_of(2, 2), Some(3))
            .respond(page_of(4, 2), Some(3));
        api(transport)
            .execute("projects", RequestOptions::default())
            .await
            .unwrap();

        assert_eq!(
            logs.messages_at(Level::INFO),
            [
                "Automatically paging call to 'projects'... Getting page 2 of 3.",
                "Automatically paging call to 'projects'... Getting page 3 of 3.",
            ]
        );
    }

    #[tokio::test]
    async fn single_page_calls_log_no_progress() {
        let logs = CapturedLogs::default();
        let _guard = tracing::subscriber::set_default(tracing_subscriber::registry().with(logs.clone()));

        let transport = ScriptedTransport::new().respond(page_of(0, 2), Some(1));
        api(transport)
            .execute("projects", RequestOptions::default())
            .await
            .unwrap();

        assert!(logs.messages_at(Level::INFO).is_empty());
    }

    #[tokio::test]
    async fn object_responses_are_never_paged() {
        let body = json!({ "id": 2, "name": "personal-project" });
        let transport = ScriptedTransport::new()
            .respond(body.clone(), Some(4))
            .respond(json!({ "id": 3 }), Some(4));
        let api = api(transport);

        let result = api.execute("projects/2", RequestOptions::default()).await.unwrap();

        assert_eq!(result, Some(body));
        assert_eq!(api.transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn delete_short_circuits_without_a_value() {
        let transport = ScriptedTransport::new().respond(json!([{ "id": 1 }]), Some(3));
        let api = api(transport);

        let result = api
            .execute("projects/1/labels?name=bug", RequestOptions::new(Method::Delete))
            .await
            .unwrap();

        assert_eq!(result, None);
        assert_eq!(api.transport.requests().len(), 1);
        assert_eq!(api.transport.requests()[0].method, Method::Delete);
    }

    #[tokio::test]
    async fn unknown_verb_is_sent_as_get() {
        let api = api(ScriptedTransport::new().respond(json!([]), None));

        api.execute("projects", RequestOptions::default().with_verb("PATCH"))
            .await
            .unwrap();

        assert_eq!(api.transport.requests()[0].method, Method::Get);
    }

    #[tokio::test]
    async fn existing_query_strings_are_extended() {
        let api = api(ScriptedTransport::new().respond(json!([]), None));

        api.execute("//projects/1/issues/2/notes?sort=asc", RequestOptions::default())
            .await
            .unwrap();

        assert_eq!(
            api.transport.urls(),
            ["http://gitlab.test/api/v4/projects/1/issues/2/notes?sort=asc&page=1&per_page=100"]
        );
    }

    #[tokio::test]
    async fn token_and_body_are_attached() {
        let api = api(ScriptedTransport::new().respond(json!({ "id": 1 }), None));
        let body = FormBody::new().field("title", "Broken build");

        api.execute("projects/1/issues", RequestOptions::new(Method::Post).with_body(body.clone()))
            .await
            .unwrap();

        let request = &api.transport.requests()[0];
        assert_eq!(request.headers.get("PRIVATE-TOKEN").unwrap(), "secret");
        assert_eq!(request.form.as_ref(), Some(&body));
        assert_eq!(request.retries, 5);
        assert!(request.follow_redirects);
    }

    #[tokio::test]
    async fn retry_fields_do_not_change_the_request() {
        let api = api(ScriptedTransport::new().respond(json!([]), None));

        api.execute(
            "projects",
            RequestOptions::default().with_retry_on_any_error(true).with_max_tries(1),
        )
        .await
        .unwrap();

        assert_eq!(api.transport.requests()[0].retries, 5);
    }

    #[tokio::test]
    async fn failure_on_a_later_page_fails_the_call() {
        let transport = ScriptedTransport::new()
            .respond(page_of(0, 2), Some(3))
            .fail(502);
        let api = api(transport);

        let err = api.execute("projects", RequestOptions::default()).await.unwrap_err();

        assert_eq!(err.status_code(), Some(502));
        assert_eq!(api.transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn empty_body_decodes_as_null() {
        let api = api(ScriptedTransport::new().respond_raw("", None));

        let result = api
            .execute("projects/1/milestones?title=v1", RequestOptions::new(Method::Post))
            .await
            .unwrap();

        assert_eq!(result, Some(Value::Null));
    }

    #[tokio::test]
    async fn text_format_keeps_the_raw_body() {
        let api = api(ScriptedTransport::new().respond_raw("fn main() {}\n", None));

        let content: String = api
            .request(
                "projects/1/repository/files/main%2Ers/raw?ref=main",
                RequestOptions::default().with_format(ResponseFormat::Text),
            )
            .await
            .unwrap();

        assert_eq!(content, "fn main() {}\n");
    }

    #[tokio::test]
    async fn mismatched_shapes_are_reported_with_the_path() {
        let api = api(ScriptedTransport::new().respond(json!({ "message": "oops" }), None));

        let err = api
            .request::<Vec<crate::domain::Label>>("projects/1/labels", RequestOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::JsonParse { ref path, .. } if path == "projects/1/labels"));
    }
}
