//! In-memory transport for unit tests

use std::{
    collections::VecDeque,
    fmt,
    sync::{Arc, Mutex},
};

use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::{
    Event, Level, Subscriber,
    field::{Field, Visit},
};
use tracing_subscriber::layer::{Context, Layer};

use super::{
    error::{ClientError, Result},
    request::TOTAL_PAGES_HEADER,
    transport::{Transport, TransportRequest, TransportResponse},
};

/// Replays queued responses in order and records every request.
#[derive(Debug, Default)]
pub(crate) struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<TransportResponse>>>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(self, body: Value, total_pages: Option<u32>) -> Self {
        self.respond_raw(&body.to_string(), total_pages)
    }

    pub(crate) fn respond_raw(mut self, body: &str, total_pages: Option<u32>) -> Self {
        let mut headers = HeaderMap::new();
        if let Some(total) = total_pages {
            headers.insert(TOTAL_PAGES_HEADER, HeaderValue::from(total));
        }
        self.queue(Ok(TransportResponse {
            status: 200,
            headers,
            body: body.to_string(),
        }));
        self
    }

    pub(crate) fn fail(mut self, status: u16) -> Self {
        self.queue(Err(ClientError::status(status, "scripted", "scripted failure")));
        self
    }

    fn queue(&mut self, response: Result<TransportResponse>) {
        self.responses
            .get_mut()
            .unwrap()
            .push_back(response);
    }

    pub(crate) fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn urls(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|r| r.url.to_string())
            .collect()
    }
}

impl Transport for ScriptedTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        let url = request.url.clone();
        self.requests.lock().unwrap().push(request);
        let next = self.responses.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(ClientError::status(404, url, "no scripted response")))
    }
}

/// Layer that records the level and message of every event.
#[derive(Debug, Clone, Default)]
pub(crate) struct CapturedLogs {
    events: Arc<Mutex<Vec<(Level, String)>>>,
}

impl CapturedLogs {
    pub(crate) fn messages_at(&self, level: Level) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, message)| message.clone())
            .collect()
    }
}

struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

impl<S: Subscriber> Layer<S> for CapturedLogs {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        self.events
            .lock()
            .unwrap()
            .push((*event.metadata().level(), visitor.0));
    }
}
