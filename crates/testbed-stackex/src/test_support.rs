//! Scripted transport and JSON builders shared by the unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::time::Instant;

use crate::error::TransportError;
use crate::transport::Transport;
use crate::types::ApiResponse;

type Handler = dyn Fn(&str, &[(&str, String)]) -> Result<ApiResponse, TransportError> + Send + Sync;

#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub endpoint: String,
    pub params: Vec<(String, String)>,
    pub at: Instant,
}

impl RecordedCall {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Answers every request through a closure and records what was asked.
pub(crate) struct ScriptedTransport {
    handler: Box<Handler>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&str, &[(&str, String)]) -> Result<ApiResponse, TransportError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, prefix: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.endpoint.starts_with(prefix))
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    fn site(&self) -> &str {
        "stackoverflow"
    }

    async fn request(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<ApiResponse, TransportError> {
        self.calls.lock().unwrap().push(RecordedCall {
            endpoint: endpoint.to_owned(),
            params: params
                .iter()
                .map(|(k, v)| ((*k).to_owned(), v.clone()))
                .collect(),
            at: Instant::now(),
        });
        (self.handler)(endpoint, params)
    }
}

/// Page number sent with a question search, defaulting to 1.
pub(crate) fn page_of(params: &[(&str, String)]) -> u32 {
    params
        .iter()
        .find(|(k, _)| *k == "page")
        .and_then(|(_, v)| v.parse().ok())
        .unwrap_or(1)
}

pub(crate) fn page(items: Vec<Value>, has_more: bool, quota_remaining: Option<i64>) -> ApiResponse {
    ApiResponse {
        items,
        has_more,
        quota_remaining,
        quota_max: Some(10_000),
        backoff: None,
    }
}

pub(crate) fn question_json(id: i64, accepted_answer_id: Option<i64>) -> Value {
    let mut item = json!({
        "question_id": id,
        "link": format!("https://stackoverflow.com/questions/{id}"),
        "title": format!("Question {id}"),
        "body": format!("<p>Body of {id}</p>"),
        "tags": ["rust"],
        "score": 100,
        "view_count": 1000,
        "answer_count": 3,
        "is_answered": true,
        "creation_date": 1_600_000_000
    });
    if let Some(answer_id) = accepted_answer_id {
        item["accepted_answer_id"] = json!(answer_id);
    }
    item
}

pub(crate) fn answer_json(id: i64) -> Value {
    json!({
        "answer_id": id,
        "body": format!("<p>Answer {id}</p>"),
        "score": 50,
        "is_accepted": true,
        "creation_date": 1_600_000_500
    })
}

pub(crate) fn rejected(endpoint: &str, status: u16) -> TransportError {
    TransportError::RejectedRequest {
        endpoint: endpoint.to_owned(),
        status,
        body: "{\"error_id\":502,\"error_name\":\"throttle_violation\"}".to_owned(),
    }
}
