//! in-memory transport for unit tests

use crate::client::{ApiError, ApiRequest, RawResponse, Transport};

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// replays queued responses in order and records every request
///
/// a request with nothing queued fails like an unreachable device.
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<RawResponse, String>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, status: u16, body: &str) {
        self.script
            .lock()
            .unwrap()
            .push_back(Ok(RawResponse { status, body: body.to_string() }));
    }

    pub fn respond_json(&self, body: serde_json::Value) {
        self.respond(200, &body.to_string());
    }

    pub fn fail(&self, reason: &str) {
        self.script.lock().unwrap().push_back(Err(reason.to_string()));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// `METHOD path` for each request, in order
    pub fn calls(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| format!("{} {}", r.method, r.path))
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: ApiRequest) -> Result<RawResponse, ApiError> {
        self.requests.lock().unwrap().push(request);
        match self.script.lock().unwrap().pop_front() {
            Some(Ok(r)) => Ok(r),
            Some(Err(reason)) => Err(ApiError::Transport(reason)),
            None => Err(ApiError::Transport("no scripted response".to_string())),
        }
    }
}
