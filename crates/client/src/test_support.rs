//! In-memory network used by the worker and client tests.

use crate::fetch::{Network, Request};
use krishi_core::{CapturedResponse, Error};
use std::collections::HashMap;
use std::sync::Mutex;

pub(crate) fn ok(url: &str, body: &str) -> CapturedResponse {
    CapturedResponse {
        url: url.to_string(),
        status: 200,
        content_type: Some("text/plain".to_string()),
        headers: Vec::new(),
        body: body.as_bytes().to_vec(),
    }
}

/// Serves canned responses keyed by URL; unknown URLs or `offline` fail like
/// a dropped connection. Counts every request it sees.
#[derive(Default)]
pub(crate) struct FakeNetwork {
    responses: Mutex<HashMap<String, CapturedResponse>>,
    calls: Mutex<usize>,
    offline: Mutex<bool>,
}

impl FakeNetwork {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn serve(&self, response: CapturedResponse) {
        self.responses.lock().unwrap().insert(response.url.clone(), response);
    }

    pub(crate) fn set_offline(&self, offline: bool) {
        *self.offline.lock().unwrap() = offline;
    }

    pub(crate) fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl Network for FakeNetwork {
    async fn fetch(&self, request: &Request) -> Result<CapturedResponse, Error> {
        *self.calls.lock().unwrap() += 1;

        if *self.offline.lock().unwrap() {
            return Err(Error::Network("offline".into()));
        }

        self.responses
            .lock()
            .unwrap()
            .get(request.url.as_str())
            .cloned()
            .ok_or_else(|| Error::Network(format!("connection refused: {}", request.url)))
    }
}
