//! Fake transport shared by the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use mite_core::{HttpRequest, HttpResponse, Mite, MiteError, Transport};
use serde_json::Value;

/// Replays one canned response for every request and records what was sent.
pub struct FakeTransport {
    response: HttpResponse,
    requests: Mutex<Vec<HttpRequest>>,
}

impl FakeTransport {
    pub fn replying(status: u16, body: &Value) -> Arc<Self> {
        Self::replying_raw(status, &body.to_string())
    }

    pub fn replying_raw(status: u16, body: &str) -> Arc<Self> {
        Arc::new(Self {
            response: HttpResponse {
                status,
                headers: vec![("content-type".to_string(), "application/json".to_string())],
                body: body.to_string(),
            },
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

impl Transport for FakeTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, MiteError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self.response.clone())
    }
}

/// A factory for realm `foo` and API key `bar` over `transport`.
pub fn mite(transport: &Arc<FakeTransport>) -> Mite {
    Mite::with_transport("foo", "bar", transport.clone())
}

/// Body of a request parsed back into JSON.
pub fn sent_body(request: &HttpRequest) -> Value {
    serde_json::from_str(request.body.as_deref().expect("request has no body")).unwrap()
}
