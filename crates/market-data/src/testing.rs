//! Test doubles shared by provider tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::MarketDataError;
use crate::provider::Upstream;
use crate::retry::RetryPolicy;
use crate::transport::HttpTransport;

#[derive(Clone)]
enum Stubbed {
    Json(Value),
    Status(u16),
    Refused,
}

/// Transport answering from a fixed URL → response table. Unknown URLs get
/// a 404. Every call is recorded.
#[derive(Clone, Default)]
pub struct StubTransport {
    responses: Arc<Mutex<HashMap<String, Stubbed>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn json(self, url: &str, body: Value) -> Self {
        self.insert(url, Stubbed::Json(body))
    }

    pub fn status(self, url: &str, status: u16) -> Self {
        self.insert(url, Stubbed::Status(status))
    }

    pub fn refused(self, url: &str) -> Self {
        self.insert(url, Stubbed::Refused)
    }

    fn insert(self, url: &str, response: Stubbed) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), response);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|u| *u == url).count()
    }

    pub fn upstream(&self) -> Upstream {
        Upstream::new(Arc::new(self.clone()), RetryPolicy::no_delay())
    }
}

#[async_trait]
impl HttpTransport for StubTransport {
    async fn get_json(&self, url: &str) -> Result<Value, MarketDataError> {
        self.calls.lock().unwrap().push(url.to_string());
        let response = self.responses.lock().unwrap().get(url).cloned();
        match response {
            Some(Stubbed::Json(body)) => Ok(body),
            Some(Stubbed::Status(status)) => Err(MarketDataError::HttpStatus {
                url: url.to_string(),
                status,
            }),
            Some(Stubbed::Refused) => Err(MarketDataError::Transport {
                url: url.to_string(),
                message: "connection refused".to_string(),
            }),
            None => Err(MarketDataError::HttpStatus {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}
