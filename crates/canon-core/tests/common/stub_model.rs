//! Stub completion model for tests
//!
//! Avoids API keys and network calls; records every request it receives.

use canon_core::error::{LlmError, LlmResult};
use canon_core::{CompletionModel, CompletionRequest};
use std::sync::{Arc, Mutex};

type Responder = Box<dyn Fn(&CompletionRequest) -> LlmResult<String> + Send + Sync>;

pub struct StubModel {
    responder: Responder,
    requests: Mutex<Vec<CompletionRequest>>,
}

#[allow(dead_code)]
impl StubModel {
    pub fn with<F>(responder: F) -> Arc<Self>
    where
        F: Fn(&CompletionRequest) -> LlmResult<String> + Send + Sync + 'static,
    {
        Arc::new(Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Always answer with `text`
    pub fn replying(text: &str) -> Arc<Self> {
        let text = text.to_string();
        Self::with(move |_| Ok(text.clone()))
    }

    /// Always fail like an unavailable upstream
    pub fn failing() -> Arc<Self> {
        Self::with(|_| {
            Err(LlmError::Provider {
                status: 503,
                body: "upstream unavailable".to_string(),
            })
        })
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl CompletionModel for StubModel {
    async fn complete(&self, request: &CompletionRequest) -> LlmResult<String> {
        self.requests.lock().unwrap().push(request.clone());
        (self.responder)(request)
    }
}
