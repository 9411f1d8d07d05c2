//! Testing utilities for the crud-chaos workspace
//!
//! Transports that stand in for the target service, plus fixtures.

#![allow(missing_docs)]

mod fake_service;

pub use fake_service::{FakeBookService, StoredBook};

use chaos_core::{ChaosConfig, Request, Response, Transport, TransportError};
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Replays a fixed script of responses and records every request
///
/// Once the script runs out, every further request gets `fallback`.
#[derive(Debug)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<Response, TransportError>>>,
    fallback: Result<Response, TransportError>,
    sent: Mutex<Vec<Request>>,
}

impl ScriptedTransport {
    pub fn new(script: impl IntoIterator<Item = Result<Response, TransportError>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            fallback: Ok(Response::new(500, "script exhausted")),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Script of plain responses
    pub fn responses(responses: impl IntoIterator<Item = Response>) -> Self {
        Self::new(responses.into_iter().map(Ok))
    }

    #[must_use]
    pub fn with_fallback(mut self, fallback: Result<Response, TransportError>) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn push(&self, next: Result<Response, TransportError>) {
        self.script.lock().push_back(next);
    }

    /// Requests received so far
    pub fn sent(&self) -> Vec<Request> {
        self.sent.lock().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }
}

#[async_trait::async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: Request) -> Result<Response, TransportError> {
        self.sent.lock().push(request);
        self.script
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

/// Every request fails to connect
#[derive(Debug, Default)]
pub struct UnreachableTransport {
    attempts: Mutex<u64>,
}

impl UnreachableTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> u64 {
        *self.attempts.lock()
    }
}

#[async_trait::async_trait]
impl Transport for UnreachableTransport {
    async fn send(&self, _request: Request) -> Result<Response, TransportError> {
        *self.attempts.lock() += 1;
        Err(TransportError::Connect("connection refused".to_string()))
    }
}

/// Config for fast deterministic test runs: no pacing, fixed seed
pub fn test_config(seed: u64) -> ChaosConfig {
    ChaosConfig::new().with_seed(seed).with_delay_ms(0, 0)
}

/// `200` list body for the given ids
pub fn listing_response(ids: &[u64]) -> Response {
    let items: Vec<_> = ids
        .iter()
        .map(|id| serde_json::json!({ "id": id, "title": format!("Book {id}"), "author": "Anon" }))
        .collect();
    Response::new(200, serde_json::Value::Array(items).to_string())
}

/// `201` create body echoing `id`
pub fn created_response(id: u64) -> Response {
    Response::new(
        201,
        serde_json::json!({ "id": id, "title": "1984 - 4242", "author": "George Orwell" }).to_string(),
    )
}
