//! Shared helpers for zonesync integration tests

#![allow(dead_code)] // Not every test file uses every helper

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::TempDir;
use zonesync::api::{ApiResponse, Transport};
use zonesync::error::{Result, SyncError};

/// One request seen by `MockTransport`
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: &'static str,
    pub path: String,
    pub body: Option<serde_json::Value>,
}

/// Transport that records requests and replays scripted responses in order
///
/// Once the script runs out every request gets `200` with an empty body.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<ApiResponse>>>,
    calls: Mutex<Vec<Call>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_responses(responses: Vec<Result<ApiResponse>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(
        &self,
        method: &'static str,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<ApiResponse> {
        self.calls.lock().unwrap().push(Call {
            method,
            path: path.to_string(),
            body: body.cloned(),
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ApiResponse::new(200, "")))
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.record("GET", path, None)
    }

    async fn post(&self, path: &str, body: &serde_json::Value) -> Result<ApiResponse> {
        self.record("POST", path, Some(body))
    }

    async fn patch(&self, path: &str, body: &serde_json::Value) -> Result<ApiResponse> {
        self.record("PATCH", path, Some(body))
    }
}

pub fn ok(status: u16) -> Result<ApiResponse> {
    Ok(ApiResponse::new(status, ""))
}

pub fn conflict() -> Result<ApiResponse> {
    Ok(ApiResponse::new(
        422,
        r#"{"error": "RRset www.example.com. IN CNAME: Conflicts with pre-existing RRset"}"#,
    ))
}

pub fn transport_error() -> Result<ApiResponse> {
    Err(SyncError::Transport("connection refused".to_string()))
}

/// Write `<domain>.db` into a fresh temporary directory
pub fn zone_file(domain: &str, contents: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(format!("{}.db", domain));
    std::fs::write(&path, contents).unwrap();
    (dir, path)
}
