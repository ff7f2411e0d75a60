//! Fakes shared by the unit tests.

use crate::error::{Error, Result};
use crate::fetch::{HttpResponse, Transport};
use crate::models::{Payload, ScrapeRequest, ScrapedData};
use crate::sources::RequestSource;
use crate::store::DataStore;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Mutex;

/// One call observed by [`ScriptedTransport`].
#[derive(Debug, Clone)]
pub struct Call {
    pub url: String,
    pub proxy: Option<String>,
    pub user_agent: Option<String>,
}

/// Replies with queued outcomes in order, then with `fallback`.
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<HttpResponse>>>,
    fallback: u16,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Result<HttpResponse>>, fallback: u16) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every call answers with `status`.
    pub fn always(status: u16) -> Self {
        Self::new(Vec::new(), status)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

pub fn ok_body(body: serde_json::Value) -> Result<HttpResponse> {
    let body = body.as_object().cloned().unwrap_or_default();
    Ok(HttpResponse {
        status: 200,
        body: Some(body),
    })
}

pub fn status(status: u16) -> Result<HttpResponse> {
    Ok(HttpResponse { status, body: None })
}

pub fn network_error() -> Result<HttpResponse> {
    Err(Error::Network("connection reset".into()))
}

impl Transport for ScriptedTransport {
    async fn get(
        &self,
        request: &ScrapeRequest,
        proxy: Option<&str>,
        headers: &[(String, String)],
    ) -> Result<HttpResponse> {
        self.calls.lock().unwrap().push(Call {
            url: request.url().to_string(),
            proxy: proxy.map(str::to_string),
            user_agent: headers
                .iter()
                .find(|(name, _)| name == "User-Agent")
                .map(|(_, value)| value.clone()),
        });
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(outcome) => outcome,
            None if (200..300).contains(&self.fallback) => {
                ok_body(json!({ "url": request.url() }))
            }
            None => status(self.fallback),
        }
    }
}

/// Emits `count` plain requests to `https://example.com/<i>`.
pub struct VecSource {
    requests: Vec<ScrapeRequest>,
    index: usize,
}

impl VecSource {
    pub fn new(count: usize) -> Self {
        Self {
            requests: (0..count)
                .map(|i| ScrapeRequest::new(format!("https://example.com/{i}"), Payload::new()))
                .collect(),
            index: 0,
        }
    }
}

impl RequestSource for VecSource {
    type Request = ScrapeRequest;

    fn working(&self) -> bool {
        self.index < self.requests.len()
    }

    fn next(&mut self) -> Option<ScrapeRequest> {
        let request = self.requests.get(self.index).cloned()?;
        self.index += 1;
        Some(request)
    }

    fn total_requests(&self) -> usize {
        self.index
    }
}

/// Keeps saved records in memory; optionally fails on the n-th save.
#[derive(Default)]
pub struct MemoryStore {
    pub saved: Vec<(ScrapedData, String)>,
    pub fail_on: Option<usize>,
}

impl DataStore<ScrapedData> for MemoryStore {
    fn save(&mut self, record: &ScrapedData, request: &ScrapeRequest) -> Result<()> {
        if self.fail_on == Some(self.saved.len()) {
            return Err(Error::Io(std::io::Error::other("disk full")));
        }
        self.saved.push((record.clone(), request.url().to_string()));
        Ok(())
    }
}
