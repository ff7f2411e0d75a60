//! `reqwest`-backed [`Transport`].

use super::{HttpResponse, Transport};
use crate::error::{Error, Result};
use crate::models::ScrapeRequest;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Proxy};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, instrument};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Real HTTP transport.
///
/// Unproxied calls share one pooled [`Client`]. A proxied call builds a client
/// routed through that proxy (`http://`, `https://` or `socks5://`), so every
/// attempt opens a fresh circuit.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, timeout })
    }

    fn client_for(&self, proxy: Option<&str>) -> Result<Client> {
        match proxy {
            None => Ok(self.client.clone()),
            Some(proxy) => Ok(Client::builder()
                .proxy(Proxy::all(proxy)?)
                .timeout(self.timeout)
                .build()?),
        }
    }
}

fn header_map(headers: &[(String, String)]) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let invalid = |reason: String| Error::InvalidHeader {
            name: name.clone(),
            reason,
        };
        let key = HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
        let value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
        map.insert(key, value);
    }
    Ok(map)
}

impl Transport for HttpTransport {
    #[instrument(level = "debug", skip_all, fields(url = %request.url(), proxy = ?proxy))]
    async fn get(
        &self,
        request: &ScrapeRequest,
        proxy: Option<&str>,
        headers: &[(String, String)],
    ) -> Result<HttpResponse> {
        let t0 = Instant::now();
        let response = self
            .client_for(proxy)?
            .get(request.url())
            .query(request.payload())
            .headers(header_map(headers)?)
            .send()
            .await?;

        let status = response.status().as_u16();
        debug!(status, elapsed_ms = t0.elapsed().as_millis() as u64, "Received response");

        if !response.status().is_success() {
            return Ok(HttpResponse { status, body: None });
        }

        let body = match response.json::<Value>().await? {
            Value::Object(map) => map,
            other => {
                return Err(Error::UnexpectedPayload(format!(
                    "expected a JSON object, got {}",
                    kind(&other)
                )));
            }
        };
        Ok(HttpResponse {
            status,
            body: Some(body),
        })
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
