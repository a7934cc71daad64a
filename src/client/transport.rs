//! HTTP transport
//!
//! This module handles every HTTP exchange with the platform, including:
//! - Building a fresh HTTP client per attempt (timeout and proxy applied)
//! - Normalizing responses into a typed [`Payload`]
//! - Bounded retry with a fixed wait between attempts
//! - Error classification

use crate::config::ClientConfig;
use crate::{Result, ZhihuError};
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, Proxy, StatusCode};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;

/// Outcome of a successful exchange
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Parsed JSON body
    Json(Value),

    /// Raw body, returned when the caller asked for text
    Text(String),

    /// HTTP 404: the platform's answer for a post with no comments
    Empty,
}

impl Payload {
    /// Whether the payload carries no data
    ///
    /// `Empty`, JSON `null` and an empty JSON object or array all count as
    /// empty; a walk treats any of them as the natural end of data.
    pub fn is_empty(&self) -> bool {
        match self {
            Payload::Empty => true,
            Payload::Json(Value::Null) => true,
            Payload::Json(Value::Object(map)) => map.is_empty(),
            Payload::Json(Value::Array(items)) => items.is_empty(),
            Payload::Json(_) => false,
            Payload::Text(text) => text.is_empty(),
        }
    }

    /// Borrows the JSON body, if any
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Takes the JSON body unless the payload is empty
    pub fn into_json(self) -> Option<Value> {
        if self.is_empty() {
            return None;
        }
        match self {
            Payload::Json(value) => Some(value),
            _ => None,
        }
    }
}

/// A request as handed to the transport
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,

    /// Return the body verbatim instead of parsing it as JSON
    pub raw_text: bool,
}

impl HttpRequest {
    /// Creates a GET request with no headers or parameters
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            headers: HeaderMap::new(),
            raw_text: false,
        }
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn raw_text(mut self) -> Self {
        self.raw_text = true;
        self
    }
}

/// Fixed-wait retry with a bounded number of attempts
///
/// Only errors for which [`ZhihuError::is_retryable`] holds are retried; the
/// last error is returned once attempts are exhausted.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, wait: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            wait,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Runs `op` until it succeeds, fails terminally, or attempts run out
    ///
    /// # Arguments
    ///
    /// * `target` - Label used in log lines (usually the URL)
    /// * `op` - Produces one attempt each time it is called
    pub async fn run<T, F, Fut>(&self, target: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    tracing::warn!(
                        "Attempt {}/{} for {} failed: {}; retrying in {:?}",
                        attempt,
                        self.max_attempts,
                        target,
                        e,
                        self.wait
                    );
                    tokio::time::sleep(self.wait).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Builds an HTTP client for a single request attempt
///
/// # Arguments
///
/// * `timeout` - Total timeout for the request
/// * `proxy` - Optional proxy URL routing all traffic
pub fn build_http_client(
    timeout: Duration,
    proxy: Option<&str>,
) -> std::result::Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true);

    if let Some(proxy) = proxy {
        builder = builder.proxy(Proxy::all(proxy)?);
    }

    builder.build()
}

/// Sends requests and interprets platform responses
#[derive(Debug, Clone)]
pub struct Transport {
    timeout: Duration,
    proxy: Option<String>,
    retry: RetryPolicy,
}

impl Transport {
    pub fn new(timeout: Duration, proxy: Option<String>, retry: RetryPolicy) -> Self {
        Self {
            timeout,
            proxy,
            retry,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(
            Duration::from_secs(config.timeout_secs),
            config.proxy.clone(),
            RetryPolicy::new(config.max_attempts, Duration::from_millis(config.retry_wait_ms)),
        )
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Executes a request under the retry policy
    ///
    /// `build` is called at the start of every attempt, so work that must be
    /// redone per attempt (signing) happens there. An error from `build`
    /// counts as a failed attempt.
    pub async fn execute<F, Fut>(&self, target: &str, mut build: F) -> Result<Payload>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<HttpRequest>>,
    {
        self.retry
            .run(target, || {
                let request = build();
                async move {
                    let request = request.await?;
                    self.attempt(&request).await
                }
            })
            .await
    }

    /// Performs exactly one attempt
    ///
    /// # Response handling
    ///
    /// | Condition | Outcome |
    /// |-----------|---------|
    /// | HTTP 403 | `Forbidden` with the raw body |
    /// | HTTP 404 | `Payload::Empty` |
    /// | Other non-2xx | `Fetch` with the raw body |
    /// | 2xx, raw text requested | `Payload::Text` |
    /// | 2xx, body is not JSON | `Fetch` with the raw body |
    /// | 2xx, JSON has an `error` field | `Fetch` with its message |
    /// | 2xx, JSON | `Payload::Json` |
    pub async fn attempt(&self, request: &HttpRequest) -> Result<Payload> {
        let client = build_http_client(self.timeout, self.proxy.as_deref())?;

        let response = client
            .request(request.method.clone(), &request.url)
            .headers(request.headers.clone())
            .send()
            .await
            .map_err(|e| classify_error(&request.url, e))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| classify_error(&request.url, e))?;

        interpret_response(&request.url, status, body, request.raw_text)
    }
}

/// Maps a response status and body to a payload or a typed failure
fn interpret_response(
    url: &str,
    status: StatusCode,
    body: String,
    raw_text: bool,
) -> Result<Payload> {
    if status == StatusCode::NOT_FOUND {
        tracing::debug!("Request to {} returned 404, treating as empty", url);
        return Ok(Payload::Empty);
    }

    if status == StatusCode::FORBIDDEN {
        tracing::error!("Request to {} was forbidden: {}", url, body);
        return Err(ZhihuError::Forbidden {
            url: url.to_string(),
            body,
        });
    }

    if !status.is_success() {
        tracing::error!("Request to {} failed with {}: {}", url, status, body);
        return Err(ZhihuError::Fetch {
            url: url.to_string(),
            message: body,
        });
    }

    if raw_text {
        return Ok(Payload::Text(body));
    }

    let value: Value = match serde_json::from_str(&body) {
        Ok(value) => value,
        Err(_) => {
            tracing::error!("Response from {} is not valid JSON: {}", url, body);
            return Err(ZhihuError::Fetch {
                url: url.to_string(),
                message: body,
            });
        }
    };

    if let Some(error) = value.get("error").filter(|e| is_truthy(e)) {
        tracing::error!("Request to {} returned an application error: {}", url, error);
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(ZhihuError::Fetch {
            url: url.to_string(),
            message,
        });
    }

    Ok(Payload::Json(value))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Number(_) => true,
    }
}

fn classify_error(url: &str, error: reqwest::Error) -> ZhihuError {
    if error.is_timeout() {
        ZhihuError::Timeout {
            url: url.to_string(),
        }
    } else {
        ZhihuError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}
