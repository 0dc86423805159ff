//! HTTP transport for management API requests
//!
//! Provides a reconfigurable, reqwest-backed HTTP client.

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Client, Method,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// HTTP client errors
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    #[error("Connection refused to {0}")]
    ConnectionRefused(String),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Request to {url} failed with status {status}: {message}")]
    Response {
        url: String,
        status: u16,
        message: String,
        data: Value,
    },
}

impl HttpError {
    /// Status code of the server response, if one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Response { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// HTTP request methods
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    fn to_reqwest(self) -> Method {
        match self {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration of a single request
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HttpRequestConfig {
    pub url: String,
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    pub body: Option<Value>,
}

impl HttpRequestConfig {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Decoded server response
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenericResponse {
    pub status: u16,
    pub message: String,
    pub headers: HashMap<String, String>,
    pub data: Value,
    pub request_config: HttpRequestConfig,
}

impl GenericResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn get_header(&self, name: &str) -> Option<&String> {
        self.headers.get(&name.to_lowercase())
    }
}

/// A transport that is configured per request and then executed.
///
/// Setting a new request config replaces the previous one entirely. The
/// authorization token is kept apart from it and survives reconfiguration.
#[async_trait]
pub trait HttpTransport: Send {
    /// Replace the current request configuration
    fn set_request_config(&mut self, config: HttpRequestConfig);

    /// Snapshot of the current request configuration
    fn request_config(&self) -> HttpRequestConfig;

    /// Send `Authorization: <auth_type> <token>` with every request
    fn set_authorization_token(&mut self, auth_type: &str, token: &str);

    /// Execute the configured request
    async fn execute(&mut self) -> Result<GenericResponse, HttpError>;
}

/// reqwest-backed transport
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    request_config: HttpRequestConfig,
    authorization: Option<String>,
    timeout_secs: u64,
}

impl HttpClient {
    /// Create a new HTTP client with the default timeout
    pub fn new() -> Result<Self, HttpError> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    /// Create client with custom timeout
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| HttpError::RequestFailed(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            request_config: HttpRequestConfig::default(),
            authorization: None,
            timeout_secs,
        })
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    fn header_map(&self) -> Result<HeaderMap, HttpError> {
        let mut headers = HeaderMap::new();

        for (key, value) in &self.request_config.headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|_| HttpError::InvalidHeader(key.clone()))?;
            let value =
                HeaderValue::from_str(value).map_err(|_| HttpError::InvalidHeader(key.clone()))?;
            headers.insert(name, value);
        }

        if let Some(authorization) = &self.authorization {
            let value = HeaderValue::from_str(authorization)
                .map_err(|_| HttpError::InvalidHeader("Authorization".to_string()))?;
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }

        Ok(headers)
    }
}

#[async_trait]
impl HttpTransport for HttpClient {
    fn set_request_config(&mut self, config: HttpRequestConfig) {
        self.request_config = config;
    }

    fn request_config(&self) -> HttpRequestConfig {
        self.request_config.clone()
    }

    fn set_authorization_token(&mut self, auth_type: &str, token: &str) {
        self.authorization = Some(format!("{auth_type} {token}"));
    }

    async fn execute(&mut self) -> Result<GenericResponse, HttpError> {
        let config = self.request_config.clone();
        debug!("Sending {} request to {}", config.method, config.url);

        let mut req_builder = self
            .client
            .request(config.method.to_reqwest(), &config.url)
            .headers(self.header_map()?);

        if let Some(body) = &config.body {
            req_builder = req_builder.body(body.to_string());
        }

        let response = req_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                HttpError::Timeout(self.timeout_secs)
            } else if e.is_connect() {
                HttpError::ConnectionRefused(config.url.clone())
            } else {
                HttpError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();
        let message = status.canonical_reason().unwrap_or("").to_string();

        let mut headers = HashMap::new();
        for (key, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(key.to_string(), v.to_string());
            }
        }

        let text = response
            .text()
            .await
            .map_err(|e| HttpError::RequestFailed(format!("Failed to read response body: {e}")))?;
        let data = decode_body(&text);

        debug!("Response: {} {}", status.as_u16(), message);

        if !status.is_success() {
            return Err(HttpError::Response {
                url: config.url,
                status: status.as_u16(),
                message,
                data,
            });
        }

        Ok(GenericResponse {
            status: status.as_u16(),
            message,
            headers,
            data,
            request_config: config,
        })
    }
}

/// Decode a response body as JSON, keeping non-JSON bodies as plain strings
fn decode_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }

    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
