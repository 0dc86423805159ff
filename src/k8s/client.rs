//! Management API resource client
//!
//! Authenticated get/create/update/patch/delete helpers over an
//! [`HttpTransport`], plus list fetching that retries responses missing
//! their `items`.

use ::url::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

use super::metav1::StatusReason;
use crate::auth::{AuthProvider, StaticAuthProvider};
use crate::config::MapiConfig;
use crate::error::MapiError;
use crate::http::{HttpClient, HttpMethod, HttpRequestConfig, HttpTransport};
use crate::telemetry::{ErrorReporter, TracingReporter};

/// Maximum number of attempts made by [`MapiClient::get_list_resource`]
pub const MAX_LIST_ATTEMPTS: u32 = 5;

const LIST_RETRY_STEP: Duration = Duration::from_millis(1000);
const MAX_LIST_RETRY_DELAY: Duration = Duration::from_millis(5000);

const CONTENT_TYPE_JSON: &str = "application/json";
const CONTENT_TYPE_MERGE_PATCH: &str = "application/merge-patch+json";

/// Delay before retrying after the given failed list attempt
pub fn list_retry_delay(attempt: u32) -> Duration {
    (LIST_RETRY_STEP * attempt).min(MAX_LIST_RETRY_DELAY)
}

/// Client for management API resources.
///
/// Every request re-resolves the logged-in user and fully reconfigures the
/// transport. Requests take `&mut self`, so one transport never serves two
/// requests at once.
pub struct MapiClient<T> {
    base_url: String,
    transport: T,
    auth: Arc<dyn AuthProvider>,
    reporter: Arc<dyn ErrorReporter>,
}

impl MapiClient<HttpClient> {
    /// Build a reqwest-backed client from configuration
    pub fn from_config(config: &MapiConfig) -> Result<Self, MapiError> {
        let transport = HttpClient::with_timeout(config.timeout_secs)?;
        let auth = StaticAuthProvider::from_config(config.auth.as_ref());

        Ok(Self::new(
            config.api_url.clone(),
            transport,
            Arc::new(auth),
            Arc::new(TracingReporter),
        ))
    }
}

impl<T: HttpTransport> MapiClient<T> {
    pub fn new(
        base_url: impl Into<String>,
        transport: T,
        auth: Arc<dyn AuthProvider>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            transport,
            auth,
            reporter,
        }
    }

    /// The management API URL requests are built against
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch a single resource
    pub async fn get_resource<R: DeserializeOwned>(&mut self, url: &Url) -> Result<R, MapiError> {
        let data = self.execute(HttpMethod::Get, url, None).await?;
        Ok(serde_json::from_value(data)?)
    }

    /// Create a resource
    pub async fn create_resource<R, B>(&mut self, url: &Url, body: &B) -> Result<R, MapiError>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        let data = self.execute(HttpMethod::Post, url, Some(body)).await?;
        Ok(serde_json::from_value(data)?)
    }

    /// Replace a resource
    pub async fn update_resource<R, B>(&mut self, url: &Url, body: &B) -> Result<R, MapiError>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        let data = self.execute(HttpMethod::Put, url, Some(body)).await?;
        Ok(serde_json::from_value(data)?)
    }

    /// Apply a JSON merge patch to a resource
    pub async fn patch_resource<R, B>(&mut self, url: &Url, patch: &B) -> Result<R, MapiError>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(patch)?;
        let data = self.execute(HttpMethod::Patch, url, Some(body)).await?;
        Ok(serde_json::from_value(data)?)
    }

    /// Delete a resource, or a collection when `url` carries selectors
    pub async fn delete_resource<R: DeserializeOwned>(
        &mut self,
        url: &Url,
    ) -> Result<R, MapiError> {
        let data = self.execute(HttpMethod::Delete, url, None).await?;
        Ok(serde_json::from_value(data)?)
    }

    /// Fetch a collection.
    ///
    /// A response without an `items` field is treated as transient: it is
    /// reported and the request is retried with a linearly growing delay, up
    /// to [`MAX_LIST_ATTEMPTS`] attempts in total. Transport errors are not
    /// retried.
    pub async fn get_list_resource<R: DeserializeOwned>(
        &mut self,
        url: &Url,
    ) -> Result<R, MapiError> {
        let mut attempt = 1;

        loop {
            let response: Value = self.get_resource(url).await?;
            if response.get("items").is_some() {
                return Ok(serde_json::from_value(response)?);
            }

            self.reporter.notify(
                "List response is missing its items",
                &json!({
                    "url": url.as_str(),
                    "attempt": attempt,
                }),
            );

            if attempt >= MAX_LIST_ATTEMPTS {
                info!("Giving up on {} after {} attempts", url, attempt);
                return Err(MapiError::ListFetchTimeout {
                    request: Box::new(self.transport.request_config()),
                    status: StatusReason::Timeout.code(),
                });
            }

            let delay = list_retry_delay(attempt);
            debug!("Retrying {} in {}ms", url, delay.as_millis());
            sleep(delay).await;
            attempt += 1;
        }
    }

    async fn authorize(&mut self) -> Result<(), MapiError> {
        let user = self
            .auth
            .get_logged_in_user()
            .await?
            .ok_or(MapiError::Unauthenticated)?;

        if user.is_expired() {
            return Err(MapiError::CredentialExpired);
        }

        self.transport
            .set_authorization_token(&user.authorization_type, &user.id_token);

        Ok(())
    }

    async fn execute(
        &mut self,
        method: HttpMethod,
        url: &Url,
        body: Option<Value>,
    ) -> Result<Value, MapiError> {
        self.authorize().await?;

        let content_type = match method {
            HttpMethod::Patch => CONTENT_TYPE_MERGE_PATCH,
            _ => CONTENT_TYPE_JSON,
        };

        let mut config = HttpRequestConfig::new(method, url.as_str())
            .header("Accept", CONTENT_TYPE_JSON)
            .header("Content-Type", content_type);
        if let Some(body) = body {
            config = config.body(body);
        }

        debug!("{} {}", method, url);
        self.transport.set_request_config(config);
        let response = self.transport.execute().await?;

        Ok(response.data)
    }
}
