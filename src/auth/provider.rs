//! Auth providers
//!
//! An auth provider hands out the currently logged-in user, if any.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::error::MapiError;

/// The identity requests are made on behalf of
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedInUser {
    /// Authorization scheme, e.g. `Bearer`
    pub authorization_type: String,

    /// The credential sent with each request
    pub id_token: String,

    /// Credential expiry in seconds since the Unix epoch
    pub expires_at: i64,
}

impl LoggedInUser {
    pub fn new(
        authorization_type: impl Into<String>,
        id_token: impl Into<String>,
        expires_at: i64,
    ) -> Self {
        Self {
            authorization_type: authorization_type.into(),
            id_token: id_token.into(),
            expires_at,
        }
    }

    /// Whether the credential expired before `now` (Unix seconds)
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at < now
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }
}

/// Source of the logged-in user
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Resolve the current user, or `None` when nobody is logged in
    async fn get_logged_in_user(&self) -> Result<Option<LoggedInUser>, MapiError>;
}

/// Provider that always returns the same user
#[derive(Clone, Debug, Default)]
pub struct StaticAuthProvider {
    user: Option<LoggedInUser>,
}

impl StaticAuthProvider {
    pub fn new(user: LoggedInUser) -> Self {
        Self { user: Some(user) }
    }

    /// Provider with nobody logged in
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn from_config(config: Option<&AuthConfig>) -> Self {
        let user = config.map(|auth| {
            LoggedInUser::new(
                auth.authorization_type.clone(),
                auth.id_token.clone(),
                auth.expires_at,
            )
        });

        Self { user }
    }
}

#[async_trait]
impl AuthProvider for StaticAuthProvider {
    async fn get_logged_in_user(&self) -> Result<Option<LoggedInUser>, MapiError> {
        Ok(self.user.clone())
    }
}
