//! Common Kubernetes API machinery types
//!
//! List envelopes and `Status` failure classification.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ListMeta;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A collection of resources as returned by list endpoints
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct List<T> {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub metadata: ListMeta,
    pub items: Vec<T>,
}

/// Reasons a Kubernetes API call can fail with
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatusReason {
    Unknown,
    Unauthorized,
    Forbidden,
    NotFound,
    AlreadyExists,
    Conflict,
    Gone,
    Invalid,
    ServerTimeout,
    Timeout,
    TooManyRequests,
    BadRequest,
    NotAllowed,
    NotAcceptable,
    EntityTooLarge,
    UnsupportedMediaType,
    InternalError,
    Expired,
    ServiceUnavailable,
}

impl StatusReason {
    /// The `reason` string used on the wire
    pub fn as_str(self) -> &'static str {
        match self {
            StatusReason::Unknown => "",
            StatusReason::Unauthorized => "Unauthorized",
            StatusReason::Forbidden => "Forbidden",
            StatusReason::NotFound => "NotFound",
            StatusReason::AlreadyExists => "AlreadyExists",
            StatusReason::Conflict => "Conflict",
            StatusReason::Gone => "Gone",
            StatusReason::Invalid => "Invalid",
            StatusReason::ServerTimeout => "ServerTimeout",
            StatusReason::Timeout => "Timeout",
            StatusReason::TooManyRequests => "TooManyRequests",
            StatusReason::BadRequest => "BadRequest",
            StatusReason::NotAllowed => "NotAllowed",
            StatusReason::NotAcceptable => "NotAcceptable",
            StatusReason::EntityTooLarge => "EntityTooLarge",
            StatusReason::UnsupportedMediaType => "UnsupportedMediaType",
            StatusReason::InternalError => "InternalError",
            StatusReason::Expired => "Expired",
            StatusReason::ServiceUnavailable => "ServiceUnavailable",
        }
    }

    /// HTTP status code the API server pairs with this reason
    pub fn code(self) -> u16 {
        match self {
            StatusReason::Unknown => 500,
            StatusReason::Unauthorized => 401,
            StatusReason::Forbidden => 403,
            StatusReason::NotFound => 404,
            StatusReason::AlreadyExists => 409,
            StatusReason::Conflict => 409,
            StatusReason::Gone => 410,
            StatusReason::Invalid => 422,
            StatusReason::ServerTimeout => 500,
            StatusReason::Timeout => 504,
            StatusReason::TooManyRequests => 429,
            StatusReason::BadRequest => 400,
            StatusReason::NotAllowed => 405,
            StatusReason::NotAcceptable => 406,
            StatusReason::EntityTooLarge => 413,
            StatusReason::UnsupportedMediaType => 415,
            StatusReason::InternalError => 500,
            StatusReason::Expired => 410,
            StatusReason::ServiceUnavailable => 503,
        }
    }
}

/// Check whether `data` is a failed `Status` object with the given reason
pub fn is_status_error(data: &Value, reason: StatusReason) -> bool {
    data.get("kind").and_then(Value::as_str) == Some("Status")
        && data.get("status").and_then(Value::as_str) == Some("Failure")
        && data.get("reason").and_then(Value::as_str).unwrap_or("") == reason.as_str()
}
