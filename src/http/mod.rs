//! HTTP transport module
//!
//! Provides the transport used to talk to the management API.

mod client;

pub use client::{
    GenericResponse, HttpClient, HttpError, HttpMethod, HttpRequestConfig, HttpTransport,
    DEFAULT_TIMEOUT_SECS,
};
