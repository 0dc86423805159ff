//! Kubernetes management API access
//!
//! URL construction, typed request shapes, the resource client and
//! per-kind helpers.

pub mod capiv1beta1;
mod client;
pub mod corev1;
pub mod metav1;
mod request;
mod url;

pub use client::{list_retry_delay, MapiClient, MAX_LIST_ATTEMPTS};
pub use request::{ApiGroupVersion, DeleteTarget, RequestOptions, ResourceTarget};
pub use url::{create, FieldSelector, LabelSelector, UrlOptions};
