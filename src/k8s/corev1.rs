//! Core API (`v1`) resources

use k8s_openapi::api::core::v1::{Namespace, Secret};
use serde_json::Value;

use super::client::MapiClient;
use super::metav1::List;
use super::url::{LabelSelector, UrlOptions};
use crate::error::MapiError;
use crate::http::HttpTransport;

pub const CONDITION_TRUE: &str = "True";
pub const CONDITION_FALSE: &str = "False";
pub const CONDITION_UNKNOWN: &str = "Unknown";

pub type SecretList = List<Secret>;

pub async fn get_secret<T: HttpTransport>(
    client: &mut MapiClient<T>,
    namespace: &str,
    name: &str,
) -> Result<Secret, MapiError> {
    let url = UrlOptions::for_resource::<Secret>(client.base_url())
        .namespace(namespace)
        .name(name)
        .build()?;

    client.get_resource(&url).await
}

pub async fn get_secret_list<T: HttpTransport>(
    client: &mut MapiClient<T>,
    namespace: &str,
    label_selector: Option<LabelSelector>,
) -> Result<SecretList, MapiError> {
    let mut options = UrlOptions::for_resource::<Secret>(client.base_url()).namespace(namespace);
    options.label_selector = label_selector;

    client.get_list_resource(&options.build()?).await
}

/// Create `secret` in `namespace`; with `dry_run` the server only validates it
pub async fn create_secret<T: HttpTransport>(
    client: &mut MapiClient<T>,
    namespace: &str,
    secret: &Secret,
    dry_run: bool,
) -> Result<Secret, MapiError> {
    let url = UrlOptions::for_resource::<Secret>(client.base_url())
        .namespace(namespace)
        .dry_run(dry_run)
        .build()?;

    client.create_resource(&url, secret).await
}

/// Delete a secret; returns the server's `Status` or the deleted object
pub async fn delete_secret<T: HttpTransport>(
    client: &mut MapiClient<T>,
    namespace: &str,
    name: &str,
) -> Result<Value, MapiError> {
    let url = UrlOptions::for_resource::<Secret>(client.base_url())
        .namespace(namespace)
        .name(name)
        .build()?;

    client.delete_resource(&url).await
}

pub async fn get_namespace<T: HttpTransport>(
    client: &mut MapiClient<T>,
    name: &str,
) -> Result<Namespace, MapiError> {
    let url = UrlOptions::for_resource::<Namespace>(client.base_url())
        .name(name)
        .build()?;

    client.get_resource(&url).await
}
