//! Management API client - Kubernetes resource access for cluster management
//!
//! Builds Kubernetes REST URLs from typed options, executes authenticated
//! requests through a pluggable HTTP transport and retries list requests
//! whose responses arrive without `items`.
//!
//! ## Features
//!
//! - URL construction for core and grouped APIs with selectors, watch and dry-run
//! - Typed request shapes that rule out invalid option combinations
//! - Get, list, create, update, patch and delete helpers decoding into typed resources
//! - Cluster API (`cluster.x-k8s.io/v1beta1`) and core `v1` resource helpers
//! - YAML/JSON configuration with `MAPI_*` environment overrides
//!
//! ## Usage
//!
//! ```no_run
//! use mapi_client::config::MapiConfig;
//! use mapi_client::k8s::capiv1beta1;
//! use mapi_client::MapiClient;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = MapiConfig::load_default()?;
//! let mut client = MapiClient::from_config(&config)?;
//! let clusters = capiv1beta1::get_cluster_list(&mut client, Some("org-acme"), None).await?;
//! println!("{} clusters", clusters.items.len());
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod k8s;
pub mod telemetry;
pub mod utils;

pub use error::MapiError;
pub use k8s::{create, MapiClient, RequestOptions, UrlOptions};
