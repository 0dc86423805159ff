//! Typed request shapes
//!
//! Each variant carries exactly the options valid for one kind of request,
//! so the option conflicts [`create`](super::url::create) checks at runtime
//! cannot be expressed here.

use ::url::Url;
use kube::Resource;

use super::url::{FieldSelector, LabelSelector, UrlOptions};
use crate::error::MapiError;

/// How a resource type is addressed
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiGroupVersion {
    /// The legacy core API under `/api/v1`
    Core,
    /// A named group and version, e.g. `apps/v1`
    Group(String),
}

/// The resource type a request is made against
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceTarget {
    pub base_url: String,
    pub api: ApiGroupVersion,
    /// Plural resource kind
    pub kind: String,
}

impl ResourceTarget {
    pub fn new(base_url: impl Into<String>, api: ApiGroupVersion, kind: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api,
            kind: kind.into(),
        }
    }

    /// Target for the resource type `K`
    pub fn of<K>(base_url: impl Into<String>) -> Self
    where
        K: Resource<DynamicType = ()>,
    {
        let api = if K::group(&()).is_empty() {
            ApiGroupVersion::Core
        } else {
            ApiGroupVersion::Group(K::api_version(&()).into_owned())
        };

        Self::new(base_url, api, K::plural(&()))
    }

    fn url_options(&self) -> UrlOptions {
        let options = UrlOptions::new(self.base_url.clone()).kind(self.kind.clone());
        match &self.api {
            ApiGroupVersion::Core => options.core(),
            ApiGroupVersion::Group(api_version) => options.api_version(api_version.clone()),
        }
    }
}

/// What a delete request removes
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeleteTarget {
    /// A single named resource
    Named(String),
    /// Every resource matching the selectors
    Matching {
        label_selector: Option<LabelSelector>,
        field_selector: Option<FieldSelector>,
    },
}

/// A Kubernetes API request, one variant per request kind
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RequestOptions {
    Get {
        target: ResourceTarget,
        name: String,
        namespace: Option<String>,
    },
    List {
        target: ResourceTarget,
        namespace: Option<String>,
        label_selector: Option<LabelSelector>,
        field_selector: Option<FieldSelector>,
    },
    Watch {
        target: ResourceTarget,
        name: String,
        namespace: String,
    },
    Create {
        target: ResourceTarget,
        namespace: String,
        dry_run: bool,
    },
    Update {
        target: ResourceTarget,
        name: String,
        namespace: String,
        dry_run: bool,
    },
    Patch {
        target: ResourceTarget,
        name: String,
        namespace: String,
        dry_run: bool,
    },
    Delete {
        target: ResourceTarget,
        namespace: String,
        selection: DeleteTarget,
    },
}

impl RequestOptions {
    pub fn target(&self) -> &ResourceTarget {
        match self {
            RequestOptions::Get { target, .. }
            | RequestOptions::List { target, .. }
            | RequestOptions::Watch { target, .. }
            | RequestOptions::Create { target, .. }
            | RequestOptions::Update { target, .. }
            | RequestOptions::Patch { target, .. }
            | RequestOptions::Delete { target, .. } => target,
        }
    }

    /// Lower into the flat option bag understood by the URL builder
    pub fn to_url_options(&self) -> UrlOptions {
        let options = self.target().url_options();

        match self {
            RequestOptions::Get {
                name, namespace, ..
            } => with_namespace(options.name(name.clone()), namespace.as_ref()),
            RequestOptions::List {
                namespace,
                label_selector,
                field_selector,
                ..
            } => UrlOptions {
                label_selector: label_selector.clone(),
                field_selector: field_selector.clone(),
                ..with_namespace(options, namespace.as_ref())
            },
            RequestOptions::Watch {
                name, namespace, ..
            } => options
                .name(name.clone())
                .namespace(namespace.clone())
                .watch(true),
            RequestOptions::Create {
                namespace, dry_run, ..
            } => options.namespace(namespace.clone()).dry_run(*dry_run),
            RequestOptions::Update {
                name,
                namespace,
                dry_run,
                ..
            }
            | RequestOptions::Patch {
                name,
                namespace,
                dry_run,
                ..
            } => options
                .name(name.clone())
                .namespace(namespace.clone())
                .dry_run(*dry_run),
            RequestOptions::Delete {
                namespace,
                selection,
                ..
            } => {
                let options = options.namespace(namespace.clone());
                match selection {
                    DeleteTarget::Named(name) => options.name(name.clone()),
                    DeleteTarget::Matching {
                        label_selector,
                        field_selector,
                    } => UrlOptions {
                        label_selector: label_selector.clone(),
                        field_selector: field_selector.clone(),
                        ..options
                    },
                }
            }
        }
    }

    pub fn to_url(&self) -> Result<Url, MapiError> {
        self.to_url_options().build()
    }
}

fn with_namespace(options: UrlOptions, namespace: Option<&String>) -> UrlOptions {
    match namespace {
        Some(namespace) => options.namespace(namespace.clone()),
        None => options,
    }
}
