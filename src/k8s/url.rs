//! Kubernetes API URL construction
//!
//! Builds request URLs following the Kubernetes API path conventions:
//!
//! ```text
//! {apis|api/v1}/[{apiVersion}/][namespaces/{namespace}/]{kind}/[{name}/]
//! ```
//!
//! followed by the `dryRun`, `watch`, `labelSelector` and `fieldSelector`
//! query parameters, in that order.

use ::url::Url;
use kube::Resource;

use crate::error::MapiError;

/// Equality constraints on resource labels
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabelSelector {
    /// Find all the resources that have these labels set to these values
    pub matching_labels: Vec<(String, String)>,
}

impl LabelSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.matching_labels.push((key.into(), value.into()));
        self
    }

    /// Serialized form, e.g. `a=b,c=d`
    pub fn serialize(&self) -> String {
        serialize_key_value_pairs(&self.matching_labels)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LabelSelector {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            matching_labels: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Equality constraints on resource fields
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldSelector {
    /// Find all the resources that have these fields set to these values
    pub matching_fields: Vec<(String, String)>,
}

impl FieldSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.matching_fields.push((key.into(), value.into()));
        self
    }

    /// Serialized form, e.g. `metadata.name=a`
    pub fn serialize(&self) -> String {
        serialize_key_value_pairs(&self.matching_fields)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldSelector {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            matching_fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Options describing a single Kubernetes API request URL.
///
/// One bag covers every request shape (get, list, watch, create, update,
/// patch, delete); [`create`] rejects contradictory combinations. For a
/// shape-checked alternative see [`RequestOptions`](super::RequestOptions).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UrlOptions {
    /// The Kubernetes API URL
    pub base_url: String,
    /// Resource group and version, e.g. `cluster.x-k8s.io/v1beta1`
    pub api_version: Option<String>,
    /// Address the legacy core API under `/api/v1`
    pub is_core: bool,
    /// Plural resource kind, e.g. `clusters`
    pub kind: Option<String>,
    pub name: Option<String>,
    pub namespace: Option<String>,
    pub label_selector: Option<LabelSelector>,
    pub field_selector: Option<FieldSelector>,
    pub watch: bool,
    pub dry_run: bool,
}

impl UrlOptions {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Options addressing the resource type `K`
    pub fn for_resource<K>(base_url: impl Into<String>) -> Self
    where
        K: Resource<DynamicType = ()>,
    {
        let options = Self::new(base_url).kind(K::plural(&()));

        if K::group(&()).is_empty() {
            options.core()
        } else {
            options.api_version(K::api_version(&()))
        }
    }

    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    pub fn core(mut self) -> Self {
        self.is_core = true;
        self
    }

    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn label_selector(mut self, selector: LabelSelector) -> Self {
        self.label_selector = Some(selector);
        self
    }

    pub fn field_selector(mut self, selector: FieldSelector) -> Self {
        self.field_selector = Some(selector);
        self
    }

    pub fn watch(mut self, watch: bool) -> Self {
        self.watch = watch;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Shorthand for [`create`]
    pub fn build(&self) -> Result<Url, MapiError> {
        create(self)
    }
}

/// Create a URL that can be used to talk to the Kubernetes API.
pub fn create(options: &UrlOptions) -> Result<Url, MapiError> {
    let mut url = Url::parse(&options.base_url)?;

    let namespace_part;
    let mut parts: Vec<&str> = Vec::new();

    match non_empty(&options.api_version) {
        Some(_) if options.is_core => {
            return Err(MapiError::OptionConflict(
                "The option 'apiVersion' cannot be set when 'isCore' is set to true.".to_string(),
            ));
        }
        Some(api_version) => parts.push(api_version),
        None if !options.is_core => {
            return Err(MapiError::MissingOption(
                "The option 'apiVersion' must be set when 'isCore' is set to false.".to_string(),
            ));
        }
        None => {}
    }

    if let Some(namespace) = non_empty(&options.namespace) {
        namespace_part = format!("namespaces/{namespace}");
        parts.push(&namespace_part);
    }

    if let Some(kind) = non_empty(&options.kind) {
        parts.push(kind);
    }

    if let Some(name) = non_empty(&options.name) {
        if options.label_selector.is_some() {
            return Err(MapiError::OptionConflict(
                "The option 'labelSelector' cannot be set when 'name' is present.".to_string(),
            ));
        }

        if options.field_selector.is_some() {
            return Err(MapiError::OptionConflict(
                "The option 'fieldSelector' cannot be set when 'name' is present.".to_string(),
            ));
        }

        parts.push(name);
    } else if options.watch {
        return Err(MapiError::MissingOption(
            "The option 'watch' can only be set when 'name' is present.".to_string(),
        ));
    }

    if !parts.is_empty() {
        let prefix = if options.is_core { "api/v1" } else { "apis" };

        let mut path = url.path().to_string();
        if !path.ends_with('/') {
            path.push('/');
        }
        path.push_str(&format!("{prefix}/{}/", parts.join("/")).to_lowercase());
        url.set_path(&path);
    }

    let mut query: Vec<(&str, String)> = Vec::new();

    if options.dry_run {
        query.push(("dryRun", "true".to_string()));
    }

    if options.watch {
        query.push(("watch", "true".to_string()));
    }

    if let Some(selector) = &options.label_selector {
        let labels = selector.serialize();
        if !labels.is_empty() {
            query.push(("labelSelector", labels));
        }
    }

    if let Some(selector) = &options.field_selector {
        let fields = selector.serialize();
        if !fields.is_empty() {
            query.push(("fieldSelector", fields));
        }
    }

    if !query.is_empty() {
        let mut pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        for (key, value) in query {
            set_query_pair(&mut pairs, key, value);
        }
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }

    Ok(url)
}

/// Set `key` to `value`, replacing the first existing pair in place and
/// dropping any later duplicates
fn set_query_pair(pairs: &mut Vec<(String, String)>, key: &str, value: String) {
    let Some(first) = pairs.iter().position(|(k, _)| k == key) else {
        pairs.push((key.to_string(), value));
        return;
    };

    pairs[first].1 = value;
    let mut index = 0;
    pairs.retain(|(k, _)| {
        let keep = index <= first || k != key;
        index += 1;
        keep
    });
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Join pairs as `k1=v1,k2=v2`, skipping pairs with an empty side
fn serialize_key_value_pairs(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .filter(|(key, value)| !key.is_empty() && !value.is_empty())
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::Secret;

    const BASE: &str = "https://some-url.com";
    const API_VERSION: &str = "some-resource.k8s.io/v1alpha1";

    fn resources() -> UrlOptions {
        UrlOptions::new(BASE)
            .api_version(API_VERSION)
            .kind("resources")
    }

    fn url_of(options: UrlOptions) -> String {
        create(&options).unwrap().to_string()
    }

    fn error_of(options: UrlOptions) -> MapiError {
        create(&options).unwrap_err()
    }

    #[test]
    fn test_list_cluster_scoped() {
        assert_eq!(
            url_of(resources()),
            "https://some-url.com/apis/some-resource.k8s.io/v1alpha1/resources/"
        );
    }

    #[test]
    fn test_get_by_name() {
        assert_eq!(
            url_of(resources().name("bf23a")),
            "https://some-url.com/apis/some-resource.k8s.io/v1alpha1/resources/bf23a/"
        );
    }

    #[test]
    fn test_get_namespaced_by_name() {
        assert_eq!(
            url_of(resources().namespace("some-namespace").name("bf23a")),
            "https://some-url.com/apis/some-resource.k8s.io/v1alpha1/namespaces/some-namespace/resources/bf23a/"
        );
    }

    #[test]
    fn test_list_namespaced() {
        assert_eq!(
            url_of(resources().namespace("some-namespace")),
            "https://some-url.com/apis/some-resource.k8s.io/v1alpha1/namespaces/some-namespace/resources/"
        );
    }

    #[test]
    fn test_dry_run() {
        assert_eq!(
            url_of(resources().namespace("some-namespace").dry_run(true)),
            "https://some-url.com/apis/some-resource.k8s.io/v1alpha1/namespaces/some-namespace/resources/?dryRun=true"
        );
    }

    #[test]
    fn test_empty_label_selector_is_omitted() {
        assert_eq!(
            url_of(
                resources()
                    .namespace("some-namespace")
                    .label_selector(LabelSelector::new())
            ),
            "https://some-url.com/apis/some-resource.k8s.io/v1alpha1/namespaces/some-namespace/resources/"
        );
    }

    #[test]
    fn test_single_label() {
        let selector = LabelSelector::new().label("some-label.some-url.com/something", "test");
        assert_eq!(
            url_of(resources().namespace("some-namespace").label_selector(selector)),
            "https://some-url.com/apis/some-resource.k8s.io/v1alpha1/namespaces/some-namespace/resources/?labelSelector=some-label.some-url.com%2Fsomething%3Dtest"
        );
    }

    #[test]
    fn test_multiple_labels() {
        let selector = LabelSelector::new()
            .label("some-label.some-url.com/something", "test")
            .label("some-other-label.some-url.com/something", "test2");
        assert_eq!(
            url_of(resources().namespace("some-namespace").label_selector(selector)),
            "https://some-url.com/apis/some-resource.k8s.io/v1alpha1/namespaces/some-namespace/resources/?labelSelector=some-label.some-url.com%2Fsomething%3Dtest%2Csome-other-label.some-url.com%2Fsomething%3Dtest2"
        );
    }

    #[test]
    fn test_labels_keep_insertion_order() {
        let selector: LabelSelector = [("a.b/c", "d"), ("e", "f")].into_iter().collect();
        let url = create(&resources().label_selector(selector)).unwrap();
        assert_eq!(url.query(), Some("labelSelector=a.b%2Fc%3Dd%2Ce%3Df"));
    }

    #[test]
    fn test_empty_pairs_are_dropped() {
        let selector = LabelSelector::new()
            .label("", "orphan")
            .label("kept", "yes")
            .label("no-value", "");
        let url = create(&resources().label_selector(selector)).unwrap();
        assert_eq!(url.query(), Some("labelSelector=kept%3Dyes"));

        let only_empty = LabelSelector::new().label("", "").label("k", "");
        let url = create(&resources().label_selector(only_empty)).unwrap();
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_label_selector_conflicts_with_name() {
        let selector = LabelSelector::new().label("a", "b");
        let err = error_of(
            resources()
                .namespace("some-namespace")
                .name("bf23a")
                .label_selector(selector),
        );
        assert!(matches!(err, MapiError::OptionConflict(_)));
        assert_eq!(
            err.to_string(),
            "The option 'labelSelector' cannot be set when 'name' is present."
        );
    }

    #[test]
    fn test_empty_label_selector_still_conflicts_with_name() {
        let err = error_of(resources().name("bf23a").label_selector(LabelSelector::new()));
        assert!(matches!(err, MapiError::OptionConflict(_)));
    }

    #[test]
    fn test_empty_field_selector_is_omitted() {
        assert_eq!(
            url_of(
                resources()
                    .namespace("some-namespace")
                    .field_selector(FieldSelector::new())
            ),
            "https://some-url.com/apis/some-resource.k8s.io/v1alpha1/namespaces/some-namespace/resources/"
        );
    }

    #[test]
    fn test_single_field() {
        let selector = FieldSelector::new().field("metadata.name", "test");
        assert_eq!(
            url_of(resources().namespace("some-namespace").field_selector(selector)),
            "https://some-url.com/apis/some-resource.k8s.io/v1alpha1/namespaces/some-namespace/resources/?fieldSelector=metadata.name%3Dtest"
        );
    }

    #[test]
    fn test_multiple_fields() {
        let selector = FieldSelector::new()
            .field("metadata.name", "test")
            .field("status.ready", "true");
        let url = create(&resources().namespace("some-namespace").field_selector(selector))
            .unwrap();
        assert_eq!(
            url.query(),
            Some("fieldSelector=metadata.name%3Dtest%2Cstatus.ready%3Dtrue")
        );
    }

    #[test]
    fn test_field_selector_conflicts_with_name() {
        let selector = FieldSelector::new()
            .field("metadata.name", "test")
            .field("status.ready", "true");
        let err = error_of(
            resources()
                .namespace("some-namespace")
                .name("bf23a")
                .field_selector(selector),
        );
        assert!(matches!(err, MapiError::OptionConflict(_)));
        assert_eq!(
            err.to_string(),
            "The option 'fieldSelector' cannot be set when 'name' is present."
        );
    }

    #[test]
    fn test_watch() {
        assert_eq!(
            url_of(
                resources()
                    .name("bf23a")
                    .namespace("some-namespace")
                    .watch(true)
            ),
            "https://some-url.com/apis/some-resource.k8s.io/v1alpha1/namespaces/some-namespace/resources/bf23a/?watch=true"
        );
    }

    #[test]
    fn test_watch_requires_name() {
        let err = error_of(resources().namespace("some-namespace").watch(true));
        assert!(matches!(err, MapiError::MissingOption(_)));
        assert_eq!(
            err.to_string(),
            "The option 'watch' can only be set when 'name' is present."
        );
    }

    #[test]
    fn test_api_version_conflicts_with_core() {
        let err = error_of(resources().core());
        assert!(matches!(err, MapiError::OptionConflict(_)));
        assert_eq!(
            err.to_string(),
            "The option 'apiVersion' cannot be set when 'isCore' is set to true."
        );
    }

    #[test]
    fn test_api_version_required_without_core() {
        let err = error_of(UrlOptions::new(BASE).kind("pods"));
        assert!(matches!(err, MapiError::MissingOption(_)));
        assert_eq!(
            err.to_string(),
            "The option 'apiVersion' must be set when 'isCore' is set to false."
        );
    }

    #[test]
    fn test_empty_api_version_counts_as_missing() {
        let err = error_of(UrlOptions::new(BASE).api_version("").kind("pods"));
        assert!(matches!(err, MapiError::MissingOption(_)));
    }

    #[test]
    fn test_core_api() {
        let url = url_of(
            UrlOptions::new("https://x")
                .core()
                .kind("secrets")
                .name("a")
                .namespace("ns"),
        );
        assert_eq!(url, "https://x/api/v1/namespaces/ns/secrets/a/");

        let url = url_of(UrlOptions::new("https://x").api_version("g/v1").kind("pods"));
        assert_eq!(url, "https://x/apis/g/v1/pods/");
    }

    #[test]
    fn test_core_without_segments_keeps_base_path() {
        assert_eq!(url_of(UrlOptions::new("https://x/base").core()), "https://x/base");
    }

    #[test]
    fn test_path_is_lowercased_but_query_is_not() {
        let selector = LabelSelector::new().label("Owner", "Alice");
        let url = create(
            &UrlOptions::new(BASE)
                .api_version("Cluster.X-K8S.io/V1Beta1")
                .namespace("Org-Acme")
                .kind("Clusters")
                .label_selector(selector),
        )
        .unwrap();

        assert_eq!(url.path(), "/apis/cluster.x-k8s.io/v1beta1/namespaces/org-acme/clusters/");
        assert_eq!(url.query(), Some("labelSelector=Owner%3DAlice"));
    }

    #[test]
    fn test_query_precedence() {
        let url = create(
            &resources()
                .namespace("ns")
                .name("a")
                .watch(true)
                .dry_run(true),
        )
        .unwrap();
        assert_eq!(url.query(), Some("dryRun=true&watch=true"));

        let url = create(
            &resources()
                .field_selector(FieldSelector::new().field("f", "1"))
                .label_selector(LabelSelector::new().label("l", "2")),
        )
        .unwrap();
        assert_eq!(url.query(), Some("labelSelector=l%3D2&fieldSelector=f%3D1"));
    }

    #[test]
    fn test_base_url_with_path() {
        assert_eq!(
            url_of(UrlOptions::new("https://x/proxy").core().kind("pods")),
            "https://x/proxy/api/v1/pods/"
        );
        assert_eq!(
            url_of(UrlOptions::new("https://x/proxy/").core().kind("pods")),
            "https://x/proxy/api/v1/pods/"
        );
    }

    #[test]
    fn test_base_query_keys_are_replaced() {
        let url = create(
            &UrlOptions::new("https://x/?dryRun=false&keep=1")
                .core()
                .kind("pods")
                .dry_run(true),
        )
        .unwrap();
        assert_eq!(url.as_str(), "https://x/api/v1/pods/?dryRun=true&keep=1");

        let url = create(
            &UrlOptions::new("https://x/?watch=false&keep=1&watch=0")
                .core()
                .kind("pods")
                .name("a")
                .watch(true)
                .dry_run(true),
        )
        .unwrap();
        assert_eq!(url.query(), Some("watch=true&keep=1&dryRun=true"));
    }

    #[test]
    fn test_base_query_kept_without_generated_params() {
        let url = create(&UrlOptions::new("https://x/?keep=1").core().kind("pods")).unwrap();
        assert_eq!(url.as_str(), "https://x/api/v1/pods/?keep=1");
    }

    #[test]
    fn test_invalid_base_url() {
        let err = error_of(UrlOptions::new("not a url").core().kind("pods"));
        assert!(matches!(err, MapiError::InvalidUrl(_)));
    }

    #[test]
    fn test_deterministic() {
        let options = resources()
            .namespace("ns")
            .label_selector(LabelSelector::new().label("a", "b").label("c", "d"))
            .dry_run(true);
        assert_eq!(create(&options).unwrap(), options.build().unwrap());
    }

    #[test]
    fn test_for_core_resource() {
        let options = UrlOptions::for_resource::<Secret>(BASE).namespace("default");
        assert!(options.is_core);
        assert_eq!(options.api_version, None);
        assert_eq!(
            url_of(options),
            "https://some-url.com/api/v1/namespaces/default/secrets/"
        );
    }
}
