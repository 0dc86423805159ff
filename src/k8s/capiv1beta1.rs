//! Cluster API (`cluster.x-k8s.io/v1beta1`) resources
//!
//! Cluster and MachineDeployment types, their fetch helpers, and accessors
//! for the labels, annotations and conditions the platform relies on.

use k8s_openapi::api::core::v1::ObjectReference;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::client::MapiClient;
use super::corev1::{CONDITION_FALSE, CONDITION_TRUE, CONDITION_UNKNOWN};
use super::metav1::List;
use super::url::{LabelSelector, UrlOptions};
use crate::error::MapiError;
use crate::http::HttpTransport;

pub const API_GROUP: &str = "cluster.x-k8s.io";
pub const API_VERSION: &str = "cluster.x-k8s.io/v1beta1";

pub const LABEL_ORGANIZATION: &str = "giantswarm.io/organization";
pub const LABEL_CLUSTER: &str = "giantswarm.io/cluster";
pub const LABEL_CLUSTER_NAME: &str = "cluster.x-k8s.io/cluster-name";
pub const LABEL_RELEASE_VERSION: &str = "release.giantswarm.io/version";
pub const LABEL_MACHINE_CONTROL_PLANE: &str = "cluster.x-k8s.io/control-plane";

pub const ANNOTATION_CLUSTER_DESCRIPTION: &str = "cluster.giantswarm.io/description";
pub const ANNOTATION_UPDATE_SCHEDULE_TARGET_RELEASE: &str =
    "alpha.giantswarm.io/update-schedule-target-release";
pub const ANNOTATION_UPDATE_SCHEDULE_TARGET_TIME: &str =
    "alpha.giantswarm.io/update-schedule-target-time";

pub const CONDITION_TYPE_READY: &str = "Ready";
pub const CONDITION_TYPE_CREATING: &str = "Creating";
pub const CONDITION_TYPE_UPGRADING: &str = "Upgrading";

pub const CONDITION_REASON_CREATION_COMPLETED: &str = "CreationCompleted";
pub const CONDITION_REASON_EXISTING_OBJECT: &str = "ExistingObject";
pub const CONDITION_REASON_UPGRADE_COMPLETED: &str = "UpgradeCompleted";
pub const CONDITION_REASON_UPGRADE_NOT_STARTED: &str = "UpgradeNotStarted";
pub const CONDITION_REASON_UPGRADE_PENDING: &str = "UpgradePending";

/// Description used for clusters without a description annotation
pub const DEFAULT_CLUSTER_DESCRIPTION: &str = "Unnamed cluster";

/// Desired state of a Cluster
#[derive(CustomResource, Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "cluster.x-k8s.io",
    version = "v1beta1",
    kind = "Cluster",
    namespaced
)]
#[kube(status = "ClusterStatus")]
#[serde(rename_all = "camelCase")]
pub struct ClusterSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_network: Option<ClusterNetwork>,

    /// Endpoint used to communicate with the control plane
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_plane_endpoint: Option<ApiEndpoint>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_plane_ref: Option<ObjectReference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub infrastructure_ref: Option<ObjectReference>,

    /// Stops controllers from processing the Cluster and its objects
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paused: Option<bool>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterNetwork {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_server_port: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pods: Option<NetworkRanges>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_domain: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub services: Option<NetworkRanges>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NetworkRanges {
    #[serde(default)]
    pub cidr_blocks: Option<Vec<String>>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct ApiEndpoint {
    pub host: String,
    pub port: i32,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FailureDomainSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BTreeMap<String, String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_plane: Option<bool>,
}

/// Observed state of a Cluster
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterStatus {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_plane_ready: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_domains: Option<BTreeMap<String, FailureDomainSpec>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub infrastructure_ready: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,

    /// Pending, Provisioning, Provisioned, Deleting, Failed or Unknown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
}

/// A single observation of a resource's state
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(default)]
    pub last_transition_time: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Error, Warning or Info; only set when status is False
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,

    /// True, False or Unknown
    pub status: String,

    #[serde(rename = "type")]
    pub type_: String,
}

/// Desired state of a MachineDeployment
#[derive(CustomResource, Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "cluster.x-k8s.io",
    version = "v1beta1",
    kind = "MachineDeployment",
    namespaced
)]
#[kube(status = "MachineDeploymentStatus")]
#[serde(rename_all = "camelCase")]
pub struct MachineDeploymentSpec {
    /// Name of the Cluster this object belongs to
    pub cluster_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_ready_seconds: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub paused: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_deadline_seconds: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision_history_limit: Option<i32>,

    /// Machine template, kept as raw JSON
    #[serde(default)]
    pub template: serde_json::Value,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MachineDeploymentStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_replicas: Option<i32>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,

    /// ScalingUp, ScalingDown, Running, Failed or Unknown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ready_replicas: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub unavailable_replicas: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_replicas: Option<i32>,
}

pub type ClusterList = List<Cluster>;
pub type MachineDeploymentList = List<MachineDeployment>;

pub async fn get_cluster<T: HttpTransport>(
    client: &mut MapiClient<T>,
    namespace: &str,
    name: &str,
) -> Result<Cluster, MapiError> {
    let url = UrlOptions::for_resource::<Cluster>(client.base_url())
        .namespace(namespace)
        .name(name)
        .build()?;

    client.get_resource(&url).await
}

/// List clusters, across all namespaces when `namespace` is `None`
pub async fn get_cluster_list<T: HttpTransport>(
    client: &mut MapiClient<T>,
    namespace: Option<&str>,
    label_selector: Option<LabelSelector>,
) -> Result<ClusterList, MapiError> {
    let mut options = UrlOptions::for_resource::<Cluster>(client.base_url());
    options.namespace = namespace.map(str::to_string);
    options.label_selector = label_selector;

    client.get_list_resource(&options.build()?).await
}

pub async fn get_machine_deployment<T: HttpTransport>(
    client: &mut MapiClient<T>,
    namespace: &str,
    name: &str,
) -> Result<MachineDeployment, MapiError> {
    let url = UrlOptions::for_resource::<MachineDeployment>(client.base_url())
        .namespace(namespace)
        .name(name)
        .build()?;

    client.get_resource(&url).await
}

pub async fn get_machine_deployment_list<T: HttpTransport>(
    client: &mut MapiClient<T>,
    namespace: Option<&str>,
    label_selector: Option<LabelSelector>,
) -> Result<MachineDeploymentList, MapiError> {
    let mut options = UrlOptions::for_resource::<MachineDeployment>(client.base_url());
    options.namespace = namespace.map(str::to_string);
    options.label_selector = label_selector;

    client.get_list_resource(&options.build()?).await
}

/// Label selector matching every machine deployment of a cluster
pub fn machine_deployments_of(cluster_name: &str) -> LabelSelector {
    LabelSelector::new().label(LABEL_CLUSTER_NAME, cluster_name)
}

pub fn get_cluster_description(cluster: &Cluster) -> String {
    cluster
        .metadata
        .annotations
        .as_ref()
        .and_then(|a| a.get(ANNOTATION_CLUSTER_DESCRIPTION))
        .filter(|d| !d.is_empty())
        .cloned()
        .unwrap_or_else(|| DEFAULT_CLUSTER_DESCRIPTION.to_string())
}

fn label<'a>(cluster: &'a Cluster, key: &str) -> Option<&'a str> {
    cluster
        .metadata
        .labels
        .as_ref()
        .and_then(|l| l.get(key))
        .map(String::as_str)
}

fn annotation<'a>(cluster: &'a Cluster, key: &str) -> Option<&'a str> {
    cluster
        .metadata
        .annotations
        .as_ref()
        .and_then(|a| a.get(key))
        .map(String::as_str)
}

pub fn get_release_version(cluster: &Cluster) -> Option<&str> {
    label(cluster, LABEL_RELEASE_VERSION)
}

pub fn get_cluster_organization(cluster: &Cluster) -> Option<&str> {
    label(cluster, LABEL_ORGANIZATION)
}

pub fn get_cluster_labels(cluster: &Cluster) -> BTreeMap<String, String> {
    cluster.metadata.labels.clone().unwrap_or_default()
}

/// `https://<host>` of the control plane endpoint, empty when unknown
pub fn get_kubernetes_api_endpoint_url(cluster: &Cluster) -> String {
    match &cluster.spec.control_plane_endpoint {
        Some(endpoint) if !endpoint.host.is_empty() => format!("https://{}", endpoint.host),
        _ => String::new(),
    }
}

pub fn get_cluster_update_schedule_target_release(cluster: &Cluster) -> Option<&str> {
    annotation(cluster, ANNOTATION_UPDATE_SCHEDULE_TARGET_RELEASE)
}

pub fn get_cluster_update_schedule_target_time(cluster: &Cluster) -> Option<&str> {
    annotation(cluster, ANNOTATION_UPDATE_SCHEDULE_TARGET_TIME)
}

/// Resources exposing a list of conditions
pub trait HasConditions {
    fn conditions(&self) -> &[Condition];
}

impl HasConditions for Cluster {
    fn conditions(&self) -> &[Condition] {
        self.status
            .as_ref()
            .map(|s| s.conditions.as_slice())
            .unwrap_or_default()
    }
}

impl HasConditions for MachineDeployment {
    fn conditions(&self) -> &[Condition] {
        self.status
            .as_ref()
            .map(|s| s.conditions.as_slice())
            .unwrap_or_default()
    }
}

/// Extra test applied to a condition that does not have the expected status
pub type CheckOption = Box<dyn Fn(&Condition) -> bool + Send + Sync>;

pub fn get_condition<'a, R: HasConditions>(cr: &'a R, type_: &str) -> Option<&'a Condition> {
    cr.conditions().iter().find(|c| c.type_ == type_)
}

pub fn has_condition<R: HasConditions>(cr: &R, type_: &str) -> bool {
    get_condition(cr, type_).is_some()
}

/// True when the condition is `True`, or any check accepts it
pub fn is_condition_true<R: HasConditions>(cr: &R, type_: &str, checks: &[CheckOption]) -> bool {
    let Some(condition) = get_condition(cr, type_) else {
        return false;
    };

    condition.status == CONDITION_TRUE || checks.iter().any(|check| check(condition))
}

/// True when the condition is `False`, or any check rejects it
pub fn is_condition_false<R: HasConditions>(
    cr: &R,
    type_: &str,
    checks: &[CheckOption],
) -> bool {
    let Some(condition) = get_condition(cr, type_) else {
        return false;
    };

    condition.status == CONDITION_FALSE || checks.iter().any(|check| !check(condition))
}

/// True when the condition is `Unknown`, or any check accepts it
pub fn is_condition_unknown<R: HasConditions>(
    cr: &R,
    type_: &str,
    checks: &[CheckOption],
) -> bool {
    let Some(condition) = get_condition(cr, type_) else {
        return false;
    };

    condition.status == CONDITION_UNKNOWN || checks.iter().any(|check| check(condition))
}

pub fn with_reason(reason: &'static str) -> CheckOption {
    Box::new(move |condition: &Condition| condition.reason.as_deref() == Some(reason))
}

pub fn with_reason_creation_completed() -> CheckOption {
    with_reason(CONDITION_REASON_CREATION_COMPLETED)
}

pub fn with_reason_existing_object() -> CheckOption {
    with_reason(CONDITION_REASON_EXISTING_OBJECT)
}

pub fn with_reason_upgrade_completed() -> CheckOption {
    with_reason(CONDITION_REASON_UPGRADE_COMPLETED)
}

pub fn with_reason_upgrade_not_started() -> CheckOption {
    with_reason(CONDITION_REASON_UPGRADE_NOT_STARTED)
}

pub fn with_reason_upgrade_pending() -> CheckOption {
    with_reason(CONDITION_REASON_UPGRADE_PENDING)
}
