//! Request and response records for the orchestrator services
//!
//! Field names follow the services' camelCase JSON. Optional fields the
//! services may omit are `Option` or defaulted collections so partial
//! responses still decode.

use crate::overrides::{OverrideValues, TargetClusters};
use crate::param_template::ParameterTemplate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Paging and filtering applied to list calls
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub filter: Option<String>,
    pub order_by: Option<String>,
    pub page_size: Option<u32>,
    pub offset: Option<u32>,
}

impl ListOptions {
    /// Query pairs for the options that are set
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(filter) = &self.filter {
            pairs.push(("filter", filter.clone()));
        }
        if let Some(order_by) = &self.order_by {
            pairs.push(("orderBy", order_by.clone()));
        }
        if let Some(page_size) = self.page_size {
            pairs.push(("pageSize", page_size.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset", offset.to_string()));
        }
        pairs
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataItem {
    pub key: String,
    pub value: String,
}

// Infrastructure

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Host {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onboarding_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_status: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metadata: Vec<MetadataItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostList {
    #[serde(default)]
    pub hosts: Vec<Host>,
    #[serde(default)]
    pub total_elements: i32,
    #[serde(default)]
    pub has_next: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostRegister {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    pub auto_onboard: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Vec<MetadataItem>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metadata: Vec<MetadataItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_sites: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionList {
    #[serde(default)]
    pub regions: Vec<Region>,
    #[serde(default)]
    pub total_elements: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_lat: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_lng: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metadata: Vec<MetadataItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteList {
    #[serde(default)]
    pub sites: Vec<Site>,
    #[serde(default)]
    pub total_elements: i32,
}

// Catalog

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub root_url: String,
    #[serde(rename = "type")]
    pub registry_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    /// Fields this client does not model, kept so updates send them back
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryList {
    #[serde(default)]
    pub registries: Vec<Registry>,
    #[serde(default)]
    pub total_elements: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_values: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameter_templates: Vec<ParameterTemplate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub chart_name: String,
    pub chart_version: String,
    pub helm_registry_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_registry_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub profiles: Vec<Profile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationList {
    #[serde(default)]
    pub applications: Vec<Application>,
    #[serde(default)]
    pub total_elements: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationReference {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentPackage {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub application_references: Vec<ApplicationReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_deployed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentPackageList {
    #[serde(default)]
    pub deployment_packages: Vec<DeploymentPackage>,
    #[serde(default)]
    pub total_elements: i32,
}

// Deployment

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deploy_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub app_name: String,
    pub app_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub override_values: Vec<OverrideValues>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub target_clusters: Vec<TargetClusters>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DeploymentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    /// Fields this client does not model, kept so updates send them back
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<DeploymentSummary>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeploymentSummary {
    #[serde(default)]
    pub total: i32,
    #[serde(default)]
    pub running: i32,
    #[serde(default)]
    pub down: i32,
    #[serde(default)]
    pub unknown: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentList {
    #[serde(default)]
    pub deployments: Vec<Deployment>,
    #[serde(default)]
    pub total_elements: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeploymentResponse {
    pub deployment_id: String,
}

// Cluster

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusIndicator {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indicator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_status: Option<StatusIndicator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle_phase: Option<StatusIndicator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubernetes_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_quantity: Option<i32>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterList {
    #[serde(default)]
    pub clusters: Vec<Cluster>,
    #[serde(default)]
    pub total_elements: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub id: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSpec {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    pub nodes: Vec<NodeSpec>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

// Tenancy

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenancySpec {
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenancyStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_indicator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// An organization or project; both services share this shape
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TenancyResource {
    pub name: String,
    #[serde(default)]
    pub spec: TenancySpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TenancyStatus>,
}

pub type Organization = TenancyResource;
pub type Project = TenancyResource;

// RPS / AMT

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmtProfile {
    pub profile_name: String,
    /// `acmactivate` or `ccmactivate`
    pub activation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amt_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mebx_password: Option<String>,
    #[serde(default)]
    pub generate_random_password: bool,
    #[serde(default)]
    pub generate_random_mebx_password: bool,
    #[serde(default)]
    pub dhcp_enabled: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_consent: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmtDomain {
    pub profile_name: String,
    pub domain_suffix: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_cert: Option<String>,
    #[serde(default)]
    pub provisioning_cert_storage_format: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_cert_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_options_query_pairs() {
        let opts = ListOptions {
            filter: Some("name=edge".to_string()),
            order_by: None,
            page_size: Some(20),
            offset: Some(40),
        };
        assert_eq!(
            opts.query_pairs(),
            vec![
                ("filter", "name=edge".to_string()),
                ("pageSize", "20".to_string()),
                ("offset", "40".to_string()),
            ]
        );
        assert!(ListOptions::default().query_pairs().is_empty());
    }

    #[test]
    fn test_partial_host_list_decodes() {
        let list: HostList =
            serde_json::from_str(r#"{"hosts":[{"name":"edge-1","resourceId":"host-1"}]}"#).unwrap();
        assert_eq!(list.hosts.len(), 1);
        assert_eq!(list.hosts[0].resource_id.as_deref(), Some("host-1"));
        assert_eq!(list.total_elements, 0);
        assert!(!list.has_next);
    }

    #[test]
    fn test_deployment_body_omits_empty_fields() {
        let deployment = Deployment {
            app_name: "wordpress".to_string(),
            app_version: "0.1.0".to_string(),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&deployment).unwrap(),
            serde_json::json!({"appName": "wordpress", "appVersion": "0.1.0"})
        );
    }

    #[test]
    fn test_unmodelled_deployment_fields_round_trip() {
        let deployment: Deployment = serde_json::from_str(
            r#"{"appName":"wp","appVersion":"1","networkName":"n1","allAppTargetClusters":{"labels":{}}}"#,
        )
        .unwrap();
        assert_eq!(deployment.extra.get("networkName"), Some(&serde_json::json!("n1")));

        let body = serde_json::to_value(&deployment).unwrap();
        assert_eq!(body["networkName"], "n1");
        assert_eq!(body["allAppTargetClusters"], serde_json::json!({"labels": {}}));
        assert_eq!(body["appName"], "wp");
    }

    #[test]
    fn test_registry_type_field() {
        let registry: Registry = serde_json::from_str(
            r#"{"name":"harbor","rootUrl":"oci://harbor.local","type":"HELM"}"#,
        )
        .unwrap();
        assert_eq!(registry.registry_type, "HELM");
    }
}
