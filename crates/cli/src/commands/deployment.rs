//! Application deployment commands

use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use orch_lib::models::{Deployment, DeploymentList, ListOptions};
use orch_lib::services::DeploymentApi;
use orch_lib::{
    build_overrides, build_target_cluster_ids, build_target_labels, merge_overrides,
    TargetClusters,
};
use tabled::Tabled;
use tracing::debug;

use super::{parse_key_value, proceed, to_map, CommandContext, ListArgs};
use crate::output::{
    color_status, format_timestamp, or_dash, print_field, print_header, print_json, print_rows,
    print_success, OutputFormat,
};

pub const AUTO_SCALING: &str = "auto-scaling";
pub const TARGETED: &str = "targeted";

/// Override-value flags
#[derive(Debug, Clone, Default, Args)]
pub struct OverrideArgs {
    /// Target namespace per application (<app-name>=<namespace>)
    #[arg(long = "application-namespace", value_parser = parse_key_value)]
    pub namespaces: Vec<(String, String)>,

    /// Override value (<app-name>.<property.path>=<value>)
    #[arg(long = "application-set", value_parser = parse_key_value)]
    pub values: Vec<(String, String)>,
}

impl OverrideArgs {
    fn is_empty(&self) -> bool {
        self.namespaces.is_empty() && self.values.is_empty()
    }
}

/// Target-cluster flags
#[derive(Debug, Clone, Default, Args)]
pub struct TargetArgs {
    /// Cluster label selector (<app-name>.<label>=<value>)
    #[arg(long = "application-label", value_parser = parse_key_value)]
    pub labels: Vec<(String, String)>,

    /// Explicit target cluster (<app-name>=<cluster-id>)
    #[arg(long = "application-cluster-id", value_parser = parse_key_value)]
    pub cluster_ids: Vec<(String, String)>,
}

impl TargetArgs {
    /// Deployment type and targets, or None when no target flag was given
    fn resolve(&self) -> Result<Option<(&'static str, Vec<TargetClusters>)>> {
        match (self.labels.is_empty(), self.cluster_ids.is_empty()) {
            (true, true) => Ok(None),
            (false, true) => Ok(Some((
                AUTO_SCALING,
                build_target_labels(&to_map(&self.labels))?,
            ))),
            (true, false) => Ok(Some((
                TARGETED,
                build_target_cluster_ids(&to_map(&self.cluster_ids)),
            ))),
            (false, false) => {
                bail!("--application-label and --application-cluster-id cannot be combined")
            }
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct CreateArgs {
    /// Deployment package name
    pub package_name: String,

    /// Deployment package version
    pub package_version: String,

    /// Human readable name
    #[arg(long)]
    pub display_name: Option<String>,

    /// Deployment profile of the package
    #[arg(long)]
    pub profile: Option<String>,

    #[command(flatten)]
    pub overrides: OverrideArgs,

    #[command(flatten)]
    pub targets: TargetArgs,
}

#[derive(Debug, Clone, Args)]
pub struct SetArgs {
    /// Deployment ID
    pub deployment_id: String,

    /// Move to another package version
    #[arg(long)]
    pub package_version: Option<String>,

    /// Human readable name
    #[arg(long)]
    pub display_name: Option<String>,

    /// Deployment profile of the package
    #[arg(long)]
    pub profile: Option<String>,

    #[command(flatten)]
    pub overrides: OverrideArgs,

    #[command(flatten)]
    pub targets: TargetArgs,
}

/// Row for deployments table
#[derive(Tabled)]
struct DeploymentRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Package")]
    package: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Profile")]
    profile: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Running")]
    running: String,
}

/// Wide row for verbose listing
#[derive(Tabled)]
struct DeploymentWideRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Package")]
    package: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Type")]
    deployment_type: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Running")]
    running: String,
    #[tabled(rename = "Down")]
    down: String,
    #[tabled(rename = "Created")]
    created: String,
}

fn display_name(d: &Deployment) -> String {
    or_dash(d.display_name.as_deref().or(d.name.as_deref()))
}

fn state(d: &Deployment) -> String {
    color_status(
        d.status
            .as_ref()
            .and_then(|s| s.state.as_deref())
            .unwrap_or("UNKNOWN"),
    )
}

fn running(d: &Deployment) -> String {
    match d.status.as_ref().and_then(|s| s.summary.as_ref()) {
        Some(summary) => format!("{}/{}", summary.running, summary.total),
        None => "-".to_string(),
    }
}

/// Build the create request from flags
pub fn build_deployment(args: &CreateArgs) -> Result<Deployment> {
    let override_values = build_overrides(
        &to_map(&args.overrides.namespaces),
        &to_map(&args.overrides.values),
    )?;
    let (deployment_type, target_clusters) = args
        .targets
        .resolve()?
        .map(|(t, targets)| (Some(t.to_string()), targets))
        .unwrap_or((None, Vec::new()));

    Ok(Deployment {
        app_name: args.package_name.clone(),
        app_version: args.package_version.clone(),
        display_name: args.display_name.clone(),
        profile_name: args.profile.clone(),
        deployment_type,
        override_values,
        target_clusters,
        ..Default::default()
    })
}

/// Apply `set` flags to an existing deployment
pub fn apply_update(mut deployment: Deployment, args: &SetArgs) -> Result<Deployment> {
    if !args.overrides.is_empty() {
        let updates = build_overrides(
            &to_map(&args.overrides.namespaces),
            &to_map(&args.overrides.values),
        )?;
        deployment.override_values = merge_overrides(deployment.override_values, updates);
    }
    if let Some((deployment_type, targets)) = args.targets.resolve()? {
        deployment.deployment_type = Some(deployment_type.to_string());
        deployment.target_clusters = targets;
    }
    if let Some(version) = &args.package_version {
        deployment.app_version = version.clone();
    }
    if let Some(name) = &args.display_name {
        deployment.display_name = Some(name.clone());
    }
    if let Some(profile) = &args.profile {
        deployment.profile_name = Some(profile.clone());
    }
    // Server-populated fields are not accepted back.
    deployment.status = None;
    deployment.create_time = None;
    Ok(deployment)
}

/// List deployments
pub async fn list_deployments(
    client: &impl DeploymentApi,
    ctx: &CommandContext,
    args: &ListArgs,
) -> Result<()> {
    let response = client
        .list_deployments(ctx.project()?, &ListOptions::from(args))
        .await?;

    let deployments = if proceed(ctx, &response, "error listing deployments")? {
        response.json::<DeploymentList>()?.deployments
    } else {
        Vec::new()
    };

    match ctx.format {
        OutputFormat::Json => print_json(&deployments)?,
        OutputFormat::Table if ctx.verbose => {
            let rows: Vec<DeploymentWideRow> = deployments
                .iter()
                .map(|d| DeploymentWideRow {
                    name: display_name(d),
                    id: or_dash(d.deploy_id.as_deref()),
                    package: d.app_name.clone(),
                    version: d.app_version.clone(),
                    deployment_type: or_dash(d.deployment_type.as_deref()),
                    state: state(d),
                    running: running(d),
                    down: d
                        .status
                        .as_ref()
                        .and_then(|s| s.summary.as_ref())
                        .map(|s| s.down.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    created: d
                        .create_time
                        .as_deref()
                        .map(format_timestamp)
                        .unwrap_or_else(|| "-".to_string()),
                })
                .collect();
            print_rows(rows, "deployments");
        }
        OutputFormat::Table => {
            let rows: Vec<DeploymentRow> = deployments
                .iter()
                .map(|d| DeploymentRow {
                    name: display_name(d),
                    id: or_dash(d.deploy_id.as_deref()),
                    package: d.app_name.clone(),
                    version: d.app_version.clone(),
                    profile: or_dash(d.profile_name.as_deref()),
                    state: state(d),
                    running: running(d),
                })
                .collect();
            print_rows(rows, "deployments");
        }
    }

    Ok(())
}

/// Show one deployment
pub async fn get_deployment(
    client: &impl DeploymentApi,
    ctx: &CommandContext,
    deployment_id: &str,
) -> Result<()> {
    let response = client.get_deployment(ctx.project()?, deployment_id).await?;
    if !proceed(ctx, &response, "error getting deployment")? {
        return Ok(());
    }
    let deployment: Deployment = response.json()?;

    match ctx.format {
        OutputFormat::Json => print_json(&deployment)?,
        OutputFormat::Table => {
            print_header("Deployment");
            print_field("Name", display_name(&deployment));
            print_field("ID", or_dash(deployment.deploy_id.as_deref()));
            print_field("Package", &deployment.app_name);
            print_field("Version", &deployment.app_version);
            print_field("Profile", or_dash(deployment.profile_name.as_deref()));
            print_field("Type", or_dash(deployment.deployment_type.as_deref()));
            print_field("State", state(&deployment));
            print_field("Running", running(&deployment));
            if let Some(message) = deployment.status.as_ref().and_then(|s| s.message.as_deref()) {
                print_field("Message", message);
            }
            if let Some(created) = &deployment.create_time {
                print_field("Created", format_timestamp(created));
            }

            if !deployment.target_clusters.is_empty() {
                println!();
                println!("{}", "Target Clusters".bold());
                for target in &deployment.target_clusters {
                    match &target.cluster_id {
                        Some(id) => println!("  {}: cluster {}", target.app_name, id),
                        None => {
                            let labels: Vec<String> = target
                                .labels
                                .iter()
                                .map(|(k, v)| format!("{}={}", k, v))
                                .collect();
                            println!("  {}: {}", target.app_name, labels.join(", "));
                        }
                    }
                }
            }

            if ctx.verbose && !deployment.override_values.is_empty() {
                println!();
                println!("{}", "Override Values".bold());
                for ov in &deployment.override_values {
                    let values = serde_json::to_string(&ov.values)?;
                    match &ov.target_namespace {
                        Some(ns) => println!("  {} (namespace {}): {}", ov.app_name, ns, values),
                        None => println!("  {}: {}", ov.app_name, values),
                    }
                }
            }
        }
    }

    Ok(())
}

/// Create a deployment
pub async fn create_deployment(
    client: &impl DeploymentApi,
    ctx: &CommandContext,
    args: &CreateArgs,
) -> Result<()> {
    let deployment = build_deployment(args)?;
    debug!(
        package = %deployment.app_name,
        version = %deployment.app_version,
        apps = deployment.override_values.len(),
        "Creating deployment"
    );

    let response = client.create_deployment(ctx.project()?, &deployment).await?;
    if !proceed(ctx, &response, "error while creating deployment")? {
        return Ok(());
    }

    match ctx.format {
        OutputFormat::Json => println!("{}", response.body),
        OutputFormat::Table => {
            let id = serde_json::from_str::<orch_lib::models::CreateDeploymentResponse>(&response.body)
                .map(|r| r.deployment_id)
                .unwrap_or_default();
            print_success(&format!(
                "Deployment of {} {} created {}",
                args.package_name, args.package_version, id
            ));
        }
    }
    Ok(())
}

/// Update a deployment, merging new override values into existing ones
pub async fn set_deployment(
    client: &impl DeploymentApi,
    ctx: &CommandContext,
    args: &SetArgs,
) -> Result<()> {
    let project = ctx.project()?;
    let response = client.get_deployment(project, &args.deployment_id).await?;
    if !proceed(ctx, &response, "error getting deployment")? {
        return Ok(());
    }

    let deployment = apply_update(response.json()?, args)?;
    let response = client
        .update_deployment(project, &args.deployment_id, &deployment)
        .await?;
    if !proceed(ctx, &response, "error while updating deployment")? {
        return Ok(());
    }

    print_success(&format!("Deployment {} updated", args.deployment_id));
    Ok(())
}

/// Delete a deployment
pub async fn delete_deployment(
    client: &impl DeploymentApi,
    ctx: &CommandContext,
    deployment_id: &str,
) -> Result<()> {
    let response = client.delete_deployment(ctx.project()?, deployment_id).await?;
    if !proceed(ctx, &response, "error deleting deployment")? {
        return Ok(());
    }
    print_success(&format!("Deployment {} deleted", deployment_id));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{ctx, not_found, ok};
    use async_trait::async_trait;
    use orch_lib::{ApiResponse, OrchError, OverrideValue, Scalar};
    use std::sync::Mutex;

    /// Fake deployment service recording what it was sent
    #[derive(Default)]
    struct FakeDeployments {
        get_response: Option<ApiResponse>,
        created: Mutex<Vec<Deployment>>,
        updated: Mutex<Vec<(String, Deployment)>>,
    }

    #[async_trait]
    impl DeploymentApi for FakeDeployments {
        async fn list_deployments(&self, _: &str, _: &ListOptions) -> orch_lib::Result<ApiResponse> {
            Ok(not_found())
        }

        async fn get_deployment(&self, _: &str, _: &str) -> orch_lib::Result<ApiResponse> {
            Ok(self.get_response.clone().unwrap_or_else(not_found))
        }

        async fn create_deployment(&self, _: &str, d: &Deployment) -> orch_lib::Result<ApiResponse> {
            self.created.lock().unwrap().push(d.clone());
            Ok(ok(r#"{"deploymentId":"dep-1"}"#))
        }

        async fn update_deployment(
            &self,
            _: &str,
            id: &str,
            d: &Deployment,
        ) -> orch_lib::Result<ApiResponse> {
            self.updated.lock().unwrap().push((id.to_string(), d.clone()));
            Ok(ok("{}"))
        }

        async fn delete_deployment(&self, _: &str, _: &str) -> orch_lib::Result<ApiResponse> {
            Ok(ApiResponse::new(500, "Internal Server Error", "boom"))
        }
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn create_args() -> CreateArgs {
        CreateArgs {
            package_name: "wordpress".to_string(),
            package_version: "0.1.0".to_string(),
            display_name: Some("blog".to_string()),
            profile: None,
            overrides: OverrideArgs {
                namespaces: pairs(&[("wordpress", "apps")]),
                values: pairs(&[("wordpress.service.type", "NodePort"), ("mariadb.replicas", "2")]),
            },
            targets: TargetArgs {
                labels: pairs(&[("wordpress.color", "blue")]),
                cluster_ids: Vec::new(),
            },
        }
    }

    #[test]
    fn test_build_deployment_request() {
        let deployment = build_deployment(&create_args()).unwrap();

        assert_eq!(deployment.app_name, "wordpress");
        assert_eq!(deployment.deployment_type.as_deref(), Some(AUTO_SCALING));
        assert_eq!(deployment.override_values.len(), 2);
        assert_eq!(deployment.override_values[0].app_name, "mariadb");
        assert_eq!(
            deployment.override_values[0].get("replicas"),
            Some(&OverrideValue::Leaf(Scalar::Int(2)))
        );
        assert_eq!(
            deployment.override_values[1].target_namespace.as_deref(),
            Some("apps")
        );
        assert_eq!(deployment.target_clusters.len(), 1);
        assert_eq!(
            deployment.target_clusters[0].labels.get("color").map(String::as_str),
            Some("blue")
        );
    }

    #[test]
    fn test_targeted_deployment() {
        let mut args = create_args();
        args.targets = TargetArgs {
            labels: Vec::new(),
            cluster_ids: pairs(&[("wordpress", "cluster-a")]),
        };
        let deployment = build_deployment(&args).unwrap();
        assert_eq!(deployment.deployment_type.as_deref(), Some(TARGETED));
        assert_eq!(
            deployment.target_clusters[0].cluster_id.as_deref(),
            Some("cluster-a")
        );
    }

    #[test]
    fn test_labels_and_cluster_ids_conflict() {
        let mut args = create_args();
        args.targets.cluster_ids = pairs(&[("wordpress", "cluster-a")]);
        assert!(build_deployment(&args).is_err());
    }

    #[test]
    fn test_bad_property_key_aborts() {
        let mut args = create_args();
        args.overrides.values = pairs(&[("badkey", "value")]);
        let err = build_deployment(&args).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<OrchError>(),
            Some(OrchError::InvalidFormat { .. })
        ));
    }

    #[tokio::test]
    async fn test_create_sends_built_request() {
        let fake = FakeDeployments::default();
        create_deployment(&fake, &ctx(), &create_args()).await.unwrap();

        let created = fake.created.lock().unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].display_name.as_deref(), Some("blog"));
    }

    #[tokio::test]
    async fn test_set_merges_existing_overrides() {
        let existing = r#"{
            "deployId": "dep-1",
            "appName": "wordpress",
            "appVersion": "0.1.0",
            "overrideValues": [
                {"appName": "wordpress", "targetNamespace": "apps",
                 "values": {"service": {"type": "NodePort", "port": 80}}}
            ],
            "status": {"state": "RUNNING"}
        }"#;
        let fake = FakeDeployments {
            get_response: Some(ok(existing)),
            ..Default::default()
        };
        let args = SetArgs {
            deployment_id: "dep-1".to_string(),
            package_version: Some("0.2.0".to_string()),
            display_name: None,
            profile: None,
            overrides: OverrideArgs {
                namespaces: Vec::new(),
                values: pairs(&[("wordpress.service.port", "8080")]),
            },
            targets: TargetArgs::default(),
        };

        set_deployment(&fake, &ctx(), &args).await.unwrap();

        let updated = fake.updated.lock().unwrap();
        assert_eq!(updated.len(), 1);
        let (id, deployment) = &updated[0];
        assert_eq!(id, "dep-1");
        assert_eq!(deployment.app_version, "0.2.0");
        assert!(deployment.status.is_none());
        let wordpress = &deployment.override_values[0];
        assert_eq!(wordpress.target_namespace.as_deref(), Some("apps"));
        assert_eq!(
            wordpress.get("service.port"),
            Some(&OverrideValue::Leaf(Scalar::Int(8080)))
        );
        assert_eq!(
            wordpress.get("service.type"),
            Some(&OverrideValue::Leaf(Scalar::Str("NodePort".to_string())))
        );
    }

    #[tokio::test]
    async fn test_set_keeps_server_values_and_fields() {
        let existing = r#"{
            "deployId": "dep-2",
            "appName": "wp",
            "appVersion": "1",
            "networkName": "n1",
            "overrideValues": [
                {"appName": "wordpress",
                 "values": {"ingress": {"hosts": ["a"]}, "x": null}}
            ]
        }"#;
        let fake = FakeDeployments {
            get_response: Some(ok(existing)),
            ..Default::default()
        };
        let args = SetArgs {
            deployment_id: "dep-2".to_string(),
            package_version: None,
            display_name: None,
            profile: None,
            overrides: OverrideArgs {
                namespaces: Vec::new(),
                values: pairs(&[("wordpress.ingress.enabled", "true")]),
            },
            targets: TargetArgs::default(),
        };

        set_deployment(&fake, &ctx(), &args).await.unwrap();

        let updated = fake.updated.lock().unwrap();
        let body = serde_json::to_value(&updated[0].1).unwrap();
        assert_eq!(body["networkName"], "n1");
        assert_eq!(
            body["overrideValues"][0]["values"],
            serde_json::json!({
                "ingress": {"enabled": true, "hosts": ["a"]},
                "x": null
            })
        );
    }

    #[test]
    fn test_list_with_array_values_decodes() {
        let list: DeploymentList = serde_json::from_str(
            r#"{"deployments":[{"appName":"wp","appVersion":"1",
                "overrideValues":[{"appName":"wordpress",
                    "values":{"ingress":{"hosts":["a.example"]},"resources":null}}]}]}"#,
        )
        .unwrap();
        assert_eq!(list.deployments.len(), 1);
        assert_eq!(
            list.deployments[0].override_values[0].get("resources"),
            Some(&OverrideValue::Null)
        );
    }

    #[tokio::test]
    async fn test_set_on_missing_deployment_is_silent() {
        let fake = FakeDeployments::default();
        let args = SetArgs {
            deployment_id: "missing".to_string(),
            package_version: None,
            display_name: None,
            profile: None,
            overrides: OverrideArgs::default(),
            targets: TargetArgs::default(),
        };
        set_deployment(&fake, &ctx(), &args).await.unwrap();
        assert!(fake.updated.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_not_found_is_empty() {
        let fake = FakeDeployments::default();
        list_deployments(&fake, &ctx(), &ListArgs::default()).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_server_error() {
        let fake = FakeDeployments::default();
        let err = delete_deployment(&fake, &ctx(), "dep-1").await.unwrap_err();
        assert_eq!(err.to_string(), "error deleting deployment:[Internal Server Error]");
    }
}
