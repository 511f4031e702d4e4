//! Edge cluster commands

use anyhow::{bail, Result};
use clap::Args;
use orch_lib::models::{Cluster, ClusterList, ClusterSpec, ListOptions, NodeSpec};
use orch_lib::services::ClusterApi;
use tabled::Tabled;

use super::{parse_key_value, proceed, to_map, CommandContext, ListArgs};
use crate::output::{
    color_status, or_dash, print_field, print_header, print_json, print_rows, print_success,
    OutputFormat,
};

const NODE_ROLES: &[&str] = &["all", "controlplane", "worker"];

#[derive(Debug, Clone, Args)]
pub struct ClusterArgs {
    /// Cluster name
    pub name: String,

    /// Node to include (<host-id>=<role>; roles: all, controlplane, worker)
    #[arg(long = "node", required = true, value_parser = parse_key_value)]
    pub nodes: Vec<(String, String)>,

    /// Cluster template (<name>-<version>)
    #[arg(long)]
    pub template: Option<String>,

    /// Cluster label (<key>=<value>)
    #[arg(long = "label", value_parser = parse_key_value)]
    pub labels: Vec<(String, String)>,
}

#[derive(Tabled)]
struct ClusterRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Provider Status")]
    provider_status: String,
    #[tabled(rename = "Lifecycle")]
    lifecycle: String,
    #[tabled(rename = "Kubernetes")]
    kubernetes_version: String,
    #[tabled(rename = "Nodes")]
    nodes: String,
}

/// Build the create body, checking node roles locally
pub fn build_cluster_spec(args: &ClusterArgs) -> Result<ClusterSpec> {
    let mut nodes = Vec::with_capacity(args.nodes.len());
    for (id, role) in &args.nodes {
        let role = role.to_lowercase();
        if !NODE_ROLES.contains(&role.as_str()) {
            bail!(
                "invalid role '{}' for node {}, expected one of: {}",
                role,
                id,
                NODE_ROLES.join(", ")
            );
        }
        nodes.push(NodeSpec { id: id.clone(), role });
    }

    Ok(ClusterSpec {
        name: args.name.clone(),
        template: args.template.clone(),
        nodes,
        labels: to_map(&args.labels),
    })
}

fn indicator(cluster: &Cluster) -> (String, String) {
    let provider = cluster
        .provider_status
        .as_ref()
        .and_then(|s| s.indicator.as_deref())
        .map(color_status)
        .unwrap_or_else(|| "-".to_string());
    let lifecycle = cluster
        .lifecycle_phase
        .as_ref()
        .and_then(|s| s.indicator.as_deref())
        .map(color_status)
        .unwrap_or_else(|| "-".to_string());
    (provider, lifecycle)
}

/// List clusters
pub async fn list_clusters(client: &impl ClusterApi, ctx: &CommandContext, args: &ListArgs) -> Result<()> {
    let response = client
        .list_clusters(ctx.project()?, &ListOptions::from(args))
        .await?;

    let clusters = if proceed(ctx, &response, "error listing clusters")? {
        response.json::<ClusterList>()?.clusters
    } else {
        Vec::new()
    };

    match ctx.format {
        OutputFormat::Json => print_json(&clusters)?,
        OutputFormat::Table => {
            let rows: Vec<ClusterRow> = clusters
                .iter()
                .map(|c| {
                    let (provider_status, lifecycle) = indicator(c);
                    ClusterRow {
                        name: c.name.clone(),
                        provider_status,
                        lifecycle,
                        kubernetes_version: or_dash(c.kubernetes_version.as_deref()),
                        nodes: c
                            .node_quantity
                            .map(|n| n.to_string())
                            .unwrap_or_else(|| "-".to_string()),
                    }
                })
                .collect();
            print_rows(rows, "clusters");
        }
    }
    Ok(())
}

/// Show one cluster
pub async fn get_cluster(client: &impl ClusterApi, ctx: &CommandContext, name: &str) -> Result<()> {
    let response = client.get_cluster(ctx.project()?, name).await?;
    if !proceed(ctx, &response, "error getting cluster")? {
        return Ok(());
    }
    let cluster: Cluster = response.json()?;

    match ctx.format {
        OutputFormat::Json => print_json(&cluster)?,
        OutputFormat::Table => {
            let (provider, lifecycle) = indicator(&cluster);
            print_header("Cluster");
            print_field("Name", &cluster.name);
            print_field("Provider Status", provider);
            print_field("Lifecycle", lifecycle);
            print_field("Kubernetes", or_dash(cluster.kubernetes_version.as_deref()));
            print_field("Template", or_dash(cluster.template.as_deref()));
            if let Some(message) = cluster.lifecycle_phase.as_ref().and_then(|s| s.message.as_deref()) {
                print_field("Message", message);
            }
            for (key, value) in &cluster.labels {
                print_field(&format!("  {}", key), value);
            }
        }
    }
    Ok(())
}

/// Create a cluster
pub async fn create_cluster(client: &impl ClusterApi, ctx: &CommandContext, args: &ClusterArgs) -> Result<()> {
    let spec = build_cluster_spec(args)?;
    let response = client.create_cluster(ctx.project()?, &spec).await?;
    if !proceed(ctx, &response, "error while creating cluster")? {
        return Ok(());
    }
    print_success(&format!("Cluster {} created", args.name));
    Ok(())
}

/// Delete a cluster
pub async fn delete_cluster(client: &impl ClusterApi, ctx: &CommandContext, name: &str) -> Result<()> {
    let response = client.delete_cluster(ctx.project()?, name).await?;
    if !proceed(ctx, &response, "error deleting cluster")? {
        return Ok(());
    }
    print_success(&format!("Cluster {} deleted", name));
    Ok(())
}
