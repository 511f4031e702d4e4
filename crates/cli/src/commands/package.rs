//! Deployment package commands

use anyhow::Result;
use clap::Args;
use orch_lib::models::{ApplicationReference, DeploymentPackage, DeploymentPackageList, ListOptions};
use orch_lib::services::CatalogApi;
use tabled::Tabled;

use super::{proceed, CommandContext, ListArgs};
use crate::output::{
    format_timestamp, or_dash, print_field, print_header, print_json, print_rows, print_success,
    OutputFormat,
};

#[derive(Debug, Clone, Args)]
pub struct PackageArgs {
    /// Package name
    pub name: String,

    /// Package version
    pub version: String,

    /// Application in the package (<name>:<version>)
    #[arg(long = "application-reference", required = true, value_parser = parse_reference)]
    pub applications: Vec<ApplicationReference>,

    /// Profile used when a deployment names none
    #[arg(long)]
    pub default_profile: Option<String>,

    #[arg(long)]
    pub display_name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,
}

/// clap value parser for `<name>:<version>`
pub fn parse_reference(s: &str) -> std::result::Result<ApplicationReference, String> {
    match s.split_once(':') {
        Some((name, version)) if !name.is_empty() && !version.is_empty() => Ok(ApplicationReference {
            name: name.to_string(),
            version: version.to_string(),
        }),
        _ => Err(format!("expected <name>:<version>, got '{}'", s)),
    }
}

#[derive(Tabled)]
struct PackageRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Applications")]
    applications: String,
    #[tabled(rename = "Deployed")]
    deployed: String,
}

fn references(package: &DeploymentPackage) -> String {
    package
        .application_references
        .iter()
        .map(|r| format!("{}:{}", r.name, r.version))
        .collect::<Vec<_>>()
        .join(", ")
}

/// List deployment packages
pub async fn list_packages(client: &impl CatalogApi, ctx: &CommandContext, args: &ListArgs) -> Result<()> {
    let response = client
        .list_deployment_packages(ctx.project()?, &ListOptions::from(args))
        .await?;

    let packages = if proceed(ctx, &response, "error listing deployment packages")? {
        response.json::<DeploymentPackageList>()?.deployment_packages
    } else {
        Vec::new()
    };

    match ctx.format {
        OutputFormat::Json => print_json(&packages)?,
        OutputFormat::Table => {
            let rows: Vec<PackageRow> = packages
                .iter()
                .map(|p| PackageRow {
                    name: p.name.clone(),
                    version: p.version.clone(),
                    applications: references(p),
                    deployed: match p.is_deployed {
                        Some(true) => "yes".to_string(),
                        Some(false) => "no".to_string(),
                        None => "-".to_string(),
                    },
                })
                .collect();
            print_rows(rows, "deployment packages");
        }
    }
    Ok(())
}

/// Show one deployment package version
pub async fn get_package(
    client: &impl CatalogApi,
    ctx: &CommandContext,
    name: &str,
    version: &str,
) -> Result<()> {
    let response = client
        .get_deployment_package(ctx.project()?, name, version)
        .await?;
    if !proceed(ctx, &response, "error getting deployment package")? {
        return Ok(());
    }
    let package: DeploymentPackage = response.json()?;

    match ctx.format {
        OutputFormat::Json => print_json(&package)?,
        OutputFormat::Table => {
            print_header("Deployment Package");
            print_field("Name", &package.name);
            print_field("Version", &package.version);
            print_field("Display Name", or_dash(package.display_name.as_deref()));
            print_field("Applications", references(&package));
            print_field("Default Profile", or_dash(package.default_profile_name.as_deref()));
            print_field("Description", or_dash(package.description.as_deref()));
            if let Some(created) = &package.create_time {
                print_field("Created", format_timestamp(created));
            }
        }
    }
    Ok(())
}

/// Create a deployment package
pub async fn create_package(
    client: &impl CatalogApi,
    ctx: &CommandContext,
    args: &PackageArgs,
) -> Result<()> {
    let package = DeploymentPackage {
        name: args.name.clone(),
        version: args.version.clone(),
        display_name: args.display_name.clone(),
        description: args.description.clone(),
        application_references: args.applications.clone(),
        default_profile_name: args.default_profile.clone(),
        ..Default::default()
    };
    let response = client
        .create_deployment_package(ctx.project()?, &package)
        .await?;
    if !proceed(ctx, &response, "error while creating deployment package")? {
        return Ok(());
    }
    print_success(&format!("Deployment package {} {} created", args.name, args.version));
    Ok(())
}

/// Delete a deployment package version
pub async fn delete_package(
    client: &impl CatalogApi,
    ctx: &CommandContext,
    name: &str,
    version: &str,
) -> Result<()> {
    let response = client
        .delete_deployment_package(ctx.project()?, name, version)
        .await?;
    if !proceed(ctx, &response, "error deleting deployment package")? {
        return Ok(());
    }
    print_success(&format!("Deployment package {} {} deleted", name, version));
    Ok(())
}
