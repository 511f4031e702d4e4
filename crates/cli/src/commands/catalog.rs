//! Catalog commands: registries, applications and their profiles

use anyhow::{Context, Result};
use clap::Args;
use orch_lib::chart_values::ChartValues;
use orch_lib::models::{Application, ApplicationList, ListOptions, Profile, Registry, RegistryList};
use orch_lib::param_template::parse_templates;
use orch_lib::services::CatalogApi;
use std::path::PathBuf;
use tabled::Tabled;
use tracing::debug;

use super::{proceed, CommandContext, ListArgs};
use crate::output::{
    format_timestamp, or_dash, print_field, print_header, print_json, print_rows, print_success,
    OutputFormat,
};

#[derive(Debug, Clone, Args)]
pub struct RegistryArgs {
    /// Registry name
    pub name: String,

    /// Root URL, e.g. oci://registry.example.com
    #[arg(long)]
    pub root_url: String,

    /// Registry type (HELM or IMAGE)
    #[arg(long = "registry-type", default_value = "HELM")]
    pub registry_type: String,

    #[arg(long)]
    pub display_name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub username: Option<String>,

    #[arg(long, env = "ORCH_REGISTRY_TOKEN", hide_env_values = true)]
    pub auth_token: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct RegistryUpdateArgs {
    /// Registry name
    pub name: String,

    #[arg(long)]
    pub root_url: Option<String>,

    #[arg(long)]
    pub display_name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub username: Option<String>,

    #[arg(long, env = "ORCH_REGISTRY_TOKEN", hide_env_values = true)]
    pub auth_token: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct ApplicationArgs {
    /// Application name
    pub name: String,

    /// Application version
    pub version: String,

    /// Helm chart name
    #[arg(long)]
    pub chart_name: String,

    /// Helm chart version
    #[arg(long)]
    pub chart_version: String,

    /// Registry holding the chart
    #[arg(long)]
    pub helm_registry: String,

    /// Registry holding the images
    #[arg(long)]
    pub image_registry: Option<String>,

    #[arg(long)]
    pub display_name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct ProfileArgs {
    /// Application name
    pub app_name: String,

    /// Application version
    pub app_version: String,

    /// Profile name
    pub name: String,

    /// YAML chart values file (plain or base64 encoded)
    #[arg(long)]
    pub chart_values: Option<PathBuf>,

    /// Parameter template (<name>=<type>[:<display-name>[:<default>]])
    #[arg(long = "parameter-template")]
    pub parameter_templates: Vec<String>,

    #[arg(long)]
    pub display_name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Tabled)]
struct RegistryRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    registry_type: String,
    #[tabled(rename = "Root URL")]
    root_url: String,
    #[tabled(rename = "Description")]
    description: String,
}

#[derive(Tabled)]
struct ApplicationRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Chart")]
    chart: String,
    #[tabled(rename = "Registry")]
    registry: String,
    #[tabled(rename = "Profiles")]
    profiles: usize,
}

/// Build a profile from flags, reading chart values from disk
pub fn build_profile(args: &ProfileArgs) -> Result<Profile> {
    let chart_values = match &args.chart_values {
        Some(path) => {
            let values = ChartValues::from_file(path)
                .with_context(|| format!("error reading chart values from {}", path.display()))?;
            Some(values).filter(|v| !v.is_empty()).map(ChartValues::into_string)
        }
        None => None,
    };

    Ok(Profile {
        name: args.name.clone(),
        display_name: args.display_name.clone(),
        description: args.description.clone(),
        chart_values,
        parameter_templates: parse_templates(&args.parameter_templates)?,
    })
}

/// Apply `set registry` flags to the current registry
pub fn apply_registry_update(mut registry: Registry, args: &RegistryUpdateArgs) -> Registry {
    if let Some(url) = &args.root_url {
        registry.root_url = url.clone();
    }
    if args.display_name.is_some() {
        registry.display_name = args.display_name.clone();
    }
    if args.description.is_some() {
        registry.description = args.description.clone();
    }
    if args.username.is_some() {
        registry.username = args.username.clone();
    }
    if args.auth_token.is_some() {
        registry.auth_token = args.auth_token.clone();
    }
    registry.create_time = None;
    registry
}

/// List registries
pub async fn list_registries(
    client: &impl CatalogApi,
    ctx: &CommandContext,
    args: &ListArgs,
) -> Result<()> {
    let response = client
        .list_registries(ctx.project()?, &ListOptions::from(args))
        .await?;

    let registries = if proceed(ctx, &response, "error listing registries")? {
        response.json::<RegistryList>()?.registries
    } else {
        Vec::new()
    };

    match ctx.format {
        OutputFormat::Json => print_json(&registries)?,
        OutputFormat::Table => {
            let rows: Vec<RegistryRow> = registries
                .iter()
                .map(|r| RegistryRow {
                    name: r.name.clone(),
                    registry_type: r.registry_type.clone(),
                    root_url: r.root_url.clone(),
                    description: or_dash(r.description.as_deref()),
                })
                .collect();
            print_rows(rows, "registries");
        }
    }
    Ok(())
}

/// Show one registry
pub async fn get_registry(client: &impl CatalogApi, ctx: &CommandContext, name: &str) -> Result<()> {
    let response = client.get_registry(ctx.project()?, name).await?;
    if !proceed(ctx, &response, "error getting registry")? {
        return Ok(());
    }
    let registry: Registry = response.json()?;

    match ctx.format {
        OutputFormat::Json => print_json(&registry)?,
        OutputFormat::Table => {
            print_header("Registry");
            print_field("Name", &registry.name);
            print_field("Display Name", or_dash(registry.display_name.as_deref()));
            print_field("Type", &registry.registry_type);
            print_field("Root URL", &registry.root_url);
            print_field("Username", or_dash(registry.username.as_deref()));
            print_field("Description", or_dash(registry.description.as_deref()));
            if let Some(created) = &registry.create_time {
                print_field("Created", format_timestamp(created));
            }
        }
    }
    Ok(())
}

/// Create a registry
pub async fn create_registry(
    client: &impl CatalogApi,
    ctx: &CommandContext,
    args: &RegistryArgs,
) -> Result<()> {
    let registry = Registry {
        name: args.name.clone(),
        display_name: args.display_name.clone(),
        description: args.description.clone(),
        root_url: args.root_url.clone(),
        registry_type: args.registry_type.to_uppercase(),
        username: args.username.clone(),
        auth_token: args.auth_token.clone(),
        ..Default::default()
    };
    let response = client.create_registry(ctx.project()?, &registry).await?;
    if !proceed(ctx, &response, "error while creating registry")? {
        return Ok(());
    }
    print_success(&format!("Registry {} created", args.name));
    Ok(())
}

/// Update a registry
pub async fn set_registry(
    client: &impl CatalogApi,
    ctx: &CommandContext,
    args: &RegistryUpdateArgs,
) -> Result<()> {
    let project = ctx.project()?;
    let response = client.get_registry(project, &args.name).await?;
    if !proceed(ctx, &response, "error getting registry")? {
        return Ok(());
    }

    let registry = apply_registry_update(response.json()?, args);
    let response = client.update_registry(project, &args.name, &registry).await?;
    if !proceed(ctx, &response, "error while updating registry")? {
        return Ok(());
    }
    print_success(&format!("Registry {} updated", args.name));
    Ok(())
}

/// Delete a registry
pub async fn delete_registry(client: &impl CatalogApi, ctx: &CommandContext, name: &str) -> Result<()> {
    let response = client.delete_registry(ctx.project()?, name).await?;
    if !proceed(ctx, &response, "error deleting registry")? {
        return Ok(());
    }
    print_success(&format!("Registry {} deleted", name));
    Ok(())
}

/// List applications
pub async fn list_applications(
    client: &impl CatalogApi,
    ctx: &CommandContext,
    args: &ListArgs,
) -> Result<()> {
    let response = client
        .list_applications(ctx.project()?, &ListOptions::from(args))
        .await?;

    let applications = if proceed(ctx, &response, "error listing applications")? {
        response.json::<ApplicationList>()?.applications
    } else {
        Vec::new()
    };

    match ctx.format {
        OutputFormat::Json => print_json(&applications)?,
        OutputFormat::Table => {
            let rows: Vec<ApplicationRow> = applications
                .iter()
                .map(|a| ApplicationRow {
                    name: a.name.clone(),
                    version: a.version.clone(),
                    chart: format!("{}:{}", a.chart_name, a.chart_version),
                    registry: a.helm_registry_name.clone(),
                    profiles: a.profiles.len(),
                })
                .collect();
            print_rows(rows, "applications");
        }
    }
    Ok(())
}

/// Show one application version
pub async fn get_application(
    client: &impl CatalogApi,
    ctx: &CommandContext,
    name: &str,
    version: &str,
) -> Result<()> {
    let response = client.get_application(ctx.project()?, name, version).await?;
    if !proceed(ctx, &response, "error getting application")? {
        return Ok(());
    }
    let app: Application = response.json()?;

    match ctx.format {
        OutputFormat::Json => print_json(&app)?,
        OutputFormat::Table => {
            print_header("Application");
            print_field("Name", &app.name);
            print_field("Version", &app.version);
            print_field("Display Name", or_dash(app.display_name.as_deref()));
            print_field("Chart", format!("{}:{}", app.chart_name, app.chart_version));
            print_field("Helm Registry", &app.helm_registry_name);
            print_field("Image Registry", or_dash(app.image_registry_name.as_deref()));
            print_field("Default Profile", or_dash(app.default_profile_name.as_deref()));
            for profile in &app.profiles {
                let params: Vec<&str> = profile
                    .parameter_templates
                    .iter()
                    .map(|t| t.name.as_str())
                    .collect();
                if params.is_empty() {
                    print_field("Profile", &profile.name);
                } else {
                    print_field("Profile", format!("{} ({})", profile.name, params.join(", ")));
                }
                if ctx.verbose {
                    if let Some(values) = &profile.chart_values {
                        println!("{}", values);
                    }
                }
            }
        }
    }
    Ok(())
}

/// Create an application version
pub async fn create_application(
    client: &impl CatalogApi,
    ctx: &CommandContext,
    args: &ApplicationArgs,
) -> Result<()> {
    let app = Application {
        name: args.name.clone(),
        version: args.version.clone(),
        display_name: args.display_name.clone(),
        description: args.description.clone(),
        chart_name: args.chart_name.clone(),
        chart_version: args.chart_version.clone(),
        helm_registry_name: args.helm_registry.clone(),
        image_registry_name: args.image_registry.clone(),
        ..Default::default()
    };
    let response = client.create_application(ctx.project()?, &app).await?;
    if !proceed(ctx, &response, "error while creating application")? {
        return Ok(());
    }
    print_success(&format!("Application {} {} created", args.name, args.version));
    Ok(())
}

/// Delete an application version
pub async fn delete_application(
    client: &impl CatalogApi,
    ctx: &CommandContext,
    name: &str,
    version: &str,
) -> Result<()> {
    let response = client.delete_application(ctx.project()?, name, version).await?;
    if !proceed(ctx, &response, "error deleting application")? {
        return Ok(());
    }
    print_success(&format!("Application {} {} deleted", name, version));
    Ok(())
}

/// Add a profile to an application version
pub async fn create_profile(
    client: &impl CatalogApi,
    ctx: &CommandContext,
    args: &ProfileArgs,
) -> Result<()> {
    let profile = build_profile(args)?;
    debug!(
        profile = %profile.name,
        templates = profile.parameter_templates.len(),
        "Creating profile"
    );

    let response = client
        .create_profile(ctx.project()?, &args.app_name, &args.app_version, &profile)
        .await?;
    if !proceed(ctx, &response, "error while creating profile")? {
        return Ok(());
    }
    print_success(&format!(
        "Profile {} created for {} {}",
        args.name, args.app_name, args.app_version
    ));
    Ok(())
}

/// Remove a profile from an application version
pub async fn delete_profile(
    client: &impl CatalogApi,
    ctx: &CommandContext,
    app_name: &str,
    app_version: &str,
    name: &str,
) -> Result<()> {
    let response = client
        .delete_profile(ctx.project()?, app_name, app_version, name)
        .await?;
    if !proceed(ctx, &response, "error deleting profile")? {
        return Ok(());
    }
    print_success(&format!("Profile {} deleted", name));
    Ok(())
}
