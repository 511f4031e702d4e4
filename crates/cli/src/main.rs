//! Edge Orchestrator CLI
//!
//! A command-line tool for managing edge infrastructure, the application
//! catalog, deployments, clusters, tenancy and AMT provisioning.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{
    amt, catalog, cluster, deployment, host, location, package, tenancy, CommandContext, ListArgs,
};
use orch_lib::observability::{init_tracing, DEFAULT_LOG_FILTER};
use orch_lib::OrchError;
use output::OutputFormat;
use tenancy::Tenancy;
use tracing::debug;

/// Filter used for `--verbose` when RUST_LOG is unset
const VERBOSE_LOG_FILTER: &str = "warn,orch_lib=debug,orch_cli=debug";

/// Edge Orchestrator CLI
#[derive(Parser)]
#[command(name = "orch-cli")]
#[command(author, version, about = "CLI for the Edge Orchestrator platform", long_about = None)]
pub struct Cli {
    /// API gateway URL
    #[arg(long, env = "ORCH_API_ENDPOINT", global = true)]
    pub api_endpoint: Option<String>,

    /// Project for project-scoped commands
    #[arg(long, short, env = "ORCH_PROJECT", global = true)]
    pub project: Option<String>,

    /// Bearer token for the API gateway
    #[arg(long, env = "ORCH_API_TOKEN", hide_env_values = true, global = true)]
    pub api_token: Option<String>,

    /// Output format
    #[arg(long, short, global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List resources
    #[command(subcommand)]
    List(ListCommands),

    /// Show one resource
    #[command(subcommand)]
    Get(GetCommands),

    /// Create a resource
    #[command(subcommand)]
    Create(CreateCommands),

    /// Update a resource
    #[command(subcommand)]
    Set(SetCommands),

    /// Delete a resource
    #[command(subcommand)]
    Delete(DeleteCommands),

    /// Show or change the CLI configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
pub enum ListCommands {
    /// List edge hosts
    Hosts(ListArgs),
    /// List regions
    Regions(ListArgs),
    /// List sites of a region
    Sites {
        /// Region ID
        #[arg(long)]
        region: String,
        #[command(flatten)]
        list: ListArgs,
    },
    /// List registries
    Registries(ListArgs),
    /// List applications
    Applications(ListArgs),
    /// List deployment packages
    DeploymentPackages(ListArgs),
    /// List deployments
    Deployments(ListArgs),
    /// List clusters
    Clusters(ListArgs),
    /// List organizations
    Organizations,
    /// List projects
    Projects,
    /// List AMT profiles
    Amtprofiles,
    /// List AMT domains
    Amtdomains,
}

#[derive(Subcommand)]
pub enum GetCommands {
    /// Show a host
    Host { host_id: String },
    /// Show a region
    Region { region_id: String },
    /// Show a site
    Site {
        site_id: String,
        /// Region ID
        #[arg(long)]
        region: String,
    },
    /// Show a registry
    Registry { name: String },
    /// Show an application version
    Application { name: String, version: String },
    /// Show a deployment package version
    DeploymentPackage { name: String, version: String },
    /// Show a deployment
    Deployment { deployment_id: String },
    /// Show a cluster
    Cluster { name: String },
    /// Show an organization
    Organization { name: String },
    /// Show a project
    Project { name: String },
    /// Show an AMT profile
    Amtprofile { name: String },
}

#[derive(Subcommand)]
pub enum CreateCommands {
    /// Register a host
    Host(host::RegisterArgs),
    /// Create a region
    Region(location::RegionArgs),
    /// Create a site
    Site(location::SiteArgs),
    /// Create a registry
    Registry(catalog::RegistryArgs),
    /// Create an application version
    Application(catalog::ApplicationArgs),
    /// Add a profile to an application version
    Profile(catalog::ProfileArgs),
    /// Create a deployment package
    DeploymentPackage(package::PackageArgs),
    /// Deploy a package
    Deployment(deployment::CreateArgs),
    /// Create a cluster
    Cluster(cluster::ClusterArgs),
    /// Create an organization
    Organization {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Create a project
    Project {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Create an AMT profile
    Amtprofile(amt::AmtProfileArgs),
    /// Create an AMT domain
    Amtdomain(amt::AmtDomainArgs),
}

#[derive(Subcommand)]
pub enum SetCommands {
    /// Update a host
    Host(host::UpdateArgs),
    /// Update a registry
    Registry(catalog::RegistryUpdateArgs),
    /// Update a deployment
    Deployment(deployment::SetArgs),
}

#[derive(Subcommand)]
pub enum DeleteCommands {
    /// Delete a host
    Host { host_id: String },
    /// Delete a region
    Region { region_id: String },
    /// Delete a site
    Site {
        site_id: String,
        /// Region ID
        #[arg(long)]
        region: String,
    },
    /// Delete a registry
    Registry { name: String },
    /// Delete an application version
    Application { name: String, version: String },
    /// Delete a profile of an application version
    Profile {
        app_name: String,
        app_version: String,
        name: String,
    },
    /// Delete a deployment package version
    DeploymentPackage { name: String, version: String },
    /// Delete a deployment
    Deployment { deployment_id: String },
    /// Delete a cluster
    Cluster { name: String },
    /// Delete an organization
    Organization { name: String },
    /// Delete a project
    Project { name: String },
    /// Delete an AMT profile
    Amtprofile { name: String },
    /// Delete an AMT domain
    Amtdomain { name: String },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the stored configuration
    Show,
    /// Set a configuration key (api-endpoint, project, api-token, format)
    Set { key: String, value: String },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        VERBOSE_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    };
    init_tracing(cli.log_json, filter);

    if let Err(err) = run(cli).await {
        output::print_error(&format!("{:#}", err));
        if err
            .downcast_ref::<OrchError>()
            .is_some_and(OrchError::is_auth_failure)
        {
            eprintln!("Set a token with --api-token or `orch-cli config set api-token <token>`");
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let path = config::Config::config_path()?;
    let settings = config::Config::load_from(&path)?;

    let format = cli
        .format
        .or_else(|| settings.format.as_deref().and_then(OutputFormat::from_config))
        .unwrap_or_default();

    // Config commands work without a reachable endpoint.
    let cmd = match cli.command {
        Commands::Config(ConfigCommands::Show) => {
            return commands::config::show(&settings, &path, format);
        }
        Commands::Config(ConfigCommands::Set { key, value }) => {
            return commands::config::set(&path, &key, &value);
        }
        other => other,
    };

    let endpoint = cli
        .api_endpoint
        .or(settings.api_endpoint)
        .unwrap_or_else(|| config::DEFAULT_API_ENDPOINT.to_string());
    let token = cli.api_token.or(settings.api_token);
    let ctx = CommandContext {
        project: cli.project.or(settings.project),
        format,
        verbose: cli.verbose,
    };
    debug!(endpoint = %endpoint, project = ?ctx.project, "Resolved settings");

    let client = client::ApiClient::new(&endpoint, token)?;

    match cmd {
        Commands::List(list_cmd) => run_list(&client, &ctx, list_cmd).await,
        Commands::Get(get_cmd) => run_get(&client, &ctx, get_cmd).await,
        Commands::Create(create_cmd) => run_create(&client, &ctx, create_cmd).await,
        Commands::Set(set_cmd) => run_set(&client, &ctx, set_cmd).await,
        Commands::Delete(delete_cmd) => run_delete(&client, &ctx, delete_cmd).await,
        Commands::Config(_) => Ok(()),
    }
}

async fn run_list(client: &client::ApiClient, ctx: &CommandContext, cmd: ListCommands) -> Result<()> {
    match cmd {
        ListCommands::Hosts(args) => host::list_hosts(client, ctx, &args).await,
        ListCommands::Regions(args) => location::list_regions(client, ctx, &args).await,
        ListCommands::Sites { region, list } => location::list_sites(client, ctx, &region, &list).await,
        ListCommands::Registries(args) => catalog::list_registries(client, ctx, &args).await,
        ListCommands::Applications(args) => catalog::list_applications(client, ctx, &args).await,
        ListCommands::DeploymentPackages(args) => package::list_packages(client, ctx, &args).await,
        ListCommands::Deployments(args) => deployment::list_deployments(client, ctx, &args).await,
        ListCommands::Clusters(args) => cluster::list_clusters(client, ctx, &args).await,
        ListCommands::Organizations => tenancy::list(client, ctx, Tenancy::Organization).await,
        ListCommands::Projects => tenancy::list(client, ctx, Tenancy::Project).await,
        ListCommands::Amtprofiles => amt::list_profiles(client, ctx).await,
        ListCommands::Amtdomains => amt::list_domains(client, ctx).await,
    }
}

async fn run_get(client: &client::ApiClient, ctx: &CommandContext, cmd: GetCommands) -> Result<()> {
    match cmd {
        GetCommands::Host { host_id } => host::get_host(client, ctx, &host_id).await,
        GetCommands::Region { region_id } => location::get_region(client, ctx, &region_id).await,
        GetCommands::Site { site_id, region } => {
            location::get_site(client, ctx, &region, &site_id).await
        }
        GetCommands::Registry { name } => catalog::get_registry(client, ctx, &name).await,
        GetCommands::Application { name, version } => {
            catalog::get_application(client, ctx, &name, &version).await
        }
        GetCommands::DeploymentPackage { name, version } => {
            package::get_package(client, ctx, &name, &version).await
        }
        GetCommands::Deployment { deployment_id } => {
            deployment::get_deployment(client, ctx, &deployment_id).await
        }
        GetCommands::Cluster { name } => cluster::get_cluster(client, ctx, &name).await,
        GetCommands::Organization { name } => {
            tenancy::get(client, ctx, Tenancy::Organization, &name).await
        }
        GetCommands::Project { name } => tenancy::get(client, ctx, Tenancy::Project, &name).await,
        GetCommands::Amtprofile { name } => amt::get_profile(client, ctx, &name).await,
    }
}

async fn run_create(client: &client::ApiClient, ctx: &CommandContext, cmd: CreateCommands) -> Result<()> {
    match cmd {
        CreateCommands::Host(args) => host::register_host(client, ctx, &args).await,
        CreateCommands::Region(args) => location::create_region(client, ctx, &args).await,
        CreateCommands::Site(args) => location::create_site(client, ctx, &args).await,
        CreateCommands::Registry(args) => catalog::create_registry(client, ctx, &args).await,
        CreateCommands::Application(args) => catalog::create_application(client, ctx, &args).await,
        CreateCommands::Profile(args) => catalog::create_profile(client, ctx, &args).await,
        CreateCommands::DeploymentPackage(args) => package::create_package(client, ctx, &args).await,
        CreateCommands::Deployment(args) => deployment::create_deployment(client, ctx, &args).await,
        CreateCommands::Cluster(args) => cluster::create_cluster(client, ctx, &args).await,
        CreateCommands::Organization { name, description } => {
            tenancy::create(client, ctx, Tenancy::Organization, &name, description.as_deref()).await
        }
        CreateCommands::Project { name, description } => {
            tenancy::create(client, ctx, Tenancy::Project, &name, description.as_deref()).await
        }
        CreateCommands::Amtprofile(args) => amt::create_profile(client, ctx, &args).await,
        CreateCommands::Amtdomain(args) => amt::create_domain(client, ctx, &args).await,
    }
}

async fn run_set(client: &client::ApiClient, ctx: &CommandContext, cmd: SetCommands) -> Result<()> {
    match cmd {
        SetCommands::Host(args) => host::update_host(client, ctx, &args).await,
        SetCommands::Registry(args) => catalog::set_registry(client, ctx, &args).await,
        SetCommands::Deployment(args) => deployment::set_deployment(client, ctx, &args).await,
    }
}

async fn run_delete(client: &client::ApiClient, ctx: &CommandContext, cmd: DeleteCommands) -> Result<()> {
    match cmd {
        DeleteCommands::Host { host_id } => host::delete_host(client, ctx, &host_id).await,
        DeleteCommands::Region { region_id } => location::delete_region(client, ctx, &region_id).await,
        DeleteCommands::Site { site_id, region } => {
            location::delete_site(client, ctx, &region, &site_id).await
        }
        DeleteCommands::Registry { name } => catalog::delete_registry(client, ctx, &name).await,
        DeleteCommands::Application { name, version } => {
            catalog::delete_application(client, ctx, &name, &version).await
        }
        DeleteCommands::Profile {
            app_name,
            app_version,
            name,
        } => catalog::delete_profile(client, ctx, &app_name, &app_version, &name).await,
        DeleteCommands::DeploymentPackage { name, version } => {
            package::delete_package(client, ctx, &name, &version).await
        }
        DeleteCommands::Deployment { deployment_id } => {
            deployment::delete_deployment(client, ctx, &deployment_id).await
        }
        DeleteCommands::Cluster { name } => cluster::delete_cluster(client, ctx, &name).await,
        DeleteCommands::Organization { name } => {
            tenancy::delete(client, ctx, Tenancy::Organization, &name).await
        }
        DeleteCommands::Project { name } => tenancy::delete(client, ctx, Tenancy::Project, &name).await,
        DeleteCommands::Amtprofile { name } => amt::delete_profile(client, ctx, &name).await,
        DeleteCommands::Amtdomain { name } => amt::delete_domain(client, ctx, &name).await,
    }
}
