//! Edge host commands

use anyhow::{bail, Result};
use clap::Args;
use orch_lib::models::{Host, HostList, HostRegister, HostUpdate, ListOptions, MetadataItem};
use orch_lib::services::InfraApi;
use tabled::Tabled;

use super::{parse_key_value, proceed, CommandContext, ListArgs};
use crate::output::{
    color_status, or_dash, print_field, print_header, print_json, print_rows, print_success,
    truncate, OutputFormat,
};

#[derive(Debug, Clone, Args)]
pub struct RegisterArgs {
    /// Host name
    pub name: String,

    /// Hardware serial number
    #[arg(long)]
    pub serial_number: Option<String>,

    /// System UUID
    #[arg(long)]
    pub uuid: Option<String>,

    /// Onboard automatically once the host connects
    #[arg(long)]
    pub auto_onboard: bool,
}

#[derive(Debug, Clone, Args)]
pub struct UpdateArgs {
    /// Host resource ID
    pub host_id: String,

    /// New host name
    #[arg(long)]
    pub name: Option<String>,

    /// Site to place the host in
    #[arg(long)]
    pub site: Option<String>,

    /// Metadata entry (<key>=<value>), replaces existing metadata
    #[arg(long, value_parser = parse_key_value)]
    pub metadata: Vec<(String, String)>,
}

/// Row for hosts table
#[derive(Tabled)]
struct HostRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Resource ID")]
    resource_id: String,
    #[tabled(rename = "Serial")]
    serial: String,
    #[tabled(rename = "Site")]
    site: String,
    #[tabled(rename = "Status")]
    status: String,
}

/// Build the registration body; a host must be identifiable by hardware
pub fn build_register(args: &RegisterArgs) -> Result<HostRegister> {
    if args.serial_number.is_none() && args.uuid.is_none() {
        bail!("host {} needs --serial-number or --uuid", args.name);
    }
    Ok(HostRegister {
        name: args.name.clone(),
        serial_number: args.serial_number.clone(),
        uuid: args.uuid.clone(),
        auto_onboard: args.auto_onboard,
    })
}

/// Build the partial update body from `set host` flags
pub fn build_update(args: &UpdateArgs) -> Result<HostUpdate> {
    let update = HostUpdate {
        name: args.name.clone(),
        site_id: args.site.clone(),
        metadata: (!args.metadata.is_empty()).then(|| {
            args.metadata
                .iter()
                .map(|(key, value)| MetadataItem {
                    key: key.clone(),
                    value: value.clone(),
                })
                .collect()
        }),
    };
    if update == HostUpdate::default() {
        bail!("nothing to update: pass --name, --site or --metadata");
    }
    Ok(update)
}

fn host_status(host: &Host) -> String {
    color_status(host.host_status.as_deref().unwrap_or("UNKNOWN"))
}

/// List hosts
pub async fn list_hosts(client: &impl InfraApi, ctx: &CommandContext, args: &ListArgs) -> Result<()> {
    let response = client
        .list_hosts(ctx.project()?, &ListOptions::from(args))
        .await?;

    let hosts = if proceed(ctx, &response, "error listing hosts")? {
        response.json::<HostList>()?.hosts
    } else {
        Vec::new()
    };

    match ctx.format {
        OutputFormat::Json => print_json(&hosts)?,
        OutputFormat::Table => {
            let rows: Vec<HostRow> = hosts
                .iter()
                .map(|h| HostRow {
                    name: h.name.clone(),
                    resource_id: or_dash(h.resource_id.as_deref()),
                    serial: if ctx.verbose {
                        or_dash(h.serial_number.as_deref())
                    } else {
                        truncate(&or_dash(h.serial_number.as_deref()), 16)
                    },
                    site: or_dash(h.site_id.as_deref()),
                    status: host_status(h),
                })
                .collect();
            print_rows(rows, "hosts");
        }
    }

    Ok(())
}

/// Show one host
pub async fn get_host(client: &impl InfraApi, ctx: &CommandContext, host_id: &str) -> Result<()> {
    let response = client.get_host(ctx.project()?, host_id).await?;
    if !proceed(ctx, &response, "error getting host")? {
        return Ok(());
    }
    let host: Host = response.json()?;

    match ctx.format {
        OutputFormat::Json => print_json(&host)?,
        OutputFormat::Table => {
            print_header("Host");
            print_field("Name", &host.name);
            print_field("Resource ID", or_dash(host.resource_id.as_deref()));
            print_field("UUID", or_dash(host.uuid.as_deref()));
            print_field("Serial Number", or_dash(host.serial_number.as_deref()));
            print_field("Site", or_dash(host.site_id.as_deref()));
            print_field("Host Status", host_status(&host));
            print_field("Onboarding", or_dash(host.onboarding_status.as_deref()));
            print_field("Provisioning", or_dash(host.provisioning_status.as_deref()));
            for item in &host.metadata {
                print_field(&format!("  {}", item.key), &item.value);
            }
        }
    }

    Ok(())
}

/// Register a host
pub async fn register_host(
    client: &impl InfraApi,
    ctx: &CommandContext,
    args: &RegisterArgs,
) -> Result<()> {
    let body = build_register(args)?;
    let response = client.register_host(ctx.project()?, &body).await?;
    if !proceed(ctx, &response, "error while registering host")? {
        return Ok(());
    }

    match ctx.format {
        OutputFormat::Json => println!("{}", response.body),
        OutputFormat::Table => {
            let id = response
                .json::<Host>()
                .ok()
                .and_then(|h| h.resource_id)
                .unwrap_or_default();
            print_success(&format!("Host {} registered {}", args.name, id));
        }
    }
    Ok(())
}

/// Update a host
pub async fn update_host(client: &impl InfraApi, ctx: &CommandContext, args: &UpdateArgs) -> Result<()> {
    let body = build_update(args)?;
    let response = client.update_host(ctx.project()?, &args.host_id, &body).await?;
    if !proceed(ctx, &response, "error while updating host")? {
        return Ok(());
    }
    print_success(&format!("Host {} updated", args.host_id));
    Ok(())
}

/// Delete a host
pub async fn delete_host(client: &impl InfraApi, ctx: &CommandContext, host_id: &str) -> Result<()> {
    let response = client.delete_host(ctx.project()?, host_id).await?;
    if !proceed(ctx, &response, "error deleting host")? {
        return Ok(());
    }
    print_success(&format!("Host {} deleted", host_id));
    Ok(())
}
