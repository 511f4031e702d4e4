//! Region and site commands

use anyhow::Result;
use clap::Args;
use orch_lib::models::{ListOptions, MetadataItem, Region, RegionList, Site, SiteList};
use orch_lib::services::InfraApi;
use tabled::Tabled;

use super::{parse_key_value, proceed, CommandContext, ListArgs};
use crate::output::{or_dash, print_field, print_header, print_json, print_rows, print_success, OutputFormat};

#[derive(Debug, Clone, Args)]
pub struct RegionArgs {
    /// Region name
    pub name: String,

    /// Parent region ID
    #[arg(long)]
    pub parent: Option<String>,

    /// Metadata entry (<key>=<value>)
    #[arg(long, value_parser = parse_key_value)]
    pub metadata: Vec<(String, String)>,
}

#[derive(Debug, Clone, Args)]
pub struct SiteArgs {
    /// Site name
    pub name: String,

    /// Region the site belongs to
    #[arg(long)]
    pub region: String,

    /// Latitude in 1e-7 degrees
    #[arg(long, allow_hyphen_values = true)]
    pub latitude: Option<i32>,

    /// Longitude in 1e-7 degrees
    #[arg(long, allow_hyphen_values = true)]
    pub longitude: Option<i32>,

    /// Metadata entry (<key>=<value>)
    #[arg(long, value_parser = parse_key_value)]
    pub metadata: Vec<(String, String)>,
}

#[derive(Tabled)]
struct RegionRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Resource ID")]
    resource_id: String,
    #[tabled(rename = "Parent")]
    parent: String,
    #[tabled(rename = "Sites")]
    sites: String,
}

#[derive(Tabled)]
struct SiteRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Resource ID")]
    resource_id: String,
    #[tabled(rename = "Region")]
    region: String,
}

fn metadata(pairs: &[(String, String)]) -> Vec<MetadataItem> {
    pairs
        .iter()
        .map(|(key, value)| MetadataItem {
            key: key.clone(),
            value: value.clone(),
        })
        .collect()
}

fn print_metadata(items: &[MetadataItem]) {
    for item in items {
        print_field(&format!("  {}", item.key), &item.value);
    }
}

/// List regions
pub async fn list_regions(client: &impl InfraApi, ctx: &CommandContext, args: &ListArgs) -> Result<()> {
    let response = client
        .list_regions(ctx.project()?, &ListOptions::from(args))
        .await?;

    let regions = if proceed(ctx, &response, "error listing regions")? {
        response.json::<RegionList>()?.regions
    } else {
        Vec::new()
    };

    match ctx.format {
        OutputFormat::Json => print_json(&regions)?,
        OutputFormat::Table => {
            let rows: Vec<RegionRow> = regions
                .iter()
                .map(|r| RegionRow {
                    name: r.name.clone(),
                    resource_id: or_dash(r.resource_id.as_deref()),
                    parent: or_dash(r.parent_id.as_deref()),
                    sites: r
                        .total_sites
                        .map(|n| n.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                })
                .collect();
            print_rows(rows, "regions");
        }
    }
    Ok(())
}

/// Show one region
pub async fn get_region(client: &impl InfraApi, ctx: &CommandContext, region_id: &str) -> Result<()> {
    let response = client.get_region(ctx.project()?, region_id).await?;
    if !proceed(ctx, &response, "error getting region")? {
        return Ok(());
    }
    let region: Region = response.json()?;

    match ctx.format {
        OutputFormat::Json => print_json(&region)?,
        OutputFormat::Table => {
            print_header("Region");
            print_field("Name", &region.name);
            print_field("Resource ID", or_dash(region.resource_id.as_deref()));
            print_field("Parent", or_dash(region.parent_id.as_deref()));
            print_metadata(&region.metadata);
        }
    }
    Ok(())
}

/// Create a region
pub async fn create_region(client: &impl InfraApi, ctx: &CommandContext, args: &RegionArgs) -> Result<()> {
    let region = Region {
        name: args.name.clone(),
        parent_id: args.parent.clone(),
        metadata: metadata(&args.metadata),
        ..Default::default()
    };
    let response = client.create_region(ctx.project()?, &region).await?;
    if !proceed(ctx, &response, "error while creating region")? {
        return Ok(());
    }

    let id = response
        .json::<Region>()
        .ok()
        .and_then(|r| r.resource_id)
        .unwrap_or_default();
    print_success(&format!("Region {} created {}", args.name, id));
    Ok(())
}

/// Delete a region
pub async fn delete_region(client: &impl InfraApi, ctx: &CommandContext, region_id: &str) -> Result<()> {
    let response = client.delete_region(ctx.project()?, region_id).await?;
    if !proceed(ctx, &response, "error deleting region")? {
        return Ok(());
    }
    print_success(&format!("Region {} deleted", region_id));
    Ok(())
}

/// List sites of a region
pub async fn list_sites(
    client: &impl InfraApi,
    ctx: &CommandContext,
    region_id: &str,
    args: &ListArgs,
) -> Result<()> {
    let response = client
        .list_sites(ctx.project()?, region_id, &ListOptions::from(args))
        .await?;

    let sites = if proceed(ctx, &response, "error listing sites")? {
        response.json::<SiteList>()?.sites
    } else {
        Vec::new()
    };

    match ctx.format {
        OutputFormat::Json => print_json(&sites)?,
        OutputFormat::Table => {
            let rows: Vec<SiteRow> = sites
                .iter()
                .map(|s| SiteRow {
                    name: s.name.clone(),
                    resource_id: or_dash(s.resource_id.as_deref()),
                    region: or_dash(s.region_id.as_deref()),
                })
                .collect();
            print_rows(rows, "sites");
        }
    }
    Ok(())
}

/// Show one site
pub async fn get_site(
    client: &impl InfraApi,
    ctx: &CommandContext,
    region_id: &str,
    site_id: &str,
) -> Result<()> {
    let response = client.get_site(ctx.project()?, region_id, site_id).await?;
    if !proceed(ctx, &response, "error getting site")? {
        return Ok(());
    }
    let site: Site = response.json()?;

    match ctx.format {
        OutputFormat::Json => print_json(&site)?,
        OutputFormat::Table => {
            print_header("Site");
            print_field("Name", &site.name);
            print_field("Resource ID", or_dash(site.resource_id.as_deref()));
            print_field("Region", or_dash(site.region_id.as_deref()));
            if let (Some(lat), Some(lng)) = (site.site_lat, site.site_lng) {
                print_field("Location", format!("{:.7}, {:.7}", lat as f64 / 1e7, lng as f64 / 1e7));
            }
            print_metadata(&site.metadata);
        }
    }
    Ok(())
}

/// Create a site in a region
pub async fn create_site(client: &impl InfraApi, ctx: &CommandContext, args: &SiteArgs) -> Result<()> {
    let site = Site {
        name: args.name.clone(),
        region_id: Some(args.region.clone()),
        site_lat: args.latitude,
        site_lng: args.longitude,
        metadata: metadata(&args.metadata),
        ..Default::default()
    };
    let response = client.create_site(ctx.project()?, &args.region, &site).await?;
    if !proceed(ctx, &response, "error while creating site")? {
        return Ok(());
    }

    let id = response
        .json::<Site>()
        .ok()
        .and_then(|s| s.resource_id)
        .unwrap_or_default();
    print_success(&format!("Site {} created {}", args.name, id));
    Ok(())
}

/// Delete a site
pub async fn delete_site(
    client: &impl InfraApi,
    ctx: &CommandContext,
    region_id: &str,
    site_id: &str,
) -> Result<()> {
    let response = client.delete_site(ctx.project()?, region_id, site_id).await?;
    if !proceed(ctx, &response, "error deleting site")? {
        return Ok(());
    }
    print_success(&format!("Site {} deleted", site_id));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{ctx, not_found, ok};
    use async_trait::async_trait;
    use orch_lib::models::{HostRegister, HostUpdate};
    use orch_lib::ApiResponse;
    use std::sync::Mutex;

    /// Records the region and site bodies it receives
    #[derive(Default)]
    struct FakeInfra {
        regions: Mutex<Vec<Region>>,
        sites: Mutex<Vec<(String, Site)>>,
    }

    #[async_trait]
    impl InfraApi for FakeInfra {
        async fn list_hosts(&self, _: &str, _: &ListOptions) -> orch_lib::Result<ApiResponse> {
            Ok(not_found())
        }
        async fn get_host(&self, _: &str, _: &str) -> orch_lib::Result<ApiResponse> {
            Ok(not_found())
        }
        async fn register_host(&self, _: &str, _: &HostRegister) -> orch_lib::Result<ApiResponse> {
            Ok(not_found())
        }
        async fn update_host(&self, _: &str, _: &str, _: &HostUpdate) -> orch_lib::Result<ApiResponse> {
            Ok(not_found())
        }
        async fn delete_host(&self, _: &str, _: &str) -> orch_lib::Result<ApiResponse> {
            Ok(not_found())
        }
        async fn list_regions(&self, _: &str, _: &ListOptions) -> orch_lib::Result<ApiResponse> {
            Ok(ok(r#"{"regions":[{"name":"eu","resourceId":"region-1","totalSites":2}]}"#))
        }
        async fn get_region(&self, _: &str, _: &str) -> orch_lib::Result<ApiResponse> {
            Ok(not_found())
        }
        async fn create_region(&self, _: &str, region: &Region) -> orch_lib::Result<ApiResponse> {
            self.regions.lock().unwrap().push(region.clone());
            Ok(ok(r#"{"name":"eu","resourceId":"region-1"}"#))
        }
        async fn delete_region(&self, _: &str, _: &str) -> orch_lib::Result<ApiResponse> {
            Ok(ApiResponse::new(403, "Forbidden", ""))
        }
        async fn list_sites(&self, _: &str, _: &str, _: &ListOptions) -> orch_lib::Result<ApiResponse> {
            Ok(not_found())
        }
        async fn get_site(&self, _: &str, _: &str, _: &str) -> orch_lib::Result<ApiResponse> {
            Ok(not_found())
        }
        async fn create_site(&self, _: &str, region_id: &str, site: &Site) -> orch_lib::Result<ApiResponse> {
            self.sites
                .lock()
                .unwrap()
                .push((region_id.to_string(), site.clone()));
            Ok(ok("{}"))
        }
        async fn delete_site(&self, _: &str, _: &str, _: &str) -> orch_lib::Result<ApiResponse> {
            Ok(not_found())
        }
    }

    #[tokio::test]
    async fn test_create_region_with_metadata() {
        let fake = FakeInfra::default();
        let args = RegionArgs {
            name: "eu".to_string(),
            parent: None,
            metadata: vec![("country".to_string(), "de".to_string())],
        };
        create_region(&fake, &ctx(), &args).await.unwrap();

        let regions = fake.regions.lock().unwrap();
        assert_eq!(regions[0].metadata[0].key, "country");
    }

    #[tokio::test]
    async fn test_create_site_targets_region() {
        let fake = FakeInfra::default();
        let args = SiteArgs {
            name: "plant-7".to_string(),
            region: "region-1".to_string(),
            latitude: Some(485_000_000),
            longitude: Some(-90_000_000),
            metadata: Vec::new(),
        };
        create_site(&fake, &ctx(), &args).await.unwrap();

        let sites = fake.sites.lock().unwrap();
        assert_eq!(sites[0].0, "region-1");
        assert_eq!(sites[0].1.site_lng, Some(-90_000_000));
    }

    #[tokio::test]
    async fn test_list_and_missing_lookups() {
        let fake = FakeInfra::default();
        list_regions(&fake, &ctx(), &ListArgs::default()).await.unwrap();
        list_sites(&fake, &ctx(), "region-1", &ListArgs::default()).await.unwrap();
        get_region(&fake, &ctx(), "region-x").await.unwrap();
        delete_site(&fake, &ctx(), "region-1", "site-x").await.unwrap();
    }

    #[tokio::test]
    async fn test_forbidden_delete() {
        let fake = FakeInfra::default();
        let err = delete_region(&fake, &ctx(), "region-1").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "error deleting region: Forbidden. Unauthenticated. Please login"
        );
    }
}
