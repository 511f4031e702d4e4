//! Organization and project commands

use anyhow::Result;
use orch_lib::models::{TenancyResource, TenancySpec};
use orch_lib::services::TenancyApi;
use orch_lib::ApiResponse;
use tabled::Tabled;

use super::{proceed, CommandContext};
use crate::output::{color_status, or_dash, print_field, print_header, print_json, print_rows, print_success, OutputFormat};

/// Which tenancy collection a command addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tenancy {
    Organization,
    Project,
}

impl Tenancy {
    fn singular(self) -> &'static str {
        match self {
            Tenancy::Organization => "organization",
            Tenancy::Project => "project",
        }
    }

    fn plural(self) -> &'static str {
        match self {
            Tenancy::Organization => "organizations",
            Tenancy::Project => "projects",
        }
    }

    fn title(self) -> &'static str {
        match self {
            Tenancy::Organization => "Organization",
            Tenancy::Project => "Project",
        }
    }
}

#[derive(Tabled)]
struct TenancyRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Description")]
    description: String,
}

fn status(resource: &TenancyResource) -> String {
    resource
        .status
        .as_ref()
        .and_then(|s| s.status_indicator.as_deref())
        .map(color_status)
        .unwrap_or_else(|| "-".to_string())
}

/// List organizations or projects
pub async fn list(client: &impl TenancyApi, ctx: &CommandContext, kind: Tenancy) -> Result<()> {
    let response = match kind {
        Tenancy::Organization => client.list_organizations().await?,
        Tenancy::Project => client.list_projects().await?,
    };

    let items: Vec<TenancyResource> =
        if proceed(ctx, &response, &format!("error listing {}", kind.plural()))? {
            response.json()?
        } else {
            Vec::new()
        };

    match ctx.format {
        OutputFormat::Json => print_json(&items)?,
        OutputFormat::Table => {
            let rows: Vec<TenancyRow> = items
                .iter()
                .map(|r| TenancyRow {
                    name: r.name.clone(),
                    status: status(r),
                    description: or_dash(Some(r.spec.description.as_str())),
                })
                .collect();
            print_rows(rows, kind.plural());
        }
    }
    Ok(())
}

/// Show one organization or project
pub async fn get(client: &impl TenancyApi, ctx: &CommandContext, kind: Tenancy, name: &str) -> Result<()> {
    let response = match kind {
        Tenancy::Organization => client.get_organization(name).await?,
        Tenancy::Project => client.get_project(name).await?,
    };
    if !proceed(ctx, &response, &format!("error getting {}", kind.singular()))? {
        return Ok(());
    }

    // The service returns either the bare resource or a one-element list.
    let resource: TenancyResource = match response.json::<Vec<TenancyResource>>() {
        Ok(mut list) if !list.is_empty() => list.remove(0),
        _ => response.json()?,
    };

    match ctx.format {
        OutputFormat::Json => print_json(&resource)?,
        OutputFormat::Table => {
            print_header(kind.title());
            print_field("Name", &resource.name);
            print_field("Description", or_dash(Some(resource.spec.description.as_str())));
            print_field("Status", status(&resource));
            if let Some(message) = resource.status.as_ref().and_then(|s| s.message.as_deref()) {
                print_field("Message", message);
            }
        }
    }
    Ok(())
}

/// Create an organization or project
pub async fn create(
    client: &impl TenancyApi,
    ctx: &CommandContext,
    kind: Tenancy,
    name: &str,
    description: Option<&str>,
) -> Result<()> {
    let spec = TenancySpec {
        description: description.unwrap_or(name).to_string(),
    };
    let response: ApiResponse = match kind {
        Tenancy::Organization => client.create_organization(name, &spec).await?,
        Tenancy::Project => client.create_project(name, &spec).await?,
    };
    if !proceed(ctx, &response, &format!("error while creating {}", kind.singular()))? {
        return Ok(());
    }
    print_success(&format!("{} {} created", kind.title(), name));
    Ok(())
}

/// Delete an organization or project
pub async fn delete(client: &impl TenancyApi, ctx: &CommandContext, kind: Tenancy, name: &str) -> Result<()> {
    let response = match kind {
        Tenancy::Organization => client.delete_organization(name).await?,
        Tenancy::Project => client.delete_project(name).await?,
    };
    if !proceed(ctx, &response, &format!("error deleting {}", kind.singular()))? {
        return Ok(());
    }
    print_success(&format!("{} {} deletion requested", kind.title(), name));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{ctx, not_found, ok};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeTenancy {
        created: Mutex<Vec<(String, TenancySpec)>>,
    }

    #[async_trait]
    impl TenancyApi for FakeTenancy {
        async fn list_organizations(&self) -> orch_lib::Result<ApiResponse> {
            Ok(ok(r#"[{"name":"acme","spec":{"description":"Acme"},
                      "status":{"orgStatus":{}}}]"#))
        }
        async fn get_organization(&self, _: &str) -> orch_lib::Result<ApiResponse> {
            Ok(ok(r#"{"name":"acme","spec":{"description":"Acme"}}"#))
        }
        async fn create_organization(&self, name: &str, spec: &TenancySpec) -> orch_lib::Result<ApiResponse> {
            self.created.lock().unwrap().push((name.to_string(), spec.clone()));
            Ok(ok("{}"))
        }
        async fn delete_organization(&self, _: &str) -> orch_lib::Result<ApiResponse> {
            Ok(not_found())
        }
        async fn list_projects(&self) -> orch_lib::Result<ApiResponse> {
            Ok(not_found())
        }
        async fn get_project(&self, _: &str) -> orch_lib::Result<ApiResponse> {
            Ok(ok(r#"[{"name":"demo","spec":{"description":"Demo"}}]"#))
        }
        async fn create_project(&self, name: &str, spec: &TenancySpec) -> orch_lib::Result<ApiResponse> {
            self.created.lock().unwrap().push((name.to_string(), spec.clone()));
            Ok(ApiResponse::new(409, "Conflict", r#"{"message":"project demo already exists"}"#))
        }
        async fn delete_project(&self, _: &str) -> orch_lib::Result<ApiResponse> {
            Ok(ok(""))
        }
    }

    #[tokio::test]
    async fn test_create_defaults_description_to_name() {
        let fake = FakeTenancy::default();
        create(&fake, &ctx(), Tenancy::Organization, "acme", None).await.unwrap();
        let created = fake.created.lock().unwrap();
        assert_eq!(created[0].1.description, "acme");
    }

    #[tokio::test]
    async fn test_create_conflict_reports_message() {
        let fake = FakeTenancy::default();
        let err = create(&fake, &ctx(), Tenancy::Project, "demo", Some("Demo"))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "error while creating project: project demo already exists"
        );
    }

    #[tokio::test]
    async fn test_list_get_delete() {
        let fake = FakeTenancy::default();
        list(&fake, &ctx(), Tenancy::Organization).await.unwrap();
        list(&fake, &ctx(), Tenancy::Project).await.unwrap();
        get(&fake, &ctx(), Tenancy::Organization, "acme").await.unwrap();
        get(&fake, &ctx(), Tenancy::Project, "demo").await.unwrap();
        delete(&fake, &ctx(), Tenancy::Organization, "gone").await.unwrap();
    }
}
