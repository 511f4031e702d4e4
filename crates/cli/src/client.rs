//! HTTP client for the orchestrator services
//!
//! One [`ApiClient`] talks to every service behind the platform's API
//! gateway and implements each service trait from `orch_lib::services`.

use anyhow::Context;
use async_trait::async_trait;
use orch_lib::models::{
    AmtDomain, AmtProfile, Application, ClusterSpec, Deployment, DeploymentPackage, HostRegister,
    HostUpdate, ListOptions, Profile, Region, Registry, Site, TenancySpec,
};
use orch_lib::observability::RequestLogger;
use orch_lib::services::{CatalogApi, ClusterApi, DeploymentApi, InfraApi, RpsApi, TenancyApi};
use orch_lib::{ApiResponse, OrchError};
use reqwest::{Client, Method};
use serde::Serialize;
use std::time::Instant;
use url::Url;

type OrchResult<T> = orch_lib::Result<T>;

const INFRA: &str = "infra";
const CATALOG: &str = "catalog";
const DEPLOYMENT: &str = "deployment";
const CLUSTER: &str = "cluster";
const TENANCY: &str = "tenancy";
const RPS: &str = "rps";

/// API client for the orchestrator gateway
pub struct ApiClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str, token: Option<String>) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Invalid API URL: {} cannot be used as a base", base_url);
        }

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    /// Build an endpoint URL from path segments (each percent-encoded)
    fn url(&self, segments: &[&str], query: &[(&'static str, String)]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter());
        }
        url
    }

    async fn send<B: Serialize + ?Sized + Sync>(
        &self,
        service: &'static str,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> OrchResult<ApiResponse> {
        let logger = RequestLogger::new(service);
        let context = format!("{} {}", method, url.path());
        logger.log_request(method.as_str(), url.as_str());
        let started = Instant::now();

        let mut request = self.client.request(method.clone(), url.clone());
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                logger.log_no_response(method.as_str(), url.as_str(), &e.to_string());
                return Err(OrchError::NoResponse { context });
            }
        };

        let status = response.status();
        let status_text = status.canonical_reason().unwrap_or("Unknown").to_string();
        let text = response.text().await.map_err(|e| {
            logger.log_no_response(method.as_str(), url.as_str(), &e.to_string());
            OrchError::NoResponse {
                context: context.clone(),
            }
        })?;

        logger.log_response(method.as_str(), url.as_str(), status.as_u16(), started.elapsed());
        Ok(ApiResponse::new(status.as_u16(), status_text, text))
    }

    async fn get(&self, service: &'static str, url: Url) -> OrchResult<ApiResponse> {
        self.send::<()>(service, Method::GET, url, None).await
    }

    async fn delete(&self, service: &'static str, url: Url) -> OrchResult<ApiResponse> {
        self.send::<()>(service, Method::DELETE, url, None).await
    }

    async fn post<B: Serialize + ?Sized + Sync>(
        &self,
        service: &'static str,
        url: Url,
        body: &B,
    ) -> OrchResult<ApiResponse> {
        self.send(service, Method::POST, url, Some(body)).await
    }

    async fn put<B: Serialize + ?Sized + Sync>(
        &self,
        service: &'static str,
        url: Url,
        body: &B,
    ) -> OrchResult<ApiResponse> {
        self.send(service, Method::PUT, url, Some(body)).await
    }

    async fn patch<B: Serialize + ?Sized + Sync>(
        &self,
        service: &'static str,
        url: Url,
        body: &B,
    ) -> OrchResult<ApiResponse> {
        self.send(service, Method::PATCH, url, Some(body)).await
    }
}

fn hosts_path(project: &str) -> [&str; 5] {
    ["v1", "projects", project, "compute", "hosts"]
}

fn catalog_path<'a>(project: &'a str, collection: &'a str) -> [&'a str; 5] {
    ["v3", "projects", project, "catalog", collection]
}

fn deployments_path(project: &str) -> [&str; 6] {
    [
        "deployment.orchestrator.apis",
        "v1",
        "projects",
        project,
        "appdeployment",
        "deployments",
    ]
}

fn amt_path<'a>(project: &'a str, collection: &'a str) -> [&'a str; 7] {
    ["v1", "projects", project, "dm", "amt", "admin", collection]
}

/// Join a fixed prefix with trailing segments
fn join<'a>(prefix: &[&'a str], rest: &[&'a str]) -> Vec<&'a str> {
    prefix.iter().chain(rest.iter()).copied().collect()
}

#[async_trait]
impl InfraApi for ApiClient {
    async fn list_hosts(&self, project: &str, opts: &ListOptions) -> OrchResult<ApiResponse> {
        let url = self.url(&hosts_path(project), &opts.query_pairs());
        self.get(INFRA, url).await
    }

    async fn get_host(&self, project: &str, host_id: &str) -> OrchResult<ApiResponse> {
        let url = self.url(&join(&hosts_path(project), &[host_id]), &[]);
        self.get(INFRA, url).await
    }

    async fn register_host(&self, project: &str, host: &HostRegister) -> OrchResult<ApiResponse> {
        let url = self.url(&join(&hosts_path(project), &["register"]), &[]);
        self.post(INFRA, url, host).await
    }

    async fn update_host(
        &self,
        project: &str,
        host_id: &str,
        update: &HostUpdate,
    ) -> OrchResult<ApiResponse> {
        let url = self.url(&join(&hosts_path(project), &[host_id]), &[]);
        self.patch(INFRA, url, update).await
    }

    async fn delete_host(&self, project: &str, host_id: &str) -> OrchResult<ApiResponse> {
        let url = self.url(&join(&hosts_path(project), &[host_id]), &[]);
        self.delete(INFRA, url).await
    }

    async fn list_regions(&self, project: &str, opts: &ListOptions) -> OrchResult<ApiResponse> {
        let url = self.url(&["v1", "projects", project, "regions"], &opts.query_pairs());
        self.get(INFRA, url).await
    }

    async fn get_region(&self, project: &str, region_id: &str) -> OrchResult<ApiResponse> {
        let url = self.url(&["v1", "projects", project, "regions", region_id], &[]);
        self.get(INFRA, url).await
    }

    async fn create_region(&self, project: &str, region: &Region) -> OrchResult<ApiResponse> {
        let url = self.url(&["v1", "projects", project, "regions"], &[]);
        self.post(INFRA, url, region).await
    }

    async fn delete_region(&self, project: &str, region_id: &str) -> OrchResult<ApiResponse> {
        let url = self.url(&["v1", "projects", project, "regions", region_id], &[]);
        self.delete(INFRA, url).await
    }

    async fn list_sites(
        &self,
        project: &str,
        region_id: &str,
        opts: &ListOptions,
    ) -> OrchResult<ApiResponse> {
        let url = self.url(
            &["v1", "projects", project, "regions", region_id, "sites"],
            &opts.query_pairs(),
        );
        self.get(INFRA, url).await
    }

    async fn get_site(&self, project: &str, region_id: &str, site_id: &str) -> OrchResult<ApiResponse> {
        let url = self.url(
            &["v1", "projects", project, "regions", region_id, "sites", site_id],
            &[],
        );
        self.get(INFRA, url).await
    }

    async fn create_site(&self, project: &str, region_id: &str, site: &Site) -> OrchResult<ApiResponse> {
        let url = self.url(&["v1", "projects", project, "regions", region_id, "sites"], &[]);
        self.post(INFRA, url, site).await
    }

    async fn delete_site(
        &self,
        project: &str,
        region_id: &str,
        site_id: &str,
    ) -> OrchResult<ApiResponse> {
        let url = self.url(
            &["v1", "projects", project, "regions", region_id, "sites", site_id],
            &[],
        );
        self.delete(INFRA, url).await
    }
}

#[async_trait]
impl CatalogApi for ApiClient {
    async fn list_registries(&self, project: &str, opts: &ListOptions) -> OrchResult<ApiResponse> {
        let url = self.url(&catalog_path(project, "registries"), &opts.query_pairs());
        self.get(CATALOG, url).await
    }

    async fn get_registry(&self, project: &str, name: &str) -> OrchResult<ApiResponse> {
        let url = self.url(&join(&catalog_path(project, "registries"), &[name]), &[]);
        self.get(CATALOG, url).await
    }

    async fn create_registry(&self, project: &str, registry: &Registry) -> OrchResult<ApiResponse> {
        let url = self.url(&catalog_path(project, "registries"), &[]);
        self.post(CATALOG, url, registry).await
    }

    async fn update_registry(
        &self,
        project: &str,
        name: &str,
        registry: &Registry,
    ) -> OrchResult<ApiResponse> {
        let url = self.url(&join(&catalog_path(project, "registries"), &[name]), &[]);
        self.put(CATALOG, url, registry).await
    }

    async fn delete_registry(&self, project: &str, name: &str) -> OrchResult<ApiResponse> {
        let url = self.url(&join(&catalog_path(project, "registries"), &[name]), &[]);
        self.delete(CATALOG, url).await
    }

    async fn list_applications(&self, project: &str, opts: &ListOptions) -> OrchResult<ApiResponse> {
        let url = self.url(&catalog_path(project, "applications"), &opts.query_pairs());
        self.get(CATALOG, url).await
    }

    async fn get_application(&self, project: &str, name: &str, version: &str) -> OrchResult<ApiResponse> {
        let url = self.url(
            &join(&catalog_path(project, "applications"), &[name, "versions", version]),
            &[],
        );
        self.get(CATALOG, url).await
    }

    async fn create_application(&self, project: &str, app: &Application) -> OrchResult<ApiResponse> {
        let url = self.url(&catalog_path(project, "applications"), &[]);
        self.post(CATALOG, url, app).await
    }

    async fn delete_application(
        &self,
        project: &str,
        name: &str,
        version: &str,
    ) -> OrchResult<ApiResponse> {
        let url = self.url(
            &join(&catalog_path(project, "applications"), &[name, "versions", version]),
            &[],
        );
        self.delete(CATALOG, url).await
    }

    async fn create_profile(
        &self,
        project: &str,
        app_name: &str,
        app_version: &str,
        profile: &Profile,
    ) -> OrchResult<ApiResponse> {
        let url = self.url(
            &join(
                &catalog_path(project, "applications"),
                &[app_name, "versions", app_version, "profiles"],
            ),
            &[],
        );
        self.post(CATALOG, url, profile).await
    }

    async fn delete_profile(
        &self,
        project: &str,
        app_name: &str,
        app_version: &str,
        profile_name: &str,
    ) -> OrchResult<ApiResponse> {
        let url = self.url(
            &join(
                &catalog_path(project, "applications"),
                &[app_name, "versions", app_version, "profiles", profile_name],
            ),
            &[],
        );
        self.delete(CATALOG, url).await
    }

    async fn list_deployment_packages(
        &self,
        project: &str,
        opts: &ListOptions,
    ) -> OrchResult<ApiResponse> {
        let url = self.url(&catalog_path(project, "deployment_packages"), &opts.query_pairs());
        self.get(CATALOG, url).await
    }

    async fn get_deployment_package(
        &self,
        project: &str,
        name: &str,
        version: &str,
    ) -> OrchResult<ApiResponse> {
        let url = self.url(
            &join(&catalog_path(project, "deployment_packages"), &[name, "versions", version]),
            &[],
        );
        self.get(CATALOG, url).await
    }

    async fn create_deployment_package(
        &self,
        project: &str,
        package: &DeploymentPackage,
    ) -> OrchResult<ApiResponse> {
        let url = self.url(&catalog_path(project, "deployment_packages"), &[]);
        self.post(CATALOG, url, package).await
    }

    async fn delete_deployment_package(
        &self,
        project: &str,
        name: &str,
        version: &str,
    ) -> OrchResult<ApiResponse> {
        let url = self.url(
            &join(&catalog_path(project, "deployment_packages"), &[name, "versions", version]),
            &[],
        );
        self.delete(CATALOG, url).await
    }
}

#[async_trait]
impl DeploymentApi for ApiClient {
    async fn list_deployments(&self, project: &str, opts: &ListOptions) -> OrchResult<ApiResponse> {
        let url = self.url(&deployments_path(project), &opts.query_pairs());
        self.get(DEPLOYMENT, url).await
    }

    async fn get_deployment(&self, project: &str, deployment_id: &str) -> OrchResult<ApiResponse> {
        let url = self.url(&join(&deployments_path(project), &[deployment_id]), &[]);
        self.get(DEPLOYMENT, url).await
    }

    async fn create_deployment(&self, project: &str, deployment: &Deployment) -> OrchResult<ApiResponse> {
        let url = self.url(&deployments_path(project), &[]);
        self.post(DEPLOYMENT, url, deployment).await
    }

    async fn update_deployment(
        &self,
        project: &str,
        deployment_id: &str,
        deployment: &Deployment,
    ) -> OrchResult<ApiResponse> {
        let url = self.url(&join(&deployments_path(project), &[deployment_id]), &[]);
        self.put(DEPLOYMENT, url, deployment).await
    }

    async fn delete_deployment(&self, project: &str, deployment_id: &str) -> OrchResult<ApiResponse> {
        let url = self.url(&join(&deployments_path(project), &[deployment_id]), &[]);
        self.delete(DEPLOYMENT, url).await
    }
}

#[async_trait]
impl ClusterApi for ApiClient {
    async fn list_clusters(&self, project: &str, opts: &ListOptions) -> OrchResult<ApiResponse> {
        let url = self.url(&["v2", "projects", project, "clusters"], &opts.query_pairs());
        self.get(CLUSTER, url).await
    }

    async fn get_cluster(&self, project: &str, name: &str) -> OrchResult<ApiResponse> {
        let url = self.url(&["v2", "projects", project, "clusters", name], &[]);
        self.get(CLUSTER, url).await
    }

    async fn create_cluster(&self, project: &str, spec: &ClusterSpec) -> OrchResult<ApiResponse> {
        let url = self.url(&["v2", "projects", project, "clusters"], &[]);
        self.post(CLUSTER, url, spec).await
    }

    async fn delete_cluster(&self, project: &str, name: &str) -> OrchResult<ApiResponse> {
        let url = self.url(&["v2", "projects", project, "clusters", name], &[]);
        self.delete(CLUSTER, url).await
    }
}

#[async_trait]
impl TenancyApi for ApiClient {
    async fn list_organizations(&self) -> OrchResult<ApiResponse> {
        let url = self.url(&["v1", "orgs"], &[]);
        self.get(TENANCY, url).await
    }

    async fn get_organization(&self, name: &str) -> OrchResult<ApiResponse> {
        let url = self.url(&["v1", "orgs", name], &[]);
        self.get(TENANCY, url).await
    }

    async fn create_organization(&self, name: &str, spec: &TenancySpec) -> OrchResult<ApiResponse> {
        let url = self.url(&["v1", "orgs", name], &[]);
        self.put(TENANCY, url, spec).await
    }

    async fn delete_organization(&self, name: &str) -> OrchResult<ApiResponse> {
        let url = self.url(&["v1", "orgs", name], &[]);
        self.delete(TENANCY, url).await
    }

    async fn list_projects(&self) -> OrchResult<ApiResponse> {
        let url = self.url(&["v1", "projects"], &[]);
        self.get(TENANCY, url).await
    }

    async fn get_project(&self, name: &str) -> OrchResult<ApiResponse> {
        let url = self.url(&["v1", "projects", name], &[]);
        self.get(TENANCY, url).await
    }

    async fn create_project(&self, name: &str, spec: &TenancySpec) -> OrchResult<ApiResponse> {
        let url = self.url(&["v1", "projects", name], &[]);
        self.put(TENANCY, url, spec).await
    }

    async fn delete_project(&self, name: &str) -> OrchResult<ApiResponse> {
        let url = self.url(&["v1", "projects", name], &[]);
        self.delete(TENANCY, url).await
    }
}

#[async_trait]
impl RpsApi for ApiClient {
    async fn list_amt_profiles(&self, project: &str) -> OrchResult<ApiResponse> {
        let url = self.url(&amt_path(project, "profiles"), &[]);
        self.get(RPS, url).await
    }

    async fn get_amt_profile(&self, project: &str, name: &str) -> OrchResult<ApiResponse> {
        let url = self.url(&join(&amt_path(project, "profiles"), &[name]), &[]);
        self.get(RPS, url).await
    }

    async fn create_amt_profile(&self, project: &str, profile: &AmtProfile) -> OrchResult<ApiResponse> {
        let url = self.url(&amt_path(project, "profiles"), &[]);
        self.post(RPS, url, profile).await
    }

    async fn delete_amt_profile(&self, project: &str, name: &str) -> OrchResult<ApiResponse> {
        let url = self.url(&join(&amt_path(project, "profiles"), &[name]), &[]);
        self.delete(RPS, url).await
    }

    async fn list_amt_domains(&self, project: &str) -> OrchResult<ApiResponse> {
        let url = self.url(&amt_path(project, "domains"), &[]);
        self.get(RPS, url).await
    }

    async fn create_amt_domain(&self, project: &str, domain: &AmtDomain) -> OrchResult<ApiResponse> {
        let url = self.url(&amt_path(project, "domains"), &[]);
        self.post(RPS, url, domain).await
    }

    async fn delete_amt_domain(&self, project: &str, name: &str) -> OrchResult<ApiResponse> {
        let url = self.url(&join(&amt_path(project, "domains"), &[name]), &[]);
        self.delete(RPS, url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use orch_lib::overrides::OverrideValues;

    #[tokio::test]
    async fn test_list_hosts_sends_query_and_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/projects/demo/compute/hosts")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("pageSize".into(), "10".into()),
                Matcher::UrlEncoded("filter".into(), "name=edge".into()),
            ]))
            .match_header("authorization", "Bearer secret")
            .with_status(200)
            .with_body(r#"{"hosts":[],"totalElements":0}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url(), Some("secret".to_string())).unwrap();
        let opts = ListOptions {
            filter: Some("name=edge".to_string()),
            page_size: Some(10),
            ..Default::default()
        };
        let response = client.list_hosts("demo", &opts).await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.status_text, "OK");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_not_found_is_returned_not_raised() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v2/projects/demo/clusters/missing")
            .with_status(404)
            .with_body(r#"{"message":"cluster not found"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url(), None).unwrap();
        let response = client.get_cluster("demo", "missing").await.unwrap();

        assert_eq!(response.status, 404);
        assert_eq!(response.status_text, "Not Found");
        assert!(!response.classify(false, "error getting cluster").unwrap());
    }

    #[tokio::test]
    async fn test_create_deployment_posts_json_body() {
        let mut server = mockito::Server::new_async().await;
        let mut overrides = OverrideValues::new("nginx", Some("web".to_string()));
        overrides.set("service.port", "8080");
        let deployment = Deployment {
            app_name: "nginx-app".to_string(),
            app_version: "1.0.0".to_string(),
            override_values: vec![overrides],
            ..Default::default()
        };

        let mock = server
            .mock(
                "POST",
                "/deployment.orchestrator.apis/v1/projects/demo/appdeployment/deployments",
            )
            .match_body(Matcher::PartialJson(serde_json::json!({
                "appName": "nginx-app",
                "overrideValues": [{
                    "appName": "nginx",
                    "targetNamespace": "web",
                    "values": {"service": {"port": 8080}}
                }]
            })))
            .with_status(200)
            .with_body(r#"{"deploymentId":"dep-1"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url(), None).unwrap();
        let response = client.create_deployment("demo", &deployment).await.unwrap();

        assert_eq!(response.status, 200);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_path_segments_are_encoded() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", "/v3/projects/demo/catalog/registries/my%20registry")
            .with_status(204)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url(), None).unwrap();
        let response = client.delete_registry("demo", "my registry").await.unwrap();

        assert_eq!(response.status, 204);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_base_path_is_preserved() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/orgs")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let client = ApiClient::new(&format!("{}/api", server.url()), None).unwrap();
        client.list_organizations().await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_refused_connection_is_no_response() {
        let client = ApiClient::new("http://127.0.0.1:1", None).unwrap();
        let err = client.list_projects().await.unwrap_err();
        assert!(matches!(err, OrchError::NoResponse { .. }));
        assert!(err.to_string().ends_with("no response from backend"));
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(ApiClient::new("not a url", None).is_err());
        assert!(ApiClient::new("mailto:ops@example.com", None).is_err());
    }
}
