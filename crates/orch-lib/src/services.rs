//! Abstract interfaces to the orchestrator backend services
//!
//! Each trait covers one service. Implementations return the raw
//! [`ApiResponse`] so callers classify status codes uniformly; an `Err`
//! means no response was obtained at all.

use crate::error::Result;
use crate::models::{
    AmtDomain, AmtProfile, Application, ClusterSpec, Deployment, DeploymentPackage, HostRegister,
    HostUpdate, ListOptions, Profile, Region, Registry, Site, TenancySpec,
};
use crate::response::ApiResponse;
use async_trait::async_trait;

/// Infrastructure service: hosts, regions and sites
#[async_trait]
pub trait InfraApi: Send + Sync {
    async fn list_hosts(&self, project: &str, opts: &ListOptions) -> Result<ApiResponse>;
    async fn get_host(&self, project: &str, host_id: &str) -> Result<ApiResponse>;
    async fn register_host(&self, project: &str, host: &HostRegister) -> Result<ApiResponse>;
    async fn update_host(&self, project: &str, host_id: &str, update: &HostUpdate) -> Result<ApiResponse>;
    async fn delete_host(&self, project: &str, host_id: &str) -> Result<ApiResponse>;

    async fn list_regions(&self, project: &str, opts: &ListOptions) -> Result<ApiResponse>;
    async fn get_region(&self, project: &str, region_id: &str) -> Result<ApiResponse>;
    async fn create_region(&self, project: &str, region: &Region) -> Result<ApiResponse>;
    async fn delete_region(&self, project: &str, region_id: &str) -> Result<ApiResponse>;

    async fn list_sites(&self, project: &str, region_id: &str, opts: &ListOptions) -> Result<ApiResponse>;
    async fn get_site(&self, project: &str, region_id: &str, site_id: &str) -> Result<ApiResponse>;
    async fn create_site(&self, project: &str, region_id: &str, site: &Site) -> Result<ApiResponse>;
    async fn delete_site(&self, project: &str, region_id: &str, site_id: &str) -> Result<ApiResponse>;
}

/// Catalog service: registries, applications, profiles and packages
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn list_registries(&self, project: &str, opts: &ListOptions) -> Result<ApiResponse>;
    async fn get_registry(&self, project: &str, name: &str) -> Result<ApiResponse>;
    async fn create_registry(&self, project: &str, registry: &Registry) -> Result<ApiResponse>;
    async fn update_registry(&self, project: &str, name: &str, registry: &Registry) -> Result<ApiResponse>;
    async fn delete_registry(&self, project: &str, name: &str) -> Result<ApiResponse>;

    async fn list_applications(&self, project: &str, opts: &ListOptions) -> Result<ApiResponse>;
    async fn get_application(&self, project: &str, name: &str, version: &str) -> Result<ApiResponse>;
    async fn create_application(&self, project: &str, app: &Application) -> Result<ApiResponse>;
    async fn delete_application(&self, project: &str, name: &str, version: &str) -> Result<ApiResponse>;

    async fn create_profile(
        &self,
        project: &str,
        app_name: &str,
        app_version: &str,
        profile: &Profile,
    ) -> Result<ApiResponse>;
    async fn delete_profile(
        &self,
        project: &str,
        app_name: &str,
        app_version: &str,
        profile_name: &str,
    ) -> Result<ApiResponse>;

    async fn list_deployment_packages(&self, project: &str, opts: &ListOptions) -> Result<ApiResponse>;
    async fn get_deployment_package(&self, project: &str, name: &str, version: &str) -> Result<ApiResponse>;
    async fn create_deployment_package(&self, project: &str, package: &DeploymentPackage) -> Result<ApiResponse>;
    async fn delete_deployment_package(&self, project: &str, name: &str, version: &str) -> Result<ApiResponse>;
}

/// Application deployment service
#[async_trait]
pub trait DeploymentApi: Send + Sync {
    async fn list_deployments(&self, project: &str, opts: &ListOptions) -> Result<ApiResponse>;
    async fn get_deployment(&self, project: &str, deployment_id: &str) -> Result<ApiResponse>;
    async fn create_deployment(&self, project: &str, deployment: &Deployment) -> Result<ApiResponse>;
    async fn update_deployment(
        &self,
        project: &str,
        deployment_id: &str,
        deployment: &Deployment,
    ) -> Result<ApiResponse>;
    async fn delete_deployment(&self, project: &str, deployment_id: &str) -> Result<ApiResponse>;
}

/// Edge cluster service
#[async_trait]
pub trait ClusterApi: Send + Sync {
    async fn list_clusters(&self, project: &str, opts: &ListOptions) -> Result<ApiResponse>;
    async fn get_cluster(&self, project: &str, name: &str) -> Result<ApiResponse>;
    async fn create_cluster(&self, project: &str, spec: &ClusterSpec) -> Result<ApiResponse>;
    async fn delete_cluster(&self, project: &str, name: &str) -> Result<ApiResponse>;
}

/// Organization and project tenancy service
#[async_trait]
pub trait TenancyApi: Send + Sync {
    async fn list_organizations(&self) -> Result<ApiResponse>;
    async fn get_organization(&self, name: &str) -> Result<ApiResponse>;
    async fn create_organization(&self, name: &str, spec: &TenancySpec) -> Result<ApiResponse>;
    async fn delete_organization(&self, name: &str) -> Result<ApiResponse>;

    async fn list_projects(&self) -> Result<ApiResponse>;
    async fn get_project(&self, name: &str) -> Result<ApiResponse>;
    async fn create_project(&self, name: &str, spec: &TenancySpec) -> Result<ApiResponse>;
    async fn delete_project(&self, name: &str) -> Result<ApiResponse>;
}

/// Remote provisioning service for AMT devices
#[async_trait]
pub trait RpsApi: Send + Sync {
    async fn list_amt_profiles(&self, project: &str) -> Result<ApiResponse>;
    async fn get_amt_profile(&self, project: &str, name: &str) -> Result<ApiResponse>;
    async fn create_amt_profile(&self, project: &str, profile: &AmtProfile) -> Result<ApiResponse>;
    async fn delete_amt_profile(&self, project: &str, name: &str) -> Result<ApiResponse>;

    async fn list_amt_domains(&self, project: &str) -> Result<ApiResponse>;
    async fn create_amt_domain(&self, project: &str, domain: &AmtDomain) -> Result<ApiResponse>;
    async fn delete_amt_domain(&self, project: &str, name: &str) -> Result<ApiResponse>;
}
