//! AWS network provider implementation

use crate::ec2::Ec2Api;
use async_trait::async_trait;
use std::time::Duration;
use vpcflow_cloud::{
    AuthStatus, ElasticIp, NetworkProvider, ResourceTag, RouteTarget, VpcDnsAttribute,
};

/// EC2-backed network provider pinned to one region
pub struct Ec2NetworkProvider {
    api: Ec2Api,
    region: String,
}

impl Ec2NetworkProvider {
    /// Build a provider from the default credential chain
    pub async fn connect(region: impl Into<String>, profile: Option<&str>) -> Self {
        let region = region.into();
        let api = Ec2Api::connect(&region, profile).await;
        tracing::debug!(
            "Loaded AWS config for region {} (profile: {})",
            region,
            profile.unwrap_or("default")
        );
        Self { api, region }
    }

    pub fn new(api: Ec2Api, region: impl Into<String>) -> Self {
        Self {
            api,
            region: region.into(),
        }
    }

    pub fn api(&self) -> &Ec2Api {
        &self.api
    }
}

#[async_trait]
impl NetworkProvider for Ec2NetworkProvider {
    fn name(&self) -> &str {
        "aws"
    }

    fn display_name(&self) -> &str {
        "Amazon EC2"
    }

    fn region(&self) -> &str {
        &self.region
    }

    async fn check_auth(&self) -> vpcflow_cloud::Result<AuthStatus> {
        match self.api.describe_availability_zones().await {
            Ok(zones) => Ok(AuthStatus::ok(format!("region {}", self.region)).with_zones(zones)),
            Err(e) => Ok(AuthStatus::failed(e.to_string())),
        }
    }

    async fn create_vpc(&self, cidr_block: &str) -> vpcflow_cloud::Result<String> {
        let id = self.api.create_vpc(cidr_block).await?;
        tracing::info!("Created VPC {} with CIDR {}", id, cidr_block);
        Ok(id)
    }

    async fn enable_vpc_dns(
        &self,
        vpc_id: &str,
        attribute: VpcDnsAttribute,
    ) -> vpcflow_cloud::Result<()> {
        self.api.enable_vpc_dns(vpc_id, attribute).await?;
        tracing::debug!("Enabled {} on {}", attribute, vpc_id);
        Ok(())
    }

    async fn create_tags(
        &self,
        resource_id: &str,
        tags: &[ResourceTag],
    ) -> vpcflow_cloud::Result<()> {
        self.api.create_tags(resource_id, tags).await?;
        tracing::debug!("Tagged {} with {} tag(s)", resource_id, tags.len());
        Ok(())
    }

    async fn create_internet_gateway(&self) -> vpcflow_cloud::Result<String> {
        let id = self.api.create_internet_gateway().await?;
        tracing::info!("Created internet gateway {}", id);
        Ok(id)
    }

    async fn attach_internet_gateway(
        &self,
        internet_gateway_id: &str,
        vpc_id: &str,
    ) -> vpcflow_cloud::Result<()> {
        self.api
            .attach_internet_gateway(internet_gateway_id, vpc_id)
            .await?;
        tracing::debug!("Attached {} to {}", internet_gateway_id, vpc_id);
        Ok(())
    }

    async fn create_subnet(
        &self,
        vpc_id: &str,
        cidr_block: &str,
        availability_zone: &str,
    ) -> vpcflow_cloud::Result<String> {
        let id = self
            .api
            .create_subnet(vpc_id, cidr_block, availability_zone)
            .await?;
        tracing::info!(
            "Created subnet {} ({} in {})",
            id,
            cidr_block,
            availability_zone
        );
        Ok(id)
    }

    async fn enable_public_ip_on_launch(&self, subnet_id: &str) -> vpcflow_cloud::Result<()> {
        self.api.enable_public_ip_on_launch(subnet_id).await?;
        Ok(())
    }

    async fn allocate_elastic_ip(&self) -> vpcflow_cloud::Result<ElasticIp> {
        let eip = self.api.allocate_address().await?;
        tracing::info!(
            "Allocated elastic IP {} ({})",
            eip.allocation_id,
            eip.public_ip.as_deref().unwrap_or("-")
        );
        Ok(eip)
    }

    async fn create_nat_gateway(
        &self,
        subnet_id: &str,
        allocation_id: &str,
    ) -> vpcflow_cloud::Result<String> {
        let id = self.api.create_nat_gateway(subnet_id, allocation_id).await?;
        tracing::info!("Created NAT gateway {} in {}", id, subnet_id);
        Ok(id)
    }

    async fn wait_nat_gateway_available(
        &self,
        nat_gateway_id: &str,
        max_wait: Duration,
    ) -> vpcflow_cloud::Result<()> {
        tracing::debug!(
            "Waiting for NAT gateway {} (max {:?})",
            nat_gateway_id,
            max_wait
        );
        self.api
            .wait_nat_gateway_available(nat_gateway_id, max_wait)
            .await?;
        Ok(())
    }

    async fn create_route_table(&self, vpc_id: &str) -> vpcflow_cloud::Result<String> {
        let id = self.api.create_route_table(vpc_id).await?;
        tracing::info!("Created route table {}", id);
        Ok(id)
    }

    async fn create_route(
        &self,
        route_table_id: &str,
        destination_cidr_block: &str,
        target: &RouteTarget,
    ) -> vpcflow_cloud::Result<()> {
        self.api
            .create_route(route_table_id, destination_cidr_block, target)
            .await?;
        tracing::debug!(
            "Added route {} -> {} to {}",
            destination_cidr_block,
            target,
            route_table_id
        );
        Ok(())
    }

    async fn associate_route_table(
        &self,
        route_table_id: &str,
        subnet_id: &str,
    ) -> vpcflow_cloud::Result<String> {
        let id = self
            .api
            .associate_route_table(route_table_id, subnet_id)
            .await?;
        tracing::debug!("Associated {} with {} ({})", subnet_id, route_table_id, id);
        Ok(id)
    }
}
