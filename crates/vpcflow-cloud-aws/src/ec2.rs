//! EC2 client wrapper
//!
//! Thin layer over `aws_sdk_ec2::Client`: one method per API call, SDK
//! errors and missing response fields turned into [`AwsError`].

use crate::error::{AwsError, Result};
use aws_config::BehaviorVersion;
use aws_sdk_ec2::Client;
use aws_sdk_ec2::client::Waiters;
use aws_sdk_ec2::config::Region;
use aws_sdk_ec2::types::{AttributeBooleanValue, DomainType, Tag};
use std::time::Duration;
use vpcflow_cloud::{ElasticIp, ResourceTag, RouteTarget, VpcDnsAttribute};

/// EC2 API wrapper
#[derive(Debug, Clone)]
pub struct Ec2Api {
    client: Client,
}

fn enabled() -> AttributeBooleanValue {
    AttributeBooleanValue::builder().value(true).build()
}

impl Ec2Api {
    /// Load shared AWS config for `region`, optionally from a named profile
    pub async fn connect(region: &str, profile: Option<&str>) -> Self {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region.to_string()));
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        let config = loader.load().await;

        Self::from_client(Client::new(&config))
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// List the names of availability zones visible to the caller
    pub async fn describe_availability_zones(&self) -> Result<Vec<String>> {
        let resp = self
            .client
            .describe_availability_zones()
            .send()
            .await
            .map_err(|e| AwsError::api("DescribeAvailabilityZones", e))?;

        Ok(resp
            .availability_zones()
            .iter()
            .filter_map(|az| az.zone_name().map(|s| s.to_string()))
            .collect())
    }

    pub async fn create_vpc(&self, cidr_block: &str) -> Result<String> {
        let resp = self
            .client
            .create_vpc()
            .cidr_block(cidr_block)
            .send()
            .await
            .map_err(|e| AwsError::api("CreateVpc", e))?;

        resp.vpc()
            .and_then(|vpc| vpc.vpc_id())
            .map(|id| id.to_string())
            .ok_or(AwsError::MissingField {
                operation: "CreateVpc",
                field: "VpcId",
            })
    }

    /// ModifyVpcAttribute accepts exactly one attribute per call
    pub async fn enable_vpc_dns(&self, vpc_id: &str, attribute: VpcDnsAttribute) -> Result<()> {
        let req = self.client.modify_vpc_attribute().vpc_id(vpc_id);
        let req = match attribute {
            VpcDnsAttribute::Support => req.enable_dns_support(enabled()),
            VpcDnsAttribute::Hostnames => req.enable_dns_hostnames(enabled()),
        };

        req.send()
            .await
            .map_err(|e| AwsError::api("ModifyVpcAttribute", e))?;
        Ok(())
    }

    pub async fn create_tags(&self, resource_id: &str, tags: &[ResourceTag]) -> Result<()> {
        let tags: Vec<Tag> = tags
            .iter()
            .map(|t| Tag::builder().key(&t.key).value(&t.value).build())
            .collect();

        self.client
            .create_tags()
            .resources(resource_id)
            .set_tags(Some(tags))
            .send()
            .await
            .map_err(|e| AwsError::api("CreateTags", e))?;
        Ok(())
    }

    pub async fn create_internet_gateway(&self) -> Result<String> {
        let resp = self
            .client
            .create_internet_gateway()
            .send()
            .await
            .map_err(|e| AwsError::api("CreateInternetGateway", e))?;

        resp.internet_gateway()
            .and_then(|igw| igw.internet_gateway_id())
            .map(|id| id.to_string())
            .ok_or(AwsError::MissingField {
                operation: "CreateInternetGateway",
                field: "InternetGatewayId",
            })
    }

    pub async fn attach_internet_gateway(
        &self,
        internet_gateway_id: &str,
        vpc_id: &str,
    ) -> Result<()> {
        self.client
            .attach_internet_gateway()
            .internet_gateway_id(internet_gateway_id)
            .vpc_id(vpc_id)
            .send()
            .await
            .map_err(|e| AwsError::api("AttachInternetGateway", e))?;
        Ok(())
    }

    pub async fn create_subnet(
        &self,
        vpc_id: &str,
        cidr_block: &str,
        availability_zone: &str,
    ) -> Result<String> {
        let resp = self
            .client
            .create_subnet()
            .vpc_id(vpc_id)
            .cidr_block(cidr_block)
            .availability_zone(availability_zone)
            .send()
            .await
            .map_err(|e| AwsError::api("CreateSubnet", e))?;

        resp.subnet()
            .and_then(|subnet| subnet.subnet_id())
            .map(|id| id.to_string())
            .ok_or(AwsError::MissingField {
                operation: "CreateSubnet",
                field: "SubnetId",
            })
    }

    pub async fn enable_public_ip_on_launch(&self, subnet_id: &str) -> Result<()> {
        self.client
            .modify_subnet_attribute()
            .subnet_id(subnet_id)
            .map_public_ip_on_launch(enabled())
            .send()
            .await
            .map_err(|e| AwsError::api("ModifySubnetAttribute", e))?;
        Ok(())
    }

    pub async fn allocate_address(&self) -> Result<ElasticIp> {
        let resp = self
            .client
            .allocate_address()
            .domain(DomainType::Vpc)
            .send()
            .await
            .map_err(|e| AwsError::api("AllocateAddress", e))?;

        let allocation_id = resp
            .allocation_id()
            .map(|id| id.to_string())
            .ok_or(AwsError::MissingField {
                operation: "AllocateAddress",
                field: "AllocationId",
            })?;

        Ok(ElasticIp {
            allocation_id,
            public_ip: resp.public_ip().map(|ip| ip.to_string()),
        })
    }

    pub async fn create_nat_gateway(&self, subnet_id: &str, allocation_id: &str) -> Result<String> {
        let resp = self
            .client
            .create_nat_gateway()
            .subnet_id(subnet_id)
            .allocation_id(allocation_id)
            .send()
            .await
            .map_err(|e| AwsError::api("CreateNatGateway", e))?;

        resp.nat_gateway()
            .and_then(|nat| nat.nat_gateway_id())
            .map(|id| id.to_string())
            .ok_or(AwsError::MissingField {
                operation: "CreateNatGateway",
                field: "NatGatewayId",
            })
    }

    /// Uses the SDK's generated `NatGatewayAvailable` waiter and its default
    /// polling schedule.
    pub async fn wait_nat_gateway_available(
        &self,
        nat_gateway_id: &str,
        max_wait: Duration,
    ) -> Result<()> {
        self.client
            .wait_until_nat_gateway_available()
            .nat_gateway_ids(nat_gateway_id)
            .wait(max_wait)
            .await
            .map_err(|e| AwsError::WaitFailed {
                nat_gateway_id: nat_gateway_id.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    pub async fn create_route_table(&self, vpc_id: &str) -> Result<String> {
        let resp = self
            .client
            .create_route_table()
            .vpc_id(vpc_id)
            .send()
            .await
            .map_err(|e| AwsError::api("CreateRouteTable", e))?;

        resp.route_table()
            .and_then(|rtb| rtb.route_table_id())
            .map(|id| id.to_string())
            .ok_or(AwsError::MissingField {
                operation: "CreateRouteTable",
                field: "RouteTableId",
            })
    }

    pub async fn create_route(
        &self,
        route_table_id: &str,
        destination_cidr_block: &str,
        target: &RouteTarget,
    ) -> Result<()> {
        let req = self
            .client
            .create_route()
            .route_table_id(route_table_id)
            .destination_cidr_block(destination_cidr_block);
        let req = match target {
            RouteTarget::InternetGateway(id) => req.gateway_id(id),
            RouteTarget::NatGateway(id) => req.nat_gateway_id(id),
        };

        req.send()
            .await
            .map_err(|e| AwsError::api("CreateRoute", e))?;
        Ok(())
    }

    pub async fn associate_route_table(
        &self,
        route_table_id: &str,
        subnet_id: &str,
    ) -> Result<String> {
        let resp = self
            .client
            .associate_route_table()
            .route_table_id(route_table_id)
            .subnet_id(subnet_id)
            .send()
            .await
            .map_err(|e| AwsError::api("AssociateRouteTable", e))?;

        resp.association_id()
            .map(|id| id.to_string())
            .ok_or(AwsError::MissingField {
                operation: "AssociateRouteTable",
                field: "AssociationId",
            })
    }
}
