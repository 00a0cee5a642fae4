//! Network provider trait definition

use crate::error::{CloudError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Network provider abstraction trait
///
/// One method per control-plane call the provisioner issues. Every create
/// method returns the opaque identifier assigned by the provider; nothing is
/// looked up or reconciled afterwards.
#[async_trait]
pub trait NetworkProvider: Send + Sync {
    /// Returns the provider name (e.g., "aws")
    fn name(&self) -> &str;

    /// Returns the provider display name for UI
    fn display_name(&self) -> &str;

    /// Region every call is issued against
    fn region(&self) -> &str;

    /// Check credentials and list the availability zones visible in the region
    async fn check_auth(&self) -> Result<AuthStatus>;

    /// Create a VPC and return its id
    async fn create_vpc(&self, cidr_block: &str) -> Result<String>;

    /// Turn on one of the VPC DNS attributes
    async fn enable_vpc_dns(&self, vpc_id: &str, attribute: VpcDnsAttribute) -> Result<()>;

    /// Attach tags to an existing resource
    async fn create_tags(&self, resource_id: &str, tags: &[ResourceTag]) -> Result<()>;

    /// Create an internet gateway and return its id
    async fn create_internet_gateway(&self) -> Result<String>;

    async fn attach_internet_gateway(&self, internet_gateway_id: &str, vpc_id: &str) -> Result<()>;

    /// Create a subnet and return its id
    async fn create_subnet(
        &self,
        vpc_id: &str,
        cidr_block: &str,
        availability_zone: &str,
    ) -> Result<String>;

    /// Enable public IPv4 auto-assignment for instances launched in the subnet
    async fn enable_public_ip_on_launch(&self, subnet_id: &str) -> Result<()>;

    /// Allocate an elastic IP in the VPC domain
    async fn allocate_elastic_ip(&self) -> Result<ElasticIp>;

    /// Create a public NAT gateway and return its id
    async fn create_nat_gateway(&self, subnet_id: &str, allocation_id: &str) -> Result<String>;

    /// Block until the NAT gateway reports `available`, or `max_wait` elapses
    async fn wait_nat_gateway_available(&self, nat_gateway_id: &str, max_wait: Duration)
    -> Result<()>;

    /// Create a route table and return its id
    async fn create_route_table(&self, vpc_id: &str) -> Result<String>;

    async fn create_route(
        &self,
        route_table_id: &str,
        destination_cidr_block: &str,
        target: &RouteTarget,
    ) -> Result<()>;

    /// Associate a subnet with a route table and return the association id
    async fn associate_route_table(&self, route_table_id: &str, subnet_id: &str)
    -> Result<String>;
}

/// Authentication status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthStatus {
    /// Whether authentication is valid
    pub authenticated: bool,

    /// Account/user information if available
    pub account_info: Option<String>,

    /// Availability zones the credentials can see in the region
    pub zones: Vec<String>,

    /// Error message if not authenticated
    pub error: Option<String>,
}

impl AuthStatus {
    pub fn ok(account_info: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            account_info: Some(account_info.into()),
            zones: Vec::new(),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            authenticated: false,
            account_info: None,
            zones: Vec::new(),
            error: Some(error.into()),
        }
    }

    pub fn with_zones(mut self, zones: Vec<String>) -> Self {
        self.zones = zones;
        self
    }

    /// Turn a failed check into `CloudError::AuthenticationFailed`
    pub fn ensure_authenticated(self, provider: &str) -> Result<Self> {
        if self.authenticated {
            return Ok(self);
        }
        Err(CloudError::AuthenticationFailed(format!(
            "{}: {}",
            provider,
            self.error.as_deref().unwrap_or("unknown error")
        )))
    }

    /// Zones from `wanted` that the provider did not report
    pub fn missing_zones<'a>(&self, wanted: &'a [String]) -> Vec<&'a str> {
        wanted
            .iter()
            .filter(|zone| !self.zones.contains(zone))
            .map(|zone| zone.as_str())
            .collect()
    }
}

/// VPC DNS attribute toggled after creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VpcDnsAttribute {
    /// Amazon-provided DNS resolution
    Support,
    /// DNS hostnames for instances with public IPs
    Hostnames,
}

impl std::fmt::Display for VpcDnsAttribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VpcDnsAttribute::Support => write!(f, "dns-support"),
            VpcDnsAttribute::Hostnames => write!(f, "dns-hostnames"),
        }
    }
}

/// Target of a route entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum RouteTarget {
    InternetGateway(String),
    NatGateway(String),
}

impl RouteTarget {
    pub fn id(&self) -> &str {
        match self {
            RouteTarget::InternetGateway(id) | RouteTarget::NatGateway(id) => id,
        }
    }
}

impl std::fmt::Display for RouteTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteTarget::InternetGateway(id) => write!(f, "internet gateway {}", id),
            RouteTarget::NatGateway(id) => write!(f, "nat gateway {}", id),
        }
    }
}

/// A key/value tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceTag {
    pub key: String,
    pub value: String,
}

impl ResourceTag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// The `Name` tag shown in the console
    pub fn name(value: impl Into<String>) -> Self {
        Self::new("Name", value)
    }
}

/// Elastic IP allocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElasticIp {
    pub allocation_id: String,
    pub public_ip: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_zones() {
        let auth = AuthStatus::ok("ap-northeast-2")
            .with_zones(vec!["ap-northeast-2a".to_string(), "ap-northeast-2c".to_string()]);
        let wanted = vec!["ap-northeast-2a".to_string(), "ap-northeast-2b".to_string()];

        assert_eq!(auth.missing_zones(&wanted), vec!["ap-northeast-2b"]);
    }

    #[test]
    fn test_ensure_authenticated() {
        let auth = AuthStatus::ok("123456789012").ensure_authenticated("AWS").unwrap();
        assert_eq!(auth.account_info.as_deref(), Some("123456789012"));

        let err = AuthStatus::failed("ExpiredToken: token expired")
            .ensure_authenticated("AWS (ap-northeast-2)")
            .unwrap_err();
        assert!(matches!(err, CloudError::AuthenticationFailed(_)));
        assert_eq!(
            err.to_string(),
            "Authentication failed: AWS (ap-northeast-2): ExpiredToken: token expired"
        );
    }

    #[test]
    fn test_route_target_display() {
        let target = RouteTarget::NatGateway("nat-0123".to_string());
        assert_eq!(target.id(), "nat-0123");
        assert_eq!(target.to_string(), "nat gateway nat-0123");
    }

    #[test]
    fn test_name_tag() {
        let tag = ResourceTag::name("skills-vpc");
        assert_eq!(tag.key, "Name");
        assert_eq!(tag.value, "skills-vpc");
    }
}
