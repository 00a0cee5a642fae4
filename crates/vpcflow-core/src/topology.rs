//! The network topology vpcflow provisions

use crate::cidr::Ipv4Cidr;
use crate::error::{CoreError, Result};
use serde::Serialize;
use std::collections::HashSet;

/// Region every resource is created in
pub const REGION: &str = "ap-northeast-2";

/// The two zones the topology spreads across, in zone-suffix order (a, b)
pub const AVAILABILITY_ZONES: [&str; 2] = ["ap-northeast-2a", "ap-northeast-2b"];

/// Destination of every default route
pub const DEFAULT_ROUTE_CIDR: &str = "0.0.0.0/0";

/// Subnet tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubnetTier {
    /// Routed to the internet gateway, public IPs on launch
    Public,
    /// Outbound through the zone's NAT gateway
    Private,
    /// No route out of the VPC
    Protected,
}

impl std::fmt::Display for SubnetTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubnetTier::Public => write!(f, "public"),
            SubnetTier::Private => write!(f, "private"),
            SubnetTier::Protected => write!(f, "protected"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubnetSpec {
    pub name: String,
    pub cidr_block: String,
    pub availability_zone: String,
    pub tier: SubnetTier,
}

impl SubnetSpec {
    pub fn new(
        name: impl Into<String>,
        cidr_block: impl Into<String>,
        availability_zone: impl Into<String>,
        tier: SubnetTier,
    ) -> Self {
        Self {
            name: name.into(),
            cidr_block: cidr_block.into(),
            availability_zone: availability_zone.into(),
            tier,
        }
    }

    /// Public subnets get `MapPublicIpOnLaunch`
    pub fn is_public(&self) -> bool {
        self.tier == SubnetTier::Public
    }
}

/// One NAT gateway, placed in a public subnet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NatGatewaySpec {
    pub name: String,
    pub subnet: String,
}

/// Default route of a route table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum DefaultRoute {
    /// No 0.0.0.0/0 entry
    None,
    InternetGateway,
    /// Through the named NAT gateway
    NatGateway(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteTableSpec {
    pub name: String,
    pub default_route: DefaultRoute,
    /// Subnets associated with the table, in association order
    pub subnets: Vec<String>,
}

/// Complete description of the network to create
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Topology {
    pub region: String,
    pub availability_zones: Vec<String>,
    pub vpc_name: String,
    pub vpc_cidr: String,
    pub internet_gateway_name: String,
    pub subnets: Vec<SubnetSpec>,
    pub nat_gateways: Vec<NatGatewaySpec>,
    pub route_tables: Vec<RouteTableSpec>,
}

impl Topology {
    /// The `skills-*` network: one VPC, three subnet tiers in two zones,
    /// a NAT gateway per zone and four route tables
    pub fn skills() -> Self {
        let [zone_a, zone_b] = AVAILABILITY_ZONES;

        let subnets = vec![
            SubnetSpec::new("skills-public-subnet-a", "10.100.1.0/24", zone_a, SubnetTier::Public),
            SubnetSpec::new("skills-public-subnet-b", "10.100.2.0/24", zone_b, SubnetTier::Public),
            SubnetSpec::new(
                "skills-private-subnet-a",
                "10.100.11.0/24",
                zone_a,
                SubnetTier::Private,
            ),
            SubnetSpec::new(
                "skills-private-subnet-b",
                "10.100.12.0/24",
                zone_b,
                SubnetTier::Private,
            ),
            SubnetSpec::new(
                "skills-protected-subnet-a",
                "10.100.21.0/24",
                zone_a,
                SubnetTier::Protected,
            ),
            SubnetSpec::new(
                "skills-protected-subnet-b",
                "10.100.22.0/24",
                zone_b,
                SubnetTier::Protected,
            ),
        ];

        let nat_gateways = ["a", "b"]
            .into_iter()
            .map(|suffix| NatGatewaySpec {
                name: format!("skills-nat-{}", suffix),
                subnet: format!("skills-public-subnet-{}", suffix),
            })
            .collect();

        let route_tables = vec![
            RouteTableSpec {
                name: "skills-public-rtb".to_string(),
                default_route: DefaultRoute::InternetGateway,
                subnets: vec![
                    "skills-public-subnet-a".to_string(),
                    "skills-public-subnet-b".to_string(),
                ],
            },
            RouteTableSpec {
                name: "skills-private-rtb-a".to_string(),
                default_route: DefaultRoute::NatGateway("skills-nat-a".to_string()),
                subnets: vec!["skills-private-subnet-a".to_string()],
            },
            RouteTableSpec {
                name: "skills-private-rtb-b".to_string(),
                default_route: DefaultRoute::NatGateway("skills-nat-b".to_string()),
                subnets: vec!["skills-private-subnet-b".to_string()],
            },
            RouteTableSpec {
                name: "skills-protected-rtb".to_string(),
                default_route: DefaultRoute::None,
                subnets: vec![
                    "skills-protected-subnet-a".to_string(),
                    "skills-protected-subnet-b".to_string(),
                ],
            },
        ];

        Self {
            region: REGION.to_string(),
            availability_zones: AVAILABILITY_ZONES.iter().map(|z| z.to_string()).collect(),
            vpc_name: "skills-vpc".to_string(),
            vpc_cidr: "10.100.0.0/16".to_string(),
            internet_gateway_name: "skills-igw".to_string(),
            subnets,
            nat_gateways,
            route_tables,
        }
    }

    pub fn subnet(&self, name: &str) -> Option<&SubnetSpec> {
        self.subnets.iter().find(|s| s.name == name)
    }

    pub fn nat_gateway(&self, name: &str) -> Option<&NatGatewaySpec> {
        self.nat_gateways.iter().find(|n| n.name == name)
    }

    /// Check the topology before any API call is made
    ///
    /// Catches what the control plane would otherwise reject halfway through
    /// a run: malformed or overlapping CIDRs, zones outside the topology,
    /// dangling subnet or NAT gateway references, reused names.
    pub fn validate(&self) -> Result<()> {
        let vpc_cidr: Ipv4Cidr = self.vpc_cidr.parse()?;

        let mut names = HashSet::new();
        let all_names = std::iter::once(&self.vpc_name)
            .chain(std::iter::once(&self.internet_gateway_name))
            .chain(self.subnets.iter().map(|s| &s.name))
            .chain(self.nat_gateways.iter().map(|n| &n.name))
            .chain(self.route_tables.iter().map(|r| &r.name));
        for name in all_names {
            if !names.insert(name.as_str()) {
                return Err(CoreError::DuplicateName(name.clone()));
            }
        }

        let mut parsed: Vec<(&SubnetSpec, Ipv4Cidr)> = Vec::with_capacity(self.subnets.len());
        for subnet in &self.subnets {
            let cidr: Ipv4Cidr = subnet.cidr_block.parse()?;
            if !vpc_cidr.contains(&cidr) {
                return Err(CoreError::CidrOutsideVpc {
                    subnet: subnet.name.clone(),
                    cidr: subnet.cidr_block.clone(),
                    vpc_cidr: self.vpc_cidr.clone(),
                });
            }
            if !self.availability_zones.contains(&subnet.availability_zone) {
                return Err(CoreError::UnknownZone {
                    subnet: subnet.name.clone(),
                    zone: subnet.availability_zone.clone(),
                });
            }
            if let Some((other, _)) = parsed.iter().find(|(_, c)| c.overlaps(&cidr)) {
                return Err(CoreError::OverlappingSubnets {
                    first: other.name.clone(),
                    second: subnet.name.clone(),
                });
            }
            parsed.push((subnet, cidr));
        }

        for nat in &self.nat_gateways {
            let subnet = self.subnet(&nat.subnet).ok_or_else(|| CoreError::UnknownSubnet {
                owner: nat.name.clone(),
                subnet: nat.subnet.clone(),
            })?;
            if !subnet.is_public() {
                return Err(CoreError::NatInPrivateSubnet {
                    nat_gateway: nat.name.clone(),
                    subnet: nat.subnet.clone(),
                });
            }
        }

        for table in &self.route_tables {
            if let DefaultRoute::NatGateway(nat) = &table.default_route
                && self.nat_gateway(nat).is_none()
            {
                return Err(CoreError::UnknownNatGateway {
                    owner: table.name.clone(),
                    nat_gateway: nat.clone(),
                });
            }
            if let Some(missing) = table.subnets.iter().find(|s| self.subnet(s).is_none()) {
                return Err(CoreError::UnknownSubnet {
                    owner: table.name.clone(),
                    subnet: missing.clone(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skills_topology_is_valid() {
        let topology = Topology::skills();
        topology.validate().unwrap();

        assert_eq!(topology.region, "ap-northeast-2");
        assert_eq!(topology.subnets.len(), 6);
        assert_eq!(topology.nat_gateways.len(), 2);
        assert_eq!(topology.route_tables.len(), 4);
    }

    #[test]
    fn test_skills_subnet_table() {
        let topology = Topology::skills();
        let table: Vec<(&str, &str, &str)> = topology
            .subnets
            .iter()
            .map(|s| {
                (
                    s.name.as_str(),
                    s.cidr_block.as_str(),
                    s.availability_zone.as_str(),
                )
            })
            .collect();

        assert_eq!(
            table,
            vec![
                ("skills-public-subnet-a", "10.100.1.0/24", "ap-northeast-2a"),
                ("skills-public-subnet-b", "10.100.2.0/24", "ap-northeast-2b"),
                ("skills-private-subnet-a", "10.100.11.0/24", "ap-northeast-2a"),
                ("skills-private-subnet-b", "10.100.12.0/24", "ap-northeast-2b"),
                ("skills-protected-subnet-a", "10.100.21.0/24", "ap-northeast-2a"),
                ("skills-protected-subnet-b", "10.100.22.0/24", "ap-northeast-2b"),
            ]
        );

        let public: Vec<&str> = topology
            .subnets
            .iter()
            .filter(|s| s.is_public())
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(public, vec!["skills-public-subnet-a", "skills-public-subnet-b"]);
    }

    #[test]
    fn test_nat_gateways_follow_public_subnets() {
        let topology = Topology::skills();
        let nat_a = topology.nat_gateway("skills-nat-a").unwrap();
        assert_eq!(nat_a.subnet, "skills-public-subnet-a");
        let nat_b = topology.nat_gateway("skills-nat-b").unwrap();
        assert_eq!(nat_b.subnet, "skills-public-subnet-b");
    }

    #[test]
    fn test_subnet_outside_vpc() {
        let mut topology = Topology::skills();
        topology.subnets[0].cidr_block = "10.200.1.0/24".to_string();

        assert!(matches!(
            topology.validate(),
            Err(CoreError::CidrOutsideVpc { .. })
        ));
    }

    #[test]
    fn test_overlapping_subnets() {
        let mut topology = Topology::skills();
        topology.subnets[1].cidr_block = "10.100.0.0/23".to_string();

        match topology.validate() {
            Err(CoreError::OverlappingSubnets { first, second }) => {
                assert_eq!(first, "skills-public-subnet-a");
                assert_eq!(second, "skills-public-subnet-b");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_zone() {
        let mut topology = Topology::skills();
        topology.subnets[5].availability_zone = "ap-northeast-2c".to_string();

        assert!(matches!(
            topology.validate(),
            Err(CoreError::UnknownZone { .. })
        ));
    }

    #[test]
    fn test_nat_must_be_public() {
        let mut topology = Topology::skills();
        topology.nat_gateways[0].subnet = "skills-private-subnet-a".to_string();

        assert!(matches!(
            topology.validate(),
            Err(CoreError::NatInPrivateSubnet { .. })
        ));
    }

    #[test]
    fn test_dangling_references() {
        let mut topology = Topology::skills();
        topology.route_tables[1].default_route =
            DefaultRoute::NatGateway("skills-nat-c".to_string());
        assert!(matches!(
            topology.validate(),
            Err(CoreError::UnknownNatGateway { .. })
        ));

        let mut topology = Topology::skills();
        topology.route_tables[3].subnets.push("skills-db-subnet-a".to_string());
        assert!(matches!(
            topology.validate(),
            Err(CoreError::UnknownSubnet { .. })
        ));
    }

    #[test]
    fn test_duplicate_name() {
        let mut topology = Topology::skills();
        topology.route_tables[0].name = "skills-vpc".to_string();

        assert!(matches!(
            topology.validate(),
            Err(CoreError::DuplicateName(name)) if name == "skills-vpc"
        ));
    }
}
