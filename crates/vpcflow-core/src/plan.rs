//! Ordered action plan for a topology
//!
//! The plan lists every control-plane call a run makes, in the order the
//! provisioner makes them. Action ids are shared with the apply report so
//! each planned call can be matched to its outcome.

use crate::topology::{DEFAULT_ROUTE_CIDR, DefaultRoute, Topology};
use serde_json::json;
use vpcflow_cloud::{Action, ActionType, Plan, VpcDnsAttribute};

pub const VPC: &str = "vpc";
pub const INTERNET_GATEWAY: &str = "internet-gateway";
pub const SUBNET: &str = "subnet";
pub const ELASTIC_IP: &str = "elastic-ip";
pub const NAT_GATEWAY: &str = "nat-gateway";
pub const ROUTE_TABLE: &str = "route-table";
pub const ROUTE: &str = "route";

/// Action id helpers
pub mod ids {
    use super::*;

    pub fn create(resource_type: &str, name: &str) -> String {
        format!("create:{}:{}", resource_type, name)
    }

    pub fn tag(resource_type: &str, name: &str) -> String {
        format!("tag:{}:{}", resource_type, name)
    }

    pub fn vpc_dns(vpc: &str, attribute: VpcDnsAttribute) -> String {
        format!("modify:{}:{}/{}", VPC, vpc, attribute)
    }

    pub fn public_ip(subnet: &str) -> String {
        format!("modify:{}:{}/map-public-ip-on-launch", SUBNET, subnet)
    }

    pub fn attach(internet_gateway: &str) -> String {
        format!("attach:{}:{}", INTERNET_GATEWAY, internet_gateway)
    }

    /// Elastic IPs are named after the NAT gateway they back
    pub fn elastic_ip(nat_gateway: &str) -> String {
        create(ELASTIC_IP, nat_gateway)
    }

    pub fn wait(nat_gateway: &str) -> String {
        format!("wait:{}:{}", NAT_GATEWAY, nat_gateway)
    }

    pub fn default_route(route_table: &str) -> String {
        format!("create:{}:{}/{}", ROUTE, route_table, DEFAULT_ROUTE_CIDR)
    }

    pub fn associate(route_table: &str, subnet: &str) -> String {
        format!("associate:{}:{}/{}", ROUTE_TABLE, route_table, subnet)
    }
}

fn tag_action(resource_type: &str, name: &str) -> Action {
    Action::new(
        ids::tag(resource_type, name),
        ActionType::Tag,
        resource_type,
        name,
        format!("Tag {} Name={}", resource_type, name),
    )
}

impl Topology {
    /// Every action a run performs, in order
    pub fn plan(&self) -> Plan {
        let mut actions = Vec::new();
        let vpc = self.vpc_name.as_str();

        // 1. VPC
        actions.push(
            Action::new(
                ids::create(VPC, vpc),
                ActionType::Create,
                VPC,
                vpc,
                format!("Create VPC {} ({})", vpc, self.vpc_cidr),
            )
            .with_detail("cidr_block", json!(self.vpc_cidr))
            .with_detail("region", json!(self.region)),
        );
        actions.push(tag_action(VPC, vpc));
        for attribute in [VpcDnsAttribute::Support, VpcDnsAttribute::Hostnames] {
            actions.push(Action::new(
                ids::vpc_dns(vpc, attribute),
                ActionType::Modify,
                VPC,
                vpc,
                format!("Enable {} on {}", attribute, vpc),
            ));
        }

        // 2. Internet gateway
        let igw = self.internet_gateway_name.as_str();
        actions.push(Action::new(
            ids::create(INTERNET_GATEWAY, igw),
            ActionType::Create,
            INTERNET_GATEWAY,
            igw,
            format!("Create internet gateway {}", igw),
        ));
        actions.push(tag_action(INTERNET_GATEWAY, igw));
        actions.push(Action::new(
            ids::attach(igw),
            ActionType::Attach,
            INTERNET_GATEWAY,
            igw,
            format!("Attach {} to {}", igw, vpc),
        ));

        // 3. Subnets
        for subnet in &self.subnets {
            actions.push(
                Action::new(
                    ids::create(SUBNET, &subnet.name),
                    ActionType::Create,
                    SUBNET,
                    &subnet.name,
                    format!(
                        "Create {} subnet {} ({} in {})",
                        subnet.tier, subnet.name, subnet.cidr_block, subnet.availability_zone
                    ),
                )
                .with_detail("cidr_block", json!(subnet.cidr_block))
                .with_detail("availability_zone", json!(subnet.availability_zone))
                .with_detail("tier", json!(subnet.tier)),
            );
            actions.push(tag_action(SUBNET, &subnet.name));
            if subnet.is_public() {
                actions.push(Action::new(
                    ids::public_ip(&subnet.name),
                    ActionType::Modify,
                    SUBNET,
                    &subnet.name,
                    format!("Enable MapPublicIpOnLaunch on {}", subnet.name),
                ));
            }
        }

        // 4. NAT gateways
        for nat in &self.nat_gateways {
            actions.push(Action::new(
                ids::elastic_ip(&nat.name),
                ActionType::Create,
                ELASTIC_IP,
                &nat.name,
                format!("Allocate elastic IP for {}", nat.name),
            ));
            actions.push(
                Action::new(
                    ids::create(NAT_GATEWAY, &nat.name),
                    ActionType::Create,
                    NAT_GATEWAY,
                    &nat.name,
                    format!("Create NAT gateway {} in {}", nat.name, nat.subnet),
                )
                .with_detail("subnet", json!(nat.subnet)),
            );
            actions.push(tag_action(NAT_GATEWAY, &nat.name));
            actions.push(Action::new(
                ids::wait(&nat.name),
                ActionType::Wait,
                NAT_GATEWAY,
                &nat.name,
                format!("Wait until {} is available", nat.name),
            ));
        }

        // 5. Route tables
        for table in &self.route_tables {
            actions.push(Action::new(
                ids::create(ROUTE_TABLE, &table.name),
                ActionType::Create,
                ROUTE_TABLE,
                &table.name,
                format!("Create route table {}", table.name),
            ));
            actions.push(tag_action(ROUTE_TABLE, &table.name));

            let target = match &table.default_route {
                DefaultRoute::None => None,
                DefaultRoute::InternetGateway => Some(igw),
                DefaultRoute::NatGateway(nat) => Some(nat.as_str()),
            };
            if let Some(target) = target {
                actions.push(
                    Action::new(
                        ids::default_route(&table.name),
                        ActionType::Create,
                        ROUTE,
                        &table.name,
                        format!("Route {} via {} in {}", DEFAULT_ROUTE_CIDR, target, table.name),
                    )
                    .with_detail("target", json!(target)),
                );
            }

            for subnet in &table.subnets {
                actions.push(Action::new(
                    ids::associate(&table.name, subnet),
                    ActionType::Associate,
                    ROUTE_TABLE,
                    &table.name,
                    format!("Associate {} with {}", subnet, table.name),
                ));
            }
        }

        Plan::new(actions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_skills_plan_summary() {
        let plan = Topology::skills().plan();
        let summary = plan.summary();

        assert_eq!(summary.create, 19);
        assert_eq!(summary.tag, 14);
        assert_eq!(summary.modify, 4);
        assert_eq!(summary.attach, 1);
        assert_eq!(summary.associate, 6);
        assert_eq!(summary.wait, 2);
        assert_eq!(plan.len(), 46);
    }

    #[test]
    fn test_action_ids_are_unique() {
        let plan = Topology::skills().plan();
        let ids: HashSet<&str> = plan.actions.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids.len(), plan.len());
    }

    #[test]
    fn test_plan_order() {
        let plan = Topology::skills().plan();
        let position = |id: &str| plan.actions.iter().position(|a| a.id == id).unwrap();

        assert_eq!(plan.actions[0].id, "create:vpc:skills-vpc");
        assert!(
            position(&ids::attach("skills-igw"))
                < position(&ids::create(SUBNET, "skills-public-subnet-a"))
        );
        assert!(
            position(&ids::wait("skills-nat-b"))
                < position(&ids::create(ROUTE_TABLE, "skills-public-rtb"))
        );
    }

    #[test]
    fn test_protected_table_has_no_route() {
        let plan = Topology::skills().plan();
        assert!(plan.get(&ids::default_route("skills-protected-rtb")).is_none());
        assert!(plan.get(&ids::default_route("skills-private-rtb-a")).is_some());
        assert!(
            plan.get(&ids::associate("skills-protected-rtb", "skills-protected-subnet-b"))
                .is_some()
        );
    }

    #[test]
    fn test_only_public_subnets_map_public_ip() {
        let plan = Topology::skills().plan();
        let modified: Vec<&str> = plan
            .actions
            .iter()
            .filter(|a| a.action_type == ActionType::Modify && a.resource_type == SUBNET)
            .map(|a| a.resource_name.as_str())
            .collect();

        assert_eq!(modified, vec!["skills-public-subnet-a", "skills-public-subnet-b"]);
    }
}
