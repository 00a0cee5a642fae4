//! Identifiers created during a run

use crate::plan::{ELASTIC_IP, INTERNET_GATEWAY, NAT_GATEWAY, ROUTE_TABLE, SUBNET, VPC};
use crate::topology::{DefaultRoute, Topology};
use serde::Serialize;
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};
use vpcflow_cloud::{GlobalState, ResourceState, ResourceStatus};

const PROVIDER: &str = "aws";

/// Name → id mappings for everything a run created
#[derive(Debug, Clone, Default, Serialize)]
pub struct Inventory {
    pub vpc_id: Option<String>,
    pub internet_gateway_id: Option<String>,
    pub subnets: BTreeMap<String, String>,
    /// NAT gateway name → elastic IP allocation id
    pub elastic_ips: BTreeMap<String, String>,
    pub nat_gateways: BTreeMap<String, String>,
    pub route_tables: BTreeMap<String, String>,
    /// `route-table/subnet` → association id
    pub associations: BTreeMap<String, String>,
    /// Resources that were created but whose follow-up steps did not all complete
    #[serde(skip)]
    pub incomplete: BTreeSet<String>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of resources created (associations excluded)
    pub fn resource_count(&self) -> usize {
        usize::from(self.vpc_id.is_some())
            + usize::from(self.internet_gateway_id.is_some())
            + self.subnets.len()
            + self.elastic_ips.len()
            + self.nat_gateways.len()
            + self.route_tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resource_count() == 0
    }

    pub(crate) fn mark_incomplete(&mut self, name: &str) {
        self.incomplete.insert(name.to_string());
    }

    fn status_of(&self, name: &str) -> ResourceStatus {
        if self.incomplete.contains(name) {
            ResourceStatus::Pending
        } else {
            ResourceStatus::Available
        }
    }

    /// Convert into the persisted state record
    pub fn to_state(&self, topology: &Topology) -> GlobalState {
        let mut state = GlobalState::for_region(&topology.region);
        let mut put = |resource_type: &str, name: &str, resource: ResourceState| {
            state.set_resource(GlobalState::key(PROVIDER, resource_type, name), resource);
        };

        if let Some(id) = &self.vpc_id {
            put(
                VPC,
                &topology.vpc_name,
                ResourceState::new(id, VPC)
                    .with_status(self.status_of(&topology.vpc_name))
                    .with_attribute("cidr_block", json!(topology.vpc_cidr)),
            );
        }

        if let Some(id) = &self.internet_gateway_id {
            let mut igw = ResourceState::new(id, INTERNET_GATEWAY)
                .with_status(self.status_of(&topology.internet_gateway_name));
            if let Some(vpc_id) = &self.vpc_id {
                igw.set_attribute("vpc_id", json!(vpc_id));
            }
            put(INTERNET_GATEWAY, &topology.internet_gateway_name, igw);
        }

        for (name, id) in &self.subnets {
            let mut subnet = ResourceState::new(id, SUBNET).with_status(self.status_of(name));
            if let Some(spec) = topology.subnet(name) {
                subnet.set_attribute("cidr_block", json!(spec.cidr_block));
                subnet.set_attribute("availability_zone", json!(spec.availability_zone));
                subnet.set_attribute("tier", json!(spec.tier));
            }
            put(SUBNET, name, subnet);
        }

        for (name, allocation_id) in &self.elastic_ips {
            put(
                ELASTIC_IP,
                name,
                ResourceState::new(allocation_id, ELASTIC_IP)
                    .with_status(ResourceStatus::Available),
            );
        }

        for (name, id) in &self.nat_gateways {
            let mut nat = ResourceState::new(id, NAT_GATEWAY).with_status(self.status_of(name));
            if let Some(allocation_id) = self.elastic_ips.get(name) {
                nat.set_attribute("allocation_id", json!(allocation_id));
            }
            if let Some(spec) = topology.nat_gateway(name)
                && let Some(subnet_id) = self.subnets.get(&spec.subnet)
            {
                nat.set_attribute("subnet_id", json!(subnet_id));
            }
            put(NAT_GATEWAY, name, nat);
        }

        for (name, id) in &self.route_tables {
            let mut table = ResourceState::new(id, ROUTE_TABLE).with_status(self.status_of(name));
            if let Some(spec) = topology.route_tables.iter().find(|t| &t.name == name) {
                let target = match &spec.default_route {
                    DefaultRoute::None => None,
                    DefaultRoute::InternetGateway => self.internet_gateway_id.clone(),
                    DefaultRoute::NatGateway(nat) => self.nat_gateways.get(nat).cloned(),
                };
                table.set_attribute("default_route", json!(target));
                let associations: BTreeMap<&str, &str> = spec
                    .subnets
                    .iter()
                    .filter_map(|subnet| {
                        self.associations
                            .get(&format!("{}/{}", name, subnet))
                            .map(|assoc| (subnet.as_str(), assoc.as_str()))
                    })
                    .collect();
                table.set_attribute("associations", json!(associations));
            }
            put(ROUTE_TABLE, name, table);
        }

        state
    }
}
