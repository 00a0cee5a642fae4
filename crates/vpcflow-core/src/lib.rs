//! vpcflow core
//!
//! The fixed `skills` network topology, the ordered plan derived from it,
//! and the pipeline that provisions it through a
//! [`NetworkProvider`](vpcflow_cloud::NetworkProvider).

pub mod cidr;
pub mod error;
pub mod inventory;
pub mod plan;
pub mod provision;
pub mod topology;

pub use cidr::Ipv4Cidr;
pub use error::{CoreError, Result};
pub use inventory::Inventory;
pub use provision::{
    DEFAULT_NAT_WAIT_TIMEOUT, ProvisionEvent, ProvisionOutcome, Provisioner, Reporter, STAGES,
    TracingReporter,
};
pub use topology::{
    AVAILABILITY_ZONES, DEFAULT_ROUTE_CIDR, DefaultRoute, NatGatewaySpec, REGION, RouteTableSpec,
    SubnetSpec, SubnetTier, Topology,
};
