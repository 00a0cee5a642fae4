//! vpcflow network provider abstraction
//!
//! This crate defines the seam between the provisioning pipeline and the
//! cloud control plane that actually creates network resources.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  vpcflow CLI                     │
//! │              (vpcflow plan/apply)                │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                 vpcflow-core                     │
//! │        Topology / Provisioner / Inventory        │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                 vpcflow-cloud                    │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │  trait NetworkProvider { ... }            │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │ Plan/Report  │  │  State Mgmt  │            │
//! │  └──────────────┘  └──────────────┘            │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//!           ┌───────▼───────┐
//!           │  aws (ec2)    │
//!           │   provider    │
//!           └───────────────┘
//! ```

pub mod action;
pub mod error;
pub mod provider;
pub mod state;

// Re-exports
pub use action::{
    Action, ActionResult, ActionStatus, ActionType, ApplyResult, Plan, PlanSummary,
};
pub use error::{CloudError, Result};
pub use provider::{
    AuthStatus, ElasticIp, NetworkProvider, ResourceTag, RouteTarget, VpcDnsAttribute,
};
pub use state::{GlobalState, ResourceState, ResourceStatus, StateLock, StateManager};
