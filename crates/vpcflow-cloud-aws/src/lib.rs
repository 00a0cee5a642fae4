//! AWS provider for vpcflow
//!
//! This crate implements the NetworkProvider trait on top of the EC2
//! control-plane API.
//!
//! # Requirements
//!
//! - Credentials resolvable by the default AWS provider chain
//!   (environment, shared config/credentials files, SSO, IMDS)
//! - Permissions for the VPC, subnet, internet gateway, elastic IP,
//!   NAT gateway, route table and tagging calls
//!
//! # Example
//!
//! ```ignore
//! use vpcflow_cloud::NetworkProvider;
//! use vpcflow_cloud_aws::Ec2NetworkProvider;
//!
//! let provider = Ec2NetworkProvider::connect("ap-northeast-2", None).await;
//!
//! let auth = provider.check_auth().await?;
//! if !auth.authenticated {
//!     panic!("Not authenticated: {:?}", auth.error);
//! }
//!
//! let vpc_id = provider.create_vpc("10.100.0.0/16").await?;
//! ```

pub mod ec2;
pub mod error;
pub mod provider;

pub use ec2::Ec2Api;
pub use error::{AwsError, Result};
pub use provider::Ec2NetworkProvider;
