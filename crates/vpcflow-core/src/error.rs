use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid CIDR block: {0}")]
    InvalidCidr(String),

    #[error("Subnet {subnet} ({cidr}) is outside the VPC range {vpc_cidr}")]
    CidrOutsideVpc {
        subnet: String,
        cidr: String,
        vpc_cidr: String,
    },

    #[error("Subnets {first} and {second} overlap")]
    OverlappingSubnets { first: String, second: String },

    #[error("Subnet {subnet} uses zone {zone}, which is not one of the topology's zones")]
    UnknownZone { subnet: String, zone: String },

    #[error("{owner} references unknown subnet {subnet}")]
    UnknownSubnet { owner: String, subnet: String },

    #[error("{owner} references unknown NAT gateway {nat_gateway}")]
    UnknownNatGateway { owner: String, nat_gateway: String },

    #[error("NAT gateway {nat_gateway} must live in a public subnet, not {subnet}")]
    NatInPrivateSubnet { nat_gateway: String, subnet: String },

    #[error("Resource name used twice: {0}")]
    DuplicateName(String),

    #[error("provisioning incomplete: {failed} failed, {skipped} skipped")]
    Incomplete { failed: usize, skipped: usize },
}

pub type Result<T> = std::result::Result<T, CoreError>;
