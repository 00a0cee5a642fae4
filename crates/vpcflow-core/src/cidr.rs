//! IPv4 CIDR blocks

use crate::error::CoreError;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// An IPv4 network in `a.b.c.d/n` form
///
/// The address must be the network address: host bits are rejected, the
/// same way the EC2 API rejects them for VPCs and subnets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Cidr {
    network: Ipv4Addr,
    prefix: u8,
}

impl Ipv4Cidr {
    pub fn network(&self) -> Ipv4Addr {
        self.network
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    fn mask(prefix: u8) -> u32 {
        if prefix == 0 {
            0
        } else {
            u32::MAX << (32 - u32::from(prefix))
        }
    }

    fn first(&self) -> u32 {
        u32::from(self.network)
    }

    fn last(&self) -> u32 {
        self.first() | !Self::mask(self.prefix)
    }

    /// Number of addresses in the block
    pub fn size(&self) -> u64 {
        1u64 << (32 - u32::from(self.prefix))
    }

    /// Whether `other` lies entirely inside this block
    pub fn contains(&self, other: &Ipv4Cidr) -> bool {
        other.prefix >= self.prefix && other.first() >= self.first() && other.last() <= self.last()
    }

    pub fn overlaps(&self, other: &Ipv4Cidr) -> bool {
        self.first() <= other.last() && other.first() <= self.last()
    }
}

impl FromStr for Ipv4Cidr {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidCidr(s.to_string());

        let (addr, prefix) = s.split_once('/').ok_or_else(invalid)?;
        let addr: Ipv4Addr = addr.parse().map_err(|_| invalid())?;
        let prefix: u8 = prefix.parse().map_err(|_| invalid())?;
        if prefix > 32 {
            return Err(invalid());
        }
        if u32::from(addr) & !Self::mask(prefix) != 0 {
            return Err(invalid());
        }

        Ok(Self {
            network: addr,
            prefix,
        })
    }
}

impl std::fmt::Display for Ipv4Cidr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cidr(s: &str) -> Ipv4Cidr {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_and_display() {
        let vpc = cidr("10.100.0.0/16");
        assert_eq!(vpc.network(), Ipv4Addr::new(10, 100, 0, 0));
        assert_eq!(vpc.prefix(), 16);
        assert_eq!(vpc.size(), 65536);
        assert_eq!(vpc.to_string(), "10.100.0.0/16");

        assert_eq!(cidr("0.0.0.0/0").size(), 1 << 32);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        for bad in [
            "10.100.0.0",
            "10.100.0.0/33",
            "10.100.0/16",
            "10.100.1.0/16",
            "abc/24",
            "",
        ] {
            assert!(bad.parse::<Ipv4Cidr>().is_err(), "{} should not parse", bad);
        }
    }

    #[test]
    fn test_contains() {
        let vpc = cidr("10.100.0.0/16");
        assert!(vpc.contains(&cidr("10.100.1.0/24")));
        assert!(vpc.contains(&cidr("10.100.0.0/16")));
        assert!(!vpc.contains(&cidr("10.101.0.0/24")));
        assert!(!vpc.contains(&cidr("10.0.0.0/8")));
    }

    #[test]
    fn test_overlaps() {
        assert!(cidr("10.100.0.0/23").overlaps(&cidr("10.100.1.0/24")));
        assert!(!cidr("10.100.1.0/24").overlaps(&cidr("10.100.2.0/24")));
    }
}
