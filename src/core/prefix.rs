use ipnetwork::Ipv4Network;
use std::net::Ipv4Addr;

/*-------------------------------------------------------------------------------------------------
  Prefix
-------------------------------------------------------------------------------------------------*/

/// One AWS IP ranges record: an IPv4 CIDR block and the region and service it is published for.
/// Region and service keep the casing used in the source document.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Prefix {
    /// IPv4 CIDR block.
    pub ip_prefix: Ipv4Network,

    /// AWS region code, e.g. `us-east-1`.
    pub region: String,

    /// AWS service name, e.g. `EC2`.
    pub service: String,
}

impl Prefix {
    /// Whether the record's region matches `region`, ignoring case.
    pub fn in_region(&self, region: &str) -> bool {
        self.region.eq_ignore_ascii_case(region)
    }

    /// Whether the record's service matches `service`, ignoring case.
    pub fn used_by(&self, service: &str) -> bool {
        self.service.eq_ignore_ascii_case(service)
    }

    /// Whether the CIDR block contains `ip`.
    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        self.ip_prefix.contains(ip)
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
