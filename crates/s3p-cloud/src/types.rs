//! Resource descriptor types shared across platform bindings

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A network as reported by the platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkInfo {
    /// Platform-assigned network ID
    pub id: String,

    /// Network name
    pub name: String,
}

/// A subnet as reported by the platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubnetInfo {
    /// Platform-assigned subnet ID
    pub id: String,

    /// Subnet name
    pub name: String,

    /// ID of the parent network
    pub network_id: String,

    /// CIDR of the subnet (e.g. "10.0.5.0/24")
    pub cidr: String,

    /// Gateway address (e.g. "10.0.5.1")
    pub gateway_ip: String,
}

/// A compute instance as reported by the platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    /// Platform-assigned server ID
    pub id: String,

    /// Server name
    pub name: String,

    /// Addresses indexed by network name
    #[serde(default)]
    pub addresses: HashMap<String, Vec<String>>,
}

impl ServerInfo {
    /// First address assigned to this server on the given network, if any.
    pub fn address_on(&self, network_name: &str) -> Option<&str> {
        self.addresses
            .get(network_name)
            .and_then(|addrs| addrs.first())
            .map(String::as_str)
    }
}

/// A security group as reported by the platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityGroupInfo {
    pub id: String,
    pub name: String,
}

/// A bootable image as reported by the platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageInfo {
    pub id: String,
    pub name: String,
}

/// A compute flavor as reported by the platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlavorInfo {
    pub id: String,
    pub name: String,
}

/// Request to create a subnet under an existing network
#[derive(Debug, Clone)]
pub struct CreateSubnetRequest {
    /// Subnet name
    pub name: String,

    /// ID of the parent network
    pub network_id: String,

    /// Subnet CIDR
    pub cidr: String,

    /// Gateway address
    pub gateway_ip: String,
}

/// Request to create a server bound to a specific hypervisor and network
#[derive(Debug, Clone)]
pub struct CreateServerRequest {
    /// Server name
    pub name: String,

    /// Hypervisor the server must be scheduled onto
    pub hypervisor: String,

    /// Name of the network the server attaches to
    pub network: String,

    /// Resolved image ID
    pub image_id: String,

    /// Resolved flavor ID
    pub flavor_id: String,

    /// Resolved security group ID
    pub security_group_id: String,
}

/// An ingress rule to add to a security group
#[derive(Debug, Clone)]
pub struct SecurityGroupRule {
    /// IP protocol ("tcp", "icmp", ...)
    pub protocol: String,

    /// Start of the destination port range, if the protocol has ports
    pub port_min: Option<u16>,

    /// End of the destination port range, if the protocol has ports
    pub port_max: Option<u16>,
}

impl SecurityGroupRule {
    /// Ingress rule allowing SSH (tcp/22).
    pub fn ssh() -> Self {
        Self {
            protocol: "tcp".to_string(),
            port_min: Some(22),
            port_max: Some(22),
        }
    }

    /// Ingress rule allowing ICMP echo.
    pub fn icmp() -> Self {
        Self {
            protocol: "icmp".to_string(),
            port_min: None,
            port_max: None,
        }
    }
}
