//! Deterministic naming and network indexing
//!
//! Pure functions deriving network indices and resource names from a host
//! identity and a numbering policy. Stability across repeated calls is what
//! makes the create-or-reuse checks elsewhere sound.

use crate::error::{ProvisionError, Result};

/// Identity of one hypervisor, parsed from a name of the form
/// `compute-<host_id>-<component_id>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostIdentity {
    /// Physical host number.
    pub host_id: i64,
    /// Component number within the host.
    pub component_id: i64,
}

impl HostIdentity {
    /// Parse a hypervisor name.
    ///
    /// Fails with `MalformedName` when the name has fewer than three
    /// `-`-separated tokens or the ID tokens are not integers.
    pub fn parse(name: &str) -> Result<Self> {
        let mut tokens = name.split('-');
        let _prefix = tokens
            .next()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ProvisionError::MalformedName(name.to_string()))?;
        let host_id = parse_id_token(tokens.next(), name)?;
        let component_id = parse_id_token(tokens.next(), name)?;
        Ok(Self {
            host_id,
            component_id,
        })
    }

    /// `<host_id>-<component_id>`, the middle of every derived name.
    pub fn label(&self) -> String {
        format!("{}-{}", self.host_id, self.component_id)
    }
}

fn parse_id_token(token: Option<&str>, name: &str) -> Result<i64> {
    token
        .filter(|t| !t.is_empty())
        .and_then(|t| t.parse().ok())
        .ok_or_else(|| ProvisionError::MalformedName(name.to_string()))
}

/// Policy choosing which network a host's instances land on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetIndexPolicy {
    /// One network for the whole fleet (index 0).
    #[default]
    OneNet,
    /// Spread components across a fixed pool of networks.
    ModuloNumNetworks,
    /// One network per physical host.
    OnePerPhysHost,
}

/// Derive the network index for a host.
///
/// Deterministic pure function of its inputs. Indices are passed through
/// without bounds validation; a negative component ID yields a negative
/// index under `ModuloNumNetworks`.
pub fn network_index(
    policy: NetIndexPolicy,
    component_id: i64,
    network_count: usize,
    host_id: i64,
) -> i64 {
    match policy {
        NetIndexPolicy::ModuloNumNetworks => component_id % network_count.max(1) as i64,
        NetIndexPolicy::OnePerPhysHost => host_id,
        NetIndexPolicy::OneNet => 0,
    }
}

/// Network name for an index, e.g. `s3p-net-5`.
pub fn network_name(prefix: &str, index: i64) -> String {
    format!("{prefix}{index}")
}

/// Subnet name for a network, e.g. `s3p-net-5-sub`.
pub fn subnet_name(network_name: &str) -> String {
    format!("{network_name}-sub")
}

/// Subnet CIDR for an index, e.g. `10.0.5.0/24`.
pub fn subnet_cidr(index: i64) -> String {
    format!("10.0.{index}.0/24")
}

/// Gateway address for an index, e.g. `10.0.5.1`.
pub fn gateway_ip(index: i64) -> String {
    format!("10.0.{index}.1")
}

/// Instance name for a host and per-host sequence number,
/// e.g. `tenant-5-11-1`.
pub fn instance_name(prefix: &str, identity: &HostIdentity, sequence: u32) -> String {
    format!("{prefix}{}-{sequence}", identity.label())
}
