//! Network allocator
//!
//! Ensures a network+subnet exists for a given index. Reuses an existing
//! network when one is found, otherwise creates the pair. Creation failures
//! are fatal: the platform state is ambiguous and the run must stop.

use crate::catalog::Catalog;
use crate::error::{ProvisionError, Result};
use crate::naming::{gateway_ip, subnet_cidr, subnet_name};
use crate::rollback::{CreatedResource, CreationLog};
use s3p_cloud::{CloudPlatform, CreateSubnetRequest};
use tracing::{info, warn};

/// One allocated (or reused) tenant network.
#[derive(Debug, Clone)]
pub struct NetworkAllocation {
    /// Network name.
    pub name: String,
    /// Platform network ID.
    pub id: String,
    /// Subnet CIDR derived from the network index.
    pub subnet_cidr: String,
    /// Gateway address derived from the network index.
    pub gateway_ip: String,
    /// Subnet ID when this run created the subnet.
    pub subnet_id: Option<String>,
}

/// Idempotent network+subnet provisioning.
pub struct NetworkAllocator<'a> {
    platform: &'a dyn CloudPlatform,
}

impl<'a> NetworkAllocator<'a> {
    pub fn new(platform: &'a dyn CloudPlatform) -> Self {
        Self { platform }
    }

    /// Ensure a network named `name` with the subnet derived from `index`
    /// exists. Returns the allocation and whether anything was created.
    pub async fn ensure(
        &self,
        catalog: &mut Catalog,
        log: &mut CreationLog,
        name: &str,
        index: i64,
    ) -> Result<(NetworkAllocation, bool)> {
        let cidr = subnet_cidr(index);
        let gateway = gateway_ip(index);

        // The catalog decides create-vs-reuse, but it is only a snapshot:
        // a catalog miss is re-checked against the live platform before any
        // create call, and a catalog hit still fetches the live handle.
        let existing = self.platform.find_network(name).await?;
        if let Some(existing) = existing {
            warn!("an OpenStack network named '{name}' already exists - skipping creation");
            if !catalog.has_network(name) {
                catalog.note_network(name, existing.id.clone());
            }
            return Ok((
                NetworkAllocation {
                    name: existing.name,
                    id: existing.id,
                    subnet_cidr: cidr,
                    gateway_ip: gateway,
                    subnet_id: None,
                },
                false,
            ));
        } else if catalog.has_network(name) {
            // Snapshot said the network exists but the platform no longer
            // agrees; fall through and recreate.
            warn!("network '{name}' vanished since the catalog snapshot, recreating");
        }

        info!("Creating OpenStack network with name: {name}");
        let network = self
            .platform
            .create_network(name)
            .await
            .map_err(|source| ProvisionError::NetworkCreate {
                name: name.to_string(),
                source,
            })?;
        log.record(CreatedResource::Network {
            id: network.id.clone(),
            name: network.name.clone(),
        });

        let sub_name = subnet_name(name);
        info!("Creating OpenStack subnet with name: {sub_name}");
        let subnet = self
            .platform
            .create_subnet(&CreateSubnetRequest {
                name: sub_name,
                network_id: network.id.clone(),
                cidr: cidr.clone(),
                gateway_ip: gateway.clone(),
            })
            .await
            .map_err(|source| ProvisionError::NetworkCreate {
                name: name.to_string(),
                source,
            })?;
        log.record(CreatedResource::Subnet {
            id: subnet.id.clone(),
            name: subnet.name,
        });

        catalog.note_network(name, network.id.clone());
        Ok((
            NetworkAllocation {
                name: network.name,
                id: network.id,
                subnet_cidr: cidr,
                gateway_ip: gateway,
                subnet_id: Some(subnet.id),
            },
            true,
        ))
    }
}
