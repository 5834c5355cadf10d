//! Reconciler configuration
//!
//! All tunables are carried in an explicit `ReconcilerConfig` value threaded
//! through orchestrator calls; nothing here is ambient or global.

use crate::error::Result;
use crate::naming::NetIndexPolicy;
use s3p_cloud::{CloudError, CloudPlatform};
use std::time::Duration;

/// Configuration for one orchestration run.
#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    /// Network numbering policy.
    pub policy: NetIndexPolicy,

    /// Size of the network pool for `ModuloNumNetworks`. When `None`, the
    /// orchestrator uses the number of discovered hypervisors.
    pub network_count: Option<usize>,

    /// Tenant instances created per hypervisor.
    pub servers_per_host: u32,

    /// Whether instances found pre-existing are probed for reachability.
    /// Overrides the call-site verify request on the reuse path.
    pub validate_existing: bool,

    /// Readiness probe tuning.
    pub probe: ProbeConfig,

    /// Names of the fleet-owned platform resources.
    pub defaults: ResourceDefaults,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            policy: NetIndexPolicy::OnePerPhysHost,
            network_count: None,
            servers_per_host: 1,
            validate_existing: true,
            probe: ProbeConfig::default(),
            defaults: ResourceDefaults::default(),
        }
    }
}

/// Readiness probe tuning.
#[derive(Debug, Clone, Copy)]
pub struct ProbeConfig {
    /// Delay between probe attempts.
    pub interval: Duration,

    /// Attempt budget before `ReachabilityTimeout`.
    pub max_attempts: u32,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(100),
            max_attempts: 600,
        }
    }
}

/// Human-readable names of the static resources the fleet depends on,
/// plus the name prefixes that mark fleet ownership.
#[derive(Debug, Clone)]
pub struct ResourceDefaults {
    pub security_group: String,
    pub image: String,
    pub flavor: String,
    pub network_prefix: String,
    pub server_prefix: String,
}

impl Default for ResourceDefaults {
    fn default() -> Self {
        Self {
            security_group: "s3p_secgrp".to_string(),
            image: "cirros-0.3.4-x86_64-uec".to_string(),
            flavor: "cirros256".to_string(),
            network_prefix: "s3p-net-".to_string(),
            server_prefix: "tenant-".to_string(),
        }
    }
}

/// Platform IDs of the static resources, resolved once per run before any
/// provisioning path executes.
#[derive(Debug, Clone)]
pub struct ResourceIds {
    pub security_group_id: String,
    pub image_id: String,
    pub flavor_id: String,
}

impl ResourceIds {
    /// Resolve the configured resource names against the platform.
    pub async fn resolve(
        platform: &dyn CloudPlatform,
        defaults: &ResourceDefaults,
    ) -> Result<Self> {
        let secgrp = platform
            .find_security_group(&defaults.security_group)
            .await?
            .ok_or_else(|| CloudError::ResourceNotFound(defaults.security_group.clone()))?;
        let image = platform
            .find_image(&defaults.image)
            .await?
            .ok_or_else(|| CloudError::ResourceNotFound(defaults.image.clone()))?;
        let flavor = platform
            .find_flavor(&defaults.flavor)
            .await?
            .ok_or_else(|| CloudError::ResourceNotFound(defaults.flavor.clone()))?;

        tracing::debug!("{}: {}", defaults.security_group, secgrp.id);
        tracing::debug!("{}: {}", defaults.image, image.id);
        tracing::debug!("{}: {}", defaults.flavor, flavor.id);

        Ok(Self {
            security_group_id: secgrp.id,
            image_id: image.id,
            flavor_id: flavor.id,
        })
    }
}
