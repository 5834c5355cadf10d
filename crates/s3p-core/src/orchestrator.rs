//! Fleet and cleanup orchestrators
//!
//! `provision_fleet` walks the discovered hypervisors in discovery order and
//! drives the per-host create flow: parse identity → network index → derive
//! names → ensure network → ensure instance (verified). `cleanup_fleet`
//! tears the fleet down by name prefix, instances strictly before networks.

use crate::catalog::Catalog;
use crate::config::{ReconcilerConfig, ResourceIds};
use crate::error::Result;
use crate::instance::{InstanceProvisioner, InstanceRequest};
use crate::naming::{self, HostIdentity};
use crate::network::NetworkAllocator;
use crate::probe::Pinger;
use crate::rollback::{self, CreationLog};
use crate::secgroup::ensure_security_group;
use s3p_cloud::CloudPlatform;
use tracing::{debug, error, info, warn};

/// Outcome counts for one provisioning run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FleetSummary {
    pub hosts: usize,
    pub networks_created: usize,
    pub networks_reused: usize,
    pub servers_created: usize,
    pub servers_reused: usize,
}

impl std::fmt::Display for FleetSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} hosts: {} networks created ({} reused), {} servers created ({} reused)",
            self.hosts,
            self.networks_created,
            self.networks_reused,
            self.servers_created,
            self.servers_reused
        )
    }
}

/// Outcome counts for one cleanup run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupSummary {
    pub servers_deleted: usize,
    pub networks_deleted: usize,
    pub failures: usize,
}

impl std::fmt::Display for CleanupSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} servers and {} networks deleted, {} failures",
            self.servers_deleted, self.networks_deleted, self.failures
        )
    }
}

/// Provision one tenant instance (and its network) per discovered
/// hypervisor.
///
/// All host identities are parsed and the static resource IDs resolved
/// before the first platform mutation, so a malformed hypervisor name or a
/// missing image/flavor aborts the run with the platform untouched.
/// Re-running against an already provisioned fleet performs zero creations.
///
/// A fatal error during one host's provisioning rolls back the resources
/// created for that host (best-effort, reverse order) and aborts the run.
pub async fn provision_fleet(
    platform: &dyn CloudPlatform,
    pinger: &dyn Pinger,
    config: &ReconcilerConfig,
) -> Result<FleetSummary> {
    let hypervisors = platform.list_hypervisors().await?;
    debug!("Hypervisor list: {hypervisors:?}");

    let identities = hypervisors
        .iter()
        .map(|name| HostIdentity::parse(name).map(|identity| (name.clone(), identity)))
        .collect::<Result<Vec<_>>>()?;

    ensure_security_group(platform, &config.defaults.security_group).await?;
    let ids = ResourceIds::resolve(platform, &config.defaults).await?;

    let mut catalog = Catalog::snapshot(platform, &config.defaults).await?;
    debug!("Network list: {:?}", catalog.network_names());
    debug!("Server list: {:?}", catalog.server_names());

    let network_count = config.network_count.unwrap_or(hypervisors.len());
    let allocator = NetworkAllocator::new(platform);
    let provisioner = InstanceProvisioner::new(platform, pinger, config, &ids);

    let mut summary = FleetSummary {
        hosts: identities.len(),
        ..Default::default()
    };

    for (hypervisor, identity) in &identities {
        let mut log = CreationLog::default();
        match provision_host(
            &allocator,
            &provisioner,
            &mut catalog,
            &mut log,
            config,
            network_count,
            hypervisor,
            identity,
        )
        .await
        {
            Ok(host_summary) => {
                summary.networks_created += host_summary.networks_created;
                summary.networks_reused += host_summary.networks_reused;
                summary.servers_created += host_summary.servers_created;
                summary.servers_reused += host_summary.servers_reused;
            }
            Err(e) => {
                error!("provisioning host '{hypervisor}' failed: {e}");
                if !log.is_empty() {
                    warn!("rolling back resources created for host '{hypervisor}'");
                    rollback::roll_back(platform, &log).await;
                }
                return Err(e);
            }
        }
    }

    info!("Fleet provisioned: {summary}");
    Ok(summary)
}

#[allow(clippy::too_many_arguments)]
async fn provision_host(
    allocator: &NetworkAllocator<'_>,
    provisioner: &InstanceProvisioner<'_>,
    catalog: &mut Catalog,
    log: &mut CreationLog,
    config: &ReconcilerConfig,
    network_count: usize,
    hypervisor: &str,
    identity: &HostIdentity,
) -> Result<FleetSummary> {
    let index = naming::network_index(
        config.policy,
        identity.component_id,
        network_count,
        identity.host_id,
    );
    let net_name = naming::network_name(&config.defaults.network_prefix, index);

    let mut summary = FleetSummary::default();
    let (allocation, net_created) = allocator.ensure(catalog, log, &net_name, index).await?;
    if net_created {
        summary.networks_created += 1;
    } else {
        summary.networks_reused += 1;
    }

    for sequence in 1..=config.servers_per_host {
        let request = InstanceRequest {
            name: naming::instance_name(&config.defaults.server_prefix, identity, sequence),
            hypervisor: hypervisor.to_string(),
            network_name: allocation.name.clone(),
        };
        let (_server, created) = provisioner.ensure(catalog, log, &request, true).await?;
        if created {
            summary.servers_created += 1;
        } else {
            summary.servers_reused += 1;
        }
    }

    Ok(summary)
}

/// Delete every fleet-owned resource, instances first, then networks with
/// their subnets. Per-resource platform errors are logged and skipped so
/// teardown is best-effort; completion is not re-verified.
pub async fn cleanup_fleet(
    platform: &dyn CloudPlatform,
    config: &ReconcilerConfig,
) -> Result<CleanupSummary> {
    let mut summary = CleanupSummary::default();

    let servers = platform.list_servers().await?;
    for server in servers
        .iter()
        .filter(|s| s.name.starts_with(&config.defaults.server_prefix))
    {
        info!("Deleting instance \"{}\"", server.name);
        match platform.delete_server(&server.id).await {
            Ok(()) => summary.servers_deleted += 1,
            Err(e) => {
                warn!("failed to delete instance '{}': {e}", server.name);
                summary.failures += 1;
            }
        }
    }

    // Instances are gone (best-effort); networks can now be removed.
    let networks = platform.list_networks().await?;
    for network in networks
        .iter()
        .filter(|n| n.name.starts_with(&config.defaults.network_prefix))
    {
        info!("Deleting network \"{}\"", network.name);
        match delete_network_and_subnets(platform, &network.id).await {
            Ok(()) => {
                summary.networks_deleted += 1;
                info!("Network \"{}\" successfully deleted", network.name);
            }
            Err(e) => {
                warn!("failed to delete network '{}': {e}", network.name);
                summary.failures += 1;
            }
        }
    }

    info!("Cleanup finished: {summary}");
    Ok(summary)
}

async fn delete_network_and_subnets(platform: &dyn CloudPlatform, network_id: &str) -> Result<()> {
    for subnet in platform.list_subnets(network_id).await? {
        platform.delete_subnet(&subnet.id).await?;
    }
    platform.delete_network(network_id).await?;
    Ok(())
}
