//! Instance provisioner
//!
//! Ensures a tenant instance exists on a given hypervisor/network and,
//! when requested (or when the validate-existing policy applies), hands it
//! to the readiness prober. Creation failures are fatal.

use crate::catalog::Catalog;
use crate::config::{ReconcilerConfig, ResourceIds};
use crate::error::{ProvisionError, Result};
use crate::probe::{Pinger, ReadinessProber};
use crate::rollback::{CreatedResource, CreationLog};
use s3p_cloud::{CloudError, CloudPlatform, CreateServerRequest, ServerInfo};
use std::time::Instant;
use tracing::{info, warn};

/// Placement of one tenant instance.
#[derive(Debug, Clone)]
pub struct InstanceRequest {
    /// Deterministic instance name.
    pub name: String,
    /// Hypervisor the instance is bound to.
    pub hypervisor: String,
    /// Name of the tenant network the instance attaches to.
    pub network_name: String,
}

/// Idempotent tenant instance provisioning.
pub struct InstanceProvisioner<'a> {
    platform: &'a dyn CloudPlatform,
    pinger: &'a dyn Pinger,
    config: &'a ReconcilerConfig,
    ids: &'a ResourceIds,
}

impl<'a> InstanceProvisioner<'a> {
    pub fn new(
        platform: &'a dyn CloudPlatform,
        pinger: &'a dyn Pinger,
        config: &'a ReconcilerConfig,
        ids: &'a ResourceIds,
    ) -> Self {
        Self {
            platform,
            pinger,
            config,
            ids,
        }
    }

    /// Ensure the instance described by `request` exists. Returns the server
    /// handle and whether it was created by this call.
    ///
    /// On the reuse path the caller's `verify` request is replaced by the
    /// `validate_existing` policy: pre-existing instances are probed (or
    /// not) per run configuration, not per call site.
    pub async fn ensure(
        &self,
        catalog: &mut Catalog,
        log: &mut CreationLog,
        request: &InstanceRequest,
        verify: bool,
    ) -> Result<(ServerInfo, bool)> {
        // The catalog pre-filters create-vs-reuse; the live platform has the
        // final say so a resource created or deleted since the snapshot is
        // never duplicated or missed.
        let live = self.platform.find_server(&request.name).await?;
        let (server, created, verify) = if let Some(server) = live {
            warn!(
                "An instance with name '{}' already exists, skipping creation",
                request.name
            );
            if !catalog.has_server(&request.name) {
                catalog.note_server(&request.name, server.id.clone());
            }
            (server, false, self.config.validate_existing)
        } else {
            if catalog.has_server(&request.name) {
                warn!(
                    "instance '{}' vanished since the catalog snapshot, recreating",
                    request.name
                );
            }
            let server = self.create(log, request).await?;
            catalog.note_server(&request.name, server.id.clone());
            (server, true, verify)
        };

        if verify {
            self.smoke_test(&server, &request.network_name).await?;
        }

        Ok((server, created))
    }

    async fn create(&self, log: &mut CreationLog, request: &InstanceRequest) -> Result<ServerInfo> {
        info!(
            "Creating server {} on host {}, network {}",
            request.name, request.hypervisor, request.network_name
        );
        let started = Instant::now();
        let server = self
            .platform
            .create_server(&CreateServerRequest {
                name: request.name.clone(),
                hypervisor: request.hypervisor.clone(),
                network: request.network_name.clone(),
                image_id: self.ids.image_id.clone(),
                flavor_id: self.ids.flavor_id.clone(),
                security_group_id: self.ids.security_group_id.clone(),
            })
            .await
            .map_err(|source| ProvisionError::InstanceCreate {
                name: request.name.clone(),
                source,
            })?;
        log.record(CreatedResource::Server {
            id: server.id.clone(),
            name: server.name.clone(),
        });
        info!(
            "Server creation took {:.2} seconds",
            started.elapsed().as_secs_f64()
        );
        Ok(server)
    }

    async fn smoke_test(&self, server: &ServerInfo, network_name: &str) -> Result<()> {
        let network = self
            .platform
            .find_network(network_name)
            .await?
            .ok_or_else(|| CloudError::ResourceNotFound(network_name.to_string()))?;

        // A just-booted server may not have its address reported yet; the
        // detail view fetched here is fresher than the create response.
        let server = if server.address_on(network_name).is_none() {
            self.platform
                .find_server(&server.name)
                .await?
                .unwrap_or_else(|| server.clone())
        } else {
            server.clone()
        };

        let prober = ReadinessProber::new(self.pinger, self.config.probe);
        prober.wait_until_reachable(&server, &network).await?;
        Ok(())
    }
}
