//! Resource catalog
//!
//! In-memory snapshot of fleet-owned platform resources, taken once at
//! orchestration start. The platform remains the source of truth: the
//! catalog only pre-filters create-vs-reuse decisions, and every create path
//! re-confirms against a live `find` immediately before calling create.

use crate::config::ResourceDefaults;
use crate::error::Result;
use s3p_cloud::CloudPlatform;
use std::collections::HashMap;

/// Snapshot of known fleet resources, name → platform ID.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    networks: HashMap<String, String>,
    servers: HashMap<String, String>,
}

impl Catalog {
    /// Take a snapshot of live platform state, filtered to resources whose
    /// names carry the fleet prefixes.
    pub async fn snapshot(
        platform: &dyn CloudPlatform,
        defaults: &ResourceDefaults,
    ) -> Result<Self> {
        let networks = platform
            .list_networks()
            .await?
            .into_iter()
            .filter(|n| n.name.starts_with(&defaults.network_prefix))
            .map(|n| (n.name, n.id))
            .collect();
        let servers = platform
            .list_servers()
            .await?
            .into_iter()
            .filter(|s| s.name.starts_with(&defaults.server_prefix))
            .map(|s| (s.name, s.id))
            .collect();
        Ok(Self { networks, servers })
    }

    pub fn has_network(&self, name: &str) -> bool {
        self.networks.contains_key(name)
    }

    pub fn has_server(&self, name: &str) -> bool {
        self.servers.contains_key(name)
    }

    /// Record a network created after the snapshot was taken.
    pub fn note_network(&mut self, name: impl Into<String>, id: impl Into<String>) {
        self.networks.insert(name.into(), id.into());
    }

    /// Record a server created after the snapshot was taken.
    pub fn note_server(&mut self, name: impl Into<String>, id: impl Into<String>) {
        self.servers.insert(name.into(), id.into());
    }

    pub fn network_names(&self) -> Vec<&str> {
        self.networks.keys().map(String::as_str).collect()
    }

    pub fn server_names(&self) -> Vec<&str> {
        self.servers.keys().map(String::as_str).collect()
    }
}
