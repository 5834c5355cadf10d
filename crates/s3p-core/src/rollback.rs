//! Per-host creation tracking and compensating deletes
//!
//! The fleet orchestrator records every resource it creates for a host and,
//! when provisioning that host fails, deletes them in reverse creation order
//! before propagating the error. Compensation is best-effort: a failed
//! delete is logged and skipped.

use s3p_cloud::CloudPlatform;
use tracing::warn;

/// A resource created during the current host's provisioning.
#[derive(Debug, Clone)]
pub enum CreatedResource {
    Network { id: String, name: String },
    Subnet { id: String, name: String },
    Server { id: String, name: String },
}

/// Ordered record of the resources created for one host.
#[derive(Debug, Default)]
pub struct CreationLog {
    entries: Vec<CreatedResource>,
}

impl CreationLog {
    pub fn record(&mut self, resource: CreatedResource) {
        self.entries.push(resource);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Delete everything in `log`, newest first.
pub async fn roll_back(platform: &dyn CloudPlatform, log: &CreationLog) {
    for resource in log.entries.iter().rev() {
        let outcome = match resource {
            CreatedResource::Server { id, name } => {
                warn!("Rolling back server '{name}'");
                platform.delete_server(id).await
            }
            CreatedResource::Subnet { id, name } => {
                warn!("Rolling back subnet '{name}'");
                platform.delete_subnet(id).await
            }
            CreatedResource::Network { id, name } => {
                warn!("Rolling back network '{name}'");
                platform.delete_network(id).await
            }
        };
        if let Err(e) = outcome {
            warn!("Rollback delete failed, continuing: {e}");
        }
    }
}
