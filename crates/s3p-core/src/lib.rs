//! S3P Provisioning Reconciler
//!
//! Core logic of the S3P scale-test fleet provisioner: deterministically
//! maps hypervisors to network/instance identities, idempotently
//! creates-or-reuses cloud resources, waits for each instance to become
//! network-reachable, and reverses all of it during cleanup.
//!
//! # Architecture
//!
//! ```text
//! provision_fleet ──► per hypervisor:
//!   HostIdentity::parse ─► network_index ─► derived names
//!        │
//!        ├─► NetworkAllocator::ensure   (create or reuse net+subnet)
//!        ├─► InstanceProvisioner::ensure (create or reuse tenant)
//!        └─► ReadinessProber::wait_until_reachable
//!
//! cleanup_fleet ──► delete tenants by prefix, then networks+subnets
//! ```
//!
//! The platform is consumed through `s3p_cloud::CloudPlatform` and remains
//! the source of truth; the in-memory `Catalog` is a snapshot used only to
//! pre-filter create-vs-reuse decisions.

pub mod catalog;
pub mod config;
pub mod error;
pub mod instance;
pub mod naming;
pub mod network;
pub mod orchestrator;
pub mod probe;
pub mod rollback;
pub mod secgroup;

// Re-exports
pub use catalog::Catalog;
pub use config::{ProbeConfig, ReconcilerConfig, ResourceDefaults, ResourceIds};
pub use error::{ProvisionError, Result};
pub use instance::{InstanceProvisioner, InstanceRequest};
pub use naming::{HostIdentity, NetIndexPolicy};
pub use network::{NetworkAllocation, NetworkAllocator};
pub use orchestrator::{CleanupSummary, FleetSummary, cleanup_fleet, provision_fleet};
pub use probe::{NetnsPinger, Pinger, ReadinessProber};
pub use secgroup::ensure_security_group;
