//! Reconciler error types

use s3p_cloud::CloudError;
use thiserror::Error;

/// Errors raised by the provisioning reconciler
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// A hypervisor name did not match `compute-<host>-<component>`.
    #[error("malformed hypervisor name: '{0}'")]
    MalformedName(String),

    /// Network or subnet creation failed. Fatal: resource state is ambiguous.
    #[error("failed to create network '{name}': {source}")]
    NetworkCreate {
        name: String,
        #[source]
        source: CloudError,
    },

    /// Server creation failed. Fatal.
    #[error("failed to create server '{name}': {source}")]
    InstanceCreate {
        name: String,
        #[source]
        source: CloudError,
    },

    /// The readiness probe exhausted its attempt budget.
    #[error("server '{server}' did not respond to ping after {attempts} probes")]
    ReachabilityTimeout { server: String, attempts: u32 },

    /// The platform reported no address for the server on its network.
    #[error("server '{server}' has no address on network '{network}'")]
    AddressUnresolved { server: String, network: String },

    /// Any other platform failure.
    #[error(transparent)]
    Cloud(#[from] CloudError),
}

pub type Result<T> = std::result::Result<T, ProvisionError>;
