//! S3P Cloud Platform Abstraction
//!
//! This crate defines the platform boundary for the S3P fleet provisioner:
//! the `CloudPlatform` trait plus the resource descriptor types exchanged
//! across it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                   s3p CLI                        │
//! │             (provision / cleanup)                │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                 s3p-core                         │
//! │   naming · catalog · allocator · provisioner     │
//! │   readiness prober · orchestrators               │
//! └─────────────────┬───────────────────────────────┘
//!                   │ trait CloudPlatform
//! ┌─────────────────▼───────────────────────────────┐
//! │               s3p-cloud (this crate)             │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//!          ┌────────▼─────────┐
//!          │ s3p-cloud-       │
//!          │ openstack        │
//!          └──────────────────┘
//! ```

pub mod error;
pub mod platform;
pub mod types;

// Re-exports
pub use error::{CloudError, Result};
pub use platform::CloudPlatform;
pub use types::{
    CreateServerRequest, CreateSubnetRequest, FlavorInfo, ImageInfo, NetworkInfo,
    SecurityGroupInfo, SecurityGroupRule, ServerInfo, SubnetInfo,
};
