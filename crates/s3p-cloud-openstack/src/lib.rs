//! OpenStack binding for the S3P fleet provisioner
//!
//! Thin wrapper over the `openstack` CLI with JSON output. Credentials are
//! derived from the `SERVICE_HOST` environment variable following the
//! devstack demo-project convention. No reconciler logic lives here; this
//! crate only translates `CloudPlatform` calls into CLI invocations.

pub mod cli;
pub mod error;
pub mod platform;

pub use cli::{AuthEnv, OpenStackCli};
pub use error::{OpenStackError, Result};
pub use platform::OpenStackPlatform;
