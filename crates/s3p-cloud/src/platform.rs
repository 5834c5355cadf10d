//! Cloud platform trait definition

use crate::error::Result;
use crate::types::{
    CreateServerRequest, CreateSubnetRequest, FlavorInfo, ImageInfo, NetworkInfo,
    SecurityGroupInfo, SecurityGroupRule, ServerInfo, SubnetInfo,
};
use async_trait::async_trait;

/// Cloud platform abstraction trait
///
/// The reconciler consumes the platform exclusively through this trait so the
/// OpenStack binding can be swapped for an in-memory fake in tests. The
/// platform is the source of truth for all resources; the reconciler never
/// holds durable local state.
///
/// All `find_*` operations return `Ok(None)` when the resource does not
/// exist; `Err` is reserved for transport/API failures.
#[async_trait]
pub trait CloudPlatform: Send + Sync {
    /// List the hostnames of all hypervisors known to the platform.
    async fn list_hypervisors(&self) -> Result<Vec<String>>;

    /// List all networks visible to the project.
    async fn list_networks(&self) -> Result<Vec<NetworkInfo>>;

    /// Find a network by name.
    async fn find_network(&self, name: &str) -> Result<Option<NetworkInfo>>;

    /// Create a network.
    async fn create_network(&self, name: &str) -> Result<NetworkInfo>;

    /// Delete a network by ID.
    async fn delete_network(&self, id: &str) -> Result<()>;

    /// List the subnets attached to a network.
    async fn list_subnets(&self, network_id: &str) -> Result<Vec<SubnetInfo>>;

    /// Create a subnet under an existing network.
    async fn create_subnet(&self, request: &CreateSubnetRequest) -> Result<SubnetInfo>;

    /// Delete a subnet by ID.
    async fn delete_subnet(&self, id: &str) -> Result<()>;

    /// List all servers visible to the project.
    async fn list_servers(&self) -> Result<Vec<ServerInfo>>;

    /// Find a server by name.
    async fn find_server(&self, name: &str) -> Result<Option<ServerInfo>>;

    /// Create a server.
    async fn create_server(&self, request: &CreateServerRequest) -> Result<ServerInfo>;

    /// Delete a server by ID.
    async fn delete_server(&self, id: &str) -> Result<()>;

    /// Find a security group by name.
    async fn find_security_group(&self, name: &str) -> Result<Option<SecurityGroupInfo>>;

    /// Create a security group.
    async fn create_security_group(&self, name: &str) -> Result<SecurityGroupInfo>;

    /// Add an ingress rule to a security group.
    async fn add_security_group_rule(&self, group_id: &str, rule: &SecurityGroupRule)
    -> Result<()>;

    /// Find an image by name.
    async fn find_image(&self, name: &str) -> Result<Option<ImageInfo>>;

    /// Find a flavor by name.
    async fn find_flavor(&self, name: &str) -> Result<Option<FlavorInfo>>;
}
