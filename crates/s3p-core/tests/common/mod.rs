//! In-memory cloud platform for reconciler tests.
//!
//! Records every mutating platform call in order so tests can assert on
//! create counts and delete ordering.

use async_trait::async_trait;
use s3p_cloud::{
    CloudError, CloudPlatform, CreateServerRequest, CreateSubnetRequest, FlavorInfo, ImageInfo,
    NetworkInfo, SecurityGroupInfo, SecurityGroupRule, ServerInfo, SubnetInfo,
};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct MockState {
    pub hypervisors: Vec<String>,
    pub networks: Vec<NetworkInfo>,
    pub subnets: Vec<SubnetInfo>,
    pub servers: Vec<ServerInfo>,
    pub security_groups: Vec<SecurityGroupInfo>,
    pub images: Vec<ImageInfo>,
    pub flavors: Vec<FlavorInfo>,
    /// Mutating calls in invocation order, e.g. `create_network:s3p-net-5`.
    pub ops: Vec<String>,
    pub fail_server_create: bool,
    counter: u32,
}

impl MockState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.counter += 1;
        format!("{prefix}-{}", self.counter)
    }
}

#[derive(Default)]
pub struct MockPlatform {
    pub state: Mutex<MockState>,
}

impl MockPlatform {
    /// Platform with the static resources the default config expects
    /// (cirros image, cirros256 flavor, s3p_secgrp) already present.
    pub fn seeded(hypervisors: &[&str]) -> Self {
        let platform = Self::default();
        {
            let mut state = platform.state.lock().unwrap();
            state.hypervisors = hypervisors.iter().map(|h| h.to_string()).collect();
            state.security_groups.push(SecurityGroupInfo {
                id: "secgrp-0".to_string(),
                name: "s3p_secgrp".to_string(),
            });
            state.images.push(ImageInfo {
                id: "img-0".to_string(),
                name: "cirros-0.3.4-x86_64-uec".to_string(),
            });
            state.flavors.push(FlavorInfo {
                id: "flv-0".to_string(),
                name: "cirros256".to_string(),
            });
        }
        platform
    }

    pub fn ops(&self) -> Vec<String> {
        self.state.lock().unwrap().ops.clone()
    }

    pub fn count_ops(&self, prefix: &str) -> usize {
        self.ops().iter().filter(|op| op.starts_with(prefix)).count()
    }

    pub fn fail_server_create(&self) {
        self.state.lock().unwrap().fail_server_create = true;
    }

    /// Pre-populate a network with its derived subnet, as a previous run
    /// would have left it.
    pub fn add_network(&self, name: &str, index: i64) {
        let mut state = self.state.lock().unwrap();
        let net_id = state.next_id("net");
        state.networks.push(NetworkInfo {
            id: net_id.clone(),
            name: name.to_string(),
        });
        let sub_id = state.next_id("sub");
        state.subnets.push(SubnetInfo {
            id: sub_id,
            name: format!("{name}-sub"),
            network_id: net_id,
            cidr: format!("10.0.{index}.0/24"),
            gateway_ip: format!("10.0.{index}.1"),
        });
    }

    /// Pre-populate a server with an address on the given network.
    pub fn add_server(&self, name: &str, network: &str, address: &str) {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id("srv");
        let mut addresses = HashMap::new();
        addresses.insert(network.to_string(), vec![address.to_string()]);
        state.servers.push(ServerInfo {
            id,
            name: name.to_string(),
            addresses,
        });
    }
}

#[async_trait]
impl CloudPlatform for MockPlatform {
    async fn list_hypervisors(&self) -> s3p_cloud::Result<Vec<String>> {
        Ok(self.state.lock().unwrap().hypervisors.clone())
    }

    async fn list_networks(&self) -> s3p_cloud::Result<Vec<NetworkInfo>> {
        Ok(self.state.lock().unwrap().networks.clone())
    }

    async fn find_network(&self, name: &str) -> s3p_cloud::Result<Option<NetworkInfo>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .networks
            .iter()
            .find(|n| n.name == name)
            .cloned())
    }

    async fn create_network(&self, name: &str) -> s3p_cloud::Result<NetworkInfo> {
        let mut state = self.state.lock().unwrap();
        state.ops.push(format!("create_network:{name}"));
        let id = state.next_id("net");
        let network = NetworkInfo {
            id,
            name: name.to_string(),
        };
        state.networks.push(network.clone());
        Ok(network)
    }

    async fn delete_network(&self, id: &str) -> s3p_cloud::Result<()> {
        let mut state = self.state.lock().unwrap();
        let Some(pos) = state.networks.iter().position(|n| n.id == id) else {
            return Err(CloudError::ResourceNotFound(id.to_string()));
        };
        let network = state.networks.remove(pos);
        state.ops.push(format!("delete_network:{}", network.name));
        Ok(())
    }

    async fn list_subnets(&self, network_id: &str) -> s3p_cloud::Result<Vec<SubnetInfo>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .subnets
            .iter()
            .filter(|s| s.network_id == network_id)
            .cloned()
            .collect())
    }

    async fn create_subnet(&self, request: &CreateSubnetRequest) -> s3p_cloud::Result<SubnetInfo> {
        let mut state = self.state.lock().unwrap();
        state.ops.push(format!("create_subnet:{}", request.name));
        let id = state.next_id("sub");
        let subnet = SubnetInfo {
            id,
            name: request.name.clone(),
            network_id: request.network_id.clone(),
            cidr: request.cidr.clone(),
            gateway_ip: request.gateway_ip.clone(),
        };
        state.subnets.push(subnet.clone());
        Ok(subnet)
    }

    async fn delete_subnet(&self, id: &str) -> s3p_cloud::Result<()> {
        let mut state = self.state.lock().unwrap();
        let Some(pos) = state.subnets.iter().position(|s| s.id == id) else {
            return Err(CloudError::ResourceNotFound(id.to_string()));
        };
        let subnet = state.subnets.remove(pos);
        state.ops.push(format!("delete_subnet:{}", subnet.name));
        Ok(())
    }

    async fn list_servers(&self) -> s3p_cloud::Result<Vec<ServerInfo>> {
        Ok(self.state.lock().unwrap().servers.clone())
    }

    async fn find_server(&self, name: &str) -> s3p_cloud::Result<Option<ServerInfo>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .servers
            .iter()
            .find(|s| s.name == name)
            .cloned())
    }

    async fn create_server(&self, request: &CreateServerRequest) -> s3p_cloud::Result<ServerInfo> {
        let mut state = self.state.lock().unwrap();
        if state.fail_server_create {
            return Err(CloudError::ApiError("server create failed".to_string()));
        }
        state.ops.push(format!(
            "create_server:{}@{}:{}",
            request.name, request.hypervisor, request.network
        ));
        // Address derived from the network's subnet, like DHCP would.
        let address = state
            .subnets
            .iter()
            .find(|s| {
                state
                    .networks
                    .iter()
                    .any(|n| n.id == s.network_id && n.name == request.network)
            })
            .and_then(|s| s.cidr.strip_suffix(".0/24").map(|base| format!("{base}.3")))
            .unwrap_or_else(|| "192.0.2.3".to_string());
        let id = state.next_id("srv");
        let mut addresses = HashMap::new();
        addresses.insert(request.network.clone(), vec![address]);
        let server = ServerInfo {
            id,
            name: request.name.clone(),
            addresses,
        };
        state.servers.push(server.clone());
        Ok(server)
    }

    async fn delete_server(&self, id: &str) -> s3p_cloud::Result<()> {
        let mut state = self.state.lock().unwrap();
        let Some(pos) = state.servers.iter().position(|s| s.id == id) else {
            return Err(CloudError::ResourceNotFound(id.to_string()));
        };
        let server = state.servers.remove(pos);
        state.ops.push(format!("delete_server:{}", server.name));
        Ok(())
    }

    async fn find_security_group(
        &self,
        name: &str,
    ) -> s3p_cloud::Result<Option<SecurityGroupInfo>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .security_groups
            .iter()
            .find(|g| g.name == name)
            .cloned())
    }

    async fn create_security_group(&self, name: &str) -> s3p_cloud::Result<SecurityGroupInfo> {
        let mut state = self.state.lock().unwrap();
        state.ops.push(format!("create_security_group:{name}"));
        let id = state.next_id("secgrp");
        let group = SecurityGroupInfo {
            id,
            name: name.to_string(),
        };
        state.security_groups.push(group.clone());
        Ok(group)
    }

    async fn add_security_group_rule(
        &self,
        group_id: &str,
        rule: &SecurityGroupRule,
    ) -> s3p_cloud::Result<()> {
        let mut state = self.state.lock().unwrap();
        state
            .ops
            .push(format!("add_rule:{group_id}:{}", rule.protocol));
        Ok(())
    }

    async fn find_image(&self, name: &str) -> s3p_cloud::Result<Option<ImageInfo>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .images
            .iter()
            .find(|i| i.name == name)
            .cloned())
    }

    async fn find_flavor(&self, name: &str) -> s3p_cloud::Result<Option<FlavorInfo>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .flavors
            .iter()
            .find(|f| f.name == name)
            .cloned())
    }
}

/// Pinger whose targets are always reachable.
pub struct AlwaysUpPinger;

#[async_trait]
impl s3p_core::Pinger for AlwaysUpPinger {
    async fn ping(&self, _namespace: &str, _address: &str) -> std::io::Result<bool> {
        Ok(true)
    }
}
