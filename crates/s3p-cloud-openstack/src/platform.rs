//! OpenStack platform implementation

use crate::cli::{AuthEnv, OpenStackCli};
use crate::error::Result;
use async_trait::async_trait;
use s3p_cloud::{
    CloudPlatform, CreateServerRequest, CreateSubnetRequest, FlavorInfo, ImageInfo, NetworkInfo,
    SecurityGroupInfo, SecurityGroupRule, ServerInfo, SubnetInfo,
};

/// OpenStack platform backed by the `openstack` CLI
pub struct OpenStackPlatform {
    cli: OpenStackCli,
}

impl OpenStackPlatform {
    pub fn new(auth: AuthEnv) -> Self {
        Self {
            cli: OpenStackCli::new(auth),
        }
    }

    /// Build a platform from `SERVICE_HOST`.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(AuthEnv::from_env()?))
    }
}

#[async_trait]
impl CloudPlatform for OpenStackPlatform {
    async fn list_hypervisors(&self) -> s3p_cloud::Result<Vec<String>> {
        Ok(self.cli.list_hypervisors().await?)
    }

    async fn list_networks(&self) -> s3p_cloud::Result<Vec<NetworkInfo>> {
        let rows = self.cli.list_networks().await?;
        Ok(rows
            .into_iter()
            .map(|r| NetworkInfo {
                id: r.id,
                name: r.name,
            })
            .collect())
    }

    async fn find_network(&self, name: &str) -> s3p_cloud::Result<Option<NetworkInfo>> {
        let networks = self.list_networks().await?;
        Ok(networks.into_iter().find(|n| n.name == name))
    }

    async fn create_network(&self, name: &str) -> s3p_cloud::Result<NetworkInfo> {
        let row = self.cli.create_network(name).await?;
        Ok(NetworkInfo {
            id: row.id,
            name: row.name,
        })
    }

    async fn delete_network(&self, id: &str) -> s3p_cloud::Result<()> {
        Ok(self.cli.delete_network(id).await?)
    }

    async fn list_subnets(&self, network_id: &str) -> s3p_cloud::Result<Vec<SubnetInfo>> {
        let rows = self.cli.list_subnets(Some(network_id)).await?;
        Ok(rows
            .into_iter()
            .map(|r| SubnetInfo {
                id: r.id,
                name: r.name,
                network_id: r.network_id,
                cidr: r.subnet,
                gateway_ip: r.gateway_ip.unwrap_or_default(),
            })
            .collect())
    }

    async fn create_subnet(&self, request: &CreateSubnetRequest) -> s3p_cloud::Result<SubnetInfo> {
        let row = self
            .cli
            .create_subnet(
                &request.name,
                &request.network_id,
                &request.cidr,
                &request.gateway_ip,
            )
            .await?;
        Ok(SubnetInfo {
            id: row.id,
            name: row.name,
            network_id: row.network_id,
            cidr: row.subnet,
            gateway_ip: row.gateway_ip.unwrap_or_default(),
        })
    }

    async fn delete_subnet(&self, id: &str) -> s3p_cloud::Result<()> {
        Ok(self.cli.delete_subnet(id).await?)
    }

    async fn list_servers(&self) -> s3p_cloud::Result<Vec<ServerInfo>> {
        let rows = self.cli.list_servers().await?;
        Ok(rows
            .into_iter()
            .map(|r| ServerInfo {
                id: r.id,
                name: r.name,
                addresses: Default::default(),
            })
            .collect())
    }

    async fn find_server(&self, name: &str) -> s3p_cloud::Result<Option<ServerInfo>> {
        let rows = self.cli.list_servers().await?;
        let Some(row) = rows.into_iter().find(|r| r.name == name) else {
            return Ok(None);
        };
        // server list output has no address map; fetch the detail view.
        let detail = self.cli.show_server(&row.id).await?;
        Ok(Some(ServerInfo {
            addresses: detail.address_map(),
            id: detail.id,
            name: detail.name,
        }))
    }

    async fn create_server(&self, request: &CreateServerRequest) -> s3p_cloud::Result<ServerInfo> {
        let detail = self
            .cli
            .create_server(
                &request.name,
                &request.hypervisor,
                &request.network,
                &request.image_id,
                &request.flavor_id,
                &request.security_group_id,
            )
            .await?;
        Ok(ServerInfo {
            addresses: detail.address_map(),
            id: detail.id,
            name: detail.name,
        })
    }

    async fn delete_server(&self, id: &str) -> s3p_cloud::Result<()> {
        Ok(self.cli.delete_server(id).await?)
    }

    async fn find_security_group(
        &self,
        name: &str,
    ) -> s3p_cloud::Result<Option<SecurityGroupInfo>> {
        let rows = self.cli.list_security_groups().await?;
        Ok(rows
            .into_iter()
            .find(|r| r.name == name)
            .map(|r| SecurityGroupInfo {
                id: r.id,
                name: r.name,
            }))
    }

    async fn create_security_group(&self, name: &str) -> s3p_cloud::Result<SecurityGroupInfo> {
        let row = self.cli.create_security_group(name).await?;
        Ok(SecurityGroupInfo {
            id: row.id,
            name: row.name,
        })
    }

    async fn add_security_group_rule(
        &self,
        group_id: &str,
        rule: &SecurityGroupRule,
    ) -> s3p_cloud::Result<()> {
        let port_range = match (rule.port_min, rule.port_max) {
            (Some(min), Some(max)) => Some((min, max)),
            _ => None,
        };
        Ok(self
            .cli
            .add_security_group_rule(group_id, &rule.protocol, port_range)
            .await?)
    }

    async fn find_image(&self, name: &str) -> s3p_cloud::Result<Option<ImageInfo>> {
        let rows = self.cli.list_images().await?;
        Ok(rows.into_iter().find(|r| r.name == name).map(|r| ImageInfo {
            id: r.id,
            name: r.name,
        }))
    }

    async fn find_flavor(&self, name: &str) -> s3p_cloud::Result<Option<FlavorInfo>> {
        let rows = self.cli.list_flavors().await?;
        Ok(rows
            .into_iter()
            .find(|r| r.name == name)
            .map(|r| FlavorInfo {
                id: r.id,
                name: r.name,
            }))
    }
}
