//! openstack CLI wrapper
//!
//! Wraps `openstack` CLI commands with JSON output. Authentication follows
//! the devstack convention: the keystone endpoint is derived from the
//! `SERVICE_HOST` environment variable and credentials are the demo-project
//! defaults.

use crate::error::{OpenStackError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::process::Stdio;
use tokio::process::Command;

/// Keystone credentials passed to every CLI invocation.
#[derive(Debug, Clone)]
pub struct AuthEnv {
    pub auth_url: String,
    pub project_name: String,
    pub username: String,
    pub password: String,
}

impl AuthEnv {
    /// Build credentials from `SERVICE_HOST`.
    pub fn from_env() -> Result<Self> {
        let service_host =
            std::env::var("SERVICE_HOST").map_err(|_| OpenStackError::ServiceHostNotSet)?;
        Ok(Self {
            auth_url: format!("http://{service_host}:5000/v2.0"),
            project_name: "demo".to_string(),
            username: "admin".to_string(),
            password: "secret".to_string(),
        })
    }
}

/// openstack CLI wrapper
pub struct OpenStackCli {
    auth: AuthEnv,
}

impl OpenStackCli {
    pub fn new(auth: AuthEnv) -> Self {
        Self { auth }
    }

    /// Run an openstack command with `-f json` appended and return stdout.
    async fn run_json(&self, args: &[&str]) -> Result<String> {
        let mut full_args: Vec<&str> = args.to_vec();
        full_args.push("-f");
        full_args.push("json");
        self.run(&full_args).await
    }

    /// Run an openstack command and return stdout.
    async fn run(&self, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new("openstack");
        cmd.args(args);
        cmd.env("OS_AUTH_URL", &self.auth.auth_url);
        cmd.env("OS_PROJECT_NAME", &self.auth.project_name);
        cmd.env("OS_TENANT_NAME", &self.auth.project_name);
        cmd.env("OS_USERNAME", &self.auth.username);
        cmd.env("OS_PASSWORD", &self.auth.password);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!("Running: openstack {}", args.join(" "));

        let output = cmd.output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                OpenStackError::CliNotFound
            } else {
                OpenStackError::Io(e)
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OpenStackError::CommandFailed(stderr.trim().to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// List all hypervisor hostnames.
    pub async fn list_hypervisors(&self) -> Result<Vec<String>> {
        let output = self.run_json(&["hypervisor", "list"]).await?;
        let rows: Vec<HypervisorRow> = parse_rows(&output)?;
        Ok(rows.into_iter().map(|r| r.hostname).collect())
    }

    /// List all networks.
    pub async fn list_networks(&self) -> Result<Vec<ResourceRow>> {
        let output = self.run_json(&["network", "list"]).await?;
        parse_rows(&output)
    }

    /// Create a network.
    pub async fn create_network(&self, name: &str) -> Result<ResourceRow> {
        let output = self.run_json(&["network", "create", name]).await?;
        let row: ResourceRow = serde_json::from_str(&output)?;
        Ok(row)
    }

    /// Delete a network by ID.
    pub async fn delete_network(&self, id: &str) -> Result<()> {
        self.run(&["network", "delete", id]).await?;
        Ok(())
    }

    /// List subnets, optionally filtered to one parent network.
    pub async fn list_subnets(&self, network_id: Option<&str>) -> Result<Vec<SubnetRow>> {
        let output = match network_id {
            Some(id) => {
                self.run_json(&["subnet", "list", "--network", id, "--long"])
                    .await?
            }
            None => self.run_json(&["subnet", "list", "--long"]).await?,
        };
        parse_rows(&output)
    }

    /// Create a subnet under a network.
    pub async fn create_subnet(
        &self,
        name: &str,
        network_id: &str,
        cidr: &str,
        gateway_ip: &str,
    ) -> Result<SubnetRow> {
        let output = self
            .run_json(&[
                "subnet",
                "create",
                "--network",
                network_id,
                "--subnet-range",
                cidr,
                "--gateway",
                gateway_ip,
                name,
            ])
            .await?;
        let row: SubnetRow = serde_json::from_str(&output)?;
        Ok(row)
    }

    /// Delete a subnet by ID.
    pub async fn delete_subnet(&self, id: &str) -> Result<()> {
        self.run(&["subnet", "delete", id]).await?;
        Ok(())
    }

    /// List all servers.
    pub async fn list_servers(&self) -> Result<Vec<ResourceRow>> {
        let output = self.run_json(&["server", "list"]).await?;
        parse_rows(&output)
    }

    /// Show one server with its address map.
    pub async fn show_server(&self, name_or_id: &str) -> Result<ServerDetail> {
        let output = self.run_json(&["server", "show", name_or_id]).await?;
        let detail: ServerDetail = serde_json::from_str(&output)?;
        Ok(detail)
    }

    /// Create a server scheduled onto a specific hypervisor.
    pub async fn create_server(
        &self,
        name: &str,
        hypervisor: &str,
        network: &str,
        image_id: &str,
        flavor_id: &str,
        security_group_id: &str,
    ) -> Result<ServerDetail> {
        let zone = format!("nova:{hypervisor}");
        let output = self
            .run_json(&[
                "server",
                "create",
                "--image",
                image_id,
                "--flavor",
                flavor_id,
                "--security-group",
                security_group_id,
                "--network",
                network,
                "--availability-zone",
                &zone,
                name,
            ])
            .await?;
        let detail: ServerDetail = serde_json::from_str(&output)?;
        Ok(detail)
    }

    /// Delete a server by ID.
    pub async fn delete_server(&self, id: &str) -> Result<()> {
        self.run(&["server", "delete", id]).await?;
        Ok(())
    }

    /// List all security groups.
    pub async fn list_security_groups(&self) -> Result<Vec<ResourceRow>> {
        let output = self.run_json(&["security", "group", "list"]).await?;
        parse_rows(&output)
    }

    /// Create a security group.
    pub async fn create_security_group(&self, name: &str) -> Result<ResourceRow> {
        let output = self.run_json(&["security", "group", "create", name]).await?;
        let row: ResourceRow = serde_json::from_str(&output)?;
        Ok(row)
    }

    /// Add an ingress rule to a security group.
    pub async fn add_security_group_rule(
        &self,
        group_id: &str,
        protocol: &str,
        port_range: Option<(u16, u16)>,
    ) -> Result<()> {
        let range;
        let mut args = vec!["security", "group", "rule", "create", "--proto", protocol];
        if let Some((min, max)) = port_range {
            range = format!("{min}:{max}");
            args.push("--dst-port");
            args.push(&range);
        }
        args.push(group_id);
        self.run_json(&args).await?;
        Ok(())
    }

    /// List all images.
    pub async fn list_images(&self) -> Result<Vec<ResourceRow>> {
        let output = self.run_json(&["image", "list"]).await?;
        parse_rows(&output)
    }

    /// List all flavors.
    pub async fn list_flavors(&self) -> Result<Vec<ResourceRow>> {
        let output = self.run_json(&["flavor", "list"]).await?;
        parse_rows(&output)
    }
}

fn parse_rows<T: serde::de::DeserializeOwned>(output: &str) -> Result<Vec<T>> {
    let trimmed = output.trim();
    if trimmed.is_empty() || trimmed == "[]" {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(trimmed)?)
}

/// Generic name/ID row shared by list and create output.
///
/// `openstack <resource> list` emits capitalized keys while
/// `openstack <resource> create` emits lowercase ones; aliases cover both.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceRow {
    #[serde(alias = "ID")]
    pub id: String,
    #[serde(alias = "Name")]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HypervisorRow {
    #[serde(rename = "Hypervisor Hostname")]
    pub hostname: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubnetRow {
    #[serde(alias = "ID")]
    pub id: String,
    #[serde(alias = "Name")]
    pub name: String,
    #[serde(alias = "Network")]
    pub network_id: String,
    #[serde(alias = "Subnet", alias = "cidr")]
    pub subnet: String,
    #[serde(default, alias = "Gateway")]
    pub gateway_ip: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerDetail {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub addresses: serde_json::Value,
}

impl ServerDetail {
    /// Address map keyed by network name.
    pub fn address_map(&self) -> HashMap<String, Vec<String>> {
        parse_addresses(&self.addresses)
    }
}

/// Parse the `addresses` field of `server show`.
///
/// Newer CLI versions emit `{"net": ["10.0.5.3"]}`; older ones emit the
/// flattened string `"net=10.0.5.3, 10.0.5.4"`.
fn parse_addresses(value: &serde_json::Value) -> HashMap<String, Vec<String>> {
    let mut map = HashMap::new();
    match value {
        serde_json::Value::Object(networks) => {
            for (network, addrs) in networks {
                let list = match addrs {
                    serde_json::Value::Array(items) => items
                        .iter()
                        .filter_map(|a| a.as_str().map(str::to_string))
                        .collect(),
                    serde_json::Value::String(s) => vec![s.clone()],
                    _ => Vec::new(),
                };
                map.insert(network.clone(), list);
            }
        }
        serde_json::Value::String(flat) => {
            for part in flat.split(';') {
                if let Some((network, addrs)) = part.split_once('=') {
                    map.insert(
                        network.trim().to_string(),
                        addrs.split(',').map(|a| a.trim().to_string()).collect(),
                    );
                }
            }
        }
        _ => {}
    }
    map
}
