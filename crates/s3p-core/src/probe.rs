//! Readiness probing
//!
//! Pings a freshly created (or pre-existing) tenant instance from inside its
//! network's DHCP namespace until it responds, with a bounded attempt budget
//! and timing telemetry.

use crate::config::ProbeConfig;
use crate::error::{ProvisionError, Result};
use async_trait::async_trait;
use s3p_cloud::{NetworkInfo, ServerInfo};
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, info};

/// A single reachability probe.
///
/// `namespace` is the network namespace the probe must run in; `address` is
/// the instance address to ping. Returns whether the address responded.
/// Errors (probe could not be executed at all) are tolerated by the wait
/// loop and counted as not-ready.
#[async_trait]
pub trait Pinger: Send + Sync {
    async fn ping(&self, namespace: &str, address: &str) -> std::io::Result<bool>;
}

/// Pings through `ip netns exec`, matching the service-host layout where
/// each tenant network's DHCP namespace is named `qdhcp-<network_id>`.
pub struct NetnsPinger;

#[async_trait]
impl Pinger for NetnsPinger {
    async fn ping(&self, namespace: &str, address: &str) -> std::io::Result<bool> {
        let status = tokio::process::Command::new("ip")
            .args(["netns", "exec", namespace, "ping", "-c", "1", "-W", "1", address])
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
            .await?;
        Ok(status.success())
    }
}

/// Polls an instance until it answers a ping on its tenant network.
pub struct ReadinessProber<'a> {
    pinger: &'a dyn Pinger,
    config: ProbeConfig,
}

impl<'a> ReadinessProber<'a> {
    pub fn new(pinger: &'a dyn Pinger, config: ProbeConfig) -> Self {
        Self { pinger, config }
    }

    /// Wait until `server` responds to ping on `network`.
    ///
    /// Returns the elapsed wall-clock time on first success, or
    /// `ReachabilityTimeout` once the attempt budget is exhausted.
    pub async fn wait_until_reachable(
        &self,
        server: &ServerInfo,
        network: &NetworkInfo,
    ) -> Result<Duration> {
        let address =
            server
                .address_on(&network.name)
                .ok_or_else(|| ProvisionError::AddressUnresolved {
                    server: server.name.clone(),
                    network: network.name.clone(),
                })?;
        info!(
            "Server '{}' obtained IPv4 address: {address}",
            server.name
        );
        info!(
            "Waiting for instance {} to respond to ping on network {}...",
            server.name, network.name
        );

        let namespace = format!("qdhcp-{}", network.id);
        let started = Instant::now();

        for attempt in 0..self.config.max_attempts {
            match self.pinger.ping(&namespace, address).await {
                Ok(true) => {
                    let elapsed = started.elapsed();
                    info!(
                        "SmokeTest: {:.2} seconds for tenant '{}' to respond to ping",
                        elapsed.as_secs_f64(),
                        server.name
                    );
                    return Ok(elapsed);
                }
                Ok(false) => {}
                Err(e) => {
                    debug!("probe attempt {attempt} could not execute: {e}");
                }
            }
            if attempt + 1 < self.config.max_attempts {
                sleep(self.config.interval).await;
            }
        }

        Err(ProvisionError::ReachabilityTimeout {
            server: server.name.clone(),
            attempts: self.config.max_attempts,
        })
    }
}
