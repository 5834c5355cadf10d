//! Fleet security group
//!
//! Finds or creates the fleet security group and, on first creation, adds
//! ingress rules for SSH and ICMP so freshly booted tenants accept the
//! readiness probe.

use crate::error::Result;
use s3p_cloud::{CloudPlatform, SecurityGroupInfo, SecurityGroupRule};
use tracing::info;

/// Find-or-create the named security group with SSH and ICMP ingress.
pub async fn ensure_security_group(
    platform: &dyn CloudPlatform,
    name: &str,
) -> Result<SecurityGroupInfo> {
    if let Some(existing) = platform.find_security_group(name).await? {
        info!("Using existing security group '{name}'");
        return Ok(existing);
    }

    info!("Creating security group {name}");
    let group = platform.create_security_group(name).await?;
    platform
        .add_security_group_rule(&group.id, &SecurityGroupRule::ssh())
        .await?;
    platform
        .add_security_group_rule(&group.id, &SecurityGroupRule::icmp())
        .await?;
    Ok(group)
}
