mod logfmt;

use anyhow::Result;
use clap::Parser;
use s3p_cloud_openstack::OpenStackPlatform;
use s3p_core::{NetnsPinger, ReconcilerConfig, cleanup_fleet, provision_fleet};
use tracing::{error, info};

/// S3P scale-test fleet provisioner for OpenStack
#[derive(Parser)]
#[command(
    name = "s3p",
    version,
    about = "Provision and tear down the S3P scale-test fleet"
)]
struct Cli {
    /// Cleanup cluster by deleting all fleet instances and networks
    #[arg(short, long)]
    cleanup: bool,

    /// Enable debug mode which increases output
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logfmt::init(cli.debug);

    if let Err(e) = run(&cli).await {
        error!("{e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<()> {
    info!("Obtaining OpenStack credentials");
    let platform = OpenStackPlatform::from_env()?;
    let config = ReconcilerConfig::default();

    if cli.cleanup {
        cleanup_fleet(&platform, &config).await?;
    } else {
        provision_fleet(&platform, &NetnsPinger, &config).await?;
    }

    info!("Done");
    Ok(())
}
