use std::sync::Arc;

use anyhow::Result;
use clap::{ArgGroup, Parser};
use tracing::info;

use offswitch_common::{ResourceScope, ToggleDirection};
use offswitch_orchestrator::cluster_endpoints::ClusterEndpointToggle;
use offswitch_orchestrator::compute_services::ComputeServiceToggle;
use offswitch_orchestrator::databases::DatabaseToggle;
use offswitch_orchestrator::virtual_machines::VirtualMachineToggle;
use offswitch_orchestrator::ResourceToggler;
use offswitch_providers::aws::{
    AwsClusterEndpoints, AwsComputeServices, AwsDatabases, AwsVirtualMachines,
};

/// Toggle a fleet of cloud resources between running and suspended.
///
/// Exactly one direction flag is required; running with neither is a usage
/// error with a non-zero exit.
#[derive(Debug, Parser)]
#[command(name = "offswitch", version, about)]
#[command(group(ArgGroup::new("direction").required(true).args(["shutdown", "turn_on"])))]
struct Cli {
    /// Suspend every resource class in scope.
    #[arg(long)]
    shutdown: bool,

    /// Resume every resource class in scope.
    #[arg(long)]
    turn_on: bool,

    /// Comma-separated cluster/fleet names, used by the compute-service and
    /// cluster-endpoint controllers.
    #[arg(long, env = "CLUSTER_NAMES", value_delimiter = ',', required = true)]
    clusters: Vec<String>,

    /// Region override; defaults to the ambient credential chain's region.
    #[arg(long, env = "AWS_REGION")]
    region: Option<String>,
}

impl Cli {
    fn direction(&self) -> ToggleDirection {
        if self.shutdown {
            ToggleDirection::Shutdown
        } else {
            ToggleDirection::TurnOn
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let scope = ResourceScope::new(cli.clusters.clone())?;
    let direction = cli.direction();

    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
    if let Some(region) = cli.region.clone() {
        loader = loader.region(aws_config::Region::new(region));
    }
    let config = loader.load().await;

    let toggler = ResourceToggler::new(
        ComputeServiceToggle::new(Arc::new(AwsComputeServices::new(&config))),
        VirtualMachineToggle::new(Arc::new(AwsVirtualMachines::new(&config))),
        DatabaseToggle::new(Arc::new(AwsDatabases::new(&config))),
        ClusterEndpointToggle::new(Arc::new(AwsClusterEndpoints::new(&config))),
    );

    info!("starting {} for {} cluster(s)", direction, scope.len());
    toggler.run(direction, &scope).await?;
    info!("{} completed", direction);
    Ok(())
}
