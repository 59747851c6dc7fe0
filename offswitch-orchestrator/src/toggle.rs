use anyhow::Result;
use tracing::info;

use offswitch_common::{ResourceScope, ToggleDirection};

use crate::cluster_endpoints::ClusterEndpointToggle;
use crate::compute_services::ComputeServiceToggle;
use crate::databases::DatabaseToggle;
use crate::virtual_machines::VirtualMachineToggle;

/// Sequences the four resource controllers for one direction, in a fixed
/// order: compute services, virtual machines, databases, cluster endpoints.
///
/// The orchestrator adds no recovery of its own: a failure propagated by a
/// controller aborts the remaining sequence for this invocation. The
/// endpoint controller never propagates, so it cannot be the aborting one.
pub struct ResourceToggler {
    compute: ComputeServiceToggle,
    machines: VirtualMachineToggle,
    databases: DatabaseToggle,
    endpoints: ClusterEndpointToggle,
}

impl ResourceToggler {
    pub fn new(
        compute: ComputeServiceToggle,
        machines: VirtualMachineToggle,
        databases: DatabaseToggle,
        endpoints: ClusterEndpointToggle,
    ) -> Self {
        Self {
            compute,
            machines,
            databases,
            endpoints,
        }
    }

    pub async fn run(&self, direction: ToggleDirection, scope: &ResourceScope) -> Result<()> {
        match direction {
            ToggleDirection::Shutdown => self.shutdown(scope).await,
            ToggleDirection::TurnOn => self.turn_on(scope).await,
        }
    }

    /// Suspend all four resource classes.
    pub async fn shutdown(&self, scope: &ResourceScope) -> Result<()> {
        info!("shutting down resources in {} cluster(s)", scope.len());
        self.compute.suspend(scope).await?;
        self.machines.suspend().await?;
        self.databases.suspend().await?;
        self.endpoints.suspend(scope).await?;
        Ok(())
    }

    /// Resume all four resource classes, same relative order.
    pub async fn turn_on(&self, scope: &ResourceScope) -> Result<()> {
        info!("turning on resources in {} cluster(s)", scope.len());
        self.compute.resume(scope).await?;
        self.machines.resume().await?;
        self.databases.resume().await?;
        self.endpoints.resume(scope).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use offswitch_providers::mock::{
        MockClusterEndpoints, MockComputeServices, MockDatabases, MockVirtualMachines,
    };
    use offswitch_providers::{DatabaseState, MachineState};

    struct Fixture {
        compute: Arc<MockComputeServices>,
        machines: Arc<MockVirtualMachines>,
        databases: Arc<MockDatabases>,
        endpoints: Arc<MockClusterEndpoints>,
        toggler: ResourceToggler,
    }

    fn fixture() -> Fixture {
        let compute = Arc::new(MockComputeServices::new());
        let machines = Arc::new(MockVirtualMachines::new());
        let databases = Arc::new(MockDatabases::new());
        let endpoints = Arc::new(MockClusterEndpoints::new());
        let toggler = ResourceToggler::new(
            ComputeServiceToggle::new(compute.clone()),
            VirtualMachineToggle::new(machines.clone()),
            DatabaseToggle::new(databases.clone()),
            ClusterEndpointToggle::new(endpoints.clone()),
        );
        Fixture {
            compute,
            machines,
            databases,
            endpoints,
            toggler,
        }
    }

    fn scope(clusters: &[&str]) -> ResourceScope {
        ResourceScope::new(clusters.iter().copied()).unwrap()
    }

    #[tokio::test]
    async fn shutdown_touches_all_four_resource_classes() {
        let f = fixture();
        f.compute.add_service("prod", "api", 2, "api-template:7");
        f.machines.add_machine("i-1", MachineState::Running);
        f.databases.add_database("orders", DatabaseState::Available);
        f.endpoints.set_access("prod", true);

        f.toggler.shutdown(&scope(&["prod"])).await.unwrap();

        assert_eq!(f.compute.service_capacity("prod", "api"), Some(0));
        assert_eq!(f.machines.machine_state("i-1"), Some(MachineState::Stopped));
        assert_eq!(f.databases.database_status("orders"), Some(DatabaseState::Stopped));
        assert_eq!(f.endpoints.public_access("prod"), Some(false));
    }

    #[tokio::test]
    async fn compute_failure_aborts_the_remaining_sequence() {
        let f = fixture();
        f.compute.add_service("prod", "api", 2, "api-template:7");
        f.compute.fail_describe_in("prod");
        f.machines.add_machine("i-1", MachineState::Running);
        f.databases.add_database("orders", DatabaseState::Available);
        f.endpoints.set_access("prod", true);

        let result = f.toggler.shutdown(&scope(&["prod"])).await;

        assert!(result.is_err());
        assert!(f.machines.stop_calls().is_empty());
        assert!(f.databases.stop_calls().is_empty());
        assert!(f.endpoints.calls().is_empty());
    }

    #[tokio::test]
    async fn machine_failure_still_runs_after_compute() {
        let f = fixture();
        f.compute.add_service("prod", "api", 2, "api-template:7");
        f.machines.add_machine("i-bad", MachineState::Running);
        f.machines.fail_on("i-bad");
        f.databases.add_database("orders", DatabaseState::Available);

        let result = f.toggler.shutdown(&scope(&["prod"])).await;

        assert!(result.is_err());
        // Compute ran before the failing controller, databases never did.
        assert_eq!(f.compute.service_capacity("prod", "api"), Some(0));
        assert!(f.databases.stop_calls().is_empty());
    }

    #[tokio::test]
    async fn endpoint_failure_never_fails_the_invocation() {
        let f = fixture();
        f.endpoints.set_access("prod", true);
        f.endpoints.fail_on("prod");

        f.toggler.shutdown(&scope(&["prod"])).await.unwrap();
    }
}
