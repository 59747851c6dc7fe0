use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info};

use offswitch_providers::{MachineState, VirtualMachineControl};

/// Stops and starts virtual machines account-wide. Unlike the cluster-scoped
/// controllers this one takes no scope: machines are not grouped by the
/// cluster concept the other resource classes share.
pub struct VirtualMachineToggle {
    control: Arc<dyn VirtualMachineControl>,
}

impl VirtualMachineToggle {
    pub fn new(control: Arc<dyn VirtualMachineControl>) -> Self {
        Self { control }
    }

    /// Stop every machine whose state is exactly `running`. Errors are
    /// logged and propagated.
    pub async fn suspend(&self) -> Result<()> {
        info!("suspending virtual machines");
        if let Err(e) = self.stop_running().await {
            error!("error suspending virtual machines: {:#}", e);
            return Err(e);
        }
        Ok(())
    }

    /// Start every machine whose state is exactly `stopped`.
    pub async fn resume(&self) -> Result<()> {
        info!("resuming virtual machines");
        if let Err(e) = self.start_stopped().await {
            error!("error resuming virtual machines: {:#}", e);
            return Err(e);
        }
        Ok(())
    }

    async fn stop_running(&self) -> Result<()> {
        let machines = self.control.list_machines().await?;
        let running: Vec<_> = machines
            .into_iter()
            .filter(|machine| machine.state == MachineState::Running)
            .collect();
        if running.is_empty() {
            info!("no running virtual machines found");
            return Ok(());
        }
        for machine in running {
            self.control.stop_machine(&machine.id).await?;
            info!("stopped virtual machine: {}", machine.id);
        }
        Ok(())
    }

    async fn start_stopped(&self) -> Result<()> {
        let machines = self.control.list_machines().await?;
        let stopped: Vec<_> = machines
            .into_iter()
            .filter(|machine| machine.state == MachineState::Stopped)
            .collect();
        if stopped.is_empty() {
            info!("no stopped virtual machines found");
            return Ok(());
        }
        for machine in stopped {
            self.control.start_machine(&machine.id).await?;
            info!("started virtual machine: {}", machine.id);
        }
        Ok(())
    }
}
