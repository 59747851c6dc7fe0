use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info};

use offswitch_providers::{DatabaseControl, DatabaseState};

/// Stops and starts managed database instances account-wide. Same shape as
/// the virtual-machine controller; stop/start is parameterless so there is
/// no capacity to recover.
pub struct DatabaseToggle {
    control: Arc<dyn DatabaseControl>,
}

impl DatabaseToggle {
    pub fn new(control: Arc<dyn DatabaseControl>) -> Self {
        Self { control }
    }

    /// Stop every database whose status is exactly `available`. Errors are
    /// logged and propagated.
    pub async fn suspend(&self) -> Result<()> {
        info!("suspending database instances");
        if let Err(e) = self.stop_available().await {
            error!("error suspending database instances: {:#}", e);
            return Err(e);
        }
        Ok(())
    }

    /// Start every database whose status is exactly `stopped`.
    pub async fn resume(&self) -> Result<()> {
        info!("resuming database instances");
        if let Err(e) = self.start_stopped().await {
            error!("error resuming database instances: {:#}", e);
            return Err(e);
        }
        Ok(())
    }

    async fn stop_available(&self) -> Result<()> {
        let databases = self.control.list_databases().await?;
        let available: Vec<_> = databases
            .into_iter()
            .filter(|db| db.status == DatabaseState::Available)
            .collect();
        if available.is_empty() {
            info!("no available database instances found");
            return Ok(());
        }
        for database in available {
            self.control.stop_database(&database.id).await?;
            info!("stopped database instance: {}", database.id);
        }
        Ok(())
    }

    async fn start_stopped(&self) -> Result<()> {
        let databases = self.control.list_databases().await?;
        let stopped: Vec<_> = databases
            .into_iter()
            .filter(|db| db.status == DatabaseState::Stopped)
            .collect();
        if stopped.is_empty() {
            info!("no stopped database instances found");
            return Ok(());
        }
        for database in stopped {
            self.control.start_database(&database.id).await?;
            info!("started database instance: {}", database.id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use offswitch_providers::mock::MockDatabases;

    #[tokio::test]
    async fn suspend_stops_only_available_databases() {
        let control = Arc::new(MockDatabases::new());
        control.add_database("orders", DatabaseState::Available);
        control.add_database("reports", DatabaseState::Stopped);
        control.add_database("warming", DatabaseState::Other("starting".to_string()));
        let toggle = DatabaseToggle::new(control.clone());

        toggle.suspend().await.unwrap();

        assert_eq!(control.stop_calls(), vec!["orders".to_string()]);
        assert!(control.start_calls().is_empty());
    }

    #[tokio::test]
    async fn resume_starts_only_stopped_databases() {
        let control = Arc::new(MockDatabases::new());
        control.add_database("orders", DatabaseState::Available);
        control.add_database("reports", DatabaseState::Stopped);
        let toggle = DatabaseToggle::new(control.clone());

        toggle.resume().await.unwrap();

        assert_eq!(control.start_calls(), vec!["reports".to_string()]);
        assert!(control.stop_calls().is_empty());
    }

    #[tokio::test]
    async fn transitional_database_is_in_neither_eligible_set() {
        let control = Arc::new(MockDatabases::new());
        control.add_database("migrating", DatabaseState::Other("modifying".to_string()));
        let toggle = DatabaseToggle::new(control.clone());

        toggle.suspend().await.unwrap();
        toggle.resume().await.unwrap();

        assert!(control.stop_calls().is_empty());
        assert!(control.start_calls().is_empty());
    }

    #[tokio::test]
    async fn stop_failure_propagates() {
        let control = Arc::new(MockDatabases::new());
        control.add_database("orders", DatabaseState::Available);
        control.fail_on("orders");
        let toggle = DatabaseToggle::new(control.clone());

        assert!(toggle.suspend().await.is_err());
    }
}
