use anyhow::Result;
use async_trait::async_trait;

// -----------------------------------------------------------------------------
// Descriptors
// -----------------------------------------------------------------------------

/// A container service as seen at the start of an invocation. Always read
/// fresh from the backing service, never cached across runs.
#[derive(Clone, Debug)]
pub struct ServiceDescriptor {
    /// Short service name (list calls may report full ARNs).
    pub name: String,
    /// Current desired capacity, non-negative.
    pub desired_capacity: i32,
    /// Reference to the defining template the original capacity can be
    /// recovered from.
    pub template: String,
}

/// Virtual-machine status. Only the exact `Running`/`Stopped` states are
/// eligible for toggling; transitional states match neither filter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MachineState {
    Running,
    Stopped,
    Other(String),
}

impl MachineState {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "running" => MachineState::Running,
            "stopped" => MachineState::Stopped,
            other => MachineState::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for MachineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MachineState::Running => f.write_str("running"),
            MachineState::Stopped => f.write_str("stopped"),
            MachineState::Other(raw) => f.write_str(raw),
        }
    }
}

#[derive(Clone, Debug)]
pub struct MachineDescriptor {
    pub id: String,
    pub state: MachineState,
}

/// Managed-database status, same shape as [`MachineState`] but with the
/// backing service's `available` vocabulary for the running state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DatabaseState {
    Available,
    Stopped,
    Other(String),
}

impl DatabaseState {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "available" => DatabaseState::Available,
            "stopped" => DatabaseState::Stopped,
            other => DatabaseState::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for DatabaseState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseState::Available => f.write_str("available"),
            DatabaseState::Stopped => f.write_str("stopped"),
            DatabaseState::Other(raw) => f.write_str(raw),
        }
    }
}

#[derive(Clone, Debug)]
pub struct DatabaseDescriptor {
    pub id: String,
    pub status: DatabaseState,
}

// -----------------------------------------------------------------------------
// Resource-control ports
// -----------------------------------------------------------------------------

/// Control port for cluster-scoped container services.
#[async_trait]
pub trait ComputeServiceControl: Send + Sync {
    async fn list_services(&self, cluster: &str) -> Result<Vec<String>>;
    async fn describe_service(&self, cluster: &str, service: &str) -> Result<ServiceDescriptor>;

    /// Desired capacity declared on the service's defining template, if any.
    async fn template_capacity(&self, template: &str) -> Result<Option<i32>>;

    async fn set_desired_capacity(
        &self,
        cluster: &str,
        service: &str,
        capacity: i32,
    ) -> Result<()>;
}

/// Control port for virtual machines. Account-wide, not cluster-scoped.
#[async_trait]
pub trait VirtualMachineControl: Send + Sync {
    async fn list_machines(&self) -> Result<Vec<MachineDescriptor>>;
    async fn stop_machine(&self, machine_id: &str) -> Result<()>;
    async fn start_machine(&self, machine_id: &str) -> Result<()>;
}

/// Control port for managed database instances. Account-wide, parameterless
/// stop/start.
#[async_trait]
pub trait DatabaseControl: Send + Sync {
    async fn list_databases(&self) -> Result<Vec<DatabaseDescriptor>>;
    async fn stop_database(&self, database_id: &str) -> Result<()>;
    async fn start_database(&self, database_id: &str) -> Result<()>;
}

/// Control port for managed-cluster public endpoints. The only dimension is
/// reachability, so the single mutate call carries the target flag.
#[async_trait]
pub trait ClusterEndpointControl: Send + Sync {
    async fn set_public_access(&self, cluster: &str, enabled: bool) -> Result<()>;
}

#[cfg(feature = "aws")]
pub mod aws;

#[cfg(any(test, feature = "mock"))]
pub mod mock;
