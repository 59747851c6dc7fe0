//! In-memory fakes for the four resource-control ports. Mutating calls are
//! applied to the stored fixtures (so a later invocation observes the result
//! of an earlier one) and recorded for assertions. Failure injection is per
//! cluster or per resource id.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;

use crate::{
    ClusterEndpointControl, ComputeServiceControl, DatabaseControl, DatabaseDescriptor,
    DatabaseState, MachineDescriptor, MachineState, ServiceDescriptor, VirtualMachineControl,
};

// -----------------------------------------------------------------------------
// Compute services
// -----------------------------------------------------------------------------

#[derive(Clone, Debug)]
struct MockService {
    name: String,
    desired_capacity: i32,
    template: String,
}

#[derive(Default)]
struct ComputeState {
    clusters: HashMap<String, Vec<MockService>>,
    templates: HashMap<String, i32>,
    fail_describe: HashSet<String>,
    capacity_calls: Vec<(String, String, i32)>,
}

#[derive(Default)]
pub struct MockComputeServices {
    state: Mutex<ComputeState>,
}

impl MockComputeServices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a cluster with no services in it.
    pub fn add_cluster(&self, cluster: &str) {
        let mut state = self.state.lock().unwrap();
        state.clusters.entry(cluster.to_string()).or_default();
    }

    pub fn add_service(&self, cluster: &str, name: &str, desired_capacity: i32, template: &str) {
        let mut state = self.state.lock().unwrap();
        state
            .clusters
            .entry(cluster.to_string())
            .or_default()
            .push(MockService {
                name: name.to_string(),
                desired_capacity,
                template: template.to_string(),
            });
    }

    pub fn set_template_capacity(&self, template: &str, capacity: i32) {
        let mut state = self.state.lock().unwrap();
        state.templates.insert(template.to_string(), capacity);
    }

    /// Make `describe_service` fail for every service in the given cluster.
    pub fn fail_describe_in(&self, cluster: &str) {
        let mut state = self.state.lock().unwrap();
        state.fail_describe.insert(cluster.to_string());
    }

    /// Every `set_desired_capacity` call so far, as (cluster, service, capacity).
    pub fn capacity_calls(&self) -> Vec<(String, String, i32)> {
        self.state.lock().unwrap().capacity_calls.clone()
    }

    pub fn service_capacity(&self, cluster: &str, name: &str) -> Option<i32> {
        let state = self.state.lock().unwrap();
        state
            .clusters
            .get(cluster)?
            .iter()
            .find(|service| service.name == name)
            .map(|service| service.desired_capacity)
    }
}

#[async_trait]
impl ComputeServiceControl for MockComputeServices {
    async fn list_services(&self, cluster: &str) -> Result<Vec<String>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .clusters
            .get(cluster)
            .map(|services| services.iter().map(|service| service.name.clone()).collect())
            .unwrap_or_default())
    }

    async fn describe_service(&self, cluster: &str, service: &str) -> Result<ServiceDescriptor> {
        let state = self.state.lock().unwrap();
        if state.fail_describe.contains(cluster) {
            bail!("injected describe failure for cluster {}", cluster);
        }
        let found = state
            .clusters
            .get(cluster)
            .and_then(|services| services.iter().find(|s| s.name == service))
            .with_context(|| format!("service {} not found in cluster {}", service, cluster))?;
        Ok(ServiceDescriptor {
            name: found.name.clone(),
            desired_capacity: found.desired_capacity,
            template: found.template.clone(),
        })
    }

    async fn template_capacity(&self, template: &str) -> Result<Option<i32>> {
        let state = self.state.lock().unwrap();
        Ok(state.templates.get(template).copied())
    }

    async fn set_desired_capacity(
        &self,
        cluster: &str,
        service: &str,
        capacity: i32,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state
            .capacity_calls
            .push((cluster.to_string(), service.to_string(), capacity));
        if let Some(found) = state
            .clusters
            .get_mut(cluster)
            .and_then(|services| services.iter_mut().find(|s| s.name == service))
        {
            found.desired_capacity = capacity;
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Virtual machines
// -----------------------------------------------------------------------------

#[derive(Default)]
struct MachineParkState {
    machines: Vec<MachineDescriptor>,
    fail_machines: HashSet<String>,
    stop_calls: Vec<String>,
    start_calls: Vec<String>,
}

#[derive(Default)]
pub struct MockVirtualMachines {
    state: Mutex<MachineParkState>,
}

impl MockVirtualMachines {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_machine(&self, id: &str, machine_state: MachineState) {
        let mut state = self.state.lock().unwrap();
        state.machines.push(MachineDescriptor {
            id: id.to_string(),
            state: machine_state,
        });
    }

    pub fn fail_on(&self, machine_id: &str) {
        let mut state = self.state.lock().unwrap();
        state.fail_machines.insert(machine_id.to_string());
    }

    pub fn stop_calls(&self) -> Vec<String> {
        self.state.lock().unwrap().stop_calls.clone()
    }

    pub fn start_calls(&self) -> Vec<String> {
        self.state.lock().unwrap().start_calls.clone()
    }

    pub fn machine_state(&self, id: &str) -> Option<MachineState> {
        let state = self.state.lock().unwrap();
        state
            .machines
            .iter()
            .find(|machine| machine.id == id)
            .map(|machine| machine.state.clone())
    }
}

#[async_trait]
impl VirtualMachineControl for MockVirtualMachines {
    async fn list_machines(&self) -> Result<Vec<MachineDescriptor>> {
        Ok(self.state.lock().unwrap().machines.clone())
    }

    async fn stop_machine(&self, machine_id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.stop_calls.push(machine_id.to_string());
        if state.fail_machines.contains(machine_id) {
            bail!("injected stop failure for machine {}", machine_id);
        }
        if let Some(machine) = state.machines.iter_mut().find(|m| m.id == machine_id) {
            machine.state = MachineState::Stopped;
        }
        Ok(())
    }

    async fn start_machine(&self, machine_id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.start_calls.push(machine_id.to_string());
        if state.fail_machines.contains(machine_id) {
            bail!("injected start failure for machine {}", machine_id);
        }
        if let Some(machine) = state.machines.iter_mut().find(|m| m.id == machine_id) {
            machine.state = MachineState::Running;
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Databases
// -----------------------------------------------------------------------------

#[derive(Default)]
struct DatabaseParkState {
    databases: Vec<DatabaseDescriptor>,
    fail_databases: HashSet<String>,
    stop_calls: Vec<String>,
    start_calls: Vec<String>,
}

#[derive(Default)]
pub struct MockDatabases {
    state: Mutex<DatabaseParkState>,
}

impl MockDatabases {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_database(&self, id: &str, status: DatabaseState) {
        let mut state = self.state.lock().unwrap();
        state.databases.push(DatabaseDescriptor {
            id: id.to_string(),
            status,
        });
    }

    pub fn fail_on(&self, database_id: &str) {
        let mut state = self.state.lock().unwrap();
        state.fail_databases.insert(database_id.to_string());
    }

    pub fn stop_calls(&self) -> Vec<String> {
        self.state.lock().unwrap().stop_calls.clone()
    }

    pub fn start_calls(&self) -> Vec<String> {
        self.state.lock().unwrap().start_calls.clone()
    }

    pub fn database_status(&self, id: &str) -> Option<DatabaseState> {
        let state = self.state.lock().unwrap();
        state
            .databases
            .iter()
            .find(|db| db.id == id)
            .map(|db| db.status.clone())
    }
}

#[async_trait]
impl DatabaseControl for MockDatabases {
    async fn list_databases(&self) -> Result<Vec<DatabaseDescriptor>> {
        Ok(self.state.lock().unwrap().databases.clone())
    }

    async fn stop_database(&self, database_id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.stop_calls.push(database_id.to_string());
        if state.fail_databases.contains(database_id) {
            bail!("injected stop failure for database {}", database_id);
        }
        if let Some(db) = state.databases.iter_mut().find(|db| db.id == database_id) {
            db.status = DatabaseState::Stopped;
        }
        Ok(())
    }

    async fn start_database(&self, database_id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.start_calls.push(database_id.to_string());
        if state.fail_databases.contains(database_id) {
            bail!("injected start failure for database {}", database_id);
        }
        if let Some(db) = state.databases.iter_mut().find(|db| db.id == database_id) {
            db.status = DatabaseState::Available;
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Cluster endpoints
// -----------------------------------------------------------------------------

#[derive(Default)]
struct EndpointState {
    access: HashMap<String, bool>,
    fail_clusters: HashSet<String>,
    calls: Vec<(String, bool)>,
}

#[derive(Default)]
pub struct MockClusterEndpoints {
    state: Mutex<EndpointState>,
}

impl MockClusterEndpoints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_access(&self, cluster: &str, enabled: bool) {
        let mut state = self.state.lock().unwrap();
        state.access.insert(cluster.to_string(), enabled);
    }

    pub fn fail_on(&self, cluster: &str) {
        let mut state = self.state.lock().unwrap();
        state.fail_clusters.insert(cluster.to_string());
    }

    /// Every attempted mutate call so far, as (cluster, enabled). Failed
    /// attempts are recorded too.
    pub fn calls(&self) -> Vec<(String, bool)> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn public_access(&self, cluster: &str) -> Option<bool> {
        self.state.lock().unwrap().access.get(cluster).copied()
    }
}

#[async_trait]
impl ClusterEndpointControl for MockClusterEndpoints {
    async fn set_public_access(&self, cluster: &str, enabled: bool) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push((cluster.to_string(), enabled));
        if state.fail_clusters.contains(cluster) {
            bail!("injected endpoint failure for cluster {}", cluster);
        }
        state.access.insert(cluster.to_string(), enabled);
        Ok(())
    }
}
