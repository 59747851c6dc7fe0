//! AWS implementations of the four resource-control ports. Each adapter owns
//! one SDK client built from the shared [`SdkConfig`] handed in by the entry
//! point; region and credentials come from that config's provider chain.

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_ecs::types::TaskDefinitionField;
use aws_sdk_eks::types::VpcConfigRequest;

use crate::{
    ClusterEndpointControl, ComputeServiceControl, DatabaseControl, DatabaseDescriptor,
    DatabaseState, MachineDescriptor, MachineState, ServiceDescriptor, VirtualMachineControl,
};

/// Task-definition tag holding the capacity to restore on resume. ECS task
/// definitions carry no desired-count field of their own, so the intended
/// capacity is recorded as a resource tag instead.
pub const CAPACITY_TAG: &str = "offswitch:desired-capacity";

// -----------------------------------------------------------------------------
// ECS
// -----------------------------------------------------------------------------

pub struct AwsComputeServices {
    client: aws_sdk_ecs::Client,
}

impl AwsComputeServices {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_ecs::Client::new(config),
        }
    }
}

#[async_trait]
impl ComputeServiceControl for AwsComputeServices {
    async fn list_services(&self, cluster: &str) -> Result<Vec<String>> {
        let output = self
            .client
            .list_services()
            .cluster(cluster)
            .send()
            .await
            .with_context(|| format!("listing services in cluster {}", cluster))?;
        Ok(output.service_arns().to_vec())
    }

    async fn describe_service(&self, cluster: &str, service: &str) -> Result<ServiceDescriptor> {
        let output = self
            .client
            .describe_services()
            .cluster(cluster)
            .services(service)
            .send()
            .await
            .with_context(|| format!("describing service {} in cluster {}", service, cluster))?;
        let found = output
            .services()
            .first()
            .with_context(|| format!("service {} not found in cluster {}", service, cluster))?;
        Ok(ServiceDescriptor {
            name: found.service_name().unwrap_or(service).to_string(),
            desired_capacity: found.desired_count(),
            template: found.task_definition().unwrap_or_default().to_string(),
        })
    }

    async fn template_capacity(&self, template: &str) -> Result<Option<i32>> {
        let output = self
            .client
            .describe_task_definition()
            .task_definition(template)
            .include(TaskDefinitionField::Tags)
            .send()
            .await
            .with_context(|| format!("describing task definition {}", template))?;
        let capacity = output
            .tags()
            .iter()
            .find(|tag| tag.key() == Some(CAPACITY_TAG))
            .and_then(|tag| tag.value())
            .and_then(|value| value.parse::<i32>().ok());
        Ok(capacity)
    }

    async fn set_desired_capacity(
        &self,
        cluster: &str,
        service: &str,
        capacity: i32,
    ) -> Result<()> {
        self.client
            .update_service()
            .cluster(cluster)
            .service(service)
            .desired_count(capacity)
            .send()
            .await
            .with_context(|| {
                format!(
                    "setting desired capacity of service {} in cluster {} to {}",
                    service, cluster, capacity
                )
            })?;
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// EC2
// -----------------------------------------------------------------------------

pub struct AwsVirtualMachines {
    client: aws_sdk_ec2::Client,
}

impl AwsVirtualMachines {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_ec2::Client::new(config),
        }
    }
}

#[async_trait]
impl VirtualMachineControl for AwsVirtualMachines {
    async fn list_machines(&self) -> Result<Vec<MachineDescriptor>> {
        let output = self
            .client
            .describe_instances()
            .send()
            .await
            .context("listing virtual machines")?;
        let mut machines = Vec::new();
        for reservation in output.reservations() {
            for instance in reservation.instances() {
                let Some(id) = instance.instance_id() else {
                    continue;
                };
                let state = instance
                    .state()
                    .and_then(|state| state.name())
                    .map(|name| MachineState::parse(name.as_str()))
                    .unwrap_or_else(|| MachineState::Other("unknown".to_string()));
                machines.push(MachineDescriptor {
                    id: id.to_string(),
                    state,
                });
            }
        }
        Ok(machines)
    }

    async fn stop_machine(&self, machine_id: &str) -> Result<()> {
        self.client
            .stop_instances()
            .instance_ids(machine_id)
            .send()
            .await
            .with_context(|| format!("stopping virtual machine {}", machine_id))?;
        Ok(())
    }

    async fn start_machine(&self, machine_id: &str) -> Result<()> {
        self.client
            .start_instances()
            .instance_ids(machine_id)
            .send()
            .await
            .with_context(|| format!("starting virtual machine {}", machine_id))?;
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// RDS
// -----------------------------------------------------------------------------

pub struct AwsDatabases {
    client: aws_sdk_rds::Client,
}

impl AwsDatabases {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_rds::Client::new(config),
        }
    }
}

#[async_trait]
impl DatabaseControl for AwsDatabases {
    async fn list_databases(&self) -> Result<Vec<DatabaseDescriptor>> {
        let output = self
            .client
            .describe_db_instances()
            .send()
            .await
            .context("listing database instances")?;
        let databases = output
            .db_instances()
            .iter()
            .filter_map(|db| {
                let id = db.db_instance_identifier()?;
                let status = db
                    .db_instance_status()
                    .map(DatabaseState::parse)
                    .unwrap_or_else(|| DatabaseState::Other("unknown".to_string()));
                Some(DatabaseDescriptor {
                    id: id.to_string(),
                    status,
                })
            })
            .collect();
        Ok(databases)
    }

    async fn stop_database(&self, database_id: &str) -> Result<()> {
        self.client
            .stop_db_instance()
            .db_instance_identifier(database_id)
            .send()
            .await
            .with_context(|| format!("stopping database instance {}", database_id))?;
        Ok(())
    }

    async fn start_database(&self, database_id: &str) -> Result<()> {
        self.client
            .start_db_instance()
            .db_instance_identifier(database_id)
            .send()
            .await
            .with_context(|| format!("starting database instance {}", database_id))?;
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// EKS
// -----------------------------------------------------------------------------

pub struct AwsClusterEndpoints {
    client: aws_sdk_eks::Client,
}

impl AwsClusterEndpoints {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_eks::Client::new(config),
        }
    }
}

#[async_trait]
impl ClusterEndpointControl for AwsClusterEndpoints {
    async fn set_public_access(&self, cluster: &str, enabled: bool) -> Result<()> {
        let vpc_config = VpcConfigRequest::builder()
            .endpoint_public_access(enabled)
            .build();
        self.client
            .update_cluster_config()
            .name(cluster)
            .resources_vpc_config(vpc_config)
            .send()
            .await
            .with_context(|| format!("updating endpoint access for cluster {}", cluster))?;
        Ok(())
    }
}
