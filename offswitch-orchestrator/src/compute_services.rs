use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info};

use offswitch_common::ResourceScope;
use offswitch_providers::ComputeServiceControl;

/// Capacity applied on resume when the template declares none, or a value
/// that would leave the service at zero.
const FALLBACK_CAPACITY: i32 = 1;

/// Toggles container services by driving desired capacity between zero and
/// the capacity recorded on each service's defining template. Desired
/// capacity is the only portable on/off signal for a service abstraction
/// with no native pause primitive.
pub struct ComputeServiceToggle {
    control: Arc<dyn ComputeServiceControl>,
}

impl ComputeServiceToggle {
    pub fn new(control: Arc<dyn ComputeServiceControl>) -> Self {
        Self { control }
    }

    /// Set every service in scope to zero capacity. A failure inside one
    /// cluster is logged and propagated; remaining clusters are not
    /// attempted.
    pub async fn suspend(&self, scope: &ResourceScope) -> Result<()> {
        for cluster in scope.clusters() {
            if let Err(e) = self.suspend_cluster(cluster).await {
                error!("error suspending services in cluster {}: {:#}", cluster, e);
                return Err(e);
            }
        }
        Ok(())
    }

    /// Restore every suspended service in scope to its template capacity.
    /// Same failure policy as [`suspend`](Self::suspend).
    pub async fn resume(&self, scope: &ResourceScope) -> Result<()> {
        for cluster in scope.clusters() {
            if let Err(e) = self.resume_cluster(cluster).await {
                error!("error resuming services in cluster {}: {:#}", cluster, e);
                return Err(e);
            }
        }
        Ok(())
    }

    async fn suspend_cluster(&self, cluster: &str) -> Result<()> {
        info!("checking compute cluster: {}", cluster);
        let services = self.control.list_services(cluster).await?;
        if services.is_empty() {
            info!("no services found for cluster: {}", cluster);
            return Ok(());
        }
        for service in &services {
            let service = short_name(service);
            let descriptor = self.control.describe_service(cluster, service).await?;
            if descriptor.desired_capacity > 0 {
                self.control.set_desired_capacity(cluster, service, 0).await?;
                info!("suspended service: {}", descriptor.name);
            } else {
                info!("service {} is already suspended", descriptor.name);
            }
        }
        Ok(())
    }

    async fn resume_cluster(&self, cluster: &str) -> Result<()> {
        info!("checking compute cluster: {}", cluster);
        let services = self.control.list_services(cluster).await?;
        if services.is_empty() {
            info!("no services found for cluster: {}", cluster);
            return Ok(());
        }
        for service in &services {
            let service = short_name(service);
            let descriptor = self.control.describe_service(cluster, service).await?;
            if descriptor.desired_capacity == 0 {
                // The live service no longer remembers its pre-suspend
                // capacity once set to zero, so recover the operator intent
                // from the template and never resume to zero.
                let capacity = self
                    .control
                    .template_capacity(&descriptor.template)
                    .await?
                    .filter(|capacity| *capacity > 0)
                    .unwrap_or(FALLBACK_CAPACITY);
                self.control
                    .set_desired_capacity(cluster, service, capacity)
                    .await?;
                info!("resumed service {} with capacity {}", descriptor.name, capacity);
            } else {
                info!(
                    "service {} is already running with capacity {}",
                    descriptor.name, descriptor.desired_capacity
                );
            }
        }
        Ok(())
    }
}

/// List calls may report full ARNs; address and log services by short name.
fn short_name(service: &str) -> &str {
    service.rsplit('/').next().unwrap_or(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use offswitch_providers::mock::MockComputeServices;

    fn scope(clusters: &[&str]) -> ResourceScope {
        ResourceScope::new(clusters.iter().copied()).unwrap()
    }

    #[tokio::test]
    async fn suspend_zeroes_active_services_only() {
        let control = Arc::new(MockComputeServices::new());
        control.add_service("prod", "api", 2, "api-template:7");
        control.add_service("prod", "worker", 0, "worker-template:3");
        let toggle = ComputeServiceToggle::new(control.clone());

        toggle.suspend(&scope(&["prod"])).await.unwrap();

        assert_eq!(
            control.capacity_calls(),
            vec![("prod".to_string(), "api".to_string(), 0)]
        );
        assert_eq!(control.service_capacity("prod", "api"), Some(0));
    }

    #[tokio::test]
    async fn suspend_twice_is_idempotent() {
        let control = Arc::new(MockComputeServices::new());
        control.add_service("prod", "api", 2, "api-template:7");
        let toggle = ComputeServiceToggle::new(control.clone());

        toggle.suspend(&scope(&["prod"])).await.unwrap();
        toggle.suspend(&scope(&["prod"])).await.unwrap();

        // The second pass observes capacity zero and issues no mutate call.
        assert_eq!(control.capacity_calls().len(), 1);
    }

    #[tokio::test]
    async fn resume_recovers_template_capacity() {
        let control = Arc::new(MockComputeServices::new());
        control.add_service("prod", "api", 0, "api-template:7");
        control.set_template_capacity("api-template:7", 3);
        let toggle = ComputeServiceToggle::new(control.clone());

        toggle.resume(&scope(&["prod"])).await.unwrap();

        assert_eq!(
            control.capacity_calls(),
            vec![("prod".to_string(), "api".to_string(), 3)]
        );
    }

    #[tokio::test]
    async fn resume_substitutes_one_for_degenerate_templates() {
        let control = Arc::new(MockComputeServices::new());
        control.add_service("prod", "api", 0, "api-template:7");
        control.add_service("prod", "worker", 0, "worker-template:3");
        control.set_template_capacity("worker-template:3", 0);
        // api's template declares nothing at all.
        let toggle = ComputeServiceToggle::new(control.clone());

        toggle.resume(&scope(&["prod"])).await.unwrap();

        assert_eq!(control.service_capacity("prod", "api"), Some(1));
        assert_eq!(control.service_capacity("prod", "worker"), Some(1));
    }

    #[tokio::test]
    async fn resume_skips_already_running_services() {
        let control = Arc::new(MockComputeServices::new());
        control.add_service("prod", "api", 4, "api-template:7");
        let toggle = ComputeServiceToggle::new(control.clone());

        toggle.resume(&scope(&["prod"])).await.unwrap();

        assert!(control.capacity_calls().is_empty());
        assert_eq!(control.service_capacity("prod", "api"), Some(4));
    }

    #[tokio::test]
    async fn empty_cluster_is_a_successful_no_op() {
        let control = Arc::new(MockComputeServices::new());
        control.add_cluster("empty");
        let toggle = ComputeServiceToggle::new(control.clone());

        toggle.suspend(&scope(&["empty", "ghost"])).await.unwrap();

        assert!(control.capacity_calls().is_empty());
    }

    #[tokio::test]
    async fn describe_failure_propagates_and_aborts_remaining_clusters() {
        let control = Arc::new(MockComputeServices::new());
        control.add_service("alpha", "api", 2, "api-template:7");
        control.add_service("beta", "api", 2, "api-template:7");
        control.fail_describe_in("alpha");
        let toggle = ComputeServiceToggle::new(control.clone());

        let result = toggle.suspend(&scope(&["alpha", "beta"])).await;

        assert!(result.is_err());
        assert!(control.capacity_calls().is_empty());
        assert_eq!(control.service_capacity("beta", "api"), Some(2));
    }

    #[tokio::test]
    async fn services_are_addressed_by_short_name() {
        let control = Arc::new(MockComputeServices::new());
        control.add_service("prod", "api", 1, "api-template:7");
        let toggle = ComputeServiceToggle::new(control.clone());

        // The mock lists plain names, but an ARN-shaped name must resolve to
        // its final path segment.
        assert_eq!(short_name("arn:aws:ecs:region:acct:service/prod/api"), "api");
        assert_eq!(short_name("api"), "api");

        toggle.suspend(&scope(&["prod"])).await.unwrap();
        assert_eq!(control.service_capacity("prod", "api"), Some(0));
    }
}
