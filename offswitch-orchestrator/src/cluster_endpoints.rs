use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info};

use offswitch_common::ResourceScope;
use offswitch_providers::ClusterEndpointControl;

/// Toggles public endpoint access on managed clusters. This class has no
/// capacity dimension, only reachability, and the mutate call is issued
/// unconditionally with no prior state read.
///
/// Failure policy is deliberately more lenient than the other controllers:
/// a failing cluster is logged and skipped so the rest of the scope is still
/// attempted, and nothing propagates to the caller.
pub struct ClusterEndpointToggle {
    control: Arc<dyn ClusterEndpointControl>,
}

impl ClusterEndpointToggle {
    pub fn new(control: Arc<dyn ClusterEndpointControl>) -> Self {
        Self { control }
    }

    /// Disable public endpoint access for every cluster in scope.
    pub async fn suspend(&self, scope: &ResourceScope) -> Result<()> {
        self.set_access(scope, false).await
    }

    /// Re-enable public endpoint access for every cluster in scope.
    pub async fn resume(&self, scope: &ResourceScope) -> Result<()> {
        self.set_access(scope, true).await
    }

    async fn set_access(&self, scope: &ResourceScope, enabled: bool) -> Result<()> {
        let verb = if enabled { "enabling" } else { "disabling" };
        info!("{} cluster endpoint access", verb);
        for cluster in scope.clusters() {
            match self.control.set_public_access(cluster, enabled).await {
                Ok(()) => info!(
                    "{} endpoint access for cluster: {}",
                    if enabled { "enabled" } else { "disabled" },
                    cluster
                ),
                Err(e) => error!(
                    "error updating endpoint access for cluster {}: {:#}",
                    cluster, e
                ),
            }
        }
        Ok(())
    }
}
