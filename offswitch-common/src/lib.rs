use serde::{Deserialize, Serialize};
use thiserror::Error;

// -----------------------------------------------------------------------------
// Direction
// -----------------------------------------------------------------------------

/// The two verbs every resource class understands.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum ToggleDirection {
    Shutdown,
    TurnOn,
}

impl ToggleDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToggleDirection::Shutdown => "shutdown",
            ToggleDirection::TurnOn => "turn-on",
        }
    }
}

impl std::fmt::Display for ToggleDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// -----------------------------------------------------------------------------
// Scope
// -----------------------------------------------------------------------------

/// Ordered list of cluster/fleet names the scoped controllers iterate over.
///
/// Unknown names are tolerated downstream (they just yield no resources), but
/// an empty scope is a configuration error caught before any port is touched.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ResourceScope {
    clusters: Vec<String>,
}

impl ResourceScope {
    /// Build a scope from raw names, dropping blank entries and preserving
    /// the order of the rest.
    pub fn new<I, S>(names: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let clusters: Vec<String> = names
            .into_iter()
            .map(|name| name.into().trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
        if clusters.is_empty() {
            return Err(ConfigError::EmptyScope);
        }
        Ok(Self { clusters })
    }

    /// Parse a comma-separated list, e.g. the `CLUSTER_NAMES` variable.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        Self::new(raw.split(','))
    }

    pub fn clusters(&self) -> &[String] {
        &self.clusters
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }
}

// -----------------------------------------------------------------------------
// Errors
// -----------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("cluster scope is empty; set --clusters or CLUSTER_NAMES")]
    EmptyScope,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_labels() {
        assert_eq!(ToggleDirection::Shutdown.as_str(), "shutdown");
        assert_eq!(ToggleDirection::TurnOn.as_str(), "turn-on");
        assert_eq!(ToggleDirection::TurnOn.to_string(), "turn-on");
    }

    #[test]
    fn scope_preserves_order_and_trims() {
        let scope = ResourceScope::parse(" prod , staging ,dev").unwrap();
        assert_eq!(scope.clusters(), ["prod", "staging", "dev"]);
        assert_eq!(scope.len(), 3);
    }

    #[test]
    fn scope_drops_blank_entries() {
        let scope = ResourceScope::parse("prod,,staging,").unwrap();
        assert_eq!(scope.clusters(), ["prod", "staging"]);
    }

    #[test]
    fn empty_scope_is_a_config_error() {
        assert_eq!(ResourceScope::parse("").unwrap_err(), ConfigError::EmptyScope);
        assert_eq!(ResourceScope::parse(" , ,").unwrap_err(), ConfigError::EmptyScope);
        assert_eq!(
            ResourceScope::new(Vec::<String>::new()).unwrap_err(),
            ConfigError::EmptyScope
        );
    }
}
