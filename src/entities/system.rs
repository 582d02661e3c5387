//! System entity type - a reliability block diagram on disk
//!
//! The file lists the components in display order plus the directed
//! connections drawn between them. Connections only matter as a whole:
//! any connection at all makes the analysis treat the system as one series
//! chain.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::core::error::ReliabilityError;
use crate::core::system::{aggregate_with, AnalysisOptions, SystemResult};
use crate::entities::component::{Component, ComponentType};

/// A directed edge between two components, by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub from: String,
    pub to: String,
}

impl Connection {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// A system file: components plus connections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemModel {
    /// System name
    pub name: String,

    /// Free-text description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Components in display order
    #[serde(default)]
    pub components: Vec<Component>,

    /// Directed connections drawn between components
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub connections: Vec<Connection>,
}

impl SystemModel {
    /// Create an empty system
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            components: Vec::new(),
            connections: Vec::new(),
        }
    }

    /// True when at least one connection exists
    pub fn has_connections(&self) -> bool {
        !self.connections.is_empty()
    }

    /// Run the aggregation over this system's components
    pub fn analyze(&self, options: &AnalysisOptions) -> Result<SystemResult, ReliabilityError> {
        log::debug!(
            "Analyzing system '{}' ({} components, {} connections)",
            self.name,
            self.components.len(),
            self.connections.len()
        );
        aggregate_with(&self.components, self.has_connections(), options)
    }

    /// Connection endpoints that name no component
    pub fn dangling_connections(&self) -> Vec<String> {
        let names: BTreeSet<&str> = self.components.iter().map(|c| c.name.as_str()).collect();
        self.connections
            .iter()
            .flat_map(|c| [c.from.as_str(), c.to.as_str()])
            .filter(|endpoint| !names.contains(endpoint))
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Component names used more than once
    pub fn duplicate_names(&self) -> Vec<String> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for component in &self.components {
            *counts.entry(component.name.as_str()).or_default() += 1;
        }
        counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// Advisory warnings for every component's out-of-range parameters
    pub fn range_warnings(&self) -> Vec<String> {
        self.components
            .iter()
            .flat_map(|c| c.range_warnings())
            .collect()
    }

    /// A small connected system used for starter files
    pub fn example() -> Self {
        let mut system = SystemModel::new("Pump skid");
        system.description = Some("Motor driving a redundant pump pair".to_string());
        system.components = vec![
            Component::new("Motor", ComponentType::Simple).with_parameter("lambda", 0.0005),
            Component::new("Pumps", ComponentType::Parallel)
                .with_parameter("n_components", 2.0)
                .with_parameter("mtbf_component", 4000.0),
            Component::new("Valves", ComponentType::KOfN)
                .with_parameter("n_total", 3.0)
                .with_parameter("k_required", 2.0)
                .with_parameter("mtbf_component", 8000.0),
            Component::new("Controller", ComponentType::Maintained)
                .with_parameter("mtbf_base", 10000.0)
                .with_parameter("maintenance_interval", 720.0),
        ];
        system.connections = vec![
            Connection::new("Motor", "Pumps"),
            Connection::new("Pumps", "Valves"),
            Connection::new("Controller", "Motor"),
        ];
        system
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::system::SystemSummary;

    const PUMP_SKID: &str = r#"
name: Pump skid
components:
  - name: Motor
    type: simple
    parameters:
      lambda: 0.001
  - name: Pumps
    type: parallel
    parameters:
      n: 2
      mtbf: 1000
connections:
  - from: Motor
    to: Pumps
"#;

    #[test]
    fn test_parse_system_file() {
        let system: SystemModel = serde_yml::from_str(PUMP_SKID).unwrap();
        assert_eq!(system.name, "Pump skid");
        assert_eq!(system.components.len(), 2);
        assert!(system.has_connections());
        assert!(system.description.is_none());
    }

    #[test]
    fn test_analyze_connected_system() {
        let system: SystemModel = serde_yml::from_str(PUMP_SKID).unwrap();
        let result = system.analyze(&AnalysisOptions::default()).unwrap();
        // 1/1000 + 1/1500
        let lambda = 0.001 + 1.0 / 1500.0;
        assert!((result.failure_rate().unwrap() - lambda).abs() < 1e-15);
        assert!((result.system_mtbf().unwrap() - 600.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_connections_gives_statistics() {
        let mut system: SystemModel = serde_yml::from_str(PUMP_SKID).unwrap();
        system.connections.clear();
        let result = system.analyze(&AnalysisOptions::default()).unwrap();
        assert!(matches!(result.summary, SystemSummary::Statistics(_)));
    }

    #[test]
    fn test_empty_system() {
        let system = SystemModel::new("Nothing");
        assert_eq!(
            system.analyze(&AnalysisOptions::default()),
            Err(ReliabilityError::EmptySystem)
        );
    }

    #[test]
    fn test_dangling_and_duplicates() {
        let mut system: SystemModel = serde_yml::from_str(PUMP_SKID).unwrap();
        system.connections.push(Connection::new("Pumps", "Tank"));
        system
            .components
            .push(Component::with_defaults("Motor", ComponentType::Simple));

        assert_eq!(system.dangling_connections(), vec!["Tank".to_string()]);
        assert_eq!(system.duplicate_names(), vec!["Motor".to_string()]);
    }

    #[test]
    fn test_example_is_consistent() {
        let system = SystemModel::example();
        assert!(system.dangling_connections().is_empty());
        assert!(system.duplicate_names().is_empty());
        assert!(system.range_warnings().is_empty());

        let yaml = serde_yml::to_string(&system).unwrap();
        let parsed: SystemModel = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(parsed, system);

        let result = system.analyze(&AnalysisOptions::default()).unwrap();
        assert!(result.system_mtbf().unwrap() > 0.0);
        assert_eq!(result.failed_rows().count(), 0);
    }
}
