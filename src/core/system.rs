//! System-level aggregation
//!
//! Combines per-component MTBFs into a system figure. The only topology rule
//! is a single global flag: when any connection exists, the whole diagram is
//! one series chain (λ_sys = Σ λ_i). Without connections only descriptive
//! statistics are reported.

use serde::{Serialize, Serializer};

use crate::core::component::{Mtbf, ParameterPolicy};
use crate::core::error::ReliabilityError;
use crate::entities::component::{Component, ComponentType};

/// Sample times (hours) for the reliability table
pub const DEFAULT_RELIABILITY_TIMES: [f64; 5] = [100.0, 500.0, 1000.0, 2000.0, 5000.0];

/// Knobs for an aggregation run
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOptions {
    /// Times at which R(t) and Q(t) are tabulated
    pub time_points: Vec<f64>,

    /// Handling of missing/unknown parameter keys
    pub policy: ParameterPolicy,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            time_points: DEFAULT_RELIABILITY_TIMES.to_vec(),
            policy: ParameterPolicy::Strict,
        }
    }
}

/// Result of evaluating one component
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ComponentOutcome {
    Ok {
        mtbf: Mtbf,
        failure_rate: f64,
    },
    Failed {
        #[serde(serialize_with = "serialize_display")]
        error: ReliabilityError,
    },
}

fn serialize_display<S: Serializer>(
    error: &ReliabilityError,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// One report row, in input order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentRow {
    pub name: String,

    #[serde(rename = "type")]
    pub component_type: ComponentType,

    #[serde(flatten)]
    pub outcome: ComponentOutcome,
}

impl ComponentRow {
    pub fn mtbf(&self) -> Option<Mtbf> {
        match &self.outcome {
            ComponentOutcome::Ok { mtbf, .. } => Some(*mtbf),
            ComponentOutcome::Failed { .. } => None,
        }
    }

    pub fn failure_rate(&self) -> Option<f64> {
        match &self.outcome {
            ComponentOutcome::Ok { failure_rate, .. } => Some(*failure_rate),
            ComponentOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&ReliabilityError> {
        match &self.outcome {
            ComponentOutcome::Ok { .. } => None,
            ComponentOutcome::Failed { error } => Some(error),
        }
    }
}

/// R(t) and Q(t) at one sample time
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReliabilityPoint {
    /// Hours
    pub time: f64,
    /// R(t) = e^(-λt)
    pub reliability: f64,
    /// Q(t) = 1 - R(t)
    pub unreliability: f64,
}

/// Series-chain figures (connected diagram)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSummary {
    /// λ_sys = Σ λ_i (failures/hour)
    pub failure_rate: f64,
    /// 1/λ_sys, or 0 when λ_sys is 0
    pub mtbf: f64,
    pub reliability: Vec<ReliabilityPoint>,
}

impl SeriesSummary {
    fn new(failure_rate: f64, time_points: &[f64]) -> Self {
        let mtbf = if failure_rate > 0.0 {
            1.0 / failure_rate
        } else {
            0.0
        };
        let mut summary = Self {
            failure_rate,
            mtbf,
            reliability: Vec::with_capacity(time_points.len()),
        };
        for &t in time_points {
            let reliability = summary.reliability_at(t);
            summary.reliability.push(ReliabilityPoint {
                time: t,
                reliability,
                unreliability: 1.0 - reliability,
            });
        }
        summary
    }

    /// R(t) = e^(-λ_sys·t)
    pub fn reliability_at(&self, t: f64) -> f64 {
        (-self.failure_rate * t).exp()
    }
}

/// Descriptive statistics (unconnected diagram)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MtbfStatistics {
    pub average: Mtbf,
    pub minimum: Mtbf,
    pub maximum: Mtbf,
    /// Components that contributed
    pub included: usize,
    /// Components skipped because their parameters were invalid
    pub excluded: usize,
}

/// System-level outcome
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SystemSummary {
    Series(SeriesSummary),
    Statistics(MtbfStatistics),
    /// System figures withheld because components failed to evaluate
    Incomplete { failed_components: Vec<String> },
}

/// Full aggregation report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemResult {
    pub has_connections: bool,
    pub components: Vec<ComponentRow>,
    pub summary: SystemSummary,
}

impl SystemResult {
    /// System MTBF (series mode only)
    pub fn system_mtbf(&self) -> Option<f64> {
        match &self.summary {
            SystemSummary::Series(s) => Some(s.mtbf),
            _ => None,
        }
    }

    /// System λ (series mode only)
    pub fn failure_rate(&self) -> Option<f64> {
        match &self.summary {
            SystemSummary::Series(s) => Some(s.failure_rate),
            _ => None,
        }
    }

    /// Reliability table, empty unless in series mode
    pub fn reliability_table(&self) -> &[ReliabilityPoint] {
        match &self.summary {
            SystemSummary::Series(s) => &s.reliability,
            _ => &[],
        }
    }

    pub fn statistics(&self) -> Option<&MtbfStatistics> {
        match &self.summary {
            SystemSummary::Statistics(s) => Some(s),
            _ => None,
        }
    }

    /// Rows whose parameters could not be evaluated
    pub fn failed_rows(&self) -> impl Iterator<Item = &ComponentRow> {
        self.components.iter().filter(|r| r.error().is_some())
    }
}

/// Aggregate with default options (strict parameters, standard sample times)
pub fn aggregate(
    components: &[Component],
    has_connections: bool,
) -> Result<SystemResult, ReliabilityError> {
    aggregate_with(components, has_connections, &AnalysisOptions::default())
}

/// Aggregate component results into system figures
///
/// Every component is evaluated even when earlier ones fail; failures are
/// reported on their rows. Only an empty component list is a hard error.
pub fn aggregate_with(
    components: &[Component],
    has_connections: bool,
    options: &AnalysisOptions,
) -> Result<SystemResult, ReliabilityError> {
    if components.is_empty() {
        return Err(ReliabilityError::EmptySystem);
    }

    let rows: Vec<ComponentRow> = components
        .iter()
        .map(|c| evaluate(c, options.policy))
        .collect();

    let failed: Vec<String> = rows
        .iter()
        .filter(|r| r.error().is_some())
        .map(|r| r.name.clone())
        .collect();

    let summary = if has_connections {
        if failed.is_empty() {
            // Summed in input order so repeated runs are bit-identical
            let lambda: f64 = rows.iter().filter_map(|r| r.failure_rate()).sum();
            log::debug!("Series chain of {} components: λ_sys = {}", rows.len(), lambda);
            SystemSummary::Series(SeriesSummary::new(lambda, &options.time_points))
        } else {
            log::warn!(
                "System MTBF withheld: {} component(s) failed to evaluate",
                failed.len()
            );
            SystemSummary::Incomplete {
                failed_components: failed,
            }
        }
    } else {
        let mtbfs: Vec<f64> = rows
            .iter()
            .filter_map(|r| r.mtbf())
            .map(|m| m.hours())
            .collect();
        if mtbfs.is_empty() {
            SystemSummary::Incomplete {
                failed_components: failed,
            }
        } else {
            SystemSummary::Statistics(statistics(&mtbfs, failed.len()))
        }
    };

    Ok(SystemResult {
        has_connections,
        components: rows,
        summary,
    })
}

fn evaluate(component: &Component, policy: ParameterPolicy) -> ComponentRow {
    let outcome = match component.mtbf(policy) {
        Ok(mtbf) => {
            log::debug!("Component '{}': MTBF = {}", component.name, mtbf);
            ComponentOutcome::Ok {
                mtbf,
                failure_rate: mtbf.failure_rate(),
            }
        }
        Err(error) => {
            log::warn!("{}", error);
            ComponentOutcome::Failed { error }
        }
    };

    ComponentRow {
        name: component.name.clone(),
        component_type: component.component_type,
        outcome,
    }
}

fn statistics(mtbfs: &[f64], excluded: usize) -> MtbfStatistics {
    let sum: f64 = mtbfs.iter().sum();
    let minimum = mtbfs.iter().copied().fold(f64::INFINITY, f64::min);
    let maximum = mtbfs.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    MtbfStatistics {
        average: Mtbf::from_hours(sum / mtbfs.len() as f64),
        minimum: Mtbf::from_hours(minimum),
        maximum: Mtbf::from_hours(maximum),
        included: mtbfs.len(),
        excluded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple(name: &str, lambda: f64) -> Component {
        Component::new(name, ComponentType::Simple).with_parameter("lambda", lambda)
    }

    fn series_block(name: &str, mtbf: f64) -> Component {
        Component::new(name, ComponentType::Series)
            .with_parameter("n_components", 1.0)
            .with_parameter("mtbf_component", mtbf)
    }

    #[test]
    fn test_series_aggregation() {
        let components = vec![
            simple("A", 0.001),
            simple("B", 0.002),
            simple("C", 0.002),
        ];
        let result = aggregate(&components, true).unwrap();

        let lambda = result.failure_rate().unwrap();
        assert!((lambda - 0.005).abs() < 1e-12);
        assert!((result.system_mtbf().unwrap() - 200.0).abs() < 1e-9);

        let table = result.reliability_table();
        assert_eq!(table.len(), 5);
        assert_eq!(table[0].time, 100.0);
        assert!((table[0].reliability - (-0.5f64).exp()).abs() < 1e-12);
        assert!((table[0].reliability - 0.6065).abs() < 1e-4);
        for point in table {
            assert!((point.reliability + point.unreliability - 1.0).abs() < 1e-15);
        }
    }

    #[test]
    fn test_unconnected_statistics() {
        let components = vec![
            series_block("A", 100.0),
            series_block("B", 200.0),
            series_block("C", 300.0),
        ];
        let result = aggregate(&components, false).unwrap();

        let stats = result.statistics().unwrap();
        assert!((stats.average.hours() - 200.0).abs() < 1e-9);
        assert_eq!(stats.minimum.hours(), 100.0);
        assert_eq!(stats.maximum.hours(), 300.0);
        assert!(result.system_mtbf().is_none());
        assert!(result.failure_rate().is_none());
        assert!(result.reliability_table().is_empty());
    }

    #[test]
    fn test_empty_system_is_error() {
        assert_eq!(
            aggregate(&[], true).unwrap_err(),
            ReliabilityError::EmptySystem
        );
        assert_eq!(
            aggregate(&[], false).unwrap_err(),
            ReliabilityError::EmptySystem
        );
    }

    #[test]
    fn test_rows_preserve_input_order() {
        let components = vec![simple("Zeta", 0.1), simple("Alpha", 0.2), simple("Mu", 0.3)];
        let result = aggregate(&components, true).unwrap();
        let names: Vec<&str> = result.components.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Zeta", "Alpha", "Mu"]);
    }

    #[test]
    fn test_idempotent() {
        let components = vec![
            simple("A", 0.0013),
            series_block("B", 777.0),
            Component::with_defaults("C", ComponentType::Maintained),
        ];
        let first = aggregate(&components, true).unwrap();
        let second = aggregate(&components, true).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first.system_mtbf().unwrap().to_bits(),
            second.system_mtbf().unwrap().to_bits()
        );
    }

    #[test]
    fn test_infinite_component_contributes_zero_rate() {
        let components = vec![simple("Never", 0.0), simple("B", 0.01)];
        let result = aggregate(&components, true).unwrap();
        assert!((result.system_mtbf().unwrap() - 100.0).abs() < 1e-9);
        assert_eq!(result.components[0].failure_rate(), Some(0.0));
    }

    #[test]
    fn test_all_zero_rates_give_zero_system_mtbf() {
        let result = aggregate(&[simple("Never", 0.0)], true).unwrap();
        assert_eq!(result.system_mtbf(), Some(0.0));
        assert_eq!(result.reliability_table()[0].reliability, 1.0);
    }

    #[test]
    fn test_partial_failure_withholds_series_summary() {
        let components = vec![
            simple("Good", 0.01),
            Component::new("Bad", ComponentType::Series).with_parameter("mtbf_component", 5.0),
            simple("Also good", 0.02),
        ];
        let result = aggregate(&components, true).unwrap();

        assert_eq!(result.components.len(), 3);
        assert!(result.components[0].mtbf().is_some());
        assert!(result.components[2].mtbf().is_some());
        let err = result.components[1].error().unwrap();
        assert!(matches!(
            err,
            ReliabilityError::InvalidParameters { component, component_type: ComponentType::Series, .. }
                if component == "Bad"
        ));
        assert_eq!(
            result.summary,
            SystemSummary::Incomplete {
                failed_components: vec!["Bad".to_string()]
            }
        );
    }

    #[test]
    fn test_partial_failure_statistics_over_valid_rows() {
        let components = vec![
            series_block("A", 100.0),
            Component::new("Bad", ComponentType::Simple).with_parameter("lambda", -1.0),
            series_block("C", 300.0),
        ];
        let result = aggregate(&components, false).unwrap();
        let stats = result.statistics().unwrap();
        assert_eq!(stats.included, 2);
        assert_eq!(stats.excluded, 1);
        assert!((stats.average.hours() - 200.0).abs() < 1e-9);
        assert_eq!(result.failed_rows().count(), 1);
    }

    #[test]
    fn test_custom_time_points() {
        let options = AnalysisOptions {
            time_points: vec![0.0, 50.0],
            ..AnalysisOptions::default()
        };
        let result = aggregate_with(&[simple("A", 0.02)], true, &options).unwrap();
        let table = result.reliability_table();
        assert_eq!(table.len(), 2);
        assert_eq!(table[0].reliability, 1.0);
        assert!((table[1].reliability - (-1.0f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn test_lenient_policy_flows_through() {
        let components = vec![Component::new("Defaulted", ComponentType::Series)];
        assert!(aggregate(&components, true).unwrap().system_mtbf().is_none());

        let options = AnalysisOptions {
            policy: ParameterPolicy::Lenient,
            ..AnalysisOptions::default()
        };
        let result = aggregate_with(&components, true, &options).unwrap();
        // 1000 / 2 → λ = 0.002
        assert!((result.system_mtbf().unwrap() - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_serialized_report_shape() {
        let result = aggregate(&[simple("A", 0.01)], true).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["summary"]["mode"], "series");
        assert_eq!(json["components"][0]["status"], "ok");
        assert_eq!(json["components"][0]["type"], "simple");
    }
}
