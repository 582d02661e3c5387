//! Component entity type
//!
//! A component is one block of the reliability diagram: a type tag, a display
//! name and the numeric parameters its formula needs. The engine only reads
//! components; editing happens in the system file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::core::component::{ComponentModel, Mtbf, ParameterPolicy};
use crate::core::error::ReliabilityError;

/// Component kind - closed set, dispatched exhaustively by the formulas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentType {
    /// Single unit with a constant failure rate
    #[serde(rename = "simple")]
    Simple,
    /// n identical units that must all work
    #[serde(rename = "series")]
    Series,
    /// n identical units, any one keeps the block alive
    #[serde(rename = "parallel")]
    Parallel,
    /// At least k of n identical units must work
    #[serde(rename = "k_of_n", alias = "kofn", alias = "k-of-n")]
    KOfN,
    /// Unit renewed by preventive maintenance every Y hours
    #[serde(rename = "maintained", alias = "maintenance")]
    Maintained,
}

impl ComponentType {
    /// Every component type, in menu order
    pub const ALL: [ComponentType; 5] = [
        ComponentType::Simple,
        ComponentType::Series,
        ComponentType::Parallel,
        ComponentType::KOfN,
        ComponentType::Maintained,
    ];

    /// Human-readable label for reports
    pub fn label(&self) -> &'static str {
        match self {
            ComponentType::Simple => "Simple",
            ComponentType::Series => "Series",
            ComponentType::Parallel => "Parallel",
            ComponentType::KOfN => "k-out-of-n",
            ComponentType::Maintained => "Maintained",
        }
    }

    /// Parameter keys the formula reads
    pub fn required_parameters(&self) -> &'static [&'static str] {
        match self {
            ComponentType::Simple => &["lambda"],
            ComponentType::Series | ComponentType::Parallel => &["n_components", "mtbf_component"],
            ComponentType::KOfN => &["n_total", "k_required", "mtbf_component"],
            ComponentType::Maintained => &["mtbf_base", "maintenance_interval"],
        }
    }

    /// Default value of every required key (applied only under the lenient policy)
    pub fn default_parameters(&self) -> Vec<(&'static str, f64)> {
        match self {
            ComponentType::Simple => vec![("lambda", 0.001)],
            ComponentType::Series | ComponentType::Parallel => {
                vec![("n_components", 2.0), ("mtbf_component", 1000.0)]
            }
            ComponentType::KOfN => vec![
                ("n_total", 3.0),
                ("k_required", 2.0),
                ("mtbf_component", 1000.0),
            ],
            ComponentType::Maintained => {
                vec![("mtbf_base", 1000.0), ("maintenance_interval", 100.0)]
            }
        }
    }

    /// Default value for a single key
    pub fn default_parameter(&self, key: &str) -> Option<f64> {
        self.default_parameters()
            .into_iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }

    /// Short keys accepted in place of the canonical ones: (alias, canonical)
    pub fn parameter_aliases(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            ComponentType::Simple | ComponentType::Maintained => &[],
            ComponentType::Series | ComponentType::Parallel => {
                &[("n", "n_components"), ("mtbf", "mtbf_component")]
            }
            ComponentType::KOfN => &[
                ("n", "n_total"),
                ("k", "k_required"),
                ("mtbf", "mtbf_component"),
            ],
        }
    }

    /// Governing formula and what it models
    pub fn theory(&self) -> &'static str {
        match self {
            ComponentType::Simple => {
                "Exponential failure law: R(t) = e^(-λt), MTBF = 1/λ. Valid for a constant failure rate."
            }
            ComponentType::Series => {
                "Series system: 1/MTBF_sys = Σ 1/MTBF_i, so n identical units give MTBF/n. Every unit must work."
            }
            ComponentType::Parallel => {
                "Parallel redundancy: MTBF_sys = MTBF · (1 + 1/2 + ... + 1/n). The block works while one unit operates."
            }
            ComponentType::KOfN => {
                "k-out-of-n redundancy: MTBF_sys = MTBF · Σ_{i=k}^{n} 1/i. At least k of n units must operate."
            }
            ComponentType::Maintained => {
                "Preventive maintenance every Y hours: MTBF_PM = ∫₀^Y R(t)dt / (1 - R(Y))."
            }
        }
    }

    /// Input range the parameter dialog accepted; values outside are suspicious, not invalid
    pub fn recommended_range(&self, key: &str) -> Option<(f64, f64)> {
        match (self, key) {
            (ComponentType::Simple, "lambda") => Some((1e-6, 1.0)),
            (ComponentType::Series, "n_components") => Some((2.0, 100.0)),
            (ComponentType::Parallel, "n_components") => Some((2.0, 10.0)),
            (ComponentType::KOfN, "n_total") => Some((2.0, 10.0)),
            (ComponentType::KOfN, "k_required") => Some((1.0, 10.0)),
            (_, "mtbf_component") | (ComponentType::Maintained, "mtbf_base") => {
                Some((1.0, 1_000_000.0))
            }
            (ComponentType::Maintained, "maintenance_interval") => Some((1.0, 10_000.0)),
            _ => None,
        }
    }
}

impl std::fmt::Display for ComponentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComponentType::Simple => write!(f, "simple"),
            ComponentType::Series => write!(f, "series"),
            ComponentType::Parallel => write!(f, "parallel"),
            ComponentType::KOfN => write!(f, "k_of_n"),
            ComponentType::Maintained => write!(f, "maintained"),
        }
    }
}

impl FromStr for ComponentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "simple" | "exponential" => Ok(ComponentType::Simple),
            "series" | "serie" => Ok(ComponentType::Series),
            "parallel" | "redundant" => Ok(ComponentType::Parallel),
            "k_of_n" | "kofn" | "k-of-n" | "koon" => Ok(ComponentType::KOfN),
            "maintained" | "maintenance" | "pm" => Ok(ComponentType::Maintained),
            _ => Err(format!("Unknown component type: {}", s)),
        }
    }
}

/// A component instance as written in a system file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// Display label (not used in computation)
    pub name: String,

    /// Component kind
    #[serde(rename = "type")]
    pub component_type: ComponentType,

    /// Parameter name → non-negative value
    #[serde(default)]
    pub parameters: BTreeMap<String, f64>,
}

impl Component {
    /// Create a component with no parameters set
    pub fn new(name: impl Into<String>, component_type: ComponentType) -> Self {
        Self {
            name: name.into(),
            component_type,
            parameters: BTreeMap::new(),
        }
    }

    /// Create a component populated with its type's default parameters
    pub fn with_defaults(name: impl Into<String>, component_type: ComponentType) -> Self {
        let mut component = Self::new(name, component_type);
        for (key, value) in component_type.default_parameters() {
            component.parameters.insert(key.to_string(), value);
        }
        component
    }

    /// Builder-style parameter setter
    pub fn with_parameter(mut self, key: impl Into<String>, value: f64) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }

    /// Resolve the parameters into a typed model
    pub fn model(&self, policy: ParameterPolicy) -> Result<ComponentModel, ReliabilityError> {
        ComponentModel::from_parameters(&self.name, self.component_type, &self.parameters, policy)
    }

    /// MTBF of this component in hours
    pub fn mtbf(&self, policy: ParameterPolicy) -> Result<Mtbf, ReliabilityError> {
        Ok(self.model(policy)?.mtbf())
    }

    /// Advisory warnings for values outside the recommended input ranges
    pub fn range_warnings(&self) -> Vec<String> {
        let aliases = self.component_type.parameter_aliases();
        self.parameters
            .iter()
            .filter_map(|(key, value)| {
                let canonical = aliases
                    .iter()
                    .find(|(alias, _)| alias == key)
                    .map(|(_, canonical)| *canonical)
                    .unwrap_or(key.as_str());
                let (min, max) = self.component_type.recommended_range(canonical)?;
                if *value < min || *value > max {
                    Some(format!(
                        "'{}': {} = {} is outside the recommended range [{}, {}]",
                        self.name, key, value, min, max
                    ))
                } else {
                    None
                }
            })
            .collect()
    }
}
