//! Per-component MTBF formulas
//!
//! Each component type maps to a closed-form MTBF under the exponential
//! (constant hazard) model:
//!
//! ```text
//! Simple      MTBF = 1/λ                         (λ = 0 → infinite)
//! Series      MTBF = MTBF_c / n
//! Parallel    MTBF = MTBF_c · Σ_{i=1}^{n} 1/i
//! k-of-n      MTBF = MTBF_c · Σ_{i=k}^{n} 1/i     (k > n → 0)
//! Maintained  MTBF = ∫₀^Y R(t)dt / (1 - R(Y))     (R(Y) = 1 → MTBF_base)
//! ```
//!
//! Raw parameter maps are resolved into a typed [`ComponentModel`] first, so
//! the formulas themselves never fail.

use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::core::error::ReliabilityError;
use crate::entities::component::ComponentType;

/// Largest accepted unit count (`n_components`, `n_total`, `k_required`)
///
/// Keeps the harmonic sums well inside a millisecond.
pub const MAX_UNITS: u32 = 1_000_000;

/// MTBF in hours, or the "never fails" sentinel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mtbf {
    Finite(f64),
    Infinite,
}

impl Mtbf {
    /// Map an hour value to an MTBF, treating +∞ as the sentinel
    pub fn from_hours(hours: f64) -> Self {
        if hours == f64::INFINITY {
            Mtbf::Infinite
        } else {
            Mtbf::Finite(hours)
        }
    }

    /// Hours, with the sentinel mapped to `f64::INFINITY`
    pub fn hours(self) -> f64 {
        match self {
            Mtbf::Finite(h) => h,
            Mtbf::Infinite => f64::INFINITY,
        }
    }

    /// λ = 1/MTBF for positive finite MTBF, otherwise 0
    pub fn failure_rate(self) -> f64 {
        match self {
            Mtbf::Finite(h) if h > 0.0 => 1.0 / h,
            _ => 0.0,
        }
    }

    pub fn is_infinite(self) -> bool {
        matches!(self, Mtbf::Infinite)
    }
}

impl std::fmt::Display for Mtbf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mtbf::Finite(h) => match f.precision() {
                Some(p) => write!(f, "{:.*}", p, h),
                None => write!(f, "{}", h),
            },
            Mtbf::Infinite => write!(f, "∞"),
        }
    }
}

impl Serialize for Mtbf {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Mtbf::Finite(h) => serializer.serialize_f64(*h),
            Mtbf::Infinite => serializer.serialize_str("infinite"),
        }
    }
}

/// How missing parameter keys are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterPolicy {
    /// Missing or unknown keys are `InvalidParameters`
    #[default]
    Strict,
    /// Missing keys take the type's default value; unknown keys are ignored
    Lenient,
}

impl std::fmt::Display for ParameterPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParameterPolicy::Strict => write!(f, "strict"),
            ParameterPolicy::Lenient => write!(f, "lenient"),
        }
    }
}

impl FromStr for ParameterPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(ParameterPolicy::Strict),
            "lenient" | "default" | "defaults" => Ok(ParameterPolicy::Lenient),
            _ => Err(format!("Unknown parameter policy: {}", s)),
        }
    }
}

/// A component with its parameters resolved and checked
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ComponentModel {
    Simple {
        lambda: f64,
    },
    Series {
        n_components: u32,
        mtbf_component: f64,
    },
    Parallel {
        n_components: u32,
        mtbf_component: f64,
    },
    #[serde(rename = "k_of_n")]
    KOfN {
        n_total: u32,
        k_required: u32,
        mtbf_component: f64,
    },
    Maintained {
        mtbf_base: f64,
        maintenance_interval: f64,
    },
}

/// Compute a component's MTBF from a raw parameter map (strict policy)
pub fn compute_mtbf(
    component_type: ComponentType,
    parameters: &BTreeMap<String, f64>,
) -> Result<Mtbf, ReliabilityError> {
    let model = ComponentModel::from_parameters(
        "(unnamed)",
        component_type,
        parameters,
        ParameterPolicy::Strict,
    )?;
    Ok(model.mtbf())
}

/// Harmonic partial sum Σ_{i=from}^{to} 1/i (empty when from > to)
pub fn harmonic_sum(from: u32, to: u32) -> f64 {
    (from..=to).map(|i| 1.0 / i as f64).sum()
}

/// Parameter lookup that knows the component it belongs to
struct ParameterReader<'a> {
    name: &'a str,
    component_type: ComponentType,
    values: BTreeMap<&'a str, f64>,
    policy: ParameterPolicy,
}

impl<'a> ParameterReader<'a> {
    fn new(
        name: &'a str,
        component_type: ComponentType,
        parameters: &'a BTreeMap<String, f64>,
        policy: ParameterPolicy,
    ) -> Result<Self, ReliabilityError> {
        let required = component_type.required_parameters();
        let aliases = component_type.parameter_aliases();
        let mut values: BTreeMap<&'a str, f64> = BTreeMap::new();

        for (key, value) in parameters {
            let canonical = aliases
                .iter()
                .find(|(alias, _)| *alias == key.as_str())
                .map(|(_, canonical)| *canonical)
                .or_else(|| required.iter().copied().find(|k| *k == key.as_str()));

            let canonical = match canonical {
                Some(c) => c,
                None => match policy {
                    ParameterPolicy::Strict => {
                        return Err(ReliabilityError::invalid_parameters(
                            name,
                            component_type,
                            format!("unknown parameter '{}'", key),
                        ));
                    }
                    ParameterPolicy::Lenient => {
                        log::warn!(
                            "Ignoring unknown parameter '{}' on {} component '{}'",
                            key,
                            component_type,
                            name
                        );
                        continue;
                    }
                },
            };

            if !value.is_finite() {
                return Err(ReliabilityError::invalid_parameters(
                    name,
                    component_type,
                    format!("'{}' must be a finite number, got {}", key, value),
                ));
            }
            if *value < 0.0 {
                return Err(ReliabilityError::invalid_parameters(
                    name,
                    component_type,
                    format!("'{}' must be non-negative, got {}", key, value),
                ));
            }
            if values.insert(canonical, *value).is_some() {
                return Err(ReliabilityError::invalid_parameters(
                    name,
                    component_type,
                    format!("'{}' is given more than once (check short aliases)", canonical),
                ));
            }
        }

        Ok(Self {
            name,
            component_type,
            values,
            policy,
        })
    }

    fn invalid(&self, reason: String) -> ReliabilityError {
        ReliabilityError::invalid_parameters(self.name, self.component_type, reason)
    }

    fn real(&self, key: &str) -> Result<f64, ReliabilityError> {
        if let Some(v) = self.values.get(key) {
            return Ok(*v);
        }
        match self.policy {
            ParameterPolicy::Strict => {
                Err(self.invalid(format!("missing required parameter '{}'", key)))
            }
            ParameterPolicy::Lenient => {
                let value = self
                    .component_type
                    .default_parameter(key)
                    .ok_or_else(|| self.invalid(format!("no default for '{}'", key)))?;
                log::debug!(
                    "Component '{}' has no '{}', using default {}",
                    self.name,
                    key,
                    value
                );
                Ok(value)
            }
        }
    }

    fn count(&self, key: &str) -> Result<u32, ReliabilityError> {
        let value = self.real(key)?;
        if value.fract() != 0.0 {
            return Err(self.invalid(format!(
                "'{}' must be a whole number of units, got {}",
                key, value
            )));
        }
        if value > MAX_UNITS as f64 {
            return Err(self.invalid(format!(
                "'{}' must be at most {} units, got {}",
                key, MAX_UNITS, value
            )));
        }
        Ok(value as u32)
    }
}

impl ComponentModel {
    /// Resolve a raw parameter map into a typed model
    ///
    /// Aliases (`n`, `k`, `mtbf`) are folded onto canonical keys. Negative or
    /// non-finite values and fractional unit counts are rejected. Missing keys
    /// follow `policy`.
    pub fn from_parameters(
        name: &str,
        component_type: ComponentType,
        parameters: &BTreeMap<String, f64>,
        policy: ParameterPolicy,
    ) -> Result<Self, ReliabilityError> {
        let params = ParameterReader::new(name, component_type, parameters, policy)?;

        let model = match component_type {
            ComponentType::Simple => ComponentModel::Simple {
                lambda: params.real("lambda")?,
            },
            ComponentType::Series => ComponentModel::Series {
                n_components: params.count("n_components")?,
                mtbf_component: params.real("mtbf_component")?,
            },
            ComponentType::Parallel => ComponentModel::Parallel {
                n_components: params.count("n_components")?,
                mtbf_component: params.real("mtbf_component")?,
            },
            ComponentType::KOfN => {
                let k_required = params.count("k_required")?;
                if k_required == 0 {
                    return Err(params.invalid("'k_required' must be at least 1".to_string()));
                }
                ComponentModel::KOfN {
                    n_total: params.count("n_total")?,
                    k_required,
                    mtbf_component: params.real("mtbf_component")?,
                }
            }
            ComponentType::Maintained => {
                let mtbf_base = params.real("mtbf_base")?;
                if mtbf_base <= 0.0 {
                    return Err(params.invalid(format!(
                        "'mtbf_base' must be positive to derive λ, got {}",
                        mtbf_base
                    )));
                }
                ComponentModel::Maintained {
                    mtbf_base,
                    maintenance_interval: params.real("maintenance_interval")?,
                }
            }
        };

        Ok(model)
    }

    pub fn component_type(&self) -> ComponentType {
        match self {
            ComponentModel::Simple { .. } => ComponentType::Simple,
            ComponentModel::Series { .. } => ComponentType::Series,
            ComponentModel::Parallel { .. } => ComponentType::Parallel,
            ComponentModel::KOfN { .. } => ComponentType::KOfN,
            ComponentModel::Maintained { .. } => ComponentType::Maintained,
        }
    }

    /// MTBF in hours
    pub fn mtbf(&self) -> Mtbf {
        match *self {
            ComponentModel::Simple { lambda } => {
                if lambda > 0.0 {
                    Mtbf::Finite(1.0 / lambda)
                } else {
                    Mtbf::Infinite
                }
            }
            ComponentModel::Series {
                n_components,
                mtbf_component,
            } => {
                if n_components == 0 || mtbf_component <= 0.0 {
                    Mtbf::Finite(0.0)
                } else {
                    Mtbf::Finite(mtbf_component / n_components as f64)
                }
            }
            ComponentModel::Parallel {
                n_components,
                mtbf_component,
            } => Mtbf::Finite(mtbf_component * harmonic_sum(1, n_components)),
            ComponentModel::KOfN {
                n_total,
                k_required,
                mtbf_component,
            } => {
                if k_required > n_total {
                    Mtbf::Finite(0.0)
                } else {
                    Mtbf::Finite(mtbf_component * harmonic_sum(k_required, n_total))
                }
            }
            ComponentModel::Maintained {
                mtbf_base,
                maintenance_interval,
            } => {
                let lambda = 1.0 / mtbf_base;
                let r_y = (-lambda * maintenance_interval).exp();
                // ∫₀^Y e^(-λt) dt
                let integral = mtbf_base * (1.0 - r_y);
                if r_y < 1.0 {
                    Mtbf::Finite(integral / (1.0 - r_y))
                } else {
                    Mtbf::Finite(mtbf_base)
                }
            }
        }
    }

    /// λ = 1/MTBF, zero for infinite or non-positive MTBF
    pub fn failure_rate(&self) -> f64 {
        self.mtbf().failure_rate()
    }
}
