//! Markov model entity type - a generator matrix with state labels

use serde::{Deserialize, Serialize};

use crate::core::error::ReliabilityError;
use crate::core::markov::{state_labels, GeneratorMatrix};

/// A Markov file: title, optional state labels and the rate matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkovModel {
    /// Model title
    #[serde(default)]
    pub title: String,

    /// State labels, one per matrix row (defaults used when empty)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub states: Vec<String>,

    /// Transition rates per hour, row i → column j
    pub matrix: Vec<Vec<f64>>,
}

impl MarkovModel {
    /// Checked generator matrix for the solver
    pub fn generator(&self) -> Result<GeneratorMatrix, ReliabilityError> {
        if !self.states.is_empty() && self.states.len() != self.matrix.len() {
            return Err(ReliabilityError::invalid_generator(format!(
                "{} state labels given for a {}-state matrix",
                self.states.len(),
                self.matrix.len()
            )));
        }
        GeneratorMatrix::from_rows(&self.matrix)
    }

    /// Labels for display, falling back to the default names
    pub fn labels(&self) -> Vec<String> {
        if self.states.len() == self.matrix.len() {
            self.states.clone()
        } else {
            state_labels(self.matrix.len())
        }
    }

    /// Build a model around an existing matrix
    pub fn from_generator(title: impl Into<String>, q: &GeneratorMatrix) -> Self {
        Self {
            title: title.into(),
            states: state_labels(q.size()),
            matrix: q.rows(),
        }
    }

    /// The 3-state degraded-mode example
    pub fn example() -> Self {
        Self::from_generator("Degraded-mode pump", &GeneratorMatrix::canonical_example())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_without_labels() {
        let yaml = "title: Two state\nmatrix:\n  - [-0.01, 0.01]\n  - [0.1, -0.1]\n";
        let model: MarkovModel = serde_yml::from_str(yaml).unwrap();
        assert!(model.states.is_empty());
        assert_eq!(model.labels(), vec!["Operational", "Degraded"]);
        assert_eq!(model.generator().unwrap().size(), 2);
    }

    #[test]
    fn test_label_count_mismatch() {
        let model = MarkovModel {
            title: "Bad".to_string(),
            states: vec!["Up".to_string()],
            matrix: vec![vec![-1.0, 1.0], vec![1.0, -1.0]],
        };
        assert!(matches!(
            model.generator(),
            Err(ReliabilityError::InvalidGenerator { row: None, .. })
        ));
    }

    #[test]
    fn test_example_matches_canonical_matrix() {
        let model = MarkovModel::example();
        assert_eq!(model.labels(), vec!["Operational", "Degraded", "Failed"]);
        assert_eq!(model.generator().unwrap(), GeneratorMatrix::canonical_example());
    }
}
