//! Continuous-time Markov chain (CTMC) steady-state solver
//!
//! Given a generator matrix Q (rates per hour between operating states), the
//! stationary distribution π satisfies:
//!
//! ```text
//! π·Q = 0,   Σ π_i = 1
//! ```
//!
//! Q is rank-deficient by construction, so the normalisation row is appended
//! to Qᵀ and the (n+1)×n system is solved in the least-squares sense:
//!
//! ```text
//! | Qᵀ/s |       | 0 |
//! |  1ᵀ  | · π = | 1 |
//! ```
//!
//! `s` is the largest |q_ij|. Scaling the balance rows leaves π unchanged for
//! a valid generator but keeps rates of 1e-8/h from vanishing beside the row
//! of ones. The system is solved by Householder QR; only a rank-deficient R
//! (more than one stationary distribution) falls back to a minimum-norm SVD.
//!
//! State 0 is "fully operational" and the last state is the absorbing
//! failure state, by convention only.

use nalgebra::{DMatrix, DVector};
use serde::Serialize;

use crate::core::error::ReliabilityError;

/// Absolute tolerance for the zero row-sum check
pub const ROW_SUM_TOLERANCE: f64 = 1e-5;

/// |R_ii| (or singular values) below this fraction of the largest count as zero
const RANK_RTOL: f64 = 1e-10;

/// Display labels for the first states
const STATE_NAMES: [&str; 3] = ["Operational", "Degraded", "Failed"];

/// Default display labels for an n-state model
///
/// `Operational, Degraded, Failed, State 3, State 4, ...`
pub fn state_labels(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| match STATE_NAMES.get(i) {
            Some(name) => name.to_string(),
            None => format!("State {}", i),
        })
        .collect()
}

/// Square matrix of transition rates between states
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorMatrix {
    rates: DMatrix<f64>,
}

impl GeneratorMatrix {
    /// Build from rows, checking shape and finiteness (row sums are checked by `validate`)
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, ReliabilityError> {
        let n = rows.len();
        if n < 2 {
            return Err(ReliabilityError::invalid_generator(format!(
                "need at least 2 states, got {}",
                n
            )));
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(ReliabilityError::invalid_generator(format!(
                    "matrix must be square: row {} has {} entries, expected {}",
                    i,
                    row.len(),
                    n
                )));
            }
            if let Some(j) = row.iter().position(|v| !v.is_finite()) {
                return Err(ReliabilityError::invalid_generator(format!(
                    "entry ({}, {}) is not a finite number",
                    i, j
                )));
            }
        }

        let rates = DMatrix::from_fn(n, n, |i, j| rows[i][j]);
        Ok(Self { rates })
    }

    /// The documented 3-state example (Operational, Degraded, Failed)
    pub fn canonical_example() -> Self {
        let rates = DMatrix::from_row_slice(
            3,
            3,
            &[
                -0.01, 0.008, 0.002, //
                0.05, -0.08, 0.03, //
                0.0, 0.0, 0.0,
            ],
        );
        Self { rates }
    }

    /// Starting matrix for an n-state model
    ///
    /// Off-diagonal rates of 0.005, diagonals balancing each row, and an
    /// absorbing last state.
    pub fn template(n: usize) -> Result<Self, ReliabilityError> {
        if n < 2 {
            return Err(ReliabilityError::invalid_generator(format!(
                "need at least 2 states, got {}",
                n
            )));
        }
        let off_diagonal = 0.005;
        let rates = DMatrix::from_fn(n, n, |i, j| {
            if i == n - 1 {
                0.0
            } else if i == j {
                -off_diagonal * (n - 1) as f64
            } else {
                off_diagonal
            }
        });
        Ok(Self { rates })
    }

    /// Number of states
    pub fn size(&self) -> usize {
        self.rates.nrows()
    }

    /// Rate from state `i` to state `j`
    pub fn rate(&self, i: usize, j: usize) -> f64 {
        self.rates[(i, j)]
    }

    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.rates
    }

    /// Row-major copy of the rates
    pub fn rows(&self) -> Vec<Vec<f64>> {
        self.rates
            .row_iter()
            .map(|row| row.iter().copied().collect())
            .collect()
    }

    /// Sum of each row
    pub fn row_sums(&self) -> Vec<f64> {
        self.rates.row_iter().map(|row| row.sum()).collect()
    }

    /// Check the generator property: every row sums to zero within `tolerance`
    pub fn validate(&self, tolerance: f64) -> Result<(), ReliabilityError> {
        for (row, sum) in self.row_sums().into_iter().enumerate() {
            if sum.abs() > tolerance {
                return Err(ReliabilityError::unbalanced_row(row, sum, tolerance));
            }
        }
        Ok(())
    }
}

/// How the stationary distribution was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveMethod {
    /// Householder QR of A (unique stationary distribution)
    Qr,
    /// Minimum-norm SVD solve (A rank-deficient, several stationary distributions)
    Svd,
}

/// Approximate MTBF derived from the steady state
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MtbfEstimate {
    /// (1 − π_last) / |Q₀₀| hours, or 0 when `valid` is false
    pub hours: f64,
    /// False when Q₀₀ ≥ 0 leaves no exit rate to divide by
    pub valid: bool,
}

/// Steady-state analysis of a generator matrix
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkovResult {
    /// π, one probability per state
    pub steady_state: Vec<f64>,
    /// π₀
    pub availability: f64,
    /// Approximation via the exit rate of state 0, not an exact mean first passage time
    pub mtbf: MtbfEstimate,
    pub method: SolveMethod,
}

impl MarkovResult {
    /// MTBF hours, or `DegenerateRate` when Q₀₀ ≥ 0 made the estimate meaningless
    pub fn mtbf_hours(&self) -> Result<f64, ReliabilityError> {
        if self.mtbf.valid {
            Ok(self.mtbf.hours)
        } else {
            Err(ReliabilityError::DegenerateRate {
                context: "Q[0][0] ≥ 0, so state 0 has no exit rate to derive an MTBF from"
                    .to_string(),
            })
        }
    }

    /// Σπ, expected to be 1 within numerical tolerance
    pub fn total_probability(&self) -> f64 {
        self.steady_state.iter().sum()
    }
}

/// Solve with the default 1e-5 row-sum tolerance
pub fn solve(q: &GeneratorMatrix) -> Result<MarkovResult, ReliabilityError> {
    solve_with_tolerance(q, ROW_SUM_TOLERANCE)
}

/// Validate Q and derive steady state, availability and approximate MTBF
pub fn solve_with_tolerance(
    q: &GeneratorMatrix,
    tolerance: f64,
) -> Result<MarkovResult, ReliabilityError> {
    q.validate(tolerance)?;

    let (pi, method) = stationary_distribution(q.as_matrix())?;
    let n = q.size();
    let steady_state: Vec<f64> = pi.iter().copied().collect();

    let q00 = q.rate(0, 0);
    let mtbf = if q00 < 0.0 {
        MtbfEstimate {
            hours: (1.0 - steady_state[n - 1]) / q00.abs(),
            valid: true,
        }
    } else {
        log::warn!("Q[0][0] = {} is not negative; MTBF reported as 0", q00);
        MtbfEstimate {
            hours: 0.0,
            valid: false,
        }
    };

    log::debug!("Steady state ({:?}): {:?}", method, steady_state);

    Ok(MarkovResult {
        availability: steady_state[0],
        steady_state,
        mtbf,
        method,
    })
}

/// Least-squares solve of [Qᵀ/s; 1ᵀ]·π = [0; 1]
fn stationary_distribution(
    q: &DMatrix<f64>,
) -> Result<(DVector<f64>, SolveMethod), ReliabilityError> {
    let n = q.nrows();

    let scale = q.amax();
    let balance = if scale > 0.0 {
        q.transpose() / scale
    } else {
        q.transpose()
    };

    let mut a = DMatrix::<f64>::zeros(n + 1, n);
    a.view_mut((0, 0), (n, n)).copy_from(&balance);
    a.row_mut(n).fill(1.0);

    let mut b = DVector::<f64>::zeros(n + 1);
    b[n] = 1.0;

    let qr = a.clone().qr();
    let r = qr.r();
    let pivots = r.diagonal().abs();
    let threshold = pivots.max() * RANK_RTOL;
    if pivots.min() > threshold {
        let rhs = qr.q().transpose() * &b;
        if let Some(pi) = r.solve_upper_triangular(&rhs) {
            if pi.iter().all(|p| p.is_finite()) {
                return Ok((pi, SolveMethod::Qr));
            }
        }
    }
    log::debug!(
        "R is rank-deficient (min |R_ii| {:e}, threshold {:e})",
        pivots.min(),
        threshold
    );

    log::warn!("Stationary distribution is not unique; using minimum-norm solution");
    let svd = a.svd(true, true);
    let eps = svd.singular_values.max() * RANK_RTOL;
    let pi = svd.solve(&b, eps).map_err(|e| {
        ReliabilityError::invalid_generator(format!("least-squares solve failed: {}", e))
    })?;
    Ok((pi, SolveMethod::Svd))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_canonical_example_steady_state() {
        let q = GeneratorMatrix::canonical_example();
        let result = solve(&q).unwrap();

        assert_eq!(result.steady_state.len(), 3);
        assert_relative_eq!(result.total_probability(), 1.0, epsilon = 1e-9);
        for p in &result.steady_state {
            assert!(*p >= -1e-9, "negative probability {}", p);
        }
        assert_eq!(result.availability, result.steady_state[0]);
        // Absorbing failure state collects all probability mass
        assert_relative_eq!(result.steady_state[2], 1.0, epsilon = 1e-9);
        assert!(result.mtbf.valid);
    }

    #[test]
    fn test_two_state_repairable() {
        let (lambda, mu) = (0.01, 0.1);
        let q = GeneratorMatrix::from_rows(&[vec![-lambda, lambda], vec![mu, -mu]]).unwrap();
        let result = solve(&q).unwrap();

        assert_relative_eq!(result.availability, mu / (lambda + mu), epsilon = 1e-10);
        assert_relative_eq!(result.steady_state[1], lambda / (lambda + mu), epsilon = 1e-10);
        assert_relative_eq!(
            result.mtbf_hours().unwrap(),
            (1.0 - lambda / (lambda + mu)) / lambda,
            epsilon = 1e-8
        );
        assert_eq!(result.method, SolveMethod::Qr);
    }

    #[test]
    fn test_small_hardware_rates_keep_precision() {
        for (lambda, mu) in [(1e-6, 1e-5), (1e-7, 1e-6), (1e-8, 1e-7)] {
            let q = GeneratorMatrix::from_rows(&[vec![-lambda, lambda], vec![mu, -mu]]).unwrap();
            let result = solve(&q).unwrap();

            assert_eq!(result.method, SolveMethod::Qr, "λ = {:e}", lambda);
            assert_relative_eq!(
                result.availability,
                mu / (lambda + mu),
                max_relative = 1e-9
            );
        }
    }

    #[test]
    fn test_canonical_example_balances() {
        let q = GeneratorMatrix::canonical_example();
        let result = solve(&q).unwrap();
        let pi = DVector::from_vec(result.steady_state.clone());

        // π·Q = 0
        let residual = q.as_matrix().transpose() * pi;
        assert!(residual.amax() < 1e-12, "residual {}", residual.amax());
    }

    #[test]
    fn test_small_rate_chain_balances() {
        let q = GeneratorMatrix::from_rows(&[
            vec![-3e-8, 2e-8, 1e-8],
            vec![5e-7, -6e-7, 1e-7],
            vec![4e-6, 0.0, -4e-6],
        ])
        .unwrap();
        let result = solve(&q).unwrap();
        let pi = DVector::from_vec(result.steady_state.clone());

        assert_eq!(result.method, SolveMethod::Qr);
        assert_relative_eq!(result.total_probability(), 1.0, epsilon = 1e-12);
        let residual = q.as_matrix().transpose() * pi;
        assert!(residual.amax() < 1e-17, "residual {}", residual.amax());
    }

    #[test]
    fn test_unbalanced_row_rejected() {
        let q = GeneratorMatrix::from_rows(&[
            vec![-0.01, 0.008, 0.002],
            vec![0.05, -0.08, 0.04],
            vec![0.0, 0.0, 0.0],
        ])
        .unwrap();
        match solve(&q).unwrap_err() {
            ReliabilityError::InvalidGenerator { row, reason } => {
                assert_eq!(row, Some(1));
                assert!(reason.contains("row 1"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_within_tolerance_accepted() {
        let q = GeneratorMatrix::from_rows(&[vec![-0.1, 0.100001], vec![0.2, -0.2]]).unwrap();
        assert!(solve(&q).is_ok());
    }

    #[test]
    fn test_shape_errors() {
        let shape_error = |rows: &[Vec<f64>]| {
            matches!(
                GeneratorMatrix::from_rows(rows),
                Err(ReliabilityError::InvalidGenerator { row: None, .. })
            )
        };
        assert!(shape_error(&[vec![0.0]]));
        assert!(shape_error(&[vec![0.0, 0.0], vec![0.0]]));
        assert!(shape_error(&[vec![f64::NAN, 0.0], vec![0.0, 0.0]]));
    }

    #[test]
    fn test_non_negative_q00_flagged_invalid() {
        let q = GeneratorMatrix::from_rows(&[vec![0.0, 0.0], vec![0.3, -0.3]]).unwrap();
        let result = solve(&q).unwrap();
        assert_eq!(result.mtbf.hours, 0.0);
        assert!(!result.mtbf.valid);
        assert!(matches!(
            result.mtbf_hours(),
            Err(ReliabilityError::DegenerateRate { .. })
        ));
        assert_relative_eq!(result.availability, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_multiple_absorbing_states_use_svd() {
        let q = GeneratorMatrix::from_rows(&[
            vec![-0.02, 0.01, 0.01],
            vec![0.0, 0.0, 0.0],
            vec![0.0, 0.0, 0.0],
        ])
        .unwrap();
        let result = solve(&q).unwrap();
        assert_eq!(result.method, SolveMethod::Svd);
        assert_relative_eq!(result.total_probability(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(result.steady_state[0], 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_template_rows_balance() {
        for n in 2..=6 {
            let q = GeneratorMatrix::template(n).unwrap();
            assert_eq!(q.size(), n);
            assert!(q.validate(ROW_SUM_TOLERANCE).is_ok());
            assert!(q.rows()[n - 1].iter().all(|v| *v == 0.0));
        }
        assert!(GeneratorMatrix::template(1).is_err());
    }

    #[test]
    fn test_state_labels() {
        assert_eq!(
            state_labels(5),
            vec!["Operational", "Degraded", "Failed", "State 3", "State 4"]
        );
        assert_eq!(state_labels(2), vec!["Operational", "Degraded"]);
    }

    #[test]
    fn test_rows_roundtrip() {
        let rows = vec![vec![-1.0, 1.0], vec![2.0, -2.0]];
        let q = GeneratorMatrix::from_rows(&rows).unwrap();
        assert_eq!(q.rows(), rows);
        assert_eq!(q.rate(1, 0), 2.0);
    }
}
