//! Core module - reliability engine, errors and configuration

pub mod component;
pub mod config;
pub mod error;
pub mod markov;
pub mod system;

pub use component::{compute_mtbf, ComponentModel, Mtbf, ParameterPolicy};
pub use config::{Config, ConfigError};
pub use error::ReliabilityError;
pub use markov::{solve, GeneratorMatrix, MarkovResult, MtbfEstimate, SolveMethod};
pub use system::{
    aggregate, aggregate_with, AnalysisOptions, ComponentOutcome, ComponentRow, MtbfStatistics,
    ReliabilityPoint, SeriesSummary, SystemResult, SystemSummary,
};
