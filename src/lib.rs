//! MTBF: reliability estimates for engineered systems
//!
//! A toolkit for computing the Mean Time Between Failures, failure rate and
//! reliability of systems built from simple, series, parallel, k-out-of-n and
//! maintained components, plus steady-state availability of continuous-time
//! Markov models.

pub mod cli;
pub mod core;
pub mod entities;
pub mod yaml;
