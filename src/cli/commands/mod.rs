//! CLI command implementations

pub mod completions;
pub mod component;
pub mod init;
pub mod markov;
pub mod system;
pub mod validate;
