//! Input document types (system files and Markov files)

pub mod component;
pub mod markov;
pub mod system;

pub use component::{Component, ComponentType};
pub use markov::MarkovModel;
pub use system::{Connection, SystemModel};
