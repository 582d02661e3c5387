//! Command-line argument definitions

use clap::{Parser, Subcommand, ValueEnum};

use crate::cli::commands::completions::CompletionsArgs;
use crate::cli::commands::component::ComponentCommands;
use crate::cli::commands::init::InitArgs;
use crate::cli::commands::markov::MarkovCommands;
use crate::cli::commands::system::SystemCommands;
use crate::cli::commands::validate::ValidateArgs;

/// MTBF toolkit - reliability estimates for engineered systems
#[derive(Parser, Debug)]
#[command(name = "mtbf", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options accepted by every command
#[derive(clap::Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value_t = OutputFormat::Auto)]
    pub output: OutputFormat,

    /// Show debug logging (RUST_LOG overrides)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Table on a terminal, TSV otherwise
    #[default]
    Auto,
    /// Box-drawn table
    Table,
    /// Tab-separated values
    Tsv,
    /// Comma-separated values
    Csv,
    /// Markdown table
    Md,
    /// JSON document
    Json,
    /// YAML document
    Yaml,
}

impl OutputFormat {
    /// True for formats that serialize the whole result instead of rendering rows
    pub fn is_structured(&self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::Yaml)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a project config and starter model files
    Init(InitArgs),

    /// Single-component formulas
    #[command(subcommand)]
    Component(ComponentCommands),

    /// Reliability block diagram analysis
    #[command(subcommand)]
    System(SystemCommands),

    /// Continuous-time Markov steady-state analysis
    #[command(subcommand)]
    Markov(MarkovCommands),

    /// Check system and Markov files
    Validate(ValidateArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
