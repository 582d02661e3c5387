//! `mtbf init` command - Create a project config and starter model files

use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::config::{Config, CONFIG_FILE, PROJECT_DIR};
use crate::entities::{MarkovModel, SystemModel};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg()]
    pub path: Option<PathBuf>,

    /// Overwrite existing files
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let root = match args.path {
        Some(path) => path,
        None => std::env::current_dir().into_diagnostic()?,
    };
    let config_path = root.join(PROJECT_DIR).join(CONFIG_FILE);

    fs::create_dir_all(root.join(PROJECT_DIR)).into_diagnostic()?;

    let system_yaml = format!(
        "# Reliability block diagram\n\
         # Component types: simple, series, parallel, k_of_n, maintained\n\
         # Any connection makes the whole system one series chain\n\
         {}",
        serde_yml::to_string(&SystemModel::example()).into_diagnostic()?
    );
    let markov_yaml = format!(
        "# Generator matrix: rates per hour, each row must sum to zero\n\
         # State 0 is fully operational, the last state is failure\n\
         {}",
        serde_yml::to_string(&MarkovModel::example()).into_diagnostic()?
    );

    let files = [
        (config_path, Config::starter_yaml()),
        (root.join("system.yaml"), system_yaml),
        (root.join("markov.yaml"), markov_yaml),
    ];

    let mut skipped = 0;
    for (path, content) in &files {
        if !write_file(path, content, args.force)? {
            skipped += 1;
        }
    }
    if skipped > 0 {
        println!("  Use --force to overwrite existing files");
    }

    println!(
        "{} Initialized MTBF project in {}",
        style("✓").green(),
        style(root.display()).cyan()
    );
    println!();
    println!("Next steps:");
    println!("  mtbf system analyze system.yaml");
    println!("  mtbf markov solve markov.yaml");

    Ok(())
}

/// Returns false when the file existed and was left alone
fn write_file(path: &Path, content: &str, force: bool) -> Result<bool> {
    if path.exists() && !force {
        println!(
            "{} {} already exists, skipped",
            style("•").yellow(),
            path.display()
        );
        return Ok(false);
    }
    fs::write(path, content).into_diagnostic()?;
    log::debug!("Wrote {}", path.display());
    println!("{} Created {}", style("✓").green(), path.display());
    Ok(true)
}
