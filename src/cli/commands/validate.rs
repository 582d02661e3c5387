//! `mtbf validate` command - Check system and Markov files
//!
//! Structural problems (unparseable YAML, invalid parameters, unbalanced
//! generator rows) are errors. Values outside the recommended input ranges,
//! duplicate names and dangling connections are warnings.

use console::style;
use miette::Result;
use std::path::{Path, PathBuf};

use crate::core::component::ParameterPolicy;
use crate::core::Config;
use crate::entities::{MarkovModel, SystemModel};
use crate::yaml::parse_yaml;

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Files to validate
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Strict mode - warnings become errors
    #[arg(long)]
    pub strict: bool,

    /// Continue validation after first failing file
    #[arg(long)]
    pub keep_going: bool,

    /// Show summary only, don't show individual findings
    #[arg(long)]
    pub summary: bool,
}

/// Validation statistics
#[derive(Default)]
struct ValidationStats {
    files_checked: usize,
    files_passed: usize,
    files_failed: usize,
    total_errors: usize,
    total_warnings: usize,
}

/// Findings for one file
#[derive(Debug, Default, PartialEq)]
pub struct FileReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Which document a file holds, decided by its top-level keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    System,
    Markov,
}

pub fn run(args: ValidateArgs) -> Result<()> {
    let config = Config::load()?;
    let mut stats = ValidationStats::default();

    println!(
        "{} Validating {} file(s)...\n",
        style("→").blue(),
        args.paths.len()
    );

    for path in &args.paths {
        stats.files_checked += 1;
        let report = validate_file(path, &config);

        let failed = !report.errors.is_empty() || (args.strict && !report.warnings.is_empty());
        stats.total_errors += report.errors.len();
        stats.total_warnings += report.warnings.len();

        if failed {
            stats.files_failed += 1;
            if !args.summary {
                println!(
                    "{} {} - {} error(s), {} warning(s)",
                    style("✗").red(),
                    path.display(),
                    report.errors.len(),
                    report.warnings.len()
                );
            }
        } else {
            stats.files_passed += 1;
            if !args.summary {
                println!("{} {}", style("✓").green(), path.display());
            }
        }

        if !args.summary {
            for error in &report.errors {
                println!("    {} {}", style("error:").red(), error);
            }
            for warning in &report.warnings {
                println!("    {} {}", style("warning:").yellow(), warning);
            }
        }

        if failed && !args.keep_going {
            break;
        }
    }

    println!();
    println!("{}", style("─".repeat(60)).dim());
    println!("{}", style("Validation Summary").bold());
    println!("{}", style("─".repeat(60)).dim());
    println!("  Files checked:  {}", style(stats.files_checked).cyan());
    println!("  Files passed:   {}", style(stats.files_passed).green());
    println!("  Files failed:   {}", style(stats.files_failed).red());
    println!("  Total errors:   {}", style(stats.total_errors).red());
    if stats.total_warnings > 0 {
        println!("  Total warnings: {}", style(stats.total_warnings).yellow());
    }
    println!();

    if stats.files_failed > 0 {
        if stats.files_failed == 1 {
            Err(miette::miette!("Validation failed: 1 file has errors"))
        } else {
            Err(miette::miette!(
                "Validation failed: {} files have errors",
                stats.files_failed
            ))
        }
    } else {
        println!("{} All files passed validation!", style("✓").green().bold());
        Ok(())
    }
}

/// Validate one file, collecting every finding
pub fn validate_file(path: &Path, config: &Config) -> FileReport {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            return FileReport {
                errors: vec![e.to_string()],
                warnings: Vec::new(),
            }
        }
    };
    validate_content(&content, &path.display().to_string(), config)
}

/// Validate file content
pub fn validate_content(content: &str, filename: &str, config: &Config) -> FileReport {
    let mut report = FileReport::default();

    let kind = match detect_kind(content, filename) {
        Ok(kind) => kind,
        Err(message) => {
            report.errors.push(message);
            return report;
        }
    };

    match kind {
        FileKind::System => match parse_yaml::<SystemModel>(content, filename) {
            Ok(system) => check_system(&system, config, &mut report),
            Err(e) => report.errors.push(e.to_string()),
        },
        FileKind::Markov => match parse_yaml::<MarkovModel>(content, filename) {
            Ok(model) => check_markov(&model, config, &mut report),
            Err(e) => report.errors.push(e.to_string()),
        },
    }

    log::debug!(
        "{}: {:?} file, {} error(s), {} warning(s)",
        filename,
        kind,
        report.errors.len(),
        report.warnings.len()
    );
    report
}

fn detect_kind(content: &str, filename: &str) -> Result<FileKind, String> {
    let value: serde_yml::Value = parse_yaml(content, filename).map_err(|e| e.to_string())?;
    let mapping = value
        .as_mapping()
        .ok_or_else(|| "expected a YAML mapping at the top level".to_string())?;
    if mapping.contains_key("matrix") {
        Ok(FileKind::Markov)
    } else if mapping.contains_key("components") {
        Ok(FileKind::System)
    } else {
        Err("not a system file (no `components`) or Markov file (no `matrix`)".to_string())
    }
}

fn check_system(system: &SystemModel, config: &Config, report: &mut FileReport) {
    if system.components.is_empty() {
        report
            .errors
            .push("system has no components".to_string());
        return;
    }

    for component in &system.components {
        if let Err(e) = component.model(config.parameter_policy) {
            report.errors.push(e.to_string());
        } else if config.parameter_policy == ParameterPolicy::Lenient {
            let missing: Vec<&str> = component
                .component_type
                .required_parameters()
                .iter()
                .copied()
                .filter(|key| !has_parameter(component, key))
                .collect();
            if !missing.is_empty() {
                report.warnings.push(format!(
                    "'{}': using defaults for {}",
                    component.name,
                    missing.join(", ")
                ));
            }
        }
    }

    report.warnings.extend(system.range_warnings());

    for name in system.duplicate_names() {
        report
            .warnings
            .push(format!("component name '{}' is used more than once", name));
    }
    for name in system.dangling_connections() {
        report
            .warnings
            .push(format!("connection references unknown component '{}'", name));
    }
}

fn has_parameter(component: &crate::entities::Component, key: &str) -> bool {
    component.parameters.contains_key(key)
        || component
            .component_type
            .parameter_aliases()
            .iter()
            .any(|(alias, canonical)| *canonical == key && component.parameters.contains_key(*alias))
}

fn check_markov(model: &MarkovModel, config: &Config, report: &mut FileReport) {
    let q = match model.generator() {
        Ok(q) => q,
        Err(e) => {
            report.errors.push(e.to_string());
            return;
        }
    };

    if let Err(e) = q.validate(config.generator_tolerance) {
        report.errors.push(e.to_string());
    }

    let n = q.size();
    for i in 0..n {
        for j in 0..n {
            let rate = q.rate(i, j);
            if i != j && rate < 0.0 {
                report
                    .warnings
                    .push(format!("negative transition rate {} at ({}, {})", rate, i, j));
            } else if i == j && rate > 0.0 {
                report
                    .warnings
                    .push(format!("positive diagonal entry {} in row {}", rate, i));
            }
        }
    }

    if q.rate(0, 0) >= 0.0 {
        report
            .warnings
            .push("state 0 has no exit rate, so MTBF is undefined".to_string());
    }
}
