//! `mtbf system` command - Reliability block diagram analysis

use clap::Subcommand;
use console::style;
use miette::Result;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::helpers::{format_hours, format_rate};
use crate::cli::output::{effective_format, print_structured};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::viz::{render_reliability_curve, render_series_chain, CURVE_HEIGHT, CURVE_WIDTH};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::component::{Mtbf, ParameterPolicy};
use crate::core::system::{ComponentOutcome, SystemResult, SystemSummary};
use crate::core::Config;
use crate::yaml::load_system;

#[derive(Subcommand, Debug)]
pub enum SystemCommands {
    /// Compute component and system MTBF for a system file
    Analyze(AnalyzeArgs),
}

#[derive(clap::Args, Debug)]
pub struct AnalyzeArgs {
    /// System file (YAML)
    pub file: PathBuf,

    /// Sample time in hours for the reliability table (repeatable, overrides config)
    #[arg(long = "time", short = 't')]
    pub times: Vec<f64>,

    /// Draw the block chain and R(t) curve
    #[arg(long)]
    pub plot: bool,

    /// Fill missing parameters with the type's defaults
    #[arg(long)]
    pub lenient: bool,
}

const COMPONENT_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("name", "COMPONENT"),
    ColumnDef::new("type", "TYPE"),
    ColumnDef::new("mtbf", "MTBF (h)"),
    ColumnDef::new("rate", "λ (1/h)"),
    ColumnDef::new("status", "STATUS"),
];

const RELIABILITY_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("time", "TIME (h)"),
    ColumnDef::new("r", "R(t)"),
    ColumnDef::new("q", "Q(t)"),
    ColumnDef::new("pct", "R(t) %"),
];

const SUMMARY_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("metric", "METRIC"),
    ColumnDef::new("value", "VALUE"),
];

#[derive(Serialize)]
struct SystemReport<'a> {
    name: &'a str,
    #[serde(flatten)]
    result: &'a SystemResult,
}

pub fn run(cmd: SystemCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        SystemCommands::Analyze(args) => run_analyze(args, global),
    }
}

fn run_analyze(args: AnalyzeArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load()?;
    let system = load_system(&args.file)?;

    let mut options = config.analysis_options();
    if !args.times.is_empty() {
        if let Some(t) = args.times.iter().find(|t| !t.is_finite() || **t < 0.0) {
            return Err(miette::miette!("Sample times must be non-negative hours, got {}", t));
        }
        options.time_points = args.times.clone();
    }
    if args.lenient {
        options.policy = ParameterPolicy::Lenient;
    }

    for name in system.dangling_connections() {
        log::warn!("Connection references unknown component '{}'", name);
    }

    let result = system.analyze(&options)?;

    let format = effective_format(global.output);
    let report = SystemReport {
        name: &system.name,
        result: &result,
    };
    if !print_structured(&report, format)? {
        print_report(&system.name, &result, format, config.precision)?;

        if args.plot {
            print_plots(&system.name, &result);
        }
    }

    let failed = result.failed_rows().count();
    if failed > 0 {
        return Err(miette::miette!(
            help = "Run `mtbf validate` on the file for details",
            "{} component(s) could not be evaluated",
            failed
        ));
    }
    Ok(())
}

fn print_report(
    name: &str,
    result: &SystemResult,
    format: OutputFormat,
    precision: usize,
) -> Result<()> {
    let pretty = matches!(format, OutputFormat::Table | OutputFormat::Md);

    if pretty {
        println!("{} {}", style("System").bold(), style(name).cyan());
        println!();
    }

    let rows: Vec<TableRow> = result
        .components
        .iter()
        .map(|row| {
            let base = TableRow::new()
                .cell("name", CellValue::Text(row.name.clone()))
                .cell("type", CellValue::Text(row.component_type.to_string()));
            match &row.outcome {
                ComponentOutcome::Ok { mtbf, failure_rate } => base
                    .cell("mtbf", CellValue::Hours(*mtbf))
                    .cell("rate", CellValue::Rate(*failure_rate))
                    .cell("status", CellValue::Text("ok".to_string())),
                ComponentOutcome::Failed { error } => base
                    .cell("status", CellValue::Text(format!("error: {}", error))),
            }
        })
        .collect();
    TableFormatter::new(COMPONENT_COLUMNS)
        .with_precision(precision)
        .output(&rows, format)?;
    println!();

    match &result.summary {
        SystemSummary::Series(series) => {
            let summary = vec![
                metric_row("mode", CellValue::Text("series".to_string())),
                metric_row("failure_rate", CellValue::Rate(series.failure_rate)),
                metric_row("mtbf_hours", CellValue::Hours(Mtbf::Finite(series.mtbf))),
            ];
            if pretty {
                println!(
                    "{} λ_sys = {} /h, MTBF_sys = {} h",
                    style("Series chain:").bold(),
                    format_rate(series.failure_rate),
                    style(format_hours(Mtbf::Finite(series.mtbf), precision)).green()
                );
                println!();
            } else {
                TableFormatter::new(SUMMARY_COLUMNS)
                    .with_precision(precision)
                    .output(&summary, format)?;
                println!();
            }

            let points: Vec<TableRow> = series
                .reliability
                .iter()
                .map(|p| {
                    TableRow::new()
                        .cell("time", CellValue::Text(format!("{}", p.time)))
                        .cell("r", CellValue::Probability(p.reliability))
                        .cell("q", CellValue::Probability(p.unreliability))
                        .cell("pct", CellValue::Percent(p.reliability))
                })
                .collect();
            TableFormatter::new(RELIABILITY_COLUMNS).output(&points, format)?;
        }
        SystemSummary::Statistics(stats) => {
            if pretty {
                println!(
                    "{} no connections, so no system MTBF is computed",
                    style("Statistics:").bold()
                );
            }
            let mut summary = vec![
                metric_row("mode", CellValue::Text("statistics".to_string())),
                metric_row("average_mtbf", CellValue::Hours(stats.average)),
                metric_row("minimum_mtbf", CellValue::Hours(stats.minimum)),
                metric_row("maximum_mtbf", CellValue::Hours(stats.maximum)),
                metric_row("included", CellValue::Count(stats.included)),
            ];
            if stats.excluded > 0 {
                summary.push(metric_row("excluded", CellValue::Count(stats.excluded)));
            }
            TableFormatter::new(SUMMARY_COLUMNS)
                .with_precision(precision)
                .output(&summary, format)?;
        }
        SystemSummary::Incomplete { failed_components } => {
            if pretty {
                println!(
                    "{} system figures withheld; invalid components: {}",
                    style("✗").red(),
                    failed_components.join(", ")
                );
            } else {
                let summary = vec![
                    metric_row("mode", CellValue::Text("incomplete".to_string())),
                    metric_row(
                        "failed_components",
                        CellValue::Text(failed_components.join(", ")),
                    ),
                ];
                TableFormatter::new(SUMMARY_COLUMNS)
                    .with_precision(precision)
                    .output(&summary, format)?;
            }
        }
    }

    Ok(())
}

fn metric_row(metric: &str, value: CellValue) -> TableRow {
    TableRow::new()
        .cell("metric", CellValue::Text(metric.to_string()))
        .cell("value", value)
}

fn print_plots(name: &str, result: &SystemResult) {
    let blocks: Vec<_> = result
        .components
        .iter()
        .map(|row| (row.name.as_str(), row.component_type))
        .collect();

    println!();
    if result.has_connections {
        println!("{}", render_series_chain(name, &blocks));
    }
    if let SystemSummary::Series(series) = &result.summary {
        println!();
        println!(
            "{}",
            render_reliability_curve(series, CURVE_WIDTH, CURVE_HEIGHT)
        );
    }
}
