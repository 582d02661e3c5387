//! `mtbf markov` command - Continuous-time Markov steady-state analysis

use clap::Subcommand;
use console::style;
use miette::Result;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::helpers::{format_probability, format_rate};
use crate::cli::output::{effective_format, print_structured};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::viz::render_state_bars;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::markov::{solve_with_tolerance, MtbfEstimate, SolveMethod};
use crate::core::Config;
use crate::entities::MarkovModel;
use crate::yaml::load_markov;

#[derive(Subcommand, Debug)]
pub enum MarkovCommands {
    /// Steady-state probabilities, availability and MTBF of a generator matrix
    Solve(SolveArgs),
}

#[derive(clap::Args, Debug)]
pub struct SolveArgs {
    /// Markov file (YAML)
    #[arg(required_unless_present = "example", conflicts_with = "example")]
    pub file: Option<PathBuf>,

    /// Solve the built-in 3-state example instead of a file
    #[arg(long)]
    pub example: bool,

    /// Draw steady-state probability bars
    #[arg(long)]
    pub plot: bool,
}

const STATE_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("index", "STATE"),
    ColumnDef::new("label", "LABEL"),
    ColumnDef::new("pi", "π"),
];

const SUMMARY_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("metric", "METRIC"),
    ColumnDef::new("value", "VALUE"),
];

#[derive(Serialize)]
struct StateReport {
    label: String,
    probability: f64,
}

#[derive(Serialize)]
struct MarkovReport {
    title: String,
    states: Vec<StateReport>,
    availability: f64,
    mtbf: MtbfEstimate,
    method: SolveMethod,
}

pub fn run(cmd: MarkovCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        MarkovCommands::Solve(args) => run_solve(args, global),
    }
}

fn run_solve(args: SolveArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load()?;
    let model = match &args.file {
        Some(path) => load_markov(path)?,
        None => MarkovModel::example(),
    };

    let q = model.generator()?;
    let result = solve_with_tolerance(&q, config.generator_tolerance)?;
    let labels = model.labels();

    let report = MarkovReport {
        title: model.title.clone(),
        states: labels
            .iter()
            .zip(&result.steady_state)
            .map(|(label, p)| StateReport {
                label: label.clone(),
                probability: *p,
            })
            .collect(),
        availability: result.availability,
        mtbf: result.mtbf,
        method: result.method,
    };

    let format = effective_format(global.output);
    if print_structured(&report, format)? {
        return Ok(());
    }

    let pretty = matches!(format, OutputFormat::Table | OutputFormat::Md);
    if pretty && !model.title.is_empty() {
        println!("{} {}", style("Markov model").bold(), style(&model.title).cyan());
        println!();
    }

    let rows: Vec<TableRow> = report
        .states
        .iter()
        .enumerate()
        .map(|(i, state)| {
            TableRow::new()
                .cell("index", CellValue::Count(i))
                .cell("label", CellValue::Text(state.label.clone()))
                .cell("pi", CellValue::Probability(state.probability))
        })
        .collect();
    TableFormatter::new(STATE_COLUMNS).output(&rows, format)?;
    println!();

    if pretty {
        println!(
            "{} {}",
            style("Availability (π₀):").bold(),
            style(format_probability(result.availability)).green()
        );
        match result.mtbf_hours() {
            Ok(hours) => println!(
                "{} {:.*} h (approximation from exit rate {} /h)",
                style("MTBF:").bold(),
                config.precision,
                hours,
                format_rate(q.rate(0, 0).abs())
            ),
            Err(e) => println!("{} {}", style("!").yellow(), e),
        }
        if result.method == SolveMethod::Svd {
            println!(
                "{} stationary distribution is not unique; showing the minimum-norm solution",
                style("!").yellow()
            );
        }
    } else {
        let mtbf_cell = if result.mtbf.valid {
            CellValue::Text(format!("{:.*}", config.precision, result.mtbf.hours))
        } else {
            CellValue::Text("undefined".to_string())
        };
        let summary = vec![
            TableRow::new()
                .cell("metric", CellValue::Text("availability".to_string()))
                .cell("value", CellValue::Probability(result.availability)),
            TableRow::new()
                .cell("metric", CellValue::Text("mtbf_hours".to_string()))
                .cell("value", mtbf_cell),
        ];
        TableFormatter::new(SUMMARY_COLUMNS).output(&summary, format)?;
    }

    if args.plot {
        println!();
        println!("{}", render_state_bars(&labels, &result.steady_state));
    }

    Ok(())
}
