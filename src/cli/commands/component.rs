//! `mtbf component` command - Single-component formulas

use clap::Subcommand;
use console::style;
use miette::Result;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::cli::helpers::{format_hours, format_rate, parse_key_value};
use crate::cli::output::{effective_format, print_structured};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::component::{ComponentModel, Mtbf, ParameterPolicy};
use crate::core::Config;
use crate::entities::component::{Component, ComponentType};

#[derive(Subcommand, Debug)]
pub enum ComponentCommands {
    /// List component types with their parameters and formulas
    Types,

    /// Compute the MTBF and failure rate of one component
    Calc(CalcArgs),
}

#[derive(clap::Args, Debug)]
pub struct CalcArgs {
    /// Component type (simple, series, parallel, k_of_n, maintained)
    #[arg(value_parser = parse_type)]
    pub component_type: ComponentType,

    /// Parameter as KEY=VALUE (repeatable)
    #[arg(long = "param", short = 'p', value_parser = parse_key_value)]
    pub params: Vec<(String, f64)>,

    /// Fill missing parameters with the type's defaults
    #[arg(long)]
    pub lenient: bool,
}

fn parse_type(s: &str) -> Result<ComponentType, String> {
    s.parse()
}

const TYPE_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("type", "TYPE"),
    ColumnDef::new("label", "NAME"),
    ColumnDef::new("parameters", "PARAMETERS (DEFAULT)"),
    ColumnDef::new("theory", "FORMULA"),
];

const RESULT_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("metric", "METRIC"),
    ColumnDef::new("value", "VALUE"),
];

#[derive(Serialize)]
struct TypeInfo {
    #[serde(rename = "type")]
    component_type: ComponentType,
    label: &'static str,
    parameters: BTreeMap<&'static str, f64>,
    theory: &'static str,
}

#[derive(Serialize)]
struct CalcReport {
    model: ComponentModel,
    mtbf: Mtbf,
    failure_rate: f64,
}

pub fn run(cmd: ComponentCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ComponentCommands::Types => run_types(global),
        ComponentCommands::Calc(args) => run_calc(args, global),
    }
}

fn run_types(global: &GlobalOpts) -> Result<()> {
    let infos: Vec<TypeInfo> = ComponentType::ALL
        .iter()
        .map(|t| TypeInfo {
            component_type: *t,
            label: t.label(),
            parameters: t.default_parameters().into_iter().collect(),
            theory: t.theory(),
        })
        .collect();

    let format = effective_format(global.output);
    if print_structured(&infos, format)? {
        return Ok(());
    }

    let rows: Vec<TableRow> = infos
        .iter()
        .map(|info| {
            let params: Vec<String> = info
                .component_type
                .default_parameters()
                .iter()
                .map(|(k, v)| format!("{} ({})", k, v))
                .collect();
            TableRow::new()
                .cell("type", CellValue::Text(info.component_type.to_string()))
                .cell("label", CellValue::Text(info.label.to_string()))
                .cell("parameters", CellValue::Text(params.join(", ")))
                .cell("theory", CellValue::Text(info.theory.to_string()))
        })
        .collect();

    TableFormatter::new(TYPE_COLUMNS).output(&rows, format)
}

fn run_calc(args: CalcArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load()?;
    let policy = if args.lenient {
        ParameterPolicy::Lenient
    } else {
        config.parameter_policy
    };

    let mut component = Component::new(args.component_type.label(), args.component_type);
    for (key, value) in args.params {
        component = component.with_parameter(key, value);
    }

    for warning in component.range_warnings() {
        eprintln!("{} {}", style("!").yellow(), warning);
    }

    let model = component.model(policy)?;
    let mtbf = model.mtbf();
    let report = CalcReport {
        model,
        mtbf,
        failure_rate: model.failure_rate(),
    };

    let format = effective_format(global.output);
    if print_structured(&report, format)? {
        return Ok(());
    }

    if format == OutputFormat::Table {
        println!(
            "{} {}: MTBF = {} h, λ = {} /h",
            style("✓").green(),
            style(args.component_type.label()).bold(),
            style(format_hours(mtbf, config.precision)).cyan(),
            format_rate(report.failure_rate)
        );
        return Ok(());
    }

    let rows = vec![
        TableRow::new()
            .cell("metric", CellValue::Text("mtbf_hours".to_string()))
            .cell("value", CellValue::Hours(mtbf)),
        TableRow::new()
            .cell("metric", CellValue::Text("failure_rate".to_string()))
            .cell("value", CellValue::Rate(report.failure_rate)),
    ];
    TableFormatter::new(RESULT_COLUMNS)
        .with_precision(config.precision)
        .output(&rows, format)
}
