//! Row-based report rendering
//!
//! Commands describe their columns once with [`ColumnDef`] and build one
//! [`TableRow`] per record; [`TableFormatter`] renders them as a box table,
//! Markdown, CSV or TSV.

use miette::{IntoDiagnostic, Result};
use std::collections::HashMap;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::helpers::{format_hours, format_percent, format_probability, format_rate};
use crate::cli::OutputFormat;
use crate::core::component::Mtbf;

/// A column: lookup key and header text
#[derive(Debug, Clone, Copy)]
pub struct ColumnDef {
    pub key: &'static str,
    pub header: &'static str,
}

impl ColumnDef {
    pub const fn new(key: &'static str, header: &'static str) -> Self {
        Self { key, header }
    }
}

/// A typed cell; formatting is decided at render time
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Hours(Mtbf),
    Rate(f64),
    Probability(f64),
    Percent(f64),
    Count(usize),
    Empty,
}

impl CellValue {
    fn render(&self, precision: usize) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Hours(h) => format_hours(*h, precision),
            CellValue::Rate(r) => format_rate(*r),
            CellValue::Probability(p) => format_probability(*p),
            CellValue::Percent(p) => format_percent(*p),
            CellValue::Count(n) => n.to_string(),
            CellValue::Empty => "-".to_string(),
        }
    }
}

/// One record, cells keyed by column
#[derive(Debug, Clone, Default)]
pub struct TableRow {
    cells: HashMap<&'static str, CellValue>,
}

impl TableRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cell(mut self, key: &'static str, value: CellValue) -> Self {
        self.cells.insert(key, value);
        self
    }

    fn values(&self, columns: &[ColumnDef], precision: usize) -> Vec<String> {
        columns
            .iter()
            .map(|c| {
                self.cells
                    .get(c.key)
                    .unwrap_or(&CellValue::Empty)
                    .render(precision)
            })
            .collect()
    }
}

/// Renders rows in any row-based output format
pub struct TableFormatter {
    columns: &'static [ColumnDef],
    precision: usize,
}

impl TableFormatter {
    pub fn new(columns: &'static [ColumnDef]) -> Self {
        Self {
            columns,
            precision: 2,
        }
    }

    /// Decimal places for hour cells
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    pub fn render(&self, rows: &[TableRow], format: OutputFormat) -> Result<String> {
        let headers: Vec<&str> = self.columns.iter().map(|c| c.header).collect();
        let records: Vec<Vec<String>> = rows
            .iter()
            .map(|r| r.values(self.columns, self.precision))
            .collect();

        match format {
            OutputFormat::Csv => delimited(&headers, &records, b','),
            OutputFormat::Tsv => delimited(&headers, &records, b'\t'),
            OutputFormat::Md => Ok(boxed(&headers, &records, true)),
            _ => Ok(boxed(&headers, &records, false)),
        }
    }

    pub fn output(&self, rows: &[TableRow], format: OutputFormat) -> Result<()> {
        let text = self.render(rows, format)?;
        println!("{}", text.trim_end_matches('\n'));
        Ok(())
    }
}

fn boxed(headers: &[&str], records: &[Vec<String>], markdown: bool) -> String {
    let mut builder = Builder::default();
    builder.push_record(headers.iter().map(|h| h.to_string()));
    for record in records {
        builder.push_record(record.clone());
    }
    let mut table = builder.build();
    if markdown {
        table.with(Style::markdown());
    } else {
        table.with(Style::rounded());
    }
    table.to_string()
}

fn delimited(headers: &[&str], records: &[Vec<String>], delimiter: u8) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());
    writer.write_record(headers).into_diagnostic()?;
    for record in records {
        writer.write_record(record).into_diagnostic()?;
    }
    let bytes = writer.into_inner().into_diagnostic()?;
    String::from_utf8(bytes).into_diagnostic()
}
