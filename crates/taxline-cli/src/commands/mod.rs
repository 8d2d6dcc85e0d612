//! Subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod parse;

use std::path::{Path, PathBuf};

use tracing::debug;

use taxline_core::models::config::{self as core_config, TaxlineConfig};
use taxline_core::{LineItemRecord, ParseOutput};

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text table
    Text,
}

impl From<core_config::OutputFormat> for OutputFormat {
    fn from(format: core_config::OutputFormat) -> Self {
        match format {
            core_config::OutputFormat::Json => OutputFormat::Json,
            core_config::OutputFormat::Csv => OutputFormat::Csv,
            core_config::OutputFormat::Text => OutputFormat::Text,
        }
    }
}

impl OutputFormat {
    /// File extension used for written outputs.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("taxline")
        .join("config.json")
}

/// Load `--config`, else the user config file if present, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<TaxlineConfig> {
    if let Some(path) = config_path {
        return Ok(TaxlineConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Loading config from {}", default_path.display());
        Ok(TaxlineConfig::from_file(&default_path)?)
    } else {
        Ok(TaxlineConfig::default())
    }
}

/// Read the text dump behind `path`.
pub fn read_text(path: &Path) -> anyhow::Result<String> {
    let source = taxline_core::source::open(path)?;
    let text = source.text()?;
    debug!("Read {} characters from {}", text.len(), path.display());
    Ok(text)
}

pub fn render(output: &ParseOutput, format: OutputFormat, pretty: bool) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json if pretty => Ok(serde_json::to_string_pretty(output)?),
        OutputFormat::Json => Ok(serde_json::to_string(output)?),
        OutputFormat::Csv => format_csv(output.records()),
        OutputFormat::Text => Ok(format_text(output)),
    }
}

fn format_csv(records: &[LineItemRecord]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "sl_no",
        "hsn",
        "pkg",
        "qty",
        "unit",
        "rate",
        "amount",
        "cgst",
        "sgst",
        "description",
    ])?;

    for record in records {
        wtr.write_record([
            &record.sl_no.to_string(),
            &record.hsn,
            &record.pkg.to_string(),
            &record.qty.to_string(),
            &record.unit,
            &record.rate.to_string(),
            &record.amount.to_string(),
            &record.cgst.to_string(),
            &record.sgst.to_string(),
            &record.description,
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(output: &ParseOutput) -> String {
    let records = match output {
        ParseOutput::Items(records) => records,
        ParseOutput::Diagnostic(diag) => {
            return format!(
                "{} ({} block(s))\n{}\n",
                diag.error, diag.total_blocks, diag.debug
            );
        }
    };

    let mut output = String::new();
    output.push_str(&format!(
        "{:>4}  {:<8}  {:>8}  {:<5}  {:>10}  {:>12}  {:>6}  {:>6}  {}\n",
        "SN", "HSN", "QTY", "UNIT", "RATE", "AMOUNT", "CGST", "SGST", "DESCRIPTION"
    ));

    for r in records {
        output.push_str(&format!(
            "{:>4}  {:<8}  {:>8}  {:<5}  {:>10}  {:>12}  {:>6}  {:>6}  {}\n",
            r.sl_no,
            r.hsn,
            r.qty.to_string(),
            r.unit,
            r.rate.to_string(),
            r.amount.to_string(),
            r.cgst.to_string(),
            r.sgst.to_string(),
            r.description
        ));
    }

    output
}
