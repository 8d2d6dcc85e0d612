//! Parse command - extract line items from a single invoice file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use taxline_core::{LineItemParser, ParseReport, ParseWarning, TaxInvoiceParser};

use super::{load_config, read_text, render, OutputFormat};

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Input file (text dump or PDF)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format (default: from config)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Strip trailing tax-rate tokens from descriptions
    #[arg(long)]
    strip_trailing_rates: bool,

    /// Print block counts and warnings to stderr
    #[arg(long)]
    report: bool,
}

pub async fn run(args: ParseArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());
    let text = read_text(&args.input)?;

    let mut parser = TaxInvoiceParser::from_config(&config)?;
    if args.strip_trailing_rates {
        parser = parser.with_strip_trailing_rates(true);
    }

    let report = parser.parse_report(&text);
    if args.report {
        print_report(&report);
    }

    let output = report.into_output(config.parser.diagnostic_sample);
    let format = args.format.unwrap_or_else(|| config.output.format.into());
    let rendered = render(&output, format, config.output.pretty)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &rendered)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", rendered.trim_end());
    }

    debug!("Total processing time: {:?}", start.elapsed());

    if output.is_diagnostic() {
        anyhow::bail!("No line items could be parsed from {}", args.input.display());
    }
    Ok(())
}

fn print_report(report: &ParseReport) {
    eprintln!(
        "{} {} block(s): {} parsed, {} failed",
        style("ℹ").blue(),
        report.block_count,
        style(report.success_count()).green(),
        style(report.failure_count()).red()
    );

    for failure in &report.failures {
        eprintln!(
            "  - block {}: {}",
            failure.block_index + 1,
            style(&failure.error).red()
        );
    }

    for warning in &report.warnings {
        let message = match warning {
            ParseWarning::AmountMismatch { sl_no, expected, actual } => format!(
                "item {}: rate x qty = {} but amount is {}",
                sl_no, expected, actual
            ),
            ParseWarning::RateDerived { sl_no, raw, derived } => format!(
                "item {}: rate {:?} replaced by amount / qty = {}",
                sl_no, raw, derived
            ),
        };
        eprintln!("  - {}", style(message).yellow());
    }
}
