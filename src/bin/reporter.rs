//! CFONB Report - CLI tool for printing the control summary of a batch
//! conversion without writing the converted file.

use cfonb_system::currency::{Converter, RateDirection, RoundingPolicy, EUR_XPF_RATE};
use cfonb_system::report;
use cfonb_system::transcoder::{transcode, TranscodeConfig};
use cfonb_system::{Error, LayoutVariant, Result};
use chrono::Local;
use clap::Parser;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{self, Read};
use std::str::FromStr;

#[derive(Parser)]
#[command(name = "cfonb_report")]
#[command(about = "Print the control summary for a CFONB batch conversion", long_about = None)]
struct Cli {
    /// Input file path (or stdin if not provided)
    #[arg(short, long)]
    input: Option<String>,

    /// Conversion rate
    #[arg(long, default_value = EUR_XPF_RATE)]
    rate: String,

    /// Rate direction (multiply, divide)
    #[arg(long, default_value = "multiply")]
    direction: String,

    /// Rounding policy (round-up, round-nearest, round-half-even)
    #[arg(long, default_value = "round-nearest")]
    rounding: String,

    /// Column layout variant (standard, legacy)
    #[arg(long, default_value = "standard")]
    layout: String,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let rate = Decimal::from_str(&cli.rate).map_err(|_| Error::InvalidRate(cli.rate.clone()))?;
    let direction = cli.direction.parse::<RateDirection>()?;
    let rounding = cli.rounding.parse::<RoundingPolicy>()?;
    let layout = cli.layout.parse::<LayoutVariant>()?.table();

    let converter = Converter::new(rate, direction, rounding, layout.amount_scale)?;
    let config = TranscodeConfig::new(layout, converter);

    let mut input = Vec::new();
    if let Some(ref input_path) = cli.input {
        File::open(input_path)?.read_to_end(&mut input)?;
    } else {
        io::stdin().read_to_end(&mut input)?;
    }

    let result = transcode(&input, config)?;

    let mut stdout = io::stdout();
    println!(
        "Rapport de contrôle CFONB - {} (taux {})",
        Local::now().format("%d/%m/%Y"),
        cli.rate
    );
    println!();
    report::render_summary(&mut stdout, &result)?;

    if !result.violations.is_empty() {
        println!();
        println!("{} format violation(s):", result.violations.len());
        report::render_violations(&mut stdout, &result.violations)?;
    }
    if !result.recognized() && !result.lines.is_empty() {
        println!();
        println!("Warning: no recognizable CFONB record codes in the input");
    }

    Ok(())
}
