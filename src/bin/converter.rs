//! CFONB Converter - CLI tool for rewriting the amounts of a payment batch.

use cfonb_system::currency::{Converter, RateDirection, RoundingPolicy, EUR_XPF_RATE};
use cfonb_system::report;
use cfonb_system::transcoder::{transcode, FooterSynthesis, TranscodeConfig};
use cfonb_system::{Error, LayoutVariant, Result};
use chrono::Local;
use clap::Parser;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{self, Read, Write};
use std::str::FromStr;

#[derive(Parser)]
#[command(name = "cfonb_converter")]
#[command(about = "Rewrite the amounts of a CFONB payment batch at a fixed rate", long_about = None)]
struct Cli {
    /// Input file path (or stdin if not provided)
    #[arg(short, long)]
    input: Option<String>,

    /// Output file path; "-" for stdout (default: date-stamped CFONB_XPF file)
    #[arg(short, long)]
    output: Option<String>,

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

    /// Footer synthesis policy (never, when-missing, always)
    #[arg(long, default_value = "never")]
    footer: String,

    /// Override the header's originating-account field
    #[arg(long)]
    header_account: Option<String>,

    /// Also write the transfer export as CSV to this path
    #[arg(long)]
    export_csv: Option<String>,
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
    let footer = cli.footer.parse::<FooterSynthesis>()?;

    let converter = Converter::new(rate, direction, rounding, layout.amount_scale)?;
    let mut config = TranscodeConfig::new(layout, converter).with_footer(footer);
    if let Some(account) = cli.header_account {
        config = config.with_header_account(account);
    }

    let mut input = Vec::new();
    if let Some(ref input_path) = cli.input {
        File::open(input_path)?.read_to_end(&mut input)?;
    } else {
        io::stdin().read_to_end(&mut input)?;
    }

    let result = transcode(&input, config)?;

    if !result.recognized() && !result.lines.is_empty() {
        eprintln!("Warning: no recognizable CFONB record codes in the input");
    }
    if !result.violations.is_empty() {
        eprintln!("{} format violation(s):", result.violations.len());
        let mut stderr = io::stderr();
        report::render_violations(&mut stderr, &result.violations)?;
    }
    eprintln!(
        "{} transfer(s) converted, batch total {}",
        result.transfers.len(),
        result.total
    );

    match cli.output.as_deref() {
        Some("-") => io::stdout().write_all(&result.to_bytes())?,
        Some(path) => File::create(path)?.write_all(&result.to_bytes())?,
        None => {
            let path = format!("CFONB_XPF_{}.txt", Local::now().format("%Y%m%d"));
            File::create(&path)?.write_all(&result.to_bytes())?;
            eprintln!("Wrote {}", path);
        }
    }

    if let Some(ref csv_path) = cli.export_csv {
        let mut file = File::create(csv_path)?;
        report::write_export_csv(&mut file, &result.transfers)?;
    }

    Ok(())
}
