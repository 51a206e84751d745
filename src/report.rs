//! Control artifacts built from a transcoding run.
//!
//! The printable document and spreadsheet renderers live outside this crate;
//! they consume the transfer summaries and violations as plain structured
//! data. This module supplies the three operator-facing contracts: a tabular
//! control summary with a grand total row, a CSV export carrying the banking
//! identifiers, and an itemized violation report.

use crate::error::Result;
use crate::transcoder::{BatchResult, TransferRecord, Violation};
use csv::Writer;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// CSV export row for one transfer.
#[derive(Debug, Serialize, Deserialize)]
struct ExportRecord {
    #[serde(rename = "Bénéficiaire", alias = "Payee")]
    payee: String,
    #[serde(rename = "Code banque", alias = "Bank Code")]
    bank_code: String,
    #[serde(rename = "Code guichet", alias = "Branch Code")]
    branch_code: String,
    #[serde(rename = "Numéro de compte", alias = "Account")]
    account: String,
    #[serde(rename = "Libellé", alias = "Label")]
    label: String,
    #[serde(rename = "Montant", alias = "Amount")]
    amount: u64,
}

/// Write the control summary: one row per transfer (payee, converted
/// amount) and a grand total row, aligned for operator review.
pub fn render_summary<W: Write>(writer: &mut W, result: &BatchResult) -> Result<()> {
    writeln!(writer, "{:<32} {:>16}", "BENEFICIAIRE", "MONTANT")?;
    writeln!(writer, "{:-<32} {:-<16}", "", "")?;
    for transfer in &result.transfers {
        writeln!(writer, "{:<32} {:>16}", transfer.payee, transfer.converted)?;
    }
    writeln!(writer, "{:-<32} {:-<16}", "", "")?;
    writeln!(writer, "{:<32} {:>16}", "TOTAL", result.total)?;
    Ok(())
}

/// Write the structured CSV export: one row per transfer with the banking
/// identifiers needed downstream.
pub fn write_export_csv<W: Write>(writer: &mut W, transfers: &[TransferRecord]) -> Result<()> {
    let mut csv_writer = Writer::from_writer(writer);
    for transfer in transfers {
        csv_writer.serialize(ExportRecord {
            payee: transfer.payee.clone(),
            bank_code: transfer.bank_code.clone(),
            branch_code: transfer.branch_code.clone(),
            account: transfer.account.clone(),
            label: transfer.label.clone(),
            amount: transfer.converted,
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write the violation report, one line per violation in input order.
/// Writes nothing for a clean batch.
pub fn render_violations<W: Write>(writer: &mut W, violations: &[Violation]) -> Result<()> {
    for violation in violations {
        writeln!(
            writer,
            "line {}: {} | {}",
            violation.line,
            violation.kind,
            violation.content.trim_end()
        )?;
    }
    Ok(())
}
