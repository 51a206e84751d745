//! Batch transcoder: rewrites the amount field of every transfer record and
//! keeps the batch total in lock-step with the per-line edits.
//!
//! Lines are processed as raw byte sequences. CFONB predates UTF-8 and payee
//! names may carry accented characters in Latin-1; working on bytes keeps
//! every column the transcoder does not touch byte-identical in the output.
//! Decoding to `String` happens only for the display fields of summary and
//! violation records.
//!
//! A [`BatchTranscoder`] owns all of its state exclusively. Per-line failures
//! never abort the batch: they are recorded as [`Violation`]s, the line is
//! passed through unmodified, and processing continues, so the operator
//! always gets a complete output file plus an itemized violation report.

use crate::amount::{extract_amount, format_amount};
use crate::currency::Converter;
use crate::error::{Error, Result};
use crate::layout::{FieldSpec, LayoutTable, RecordRole};
use std::fmt;
use std::str::FromStr;

/// When a footer record is synthesized for a batch that lacked one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FooterSynthesis {
    /// Never synthesize; the input's footers (if any) are still rewritten.
    #[default]
    Never,
    /// Synthesize when the input had no footer, unless the batch is empty.
    WhenMissing,
    /// Synthesize when the input had no footer, even for an empty batch.
    Always,
}

impl FromStr for FooterSynthesis {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "never" => Ok(FooterSynthesis::Never),
            "when-missing" | "missing" => Ok(FooterSynthesis::WhenMissing),
            "always" => Ok(FooterSynthesis::Always),
            _ => Err(Error::InvalidFooterPolicy(s.to_string())),
        }
    }
}

/// Configuration for one transcoding run.
#[derive(Debug, Clone)]
pub struct TranscodeConfig {
    /// Record width, type codes, and field spans.
    pub layout: LayoutTable,
    /// Fixed-rate conversion applied to every detail amount.
    pub converter: Converter,
    /// Footer synthesis policy.
    pub footer: FooterSynthesis,
    /// Operator-supplied override of the header's originating-account field.
    /// Applied only when set; headers are otherwise passed through verbatim.
    pub header_account: Option<String>,
}

impl TranscodeConfig {
    /// Configuration with no footer synthesis and no header override.
    pub fn new(layout: LayoutTable, converter: Converter) -> Self {
        Self {
            layout,
            converter,
            footer: FooterSynthesis::default(),
            header_account: None,
        }
    }

    /// Set the footer synthesis policy.
    pub fn with_footer(mut self, footer: FooterSynthesis) -> Self {
        self.footer = footer;
        self
    }

    /// Override the header's originating-account field.
    pub fn with_header_account(mut self, account: impl Into<String>) -> Self {
        self.header_account = Some(account.into());
        self
    }
}

/// Parsed view of one transfer detail line, for the control summary and the
/// structured export. Transient per batch run.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRecord {
    /// 1-based input line number.
    pub line: usize,
    /// Payee display name.
    pub payee: String,
    /// Receiving bank code.
    pub bank_code: String,
    /// Receiving branch code.
    pub branch_code: String,
    /// Account number.
    pub account: String,
    /// Free-text label.
    pub label: String,
    /// Amount as read from the source field, in source field units.
    pub source_units: u64,
    /// Converted amount in integer target units.
    pub converted: u64,
}

/// What went wrong on a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    /// Line length differed from the configured record width.
    Width { expected: usize, actual: usize },
    /// Amount sub-field was not a run of decimal digits.
    MalformedAmount,
    /// Converted amount had more digits than the destination field.
    AmountOverflow {
        value: u64,
        digits: usize,
        width: usize,
    },
    /// Conversion result, or the running batch total after adding it, did
    /// not fit in an integer.
    AmountOutOfRange { source_units: u64 },
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::Width { expected, actual } => {
                write!(f, "expected {} columns, found {}", expected, actual)
            }
            ViolationKind::MalformedAmount => write!(f, "amount field is not numeric"),
            ViolationKind::AmountOverflow {
                value,
                digits,
                width,
            } => write!(
                f,
                "converted amount {} needs {} digits but the field is {} wide",
                value, digits, width
            ),
            ViolationKind::AmountOutOfRange { source_units } => {
                write!(f, "amount out of integer range for {} source units", source_units)
            }
        }
    }
}

/// A recorded format violation: line number, what was wrong, raw content.
/// Violations are reported, never fatal.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// 1-based input line number (one past the last input line for a
    /// violation raised while synthesizing the footer).
    pub line: usize,
    /// What was wrong.
    pub kind: ViolationKind,
    /// The offending line, Latin-1 decoded.
    pub content: String,
}

/// Everything one transcoding run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult {
    /// Rewritten lines, in input order, each exactly the configured width.
    pub lines: Vec<Vec<u8>>,
    /// One record per successfully converted detail line, in input order.
    pub transfers: Vec<TransferRecord>,
    /// Format violations, in input order.
    pub violations: Vec<Violation>,
    /// Sum of all converted detail amounts; equals the footer amount.
    pub total: u64,
    /// Number of lines that matched a configured record type.
    pub recognized_lines: usize,
    /// Whether the output should end with a newline, mirroring the input.
    pub trailing_newline: bool,
}

impl BatchResult {
    /// Whether any line matched a configured record type. `false` means the
    /// input was probably not CFONB at all, which callers should surface as
    /// a warning; an empty or all-pass-through batch is still a valid result.
    pub fn recognized(&self) -> bool {
        self.recognized_lines > 0
    }

    /// The rewritten file: lines joined with `\n`, same encoding as the
    /// input, trailing newline preserved.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                out.push(b'\n');
            }
            out.extend_from_slice(line);
        }
        if self.trailing_newline && !self.lines.is_empty() {
            out.push(b'\n');
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    AwaitingHeader,
    InBatch,
    Completed,
}

/// Outcome of converting one detail line's amount span.
struct DetailConversion {
    source_units: u64,
    converted: u64,
}

/// One transcoding run. Feed lines with [`push_line`](Self::push_line), then
/// call [`finish`](Self::finish) to fix up footers and take the result.
///
/// All state is owned exclusively by the run; abandoning a transcoder
/// mid-sequence leaves nothing shared to corrupt.
#[derive(Debug)]
pub struct BatchTranscoder {
    config: TranscodeConfig,
    state: State,
    line_no: usize,
    lines: Vec<Vec<u8>>,
    transfers: Vec<TransferRecord>,
    violations: Vec<Violation>,
    total: u64,
    recognized: usize,
    /// Output index and input line number of every footer seen.
    footers: Vec<(usize, usize)>,
}

impl BatchTranscoder {
    /// Start a run. Fails if a configured field span does not fit inside the
    /// record width.
    pub fn new(config: TranscodeConfig) -> Result<Self> {
        config.layout.validate()?;
        if let (Some(account), Some(span)) = (
            &config.header_account,
            config.layout.header().and_then(|l| l.account),
        ) {
            // A truncated account override would corrupt a banking
            // identifier; refuse it up front.
            if account.len() > span.len {
                return Err(Error::HeaderOverrideTooLong {
                    value: account.clone(),
                    len: account.len(),
                    width: span.len,
                });
            }
        }
        Ok(Self {
            config,
            state: State::AwaitingHeader,
            line_no: 0,
            lines: Vec::new(),
            transfers: Vec::new(),
            violations: Vec::new(),
            total: 0,
            recognized: 0,
            footers: Vec::new(),
        })
    }

    /// Process one input line.
    pub fn push_line(&mut self, raw: &[u8]) {
        self.line_no += 1;
        let width = self.config.layout.width;

        let mut line = raw.to_vec();
        if line.len() != width {
            self.violations.push(Violation {
                line: self.line_no,
                kind: ViolationKind::Width {
                    expected: width,
                    actual: line.len(),
                },
                content: decode_latin1(raw),
            });
            line.resize(width, b' ');
        }

        let layout = self.config.layout.classify(&line).cloned();

        if let Some(ref l) = layout {
            self.recognized += 1;
            if self.state == State::AwaitingHeader && l.role != RecordRole::Header {
                self.state = State::InBatch;
            }
        } else if self.state == State::AwaitingHeader {
            self.state = State::InBatch;
        }

        match layout {
            Some(ref l) if l.role == RecordRole::Detail => {
                if let Some(span) = l.amount {
                    match self.convert_detail(&mut line, &span) {
                        Ok(outcome) => {
                            self.total += outcome.converted;
                            self.transfers.push(TransferRecord {
                                line: self.line_no,
                                payee: field_text(&line, l.payee),
                                bank_code: field_text(&line, l.bank_code),
                                branch_code: field_text(&line, l.branch_code),
                                account: field_text(&line, l.account),
                                label: field_text(&line, l.label),
                                source_units: outcome.source_units,
                                converted: outcome.converted,
                            });
                        }
                        Err(kind) => self.violations.push(Violation {
                            line: self.line_no,
                            kind,
                            content: decode_latin1(raw),
                        }),
                    }
                }
            }
            Some(ref l) if l.role == RecordRole::Footer => {
                // The input total reflects the source currency and is not
                // trusted; the amount span is overwritten at finish.
                self.footers.push((self.lines.len(), self.line_no));
            }
            Some(ref l) if l.role == RecordRole::Header => {
                if let (Some(account), Some(span)) = (&self.config.header_account, l.account) {
                    let rendered = span.render(account.as_bytes());
                    span.splice(&mut line, &rendered);
                }
            }
            _ => {}
        }

        self.lines.push(line);
    }

    /// Convert the amount span of a detail line in place. Checks that the
    /// running total can absorb the converted amount before touching the
    /// line, so on any failure the line is left exactly as the
    /// (width-enforced) input and the failure is reported as a violation
    /// kind.
    fn convert_detail(
        &self,
        line: &mut [u8],
        span: &FieldSpec,
    ) -> std::result::Result<DetailConversion, ViolationKind> {
        let source_units =
            extract_amount(line, span).map_err(|_| ViolationKind::MalformedAmount)?;
        let converted =
            self.config
                .converter
                .convert(source_units)
                .map_err(|_| ViolationKind::AmountOutOfRange { source_units })?;
        // Refuse a line that would wrap the running total; the footer must
        // carry the exact sum of the converted details.
        if self.total.checked_add(converted).is_none() {
            return Err(ViolationKind::AmountOutOfRange { source_units });
        }
        match format_amount(converted, span) {
            Ok(rendered) => {
                span.splice(line, &rendered);
                Ok(DetailConversion {
                    source_units,
                    converted,
                })
            }
            Err(Error::AmountOverflow {
                value,
                digits,
                width,
            }) => Err(ViolationKind::AmountOverflow {
                value,
                digits,
                width,
            }),
            Err(_) => Err(ViolationKind::MalformedAmount),
        }
    }

    /// Finish the run: write the accumulated total into every footer seen,
    /// synthesize a footer if policy demands one, and hand back the result.
    pub fn finish(mut self) -> BatchResult {
        self.state = State::Completed;

        let footer_layout = self.config.layout.footer().cloned();
        let saw_footer = !self.footers.is_empty();

        for (index, line_no) in std::mem::take(&mut self.footers) {
            let Some(span) = footer_layout.as_ref().and_then(|l| l.amount) else {
                continue;
            };
            match format_amount(self.total, &span) {
                Ok(rendered) => span.splice(&mut self.lines[index], &rendered),
                Err(Error::AmountOverflow {
                    value,
                    digits,
                    width,
                }) => self.violations.push(Violation {
                    line: line_no,
                    kind: ViolationKind::AmountOverflow {
                        value,
                        digits,
                        width,
                    },
                    content: decode_latin1(&self.lines[index]),
                }),
                Err(_) => {}
            }
        }

        let synthesize = match self.config.footer {
            FooterSynthesis::Never => false,
            FooterSynthesis::WhenMissing => !saw_footer && !self.lines.is_empty(),
            FooterSynthesis::Always => !saw_footer,
        };
        if synthesize {
            if let Some(layout) = footer_layout {
                let mut line = vec![b' '; self.config.layout.width];
                line[..layout.code.len()].copy_from_slice(layout.code.as_bytes());
                if let Some(span) = layout.amount {
                    match format_amount(self.total, &span) {
                        Ok(rendered) => span.splice(&mut line, &rendered),
                        Err(Error::AmountOverflow {
                            value,
                            digits,
                            width,
                        }) => self.violations.push(Violation {
                            line: self.line_no + 1,
                            kind: ViolationKind::AmountOverflow {
                                value,
                                digits,
                                width,
                            },
                            content: decode_latin1(&line),
                        }),
                        Err(_) => {}
                    }
                }
                self.lines.push(line);
            }
        }

        // Footer violations were raised above, after the per-line ones;
        // restore input-line order for reporting.
        self.violations.sort_by_key(|v| v.line);

        BatchResult {
            lines: self.lines,
            transfers: self.transfers,
            violations: self.violations,
            total: self.total,
            recognized_lines: self.recognized,
            trailing_newline: false,
        }
    }
}

/// Transcode a whole input blob.
///
/// Splits on `\n` (a trailing `\r` per line is treated as part of the line
/// separator), runs every line through a [`BatchTranscoder`], and records in
/// the result whether the input ended with a newline so
/// [`BatchResult::to_bytes`] can mirror it.
pub fn transcode(input: &[u8], config: TranscodeConfig) -> Result<BatchResult> {
    let mut transcoder = BatchTranscoder::new(config)?;
    let trailing_newline = input.last() == Some(&b'\n');

    if !input.is_empty() {
        let mut segments: Vec<&[u8]> = input.split(|&b| b == b'\n').collect();
        if trailing_newline {
            segments.pop();
        }
        for segment in segments {
            let line = segment.strip_suffix(b"\r").unwrap_or(segment);
            transcoder.push_line(line);
        }
    }

    let mut result = transcoder.finish();
    result.trailing_newline = trailing_newline;
    Ok(result)
}

/// Decode a Latin-1 byte sequence; every byte maps to the code point of the
/// same value, so this never fails.
pub(crate) fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Trimmed Latin-1 text of an optional field.
fn field_text(line: &[u8], spec: Option<FieldSpec>) -> String {
    spec.map(|s| decode_latin1(s.slice(line)).trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::{RateDirection, RoundingPolicy, EUR_XPF_RATE};
    use crate::layout::RecordLayout;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    fn eur_xpf_converter() -> Converter {
        let rate: Decimal = EUR_XPF_RATE.parse().unwrap();
        Converter::new(rate, RateDirection::Multiply, RoundingPolicy::RoundNearest, 2).unwrap()
    }

    fn config() -> TranscodeConfig {
        TranscodeConfig::new(LayoutTable::standard(), eur_xpf_converter())
    }

    /// A 160-column detail line in the standard layout.
    fn detail_line(payee: &str, amount: &str) -> Vec<u8> {
        let mut line = vec![b' '; 160];
        line[..4].copy_from_slice(b"0602");
        line[4..4 + payee.len()].copy_from_slice(payee.as_bytes());
        line[28..33].copy_from_slice(b"12345");
        line[33..38].copy_from_slice(b"67890");
        line[38..49].copy_from_slice(b"00012345678");
        line[49..49 + 7].copy_from_slice(b"SALAIRE");
        assert_eq!(amount.len(), 16);
        line[65..81].copy_from_slice(amount.as_bytes());
        line
    }

    fn footer_line(amount: &str) -> Vec<u8> {
        let mut line = vec![b' '; 160];
        line[..4].copy_from_slice(b"0802");
        line[65..81].copy_from_slice(amount.as_bytes());
        line
    }

    fn header_line() -> Vec<u8> {
        let mut line = vec![b' '; 160];
        line[..4].copy_from_slice(b"0302");
        line[38..49].copy_from_slice(b"00099999999");
        line
    }

    fn join(lines: &[Vec<u8>]) -> Vec<u8> {
        let mut out = Vec::new();
        for (i, l) in lines.iter().enumerate() {
            if i > 0 {
                out.push(b'\n');
            }
            out.extend_from_slice(l);
        }
        out
    }

    #[test]
    fn test_peg_scenario_rewrites_only_the_amount_span() {
        // 100.00 EUR at 119.3317, round-nearest -> 11933 XPF
        let input = detail_line("DUPONT JEAN", "0000000000010000");
        let result = transcode(&join(&[input.clone()]), config()).unwrap();

        assert_eq!(result.transfers.len(), 1);
        assert_eq!(result.transfers[0].converted, 11_933);
        assert_eq!(&result.lines[0][65..81], b"0000000000011933");
        // every other column is byte-identical
        assert_eq!(&result.lines[0][..65], &input[..65]);
        assert_eq!(&result.lines[0][81..], &input[81..]);
        assert!(result.violations.is_empty());
    }

    #[test]
    fn test_footer_equals_sum_of_details() {
        let input = join(&[
            header_line(),
            detail_line("DUPONT JEAN", "0000000000010000"),
            detail_line("MARTIN MARIE", "0000000000025050"),
            footer_line("0000000000035050"),
        ]);
        let result = transcode(&input, config()).unwrap();

        let sum: u64 = result.transfers.iter().map(|t| t.converted).sum();
        assert_eq!(result.total, sum);
        let expected = format!("{:016}", sum);
        assert_eq!(&result.lines[3][65..81], expected.as_bytes());
    }

    #[test]
    fn test_stale_input_footer_is_discarded() {
        // Input footer carries a total in the source currency; the output
        // footer must carry the accumulated converted sum instead.
        let input = join(&[
            detail_line("DUPONT JEAN", "0000000000010000"),
            footer_line("0000000000010000"),
        ]);
        let result = transcode(&input, config()).unwrap();

        assert_eq!(result.total, 11_933);
        assert_eq!(&result.lines[1][65..81], b"0000000000011933");
    }

    #[test]
    fn test_malformed_amount_passes_through_and_flags() {
        let mut bad = detail_line("BROKEN PAYEE", "0000000000010000");
        bad[70..75].copy_from_slice(b"     ");
        let good = detail_line("GOOD PAYEE", "0000000000020000");
        let input = join(&[bad.clone(), good]);
        let result = transcode(&input, config()).unwrap();

        assert_eq!(result.lines[0], bad);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].line, 1);
        assert_eq!(result.violations[0].kind, ViolationKind::MalformedAmount);
        // the batch completed and the other line converted normally
        assert_eq!(result.transfers.len(), 1);
        assert_eq!(result.transfers[0].converted, 23_866);
        assert_eq!(result.total, 23_866);
    }

    #[test]
    fn test_unrecognized_line_is_byte_identical() {
        let mut line = vec![b'X'; 160];
        line[..4].copy_from_slice(b"0999");
        let result = transcode(&join(&[line.clone()]), config()).unwrap();

        assert_eq!(result.lines[0], line);
        assert!(result.violations.is_empty());
        assert!(!result.recognized());
    }

    #[test]
    fn test_width_enforced_on_every_output_line() {
        let short = b"0999 short line".to_vec();
        let long = vec![b'Y'; 200];
        let result = transcode(&join(&[short, long]), config()).unwrap();

        for line in &result.lines {
            assert_eq!(line.len(), 160);
        }
        assert_eq!(result.violations.len(), 2);
        assert_eq!(
            result.violations[0].kind,
            ViolationKind::Width { expected: 160, actual: 15 }
        );
        assert_eq!(
            result.violations[1].kind,
            ViolationKind::Width { expected: 160, actual: 200 }
        );
    }

    #[test]
    fn test_short_detail_line_yields_malformed_amount() {
        // Truncated mid-field: the amount span reads the space padding.
        let truncated = detail_line("DUPONT JEAN", "0000000000010000")[..70].to_vec();
        let result = transcode(&join(&[truncated]), config()).unwrap();

        let kinds: Vec<_> = result.violations.iter().map(|v| v.kind.clone()).collect();
        assert!(kinds.contains(&ViolationKind::Width { expected: 160, actual: 70 }));
        assert!(kinds.contains(&ViolationKind::MalformedAmount));
        assert!(result.transfers.is_empty());
    }

    #[test]
    fn test_overflow_is_flagged_never_truncated() {
        // 14-digit legacy field, major units: huge source amounts overflow.
        let mut line = vec![b' '; 160];
        line[..4].copy_from_slice(b"0602");
        line[4..10].copy_from_slice(b"DUPONT");
        line[67..81].copy_from_slice(b"99999999999999");
        let rate: Decimal = EUR_XPF_RATE.parse().unwrap();
        let converter =
            Converter::new(rate, RateDirection::Multiply, RoundingPolicy::RoundNearest, 0)
                .unwrap();
        let config = TranscodeConfig::new(LayoutTable::legacy(), converter);
        let result = transcode(&join(&[line.clone()]), config).unwrap();

        assert_eq!(result.lines[0], line);
        assert_eq!(result.transfers.len(), 0);
        assert_eq!(result.total, 0);
        assert!(matches!(
            result.violations[0].kind,
            ViolationKind::AmountOverflow { width: 14, .. }
        ));
    }

    #[test]
    fn test_empty_input_yields_empty_result() {
        let result = transcode(b"", config()).unwrap();

        assert!(result.lines.is_empty());
        assert!(result.transfers.is_empty());
        assert!(result.violations.is_empty());
        assert_eq!(result.total, 0);
        assert!(result.to_bytes().is_empty());
    }

    #[test]
    fn test_footer_synthesis_when_missing() {
        let input = join(&[detail_line("DUPONT JEAN", "0000000000010000")]);
        let cfg = config().with_footer(FooterSynthesis::WhenMissing);
        let result = transcode(&input, cfg).unwrap();

        assert_eq!(result.lines.len(), 2);
        assert!(result.lines[1].starts_with(b"0802"));
        assert_eq!(&result.lines[1][65..81], b"0000000000011933");

        // but never for an empty batch
        let cfg = config().with_footer(FooterSynthesis::WhenMissing);
        let empty = transcode(b"", cfg).unwrap();
        assert!(empty.lines.is_empty());
    }

    #[test]
    fn test_footer_synthesis_always_covers_empty_batch() {
        let cfg = config().with_footer(FooterSynthesis::Always);
        let result = transcode(b"", cfg).unwrap();

        assert_eq!(result.lines.len(), 1);
        assert!(result.lines[0].starts_with(b"0802"));
        assert_eq!(&result.lines[0][65..81], b"0000000000000000");
    }

    #[test]
    fn test_no_footer_synthesized_by_default() {
        let input = join(&[detail_line("DUPONT JEAN", "0000000000010000")]);
        let result = transcode(&input, config()).unwrap();
        assert_eq!(result.lines.len(), 1);
    }

    #[test]
    fn test_existing_footer_is_not_duplicated() {
        let input = join(&[
            detail_line("DUPONT JEAN", "0000000000010000"),
            footer_line("0000000000000000"),
        ]);
        let cfg = config().with_footer(FooterSynthesis::WhenMissing);
        let result = transcode(&input, cfg).unwrap();
        assert_eq!(result.lines.len(), 2);
    }

    #[test]
    fn test_header_passes_through_unless_overridden() {
        let header = header_line();
        let result = transcode(&join(&[header.clone()]), config()).unwrap();
        assert_eq!(result.lines[0], header);

        let cfg = config().with_header_account("00011122233");
        let result = transcode(&join(&[header.clone()]), cfg).unwrap();
        assert_eq!(&result.lines[0][38..49], b"00011122233");
        assert_eq!(&result.lines[0][..38], &header[..38]);
        assert_eq!(&result.lines[0][49..], &header[49..]);
    }

    #[test]
    fn test_latin1_payee_preserved_and_decoded() {
        // "DESIR\xC9" is DESIRÉ in Latin-1
        let mut line = detail_line("DESIR", "0000000000010000");
        line[9] = 0xC9;
        let result = transcode(&join(&[line.clone()]), config()).unwrap();

        assert_eq!(result.lines[0][9], 0xC9);
        assert_eq!(result.transfers[0].payee, "DESIRÉ");
    }

    #[test]
    fn test_transfer_record_carries_banking_identifiers() {
        let input = join(&[detail_line("DUPONT JEAN", "0000000000010000")]);
        let result = transcode(&input, config()).unwrap();

        let record = &result.transfers[0];
        assert_eq!(record.line, 1);
        assert_eq!(record.payee, "DUPONT JEAN");
        assert_eq!(record.bank_code, "12345");
        assert_eq!(record.branch_code, "67890");
        assert_eq!(record.account, "00012345678");
        assert_eq!(record.label, "SALAIRE");
        assert_eq!(record.source_units, 10_000);
    }

    #[test]
    fn test_trailing_newline_mirrored() {
        let mut input = join(&[detail_line("DUPONT JEAN", "0000000000010000")]);
        input.push(b'\n');
        let result = transcode(&input, config()).unwrap();
        assert_eq!(result.to_bytes().last(), Some(&b'\n'));

        let no_newline = join(&[detail_line("DUPONT JEAN", "0000000000010000")]);
        let result = transcode(&no_newline, config()).unwrap();
        assert_ne!(result.to_bytes().last(), Some(&b'\n'));
    }

    #[test]
    fn test_batch_total_overflow_is_flagged_not_wrapped() {
        // Two details whose converted amounts each fit their field but whose
        // sum exceeds u64: the second line must surface a violation and pass
        // through, never wrap the accumulator.
        let mut detail = RecordLayout::new("0602", RecordRole::Detail);
        detail.payee = Some(FieldSpec::text(4, 24));
        detail.amount = Some(FieldSpec::numeric(30, 20));
        let table = LayoutTable::new(60, 0).with_layout(detail);
        let converter = Converter::new(
            Decimal::ONE,
            RateDirection::Multiply,
            RoundingPolicy::RoundNearest,
            0,
        )
        .unwrap();
        let config = TranscodeConfig::new(table, converter);

        let mut line = vec![b' '; 60];
        line[..4].copy_from_slice(b"0602");
        line[30..50].copy_from_slice(b"18446744073709551615");
        let input = join(&[line.clone(), line.clone()]);
        let result = transcode(&input, config).unwrap();

        assert_eq!(result.transfers.len(), 1);
        assert_eq!(result.total, u64::MAX);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].line, 2);
        assert_eq!(
            result.violations[0].kind,
            ViolationKind::AmountOutOfRange { source_units: u64::MAX }
        );
        assert_eq!(result.lines[1], line);
    }

    #[test]
    fn test_violations_sorted_by_input_line() {
        // A footer overflow is only detected at finish; it must still be
        // reported in input-line order relative to later per-line violations.
        let mut detail = RecordLayout::new("0602", RecordRole::Detail);
        detail.amount = Some(FieldSpec::numeric(10, 20));
        let mut footer = RecordLayout::new("0802", RecordRole::Footer);
        footer.amount = Some(FieldSpec::numeric(10, 4));
        let table = LayoutTable::new(40, 0)
            .with_layout(detail)
            .with_layout(footer);
        let converter = Converter::new(
            Decimal::ONE,
            RateDirection::Multiply,
            RoundingPolicy::RoundNearest,
            0,
        )
        .unwrap();
        let config = TranscodeConfig::new(table, converter);

        let mut detail_line = vec![b' '; 40];
        detail_line[..4].copy_from_slice(b"0602");
        detail_line[10..30].copy_from_slice(b"00000000000000099999");
        let mut footer_line = vec![b' '; 40];
        footer_line[..4].copy_from_slice(b"0802");
        let short_line = b"0999 short".to_vec();
        let input = join(&[detail_line, footer_line, short_line]);
        let result = transcode(&input, config).unwrap();

        let lines: Vec<usize> = result.violations.iter().map(|v| v.line).collect();
        assert_eq!(lines, vec![2, 3]);
        assert!(matches!(
            result.violations[0].kind,
            ViolationKind::AmountOverflow { value: 99_999, digits: 5, width: 4 }
        ));
        assert!(matches!(
            result.violations[1].kind,
            ViolationKind::Width { expected: 40, actual: 10 }
        ));
    }

    #[test]
    fn test_header_override_wider_than_field_is_rejected() {
        // 12 characters into the 11-column originating-account field.
        let cfg = config().with_header_account("123456789012");
        let err = transcode(&join(&[header_line()]), cfg).unwrap_err();
        assert!(matches!(
            err,
            Error::HeaderOverrideTooLong { len: 12, width: 11, .. }
        ));
    }

    #[test]
    fn test_crlf_input_accepted() {
        let mut input = join(&[detail_line("DUPONT JEAN", "0000000000010000")]);
        input.extend_from_slice(b"\r\n");
        let result = transcode(&input, config()).unwrap();

        assert!(result.violations.is_empty());
        assert_eq!(result.transfers.len(), 1);
    }
}
