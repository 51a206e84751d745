//! Record classifier and layout tables for fixed-width CFONB records.
//!
//! A CFONB file is a sequence of fixed-width lines whose meaning is determined
//! purely by character position. Each line starts with a short numeric type
//! code (`0302` batch header, `0602` transfer detail, `0802` batch total in
//! the variants observed in production). The column spans of the semantic
//! fields drifted between source systems, so every span lives in a
//! [`LayoutTable`] selected per run rather than in control flow.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Field justification inside its span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Align {
    /// Value starts at the left edge, padding fills the right.
    Left,
    /// Value ends at the right edge, padding fills the left.
    Right,
}

/// Whether a field carries free text or a numeric amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// Free text (payee name, label), space padded.
    Text,
    /// Amount in integer units, zero padded.
    Numeric,
}

/// Column span of one semantic field: offset, width, justification, pad byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Zero-based column offset.
    pub start: usize,
    /// Width in columns.
    pub len: usize,
    /// Justification inside the span.
    pub align: Align,
    /// Pad byte filling the unused columns.
    pub pad: u8,
    /// Text or numeric field.
    pub kind: FieldKind,
}

impl FieldSpec {
    /// A left-justified, space-padded text field.
    pub fn text(start: usize, len: usize) -> Self {
        Self {
            start,
            len,
            align: Align::Left,
            pad: b' ',
            kind: FieldKind::Text,
        }
    }

    /// A right-justified, zero-padded numeric field.
    pub fn numeric(start: usize, len: usize) -> Self {
        Self {
            start,
            len,
            align: Align::Right,
            pad: b'0',
            kind: FieldKind::Numeric,
        }
    }

    /// One past the last column of the span.
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// The bytes of this field within `line`.
    ///
    /// The caller guarantees the line is at least `end()` long; the
    /// transcoder pads every line to the table width before field access.
    pub fn slice<'a>(&self, line: &'a [u8]) -> &'a [u8] {
        &line[self.start..self.end()]
    }

    /// Render `value` into a buffer of exactly `len` bytes, padding or
    /// truncating per the field's justification.
    pub fn render(&self, value: &[u8]) -> Vec<u8> {
        let mut out = vec![self.pad; self.len];
        if value.len() >= self.len {
            // Truncate on the padding side so the significant end survives.
            match self.align {
                Align::Left => out.copy_from_slice(&value[..self.len]),
                Align::Right => out.copy_from_slice(&value[value.len() - self.len..]),
            }
        } else {
            match self.align {
                Align::Left => out[..value.len()].copy_from_slice(value),
                Align::Right => out[self.len - value.len()..].copy_from_slice(value),
            }
        }
        out
    }

    /// Overwrite this field's span in `line` with `value` (already rendered
    /// to exactly `len` bytes). All other columns are left untouched.
    pub fn splice(&self, line: &mut [u8], value: &[u8]) {
        debug_assert_eq!(value.len(), self.len);
        line[self.start..self.end()].copy_from_slice(value);
    }
}

/// Role a record type plays in a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordRole {
    /// Batch header, passed through (optionally with operator overrides).
    Header,
    /// Transfer detail carrying a payee and an amount.
    Detail,
    /// Batch footer whose amount must equal the sum of the details.
    Footer,
}

/// Layout of one record type: its leading code and the spans of its
/// semantic fields. Fields absent from a given type are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordLayout {
    /// Leading type code (4 characters in every observed variant).
    pub code: String,
    /// Role of this record type.
    pub role: RecordRole,
    /// Payee display name.
    pub payee: Option<FieldSpec>,
    /// Receiving bank code.
    pub bank_code: Option<FieldSpec>,
    /// Receiving branch code.
    pub branch_code: Option<FieldSpec>,
    /// Account number (originating account on the header).
    pub account: Option<FieldSpec>,
    /// Monetary amount in integer units.
    pub amount: Option<FieldSpec>,
    /// Free-text label.
    pub label: Option<FieldSpec>,
}

impl RecordLayout {
    /// Create a layout with no semantic fields.
    pub fn new(code: impl Into<String>, role: RecordRole) -> Self {
        Self {
            code: code.into(),
            role,
            payee: None,
            bank_code: None,
            branch_code: None,
            account: None,
            amount: None,
            label: None,
        }
    }

    fn spans(&self) -> impl Iterator<Item = &FieldSpec> {
        [
            &self.payee,
            &self.bank_code,
            &self.branch_code,
            &self.account,
            &self.amount,
            &self.label,
        ]
        .into_iter()
        .flatten()
    }
}

/// The layout table for one batch run: the mandated record width, the known
/// record types, and the decimal scale of the source amount fields.
///
/// Immutable configuration, loaded once per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutTable {
    /// Mandated total record width; every output line is exactly this long.
    pub width: usize,
    /// Implied decimal places of the source amount fields (2 for amounts in
    /// cents, 0 where the field already holds integer major units).
    pub amount_scale: u32,
    layouts: Vec<RecordLayout>,
}

impl LayoutTable {
    /// An empty table with the given width and amount scale.
    pub fn new(width: usize, amount_scale: u32) -> Self {
        Self {
            width,
            amount_scale,
            layouts: Vec::new(),
        }
    }

    /// Add a record layout to the table.
    pub fn with_layout(mut self, layout: RecordLayout) -> Self {
        self.layouts.push(layout);
        self
    }

    /// The configured record layouts.
    pub fn layouts(&self) -> &[RecordLayout] {
        &self.layouts
    }

    /// Check that every field span fits inside the record width.
    pub fn validate(&self) -> Result<()> {
        for layout in &self.layouts {
            for spec in layout.spans() {
                if spec.end() > self.width {
                    return Err(Error::InvalidSpan {
                        start: spec.start,
                        len: spec.len,
                        width: self.width,
                    });
                }
            }
        }
        Ok(())
    }

    /// Classify a line by its leading type code.
    ///
    /// Pure prefix lookup: among all configured codes that prefix the line,
    /// the longest code wins. Two distinct codes of equal length cannot both
    /// prefix the same line, so a tie only arises for a duplicated code (the
    /// last configured wins). `None` means the line is pass-through content
    /// with no semantic fields.
    pub fn classify(&self, line: &[u8]) -> Option<&RecordLayout> {
        self.layouts
            .iter()
            .filter(|l| line.starts_with(l.code.as_bytes()))
            .max_by_key(|l| l.code.len())
    }

    /// The header layout, if one is configured.
    pub fn header(&self) -> Option<&RecordLayout> {
        self.layouts.iter().find(|l| l.role == RecordRole::Header)
    }

    /// The footer layout, if one is configured.
    pub fn footer(&self) -> Option<&RecordLayout> {
        self.layouts.iter().find(|l| l.role == RecordRole::Footer)
    }

    /// The standard 160-column CFONB layout: amounts in cents, 16-column
    /// amount field at offset 65 on detail and total records.
    pub fn standard() -> Self {
        let header = {
            let mut l = RecordLayout::new("0302", RecordRole::Header);
            l.account = Some(FieldSpec::text(38, 11));
            l
        };
        let detail = {
            let mut l = RecordLayout::new("0602", RecordRole::Detail);
            l.payee = Some(FieldSpec::text(4, 24));
            l.bank_code = Some(FieldSpec::text(28, 5));
            l.branch_code = Some(FieldSpec::text(33, 5));
            l.account = Some(FieldSpec::text(38, 11));
            l.label = Some(FieldSpec::text(49, 16));
            l.amount = Some(FieldSpec::numeric(65, 16));
            l
        };
        let footer = {
            let mut l = RecordLayout::new("0802", RecordRole::Footer);
            l.amount = Some(FieldSpec::numeric(65, 16));
            l
        };
        Self::new(160, 2)
            .with_layout(header)
            .with_layout(detail)
            .with_layout(footer)
    }

    /// The drifted legacy variant: same record codes, but a 14-column amount
    /// field at offset 67 already denominated in integer major units.
    pub fn legacy() -> Self {
        let header = {
            let mut l = RecordLayout::new("0302", RecordRole::Header);
            l.account = Some(FieldSpec::text(38, 11));
            l
        };
        let detail = {
            let mut l = RecordLayout::new("0602", RecordRole::Detail);
            l.payee = Some(FieldSpec::text(4, 24));
            l.bank_code = Some(FieldSpec::text(28, 5));
            l.branch_code = Some(FieldSpec::text(33, 5));
            l.account = Some(FieldSpec::text(38, 11));
            l.label = Some(FieldSpec::text(49, 16));
            l.amount = Some(FieldSpec::numeric(67, 14));
            l
        };
        let footer = {
            let mut l = RecordLayout::new("0802", RecordRole::Footer);
            l.amount = Some(FieldSpec::numeric(67, 14));
            l
        };
        Self::new(160, 0)
            .with_layout(header)
            .with_layout(detail)
            .with_layout(footer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_codes() {
        let table = LayoutTable::standard();
        assert_eq!(
            table.classify(b"0602PAYEE").map(|l| l.role),
            Some(RecordRole::Detail)
        );
        assert_eq!(
            table.classify(b"0302HEADER").map(|l| l.role),
            Some(RecordRole::Header)
        );
        assert_eq!(
            table.classify(b"0802TOTAL").map(|l| l.role),
            Some(RecordRole::Footer)
        );
    }

    #[test]
    fn test_classify_unknown_is_none() {
        let table = LayoutTable::standard();
        assert!(table.classify(b"0702SOMETHING").is_none());
        assert!(table.classify(b"").is_none());
    }

    #[test]
    fn test_classify_longest_code_wins() {
        let table = LayoutTable::new(160, 2)
            .with_layout(RecordLayout::new("06", RecordRole::Header))
            .with_layout(RecordLayout::new("0602", RecordRole::Detail));
        assert_eq!(
            table.classify(b"0602X").map(|l| l.role),
            Some(RecordRole::Detail)
        );
        assert_eq!(
            table.classify(b"0601X").map(|l| l.role),
            Some(RecordRole::Header)
        );
    }

    #[test]
    fn test_validate_rejects_span_past_width() {
        let mut detail = RecordLayout::new("0602", RecordRole::Detail);
        detail.amount = Some(FieldSpec::numeric(150, 16));
        let table = LayoutTable::new(160, 2).with_layout(detail);
        assert!(matches!(
            table.validate(),
            Err(Error::InvalidSpan { start: 150, len: 16, width: 160 })
        ));
    }

    #[test]
    fn test_builtin_tables_are_valid() {
        assert!(LayoutTable::standard().validate().is_ok());
        assert!(LayoutTable::legacy().validate().is_ok());
    }

    #[test]
    fn test_render_pads_and_truncates() {
        let text = FieldSpec::text(0, 6);
        assert_eq!(text.render(b"AB"), b"AB    ");
        assert_eq!(text.render(b"ABCDEFGH"), b"ABCDEF");

        let num = FieldSpec::numeric(0, 6);
        assert_eq!(num.render(b"42"), b"000042");
    }

    #[test]
    fn test_splice_touches_only_the_span() {
        let spec = FieldSpec::numeric(2, 4);
        let mut line = b"AABBBBCC".to_vec();
        spec.splice(&mut line, b"1234");
        assert_eq!(line, b"AA1234CC");
    }
}
