//! Amount sub-field codec for fixed-width numeric fields.
//!
//! CFONB amount fields carry a non-negative base-10 integer with no decimal
//! point, right-justified and zero-padded to the field width. Whether the
//! integer is in minor units (cents) or already in major units is a property
//! of the layout variant, resolved by the conversion step, not here.

use crate::error::{Error, Result};
use crate::layout::FieldSpec;

/// Read the amount field at `span` as a non-negative integer.
///
/// The whole span must be decimal digits. Spaces from a short line, a span
/// clipped mid-field, or a line that never matched the layout all surface as
/// [`Error::MalformedAmount`]; the caller decides whether to pass the line
/// through or flag it.
pub fn extract_amount(line: &[u8], span: &FieldSpec) -> Result<u64> {
    let field = span.slice(line);
    if field.is_empty() || !field.iter().all(u8::is_ascii_digit) {
        return Err(Error::MalformedAmount(
            String::from_utf8_lossy(field).into_owned(),
        ));
    }
    field
        .iter()
        .try_fold(0u64, |acc, b| {
            acc.checked_mul(10)?.checked_add(u64::from(b - b'0'))
        })
        .ok_or_else(|| Error::MalformedAmount(String::from_utf8_lossy(field).into_owned()))
}

/// Render `value` right-justified and zero-padded into a buffer of the
/// span's width.
///
/// Fails with [`Error::AmountOverflow`] when the value has more digits than
/// the field holds. Left-truncating would silently corrupt the magnitude,
/// so overflow is always surfaced to the caller.
pub fn format_amount(value: u64, span: &FieldSpec) -> Result<Vec<u8>> {
    let digits = value.to_string();
    if digits.len() > span.len {
        return Err(Error::AmountOverflow {
            value,
            digits: digits.len(),
            width: span.len,
        });
    }
    Ok(span.render(digits.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: usize, len: usize) -> FieldSpec {
        FieldSpec::numeric(start, len)
    }

    #[test]
    fn test_extract_zero_padded_amount() {
        let line = b"0602XX0000000010000YY";
        assert_eq!(extract_amount(line, &span(6, 13)).unwrap(), 10000);
    }

    #[test]
    fn test_extract_rejects_spaces() {
        let line = b"0602  0000000010000  ";
        let err = extract_amount(line, &span(4, 15)).unwrap_err();
        assert!(matches!(err, Error::MalformedAmount(_)));
    }

    #[test]
    fn test_extract_rejects_sign_and_separator() {
        assert!(extract_amount(b"+1234", &span(0, 5)).is_err());
        assert!(extract_amount(b"12.34", &span(0, 5)).is_err());
    }

    #[test]
    fn test_format_zero_pads_left() {
        let rendered = format_amount(11933, &span(0, 16)).unwrap();
        assert_eq!(rendered, b"0000000000011933");
    }

    #[test]
    fn test_format_exact_width() {
        let rendered = format_amount(1234567890123456, &span(0, 16)).unwrap();
        assert_eq!(rendered, b"1234567890123456");
    }

    #[test]
    fn test_format_overflow_is_an_error() {
        let err = format_amount(12345678901234567, &span(0, 16)).unwrap_err();
        assert!(matches!(
            err,
            Error::AmountOverflow { digits: 17, width: 16, .. }
        ));
    }

    #[test]
    fn test_format_zero() {
        assert_eq!(format_amount(0, &span(0, 4)).unwrap(), b"0000");
    }
}
