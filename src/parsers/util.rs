//! Locale normalization shared by all strategies: Czech sources write
//! amounts with a decimal comma, spaces or dots for thousands and an
//! optional currency suffix, and dates in several per-institution formats.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::errors::{ExtractError, ExtractResult};

/// Normalizes a locale amount string and coerces it to a decimal.
///
/// Accepts `"1 234,56"`, `"1.234,56 CZK"`, `"-150,00"` and the like. A
/// string that still fails to parse after normalization is a fatal
/// extraction error, not a record to be silently skipped.
pub(crate) fn parse_price(raw: &str) -> ExtractResult<Decimal> {
    let mut cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != ' ' && *c != '\u{a0}')
        .collect();

    // currency suffix ("CZK", "Kč.") glued on after space removal
    while cleaned
        .chars()
        .last()
        .is_some_and(|c| c.is_alphabetic() || c == '.')
    {
        // a trailing dot only goes when it is not a decimal separator
        if cleaned.ends_with('.') && !cleaned.chars().rev().skip(1).any(|c| c.is_alphabetic()) {
            break;
        }
        cleaned.pop();
    }

    if cleaned.contains(',') {
        if cleaned.contains('.') {
            // dot is a thousands separator here
            cleaned = cleaned.replace('.', "");
        }
        cleaned = cleaned.replace(',', ".");
    }

    if cleaned.is_empty() {
        return Err(ExtractError::InvalidAmount(raw.to_string()));
    }

    Decimal::from_str(&cleaned).map_err(|_| ExtractError::InvalidAmount(raw.to_string()))
}

/// Strict Czech datetime, `15.03.2024 10:22` style. Callers fall back to
/// the message's own timestamp when this returns `None`.
pub(crate) fn czech_datetime(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), "%d.%m.%Y %H:%M").ok()
}

/// Export-row date in the institution's fixed format, carried at midnight.
/// Rows have no message timestamp to fall back to, so failure is fatal.
pub(crate) fn row_date(raw: &str, format: &str) -> ExtractResult<NaiveDateTime> {
    NaiveDate::parse_from_str(raw.trim(), format)
        .map(|date| date.and_time(NaiveTime::MIN))
        .map_err(|_| ExtractError::InvalidDate(raw.to_string()))
}

/// Trims a field and drops it entirely when nothing is left.
pub(crate) fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Variable symbols are stored without their leading zeros.
pub(crate) fn strip_leading_zeros(raw: &str) -> &str {
    raw.trim_start_matches('0')
}

/// Everything after the `Label:` prefix of a line, colons inside the value
/// preserved.
pub(crate) fn after_label(line: &str) -> String {
    line.split(':').skip(1).collect::<Vec<_>>().join(" ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;

    #[rstest]
    #[case("150,00", "150.00")]
    #[case("-150,00", "-150.00")]
    #[case("1 234,56", "1234.56")]
    #[case("1.234,56", "1234.56")]
    #[case("1234,56 CZK", "1234.56")]
    #[case("500,00 Kč.", "500.00")]
    #[case("42", "42")]
    #[case("3.14", "3.14")]
    fn test_parse_price(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(
            parse_price(raw).unwrap(),
            Decimal::from_str(expected).unwrap()
        );
    }

    // numeric round-trip: "<digits>,<digits>" equals the same digits
    // joined with a point
    #[rstest]
    #[case("0,01")]
    #[case("987,65")]
    #[case("12345,00")]
    fn test_parse_price_round_trip(#[case] raw: &str) {
        let with_point = raw.replace(',', ".");
        assert_eq!(
            parse_price(&format!("{raw} CZK")).unwrap(),
            Decimal::from_str(&with_point).unwrap()
        );
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("abc")]
    #[case("12,34,56")]
    fn test_parse_price_invalid(#[case] raw: &str) {
        assert!(matches!(
            parse_price(raw),
            Err(ExtractError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_czech_datetime() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(10, 22, 0)
            .unwrap();
        assert_eq!(czech_datetime("15.03.2024 10:22"), Some(expected));
        assert_eq!(czech_datetime("2024-03-15"), None);
        assert_eq!(czech_datetime("garbage"), None);
    }

    #[rstest]
    #[case("15.03.2024", "%d.%m.%Y")]
    #[case("15-03-2024", "%d-%m-%Y")]
    #[case("2024-03-15", "%Y-%m-%d")]
    fn test_row_date_formats(#[case] raw: &str, #[case] format: &str) {
        let parsed = row_date(raw, format).unwrap();
        assert_eq!(parsed.date(), NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(parsed.time(), NaiveTime::MIN);
    }

    #[test]
    fn test_row_date_invalid_is_fatal() {
        assert!(matches!(
            row_date("15.03.2024", "%Y-%m-%d"),
            Err(ExtractError::InvalidDate(_))
        ));
    }

    #[rstest]
    #[case("00001234", "1234")]
    #[case("308", "308")]
    #[case("0000", "")]
    fn test_strip_leading_zeros(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(strip_leading_zeros(raw), expected);
    }

    #[rstest]
    #[case("Castka: 500,00 CZK", "500,00 CZK")]
    #[case("Dne: 15.03.2024 10:22", "15.03.2024 10:22")]
    #[case("Zprava: najem: brezen", "najem  brezen")]
    #[case("no label here", "")]
    fn test_after_label(#[case] line: &str, #[case] expected: &str) {
        assert_eq!(after_label(line), expected);
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty("  x "), Some("x".to_string()));
        assert_eq!(non_empty("   "), None);
        assert_eq!(non_empty(""), None);
    }
}
