//! Date/time normalization
//!
//! Upstream sources do not agree on one date encoding. Tokens are tried
//! against an ordered list of strategies and the first one that yields a
//! valid calendar date wins. The compact day-month-year form always goes
//! first, and every separated fallback that is not year-first reads the
//! token day-first, so a token is never read month-first.

use chrono::NaiveDate;

use crate::domain::ForecastError;

/// A single way of reading a date token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStrategy {
    /// `DDMMYYYY`, e.g. `25092025`. Seven digits are read as a compact
    /// token that lost its leading zero when stored as a number.
    CompactDayMonthYear,
    /// `YYYY-MM-DD`, optionally followed by a time part
    IsoCalendar,
    /// `YYYY/MM/DD` or `YYYY.MM.DD`
    YearFirst,
    /// `DD/MM/YYYY`, `DD-MM-YYYY` or `DD.MM.YYYY`
    DayFirst,
}

impl DateStrategy {
    /// Strategies in the order they are attempted
    pub const ORDER: [DateStrategy; 4] = [
        DateStrategy::CompactDayMonthYear,
        DateStrategy::IsoCalendar,
        DateStrategy::YearFirst,
        DateStrategy::DayFirst,
    ];

    pub fn parse(self, token: &str) -> Option<NaiveDate> {
        match self {
            Self::CompactDayMonthYear => parse_compact(token),
            Self::IsoCalendar => parse_iso(token),
            Self::YearFirst => parse_with_formats(token, &["%Y/%m/%d", "%Y.%m.%d"]),
            Self::DayFirst => parse_with_formats(token, &["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"]),
        }
    }
}

fn parse_compact(token: &str) -> Option<NaiveDate> {
    if !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let padded;
    let digits = match token.len() {
        8 => token,
        7 => {
            padded = format!("0{token}");
            padded.as_str()
        }
        _ => return None,
    };
    let day = digits[0..2].parse().ok()?;
    let month = digits[2..4].parse().ok()?;
    let year = digits[4..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_iso(token: &str) -> Option<NaiveDate> {
    let date_part = token.get(..10)?;
    let rest = &token[10..];
    if !(rest.is_empty() || rest.starts_with('T') || rest.starts_with(' ')) {
        return None;
    }
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

fn parse_with_formats(token: &str, formats: &[&str]) -> Option<NaiveDate> {
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(token, fmt).ok())
}

/// Parse a date token, trying each [`DateStrategy`] in order
pub fn parse_date(token: &str) -> Result<NaiveDate, ForecastError> {
    let token = token.trim();
    DateStrategy::ORDER
        .iter()
        .find_map(|strategy| strategy.parse(token))
        .ok_or_else(|| ForecastError::DateFormat(token.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_compact_token() {
        assert_eq!(parse_date("25092025").unwrap(), ymd(2025, 9, 25));
    }

    #[test]
    fn test_iso_fallback_matches_compact() {
        assert_eq!(parse_date("2025-09-25").unwrap(), parse_date("25092025").unwrap());
    }

    #[test]
    fn test_compact_token_prefers_day_first() {
        // 01022025 is 1 Feb, never 2 Jan
        assert_eq!(parse_date("01022025").unwrap(), ymd(2025, 2, 1));
    }

    #[test]
    fn test_seven_digit_token_restores_leading_zero() {
        assert_eq!(parse_date("1092025").unwrap(), ymd(2025, 9, 1));
    }

    #[rstest]
    #[case("2025-09-25T13:00:00", ymd(2025, 9, 25))]
    #[case("2025-09-25 13:00", ymd(2025, 9, 25))]
    #[case("2025/09/25", ymd(2025, 9, 25))]
    #[case("2025.09.25", ymd(2025, 9, 25))]
    #[case("25/09/2025", ymd(2025, 9, 25))]
    #[case("03-04-2025", ymd(2025, 4, 3))]
    #[case("03.04.2025", ymd(2025, 4, 3))]
    #[case("  25092025 ", ymd(2025, 9, 25))]
    fn test_fallback_formats(#[case] token: &str, #[case] expected: NaiveDate) {
        assert_eq!(parse_date(token).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("yesterday")]
    #[case("32132025")]
    #[case("123")]
    #[case("2025-13-01")]
    #[case("2025-09-25garbage")]
    fn test_unparseable_tokens(#[case] token: &str) {
        assert!(matches!(parse_date(token), Err(ForecastError::DateFormat(_))));
    }
}
