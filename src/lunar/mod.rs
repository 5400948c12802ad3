//! Chinese lunisolar calendar support for the lunar date line.
//!
//! The date line of CN/TW locales is re-read from its formatted text: all
//! runs of CJK ideographs and all runs of digits are extracted, and the
//! tokens at positions 0, 2 and 4 give year, month and day. Those feed a
//! [`LunarConverter`] whose output starts with a four-character prefix that
//! the caller drops.

mod calendar;

pub use calendar::{ChineseLunarCalendar, LunarDate};

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use thiserror::Error;

use crate::locale::Locale;

/// Number of leading characters of a converter's output that are not shown.
pub const LUNAR_PREFIX_CHARS: usize = 4;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LunarError {
    #[error("formatted date '{formatted}' has {found} tokens, need at least 5")]
    TooFewTokens { formatted: String, found: usize },
    #[error("date token '{0}' is not a number")]
    InvalidToken(String),
    #[error("no such calendar day: {year}-{month}-{day}")]
    InvalidDate { year: i32, month: u32, day: u32 },
    #[error("{0} is outside the supported lunar calendar range")]
    OutOfRange(NaiveDate),
}

/// Converts a Gregorian day into a display string for the lunar line.
pub trait LunarConverter: Send {
    /// The returned text begins with [`LUNAR_PREFIX_CHARS`] characters of
    /// prefix that callers strip before display.
    fn convert(&self, date: NaiveDate, locale: &Locale) -> Result<String, LunarError>;
}

fn token_regex() -> &'static Regex {
    static TOKENS: OnceLock<Regex> = OnceLock::new();
    TOKENS.get_or_init(|| Regex::new(r"[\x{4e00}-\x{9fa5}]+|\d+").expect("valid token regex"))
}

/// Splits a formatted date into maximal runs of CJK ideographs and digits.
pub fn extract_date_tokens(formatted: &str) -> Vec<&str> {
    token_regex()
        .find_iter(formatted)
        .map(|m| m.as_str())
        .collect()
}

/// Reads year, month and day from tokens 0, 2 and 4.
pub fn parse_date_tokens(formatted: &str) -> Result<NaiveDate, LunarError> {
    let tokens = extract_date_tokens(formatted);
    if tokens.len() < 5 {
        return Err(LunarError::TooFewTokens {
            formatted: formatted.to_string(),
            found: tokens.len(),
        });
    }

    let number = |token: &str| -> Result<u32, LunarError> {
        token
            .parse::<u32>()
            .map_err(|_| LunarError::InvalidToken(token.to_string()))
    };
    let year = number(tokens[0])? as i32;
    let month = number(tokens[2])?;
    let day = number(tokens[4])?;

    // Month 0 underflows the zero-based month index; reject it like any
    // other impossible day.
    month
        .checked_sub(1)
        .and_then(|month0| NaiveDate::from_ymd_opt(year, month0 + 1, day))
        .ok_or(LunarError::InvalidDate { year, month, day })
}

/// Drops the converter's fixed prefix, counting characters rather than bytes.
pub fn strip_prefix(converted: &str) -> String {
    converted.chars().skip(LUNAR_PREFIX_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn extracts_ideograph_and_digit_runs() {
        let tokens = extract_date_tokens("2021年3月15日 星期一");
        assert_eq!(tokens, vec!["2021", "年", "3", "月", "15", "日", "星期一"]);
    }

    #[test]
    fn ignores_latin_and_punctuation() {
        let tokens = extract_date_tokens("Mon, Mar 15, 2021");
        assert_eq!(tokens, vec!["15", "2021"]);
    }

    #[test]
    fn parses_year_month_day_positions() {
        let date = parse_date_tokens("2021年3月15日 一").unwrap();
        assert_eq!(date.year(), 2021);
        assert_eq!(date.month0(), 2);
        assert_eq!(date.day(), 15);
    }

    #[test]
    fn too_few_tokens_is_an_error() {
        let err = parse_date_tokens("Mon, Mar 15, 2021").unwrap_err();
        assert_eq!(
            err,
            LunarError::TooFewTokens {
                formatted: "Mon, Mar 15, 2021".to_string(),
                found: 2,
            }
        );
    }

    #[test]
    fn ideograph_in_numeric_position_is_an_error() {
        let err = parse_date_tokens("星期一 3月 15日 2021年").unwrap_err();
        assert_eq!(err, LunarError::InvalidToken("星期一".to_string()));
    }

    #[test]
    fn impossible_day_is_an_error() {
        let err = parse_date_tokens("2021年2月30日 二").unwrap_err();
        assert_eq!(
            err,
            LunarError::InvalidDate {
                year: 2021,
                month: 2,
                day: 30
            }
        );
        assert!(parse_date_tokens("2021年0月3日 二").is_err());
    }

    #[test]
    fn strip_prefix_counts_chars() {
        assert_eq!(strip_prefix("辛丑年 二月初三"), "二月初三");
        assert_eq!(strip_prefix("abc"), "");
    }
}
