//! Skeleton resolution and localized date formatting.
//!
//! A skeleton lists the date fields to show (`EEEEMMMMd`) without fixing
//! their order or separators. The resolver turns it into a concrete
//! strftime pattern for a locale, which [`DateFormatter`] then renders with
//! chrono's localized month and weekday names.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset};
use thiserror::Error;

use super::Locale;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("date pattern is empty")]
    Empty,
    #[error("invalid date pattern '{0}'")]
    Invalid(String),
}

/// Resolves a locale-independent skeleton into a concrete pattern.
pub trait PatternResolver: Send {
    fn best_pattern(&self, skeleton: &str, locale: &Locale) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Width {
    Numeric,
    Short,
    Long,
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Fields {
    year: bool,
    month: Option<Width>,
    day: bool,
    weekday: Option<Width>,
}

impl Fields {
    fn parse(skeleton: &str) -> Self {
        let mut fields = Fields::default();
        let chars: Vec<char> = skeleton.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            let mut run = 1;
            while i + run < chars.len() && chars[i + run] == c {
                run += 1;
            }
            match c {
                'y' | 'Y' | 'u' => fields.year = true,
                'M' | 'L' => {
                    fields.month = Some(match run {
                        1 | 2 => Width::Numeric,
                        3 => Width::Short,
                        _ => Width::Long,
                    })
                }
                'd' => fields.day = true,
                'E' | 'c' => {
                    fields.weekday = Some(if run >= 4 { Width::Long } else { Width::Short })
                }
                other => log::debug!("Skeleton field '{}' not supported, skipped", other),
            }
            i += run;
        }
        fields
    }
}

/// Built-in resolver covering the field orders used by the bundled locales.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkeletonResolver;

impl SkeletonResolver {
    fn weekday(width: Width) -> &'static str {
        match width {
            Width::Long => "%A",
            _ => "%a",
        }
    }

    fn month(width: Width) -> &'static str {
        match width {
            Width::Numeric => "%-m",
            Width::Short => "%b",
            Width::Long => "%B",
        }
    }

    /// `2021年3月15日 星期一`
    fn east_asian(fields: &Fields) -> String {
        let mut out = String::new();
        if fields.year {
            out.push_str("%Y年");
        }
        if fields.month.is_some() {
            out.push_str("%-m月");
        }
        if fields.day {
            out.push_str("%-d日");
        }
        if let Some(width) = fields.weekday {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(Self::weekday(width));
        }
        out
    }

    /// `Monday, March 15, 2021`
    fn english(fields: &Fields) -> String {
        let month_day = match (fields.month, fields.day) {
            (Some(w), true) => Some(format!("{} %-d", Self::month(w))),
            (Some(w), false) => Some(Self::month(w).to_string()),
            (None, true) => Some("%-d".to_string()),
            (None, false) => None,
        };
        [
            fields.weekday.map(|w| Self::weekday(w).to_string()),
            month_day,
            fields.year.then(|| "%Y".to_string()),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ")
    }

    /// `Montag 15 März 2021`
    fn day_first(fields: &Fields) -> String {
        [
            fields.weekday.map(Self::weekday),
            fields.day.then_some("%-d"),
            fields.month.map(Self::month),
            fields.year.then_some("%Y"),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
    }
}

impl PatternResolver for SkeletonResolver {
    fn best_pattern(&self, skeleton: &str, locale: &Locale) -> String {
        let fields = Fields::parse(skeleton);
        match locale.language() {
            "zh" | "ja" | "ko" => Self::east_asian(&fields),
            "en" => Self::english(&fields),
            _ => Self::day_first(&fields),
        }
    }
}

/// Checks that every strftime specifier in `pattern` is known to chrono.
pub fn validate_pattern(pattern: &str) -> Result<(), PatternError> {
    if pattern.trim().is_empty() {
        return Err(PatternError::Empty);
    }
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        return Err(PatternError::Invalid(pattern.to_string()));
    }
    Ok(())
}

/// A validated strftime pattern bound to a locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormatter {
    pattern: String,
    locale: Locale,
}

impl DateFormatter {
    pub fn new(pattern: &str, locale: &Locale) -> Result<Self, PatternError> {
        validate_pattern(pattern)?;
        Ok(Self {
            pattern: pattern.to_string(),
            locale: locale.clone(),
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn format(&self, at: &DateTime<FixedOffset>) -> String {
        at.format_localized(&self.pattern, self.locale.to_chrono())
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn monday() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(2021, 3, 15, 9, 30, 0)
            .unwrap()
    }

    #[test]
    fn skeleton_fields_are_parsed() {
        let fields = Fields::parse("EEEEMMMMd");
        assert_eq!(
            fields,
            Fields {
                year: false,
                month: Some(Width::Long),
                day: true,
                weekday: Some(Width::Long),
            }
        );
        assert_eq!(Fields::parse("yMMMd").month, Some(Width::Short));
        assert!(Fields::parse("yMMMd").year);
    }

    #[test]
    fn english_order() {
        let pattern = SkeletonResolver.best_pattern("EEEEMMMMd", &Locale::new("en", "US"));
        assert_eq!(pattern, "%A, %B %-d");
        let pattern = SkeletonResolver.best_pattern("yMMMEd", &Locale::new("en", "US"));
        assert_eq!(pattern, "%a, %b %-d, %Y");
    }

    #[test]
    fn chinese_order_uses_numeric_month() {
        let pattern = SkeletonResolver.best_pattern("EEEEMMMMd", &Locale::new("zh", "CN"));
        assert_eq!(pattern, "%-m月%-d日 %A");
        let pattern = SkeletonResolver.best_pattern("yMMMMd", &Locale::new("zh", "TW"));
        assert_eq!(pattern, "%Y年%-m月%-d日");
    }

    #[test]
    fn day_first_for_other_languages() {
        let pattern = SkeletonResolver.best_pattern("EEEEMMMMdy", &Locale::new("de", "DE"));
        assert_eq!(pattern, "%A %-d %B %Y");
    }

    #[test]
    fn unknown_skeleton_fields_are_ignored() {
        let pattern = SkeletonResolver.best_pattern("GGGGd", &Locale::new("en", "US"));
        assert_eq!(pattern, "%-d");
    }

    #[test]
    fn formatter_uses_locale_names() {
        let en = DateFormatter::new("%a, %b %-d", &Locale::new("en", "US")).unwrap();
        assert_eq!(en.format(&monday()), "Mon, Mar 15");

        let zh = DateFormatter::new("%Y年%-m月%-d日", &Locale::new("zh", "CN")).unwrap();
        assert_eq!(zh.format(&monday()), "2021年3月15日");
    }

    #[test]
    fn invalid_patterns_are_rejected() {
        assert_eq!(
            DateFormatter::new("", &Locale::default()),
            Err(PatternError::Empty)
        );
        assert!(matches!(
            DateFormatter::new("%Q %-d", &Locale::default()),
            Err(PatternError::Invalid(_))
        ));
    }
}
