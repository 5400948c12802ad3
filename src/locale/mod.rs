//! Locale detection, bundled string resources and date pattern resolution.

mod pattern;
mod resources;

pub use pattern::{
    validate_pattern, DateFormatter, PatternError, PatternResolver, SkeletonResolver,
};
pub use resources::{BundledResources, ResourceKey, Resources};

use std::fmt;

/// Locale used when nothing is configured and the environment is empty.
pub const DEFAULT_LOCALE: &str = "en_US";

/// A language/country pair such as `zh_CN`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale {
    language: String,
    country: String,
}

impl Locale {
    pub fn new(language: &str, country: &str) -> Self {
        Self {
            language: language.to_ascii_lowercase(),
            country: country.to_ascii_uppercase(),
        }
    }

    /// Parses POSIX (`zh_CN.UTF-8@euro`) and BCP-47 (`zh-TW`) style tags.
    ///
    /// Returns `None` for empty tags and for the `C` / `POSIX` locales.
    pub fn parse(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        let tag = tag.split(['.', '@']).next().unwrap_or("");
        if tag.is_empty() || tag == "C" || tag == "POSIX" {
            return None;
        }

        let mut parts = tag.split(['_', '-']);
        let language = parts.next()?;
        if language.is_empty() || !language.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }
        // Skip script subtags (zh-Hant-TW) and keep the first region-looking part.
        let country = parts
            .find(|p| p.len() == 2 && p.chars().all(|c| c.is_ascii_alphabetic()))
            .unwrap_or("");

        Some(Self::new(language, country))
    }

    /// Reads the locale from `LC_ALL`, `LC_TIME` and `LANG`, in that order.
    pub fn detect() -> Self {
        for var in ["LC_ALL", "LC_TIME", "LANG"] {
            if let Some(locale) = std::env::var(var).ok().as_deref().and_then(Self::parse) {
                log::debug!("Locale {} taken from {}", locale, var);
                return locale;
            }
        }
        Self::parse(DEFAULT_LOCALE).unwrap_or_else(|| Self::new("en", "US"))
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Upper-case ISO country code, empty when the tag had none.
    pub fn country(&self) -> &str {
        &self.country
    }

    /// True for locales whose date region carries a lunar date.
    pub fn uses_lunar_calendar(&self) -> bool {
        matches!(self.country.as_str(), "CN" | "TW")
    }

    /// True for locales written in traditional Chinese characters.
    pub fn uses_traditional_script(&self) -> bool {
        matches!(self.country.as_str(), "TW" | "HK" | "MO")
    }

    /// Maps to the closest chrono locale for localized month and weekday names.
    pub fn to_chrono(&self) -> chrono::Locale {
        use chrono::Locale as L;

        match (self.language.as_str(), self.country.as_str()) {
            ("zh", "TW") => L::zh_TW,
            ("zh", "HK") => L::zh_HK,
            ("zh", _) => L::zh_CN,
            ("ja", _) => L::ja_JP,
            ("ko", _) => L::ko_KR,
            ("de", _) => L::de_DE,
            ("fr", _) => L::fr_FR,
            ("es", _) => L::es_ES,
            ("it", _) => L::it_IT,
            ("en", "GB") => L::en_GB,
            ("en", _) => L::en_US,
            _ => L::POSIX,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.country.is_empty() {
            write!(f, "{}", self.language)
        } else {
            write!(f, "{}_{}", self.language, self.country)
        }
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::new("en", "US")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_posix_tag() {
        let locale = Locale::parse("zh_CN.UTF-8").unwrap();
        assert_eq!(locale.language(), "zh");
        assert_eq!(locale.country(), "CN");
        assert_eq!(locale.to_string(), "zh_CN");
    }

    #[test]
    fn parse_bcp47_tag_with_script() {
        let locale = Locale::parse("zh-Hant-TW").unwrap();
        assert_eq!(locale.language(), "zh");
        assert_eq!(locale.country(), "TW");
        assert!(locale.uses_traditional_script());
    }

    #[test]
    fn parse_language_only() {
        let locale = Locale::parse("de").unwrap();
        assert_eq!(locale.country(), "");
        assert_eq!(locale.to_string(), "de");
    }

    #[test]
    fn parse_rejects_c_locale() {
        assert!(Locale::parse("C").is_none());
        assert!(Locale::parse("POSIX").is_none());
        assert!(Locale::parse("C.UTF-8").is_none());
        assert!(Locale::parse("").is_none());
    }

    #[test]
    fn lunar_only_for_cn_and_tw() {
        assert!(Locale::new("zh", "CN").uses_lunar_calendar());
        assert!(Locale::new("zh", "TW").uses_lunar_calendar());
        assert!(!Locale::new("zh", "HK").uses_lunar_calendar());
        assert!(!Locale::new("en", "US").uses_lunar_calendar());
        // Country decides, not language.
        assert!(Locale::new("en", "CN").uses_lunar_calendar());
    }

    #[test]
    fn case_is_normalized() {
        let locale = Locale::new("ZH", "cn");
        assert_eq!(locale, Locale::new("zh", "CN"));
    }
}
