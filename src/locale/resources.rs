use std::collections::HashMap;

use super::Locale;

/// Symbolic keys of the strings the status widget reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKey {
    /// Skeleton for the long, locale-resolved date ("EEEEMMMMd").
    SystemUiDatePattern,
    /// Abbreviated weekday, month and day without year.
    AbbrevWdayMonthDayNoYear,
    /// Abbreviated weekday, month and day with year.
    AbbrevWdayMonthDayYear,
}

impl ResourceKey {
    pub const ALL: [ResourceKey; 3] = [
        ResourceKey::SystemUiDatePattern,
        ResourceKey::AbbrevWdayMonthDayNoYear,
        ResourceKey::AbbrevWdayMonthDayYear,
    ];

    /// Name used for overrides in the `[resources]` config table.
    pub fn name(self) -> &'static str {
        match self {
            Self::SystemUiDatePattern => "system_ui_date_pattern",
            Self::AbbrevWdayMonthDayNoYear => "abbrev_wday_month_day_no_year",
            Self::AbbrevWdayMonthDayYear => "abbrev_wday_month_day_year",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.name() == name)
    }

    /// True when the value is a skeleton rather than a strftime template.
    pub fn is_skeleton(self) -> bool {
        matches!(self, Self::SystemUiDatePattern)
    }
}

/// Locale and string provider consumed by the status widget.
pub trait Resources: Send {
    /// The active locale.
    fn locale(&self) -> Locale;

    /// Looks up a string resource for the active locale.
    fn string(&self, key: ResourceKey) -> Option<String>;
}

/// Built-in string tables with optional per-key overrides.
///
/// Lookup order is the exact locale, then the language, then English.
#[derive(Debug, Clone)]
pub struct BundledResources {
    locale: Locale,
    overrides: HashMap<ResourceKey, String>,
}

impl BundledResources {
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            overrides: HashMap::new(),
        }
    }

    /// Applies overrides keyed by resource name. Unknown names are skipped.
    pub fn with_overrides<'a>(
        mut self,
        overrides: impl IntoIterator<Item = (&'a String, &'a String)>,
    ) -> Self {
        for (name, value) in overrides {
            match ResourceKey::from_name(name) {
                Some(key) => {
                    self.overrides.insert(key, value.clone());
                }
                None => log::warn!("Ignoring unknown resource override '{}'", name),
            }
        }
        self
    }

    fn bundled(locale: &Locale, key: ResourceKey) -> Option<&'static str> {
        use ResourceKey::*;

        let exact = match (locale.language(), locale.country(), key) {
            ("zh", "TW" | "HK" | "MO", AbbrevWdayMonthDayNoYear) => Some("%-m月%-d日 %a"),
            ("zh", "TW" | "HK" | "MO", AbbrevWdayMonthDayYear) => Some("%Y年%-m月%-d日 %a"),
            ("en", "GB", AbbrevWdayMonthDayNoYear) => Some("%a %-d %b"),
            ("en", "GB", AbbrevWdayMonthDayYear) => Some("%a %-d %b %Y"),
            _ => None,
        };
        if exact.is_some() {
            return exact;
        }

        let by_language = match (locale.language(), key) {
            ("zh", AbbrevWdayMonthDayNoYear) => Some("%-m月%-d日 %a"),
            ("zh", AbbrevWdayMonthDayYear) => Some("%Y年%-m月%-d日 %a"),
            ("ja", AbbrevWdayMonthDayNoYear) => Some("%-m月%-d日(%a)"),
            ("ja", AbbrevWdayMonthDayYear) => Some("%Y年%-m月%-d日(%a)"),
            _ => None,
        };
        if by_language.is_some() {
            return by_language;
        }

        Some(match key {
            SystemUiDatePattern => "EEEEMMMMd",
            AbbrevWdayMonthDayNoYear => "%a, %b %-d",
            AbbrevWdayMonthDayYear => "%a, %b %-d, %Y",
        })
    }
}

impl Resources for BundledResources {
    fn locale(&self) -> Locale {
        self.locale.clone()
    }

    fn string(&self, key: ResourceKey) -> Option<String> {
        if let Some(value) = self.overrides.get(&key) {
            return Some(value.clone());
        }
        Self::bundled(&self.locale, key).map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_templates() {
        let res = BundledResources::new(Locale::new("en", "US"));
        assert_eq!(
            res.string(ResourceKey::AbbrevWdayMonthDayNoYear).as_deref(),
            Some("%a, %b %-d")
        );
        assert_eq!(
            res.string(ResourceKey::SystemUiDatePattern).as_deref(),
            Some("EEEEMMMMd")
        );
    }

    #[test]
    fn chinese_template_puts_year_first() {
        let res = BundledResources::new(Locale::new("zh", "CN"));
        assert_eq!(
            res.string(ResourceKey::AbbrevWdayMonthDayYear).as_deref(),
            Some("%Y年%-m月%-d日 %a")
        );
    }

    #[test]
    fn unknown_locale_falls_back_to_english() {
        let res = BundledResources::new(Locale::new("sv", "SE"));
        assert_eq!(
            res.string(ResourceKey::AbbrevWdayMonthDayYear).as_deref(),
            Some("%a, %b %-d, %Y")
        );
    }

    #[test]
    fn overrides_win_over_bundled_values() {
        let overrides: HashMap<String, String> = [
            ("abbrev_wday_month_day_no_year".to_string(), "%d/%m".to_string()),
            ("not_a_key".to_string(), "x".to_string()),
        ]
        .into_iter()
        .collect();
        let res = BundledResources::new(Locale::new("en", "US")).with_overrides(&overrides);
        assert_eq!(
            res.string(ResourceKey::AbbrevWdayMonthDayNoYear).as_deref(),
            Some("%d/%m")
        );
        assert_eq!(
            res.string(ResourceKey::AbbrevWdayMonthDayYear).as_deref(),
            Some("%a, %b %-d, %Y")
        );
    }

    #[test]
    fn key_names_round_trip() {
        for key in ResourceKey::ALL {
            assert_eq!(ResourceKey::from_name(key.name()), Some(key));
        }
        assert_eq!(ResourceKey::from_name("clock"), None);
    }
}
