use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

use crate::keyguard::RegionId;
use crate::locale::{validate_pattern, ResourceKey};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub status: StatusConfig,
    /// Resource overrides keyed by resource name
    #[serde(default)]
    pub resources: HashMap<String, String>,
    #[serde(default)]
    pub alarm: AlarmConfig,
    #[serde(default)]
    pub window: WindowConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StatusConfig {
    /// Locale tag such as "zh_CN"; detected from the environment when unset
    pub locale: Option<String>,
    /// Upper-case all date and alarm text
    #[serde(default)]
    pub upper_case: bool,
    /// Regions present in the layout, in display order
    #[serde(default = "default_regions")]
    pub regions: Vec<String>,
    /// Clock format (chrono strftime), used in 24-hour mode
    #[serde(default = "default_clock_format")]
    pub clock_format: String,
    #[serde(default)]
    pub twelve_hour: bool,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            locale: None,
            upper_case: false,
            regions: default_regions(),
            clock_format: default_clock_format(),
            twelve_hour: false,
        }
    }
}

fn default_regions() -> Vec<String> {
    RegionId::ALL.iter().map(|id| id.as_str().to_string()).collect()
}

fn default_clock_format() -> String {
    "%H:%M".to_string()
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AlarmConfig {
    /// File holding the formatted next alarm (first line). `~` is expanded.
    pub file: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WindowConfig {
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_height")]
    pub height: f64,
    /// Background color in hex format (#RRGGBB or #RRGGBBAA)
    #[serde(default = "default_bg_color")]
    pub background_color: String,
    #[serde(default = "default_text_color")]
    pub text_color: String,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            background_color: default_bg_color(),
            text_color: default_text_color(),
            font_family: default_font_family(),
            font_size: default_font_size(),
        }
    }
}

fn default_width() -> f64 {
    360.0
}

fn default_height() -> f64 {
    220.0
}

fn default_bg_color() -> String {
    "#1e1e2e".to_string()
}

fn default_text_color() -> String {
    "#cdd6f4".to_string()
}

fn default_font_family() -> String {
    "Helvetica".to_string()
}

fn default_font_size() -> f64 {
    16.0
}

/// A problem found while validating the config.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigIssue {
    pub is_error: bool,
    pub message: String,
}

impl ConfigIssue {
    fn error(message: impl Into<String>) -> Self {
        Self {
            is_error: true,
            message: message.into(),
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self {
            is_error: false,
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = if self.is_error { "error" } else { "warning" };
        write!(f, "{}: {}", level, self.message)
    }
}

impl Config {
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        let mut seen = Vec::new();
        for name in &self.status.regions {
            match RegionId::from_name(name) {
                Some(id) if seen.contains(&id) => {
                    issues.push(ConfigIssue::warning(format!(
                        "status.regions lists '{}' more than once",
                        name
                    )));
                }
                Some(id) => seen.push(id),
                None => issues.push(ConfigIssue::error(format!(
                    "status.regions: unknown region '{}'",
                    name
                ))),
            }
        }
        for required in [RegionId::Date, RegionId::AlarmStatus] {
            if !seen.contains(&required) {
                issues.push(ConfigIssue::error(format!(
                    "status.regions must include '{}'",
                    required
                )));
            }
        }

        if let Some(tag) = &self.status.locale {
            if crate::locale::Locale::parse(tag).is_none() {
                issues.push(ConfigIssue::warning(format!(
                    "status.locale '{}' not recognised, using the environment locale",
                    tag
                )));
            }
        }

        if let Err(e) = validate_pattern(&self.status.clock_format) {
            issues.push(ConfigIssue::error(format!("status.clock_format: {}", e)));
        }

        for (name, value) in &self.resources {
            match ResourceKey::from_name(name) {
                Some(key) if !key.is_skeleton() => {
                    if let Err(e) = validate_pattern(value) {
                        issues.push(ConfigIssue::error(format!("resources.{}: {}", name, e)));
                    }
                }
                Some(_) => {}
                None => issues.push(ConfigIssue::warning(format!(
                    "resources: unknown key '{}'",
                    name
                ))),
            }
        }

        for (field, value) in [
            ("window.background_color", &self.window.background_color),
            ("window.text_color", &self.window.text_color),
        ] {
            if parse_hex_color(value).is_none() {
                issues.push(ConfigIssue::error(format!(
                    "{}: invalid color '{}'",
                    field, value
                )));
            }
        }

        if self.window.width <= 0.0 || self.window.height <= 0.0 {
            issues.push(ConfigIssue::error("window size must be positive"));
        }
        if self.window.font_size <= 0.0 {
            issues.push(ConfigIssue::error("window.font_size must be positive"));
        }

        issues
    }

    /// Known region ids from `status.regions`, in order.
    pub fn region_ids(&self) -> Vec<RegionId> {
        self.status
            .regions
            .iter()
            .filter_map(|name| RegionId::from_name(name))
            .collect()
    }
}

/// Parse a hex color string into RGBA components (0.0-1.0)
pub fn parse_hex_color(hex: &str) -> Option<(f64, f64, f64, f64)> {
    let hex = hex.trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }

    let channel = |i: usize| -> Option<f64> {
        Some(u8::from_str_radix(&hex[i..i + 2], 16).ok()? as f64 / 255.0)
    };

    match hex.len() {
        6 => Some((channel(0)?, channel(2)?, channel(4)?, 1.0)),
        8 => Some((channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_src: &str) -> Config {
        toml::from_str(toml_src).unwrap()
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#ffffff"), Some((1.0, 1.0, 1.0, 1.0)));
        assert_eq!(parse_hex_color("#000000"), Some((0.0, 0.0, 0.0, 1.0)));
        assert_eq!(
            parse_hex_color("#00ff0080"),
            Some((0.0, 1.0, 0.0, 0.5019607843137255))
        );
        assert_eq!(parse_hex_color("invalid"), None);
        assert_eq!(parse_hex_color("#ééé"), None);
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = parse("");
        assert_eq!(config.status.regions.len(), 4);
        assert_eq!(config.status.clock_format, "%H:%M");
        assert_eq!(config.window.width, 360.0);
        assert!(config.validate().is_empty());
        assert_eq!(config.region_ids(), RegionId::ALL.to_vec());
    }

    #[test]
    fn full_config_parses() {
        let config = parse(
            r##"
            [status]
            locale = "zh_CN"
            upper_case = true
            regions = ["date", "lunar_date", "alarm_status"]
            twelve_hour = true

            [resources]
            abbrev_wday_month_day_no_year = "%-m/%-d %a"

            [alarm]
            file = "~/.local/state/keyguard-status/next_alarm"

            [window]
            background_color = "#000000cc"
            font_size = 18.0
            "##,
        );
        assert_eq!(config.status.locale.as_deref(), Some("zh_CN"));
        assert!(config.status.upper_case);
        assert!(config.status.twelve_hour);
        assert_eq!(
            config.region_ids(),
            vec![RegionId::Date, RegionId::LunarDate, RegionId::AlarmStatus]
        );
        assert_eq!(config.resources.len(), 1);
        assert!(config.alarm.file.is_some());
        assert_eq!(config.window.font_size, 18.0);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn missing_required_region_is_an_error() {
        let config = parse("[status]\nregions = [\"clock\", \"date\"]\n");
        let issues = config.validate();
        assert!(issues
            .iter()
            .any(|i| i.is_error && i.message.contains("alarm_status")));
    }

    #[test]
    fn unknown_and_duplicate_regions() {
        let config = parse(
            "[status]\nregions = [\"date\", \"weather\", \"date\", \"alarm_status\"]\n",
        );
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.is_error && i.message.contains("weather")));
        assert!(issues.iter().any(|i| !i.is_error && i.message.contains("more than once")));
    }

    #[test]
    fn bad_patterns_and_colors_are_errors() {
        let config = parse(
            r##"
            [status]
            clock_format = "%Q"

            [resources]
            abbrev_wday_month_day_year = ""
            bogus = "x"

            [window]
            text_color = "blue"
            "##,
        );
        let issues = config.validate();
        let errors = issues.iter().filter(|i| i.is_error).count();
        let warnings = issues.iter().filter(|i| !i.is_error).count();
        assert_eq!(errors, 3);
        assert_eq!(warnings, 1);
    }

    #[test]
    fn issue_display_includes_level() {
        let issue = ConfigIssue::warning("something odd");
        assert_eq!(issue.to_string(), "warning: something odd");
    }
}
