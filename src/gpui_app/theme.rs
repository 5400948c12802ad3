//! Colors and type sizes for the status window.

use gpui::Rgba;

use crate::config::{parse_hex_color, WindowConfig};

/// Type sizes relative to the configured base font size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypographyScale {
    /// 0.875x - alarm line, AM/PM marker
    Sm,
    /// 1.0x - date lines
    Base,
    /// 3.75x - the clock
    Display,
}

impl TypographyScale {
    pub fn multiplier(self) -> f32 {
        match self {
            Self::Sm => 0.875,
            Self::Base => 1.0,
            Self::Display => 3.75,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Theme {
    /// Window background
    pub background: Rgba,
    /// Primary text color
    pub foreground: Rgba,
    /// Secondary text (lunar date, alarm)
    pub foreground_muted: Rgba,
    /// Icon color
    pub accent: Rgba,
    pub font_size: f32,
    pub font_family: String,
}

impl Theme {
    pub fn from_config(window: &WindowConfig) -> Self {
        let background =
            parse_to_rgba(&window.background_color).unwrap_or(rgba(0.118, 0.118, 0.18, 1.0));
        let foreground =
            parse_to_rgba(&window.text_color).unwrap_or(rgba(0.804, 0.839, 0.957, 1.0));

        Self {
            background,
            foreground,
            foreground_muted: with_alpha(&foreground, 0.7),
            accent: rgba(0.537, 0.706, 0.98, 1.0),
            font_size: window.font_size as f32,
            font_family: window.font_family.clone(),
        }
    }

    pub fn font_size_for_scale(&self, scale: TypographyScale) -> f32 {
        self.font_size * scale.multiplier()
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_config(&WindowConfig::default())
    }
}

fn parse_to_rgba(hex: &str) -> Option<Rgba> {
    let (r, g, b, a) = parse_hex_color(hex)?;
    Some(rgba(r as f32, g as f32, b as f32, a as f32))
}

fn rgba(r: f32, g: f32, b: f32, a: f32) -> Rgba {
    Rgba { r, g, b, a }
}

fn with_alpha(color: &Rgba, alpha: f32) -> Rgba {
    Rgba {
        r: color.r,
        g: color.g,
        b: color.b,
        a: alpha,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_uses_configured_colors() {
        let window = WindowConfig {
            background_color: "#000000".to_string(),
            text_color: "#ffffff".to_string(),
            ..WindowConfig::default()
        };
        let theme = Theme::from_config(&window);
        assert_eq!(theme.background, rgba(0.0, 0.0, 0.0, 1.0));
        assert_eq!(theme.foreground, rgba(1.0, 1.0, 1.0, 1.0));
        assert_eq!(theme.foreground_muted.a, 0.7);
    }

    #[test]
    fn bad_colors_fall_back() {
        let window = WindowConfig {
            text_color: "white".to_string(),
            ..WindowConfig::default()
        };
        let theme = Theme::from_config(&window);
        assert_eq!(theme.foreground, rgba(0.804, 0.839, 0.957, 1.0));
    }

    #[test]
    fn scale_multiplies_base_size() {
        let theme = Theme::default();
        assert_eq!(theme.font_size_for_scale(TypographyScale::Base), 16.0);
        assert_eq!(theme.font_size_for_scale(TypographyScale::Display), 60.0);
    }
}
