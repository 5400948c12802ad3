//! Child regions of the status widget and the layout that declares them.

use std::fmt;

/// Identifies a child region of the status layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionId {
    Clock,
    Date,
    LunarDate,
    AlarmStatus,
}

impl RegionId {
    pub const ALL: [RegionId; 4] = [
        RegionId::Clock,
        RegionId::Date,
        RegionId::LunarDate,
        RegionId::AlarmStatus,
    ];

    /// Identifier used in the `status.regions` config list.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Clock => "clock",
            Self::Date => "date",
            Self::LunarDate => "lunar_date",
            Self::AlarmStatus => "alarm_status",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.as_str() == name)
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Visible,
    /// Hidden and removed from layout flow.
    Gone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFamily {
    SansSerif,
    Serif,
    Monospace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Typeface {
    pub family: FontFamily,
    pub style: FontStyle,
}

impl Typeface {
    pub const SANS_SERIF_BOLD: Typeface = Typeface {
        family: FontFamily::SansSerif,
        style: FontStyle::Bold,
    };
}

/// Icons a region can draw ahead of its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Alarm,
}

impl Icon {
    /// Nerd Font glyph for the icon.
    pub fn glyph(self) -> &'static str {
        match self {
            Self::Alarm => "\u{f0020}",
        }
    }
}

/// A single line of text in the status widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRegion {
    id: RegionId,
    text: Option<String>,
    visibility: Visibility,
    typeface: Option<Typeface>,
    selected: bool,
    leading_icon: Option<Icon>,
}

impl TextRegion {
    pub fn new(id: RegionId) -> Self {
        Self {
            id,
            text: None,
            visibility: Visibility::Visible,
            typeface: None,
            selected: false,
            leading_icon: None,
        }
    }

    pub fn id(&self) -> RegionId {
        self.id
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn set_text(&mut self, text: Option<String>) {
        self.text = text;
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn set_visibility(&mut self, visibility: Visibility) {
        self.visibility = visibility;
    }

    pub fn is_visible(&self) -> bool {
        self.visibility == Visibility::Visible
    }

    pub fn typeface(&self) -> Option<Typeface> {
        self.typeface
    }

    pub fn set_typeface(&mut self, typeface: Typeface) {
        self.typeface = Some(typeface);
    }

    /// Selected regions scroll overflowing text (marquee).
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub fn leading_icon(&self) -> Option<Icon> {
        self.leading_icon
    }

    pub fn set_leading_icon(&mut self, icon: Option<Icon>) {
        self.leading_icon = icon;
    }
}

/// The regions a status layout provides, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLayout {
    regions: Vec<RegionId>,
}

impl StatusLayout {
    pub fn new(regions: impl IntoIterator<Item = RegionId>) -> Self {
        let mut out: Vec<RegionId> = Vec::new();
        for id in regions {
            if !out.contains(&id) {
                out.push(id);
            }
        }
        Self { regions: out }
    }

    /// Clock, date, lunar date and alarm status.
    pub fn standard() -> Self {
        Self::new(RegionId::ALL)
    }

    pub fn contains(&self, id: RegionId) -> bool {
        self.regions.contains(&id)
    }

    pub fn regions(&self) -> &[RegionId] {
        &self.regions
    }

    /// Creates the region if the layout declares it.
    pub fn find_region(&self, id: RegionId) -> Option<TextRegion> {
        self.contains(id).then(|| TextRegion::new(id))
    }
}

impl Default for StatusLayout {
    fn default() -> Self {
        Self::standard()
    }
}
