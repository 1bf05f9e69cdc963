//! Style presets: named bundles of color, font and alignment attributes
//! applied uniformly across a deck.
//!
//! The registry is a compile-time static map with a closed set of fields —
//! presets cannot grow attributes at runtime.
use crate::common::color::RGBColor;

/// Paragraph alignment, serialized as the DrawingML `algn` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    /// Left-aligned (`l`)
    Left,
    /// Centered (`ctr`)
    Center,
    /// Right-aligned (`r`)
    Right,
    /// Justified (`just`)
    Justify,
}

impl Alignment {
    /// Parse an `algn` attribute value.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "l" => Some(Self::Left),
            "ctr" => Some(Self::Center),
            "r" => Some(Self::Right),
            "just" => Some(Self::Justify),
            _ => None,
        }
    }

    /// The `algn` attribute value to write back.
    pub fn as_code(&self) -> &'static str {
        match self {
            Self::Left => "l",
            Self::Center => "ctr",
            Self::Right => "r",
            Self::Justify => "just",
        }
    }
}

/// An immutable bundle of visual attributes, looked up by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StylePreset {
    /// Slide background color
    pub background: RGBColor,
    /// Color applied to title runs
    pub title_color: RGBColor,
    /// Color applied to all other runs
    pub body_color: RGBColor,
    /// Font family applied to every run
    pub font_family: &'static str,
    /// Paragraph alignment applied throughout
    pub alignment: Alignment,
}

/// The recognized presets. A closed set: additions happen here, not at
/// runtime.
static PRESETS: phf::Map<&'static str, StylePreset> = phf::phf_map! {
    "business" => StylePreset {
        background: RGBColor::new(255, 255, 255),
        title_color: RGBColor::new(0, 51, 102),
        body_color: RGBColor::new(51, 51, 51),
        font_family: "Calibri",
        alignment: Alignment::Left,
    },
    "modern" => StylePreset {
        background: RGBColor::new(245, 245, 245),
        title_color: RGBColor::new(31, 41, 55),
        body_color: RGBColor::new(55, 65, 81),
        font_family: "Segoe UI",
        alignment: Alignment::Center,
    },
    "warm" => StylePreset {
        background: RGBColor::new(255, 248, 240),
        title_color: RGBColor::new(139, 69, 19),
        body_color: RGBColor::new(93, 64, 55),
        font_family: "Georgia",
        alignment: Alignment::Left,
    },
    "dark" => StylePreset {
        background: RGBColor::new(30, 30, 46),
        title_color: RGBColor::new(255, 209, 102),
        body_color: RGBColor::new(224, 224, 224),
        font_family: "Segoe UI",
        alignment: Alignment::Left,
    },
};

impl StylePreset {
    /// Look up a preset by name.
    pub fn lookup(name: &str) -> Option<&'static StylePreset> {
        PRESETS.get(name)
    }

    /// Names of all registered presets.
    pub fn names() -> impl Iterator<Item = &'static str> {
        PRESETS.keys().copied()
    }
}
