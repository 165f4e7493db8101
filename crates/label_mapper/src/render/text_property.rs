//! Text style shared by labels
//!
//! The mapper only routes these values to the backend; it never interprets
//! font, color, or justification itself.

use bitflags::bitflags;

bitflags! {
    /// Font style switches
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FontStyle: u8 {
        /// Bold weight
        const BOLD = 1 << 0;
        /// Italic slant
        const ITALIC = 1 << 1;
        /// Drop shadow behind the glyphs
        const SHADOW = 1 << 2;
    }
}

/// Horizontal placement of the text relative to its anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HorizontalJustification {
    /// Text starts at the anchor
    #[default]
    Left,
    /// Text is centered on the anchor
    Centered,
    /// Text ends at the anchor
    Right,
}

/// Vertical placement of the text relative to its anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerticalJustification {
    /// Baseline sits on the anchor
    #[default]
    Bottom,
    /// Text is centered on the anchor
    Centered,
    /// Top of the text sits on the anchor
    Top,
}

/// Label text style
#[derive(Debug, Clone, PartialEq)]
pub struct TextProperty {
    /// Font family name
    pub font_family: String,
    /// Font size in pixels
    pub font_size: f32,
    /// Text color (RGB)
    pub color: [f32; 3],
    /// Opacity in `[0, 1]`
    pub opacity: f32,
    /// Bold / italic / shadow switches
    pub style: FontStyle,
    /// Horizontal justification
    pub justification: HorizontalJustification,
    /// Vertical justification
    pub vertical_justification: VerticalJustification,
}

impl Default for TextProperty {
    fn default() -> Self {
        Self {
            font_family: "Arial".to_string(),
            font_size: 12.0,
            color: [1.0, 1.0, 1.0],
            opacity: 1.0,
            style: FontStyle::BOLD | FontStyle::ITALIC | FontStyle::SHADOW,
            justification: HorizontalJustification::Left,
            vertical_justification: VerticalJustification::Bottom,
        }
    }
}

impl TextProperty {
    /// Default style with a different color
    pub fn with_color(color: [f32; 3]) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }

    /// Builder-style font size override
    #[must_use]
    pub fn font_size(mut self, size: f32) -> Self {
        self.font_size = size;
        self
    }

    /// Builder-style font style override
    #[must_use]
    pub fn style(mut self, style: FontStyle) -> Self {
        self.style = style;
        self
    }
}
