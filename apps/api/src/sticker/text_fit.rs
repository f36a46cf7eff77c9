//! One-line font fitting for the fixed-width sticker text lines.
//!
//! Characters-per-line is treated as linear in point size: every point shaved
//! off the base size buys three more characters on the line. The constants in
//! `default_typography` were calibrated against the printed label (Calibri,
//! 6.3" sticker width). Text that still overflows at the floor is left to the
//! renderer to wrap or clip.

use serde::{Deserialize, Serialize};

/// Characters gained on the line for each point removed from the font size.
const CHARS_PER_POINT: usize = 3;

/// Fonts and sizes used on every sticker page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelTypography {
    pub heading_font: String,
    pub heading_size_pt: u32,
    pub text_font: String,
    /// Size used when the text fits within `max_chars_for_base`.
    pub base_size_pt: u32,
    pub min_size_pt: u32,
    pub max_chars_for_base: usize,
    /// Printed width of the sticker image.
    pub sticker_width_in: f32,
}

/// Returns the label typography calibrated for the printed stickers.
pub fn default_typography() -> LabelTypography {
    LabelTypography {
        heading_font: "Calibri".to_string(),
        heading_size_pt: 48,
        text_font: "Calibri".to_string(),
        base_size_pt: 23,
        min_size_pt: 14,
        max_chars_for_base: 40,
        sticker_width_in: 6.3,
    }
}

impl LabelTypography {
    /// Font size for a body line, using this typography's bounds.
    pub fn fit_line(&self, text: &str) -> u32 {
        fit(
            text,
            self.base_size_pt,
            self.max_chars_for_base,
            self.min_size_pt,
        )
    }
}

/// Largest size in `min_size..=base_size` whose line budget plausibly holds `text`.
///
/// Never returns less than `min_size`, even when the text overflows the final budget.
pub fn fit(text: &str, base_size: u32, max_chars_for_base: usize, min_size: u32) -> u32 {
    let len = text.chars().count();
    let mut size = base_size;
    let mut budget = max_chars_for_base;

    while len > budget && size > min_size {
        size -= 1;
        budget += CHARS_PER_POINT;
    }

    size.max(min_size)
}
