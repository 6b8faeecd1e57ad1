//! Tile colours
//!
//! Every digit tile has a default colour; a level manifest entry can override
//! any of them with `"#rrggbb"` strings.

use std::collections::BTreeMap;

use super::LevelError;

/// RGBA colour per digit tile, indexed by the digit's value
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: [[f32; 4]; 10],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: [
                [0.95, 0.35, 0.15, 1.0], // 0 brake
                [0.30, 0.45, 0.85, 1.0], // 1 lane
                [0.25, 0.70, 0.55, 1.0], // 2 lane
                [0.65, 0.65, 0.70, 1.0], // 3 lane
                [0.55, 0.35, 0.75, 1.0], // 4 lane
                [0.35, 0.35, 0.40, 1.0], // 5 tunnel
                [0.50, 0.40, 0.30, 1.0], // 6 tunnel
                [0.80, 0.60, 0.20, 1.0], // 7 raised (low)
                [0.85, 0.25, 0.30, 1.0], // 8 raised (high)
                [0.20, 0.90, 0.40, 1.0], // 9 boost
            ],
        }
    }
}

impl Palette {
    /// Default palette with per-tile overrides (`{"1": "#3366cc"}`)
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> Result<Self, LevelError> {
        let mut palette = Self::default();
        for (key, value) in overrides {
            let digit = single_digit(key).ok_or_else(|| LevelError::BadColor {
                key: key.clone(),
                value: value.clone(),
            })?;
            let color = parse_hex_color(value).ok_or_else(|| LevelError::BadColor {
                key: key.clone(),
                value: value.clone(),
            })?;
            palette.colors[digit] = color;
        }
        Ok(palette)
    }

    /// Colour for a tile character, `None` for non-digit characters
    pub fn color(&self, ch: char) -> Option<[f32; 4]> {
        ch.to_digit(10).map(|d| self.colors[d as usize])
    }
}

fn single_digit(key: &str) -> Option<usize> {
    let mut chars = key.chars();
    let ch = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    ch.to_digit(10).map(|d| d as usize)
}

/// Parse `#rrggbb` (or `rrggbb`) into linear-ish RGBA floats
pub fn parse_hex_color(value: &str) -> Option<[f32; 4]> {
    let hex = value.strip_prefix('#').unwrap_or(value);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let (r, g, b) = (channel(0)?, channel(2)?, channel(4)?);
    Some([r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0])
}
