//! Node Color System
//!
//! Provides the per-type display colors shared by the renderer and the
//! settings panel. Types without a configured color get a stable palette
//! color by catalog position.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// RGBA color, serialized as a hex string (`#rrggbb` or `#rrggbbaa`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("color must be 6 or 8 hex digits, got {0:?}")]
    InvalidLength(String),
    #[error("invalid hex digit in color {0:?}")]
    InvalidDigit(String),
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let digits = value.strip_prefix('#').unwrap_or(value);
        if digits.len() != 6 && digits.len() != 8 {
            return Err(ColorParseError::InvalidLength(value.to_string()));
        }
        // Also guarantees the byte-offset slices below land on char boundaries.
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ColorParseError::InvalidDigit(value.to_string()));
        }
        let byte = |range| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|_| ColorParseError::InvalidDigit(value.to_string()))
        };
        Ok(Self {
            r: byte(0..2)?,
            g: byte(2..4)?,
            b: byte(4..6)?,
            a: if digits.len() == 8 { byte(6..8)? } else { 255 },
        })
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Fallback palette for types whose registry entry omits a color.
///
/// Assignment is by registry index so a given catalog always yields the same
/// coloring, session after session.
pub const DEFAULT_PALETTE: &[Color] = &[
    Color::rgb(31, 119, 180),
    Color::rgb(255, 127, 14),
    Color::rgb(44, 160, 44),
    Color::rgb(214, 39, 40),
    Color::rgb(148, 103, 189),
    Color::rgb(140, 86, 75),
    Color::rgb(227, 119, 194),
    Color::rgb(127, 127, 127),
    Color::rgb(188, 189, 34),
    Color::rgb(23, 190, 207),
];

pub fn palette_color(index: usize) -> Color {
    DEFAULT_PALETTE[index % DEFAULT_PALETTE.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        let color = Color::rgb(31, 119, 180);
        assert_eq!(color.to_hex(), "#1f77b4");
        assert_eq!("#1f77b4".parse::<Color>().unwrap(), color);
        assert_eq!("1f77b4".parse::<Color>().unwrap(), color);
    }

    #[test]
    fn test_hex_round_trip_with_alpha() {
        let color = Color::rgba(10, 20, 30, 128);
        assert_eq!(color.to_hex(), "#0a141e80");
        assert_eq!(color.to_hex().parse::<Color>().unwrap(), color);
    }

    #[test]
    fn test_rejects_malformed_hex() {
        assert_eq!(
            "#12345".parse::<Color>(),
            Err(ColorParseError::InvalidLength("#12345".to_string()))
        );
        assert_eq!(
            "#zzzzzz".parse::<Color>(),
            Err(ColorParseError::InvalidDigit("#zzzzzz".to_string()))
        );
        assert_eq!(
            "+12345".parse::<Color>(),
            Err(ColorParseError::InvalidDigit("+12345".to_string()))
        );
    }

    #[test]
    fn test_rejects_multibyte_characters() {
        // Both are 6 or 8 bytes long, so they get past the length check.
        assert_eq!(
            "€€".parse::<Color>(),
            Err(ColorParseError::InvalidDigit("€€".to_string()))
        );
        assert_eq!(
            "#12345€".parse::<Color>(),
            Err(ColorParseError::InvalidDigit("#12345€".to_string()))
        );
    }

    #[test]
    fn test_palette_cycles() {
        assert_eq!(palette_color(0), DEFAULT_PALETTE[0]);
        assert_eq!(palette_color(DEFAULT_PALETTE.len()), DEFAULT_PALETTE[0]);
        assert_eq!(palette_color(DEFAULT_PALETTE.len() + 3), DEFAULT_PALETTE[3]);
    }

    #[test]
    fn test_serde_as_hex_string() {
        let color = Color::rgb(214, 39, 40);
        let json = serde_json::to_string(&color).unwrap();
        assert_eq!(json, "\"#d62728\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, color);
    }
}
