use crate::{Result, TokenlensError};
use serde::{Deserialize, Serialize};

/// A color in the host's normalized representation, each channel in 0.0..=1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    #[serde(default = "opaque_alpha")]
    pub a: f64,
}

fn opaque_alpha() -> f64 {
    1.0
}

impl Rgba {
    pub fn opaque(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Render as an uppercase hex string. The alpha byte is appended only
    /// when the color is not fully opaque.
    pub fn to_hex(&self) -> String {
        let byte = |channel: f64| (channel.clamp(0.0, 1.0) * 255.0).round() as u8;
        if self.a < 1.0 {
            format!(
                "#{:02X}{:02X}{:02X}{:02X}",
                byte(self.r),
                byte(self.g),
                byte(self.b),
                byte(self.a)
            )
        } else {
            format!("#{:02X}{:02X}{:02X}", byte(self.r), byte(self.g), byte(self.b))
        }
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA`, case-insensitive. The leading `#` is
    /// optional.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        let valid = matches!(digits.len(), 6 | 8) && digits.bytes().all(|b| b.is_ascii_hexdigit());
        if !valid {
            return Err(TokenlensError::Color(hex.to_string()));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map(|raw| raw as f64 / 255.0)
                .map_err(|_| TokenlensError::Color(hex.to_string()))
        };

        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
            a: if digits.len() == 8 { channel(6..8)? } else { 1.0 },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_opaque_colors_without_alpha() {
        let color = Rgba::opaque(1.0, 0.0, 0.0);
        assert_eq!(color.to_hex(), "#FF0000");
    }

    #[test]
    fn formats_translucent_colors_with_alpha() {
        let color = Rgba { r: 0.0, g: 0.0, b: 0.0, a: 0.5 };
        assert_eq!(color.to_hex(), "#00000080");
    }

    #[test]
    fn parses_hex_case_insensitively() {
        let color = Rgba::from_hex("#eeddcc").unwrap();
        assert_eq!(color.to_hex(), "#EEDDCC");

        let bare = Rgba::from_hex("112233").unwrap();
        assert_eq!(bare.to_hex(), "#112233");
    }

    #[test]
    fn round_trips_through_hex() {
        for hex in ["#112233", "#FF0000", "#00FF7F", "#12345678"] {
            let color = Rgba::from_hex(hex).unwrap();
            assert_eq!(color.to_hex(), hex);
        }
    }

    #[test]
    fn rejects_malformed_literals() {
        assert!(Rgba::from_hex("#12345").is_err());
        assert!(Rgba::from_hex("#GGHHII").is_err());
        assert!(Rgba::from_hex("").is_err());
    }
}
