// THEORY:
// The `Pixel` module is the most fundamental unit of the markup engine. It is a
// "dumb" data container for a single RGB sample read from a rasterized page.
//
// Key principles:
// 1.  **No alpha**: Rendered document pages are opaque. Alpha bytes coming from an
//     RGBA buffer are dropped at conversion time and never take part in matching.
// 2.  **Single-pixel scope**: Everything here is computed from one pixel alone.
//     Comparisons against a target color live in `color_spec`.
// 3.  **Byte-native**: Channels stay in 0..=255. Conversion to the 0.0..=1.0 scale
//     is explicit (`normalized`) so no call site has to guess which scale it holds.

pub mod pixel {
    use crate::error::MarkupError;
    use serde::{Deserialize, Serialize};
    use std::fmt;

    pub type Byte = u8;
    pub type Channel = Byte;
    pub type NormalizedChannel = f32;

    pub const RGB_CHANNELS: usize = 3;
    pub const RGBA_CHANNELS: usize = 4;

    /// A single opaque RGB pixel.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Pixel {
        /// The red channel value (0-255).
        pub red: Channel,
        /// The green channel value (0-255).
        pub green: Channel,
        /// The blue channel value (0-255).
        pub blue: Channel,
    }

    impl Pixel {
        pub const fn new(red: Channel, green: Channel, blue: Channel) -> Self {
            Pixel { red, green, blue }
        }

        /// Largest absolute per-channel difference to `other`.
        ///
        /// A pixel matches a target within tolerance `t` exactly when this is `<= t`.
        pub fn max_channel_delta(&self, other: &Pixel) -> Channel {
            self.red
                .abs_diff(other.red)
                .max(self.green.abs_diff(other.green))
                .max(self.blue.abs_diff(other.blue))
        }

        /// Channels on the 0.0..=1.0 scale.
        pub fn normalized(&self) -> [NormalizedChannel; 3] {
            [
                self.red as NormalizedChannel / 255.0,
                self.green as NormalizedChannel / 255.0,
                self.blue as NormalizedChannel / 255.0,
            ]
        }

        /// Parses `#rrggbb`, `rrggbb` or the short `#rgb` form.
        pub fn from_hex(hex: &str) -> Result<Self, MarkupError> {
            let digits = hex.trim().trim_start_matches('#');
            if !digits.is_ascii() {
                return Err(MarkupError::InvalidColor(format!("'{hex}' is not a hex color")));
            }
            let expanded: String = match digits.len() {
                3 => digits.chars().flat_map(|c| [c, c]).collect(),
                6 => digits.to_string(),
                _ => {
                    return Err(MarkupError::InvalidColor(format!(
                        "'{hex}' must have 3 or 6 hex digits"
                    )));
                }
            };
            let channel = |range: std::ops::Range<usize>| {
                u8::from_str_radix(&expanded[range], 16)
                    .map_err(|e| MarkupError::InvalidColor(format!("'{hex}': {e}")))
            };
            Ok(Pixel::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
        }

        pub fn to_hex(&self) -> String {
            format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
        }
    }

    impl fmt::Display for Pixel {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "({}, {}, {})", self.red, self.green, self.blue)
        }
    }

    impl From<[Byte; 3]> for Pixel {
        fn from(rgb: [Byte; 3]) -> Self {
            Pixel::new(rgb[0], rgb[1], rgb[2])
        }
    }

    impl From<Pixel> for [Byte; 3] {
        fn from(pixel: Pixel) -> Self {
            [pixel.red, pixel.green, pixel.blue]
        }
    }

    /// Accepts an RGB or RGBA byte slice; alpha is discarded.
    impl TryFrom<&[Byte]> for Pixel {
        type Error = MarkupError;

        fn try_from(bytes: &[Byte]) -> Result<Self, Self::Error> {
            match bytes.len() {
                RGB_CHANNELS | RGBA_CHANNELS => Ok(Pixel::new(bytes[0], bytes[1], bytes[2])),
                n => Err(MarkupError::InvalidColor(format!(
                    "cannot convert {n} bytes into a pixel"
                ))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::pixel::*;

    #[test]
    fn max_channel_delta_takes_worst_channel() {
        let a = Pixel::new(100, 100, 100);
        let b = Pixel::new(110, 95, 100);
        assert_eq!(a.max_channel_delta(&b), 10);
        assert_eq!(b.max_channel_delta(&a), 10);
        assert_eq!(a.max_channel_delta(&a), 0);
    }

    #[test]
    fn max_channel_delta_spans_full_range() {
        let black = Pixel::new(0, 0, 0);
        let white = Pixel::new(255, 255, 255);
        assert_eq!(black.max_channel_delta(&white), 255);
    }

    #[test]
    fn parses_long_and_short_hex() {
        assert_eq!(Pixel::from_hex("#eb808a").unwrap(), Pixel::new(235, 128, 138));
        assert_eq!(Pixel::from_hex("80FD80").unwrap(), Pixel::new(128, 253, 128));
        assert_eq!(Pixel::from_hex("#f00").unwrap(), Pixel::new(255, 0, 0));
    }

    #[test]
    fn rejects_malformed_hex() {
        assert!(Pixel::from_hex("#12345").is_err());
        assert!(Pixel::from_hex("#gg0000").is_err());
        assert!(Pixel::from_hex("").is_err());
    }

    #[test]
    fn hex_round_trip() {
        let pixel = Pixel::new(1, 171, 255);
        assert_eq!(pixel.to_hex(), "#01abff");
        assert_eq!(Pixel::from_hex(&pixel.to_hex()).unwrap(), pixel);
    }

    #[test]
    fn rgba_slice_drops_alpha() {
        let bytes: &[u8] = &[10, 20, 30, 0];
        assert_eq!(Pixel::try_from(bytes).unwrap(), Pixel::new(10, 20, 30));
        let short: &[u8] = &[10, 20];
        assert!(Pixel::try_from(short).is_err());
    }

    #[test]
    fn normalized_scale() {
        let [r, g, b] = Pixel::new(255, 0, 51).normalized();
        assert_eq!(r, 1.0);
        assert_eq!(g, 0.0);
        assert!((b - 0.2).abs() < 1e-6);
    }
}
