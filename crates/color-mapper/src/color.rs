//! RGB color type
//!
//! Controller LEDs and track colors are plain 8-bit sRGB triples. Matching is
//! done directly on the channel values, so no gamma or perceptual conversion
//! is involved.

use std::fmt;
use std::str::FromStr;

use crate::mapper::ParseColorError;

/// Mask selecting the RGB part of a packed `0xRRGGBB` (or `0xAARRGGBB`) word.
const RGB24_MASK: u32 = 0x00FF_FFFF;

/// An 8-bit RGB color.
///
/// Interconvertible without loss with the packed 24-bit form `0xRRGGBB`
/// used by scripting hosts, and with `#RRGGBB` hex strings.
///
/// # Example
/// ```
/// use color_mapper::Color;
///
/// let c = Color::from_rgb24(0xC50A08);
/// assert_eq!((c.red(), c.green(), c.blue()), (0xC5, 0x0A, 0x08));
/// assert_eq!(c.to_rgb24(), 0xC50A08);
/// assert_eq!(c.to_string(), "#C50A08");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    r: u8,
    g: u8,
    b: u8,
}

impl Color {
    /// Create a color from its three channels.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create a color from a byte array [R, G, B].
    #[inline]
    pub const fn from_bytes(bytes: [u8; 3]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2])
    }

    /// Convert to a byte array [R, G, B].
    #[inline]
    pub const fn to_bytes(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Unpack a `0xRRGGBB` word.
    ///
    /// Bits above the low 24 are ignored, so an `0xAARRGGBB` word maps to
    /// its RGB part.
    #[inline]
    pub const fn from_rgb24(packed: u32) -> Self {
        let packed = packed & RGB24_MASK;
        Self {
            r: (packed >> 16) as u8,
            g: (packed >> 8) as u8,
            b: packed as u8,
        }
    }

    /// Pack into a `0xRRGGBB` word. The result never exceeds `0xFFFFFF`.
    #[inline]
    pub const fn to_rgb24(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    #[inline]
    pub const fn red(self) -> u8 {
        self.r
    }

    #[inline]
    pub const fn green(self) -> u8 {
        self.g
    }

    #[inline]
    pub const fn blue(self) -> u8 {
        self.b
    }

    /// Squared Euclidean distance in channel space.
    ///
    /// `dr² + dg² + db²` over signed channel differences. The maximum is
    /// `3 * 255² = 195075`, so integer arithmetic never overflows and no
    /// rounding is involved.
    ///
    /// # Example
    /// ```
    /// use color_mapper::Color;
    ///
    /// let black = Color::new(0, 0, 0);
    /// let white = Color::new(255, 255, 255);
    /// assert_eq!(black.distance_squared(white), 195_075);
    /// assert_eq!(white.distance_squared(white), 0);
    /// ```
    #[inline]
    pub fn distance_squared(self, other: Color) -> u32 {
        let dr = i32::from(self.r) - i32::from(other.r);
        let dg = i32::from(self.g) - i32::from(other.g);
        let db = i32::from(self.b) - i32::from(other.b);
        (dr * dr + dg * dg + db * db) as u32
    }
}

impl From<u32> for Color {
    #[inline]
    fn from(packed: u32) -> Self {
        Self::from_rgb24(packed)
    }
}

impl From<Color> for u32 {
    #[inline]
    fn from(color: Color) -> Self {
        color.to_rgb24()
    }
}

impl From<[u8; 3]> for Color {
    #[inline]
    fn from(bytes: [u8; 3]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = ParseColorError;

    /// Parse a color key of the exact form `#RRGGBB`.
    ///
    /// Hex digits are case-insensitive. Unlike a lenient color parser, no
    /// whitespace trimming, shorthand (`#RGB`) or missing `#` is accepted:
    /// palette keys must be unambiguous.
    ///
    /// # Examples
    ///
    /// ```
    /// use color_mapper::Color;
    ///
    /// let c: Color = "#f2f2FF".parse().unwrap();
    /// assert_eq!(c, Color::new(0xF2, 0xF2, 0xFF));
    ///
    /// assert!("F2F2FF".parse::<Color>().is_err());
    /// assert!("#FFF".parse::<Color>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix('#').ok_or(ParseColorError::MissingHash)?;

        // Byte length, so multi-byte characters are rejected before slicing
        if digits.len() != 6 {
            return Err(ParseColorError::InvalidLength(digits.len()));
        }
        // from_str_radix tolerates a leading '+', so check digits explicitly
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ParseColorError::InvalidHex);
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| ParseColorError::InvalidHex)
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}
