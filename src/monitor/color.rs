use std::fmt;

/// Text color applied to the overlay.
///
/// Parsed from user input with [`OverlayColor::parse_or_unset`]; anything that
/// does not parse collapses to [`OverlayColor::UNSET`], which renders as
/// invisible text instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverlayColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Text color used before the user picks one.
pub const DEFAULT_TEXT_COLOR: OverlayColor = OverlayColor::rgba(255, 255, 255, 255);

impl OverlayColor {
    /// Sentinel for "no valid color was supplied". Fully transparent.
    pub const UNSET: OverlayColor = OverlayColor::rgba(0, 0, 0, 0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Parse `#RGB`, `#ARGB`, `#RRGGBB` or `#AARRGGBB`. The leading `#` is
    /// optional.
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }

        match hex.len() {
            3 => {
                let [r, g, b] = nibbles::<3>(hex)?;
                Some(Self::rgb(r, g, b))
            }
            4 => {
                let [a, r, g, b] = nibbles::<4>(hex)?;
                Some(Self::rgba(r, g, b, a))
            }
            6 => {
                let [r, g, b] = bytes::<3>(hex)?;
                Some(Self::rgb(r, g, b))
            }
            8 => {
                let [a, r, g, b] = bytes::<4>(hex)?;
                Some(Self::rgba(r, g, b, a))
            }
            _ => None,
        }
    }

    pub fn parse_or_unset(value: &str) -> Self {
        Self::parse(value).unwrap_or(Self::UNSET)
    }

    pub fn is_unset(self) -> bool {
        self == Self::UNSET
    }

    /// Packed `0xAARRGGBB`.
    pub fn to_argb(self) -> u32 {
        (u32::from(self.a) << 24)
            | (u32::from(self.r) << 16)
            | (u32::from(self.g) << 8)
            | u32::from(self.b)
    }
}

impl Default for OverlayColor {
    fn default() -> Self {
        DEFAULT_TEXT_COLOR
    }
}

impl fmt::Display for OverlayColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:02x}{:02x}{:02x}{:02x}",
            self.a, self.r, self.g, self.b
        )
    }
}

// Single hex digits, each widened to a full channel (`f` -> `ff`).
fn nibbles<const N: usize>(hex: &str) -> Option<[u8; N]> {
    let mut out = [0u8; N];
    for (slot, idx) in out.iter_mut().zip(0..N) {
        let digit = u8::from_str_radix(hex.get(idx..idx + 1)?, 16).ok()?;
        *slot = digit * 17;
    }
    Some(out)
}

fn bytes<const N: usize>(hex: &str) -> Option<[u8; N]> {
    let mut out = [0u8; N];
    for (slot, idx) in out.iter_mut().zip(0..N) {
        *slot = u8::from_str_radix(hex.get(idx * 2..idx * 2 + 2)?, 16).ok()?;
    }
    Some(out)
}
