use std::fmt;

/// Screen corner the overlay is pinned to, as chosen in settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Corner {
    #[default]
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    /// Decode the stored location code (`"0"`..`"3"`). Anything else,
    /// including empty or negative values, falls back to top-left.
    pub fn from_code(code: &str) -> Self {
        match code.trim().parse::<i64>() {
            Ok(0) => Corner::TopLeft,
            Ok(1) => Corner::TopRight,
            Ok(2) => Corner::BottomLeft,
            Ok(3) => Corner::BottomRight,
            _ => Corner::TopLeft,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Corner::TopLeft => 0,
            Corner::TopRight => 1,
            Corner::BottomLeft => 2,
            Corner::BottomRight => 3,
        }
    }

    pub fn anchor(self) -> Anchor {
        match self {
            Corner::TopLeft => Anchor::TOP_LEFT,
            Corner::TopRight => Anchor::TOP_RIGHT,
            Corner::BottomLeft => Anchor::BOTTOM_LEFT,
            Corner::BottomRight => Anchor::BOTTOM_RIGHT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerticalEdge {
    Top,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HorizontalEdge {
    Left,
    Right,
}

/// Placement flags handed to the display surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Anchor {
    pub vertical: VerticalEdge,
    pub horizontal: HorizontalEdge,
}

impl Anchor {
    pub const TOP_LEFT: Anchor = Anchor::new(VerticalEdge::Top, HorizontalEdge::Left);
    pub const TOP_RIGHT: Anchor = Anchor::new(VerticalEdge::Top, HorizontalEdge::Right);
    pub const BOTTOM_LEFT: Anchor = Anchor::new(VerticalEdge::Bottom, HorizontalEdge::Left);
    pub const BOTTOM_RIGHT: Anchor = Anchor::new(VerticalEdge::Bottom, HorizontalEdge::Right);

    pub const fn new(vertical: VerticalEdge, horizontal: HorizontalEdge) -> Self {
        Self {
            vertical,
            horizontal,
        }
    }
}

impl Default for Anchor {
    fn default() -> Self {
        Anchor::TOP_LEFT
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let vertical = match self.vertical {
            VerticalEdge::Top => "top",
            VerticalEdge::Bottom => "bottom",
        };
        let horizontal = match self.horizontal {
            HorizontalEdge::Left => "left",
            HorizontalEdge::Right => "right",
        };
        write!(f, "{vertical}-{horizontal}")
    }
}
