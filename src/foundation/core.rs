/// 0-based output frame index within one item's animation cycle.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Pixel offset applied to a layer while compositing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Offset {
    /// Horizontal offset in pixels (positive moves right).
    pub x: i32,
    /// Vertical offset in pixels (positive moves down).
    pub y: i32,
}

impl Offset {
    /// The zero offset.
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Construct an offset.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Output raster dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Render a 1-based, zero-padded two-digit number (`0 -> "01"`).
pub(crate) fn padded_number(zero_based: u64) -> String {
    format!("{:02}", zero_based + 1)
}
