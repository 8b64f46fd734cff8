//! Core geometry types shared by the animation state and the projector.

/// An axis-aligned rectangle in pixel coordinates.
///
/// Used both for the source sub-rectangle inside the sprite strip and for
/// the destination rectangle on the display surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    /// Left edge
    pub x: u32,
    /// Top edge
    pub y: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Rect {
    /// A rectangle with no area at the origin.
    pub const ZERO: Rect = Rect::new(0, 0, 0, 0);

    /// Create a new rectangle.
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A rectangle anchored at the origin with the given size.
    pub const fn from_size(size: FrameSize) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    /// Returns `true` if the rectangle covers no pixels.
    ///
    /// A zero-area rectangle means "nothing to draw".
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// The size of this rectangle.
    #[inline]
    pub fn size(&self) -> FrameSize {
        FrameSize::new(self.width, self.height)
    }

    /// Exclusive right edge, saturating at `u32::MAX`.
    #[inline]
    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge, saturating at `u32::MAX`.
    #[inline]
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// Returns `true` if `self` lies entirely inside a `width` x `height` area.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.right() <= width && self.bottom() <= height
    }
}

/// Width and height of a frame or surface in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    /// Create a new size.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns `true` if either dimension is zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl From<(u32, u32)> for FrameSize {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width, height)
    }
}
