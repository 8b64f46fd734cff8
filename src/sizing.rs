//! Display scale calculations for blowing frames up onto a surface.

use crate::FrameSize;

/// Smallest scale offered by the scale control.
pub const MIN_SCALE: f64 = 1.0;
/// Largest scale offered by the scale control.
pub const MAX_SCALE: f64 = 25.0;
/// Ratio represented by one unit of an integer scale slider.
pub const SLIDER_STEP: f64 = 0.01;
/// Minimum extent of the display surface on either axis.
pub const MIN_SURFACE_EXTENT: u32 = 10;

/// Magnification applied to a frame when it is drawn.
///
/// The core stores whatever ratio it is given; keeping it inside
/// [`MIN_SCALE`]..=[`MAX_SCALE`] is up to the caller, for which
/// [`DisplayScale::clamped`] is provided.
///
/// ## Example
///
/// ```rust
/// use sprite_core_view::{DisplayScale, FrameSize};
///
/// let scale = DisplayScale::new(2.0);
/// assert_eq!(scale.scaled(FrameSize::new(32, 32)), FrameSize::new(64, 64));
///
/// // A slider running from 100 to 2500 maps onto 1.0..=25.0
/// assert!((DisplayScale::from_slider(250).ratio() - 2.5).abs() < 1e-9);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DisplayScale {
    ratio: f64,
}

impl Default for DisplayScale {
    fn default() -> Self {
        Self { ratio: MIN_SCALE }
    }
}

impl DisplayScale {
    /// Create a scale with the given ratio, unchecked.
    pub fn new(ratio: f64) -> Self {
        Self { ratio }
    }

    /// Create a scale clamped to [`MIN_SCALE`]..=[`MAX_SCALE`].
    ///
    /// Non-finite ratios fall back to [`MIN_SCALE`].
    pub fn clamped(ratio: f64) -> Self {
        if !ratio.is_finite() {
            return Self::default();
        }
        Self {
            ratio: ratio.clamp(MIN_SCALE, MAX_SCALE),
        }
    }

    /// Create a scale from an integer slider position in hundredths.
    pub fn from_slider(value: u32) -> Self {
        Self::new(value as f64 * SLIDER_STEP)
    }

    /// Get the scale ratio.
    #[inline]
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Scale a single dimension, rounding to the nearest pixel.
    ///
    /// Negative or NaN results saturate to zero.
    #[inline]
    pub fn scale_extent(&self, extent: u32) -> u32 {
        (self.ratio * extent as f64).round() as u32
    }

    /// Scale a frame size, rounding each axis to the nearest pixel.
    pub fn scaled(&self, size: FrameSize) -> FrameSize {
        FrameSize::new(self.scale_extent(size.width), self.scale_extent(size.height))
    }

    /// Size the display surface needs for a frame at this scale.
    ///
    /// Never smaller than [`MIN_SURFACE_EXTENT`] on either axis, so an empty
    /// viewer still has something to paint its background into.
    pub fn surface_size(&self, size: FrameSize) -> FrameSize {
        let scaled = self.scaled(size);
        FrameSize::new(
            scaled.width.max(MIN_SURFACE_EXTENT),
            scaled.height.max(MIN_SURFACE_EXTENT),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled_rounds() {
        let scale = DisplayScale::new(1.5);
        assert_eq!(scale.scaled(FrameSize::new(3, 5)), FrameSize::new(5, 8)); // 4.5, 7.5

        let scale = DisplayScale::new(1.01);
        assert_eq!(scale.scale_extent(32), 32); // 32.32
    }

    #[test]
    fn test_surface_minimum() {
        let scale = DisplayScale::new(1.0);
        assert_eq!(scale.surface_size(FrameSize::new(0, 0)), FrameSize::new(10, 10));
        assert_eq!(scale.surface_size(FrameSize::new(4, 32)), FrameSize::new(10, 32));

        let scale = DisplayScale::new(3.0);
        assert_eq!(scale.surface_size(FrameSize::new(4, 4)), FrameSize::new(12, 12));
    }

    #[test]
    fn test_clamped() {
        assert_eq!(DisplayScale::clamped(0.2).ratio(), MIN_SCALE);
        assert_eq!(DisplayScale::clamped(40.0).ratio(), MAX_SCALE);
        assert_eq!(DisplayScale::clamped(3.5).ratio(), 3.5);
        assert_eq!(DisplayScale::clamped(f64::NAN).ratio(), MIN_SCALE);
    }

    #[test]
    fn test_from_slider() {
        assert!((DisplayScale::from_slider(100).ratio() - 1.0).abs() < 1e-9);
        assert!((DisplayScale::from_slider(2500).ratio() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_ratio_saturates() {
        assert_eq!(DisplayScale::new(-2.0).scale_extent(32), 0);
        assert_eq!(DisplayScale::new(f64::NAN).scale_extent(32), 0);
    }
}
