//! Animation state for a horizontal sprite strip.

use std::path::{Path, PathBuf};

use image::RgbaImage;
use tracing::{debug, info};

use crate::loader::{FileImageSource, ImageSource, LoadResult};
use crate::{FrameSize, Rect};

/// A loaded sprite strip together with its frame geometry and playback
/// position.
///
/// The strip is split left to right into frames of `frame_width` pixels. The
/// frame height always equals the image height. The number of frames is
/// derived on demand, so changing the frame width takes effect immediately.
///
/// The only ways to move the current frame are [`load`](Self::load), which
/// resets it, and [`advance`](Self::advance), which steps it forward.
///
/// ## Example
///
/// ```rust
/// use image::RgbaImage;
/// use sprite_core_view::{AnimationState, Rect};
///
/// let mut state = AnimationState::new();
/// state.load_image("walk.png", RgbaImage::new(128, 32));
/// assert_eq!(state.frame_count(), 4);
///
/// state.advance();
/// state.advance();
/// assert_eq!(state.view_rect(), Rect::new(64, 0, 32, 32));
/// ```
#[derive(Clone, Debug, Default)]
pub struct AnimationState {
    /// Where the current image came from
    image_path: Option<PathBuf>,
    /// Decoded sprite strip
    image: Option<RgbaImage>,
    /// Width of one frame in pixels
    frame_width: u32,
    /// Height of one frame in pixels (always the image height)
    frame_height: u32,
    /// Current frame index
    current_frame: usize,
}

impl AnimationState {
    /// Create an empty state with no image loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a sprite strip from the file system.
    ///
    /// On failure the state is left exactly as it was.
    pub fn load(&mut self, path: impl AsRef<Path>) -> LoadResult<()> {
        self.load_with(&FileImageSource, path)
    }

    /// Load a sprite strip through a custom [`ImageSource`].
    pub fn load_with<S: ImageSource + ?Sized>(
        &mut self,
        source: &S,
        path: impl AsRef<Path>,
    ) -> LoadResult<()> {
        let path = path.as_ref();
        let image = source.decode(path)?;
        self.load_image(path, image);
        Ok(())
    }

    /// Install an already decoded image.
    ///
    /// Resets the frame geometry to square frames of the image height and
    /// rewinds to the first frame.
    pub fn load_image(&mut self, path: impl Into<PathBuf>, image: RgbaImage) {
        let path = path.into();
        // Frames are assumed to be roughly square until the user says otherwise.
        self.frame_height = image.height();
        self.frame_width = self.frame_height.max(1);
        self.current_frame = 0;
        self.image = Some(image);

        info!(
            path = %path.display(),
            frame_width = self.frame_width,
            frames = self.frame_count(),
            "loaded sprite strip"
        );
        self.image_path = Some(path);
    }

    /// Set the frame width in pixels.
    ///
    /// Zero is treated as one. If the strip now holds fewer frames than the
    /// current index, the index is clamped to the last frame.
    pub fn set_frame_width(&mut self, width: u32) {
        self.frame_width = width.max(1);

        let count = self.frame_count();
        if count > 0 && self.current_frame >= count {
            debug!(
                from = self.current_frame,
                to = count - 1,
                "clamping frame index after width change"
            );
            self.current_frame = count - 1;
        }
    }

    /// Number of whole frames that fit across the image.
    ///
    /// Zero when no image is loaded, the image has no rows, or the frame
    /// width exceeds the image width.
    pub fn frame_count(&self) -> usize {
        match &self.image {
            Some(image) if image.height() > 0 => {
                (image.width() / self.frame_width.max(1)) as usize
            }
            _ => 0,
        }
    }

    /// Advance to the next frame, wrapping at the end of the strip.
    ///
    /// Returns `false` (and leaves the index untouched) when there are no
    /// frames to cycle through.
    pub fn advance(&mut self) -> bool {
        let count = self.frame_count();
        if count == 0 {
            return false;
        }
        self.current_frame = (self.current_frame + 1) % count;
        true
    }

    /// The source rectangle of the current frame inside the strip.
    ///
    /// Returns [`Rect::ZERO`] when there is nothing to draw.
    pub fn view_rect(&self) -> Rect {
        if self.frame_count() == 0 {
            return Rect::ZERO;
        }
        Rect::new(
            self.current_frame as u32 * self.frame_width,
            0,
            self.frame_width,
            self.frame_height,
        )
    }

    /// Get the current frame index.
    #[inline]
    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    /// Get the frame width in pixels.
    #[inline]
    pub fn frame_width(&self) -> u32 {
        self.frame_width
    }

    /// Get the frame height in pixels.
    #[inline]
    pub fn frame_height(&self) -> u32 {
        self.frame_height
    }

    /// Get the frame size as (width, height).
    #[inline]
    pub fn frame_size(&self) -> FrameSize {
        FrameSize::new(self.frame_width, self.frame_height)
    }

    /// The decoded sprite strip, if one is loaded.
    #[inline]
    pub fn image(&self) -> Option<&RgbaImage> {
        self.image.as_ref()
    }

    /// Path of the loaded sprite strip.
    #[inline]
    pub fn image_path(&self) -> Option<&Path> {
        self.image_path.as_deref()
    }

    /// Check if an image is loaded.
    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.image.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::ImageLoadError;
    use image::Rgba;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn strip(width: u32, height: u32) -> AnimationState {
        let mut state = AnimationState::new();
        state.load_image("strip.png", RgbaImage::new(width, height));
        state
    }

    #[test]
    fn test_empty_state() {
        let mut state = AnimationState::new();
        assert!(!state.is_loaded());
        assert_eq!(state.frame_count(), 0);
        assert_eq!(state.frame_size(), FrameSize::new(0, 0));
        assert_eq!(state.view_rect(), Rect::ZERO);

        assert!(!state.advance());
        assert_eq!(state.current_frame(), 0);
    }

    #[test]
    fn test_load_resets_geometry() {
        let mut state = strip(128, 32);
        state.set_frame_width(16);
        state.advance();
        state.advance();
        assert_eq!(state.current_frame(), 2);

        state.load_image("other.png", RgbaImage::new(200, 40));
        assert_eq!(state.current_frame(), 0);
        assert_eq!(state.frame_height(), 40);
        assert_eq!(state.frame_width(), 40);
        assert_eq!(state.frame_count(), 5);
        assert_eq!(state.image_path(), Some(Path::new("other.png")));
    }

    #[test]
    fn test_four_frame_strip() {
        let mut state = strip(128, 32);
        assert_eq!(state.frame_count(), 4);

        state.advance();
        state.advance();
        assert_eq!(state.current_frame(), 2);
        assert_eq!(state.view_rect(), Rect::new(64, 0, 32, 32));

        state.advance();
        state.advance();
        assert_eq!(state.current_frame(), 0);
    }

    #[test]
    fn test_zero_height_image_has_no_frames() {
        let mut state = strip(10, 0);
        assert_eq!(state.frame_width(), 1);
        assert_eq!(state.frame_count(), 0);
        assert_eq!(state.view_rect(), Rect::ZERO);

        assert!(!state.advance());
        assert_eq!(state.current_frame(), 0);
    }

    #[test]
    fn test_view_rect_is_pure() {
        let mut state = strip(96, 32);
        state.advance();
        assert_eq!(state.view_rect(), state.view_rect());
    }

    #[test]
    fn test_zero_width_is_clamped() {
        let mut state = strip(10, 4);
        state.set_frame_width(0);
        assert_eq!(state.frame_width(), 1);
        assert_eq!(state.frame_count(), 10);
    }

    #[test]
    fn test_width_wider_than_image_freezes_playback() {
        let mut state = strip(64, 32);
        state.advance();
        state.set_frame_width(100);
        assert_eq!(state.frame_count(), 0);
        assert_eq!(state.view_rect(), Rect::ZERO);

        for _ in 0..5 {
            assert!(!state.advance());
        }
        assert_eq!(state.current_frame(), 1);
    }

    #[test]
    fn test_shrinking_frame_count_clamps_index() {
        let mut state = strip(128, 16);
        state.set_frame_width(16);
        for _ in 0..7 {
            state.advance();
        }
        assert_eq!(state.current_frame(), 7);

        state.set_frame_width(64);
        assert_eq!(state.frame_count(), 2);
        assert_eq!(state.current_frame(), 1);
        assert_eq!(state.view_rect(), Rect::new(64, 0, 64, 16));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("walk.png");
        RgbaImage::from_pixel(128, 32, Rgba([255, 0, 0, 255]))
            .save(&path)
            .unwrap();

        let mut state = AnimationState::new();
        state.load(&path).unwrap();
        assert_eq!(state.frame_size(), FrameSize::new(32, 32));
        assert_eq!(state.frame_count(), 4);
        assert_eq!(state.image_path(), Some(path.as_path()));
    }

    #[test]
    fn test_failed_load_keeps_state() {
        let dir = TempDir::new().unwrap();
        let mut state = strip(128, 32);
        state.set_frame_width(16);
        state.advance();

        let err = state.load(dir.path().join("missing.png")).unwrap_err();
        assert!(matches!(err, ImageLoadError::NotFound { .. }));

        assert!(state.is_loaded());
        assert_eq!(state.image_path(), Some(Path::new("strip.png")));
        assert_eq!(state.frame_size(), FrameSize::new(16, 32));
        assert_eq!(state.current_frame(), 1);
        assert_eq!(state.frame_count(), 8);
    }

    #[test]
    fn test_load_with_custom_source() {
        struct Fixture;

        impl ImageSource for Fixture {
            fn decode(&self, _path: &Path) -> LoadResult<RgbaImage> {
                Ok(RgbaImage::new(48, 16))
            }
        }

        let mut state = AnimationState::new();
        state.load_with(&Fixture, "fixture://strip").unwrap();
        assert_eq!(state.frame_count(), 3);
    }

    proptest! {
        #[test]
        fn frame_count_is_floor_division(width in 1u32..512, height in 1u32..64, frame_width in 1u32..600) {
            let mut state = strip(width, height);
            state.set_frame_width(frame_width);
            prop_assert_eq!(state.frame_count(), (width / frame_width) as usize);
        }

        #[test]
        fn advancing_a_full_cycle_returns_to_start(width in 1u32..256, frame_width in 1u32..64) {
            let mut state = strip(width, 8);
            state.set_frame_width(frame_width);
            let count = state.frame_count();
            prop_assume!(count > 0);

            let mut seen = Vec::with_capacity(count);
            for _ in 0..count {
                seen.push(state.current_frame());
                prop_assert!(state.advance());
                prop_assert!(state.current_frame() < count);
            }
            prop_assert_eq!(state.current_frame(), 0);
            prop_assert_eq!(seen, (0..count).collect::<Vec<_>>());
        }
    }
}
