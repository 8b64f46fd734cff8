//! Frame projection and blitting.
//!
//! [`project`] turns the animation state and a display scale into the
//! geometry of a single blit. [`SurfaceTracker`] decides how much of the
//! hosting surface has to be repainted, and [`render_frame`] performs the
//! blit in software for hosts that just want pixels.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::{AnimationState, DisplayScale, FrameSize, Rect};

/// Geometry of one blit from the sprite strip to the display surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    /// Sub-rectangle of the sprite strip holding the current frame
    pub source: Rect,
    /// Where the frame lands on the surface, already scaled
    pub destination: Rect,
    /// Sampling filter for the scale step
    pub filter: FilterType,
}

/// Compute the blit for the current frame.
///
/// Returns `None` when there is nothing to draw: no image is loaded, or the
/// frame width leaves no whole frame in the strip. Frames are always
/// sampled nearest-neighbor so pixel art keeps crisp edges.
///
/// ## Example
///
/// ```rust
/// use image::RgbaImage;
/// use sprite_core_view::{render, AnimationState, DisplayScale, Rect};
///
/// let mut state = AnimationState::new();
/// assert!(render::project(&state, DisplayScale::new(2.0)).is_none());
///
/// state.load_image("walk.png", RgbaImage::new(128, 32));
/// let projection = render::project(&state, DisplayScale::new(2.0)).unwrap();
/// assert_eq!(projection.destination, Rect::new(0, 0, 64, 64));
/// assert_eq!(projection.source, Rect::new(0, 0, 32, 32));
/// ```
pub fn project(state: &AnimationState, scale: DisplayScale) -> Option<Projection> {
    if !state.is_loaded() {
        return None;
    }
    let source = state.view_rect();
    if source.is_empty() {
        return None;
    }
    Some(Projection {
        source,
        destination: Rect::from_size(scale.scaled(state.frame_size())),
        filter: FilterType::Nearest,
    })
}

/// How much of the hosting surface needs repainting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Invalidation {
    /// The surface changed size; repaint everything around it too
    Full,
    /// Only the animation area changed
    Region(Rect),
}

/// Outcome of [`SurfaceTracker::update`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceUpdate {
    /// Size the animation surface should have
    pub size: FrameSize,
    /// What to invalidate before the next blit
    pub invalidation: Invalidation,
}

impl SurfaceUpdate {
    /// Returns `true` if the surface has to be resized.
    #[inline]
    pub fn resized(&self) -> bool {
        self.invalidation == Invalidation::Full
    }
}

/// Remembers the last surface size so size changes trigger a full repaint.
#[derive(Clone, Debug, Default)]
pub struct SurfaceTracker {
    size: Option<FrameSize>,
}

impl SurfaceTracker {
    /// Create a tracker that has not seen a surface yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// The surface size from the last update.
    pub fn size(&self) -> Option<FrameSize> {
        self.size
    }

    /// Recompute the surface size for `frame` at `scale`.
    ///
    /// The first update, and any update that changes the size, asks for a
    /// full invalidate; otherwise only the animation area is dirty.
    pub fn update(&mut self, frame: FrameSize, scale: DisplayScale) -> SurfaceUpdate {
        let size = scale.surface_size(frame);
        let invalidation = if self.size == Some(size) {
            Invalidation::Region(Rect::from_size(size))
        } else {
            tracing::debug!(width = size.width, height = size.height, "resizing surface");
            Invalidation::Full
        };
        self.size = Some(size);
        SurfaceUpdate { size, invalidation }
    }

    /// Forget the last size so the next update repaints everything.
    pub fn reset(&mut self) {
        self.size = None;
    }
}

/// Blit a projected frame onto a freshly cleared surface.
///
/// The surface is filled with `background`, then the source rectangle is
/// scaled with the projection's filter and alpha-composited at the
/// destination. Passing `None` yields just the background.
pub fn render_frame(
    image: &RgbaImage,
    projection: Option<&Projection>,
    surface: FrameSize,
    background: Rgba<u8>,
) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(surface.width, surface.height, background);
    let Some(projection) = projection else {
        return canvas;
    };
    let (source, destination) = (projection.source, projection.destination);
    if destination.is_empty() || !source.fits_within(image.width(), image.height()) {
        return canvas;
    }

    let view = imageops::crop_imm(image, source.x, source.y, source.width, source.height);
    let scaled = imageops::resize(
        &*view,
        destination.width,
        destination.height,
        projection.filter,
    );
    imageops::overlay(
        &mut canvas,
        &scaled,
        i64::from(destination.x),
        i64::from(destination.y),
    );
    canvas
}

/// Web-specific rendering implementation.
#[cfg(feature = "web")]
pub mod web {
    use super::*;
    use wasm_bindgen::JsCast;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

    fn context(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, String> {
        canvas
            .get_context("2d")
            .map_err(|_| "Failed to get 2d context")?
            .ok_or("No 2d context available")?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| "Failed to cast to CanvasRenderingContext2d".to_string())
    }

    fn css_color(color: Rgba<u8>) -> String {
        let [r, g, b, a] = color.0;
        format!("rgba({r},{g},{b},{:.3})", a as f64 / 255.0)
    }

    /// Apply a surface size to a canvas.
    ///
    /// Returns `true` when the canvas actually changed size. Resizing a
    /// canvas clears it, so callers should redraw afterwards.
    pub fn resize_canvas(canvas: &HtmlCanvasElement, size: FrameSize) -> bool {
        if canvas.width() == size.width && canvas.height() == size.height {
            return false;
        }
        canvas.set_width(size.width);
        canvas.set_height(size.height);
        true
    }

    /// Draw a projected frame from a sprite strip element onto a canvas.
    ///
    /// Image smoothing is disabled so scaling stays nearest-neighbor.
    pub fn draw_projection(
        canvas: &HtmlCanvasElement,
        sheet: &HtmlImageElement,
        projection: Option<&Projection>,
        background: Rgba<u8>,
    ) -> Result<(), String> {
        let ctx = context(canvas)?;
        let (width, height) = (canvas.width() as f64, canvas.height() as f64);

        ctx.clear_rect(0.0, 0.0, width, height);
        ctx.set_fill_style_str(&css_color(background));
        ctx.fill_rect(0.0, 0.0, width, height);

        let Some(projection) = projection else {
            return Ok(());
        };
        let (src, dst) = (projection.source, projection.destination);

        ctx.set_image_smoothing_enabled(false);
        ctx.draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
            sheet,
            src.x as f64,
            src.y as f64,
            src.width as f64,
            src.height as f64,
            dst.x as f64,
            dst.y as f64,
            dst.width as f64,
            dst.height as f64,
        )
        .map_err(|_| "Failed to draw sprite frame".to_string())
    }
}
