//! # sprite-core-view
//!
//! Core playback library for sprite-strip animation previewers.
//!
//! A sprite strip is a single image holding equal-width frames side by side.
//! This crate provides the platform-agnostic pieces a previewer needs:
//! - Loading a strip and tracking its frame geometry and current frame
//! - A background playback thread that advances frames at a target rate
//! - Projecting the current frame onto a scaled display surface
//! - Software and (optionally) canvas blitting with nearest-neighbor scaling
//!
//! Menus, numeric inputs and file pickers are left to the host UI, which
//! drives a [`Viewer`] and repaints when the driver signals it.
//!
//! ## Features
//!
//! - `serde` - Enable serialization/deserialization for settings and geometry
//! - `toml` - Parse [`ViewerSettings`] from TOML
//! - `web` - Enable web/WASM canvas rendering support
//!
//! ## Example
//!
//! ```rust,ignore
//! use sprite_core_view::{Viewer, ViewerSettings};
//!
//! let (repaint, repaints) = crossbeam_channel::bounded(1);
//! let mut viewer = Viewer::new(&ViewerSettings::default(), repaint)?;
//! viewer.load("sprites/walk.png")?;
//! viewer.set_target_fps(12);
//!
//! // In the host's event loop
//! while repaints.recv().is_ok() {
//!     let plan = viewer.paint();
//!     // resize the surface to plan.surface.size, then blit plan.projection
//! }
//! ```

mod animation;
pub mod color;
mod data;
pub mod driver;
pub mod loader;
pub mod render;
mod session;
mod settings;
pub mod sizing;

pub use animation::AnimationState;
pub use data::{FrameSize, Rect};
pub use driver::{NoRepaint, PlaybackDriver, Repaint, RepaintFn, RepaintSignal, TargetFps};
pub use loader::{FileImageSource, ImageLoadError, ImageSource};
pub use render::{Invalidation, Projection, SurfaceTracker, SurfaceUpdate};
pub use session::{PaintPlan, Viewer};
#[cfg(feature = "toml")]
pub use settings::SettingsError;
pub use settings::ViewerSettings;
pub use sizing::DisplayScale;

#[cfg(feature = "web")]
pub use render::web::draw_projection;
