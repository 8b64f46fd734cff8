//! The viewer session the UI layer talks to.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{Rgba, RgbaImage};
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::driver::{PlaybackDriver, RepaintSignal, SharedState, TargetFps};
use crate::loader::{FileImageSource, ImageSource, LoadResult};
use crate::render::{self, Projection, SurfaceTracker, SurfaceUpdate};
use crate::{AnimationState, DisplayScale, FrameSize, Rect, ViewerSettings};

/// Everything the host needs for one paint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PaintPlan {
    /// Surface size and how much of it to invalidate
    pub surface: SurfaceUpdate,
    /// The blit to perform, or `None` if there is nothing to draw
    pub projection: Option<Projection>,
}

/// A running previewer session.
///
/// Owns the shared [`AnimationState`], the [`PlaybackDriver`] that advances
/// it, and the display scale. Every read and write of the animation state
/// goes through one lock, so the host never sees a half-applied load.
///
/// ## Example
///
/// ```rust,no_run
/// use sprite_core_view::{NoRepaint, Viewer, ViewerSettings};
///
/// let mut viewer = Viewer::new(&ViewerSettings::default(), NoRepaint)?;
/// viewer.load("sprites/walk.png")?;
/// viewer.set_scale(4.0);
///
/// let plan = viewer.paint();
/// if let Some(projection) = plan.projection {
///     println!("blit {:?} -> {:?}", projection.source, projection.destination);
/// }
/// viewer.shutdown();
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Viewer {
    state: SharedState,
    fps: Arc<TargetFps>,
    driver: PlaybackDriver,
    scale: DisplayScale,
    surface: SurfaceTracker,
    background: Rgba<u8>,
}

impl Viewer {
    /// Start a session and its playback thread.
    ///
    /// If the settings name an image it is loaded right away; a failure is
    /// logged and the session starts empty.
    pub fn new<R: RepaintSignal>(settings: &ViewerSettings, repaint: R) -> io::Result<Self> {
        let mut initial = AnimationState::new();
        if let Some(path) = &settings.image {
            match initial.load(path) {
                Ok(()) => {
                    if let Some(width) = settings.frame_width {
                        initial.set_frame_width(width);
                    }
                }
                Err(err) => warn!(error = %err, "failed to load start-up image"),
            }
        }

        let state: SharedState = Arc::new(Mutex::new(initial));
        let fps = Arc::new(TargetFps::new(settings.fps));
        let driver = PlaybackDriver::spawn(Arc::clone(&state), Arc::clone(&fps), repaint)?;

        Ok(Self {
            state,
            fps,
            driver,
            scale: settings.display_scale(),
            surface: SurfaceTracker::new(),
            background: settings.background_color(),
        })
    }

    /// Load a sprite strip from the file system.
    ///
    /// On failure the previous image, geometry and frame index stay as they
    /// were.
    pub fn load(&self, path: impl AsRef<Path>) -> LoadResult<()> {
        self.load_with(&FileImageSource, path)
    }

    /// Load a sprite strip through a custom [`ImageSource`].
    pub fn load_with<S: ImageSource + ?Sized>(
        &self,
        source: &S,
        path: impl AsRef<Path>,
    ) -> LoadResult<()> {
        let path = path.as_ref();
        // Decode outside the lock so playback keeps ticking during file I/O.
        let image = match source.decode(path) {
            Ok(image) => image,
            Err(err) => {
                warn!(error = %err, "failed to load sprite strip");
                return Err(err);
            }
        };
        self.state.lock().load_image(path, image);
        Ok(())
    }

    /// Set the frame width in pixels. Zero is treated as one.
    pub fn set_frame_width(&self, width: u32) {
        self.state.lock().set_frame_width(width);
    }

    /// Set the target playback rate; the caller keeps it within 1..=60.
    pub fn set_target_fps(&self, fps: u32) {
        info!(fps, "target rate changed");
        self.fps.set(fps);
    }

    /// Get the target playback rate.
    pub fn target_fps(&self) -> u32 {
        self.fps.get()
    }

    /// Set the display scale ratio; the caller keeps it within 1.0..=25.0.
    pub fn set_scale(&mut self, ratio: f64) {
        self.scale = DisplayScale::new(ratio);
    }

    /// Get the display scale.
    pub fn scale(&self) -> DisplayScale {
        self.scale
    }

    /// Set the color painted behind the frame.
    pub fn set_background(&mut self, color: Rgba<u8>) {
        self.background = color;
        self.surface.reset();
    }

    /// Source rectangle of the frame currently on screen.
    pub fn current_view_rectangle(&self) -> Rect {
        self.state.lock().view_rect()
    }

    /// Unscaled size of one frame.
    pub fn current_frame_size(&self) -> FrameSize {
        self.state.lock().frame_size()
    }

    /// Number of frames in the loaded strip.
    pub fn frame_count(&self) -> usize {
        self.state.lock().frame_count()
    }

    /// Index of the frame currently on screen.
    pub fn current_frame(&self) -> usize {
        self.state.lock().current_frame()
    }

    /// Path of the loaded sprite strip.
    pub fn image_path(&self) -> Option<PathBuf> {
        self.state.lock().image_path().map(Path::to_path_buf)
    }

    /// Handle to the shared animation state, for hosts that blit from the
    /// decoded pixels themselves. Hold the lock for the whole blit.
    pub fn state(&self) -> &SharedState {
        &self.state
    }

    /// Work out the next paint: surface size, invalidation and blit geometry.
    pub fn paint(&mut self) -> PaintPlan {
        let state = self.state.lock();
        let surface = self.surface.update(state.frame_size(), self.scale);
        PaintPlan {
            surface,
            projection: render::project(&state, self.scale),
        }
    }

    /// Paint the current frame into a new pixel buffer.
    ///
    /// The buffer has the surface size from [`paint`](Self::paint). Returns
    /// `None` when no image is loaded.
    pub fn render(&mut self) -> Option<RgbaImage> {
        let state = self.state.lock();
        let image = state.image()?;
        let surface = self.surface.update(state.frame_size(), self.scale);
        let projection = render::project(&state, self.scale);
        Some(render::render_frame(
            image,
            projection.as_ref(),
            surface.size,
            self.background,
        ))
    }

    /// Returns `true` while the playback thread is alive.
    pub fn is_playing(&self) -> bool {
        self.driver.is_running()
    }

    /// Stop playback and wait for the driver thread to exit.
    pub fn shutdown(self) {
        let Self { driver, .. } = self;
        driver.stop();
        info!("viewer shut down");
    }
}
