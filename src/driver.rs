//! Background playback driver.
//!
//! The driver owns a thread that wakes once per frame period, advances the
//! shared [`AnimationState`] and asks the host to repaint. It runs
//! independently of the host's event loop.

use std::io;
use std::panic::resume_unwind;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{RecvTimeoutError, Sender, TrySendError};
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::AnimationState;

/// Lowest rate the fps control allows.
pub const MIN_FPS: u32 = 1;
/// Highest rate the fps control allows.
pub const MAX_FPS: u32 = 60;
/// Rate used until the user picks one.
pub const DEFAULT_FPS: u32 = 6;

/// Animation state shared between the host and the driver thread.
pub type SharedState = Arc<Mutex<AnimationState>>;

/// Target playback rate, readable from the driver while the host writes it.
///
/// A write is picked up at the start of the driver's next period at the
/// latest.
#[derive(Debug)]
pub struct TargetFps(AtomicU32);

impl TargetFps {
    /// Create a rate holder. Zero is treated as one.
    pub fn new(fps: u32) -> Self {
        Self(AtomicU32::new(fps.max(1)))
    }

    /// Get the current target rate.
    #[inline]
    pub fn get(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }

    /// Set the target rate. Zero is treated as one.
    ///
    /// Keeping the rate within [`MIN_FPS`]..=[`MAX_FPS`] is up to the caller;
    /// see [`TargetFps::clamp`].
    #[inline]
    pub fn set(&self, fps: u32) {
        self.0.store(fps.max(1), Ordering::Relaxed);
    }

    /// Clamp a requested rate to the range the controls allow.
    #[inline]
    pub fn clamp(fps: u32) -> u32 {
        fps.clamp(MIN_FPS, MAX_FPS)
    }

    /// Time between two frame advances at the current rate.
    pub fn period(&self) -> Duration {
        Duration::from_secs(1) / self.get().max(1)
    }
}

impl Default for TargetFps {
    fn default() -> Self {
        Self::new(DEFAULT_FPS)
    }
}

/// Message sent to the host when the frame changed and the surface should be
/// repainted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Repaint;

/// Receives repaint requests from the driver thread.
///
/// Implementations must not block: the driver fires the signal and moves on
/// to the next period without waiting for the paint to happen.
pub trait RepaintSignal: Send + 'static {
    /// Ask the host to repaint the animation surface.
    fn request_repaint(&self);
}

/// Sends a [`Repaint`] without blocking.
///
/// With a `bounded(1)` channel, requests that pile up while the host is busy
/// collapse into one.
impl RepaintSignal for Sender<Repaint> {
    fn request_repaint(&self) {
        match self.try_send(Repaint) {
            Ok(()) | Err(TrySendError::Full(_)) => {}
            Err(TrySendError::Disconnected(_)) => trace!("repaint receiver is gone"),
        }
    }
}

/// Adapts a closure into a [`RepaintSignal`].
pub struct RepaintFn<F>(pub F);

impl<F: Fn() + Send + 'static> RepaintSignal for RepaintFn<F> {
    fn request_repaint(&self) {
        (self.0)()
    }
}

/// A [`RepaintSignal`] that drops every request.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoRepaint;

impl RepaintSignal for NoRepaint {
    fn request_repaint(&self) {}
}

/// Handle to the playback thread.
///
/// Each period the thread advances the shared state under its lock and then
/// fires the repaint signal. Dropping the handle stops and joins the thread;
/// if the thread panicked, the panic is propagated.
///
/// ## Example
///
/// ```rust
/// use std::sync::Arc;
/// use parking_lot::Mutex;
/// use sprite_core_view::{AnimationState, NoRepaint, PlaybackDriver, TargetFps};
///
/// let state = Arc::new(Mutex::new(AnimationState::new()));
/// let fps = Arc::new(TargetFps::new(30));
///
/// let driver = PlaybackDriver::spawn(state, fps.clone(), NoRepaint).unwrap();
/// fps.set(12);
/// driver.stop();
/// ```
pub struct PlaybackDriver {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
    fps: Arc<TargetFps>,
}

impl PlaybackDriver {
    /// Spawn the playback thread.
    pub fn spawn<R: RepaintSignal>(
        state: SharedState,
        fps: Arc<TargetFps>,
        repaint: R,
    ) -> io::Result<Self> {
        let (stop, stopped) = crossbeam_channel::bounded::<()>(1);
        let thread_fps = Arc::clone(&fps);

        let handle = thread::Builder::new()
            .name("playback-driver".into())
            .spawn(move || {
                debug!(fps = thread_fps.get(), "playback driver starting");
                let mut ticks: u64 = 0;
                loop {
                    let tick_start = Instant::now();
                    let deadline = tick_start + thread_fps.period();
                    match stopped.recv_deadline(deadline) {
                        Err(RecvTimeoutError::Timeout) => {}
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }

                    let frame = {
                        let mut state = state.lock();
                        state.advance();
                        state.current_frame()
                    };
                    ticks += 1;
                    trace!(frame, "tick");
                    repaint.request_repaint();
                }
                debug!(ticks, "playback driver exiting");
            })?;

        Ok(Self {
            stop: Some(stop),
            handle: Some(handle),
            fps,
        })
    }

    /// The rate this driver reads every period.
    pub fn target_fps(&self) -> &Arc<TargetFps> {
        &self.fps
    }

    /// Returns `true` while the playback thread is alive.
    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Stop the playback thread and wait for it to exit.
    ///
    /// Returns within one frame period.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(stop) = self.stop.take() {
            // A full channel already holds a stop request; a disconnected one
            // means the thread is gone.
            stop.try_send(()).ok();
        }
        // Wait for it to exit and propagate its panic if it panicked.
        if let Some(handle) = self.handle.take() {
            if let Err(payload) = handle.join() {
                if !thread::panicking() {
                    resume_unwind(payload);
                }
            }
        }
    }
}

impl Drop for PlaybackDriver {
    fn drop(&mut self) {
        self.shutdown();
    }
}
