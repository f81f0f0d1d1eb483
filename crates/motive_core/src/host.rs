//! Frame host contract
//!
//! The frame loop never reads a clock or schedules itself directly. The host
//! supplies both through `FrameHost`:
//!
//! - `now()` returns a monotonic timestamp in milliseconds
//! - `request_frame()` runs a callback once, before the next paint
//!
//! Two hosts ship with the crate. `ManualHost` has a caller-driven clock and
//! is what headless runs and tests use. `SystemHost` reads
//! `std::time::Instant` and can wake an event loop when a frame is wanted.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

/// One-shot callback scheduled for the next frame
pub type FrameCallback = Box<dyn FnOnce() + Send>;

/// Callback type for waking up an event loop when a frame is requested
///
/// This is called from `request_frame`; it should only nudge the event loop
/// (e.g. via an `EventLoopProxy`), never run the frame itself.
pub type WakeCallback = Arc<dyn Fn() + Send + Sync>;

/// Clock and frame scheduling supplied by the embedding environment
///
/// Implementations must not run the callback synchronously from inside
/// `request_frame`; frame ticks must never overlap.
pub trait FrameHost: Send + Sync {
    /// Monotonic time in milliseconds
    fn now(&self) -> f64;

    /// Schedule `callback` to run once before the next paint
    fn request_frame(&self, callback: FrameCallback);
}

/// Pending frame callbacks, drained once per frame
#[derive(Default)]
struct FrameQueue {
    pending: Mutex<Vec<FrameCallback>>,
    requests: AtomicU64,
}

impl FrameQueue {
    fn push(&self, callback: FrameCallback) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(callback);
    }

    fn len(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Run every callback queued before this call
    ///
    /// Callbacks requested while running land in the next frame.
    fn run(&self) -> usize {
        let callbacks =
            std::mem::take(&mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner));
        let count = callbacks.len();
        for callback in callbacks {
            callback();
        }
        count
    }
}

// ============================================================================
// Manual Host
// ============================================================================

/// A deterministic host with a caller-driven clock
///
/// ```rust
/// use motive_core::{FrameHost, ManualHost};
///
/// let host = ManualHost::new(1000.0);
/// host.advance(16.0);
/// assert_eq!(host.now(), 1016.0);
/// assert_eq!(host.pending_frames(), 0);
/// ```
pub struct ManualHost {
    /// `f64` bits of the current time
    time: AtomicU64,
    queue: FrameQueue,
}

impl ManualHost {
    pub fn new(start_ms: f64) -> Self {
        Self {
            time: AtomicU64::new(start_ms.to_bits()),
            queue: FrameQueue::default(),
        }
    }

    /// Set the clock to an absolute time
    pub fn set_time(&self, time_ms: f64) {
        self.time.store(time_ms.to_bits(), Ordering::Release);
    }

    /// Move the clock forward by `dt_ms`
    pub fn advance(&self, dt_ms: f64) {
        self.set_time(self.now() + dt_ms);
    }

    /// Run the callbacks requested for this frame, returning how many ran
    pub fn run_frame(&self) -> usize {
        self.queue.run()
    }

    /// Advance the clock by `dt_ms` and run one frame
    pub fn step(&self, dt_ms: f64) -> usize {
        self.advance(dt_ms);
        self.run_frame()
    }

    /// Number of callbacks waiting for the next frame
    pub fn pending_frames(&self) -> usize {
        self.queue.len()
    }

    /// Total number of `request_frame` calls since creation
    pub fn frame_requests(&self) -> u64 {
        self.queue.requests.load(Ordering::Relaxed)
    }
}

impl Default for ManualHost {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl FrameHost for ManualHost {
    fn now(&self) -> f64 {
        f64::from_bits(self.time.load(Ordering::Acquire))
    }

    fn request_frame(&self, callback: FrameCallback) {
        self.queue.push(callback);
    }
}

// ============================================================================
// System Host
// ============================================================================

/// A host backed by `std::time::Instant`
///
/// The event loop calls `run_frame()` once per display frame. Frame
/// requests set a `needs_redraw` flag and invoke the wake callback, if any,
/// so an idle event loop knows to schedule that frame.
///
/// ```ignore
/// let mut host = SystemHost::new();
/// let proxy = event_loop.create_proxy();
/// host.set_wake_callback(move || { let _ = proxy.send_event(Wake); });
/// ```
pub struct SystemHost {
    origin: Instant,
    queue: FrameQueue,
    needs_redraw: AtomicBool,
    wake_callback: Option<WakeCallback>,
}

impl SystemHost {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            queue: FrameQueue::default(),
            needs_redraw: AtomicBool::new(false),
            wake_callback: None,
        }
    }

    /// Set a callback that will be called whenever a frame is requested
    pub fn set_wake_callback<F>(&mut self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.wake_callback = Some(Arc::new(callback));
    }

    /// Check and clear the needs_redraw flag
    pub fn take_needs_redraw(&self) -> bool {
        self.needs_redraw.swap(false, Ordering::Acquire)
    }

    /// Run the callbacks requested for this frame, returning how many ran
    pub fn run_frame(&self) -> usize {
        self.queue.run()
    }

    pub fn pending_frames(&self) -> usize {
        self.queue.len()
    }
}

impl Default for SystemHost {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameHost for SystemHost {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }

    fn request_frame(&self, callback: FrameCallback) {
        self.queue.push(callback);
        self.needs_redraw.store(true, Ordering::Release);
        if let Some(ref wake) = self.wake_callback {
            tracing::trace!("SystemHost: waking event loop for next frame");
            wake();
        }
    }
}
