//! Motive Core
//!
//! Shared vocabulary for the Motive animation engine:
//!
//! - **Values**: `Scalar` endpoints (numbers or text) and the `PropValue`
//!   an interpolation sink hands back to the host
//! - **Published cells**: lock-free views of an animated value that other
//!   animations can follow
//! - **Frame hosts**: the clock + "call me before the next paint" contract
//!   the frame loop is driven by
//!
//! # Example
//!
//! ```rust
//! use motive_core::{FrameHost, ManualHost};
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use std::sync::Arc;
//!
//! let host = ManualHost::new(0.0);
//! let ticks = Arc::new(AtomicU32::new(0));
//!
//! let counter = ticks.clone();
//! host.request_frame(Box::new(move || {
//!     counter.fetch_add(1, Ordering::Relaxed);
//! }));
//!
//! host.advance(16.0);
//! assert_eq!(host.run_frame(), 1);
//! assert_eq!(ticks.load(Ordering::Relaxed), 1);
//! assert_eq!(host.now(), 16.0);
//! ```

pub mod cell;
pub mod host;
pub mod value;

pub use cell::SharedCell;
pub use host::{FrameCallback, FrameHost, ManualHost, SystemHost, WakeCallback};
pub use value::{PropValue, Scalar};
