//! Motive Animation
//!
//! A frame-driven animation engine. Controllers group named properties,
//! and the frame loop steps them once per host frame until every value
//! has come to rest.
//!
//! # Features
//!
//! - **Spring Physics**: fixed 1ms sub-steps, stable across stalled frames
//! - **Duration Animations**: eased interpolation with CSS-style curves
//! - **Decay**: velocity-driven coasting to a natural stop
//! - **Trails**: values that chase another live animated value
//! - **Group Completion**: one `on_end` per controller, with a `no_change`
//!   flag for groups that never moved

pub mod animated;
pub mod config;
pub mod controller;
pub mod easing;
pub mod error;
pub mod frame_loop;
pub mod interpolation;
pub mod motion;
pub mod spring;

pub use animated::{AnimatedValue, Target, TrailRef};
pub use config::{AnimationConfig, AnimationConfigBuilder, Velocity};
pub use controller::{AnimatedProps, Controller, ControllerId, EndResult, SharedController};
pub use easing::Easing;
pub use error::{AnimationError, Result};
pub use frame_loop::{FrameLoop, FrameLoopHandle};
pub use interpolation::{Extrapolate, Interpolation, PassThrough, RangeMap};
pub use motion::{Motion, MotionConfig, MotionPresets};
pub use spring::SpringConfig;
