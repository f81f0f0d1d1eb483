//! Animation configs
//!
//! An `AnimationConfig` is one named animated property: its endpoints, the
//! cells being driven, the motion parameters, and the sink that turns the
//! cells into the observed value. Vector quantities are one config with
//! several cells.
//!
//! # Example
//!
//! ```rust
//! use motive_animation::{AnimationConfig, Easing};
//!
//! let opacity = AnimationConfig::builder("opacity")
//!     .from(0.0)
//!     .to(1.0)
//!     .duration(300.0)
//!     .easing(Easing::EaseOutCubic)
//!     .build()
//!     .unwrap();
//!
//! let translate = AnimationConfig::builder("translate")
//!     .from_values([0.0, 0.0])
//!     .to_values([120.0, -40.0])
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(opacity.len(), 1);
//! assert_eq!(translate.len(), 2);
//! ```

use crate::animated::{AnimatedValue, Target, TrailRef};
use crate::easing::Easing;
use crate::error::{AnimationError, Result};
use crate::interpolation::{Interpolation, PassThrough};
use crate::motion::{Motion, MotionConfig, DEFAULT_PRECISION};
use crate::spring::SpringConfig;
use motive_core::{PropValue, Scalar};
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// Most properties animate one to four cells
pub(crate) type Cells<T> = SmallVec<[T; 4]>;

/// Initial velocity of a config's cells
///
/// The unit follows the motion model: units per second for springs, units
/// per millisecond for decay.
#[derive(Clone, Debug, PartialEq)]
pub enum Velocity {
    /// Same velocity for every cell
    Uniform(f64),
    /// One velocity per cell, index-aligned with the endpoints
    PerIndex(Vec<f64>),
}

impl Velocity {
    pub fn at(&self, index: usize) -> f64 {
        match self {
            Velocity::Uniform(v) => *v,
            Velocity::PerIndex(vs) => vs.get(index).copied().unwrap_or(0.0),
        }
    }
}

impl Default for Velocity {
    fn default() -> Self {
        Velocity::Uniform(0.0)
    }
}

/// One named animated property
pub struct AnimationConfig {
    pub(crate) name: String,
    pub(crate) from_values: Cells<Scalar>,
    pub(crate) to_values: Cells<Target>,
    pub(crate) animated_values: Cells<AnimatedValue>,
    pub(crate) immediate: bool,
    pub(crate) delay: f64,
    pub(crate) duration: Option<f64>,
    pub(crate) easing: Easing,
    pub(crate) decay: bool,
    pub(crate) spring: SpringConfig,
    pub(crate) precision: f64,
    pub(crate) clamp: bool,
    pub(crate) velocity: Velocity,
    pub(crate) interpolation: Arc<dyn Interpolation>,
}

impl AnimationConfig {
    /// Start building a config for the property `name`
    pub fn builder(name: impl Into<String>) -> AnimationConfigBuilder {
        AnimationConfigBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of animated cells
    pub fn len(&self) -> usize {
        self.animated_values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animated_values.is_empty()
    }

    pub fn from_values(&self) -> &[Scalar] {
        &self.from_values
    }

    pub fn to_values(&self) -> &[Target] {
        &self.to_values
    }

    pub fn animated_values(&self) -> &[AnimatedValue] {
        &self.animated_values
    }

    /// Follow the cell at `index` from another config
    pub fn trail(&self, index: usize) -> Option<TrailRef> {
        self.animated_values.get(index).map(AnimatedValue::trail)
    }

    /// Whether every cell has concluded
    pub fn is_done(&self) -> bool {
        self.animated_values.iter().all(AnimatedValue::is_done)
    }

    pub fn immediate(&self) -> bool {
        self.immediate
    }

    pub fn delay(&self) -> f64 {
        self.delay
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub fn easing(&self) -> &Easing {
        &self.easing
    }

    pub fn decay(&self) -> bool {
        self.decay
    }

    pub fn spring(&self) -> SpringConfig {
        self.spring
    }

    pub fn precision(&self) -> f64 {
        self.precision
    }

    pub fn clamp(&self) -> bool {
        self.clamp
    }

    pub fn velocity(&self) -> &Velocity {
        &self.velocity
    }

    /// The time-based model cells fall through to when they don't snap
    pub fn motion(&self) -> Motion {
        match self.duration {
            Some(duration) => Motion::Duration(duration),
            None if self.decay => Motion::Decay,
            None => Motion::Spring(self.spring),
        }
    }

    /// Current cell values
    pub fn values(&self) -> Vec<Scalar> {
        self.animated_values
            .iter()
            .map(|cell| cell.value().clone())
            .collect()
    }

    /// Run the cells through the interpolation sink
    pub fn interpolated(&self) -> PropValue {
        let values: Cells<Scalar> = self
            .animated_values
            .iter()
            .map(|cell| cell.value().clone())
            .collect();
        self.interpolation.interpolate(&values)
    }
}

impl fmt::Debug for AnimationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationConfig")
            .field("name", &self.name)
            .field("from_values", &self.from_values)
            .field("to_values", &self.to_values)
            .field("animated_values", &self.animated_values)
            .field("motion", &self.motion())
            .field("immediate", &self.immediate)
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for `AnimationConfig`; parameters are validated by `build()`
pub struct AnimationConfigBuilder {
    name: String,
    from: Vec<Scalar>,
    to: Vec<Target>,
    immediate: bool,
    delay: f64,
    duration: Option<f64>,
    easing: Easing,
    decay: bool,
    spring: SpringConfig,
    precision: f64,
    clamp: bool,
    velocity: Velocity,
    interpolation: Arc<dyn Interpolation>,
}

impl AnimationConfigBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            from: Vec::new(),
            to: Vec::new(),
            immediate: false,
            delay: 0.0,
            duration: None,
            easing: Easing::Linear,
            decay: false,
            spring: SpringConfig::default(),
            precision: DEFAULT_PRECISION,
            clamp: false,
            velocity: Velocity::default(),
            interpolation: Arc::new(PassThrough),
        }
    }

    /// Single-cell start value
    pub fn from(mut self, value: impl Into<Scalar>) -> Self {
        self.from = vec![value.into()];
        self
    }

    /// Single-cell end value (a literal or a trail)
    pub fn to(mut self, target: impl Into<Target>) -> Self {
        self.to = vec![target.into()];
        self
    }

    /// Follow another animated value
    pub fn trail_to(self, leader: TrailRef) -> Self {
        self.to(Target::Trail(leader))
    }

    pub fn from_values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Scalar>,
    {
        self.from = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn to_values<I, V>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Target>,
    {
        self.to = targets.into_iter().map(Into::into).collect();
        self
    }

    pub fn immediate(mut self, immediate: bool) -> Self {
        self.immediate = immediate;
        self
    }

    /// Delay (ms) measured from the controller's start time
    pub fn delay(mut self, delay_ms: f64) -> Self {
        self.delay = delay_ms;
        self
    }

    /// Switch to eased interpolation over `duration_ms`
    pub fn duration(mut self, duration_ms: f64) -> Self {
        self.duration = Some(duration_ms);
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn decay(mut self, decay: bool) -> Self {
        self.decay = decay;
        self
    }

    pub fn spring(mut self, spring: SpringConfig) -> Self {
        self.spring = spring;
        self
    }

    pub fn tension(mut self, tension: f64) -> Self {
        self.spring.tension = tension;
        self
    }

    pub fn friction(mut self, friction: f64) -> Self {
        self.spring.friction = friction;
        self
    }

    pub fn mass(mut self, mass: f64) -> Self {
        self.spring.mass = mass;
        self
    }

    pub fn precision(mut self, precision: f64) -> Self {
        self.precision = precision;
        self
    }

    pub fn clamp(mut self, clamp: bool) -> Self {
        self.clamp = clamp;
        self
    }

    /// Same initial velocity for every cell
    pub fn velocity(mut self, velocity: f64) -> Self {
        self.velocity = Velocity::Uniform(velocity);
        self
    }

    /// One initial velocity per cell
    pub fn velocities(mut self, velocities: impl IntoIterator<Item = f64>) -> Self {
        self.velocity = Velocity::PerIndex(velocities.into_iter().collect());
        self
    }

    /// Apply every parameter of a motion configuration
    ///
    /// Fails only when the configuration names an unknown spring preset.
    pub fn motion(mut self, motion: &MotionConfig) -> Result<Self> {
        self.spring = motion.spring_config()?;
        self.precision = motion.precision;
        self.clamp = motion.clamp;
        self.velocity = Velocity::Uniform(motion.velocity);
        self.delay = motion.delay;
        self.duration = motion.duration;
        self.easing = motion.easing.clone();
        self.decay = motion.decay;
        self.immediate = motion.immediate;
        Ok(self)
    }

    pub fn interpolation(mut self, sink: impl Interpolation + 'static) -> Self {
        self.interpolation = Arc::new(sink);
        self
    }

    /// Validate the parameters and create the cells
    pub fn build(self) -> Result<AnimationConfig> {
        self.validate()?;

        let animated_values = self
            .from
            .iter()
            .map(|from| AnimatedValue::new(from.clone()))
            .collect();

        Ok(AnimationConfig {
            name: self.name,
            from_values: self.from.into_iter().collect(),
            to_values: self.to.into_iter().collect(),
            animated_values,
            immediate: self.immediate,
            delay: self.delay,
            duration: self.duration,
            easing: self.easing,
            decay: self.decay,
            spring: self.spring,
            precision: self.precision,
            clamp: self.clamp,
            velocity: self.velocity,
            interpolation: self.interpolation,
        })
    }

    fn validate(&self) -> Result<()> {
        let invalid = |parameter: &'static str, reason: String| AnimationError::InvalidParameter {
            name: self.name.clone(),
            parameter,
            reason,
        };

        if self.name.is_empty() {
            return Err(invalid("name", "property name must not be empty".into()));
        }
        if self.from.len() != self.to.len() {
            return Err(AnimationError::LengthMismatch {
                name: self.name.clone(),
                from: self.from.len(),
                to: self.to.len(),
            });
        }
        if let Velocity::PerIndex(ref velocities) = self.velocity {
            if velocities.len() != self.from.len() {
                return Err(AnimationError::VelocityLength {
                    name: self.name.clone(),
                    expected: self.from.len(),
                    actual: velocities.len(),
                });
            }
        }
        if !(self.spring.mass.is_finite() && self.spring.mass > 0.0) {
            return Err(AnimationError::InvalidMass {
                name: self.name.clone(),
                mass: self.spring.mass,
            });
        }
        if !self.spring.tension.is_finite() {
            return Err(invalid("tension", format!("{} is not finite", self.spring.tension)));
        }
        if !self.spring.friction.is_finite() {
            return Err(invalid("friction", format!("{} is not finite", self.spring.friction)));
        }
        let timings = [
            ("delay", Some(self.delay)),
            ("duration", self.duration),
            ("precision", Some(self.precision)),
        ];
        for (parameter, value) in timings {
            if let Some(value) = value {
                if !value.is_finite() || value < 0.0 {
                    return Err(invalid(
                        parameter,
                        format!("{value} must be finite and non-negative"),
                    ));
                }
            }
        }
        let velocity_ok = match &self.velocity {
            Velocity::Uniform(v) => v.is_finite(),
            Velocity::PerIndex(vs) => vs.iter().all(|v| v.is_finite()),
        };
        if !velocity_ok {
            return Err(invalid("velocity", "velocities must be finite".into()));
        }
        Ok(())
    }
}
