//! Spring physics
//!
//! Damped harmonic oscillator integrated with fixed 1ms semi-implicit Euler
//! sub-steps. Stepping with a fixed sub-step keeps results reproducible
//! regardless of the host's frame cadence.

use serde::{Deserialize, Serialize};

/// Frame gaps longer than this are treated as a single frame
pub const MAX_FRAME_GAP_MS: f64 = 64.0;

/// Configuration for a spring animation
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringConfig {
    pub tension: f64,
    pub friction: f64,
    pub mass: f64,
}

impl SpringConfig {
    /// Create a new spring configuration
    pub fn new(tension: f64, friction: f64, mass: f64) -> Self {
        Self {
            tension,
            friction,
            mass,
        }
    }

    /// A gentle, slow spring (good for page transitions)
    pub fn gentle() -> Self {
        Self::new(120.0, 14.0, 1.0)
    }

    /// A wobbly spring with overshoot (good for playful UI)
    pub fn wobbly() -> Self {
        Self::new(180.0, 12.0, 1.0)
    }

    /// A stiff, snappy spring
    pub fn stiff() -> Self {
        Self::new(210.0, 20.0, 1.0)
    }

    /// A slow spring with heavy friction
    pub fn slow() -> Self {
        Self::new(280.0, 60.0, 1.0)
    }

    /// Overdamped and sluggish
    pub fn molasses() -> Self {
        Self::new(280.0, 120.0, 1.0)
    }

    /// Look up a preset by name
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "default" => Some(Self::default()),
            "gentle" => Some(Self::gentle()),
            "wobbly" => Some(Self::wobbly()),
            "stiff" => Some(Self::stiff()),
            "slow" => Some(Self::slow()),
            "molasses" => Some(Self::molasses()),
            _ => None,
        }
    }

    /// Friction at which this spring is critically damped
    pub fn critical_friction(&self) -> f64 {
        2.0 * (self.tension * self.mass).sqrt()
    }

    /// Check if the spring is underdamped (will oscillate)
    pub fn is_underdamped(&self) -> bool {
        self.friction < self.critical_friction()
    }

    /// Check if the spring is overdamped (slow settling, no oscillation)
    pub fn is_overdamped(&self) -> bool {
        self.friction > self.critical_friction()
    }

    /// Advance `(position, velocity)` toward `to` by `steps` 1ms sub-steps
    ///
    /// Velocity is in units per second, matching the tension/friction
    /// constants; each sub-step moves it by `acceleration / 1000`.
    pub fn integrate(&self, mut position: f64, mut velocity: f64, to: f64, steps: u64) -> (f64, f64) {
        for _ in 0..steps {
            let force = -self.tension * (position - to);
            let damping = -self.friction * velocity;
            let acceleration = (force + damping) / self.mass;
            velocity += acceleration / 1000.0;
            position += velocity / 1000.0;
        }
        (position, velocity)
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::new(170.0, 26.0, 1.0)
    }
}

/// Whether a spring at `position` moving with `velocity` has concluded
///
/// A clamped spring ends the moment it crosses `to` (relative to the
/// `from -> to` direction). Otherwise it ends once both the velocity and,
/// unless tension is zero, the remaining displacement are within
/// `precision`.
pub fn spring_settled(
    spring: &SpringConfig,
    precision: f64,
    clamp: bool,
    from: f64,
    to: f64,
    position: f64,
    velocity: f64,
) -> bool {
    let overshooting = clamp
        && spring.tension != 0.0
        && if from < to { position > to } else { position < to };
    let resting = velocity.abs() <= precision;
    let displaced = spring.tension == 0.0 || (to - position).abs() <= precision;
    overshooting || (resting && displaced)
}

/// Number of whole 1ms sub-steps between `last_time` and `time`
///
/// Gaps above `MAX_FRAME_GAP_MS` collapse to zero steps: after a long stall
/// (backgrounded tab, debugger pause) the spring resumes from where it was
/// instead of integrating a burst of catch-up steps.
pub fn sub_steps(last_time: f64, time: f64) -> u64 {
    let last_time = if time > last_time + MAX_FRAME_GAP_MS {
        tracing::trace!(gap_ms = time - last_time, "spring: clamping stalled frame");
        time
    } else {
        last_time
    };
    let steps = (time - last_time).floor();
    if steps > 0.0 {
        steps as u64
    } else {
        0
    }
}
