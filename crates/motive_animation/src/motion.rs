//! Motion models and motion configuration
//!
//! A config animates with exactly one model, chosen by which parameters are
//! present: duration (eased interpolation), then decay, then spring.
//! Immediate snapping is decided per value before any model runs.
//!
//! Motion parameters can also be loaded from TOML:
//!
//! ```toml
//! [presets.panel]
//! preset = "gentle"
//! friction = 18.0
//!
//! [presets.fade]
//! duration = 250.0
//! easing = "ease_out_cubic"
//! ```

use crate::easing::Easing;
use crate::error::{AnimationError, Result};
use crate::spring::SpringConfig;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Per-millisecond retention factor of the decay model
pub const DECAY_DAMPING: f64 = 0.998;

/// A decaying value is at rest once it moves less than this in one frame
pub const DECAY_REST_DELTA: f64 = 0.1;

/// Default settle threshold for springs
pub const DEFAULT_PRECISION: f64 = 0.01;

/// The model a config animates with
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Motion {
    /// Eased interpolation over a fixed duration (ms)
    Duration(f64),
    /// Exponential slow-down driven by the initial velocity
    Decay,
    /// Damped spring toward the target
    Spring(SpringConfig),
}

/// Position of a duration animation `elapsed` ms after its delay
///
/// Progress is clamped to `0..=1` so a late frame never overshoots the
/// easing curve; a zero duration jumps straight to the end.
pub fn eased_position(from: f64, to: f64, easing: &Easing, elapsed: f64, duration: f64) -> f64 {
    let t = if duration > 0.0 {
        (elapsed / duration).clamp(0.0, 1.0)
    } else {
        1.0
    };
    from + easing.apply(t) * (to - from)
}

/// Position of a decaying value `elapsed` ms after it was released
///
/// `velocity` is in units per millisecond, so a value coasts a total of
/// `velocity / (1 - DECAY_DAMPING)` units.
pub fn decay_position(from: f64, velocity: f64, elapsed: f64) -> f64 {
    let k = 1.0 - DECAY_DAMPING;
    from + (velocity / k) * (1.0 - (-k * elapsed).exp())
}

// ============================================================================
// Motion Configuration
// ============================================================================

/// Every motion parameter of a config, loadable from TOML
///
/// Spring constants left unset fall back to `preset` (or the default
/// spring when no preset is named).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Named spring preset used as the base for tension/friction/mass
    pub preset: Option<String>,
    pub tension: Option<f64>,
    pub friction: Option<f64>,
    pub mass: Option<f64>,
    pub precision: f64,
    pub clamp: bool,
    /// Initial velocity: units per second for springs, per ms for decay
    pub velocity: f64,
    /// Delay before the value starts moving (ms)
    pub delay: f64,
    /// Duration (ms); switches the config to eased interpolation
    pub duration: Option<f64>,
    pub easing: Easing,
    pub decay: bool,
    pub immediate: bool,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            preset: None,
            tension: None,
            friction: None,
            mass: None,
            precision: DEFAULT_PRECISION,
            clamp: false,
            velocity: 0.0,
            delay: 0.0,
            duration: None,
            easing: Easing::Linear,
            decay: false,
            immediate: false,
        }
    }
}

impl MotionConfig {
    /// Spring motion from a preset
    pub fn spring(config: SpringConfig) -> Self {
        Self {
            tension: Some(config.tension),
            friction: Some(config.friction),
            mass: Some(config.mass),
            ..Self::default()
        }
    }

    /// Duration motion with the given easing
    pub fn timed(duration_ms: f64, easing: Easing) -> Self {
        Self {
            duration: Some(duration_ms),
            easing,
            ..Self::default()
        }
    }

    /// Parse a single motion table
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: MotionConfig = toml::from_str(source)?;
        config.spring_config()?;
        Ok(config)
    }

    /// Resolve the spring constants: preset first, explicit fields on top
    pub fn spring_config(&self) -> Result<SpringConfig> {
        let base = match self.preset.as_deref() {
            Some(name) => SpringConfig::preset(name)
                .ok_or_else(|| AnimationError::Config(format!("unknown spring preset '{name}'")))?,
            None => SpringConfig::default(),
        };
        Ok(SpringConfig {
            tension: self.tension.unwrap_or(base.tension),
            friction: self.friction.unwrap_or(base.friction),
            mass: self.mass.unwrap_or(base.mass),
        })
    }

    /// The model this configuration selects
    pub fn motion(&self) -> Result<Motion> {
        Ok(match self.duration {
            Some(duration) => Motion::Duration(duration),
            None if self.decay => Motion::Decay,
            None => Motion::Spring(self.spring_config()?),
        })
    }
}

/// A named set of motion configurations (`[presets.<name>]` tables)
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MotionPresets {
    #[serde(default)]
    pub presets: IndexMap<String, MotionConfig>,
}

impl MotionPresets {
    /// Parse and validate a presets file
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let presets: MotionPresets = toml::from_str(source)?;
        for (name, config) in &presets.presets {
            config.spring_config().map_err(|err| {
                AnimationError::Config(format!("preset '{name}': {err}"))
            })?;
        }
        tracing::debug!(count = presets.presets.len(), "loaded motion presets");
        Ok(presets)
    }

    pub fn get(&self, name: &str) -> Option<&MotionConfig> {
        self.presets.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_exactness() {
        let e = Easing::Linear;
        assert_eq!(eased_position(0.0, 1.0, &e, 0.0, 100.0), 0.0);
        assert_eq!(eased_position(0.0, 1.0, &e, 50.0, 100.0), 0.5);
        assert_eq!(eased_position(0.0, 1.0, &e, 100.0, 100.0), 1.0);
        assert_eq!(eased_position(0.0, 1.0, &e, 250.0, 100.0), 1.0);
        assert_eq!(eased_position(0.0, 1.0, &e, -10.0, 100.0), 0.0);
        assert_eq!(eased_position(3.0, 7.0, &e, 0.0, 0.0), 7.0);
    }

    #[test]
    fn test_decay_approaches_limit() {
        let limit = 1.0 / (1.0 - DECAY_DAMPING);
        assert_eq!(decay_position(10.0, 1.0, 0.0), 10.0);
        let late = decay_position(0.0, 1.0, 10_000.0);
        assert!(late < limit && late > limit * 0.99);
        assert!(decay_position(0.0, -1.0, 100.0) < 0.0);
    }

    #[test]
    fn test_motion_priority() {
        let mut config = MotionConfig::default();
        assert_eq!(config.motion().unwrap(), Motion::Spring(SpringConfig::default()));

        config.decay = true;
        assert_eq!(config.motion().unwrap(), Motion::Decay);

        config.duration = Some(300.0);
        assert_eq!(config.motion().unwrap(), Motion::Duration(300.0));
    }

    #[test]
    fn test_shorthand_constructors() {
        let wobbly = MotionConfig::spring(SpringConfig::wobbly());
        assert_eq!(wobbly.spring_config().unwrap(), SpringConfig::wobbly());
        assert_eq!(wobbly.motion().unwrap(), Motion::Spring(SpringConfig::wobbly()));

        let fade = MotionConfig::timed(200.0, Easing::EaseOutQuad);
        assert_eq!(fade.motion().unwrap(), Motion::Duration(200.0));
        assert!(matches!(fade.easing, Easing::EaseOutQuad));
        assert_eq!(fade.delay, 0.0);
    }

    #[test]
    fn test_parse_single_motion() {
        let config = MotionConfig::from_toml_str(
            r#"
            preset = "wobbly"
            mass = 2.0
            clamp = true
            "#,
        )
        .unwrap();

        let spring = config.spring_config().unwrap();
        assert_eq!(spring.tension, 180.0);
        assert_eq!(spring.friction, 12.0);
        assert_eq!(spring.mass, 2.0);
        assert!(config.clamp);
        assert_eq!(config.precision, DEFAULT_PRECISION);
    }

    #[test]
    fn test_parse_presets() {
        let presets = MotionPresets::from_toml_str(
            r#"
            [presets.fade]
            duration = 250.0
            easing = "ease_out_cubic"

            [presets.curve]
            duration = 400.0
            easing = { cubic_bezier = [0.25, 0.1, 0.25, 1.0] }

            [presets.fling]
            decay = true
            velocity = 0.5
            "#,
        )
        .unwrap();

        assert_eq!(presets.names().collect::<Vec<_>>(), vec!["fade", "curve", "fling"]);
        let fade = presets.get("fade").unwrap();
        assert_eq!(fade.motion().unwrap(), Motion::Duration(250.0));
        assert!(matches!(fade.easing, Easing::EaseOutCubic));
        assert!(matches!(
            presets.get("curve").unwrap().easing,
            Easing::CubicBezier(..)
        ));
        assert_eq!(presets.get("fling").unwrap().motion().unwrap(), Motion::Decay);
    }

    #[test]
    fn test_unknown_preset_is_rejected() {
        let err = MotionPresets::from_toml_str("[presets.x]\npreset = \"bouncy\"\n").unwrap_err();
        assert!(matches!(err, AnimationError::Config(msg) if msg.contains("bouncy")));

        let err = MotionConfig::from_toml_str("tension = \"high\"").unwrap_err();
        assert!(matches!(err, AnimationError::Config(_)));
    }
}
