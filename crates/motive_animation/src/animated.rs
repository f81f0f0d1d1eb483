//! Animated value cells and animation targets
//!
//! An `AnimatedValue` is one scalar being driven by the frame loop, plus the
//! scratch state the integrators carry between frames. Its numeric position
//! is published through a `SharedCell` so other configs can trail it.

use motive_core::{Scalar, SharedCell};
use std::sync::Arc;

/// One animated scalar and its integration scratch state
///
/// Only the frame loop writes to a cell; everything public is read-only.
#[derive(Debug)]
pub struct AnimatedValue {
    value: Scalar,
    last_position: f64,
    last_velocity: Option<f64>,
    last_time: Option<f64>,
    done: bool,
    shared: Arc<SharedCell>,
}

impl AnimatedValue {
    pub(crate) fn new(initial: Scalar) -> Self {
        let position = initial.as_number().unwrap_or(0.0);
        Self {
            value: initial,
            last_position: position,
            last_velocity: None,
            last_time: None,
            done: false,
            shared: Arc::new(SharedCell::new(position)),
        }
    }

    /// Current value
    pub fn value(&self) -> &Scalar {
        &self.value
    }

    /// Position committed by the most recent step
    pub fn last_position(&self) -> f64 {
        self.last_position
    }

    /// Spring velocity carried into the next frame, once the spring has run
    pub fn last_velocity(&self) -> Option<f64> {
        self.last_velocity
    }

    /// Time of the last spring step, once the spring has run
    pub fn last_time(&self) -> Option<f64> {
        self.last_time
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// A read-only handle for configs that want to follow this value
    pub fn trail(&self) -> TrailRef {
        TrailRef {
            cell: Arc::clone(&self.shared),
        }
    }

    pub(crate) fn set_value(&mut self, value: Scalar) {
        if let Scalar::Number(n) = value {
            self.shared.set(n);
        }
        self.value = value;
    }

    pub(crate) fn set_last_position(&mut self, position: f64) {
        self.last_position = position;
    }

    pub(crate) fn set_spring_state(&mut self, velocity: f64, time: f64) {
        self.last_velocity = Some(velocity);
        self.last_time = Some(time);
    }

    pub(crate) fn finish(&mut self) {
        self.done = true;
        self.shared.set_done(true);
    }
}

impl Drop for AnimatedValue {
    fn drop(&mut self) {
        // Followers of a dropped value settle on its last position
        self.shared.set_done(true);
    }
}

/// A non-owning, read-only view of another config's animated value
#[derive(Clone, Debug)]
pub struct TrailRef {
    cell: Arc<SharedCell>,
}

impl TrailRef {
    /// Current position of the followed value
    pub fn get_value(&self) -> f64 {
        self.cell.get()
    }

    /// Whether the followed value has concluded
    pub fn is_done(&self) -> bool {
        self.cell.is_done()
    }
}

/// Where an animated value is headed
#[derive(Clone, Debug)]
pub enum Target {
    /// A fixed endpoint
    Literal(Scalar),
    /// Another live animated value, re-read every frame
    Trail(TrailRef),
}

impl Target {
    pub fn is_trail(&self) -> bool {
        matches!(self, Target::Trail(_))
    }

    /// The endpoint for this frame
    pub fn resolve(&self) -> Scalar {
        match self {
            Target::Literal(value) => value.clone(),
            Target::Trail(trail) => Scalar::Number(trail.get_value()),
        }
    }
}

impl From<Scalar> for Target {
    fn from(value: Scalar) -> Self {
        Target::Literal(value)
    }
}

impl From<f64> for Target {
    fn from(value: f64) -> Self {
        Target::Literal(Scalar::Number(value))
    }
}

impl From<&str> for Target {
    fn from(value: &str) -> Self {
        Target::Literal(Scalar::from(value))
    }
}

impl From<TrailRef> for Target {
    fn from(trail: TrailRef) -> Self {
        Target::Trail(trail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_cell_starts_at_initial() {
        let cell = AnimatedValue::new(Scalar::Number(5.0));
        assert_eq!(cell.value(), &Scalar::Number(5.0));
        assert_eq!(cell.last_position(), 5.0);
        assert_eq!(cell.last_velocity(), None);
        assert_eq!(cell.last_time(), None);
        assert!(!cell.is_done());
    }

    #[test]
    fn test_trail_sees_published_value() {
        let mut cell = AnimatedValue::new(Scalar::Number(0.0));
        let trail = cell.trail();
        assert_eq!(trail.get_value(), 0.0);

        cell.set_value(Scalar::Number(42.0));
        assert_eq!(trail.get_value(), 42.0);
        assert!(!trail.is_done());

        cell.finish();
        assert!(trail.is_done());
    }

    #[test]
    fn test_text_values_keep_last_number_published() {
        let mut cell = AnimatedValue::new(Scalar::Number(3.0));
        let trail = cell.trail();
        cell.set_value(Scalar::Text("auto".into()));
        assert_eq!(trail.get_value(), 3.0);
    }

    #[test]
    fn test_dropping_leader_releases_followers() {
        let cell = AnimatedValue::new(Scalar::Number(7.0));
        let trail = cell.trail();
        drop(cell);
        assert!(trail.is_done());
        assert_eq!(trail.get_value(), 7.0);
    }

    #[test]
    fn test_target_resolution() {
        let leader = AnimatedValue::new(Scalar::Number(9.0));
        let literal: Target = 1.0.into();
        let trail: Target = leader.trail().into();

        assert!(!literal.is_trail());
        assert!(trail.is_trail());
        assert_eq!(literal.resolve(), Scalar::Number(1.0));
        assert_eq!(trail.resolve(), Scalar::Number(9.0));
    }
}
