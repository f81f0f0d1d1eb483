//! Interpolation sinks
//!
//! A sink turns a config's animated cells into the value the host observes
//! for that property. It runs once per config per frame, after the cells
//! have been stepped.

use motive_core::{PropValue, Scalar};

/// Projects the current cells of a config into its observed value
pub trait Interpolation: Send + Sync {
    fn interpolate(&self, values: &[Scalar]) -> PropValue;
}

impl<F> Interpolation for F
where
    F: Fn(&[Scalar]) -> PropValue + Send + Sync,
{
    fn interpolate(&self, values: &[Scalar]) -> PropValue {
        self(values)
    }
}

/// Reports the cells as-is: one cell as a scalar, several as a vector
#[derive(Clone, Copy, Debug, Default)]
pub struct PassThrough;

impl Interpolation for PassThrough {
    fn interpolate(&self, values: &[Scalar]) -> PropValue {
        match values {
            [single] => PropValue::Scalar(single.clone()),
            many => PropValue::Vector(many.to_vec()),
        }
    }
}

/// What `RangeMap` does with inputs outside its input range
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Extrapolate {
    /// Keep following the linear mapping
    #[default]
    Extend,
    /// Pin to the nearest output bound
    Clamp,
}

/// Linearly maps numeric cells from one range onto another
///
/// Text cells pass through untouched.
#[derive(Clone, Copy, Debug)]
pub struct RangeMap {
    input: (f64, f64),
    output: (f64, f64),
    extrapolate: Extrapolate,
}

impl RangeMap {
    pub fn new(input: (f64, f64), output: (f64, f64)) -> Self {
        Self {
            input,
            output,
            extrapolate: Extrapolate::Extend,
        }
    }

    pub fn extrapolate(mut self, extrapolate: Extrapolate) -> Self {
        self.extrapolate = extrapolate;
        self
    }

    /// Map a single number
    pub fn map(&self, value: f64) -> f64 {
        let (in_lo, in_hi) = self.input;
        let (out_lo, out_hi) = self.output;
        if in_hi == in_lo {
            return if value >= in_hi { out_hi } else { out_lo };
        }
        let mut t = (value - in_lo) / (in_hi - in_lo);
        if self.extrapolate == Extrapolate::Clamp {
            t = t.clamp(0.0, 1.0);
        }
        out_lo + t * (out_hi - out_lo)
    }

    fn map_scalar(&self, value: &Scalar) -> Scalar {
        match value {
            Scalar::Number(n) => Scalar::Number(self.map(*n)),
            text => text.clone(),
        }
    }
}

impl Interpolation for RangeMap {
    fn interpolate(&self, values: &[Scalar]) -> PropValue {
        match values {
            [single] => PropValue::Scalar(self.map_scalar(single)),
            many => PropValue::Vector(many.iter().map(|v| self.map_scalar(v)).collect()),
        }
    }
}
