//! Published cell state
//!
//! Every animated value publishes its numeric position and completion flag
//! through a `SharedCell`. Followers (trailing animations) hold an `Arc` to
//! it and read it without taking any lock, so a frame pass can read one
//! controller's cells while it is stepping another.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Lock-free published view of one animated value
#[derive(Debug)]
pub struct SharedCell {
    /// `f64` bits of the last published position
    bits: AtomicU64,
    done: AtomicBool,
}

impl SharedCell {
    pub fn new(value: f64) -> Self {
        Self {
            bits: AtomicU64::new(value.to_bits()),
            done: AtomicBool::new(false),
        }
    }

    /// Last published position
    pub fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }

    pub fn set(&self, value: f64) {
        self.bits.store(value.to_bits(), Ordering::Release);
    }

    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    pub fn set_done(&self, done: bool) {
        self.done.store(done, Ordering::Release);
    }
}

impl Default for SharedCell {
    fn default() -> Self {
        Self::new(0.0)
    }
}
