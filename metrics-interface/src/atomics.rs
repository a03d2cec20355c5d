//! Atomic types used for metrics.
//!
//! Gauges are read by backend collection cycles running on threads the application does not
//! control, so the value they hold must be readable at any time without coordinating with writers.
//! [`AtomicGauge`] stores an `f64` as its raw bit pattern inside an atomic 64-bit integer and
//! applies every read-modify-write through a compare-and-swap loop.
//!
//! We always require an atomic integer of 64 bits regardless of whether the standard library
//! exposes one for the target architecture, so 32-bit targets fall back to `portable-atomic`.

use std::sync::atomic::Ordering;

#[cfg(target_pointer_width = "32")]
use portable_atomic::AtomicU64;
#[cfg(not(target_pointer_width = "32"))]
use std::sync::atomic::AtomicU64;

use crate::GaugeFn;

/// A lock-free `f64` register.
///
/// Starts at `0.0`. Every operation is linearizable with respect to every other operation on the
/// same register: concurrent increments are never lost, and a read never observes a partially
/// applied update.
#[derive(Debug, Default)]
pub struct AtomicGauge {
    bits: AtomicU64,
}

impl AtomicGauge {
    /// Creates a new `AtomicGauge` holding `0.0`.
    pub const fn new() -> Self {
        // 0.0f64 has an all-zero bit pattern.
        Self { bits: AtomicU64::new(0) }
    }

    /// Returns the current value.
    pub fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }

    /// Replaces the current value.
    pub fn set(&self, value: f64) {
        self.bits.store(value.to_bits(), Ordering::Release);
    }

    /// Adds one to the current value.
    pub fn inc(&self) {
        self.update(|curr| curr + 1.0);
    }

    /// Subtracts one from the current value.
    pub fn dec(&self) {
        self.update(|curr| curr - 1.0);
    }

    /// Adds `value` to the current value.
    pub fn add(&self, value: f64) {
        self.update(|curr| curr + value);
    }

    /// Subtracts `value` from the current value.
    pub fn sub(&self, value: f64) {
        self.update(|curr| curr - value);
    }

    fn update<F>(&self, f: F)
    where
        F: Fn(f64) -> f64,
    {
        let mut current = self.bits.load(Ordering::Relaxed);
        loop {
            let next = f(f64::from_bits(current)).to_bits();
            match self.bits.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return,
                Err(actual) => current = actual,
            }
        }
    }
}

impl GaugeFn for AtomicGauge {
    fn set(&self, value: f64) {
        AtomicGauge::set(self, value)
    }

    fn inc(&self) {
        AtomicGauge::inc(self)
    }

    fn dec(&self) {
        AtomicGauge::dec(self)
    }

    fn add(&self, value: f64) {
        AtomicGauge::add(self, value)
    }

    fn sub(&self, value: f64) {
        AtomicGauge::sub(self, value)
    }
}
