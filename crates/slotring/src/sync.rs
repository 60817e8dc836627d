//! Synchronization primitives, swapped for loom's under `--features loom`.
//!
//! Everything in the crate that takes part in the guard protocol imports its
//! atomics, cell, and spin/yield hints from here so the loom tests exercise
//! the real `Guard` and `Ring` rather than a copy.

#[cfg(feature = "loom")]
pub(crate) use loom::sync::atomic::{AtomicBool, AtomicU64, Ordering};

#[cfg(not(feature = "loom"))]
pub(crate) use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

#[cfg(feature = "loom")]
pub(crate) use loom::cell::UnsafeCell;

#[cfg(feature = "loom")]
pub(crate) fn spin_loop() {
    loom::hint::spin_loop();
}

#[cfg(not(feature = "loom"))]
pub(crate) fn spin_loop() {
    std::hint::spin_loop();
}

#[cfg(feature = "loom")]
pub(crate) fn yield_now() {
    loom::thread::yield_now();
}

#[cfg(not(feature = "loom"))]
pub(crate) fn yield_now() {
    std::thread::yield_now();
}

/// `std::cell::UnsafeCell` with loom's closure-based access API.
#[cfg(not(feature = "loom"))]
#[derive(Debug)]
pub(crate) struct UnsafeCell<T>(std::cell::UnsafeCell<T>);

#[cfg(not(feature = "loom"))]
impl<T> UnsafeCell<T> {
    pub(crate) const fn new(value: T) -> Self {
        Self(std::cell::UnsafeCell::new(value))
    }

    #[inline]
    pub(crate) fn with<R>(&self, f: impl FnOnce(*const T) -> R) -> R {
        f(self.0.get())
    }

    #[inline]
    pub(crate) fn with_mut<R>(&self, f: impl FnOnce(*mut T) -> R) -> R {
        f(self.0.get())
    }
}
