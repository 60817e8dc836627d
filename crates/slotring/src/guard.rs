//! Spinning mutual-exclusion guard with two context-specific entry points.
//!
//! One lock word protects the ring state. Two callers contend for it and they
//! live under different rules:
//!
//! | Entry                       | Caller            | Interrupts       | While contended     |
//! |-----------------------------|-------------------|------------------|---------------------|
//! | [`Guard::with_irqsave`]     | periodic producer | saved + disabled | busy-spin only      |
//! | [`Guard::with_lock`]        | trigger consumer  | left untouched   | spin, then yield    |
//!
//! The producer may itself run from an interrupt-like context, so its entry
//! masks local interrupts for the whole critical section (the consumer on the
//! same CPU cannot preempt it while it holds the lock) and it never gives up
//! the CPU. The consumer already runs in a blockable context; it contends for
//! the same lock word but is free to yield.
//!
//! Critical sections are closures: one entry, one exit. The lock is released
//! (and the interrupt state restored) by a drop guard, so unwinding out of the
//! closure cannot leave the guard held.

use crate::backoff::Backoff;
use crate::invariants::debug_assert_guard_held;
use crate::sync::{AtomicBool, Ordering, UnsafeCell};
use crossbeam_utils::CachePadded;
use std::fmt;
use std::marker::PhantomData;

/// Local interrupt control for the producer entry.
///
/// Mirrors the save/disable/restore triple of an `irqsave` spinlock. On hosted
/// targets there is nothing to mask and [`NoInterrupts`] is used; a bare-metal
/// port supplies an implementation that writes the CPU's interrupt-enable flag.
pub trait LocalInterrupts {
    /// Interrupt state captured on entry and handed back on exit.
    type Flags;

    /// Save the current interrupt state and disable local interrupts.
    fn save_and_disable() -> Self::Flags;

    /// Restore a state previously returned by [`save_and_disable`](Self::save_and_disable).
    fn restore(flags: Self::Flags);
}

/// Interrupt control for hosted targets: masking is a no-op.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NoInterrupts;

impl LocalInterrupts for NoInterrupts {
    type Flags = ();

    #[inline]
    fn save_and_disable() -> Self::Flags {}

    #[inline]
    fn restore(_flags: Self::Flags) {}
}

/// Mutual-exclusion guard around a value of type `T`.
///
/// `I` selects how the producer entry masks local interrupts.
pub struct Guard<T, I: LocalInterrupts = NoInterrupts> {
    locked: CachePadded<AtomicBool>,
    value: UnsafeCell<T>,
    _interrupts: PhantomData<fn() -> I>,
}

// Safety: access to `value` only happens inside a critical section, and the
// lock word admits one holder at a time (Acquire on take, Release on give).
unsafe impl<T: Send, I: LocalInterrupts> Send for Guard<T, I> {}
unsafe impl<T: Send, I: LocalInterrupts> Sync for Guard<T, I> {}

impl<T, I: LocalInterrupts> Guard<T, I> {
    /// Wraps `value` in an unlocked guard.
    pub fn new(value: T) -> Self {
        Self {
            locked: CachePadded::new(AtomicBool::new(false)),
            value: UnsafeCell::new(value),
            _interrupts: PhantomData,
        }
    }

    // ---------------------------------------------------------------------
    // ENTRY POINTS
    // ---------------------------------------------------------------------

    /// Producer entry: run `f` with local interrupts disabled and the lock held.
    ///
    /// Never sleeps and never yields the thread: while the lock is contended
    /// it only busy-spins. `f` must likewise not block or allocate.
    #[inline]
    pub fn with_irqsave<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let flags = I::save_and_disable();
        let mut backoff = Backoff::new();
        while !self.try_acquire() {
            while self.locked.load(Ordering::Relaxed) {
                backoff.spin();
            }
        }
        let _held = Held::<T, I> {
            guard: self,
            flags: Some(flags),
        };
        self.run(f)
    }

    /// Consumer entry: run `f` with the lock held, interrupts untouched.
    ///
    /// May yield the thread while the lock is contended. `f` itself should
    /// still be bounded; the producer spins for as long as it runs.
    #[inline]
    pub fn with_lock<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut backoff = Backoff::new();
        while !self.try_acquire() {
            while self.locked.load(Ordering::Relaxed) {
                backoff.snooze();
            }
        }
        if backoff.spins_exhausted() {
            tracing::trace!("consumer yielded waiting for guard");
        }
        let _held = Held::<T, I> {
            guard: self,
            flags: None,
        };
        self.run(f)
    }

    /// Returns true if some context currently holds the guard.
    ///
    /// A snapshot only; useful for diagnostics and tests.
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Relaxed)
    }

    // ---------------------------------------------------------------------
    // INTERNALS
    // ---------------------------------------------------------------------

    #[inline]
    fn try_acquire(&self) -> bool {
        self.locked
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    #[inline]
    fn release(&self) {
        debug_assert_guard_held!(self.locked.load(Ordering::Relaxed));
        self.locked.store(false, Ordering::Release);
    }

    #[inline]
    fn run<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        // SAFETY: the caller holds the lock, so no other reference to the
        // value exists until `Held` releases it.
        self.value.with_mut(|ptr| f(unsafe { &mut *ptr }))
    }
}

impl<T: Default, I: LocalInterrupts> Default for Guard<T, I> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T, I: LocalInterrupts> fmt::Debug for Guard<T, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard")
            .field("locked", &self.is_locked())
            .finish_non_exhaustive()
    }
}

/// Releases the lock, then restores the saved interrupt state, on every exit path.
struct Held<'a, T, I: LocalInterrupts> {
    guard: &'a Guard<T, I>,
    flags: Option<I::Flags>,
}

impl<T, I: LocalInterrupts> Drop for Held<'_, T, I> {
    fn drop(&mut self) {
        self.guard.release();
        if let Some(flags) = self.flags.take() {
            I::restore(flags);
        }
    }
}
