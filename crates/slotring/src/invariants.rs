//! Debug assertion macros for ring and guard invariants.
//!
//! Only active in debug builds (`debug_assert!`), so release builds pay
//! nothing. Used by `Guard`, `Ring` and `Producer`.

// =============================================================================
// Guard: balanced acquire/release
// =============================================================================

/// Assert that the lock word is set when a critical section releases it.
///
/// **Invariant**: every release pairs with exactly one prior acquire.
///
/// Used in: `Guard::release()`
macro_rules! debug_assert_guard_held {
    ($locked:expr) => {
        debug_assert!($locked, "guard released while not held")
    };
}

// =============================================================================
// Ring: cursor bounds
// =============================================================================

/// Assert that the write cursor indexes a real slot.
///
/// **Invariant**: `0 ≤ cursor < capacity`
///
/// Used in: `RingState::enqueue()` after advancing the cursor
macro_rules! debug_assert_cursor_in_bounds {
    ($cursor:expr, $capacity:expr) => {
        debug_assert!(
            $cursor < $capacity,
            "cursor {} out of bounds for capacity {}",
            $cursor,
            $capacity
        )
    };
}

// =============================================================================
// Ring: bounded occupancy
// =============================================================================

/// Assert that occupancy never exceeds capacity.
///
/// **Invariant**: `0 ≤ occupied ≤ capacity`
///
/// Used in: `RingState::check()`
macro_rules! debug_assert_bounded_occupancy {
    ($occupied:expr, $capacity:expr) => {
        debug_assert!(
            $occupied <= $capacity,
            "occupancy {} exceeds capacity {}",
            $occupied,
            $capacity
        )
    };
}

// =============================================================================
// Ring: contiguous occupied run
// =============================================================================

/// Assert that the occupied slots form one run ending just before the cursor.
///
/// **Invariant**: with `k` occupied slots, exactly the slots
/// `cursor-k .. cursor-1` (mod capacity) are occupied. Scanning forward from
/// the cursor therefore meets the oldest item first.
///
/// Used in: `RingState::check()` after every mutation
macro_rules! debug_assert_contiguous_run {
    ($state:expr) => {
        debug_assert!(
            $state.is_contiguous_run(),
            "occupied slots not contiguous behind cursor {}: {:?}",
            $state.cursor,
            $state.occupancy_map()
        )
    };
}

// =============================================================================
// Producer: sequence numbers
// =============================================================================

/// Assert that producer sequence numbers strictly increase.
///
/// **Invariant**: `new > old`
///
/// Used in: `SequenceGenerator::next()`
macro_rules! debug_assert_sequence_increases {
    ($old:expr, $new:expr) => {
        debug_assert!(
            $new > $old,
            "sequence did not increase: {} -> {}",
            $old,
            $new
        )
    };
}

// =============================================================================
// Re-exports for crate-internal use
// =============================================================================

pub(crate) use debug_assert_bounded_occupancy;
pub(crate) use debug_assert_contiguous_run;
pub(crate) use debug_assert_cursor_in_bounds;
pub(crate) use debug_assert_guard_held;
pub(crate) use debug_assert_sequence_increases;
