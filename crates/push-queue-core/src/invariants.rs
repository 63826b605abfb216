//! Debug assertion macros for store invariants.
//!
//! These mirror the invariants named in the design that this crate can
//! actually observe. I4 (prune preservation) is a cursor-side invariant —
//! `Cursor` lives in `push-queue-dispatch`, so its assertion macro lives
//! there too, next to `Cursor::shift_by`, matching the teacher's
//! per-crate-local `invariants` convention rather than sharing one module
//! across the crate boundary.

// =============================================================================
// I1: Monotone tail
// =============================================================================

/// Assert that the store's logical size never decreases except via pruning.
///
/// Used in: `MessageStore::append` after pushing to the tail.
macro_rules! debug_assert_tail_monotone {
    ($old_len:expr, $new_len:expr) => {
        debug_assert!(
            $new_len >= $old_len,
            "I1 violated: store size shrank from {} to {} outside of pruning",
            $old_len,
            $new_len
        )
    };
}

pub(crate) use debug_assert_tail_monotone;
