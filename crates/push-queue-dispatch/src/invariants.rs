//! Debug assertion macros for cursor invariants.
//!
//! Mirrors `push_queue_core::invariants`'s structure but lives here because
//! the invariant it checks — I4, prune preservation — is about `Cursor`
//! arithmetic, and `Cursor` is this crate's type.

/// Assert that a pruned cursor index is the floored difference of the
/// pre-prune index and the trimmed count.
///
/// Used in: `Cursor::shift_by`.
macro_rules! debug_assert_prune_shift {
    ($old_index:expr, $removed:expr, $new_index:expr) => {
        debug_assert!(
            $new_index == $old_index.saturating_sub($removed),
            "I4 violated: index {} shifted by {} should be {}, got {}",
            $old_index,
            $removed,
            $old_index.saturating_sub($removed),
            $new_index
        )
    };
}

pub(crate) use debug_assert_prune_shift;
