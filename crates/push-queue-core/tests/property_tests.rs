//! Property-based tests for `MessageStore`'s prune/cursor-shift contract
//! (I4) and append/read ordering (I1), in the style of the teacher's
//! `ringmpsc` property test suite.

use proptest::prelude::*;
use push_queue_core::MessageStore;
use std::time::SystemTime;

proptest! {
    /// I1: appends never shrink the store, and `read_at` returns exactly
    /// what was appended, in order.
    #[test]
    fn prop_append_then_read_round_trips_in_order(payloads in prop::collection::vec("[a-z]{0,8}", 0..50)) {
        let store = MessageStore::new();
        for payload in &payloads {
            store.append(payload.clone());
        }

        prop_assert_eq!(store.len(), payloads.len());
        for (i, payload) in payloads.iter().enumerate() {
            prop_assert_eq!(store.read_at(i).unwrap().payload(), payload.as_str());
        }
        prop_assert!(store.read_at(payloads.len()).is_none());
    }

    /// I4: trimming k envelopes from the head never removes more than were
    /// actually expired, and the store's remaining size is exactly
    /// `original - k`.
    #[test]
    fn prop_trim_expired_removes_exactly_the_expired_prefix(
        expired_count in 0usize..20,
        fresh_count in 0usize..20,
    ) {
        let store = MessageStore::new();

        // `MessageStore` only exposes backdating via its own crate-private
        // test helpers, so here "expired" is modeled as "appended before
        // `mid`" and "fresh" as "appended after `mid`" — the same relation
        // `TrimExpired`'s cutoff comparison relies on.
        for i in 0..expired_count {
            store.append(format!("expired-{i}"));
        }
        let mid = SystemTime::now();
        for i in 0..fresh_count {
            store.append(format!("fresh-{i}"));
        }

        let removed = store.trim_expired(mid);
        prop_assert_eq!(removed as usize, expired_count);
        prop_assert_eq!(store.len(), fresh_count);
    }
}
