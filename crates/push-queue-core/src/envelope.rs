use std::time::SystemTime;
use uuid::Uuid;

/// The unit of payload plus its immutable identity and creation timestamp.
///
/// An envelope's `id` and `created_at` never change after construction; only
/// `payload` may be mutated in place (see `MessageStore::set_payload`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    id: Uuid,
    created_at: SystemTime,
    payload: String,
}

impl Envelope {
    /// Creates a new envelope with a fresh id and the current wall-clock time.
    pub fn new(payload: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: SystemTime::now(),
            payload,
        }
    }

    /// Creates an envelope with an explicit id and timestamp.
    ///
    /// Used by tests that need deterministic ids or backdated timestamps to
    /// exercise TTL pruning.
    pub fn with_parts(id: Uuid, created_at: SystemTime, payload: String) -> Self {
        Self {
            id,
            created_at,
            payload,
        }
    }

    #[inline]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[inline]
    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    #[inline]
    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub(crate) fn set_payload(&mut self, payload: String) {
        self.payload = payload;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_envelopes_get_distinct_ids() {
        let a = Envelope::new("a".into());
        let b = Envelope::new("b".into());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn set_payload_preserves_id_and_timestamp() {
        let mut e = Envelope::new("original".into());
        let id = e.id();
        let created_at = e.created_at();

        e.set_payload("edited".into());

        assert_eq!(e.id(), id);
        assert_eq!(e.created_at(), created_at);
        assert_eq!(e.payload(), "edited");
    }
}
