use std::sync::atomic::{AtomicU64, Ordering};

/// Record identifier shared by users, tasks and events.
pub type RecordId = u64;

/// Largest id a browser-written store can hold exactly (2^53 - 1).
pub const MAX_ID: RecordId = (1 << 53) - 1;

/// Hands out millisecond-timestamp ids that never repeat within a process.
///
/// Two creations inside the same millisecond get consecutive values instead
/// of colliding.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicU64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure every future id is greater than `id`. Ids above [`MAX_ID`]
    /// cannot come from a millisecond clock and are ignored.
    pub fn observe(&self, id: RecordId) {
        if id > MAX_ID {
            log::warn!("Ignoring out-of-range record id {}", id);
            return;
        }
        self.last.fetch_max(id, Ordering::Relaxed);
    }

    pub fn next_id(&self) -> RecordId {
        let now = now_millis();
        let mut current = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(current.saturating_add(1));
            match self.last.compare_exchange_weak(
                current,
                candidate,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidate,
                Err(actual) => current = actual,
            }
        }
    }
}

fn now_millis() -> RecordId {
    chrono::Utc::now().timestamp_millis().max(0) as RecordId
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique_in_a_tight_loop() {
        let ids = IdGenerator::new();
        let seen: HashSet<RecordId> = (0..1000).map(|_| ids.next_id()).collect();
        assert_eq!(seen.len(), 1000);
    }

    #[test]
    fn ids_are_strictly_increasing() {
        let ids = IdGenerator::new();
        let a = ids.next_id();
        let b = ids.next_id();
        assert!(b > a);
    }

    #[test]
    fn observed_ids_are_never_reissued() {
        let ids = IdGenerator::new();
        let far_future = now_millis() + 1_000_000;
        ids.observe(far_future);
        assert_eq!(ids.next_id(), far_future + 1);
    }

    #[test]
    fn huge_loaded_ids_do_not_exhaust_the_counter() {
        let ids = IdGenerator::new();
        ids.observe(RecordId::MAX);
        let next = ids.next_id();
        assert!(next <= MAX_ID);
        assert!(ids.next_id() > next);

        ids.observe(MAX_ID);
        assert_eq!(ids.last.load(Ordering::Relaxed), MAX_ID);
    }
}
