//! Random ids for item suffixes and waiter registrations.

use parking_lot::Mutex as SyncMutex;
use rand::RngCore;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::constants::RANDOM_ID_LEN;

/// A random item suffix or waiter id.
pub type RandomId = [u8; RANDOM_ID_LEN];

/// Source of the random bytes that break ties between keys written at the same index.
pub trait RandomSource: Send + Sync + std::fmt::Debug {
    fn fill(&self, id: &mut RandomId);

    fn next_id(&self) -> RandomId {
        let mut id = [0u8; RANDOM_ID_LEN];
        self.fill(&mut id);
        id
    }
}

/// Thread-local CSPRNG seeded by the OS.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandomSource;

impl RandomSource for OsRandomSource {
    fn fill(&self, id: &mut RandomId) {
        rand::rng().fill_bytes(id);
    }
}

/// Deterministic source for reproducible tests.
#[derive(Debug)]
pub struct SeededRandomSource {
    rng: SyncMutex<StdRng>,
}

impl SeededRandomSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SyncMutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandomSource {
    fn fill(&self, id: &mut RandomId) {
        self.rng.lock().fill_bytes(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_source_is_reproducible() {
        let a = SeededRandomSource::new(7);
        let b = SeededRandomSource::new(7);
        assert_eq!(a.next_id(), b.next_id());
        assert_eq!(a.next_id(), b.next_id());
    }

    #[test]
    fn test_os_source_ids_differ() {
        let source = OsRandomSource;
        assert_ne!(source.next_id(), source.next_id());
    }
}
