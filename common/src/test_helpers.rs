/// Shared test helpers for cross-crate use.
///
/// Centralized identifier generation so tests running in parallel across
/// crates never collide on store keys.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

// Global counter for truly unique test identifiers across parallel tests
static GLOBAL_TEST_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Generate a globally unique string identifier for test data.
///
/// IDs combine a timestamp and an atomic counter so they stay unique even
/// when tests run in parallel across threads and crates.
///
/// # Arguments
/// * `prefix` - identifies the test subject, e.g. "PROD" or "USER"
pub fn generate_unique_id(prefix: &str) -> String {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis();
    let counter = GLOBAL_TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("{}-{}-{}", prefix, timestamp, counter)
}

/// Generate a unique numeric test ID.
pub fn generate_unique_test_id() -> u64 {
    use std::thread;

    let thread_id = thread::current().id();
    let thread_hash = format!("{:?}", thread_id)
        .chars()
        .map(|c| c as u64)
        .sum::<u64>()
        % 10000;

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64;

    let counter = GLOBAL_TEST_COUNTER.fetch_add(1, Ordering::SeqCst);

    (timestamp % 100000) * 1_000_000 + thread_hash * 100 + counter
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_unique_id() {
        let mut ids = HashSet::new();
        for i in 0..1000 {
            let id = generate_unique_id(&format!("TEST-{}", i));
            assert!(ids.insert(id.clone()), "Duplicate ID generated: {}", id);
        }
    }

    #[test]
    fn test_generate_unique_test_id() {
        let mut ids = HashSet::new();
        for _ in 0..1000 {
            let id = generate_unique_test_id();
            assert!(ids.insert(id), "Duplicate numeric ID generated: {}", id);
        }
    }
}
