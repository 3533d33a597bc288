//! Tracking of resources a server failed to deliver.
//!
//! A tile whose fetch failed is recorded here by its tile number. While the
//! failure is recent, or once it has failed `max_tries` times, the tile is
//! reported absent so fetchers stop hammering the server for it. Entries
//! older than `try_again_interval` are forgotten and the tile becomes
//! eligible again.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::warn;

/// Default number of failed attempts before a resource is considered absent.
pub const DEFAULT_MAX_TRIES: u32 = 3;

/// Default minimum time between retries of a failed resource.
pub const DEFAULT_MIN_CHECK_INTERVAL: Duration = Duration::from_secs(60);

/// Default time after which an absent resource is retried from scratch.
pub const DEFAULT_TRY_AGAIN_INTERVAL: Duration = Duration::from_secs(300);

/// Default number of entries retained before the stalest is dropped.
pub const DEFAULT_MAX_ENTRIES: usize = 2000;

/// Retry policy for absent resources.
#[derive(Debug, Clone, PartialEq)]
pub struct AbsentResourceConfig {
    /// Failed attempts after which a resource is absent until `try_again_interval`.
    pub max_tries: u32,
    /// A resource that failed less than this long ago is absent.
    pub min_check_interval: Duration,
    /// Entries older than this are discarded.
    pub try_again_interval: Duration,
    /// Upper bound on tracked entries.
    pub max_entries: usize,
}

impl Default for AbsentResourceConfig {
    fn default() -> Self {
        Self {
            max_tries: DEFAULT_MAX_TRIES,
            min_check_interval: DEFAULT_MIN_CHECK_INTERVAL,
            try_again_interval: DEFAULT_TRY_AGAIN_INTERVAL,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct AbsentEntry {
    tries: u32,
    last_try: Instant,
}

/// Thread-safe set of resources that recently failed to load.
#[derive(Debug)]
pub struct AbsentResourceList {
    config: AbsentResourceConfig,
    entries: Mutex<HashMap<u64, AbsentEntry>>,
}

impl AbsentResourceList {
    /// Creates an empty list with the given retry policy.
    pub fn new(config: AbsentResourceConfig) -> Self {
        Self {
            config,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the retry policy.
    pub fn config(&self) -> &AbsentResourceConfig {
        &self.config
    }

    /// Records a failed attempt for `resource` now.
    pub fn mark_absent(&self, resource: u64) -> u32 {
        self.mark_absent_at(resource, Instant::now())
    }

    /// Records a failed attempt for `resource` at `now`.
    ///
    /// Returns the number of failed attempts recorded so far.
    pub fn mark_absent_at(&self, resource: u64, now: Instant) -> u32 {
        let mut entries = self.entries.lock();

        if !entries.contains_key(&resource) && entries.len() >= self.config.max_entries {
            let stalest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_try)
                .map(|(key, _)| *key);
            if let Some(key) = stalest {
                entries.remove(&key);
            }
        }

        let entry = entries.entry(resource).or_insert(AbsentEntry {
            tries: 0,
            last_try: now,
        });
        entry.tries = entry.tries.saturating_add(1);
        entry.last_try = now;

        if entry.tries == self.config.max_tries {
            warn!(
                resource,
                tries = entry.tries,
                "Resource marked absent after repeated failures"
            );
        }
        entry.tries
    }

    /// True if `resource` should not be requested now.
    pub fn is_absent(&self, resource: u64) -> bool {
        self.is_absent_at(resource, Instant::now())
    }

    /// True if `resource` should not be requested at `now`.
    pub fn is_absent_at(&self, resource: u64, now: Instant) -> bool {
        let mut entries = self.entries.lock();
        let Some(entry) = entries.get(&resource).copied() else {
            return false;
        };

        let age = now.saturating_duration_since(entry.last_try);
        if age > self.config.try_again_interval {
            entries.remove(&resource);
            return false;
        }

        entry.tries >= self.config.max_tries || age < self.config.min_check_interval
    }

    /// Forgets any failures recorded for `resource`.
    pub fn unmark(&self, resource: u64) {
        self.entries.lock().remove(&resource);
    }

    /// Number of tracked resources.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// True if nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Forgets every recorded failure.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Default for AbsentResourceList {
    fn default() -> Self {
        Self::new(AbsentResourceConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AbsentResourceConfig {
        AbsentResourceConfig {
            max_tries: 2,
            min_check_interval: Duration::from_secs(10),
            try_again_interval: Duration::from_secs(100),
            max_entries: 4,
        }
    }

    #[test]
    fn test_unknown_resource_not_absent() {
        let list = AbsentResourceList::new(config());
        assert!(!list.is_absent(42));
        assert!(list.is_empty());
    }

    #[test]
    fn test_recent_failure_is_absent() {
        let list = AbsentResourceList::new(config());
        let t0 = Instant::now();
        assert_eq!(list.mark_absent_at(7, t0), 1);
        assert!(list.is_absent_at(7, t0 + Duration::from_secs(5)));
    }

    #[test]
    fn test_single_failure_retried_after_check_interval() {
        let list = AbsentResourceList::new(config());
        let t0 = Instant::now();
        list.mark_absent_at(7, t0);
        assert!(!list.is_absent_at(7, t0 + Duration::from_secs(11)));
    }

    #[test]
    fn test_max_tries_makes_absent_until_try_again() {
        let list = AbsentResourceList::new(config());
        let t0 = Instant::now();
        list.mark_absent_at(7, t0);
        assert_eq!(list.mark_absent_at(7, t0), 2);

        assert!(list.is_absent_at(7, t0 + Duration::from_secs(50)));
        assert!(!list.is_absent_at(7, t0 + Duration::from_secs(101)));
        // Expired entry was dropped.
        assert_eq!(list.len(), 0);
    }

    #[test]
    fn test_unmark() {
        let list = AbsentResourceList::new(config());
        list.mark_absent(3);
        list.unmark(3);
        assert!(!list.is_absent(3));
    }

    #[test]
    fn test_capacity_drops_stalest() {
        let list = AbsentResourceList::new(config());
        let t0 = Instant::now();
        for i in 0..4u64 {
            list.mark_absent_at(i, t0 + Duration::from_secs(i));
        }
        list.mark_absent_at(99, t0 + Duration::from_secs(5));

        assert_eq!(list.len(), 4);
        assert!(!list.is_absent_at(0, t0 + Duration::from_secs(6)));
        assert!(list.is_absent_at(99, t0 + Duration::from_secs(6)));
    }
}
