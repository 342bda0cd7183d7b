use crate::params::TLB_SIZE;
use crate::types::Pid;

use hashbrown::HashMap;
use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;

/// Fixed seed so that simulation runs are reproducible.
const TLB_RNG_SEED: u64 = 97_878_967_189;

/// Translation look-aside buffer.
///
/// A bounded associative cache from `(process, virtual page)` to a physical
/// frame number. There is no ordering among entries; when the cache is full
/// an entry is discarded uniformly at random. The page-table format reserves
/// a clock bit, but the TLB deliberately does not implement a clock policy.
#[derive(Debug)]
pub struct TLBCache {
    entries: HashMap<(Pid, usize), usize>,
    capacity: usize,
    rng: XorShiftRng,
    requests: u64,
    hits: u64,
}

impl TLBCache {
    /// Creates a cache with the default [`TLB_SIZE`](../../../params/constant.TLB_SIZE.html) capacity.
    pub fn new() -> Self {
        Self::with_capacity(TLB_SIZE)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
            capacity,
            rng: XorShiftRng::seed_from_u64(TLB_RNG_SEED),
            requests: 0,
            hits: 0,
        }
    }

    /// Looks up the frame cached for `(pid, page)`.
    ///
    /// Every call counts as a request; a `Some` result also counts as a hit.
    pub fn lookup(&mut self, pid: Pid, page: usize) -> Option<usize> {
        self.requests += 1;
        let frame = self.entries.get(&(pid, page)).copied();
        if frame.is_some() {
            self.hits += 1;
        }
        frame
    }

    /// Caches the association `(pid, page) -> frame`, discarding a random
    /// entry first when the cache is at capacity.
    pub fn insert(&mut self, pid: Pid, page: usize, frame: usize) {
        let key = (pid, page);
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            self.evict_random();
        }
        self.entries.insert(key, frame);
    }

    /// Drops the association for `(pid, page)` if one is cached.
    ///
    /// Callers must invoke this whenever a page's residency changes,
    /// otherwise later lookups can return a recycled frame.
    pub fn invalidate(&mut self, pid: Pid, page: usize) {
        self.entries.remove(&(pid, page));
    }

    /// Proportion of successful lookups so far; 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        if self.requests == 0 {
            0.0
        } else {
            self.hits as f64 / self.requests as f64
        }
    }

    pub fn requests(&self) -> u64 {
        self.requests
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn evict_random(&mut self) {
        let keys: Vec<(Pid, usize)> = self.entries.keys().copied().collect();
        if let Some(key) = keys.get(self.rng.gen_range(0, keys.len())) {
            self.entries.remove(key);
        }
    }
}

impl Default for TLBCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    pub fn hit_rate_starts_at_zero() {
        let tlb = TLBCache::new();
        assert_eq!(tlb.hit_rate(), 0.0);
        assert!(tlb.is_empty());
    }

    #[test]
    pub fn lookup_accounting() {
        let mut tlb = TLBCache::new();
        assert_eq!(tlb.lookup(1, 0), None);
        tlb.insert(1, 0, 21);
        assert_eq!(tlb.lookup(1, 0), Some(21));
        assert_eq!(tlb.lookup(2, 0), None);
        assert_eq!(tlb.requests(), 3);
        assert_eq!(tlb.hits(), 1);
        let rate = tlb.hit_rate();
        assert!(rate > 0.0 && rate <= 1.0);
        assert!((rate - 1.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    pub fn capacity_is_bounded_by_random_eviction() {
        let mut tlb = TLBCache::with_capacity(4);
        for page in 0..100 {
            tlb.insert(1, page, page + 1);
        }
        assert_eq!(tlb.len(), 4);
        // The most recent insert always survives the eviction that made
        // room for it.
        assert_eq!(tlb.lookup(1, 99), Some(100));
    }

    #[test]
    pub fn reinsert_updates_in_place() {
        let mut tlb = TLBCache::with_capacity(2);
        tlb.insert(1, 0, 10);
        tlb.insert(1, 1, 11);
        tlb.insert(1, 0, 12);
        assert_eq!(tlb.len(), 2);
        assert_eq!(tlb.lookup(1, 0), Some(12));
        assert_eq!(tlb.lookup(1, 1), Some(11));
    }

    #[test]
    pub fn invalidate_removes_entry() {
        let mut tlb = TLBCache::new();
        tlb.insert(3, 7, 42);
        tlb.invalidate(3, 7);
        assert_eq!(tlb.lookup(3, 7), None);
        // Invalidating an absent entry is a no-op.
        tlb.invalidate(3, 7);
    }
}
