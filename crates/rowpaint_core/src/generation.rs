//! Generation-stamped map shared by the layout and style caches.
//!
//! Every lookup stamps the entry with the current generation. A sweep drops
//! every entry that was not stamped since the last `increment_generation`,
//! so an entry lives exactly as long as some frame keeps asking for it.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

/// Hit/miss counters for one cache bucket.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl CacheStats {
    /// Counter-wise difference `self - earlier`.
    pub fn since(&self, earlier: &CacheStats) -> CacheStats {
        CacheStats {
            hits: self.hits.saturating_sub(earlier.hits),
            misses: self.misses.saturating_sub(earlier.misses),
            evictions: self.evictions.saturating_sub(earlier.evictions),
        }
    }
}

struct Entry<V> {
    value: V,
    generation: u64,
}

/// Content-keyed map with mark-and-sweep eviction per generation.
pub struct GenerationalCache<K, V> {
    entries: HashMap<K, Entry<V>>,
    generation: u64,
    stats: CacheStats,
}

impl<K, V> Default for GenerationalCache<K, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            generation: 0,
            stats: CacheStats::default(),
        }
    }
}

impl<K, V> GenerationalCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Current generation counter.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Returns whether `key` is cached, without stamping it.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    /// Look up `key`, stamping the entry with the current generation on hit.
    pub fn get<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let generation = self.generation;
        let entry = self.entries.get_mut(key)?;
        entry.generation = generation;
        self.stats.hits = self.stats.hits.saturating_add(1);
        Some(entry.value.clone())
    }

    /// Look up `key`, building and inserting the value on miss.
    ///
    /// The key is only cloned into the map when the value is built.
    pub fn get_or_insert_with<Q, F>(&mut self, key: &Q, build: F) -> V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
        F: FnOnce() -> V,
    {
        if let Some(value) = self.get(key) {
            return value;
        }
        let value = build();
        self.stats.misses = self.stats.misses.saturating_add(1);
        self.entries.insert(
            key.to_owned(),
            Entry {
                value: value.clone(),
                generation: self.generation,
            },
        );
        value
    }

    /// Start a new generation. Entries not touched afterwards are swept by
    /// the next [`collect_garbage`](Self::collect_garbage).
    pub fn increment_generation(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    /// Drop every entry not stamped with the current generation.
    ///
    /// # Returns
    /// Number of evicted entries.
    pub fn collect_garbage(&mut self) -> usize {
        let generation = self.generation;
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.generation == generation);
        let evicted = before - self.entries.len();
        self.stats.evictions = self.stats.evictions.saturating_add(evicted as u64);
        evicted
    }

    /// Drop all entries unconditionally. Counters and generation survive.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
