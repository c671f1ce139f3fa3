use crate::algorithm::pairs::PairKey;
use std::collections::HashMap;

/// Rasterized chord path, as unclamped `[x, y]` pixels
pub type Chord = Vec<[i32; 2]>;

/// Memoization cache for chord rasterization
///
/// Each unordered pin pair is walked at most once per engine; scoring
/// revisits the same chords on every step, so the hit rate climbs quickly.
#[derive(Default)]
pub struct ChordCache {
    /// Pair to pixel path mapping
    chords: HashMap<PairKey, Chord>,

    /// Cache performance statistics
    pub stats: CacheStats,
}

/// Performance metrics for cache effectiveness
#[derive(Default, Debug, Clone, Copy)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: usize,
    /// Number of cache misses
    pub misses: usize,
}

impl ChordCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieve a cached chord or compute and store it
    ///
    /// Uses the provided closure to rasterize only when the pair is not
    /// already cached.
    pub fn get_or_compute<F>(&mut self, key: PairKey, compute_fn: F) -> &[[i32; 2]]
    where
        F: FnOnce() -> Chord,
    {
        use std::collections::hash_map::Entry;

        match self.chords.entry(key) {
            Entry::Occupied(entry) => {
                self.stats.hits += 1;
                entry.into_mut().as_slice()
            }
            Entry::Vacant(entry) => {
                self.stats.misses += 1;
                entry.insert(compute_fn()).as_slice()
            }
        }
    }

    /// Number of distinct chords stored
    pub fn len(&self) -> usize {
        self.chords.len()
    }

    /// Test if nothing has been cached yet
    pub fn is_empty(&self) -> bool {
        self.chords.is_empty()
    }
}
