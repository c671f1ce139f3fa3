use bitvec::prelude::*;
use std::fmt;

/// Normalized key for an unordered pin pair
///
/// Encodes `(min, max)` as `min * pin_count + max`, so `(a, b)` and `(b, a)`
/// map to the same integer without allocating. Keys past `usize::MAX`
/// saturate and never address a bit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey(usize);

impl PairKey {
    /// Build the key for pins `a` and `b` on a board of `pin_count` pins
    pub const fn new(a: usize, b: usize, pin_count: usize) -> Self {
        let (low, high) = if a < b { (a, b) } else { (b, a) };
        Self(low.saturating_mul(pin_count).saturating_add(high))
    }

    /// Raw integer form of the key
    pub const fn index(self) -> usize {
        self.0
    }

    /// Recover the `(low, high)` pin indices
    pub const fn pins(self, pin_count: usize) -> (usize, usize) {
        if pin_count == 0 {
            return (0, 0);
        }
        (self.0 / pin_count, self.0 % pin_count)
    }
}

/// Set of unordered pin pairs already connected during a run
///
/// Backed by a bitset over the `pin_count²` key space; membership tests and
/// inserts are O(1) and the set only ever grows.
#[derive(Clone, Debug)]
pub struct UsedPairs {
    bits: BitVec,
    pin_count: usize,
    len: usize,
}

impl UsedPairs {
    /// Create an empty set for a board of `pin_count` pins
    ///
    /// A pin count whose key space overflows `usize` gets an empty set that
    /// rejects every insert.
    pub fn new(pin_count: usize) -> Self {
        let capacity = pin_count.checked_mul(pin_count).unwrap_or(0);
        Self {
            bits: bitvec![0; capacity],
            pin_count,
            len: 0,
        }
    }

    /// Mark the pair as used
    ///
    /// Returns `false` if the pair was already present or lies outside the
    /// board.
    pub fn insert(&mut self, a: usize, b: usize) -> bool {
        if a >= self.pin_count || b >= self.pin_count {
            return false;
        }
        let key = PairKey::new(a, b, self.pin_count);
        let Some(mut bit) = self.bits.get_mut(key.index()) else {
            return false;
        };
        if *bit {
            return false;
        }
        *bit = true;
        drop(bit);
        self.len += 1;
        true
    }

    /// Test whether the pair has been used
    pub fn contains(&self, a: usize, b: usize) -> bool {
        if a >= self.pin_count || b >= self.pin_count {
            return false;
        }
        let key = PairKey::new(a, b, self.pin_count);
        self.bits.get(key.index()).as_deref() == Some(&true)
    }

    /// Number of distinct pairs used so far
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Test if no pair has been used
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate used pairs as `(low, high)` in key order
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.bits
            .iter_ones()
            .map(|index| PairKey(index).pins(self.pin_count))
    }
}

impl fmt::Display for UsedPairs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UsedPairs({} of {} pins)", self.len, self.pin_count)
    }
}
