use sha2::{Digest, Sha256};
use std::fmt;

/// A fixed-size Bloom filter over string keys
///
/// Bit indices come from double hashing a SHA-256 digest:
/// `index_i = (h1 + i * h2) mod size` where `h1` and `h2` are the first two
/// 64-bit words of the digest.
#[derive(Debug, Clone)]
pub struct BloomFilter {
    bits: Vec<u64>,
    size: usize,
    hash_count: u32,
}

impl BloomFilter {
    /// Creates an empty filter with `size` bits and `hash_count` hashes
    ///
    /// Both values are clamped to at least 1.
    pub fn new(size: usize, hash_count: u32) -> Self {
        let size = size.max(1);
        Self {
            bits: vec![0; size.div_ceil(64)],
            size,
            hash_count: hash_count.max(1),
        }
    }

    /// Creates a filter sized for `expected_items` at the given false-positive rate
    pub fn with_rate(expected_items: usize, false_positive_rate: f64) -> Self {
        let (size, hash_count) = Self::optimal_parameters(expected_items, false_positive_rate);
        Self::new(size, hash_count)
    }

    /// Calculates the bit count and hash count for `n` items at rate `p`
    ///
    /// # Arguments
    ///
    /// * `n` - Number of items expected to be added
    /// * `p` - Desired false-positive probability, in (0, 1)
    ///
    /// # Returns
    ///
    /// `(m, k)` with `m = ceil(-n ln p / (ln 2)^2)` and `k = round((m / n) ln 2)`,
    /// both at least 1.
    pub fn optimal_parameters(n: usize, p: f64) -> (usize, u32) {
        let n = n.max(1) as f64;
        let ln2 = std::f64::consts::LN_2;
        let m = (-(n * p.ln()) / (ln2 * ln2)).ceil().max(1.0);
        let k = ((m / n) * ln2).round().max(1.0);
        (m as usize, k as u32)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn hash_count(&self) -> u32 {
        self.hash_count
    }

    pub fn add(&mut self, item: &str) {
        for index in self.indices(item) {
            self.bits[index / 64] |= 1 << (index % 64);
        }
    }

    /// Returns false if the item was definitely never added
    pub fn check(&self, item: &str) -> bool {
        self.indices(item)
            .all(|index| self.bits[index / 64] & (1 << (index % 64)) != 0)
    }

    fn indices(&self, item: &str) -> impl Iterator<Item = usize> {
        let digest = Sha256::digest(item.as_bytes());
        let word = |range: std::ops::Range<usize>| {
            digest[range]
                .iter()
                .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte))
        };
        let h1 = word(0..8);
        // Odd step so consecutive probes never collapse onto one bit
        let h2 = word(8..16) | 1;
        let size = self.size as u64;

        (0..u64::from(self.hash_count))
            .map(move |i| (h1.wrapping_add(i.wrapping_mul(h2)) % size) as usize)
    }
}

impl fmt::Display for BloomFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BloomFilter(size={}, hash_count={})",
            self.size, self.hash_count
        )
    }
}
