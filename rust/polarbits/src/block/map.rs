//! Dense word maps backing the `BitMap` and `ZeroMap` block encodings.

use std::sync::Arc;

use crate::{block::Block, word_ops::WordKernels};

/// An immutable array of `Block::WORDS` 64-bit words, one bit per block offset.
///
/// Bit `i` of the block lives in word `i / 64` at bit position `i % 64`
/// (least significant bit first). The interpretation of a 1 bit (set or unset)
/// belongs to the owning block variant.
#[derive(Clone, PartialEq, Eq)]
pub struct WordMap {
    words: Arc<[u64]>,
}

impl WordMap {
    pub fn new(words: Vec<u64>) -> WordMap {
        assert_eq!(words.len(), Block::WORDS);
        WordMap {
            words: words.into(),
        }
    }

    pub fn zeroed() -> WordMap {
        WordMap::new(vec![0u64; Block::WORDS])
    }

    pub fn from_offsets(offsets: impl IntoIterator<Item = u16>) -> WordMap {
        let mut words = vec![0u64; Block::WORDS];
        for offset in offsets {
            let offset = offset as usize;
            words[offset / 64] |= 1u64 << (offset % 64);
        }
        WordMap::new(words)
    }

    #[inline]
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    #[inline]
    pub fn contains(&self, offset: u16) -> bool {
        let offset = offset as usize;
        self.words[offset / 64] & (1u64 << (offset % 64)) != 0
    }

    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn count_zeros(&self) -> usize {
        Block::SIZE - self.count_ones()
    }

    pub fn is_all_zeros(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    pub fn is_all_ones(&self) -> bool {
        self.words.iter().all(|&w| w == u64::MAX)
    }

    /// Highest offset whose bit is 1.
    pub fn last_one(&self) -> Option<u16> {
        self.words
            .iter()
            .enumerate()
            .rev()
            .find(|(_, w)| **w != 0)
            .map(|(i, w)| (i * 64 + 63 - w.leading_zeros() as usize) as u16)
    }

    /// Highest offset whose bit is 0.
    pub fn last_zero(&self) -> Option<u16> {
        self.words
            .iter()
            .enumerate()
            .rev()
            .find(|(_, w)| **w != u64::MAX)
            .map(|(i, w)| (i * 64 + 63 - w.leading_ones() as usize) as u16)
    }

    /// Offsets whose bit is 1, ascending.
    pub fn ones(&self) -> WordBitsIter<'_> {
        WordBitsIter::new(&self.words, 0)
    }

    /// Offsets whose bit is 0, ascending.
    pub fn zeros(&self) -> WordBitsIter<'_> {
        WordBitsIter::new(&self.words, u64::MAX)
    }

    /// Word-wise AND, evaluated by the given kernel.
    pub fn and_with(&self, other: &WordMap, kernels: &WordKernels) -> WordMap {
        let mut dst = vec![0u64; Block::WORDS];
        kernels.and_words(&self.words, &other.words, &mut dst);
        WordMap::new(dst)
    }

    /// Word-wise AND through the process-wide kernel.
    pub fn and(&self, other: &WordMap) -> WordMap {
        self.and_with(other, WordKernels::global())
    }

    pub fn and_not(&self, other: &WordMap) -> WordMap {
        self.zip_with(other, |a, b| a & !b)
    }

    pub fn or(&self, other: &WordMap) -> WordMap {
        self.zip_with(other, |a, b| a | b)
    }

    pub fn xor(&self, other: &WordMap) -> WordMap {
        self.zip_with(other, |a, b| a ^ b)
    }

    pub fn complement(&self) -> WordMap {
        WordMap::new(self.words.iter().map(|w| !w).collect())
    }

    pub fn heap_size_bytes(&self) -> usize {
        Block::WORDS * std::mem::size_of::<u64>()
    }

    pub fn compact(&self) -> WordMap {
        WordMap::new(self.words.to_vec())
    }

    fn zip_with(&self, other: &WordMap, f: impl Fn(u64, u64) -> u64) -> WordMap {
        WordMap::new(
            self.words
                .iter()
                .zip(other.words.iter())
                .map(|(&a, &b)| f(a, b))
                .collect(),
        )
    }
}

impl std::fmt::Debug for WordMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordMap")
            .field("ones", &self.count_ones())
            .finish()
    }
}

/// Iterates the offsets of 1 bits in `words ^ mask`, ascending.
#[derive(Clone, Debug)]
pub struct WordBitsIter<'a> {
    words: &'a [u64],
    mask: u64,
    index: usize,
    current: u64,
}

impl<'a> WordBitsIter<'a> {
    fn new(words: &'a [u64], mask: u64) -> WordBitsIter<'a> {
        let current = words.first().map_or(0, |&w| w ^ mask);
        WordBitsIter {
            words,
            mask,
            index: 0,
            current,
        }
    }
}

impl Iterator for WordBitsIter<'_> {
    type Item = u16;

    fn next(&mut self) -> Option<u16> {
        while self.current == 0 {
            self.index += 1;
            if self.index >= self.words.len() {
                return None;
            }
            self.current = self.words[self.index] ^ self.mask;
        }
        let bit = self.current.trailing_zeros() as usize;
        self.current &= self.current - 1;
        Some((self.index * 64 + bit) as u16)
    }
}
