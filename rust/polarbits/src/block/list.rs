//! Sorted offset lists backing the `PosList` and `InvPosList` block encodings.

use std::{cmp::Ordering, sync::Arc};

use crate::block::Block;

/// An immutable, strictly ascending list of local block offsets.
///
/// The same payload serves both list encodings: for a `PosList` block the
/// offsets are the set bits, for an `InvPosList` block they are the unset bits.
/// Offsets are `u16` values in `[0, Block::SIZE)` and are always compared as
/// unsigned integers.
///
/// The storage is shared, so cloning an `OffsetList` (e.g. when a merge passes
/// a block through unchanged) does not copy the offsets.
#[derive(Clone, PartialEq, Eq)]
pub struct OffsetList {
    values: Arc<[u16]>,
}

impl OffsetList {
    pub fn new(values: Vec<u16>) -> OffsetList {
        let list = OffsetList {
            values: values.into(),
        };
        #[cfg(debug_assertions)]
        list.check_invariants();
        list
    }

    pub fn from_slice(values: &[u16]) -> OffsetList {
        OffsetList::new(values.to_vec())
    }

    pub fn empty() -> OffsetList {
        OffsetList::new(Vec::new())
    }

    /// All offsets of a block, `0..Block::SIZE`.
    pub fn all() -> OffsetList {
        OffsetList::new((0..Block::SIZE as u16).collect())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[u16] {
        &self.values
    }

    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, u16>> {
        self.values.iter().copied()
    }

    #[inline]
    pub fn contains(&self, offset: u16) -> bool {
        self.values.binary_search(&offset).is_ok()
    }

    pub fn first(&self) -> Option<u16> {
        self.values.first().copied()
    }

    pub fn last(&self) -> Option<u16> {
        self.values.last().copied()
    }

    /// Offsets present in both lists.
    pub fn intersect(&self, other: &OffsetList) -> OffsetList {
        let (a, b) = (self.as_slice(), other.as_slice());
        let mut result = Vec::with_capacity(a.len().min(b.len()));
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    result.push(a[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
        OffsetList::new(result)
    }

    /// Offsets present in either list.
    pub fn union(&self, other: &OffsetList) -> OffsetList {
        let (a, b) = (self.as_slice(), other.as_slice());
        if a.is_empty() {
            return other.clone();
        }
        if b.is_empty() {
            return self.clone();
        }
        let mut result = Vec::with_capacity((a.len() + b.len()).min(Block::SIZE));
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                Ordering::Less => {
                    result.push(a[i]);
                    i += 1;
                }
                Ordering::Greater => {
                    result.push(b[j]);
                    j += 1;
                }
                Ordering::Equal => {
                    result.push(a[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
        result.extend_from_slice(&a[i..]);
        result.extend_from_slice(&b[j..]);
        OffsetList::new(result)
    }

    /// Offsets of `self` that are not present in `other`.
    pub fn difference(&self, other: &OffsetList) -> OffsetList {
        let (a, b) = (self.as_slice(), other.as_slice());
        if a.is_empty() || b.is_empty() {
            return self.clone();
        }
        let mut result = Vec::with_capacity(a.len());
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                Ordering::Less => {
                    result.push(a[i]);
                    i += 1;
                }
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    i += 1;
                    j += 1;
                }
            }
        }
        result.extend_from_slice(&a[i..]);
        OffsetList::new(result)
    }

    /// Offsets present in exactly one of the lists.
    pub fn symmetric_difference(&self, other: &OffsetList) -> OffsetList {
        let (a, b) = (self.as_slice(), other.as_slice());
        let mut result = Vec::with_capacity((a.len() + b.len()).min(Block::SIZE));
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                Ordering::Less => {
                    result.push(a[i]);
                    i += 1;
                }
                Ordering::Greater => {
                    result.push(b[j]);
                    j += 1;
                }
                Ordering::Equal => {
                    i += 1;
                    j += 1;
                }
            }
        }
        result.extend_from_slice(&a[i..]);
        result.extend_from_slice(&b[j..]);
        OffsetList::new(result)
    }

    /// Offsets of the block that are *not* in this list.
    pub fn complement(&self) -> OffsetList {
        OffsetList::new(ComplementIter::new(self.as_slice()).collect())
    }

    /// Largest offset of the block that is not in this list.
    ///
    /// Scans down from `Block::SIZE - 1`, so the cost is proportional to the
    /// length of the trailing run of listed offsets.
    pub fn last_absent(&self) -> Option<u16> {
        let mut candidate = Block::SIZE as u32;
        for &value in self.values.iter().rev() {
            if (value as u32) + 1 < candidate {
                return Some((candidate - 1) as u16);
            }
            candidate = value as u32;
        }
        candidate.checked_sub(1).map(|c| c as u16)
    }

    pub fn heap_size_bytes(&self) -> usize {
        self.values.len() * std::mem::size_of::<u16>()
    }

    /// Copies the offsets into freshly allocated storage that is not shared
    /// with any other block.
    pub fn compact(&self) -> OffsetList {
        OffsetList::from_slice(&self.values)
    }

    /// Panics if the offsets are not strictly ascending or exceed the block.
    pub fn check_invariants(&self) {
        assert!(self.values.len() <= Block::SIZE);
        assert!(
            self.values.windows(2).all(|w| w[0] < w[1]),
            "offsets must be strictly ascending"
        );
        if let Some(&last) = self.values.last() {
            assert!((last as usize) < Block::SIZE);
        }
    }
}

impl std::fmt::Debug for OffsetList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const MAX_SHOWN: usize = 8;
        let mut list = f.debug_list();
        list.entries(self.values.iter().take(MAX_SHOWN));
        if self.values.len() > MAX_SHOWN {
            list.entry(&format_args!("... {} total", self.values.len()));
        }
        list.finish()
    }
}

/// Iterates the offsets of a block that are absent from a sorted list.
#[derive(Clone, Debug)]
pub struct ComplementIter<'a> {
    excluded: &'a [u16],
    next: u32,
}

impl<'a> ComplementIter<'a> {
    pub fn new(excluded: &'a [u16]) -> ComplementIter<'a> {
        ComplementIter { excluded, next: 0 }
    }
}

impl Iterator for ComplementIter<'_> {
    type Item = u16;

    fn next(&mut self) -> Option<u16> {
        while self.next < Block::SIZE as u32 {
            let candidate = self.next;
            self.next += 1;
            match self.excluded.split_first() {
                Some((&first, rest)) if first as u32 == candidate => self.excluded = rest,
                _ => return Some(candidate as u16),
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (Block::SIZE as u32 - self.next) as usize - self.excluded.len();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ComplementIter<'_> {}
