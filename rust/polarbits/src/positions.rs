//! Lazy iteration over the set positions of a vector.

use std::iter::FusedIterator;

use crate::{
    block::{Block, OffsetsIter, block_start},
    block_array::BlockEntry,
    plan::Polarity,
};

/// Ascending global positions of the set bits of a vector, below a limit.
///
/// For a zero-polarity vector the blocks missing from the array are produced
/// as full runs, which is why such a vector can only be iterated up to a
/// finite limit.
#[derive(Clone, Debug)]
pub struct Positions<'a> {
    entries: &'a [BlockEntry],
    polarity: Polarity,
    limit: u64,
    /// Block number to visit next (`u64` so it can step past `u32::MAX`).
    next_block: u64,
    current: Option<(u64, OffsetsIter<'a>)>,
}

impl<'a> Positions<'a> {
    pub(crate) fn new(entries: &'a [BlockEntry], polarity: Polarity, limit: u64) -> Positions<'a> {
        Positions {
            entries,
            polarity,
            limit,
            next_block: 0,
            current: None,
        }
    }

    /// Exclusive upper bound of the produced positions.
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Moves to the next block that may contribute positions.
    /// Returns `false` once nothing below the limit is left.
    fn advance_block(&mut self) -> bool {
        let no = match self.polarity {
            Polarity::Unity => match self.entries.split_first() {
                Some((entry, rest)) => {
                    self.entries = rest;
                    self.current = Some((block_start(entry.no), entry.block.offsets()));
                    entry.no as u64
                }
                None => return false,
            },
            Polarity::Zero => {
                let no = self.next_block;
                match self.entries.split_first() {
                    Some((entry, rest)) if entry.no as u64 == no => {
                        self.entries = rest;
                        self.current = Some((no << Block::POWER, entry.block.offsets()));
                    }
                    _ => self.current = Some((no << Block::POWER, OffsetsIter::full())),
                }
                no
            }
        };
        self.next_block = no + 1;
        (no << Block::POWER) < self.limit
    }
}

impl Iterator for Positions<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        loop {
            if let Some((base, offsets)) = &mut self.current {
                if let Some(offset) = offsets.next() {
                    let pos = *base + offset as u64;
                    if pos < self.limit {
                        return Some(pos);
                    }
                    self.finish();
                    return None;
                }
                self.current = None;
            }
            if !self.advance_block() {
                self.finish();
                return None;
            }
        }
    }
}

impl FusedIterator for Positions<'_> {}

impl Positions<'_> {
    fn finish(&mut self) {
        self.entries = &[];
        self.current = None;
        self.limit = 0;
    }
}
