//! Single-pass construction of a vector from ascending positions.

use std::ops::Range;

use polarbits_common::{Error, Result};

use crate::{
    Vector,
    block::{Block, block_start, split_position},
    block_array::BlockArray,
    config::VectorOptions,
    plan::Polarity,
};

/// Accumulates ascending, unique positions into a unity vector.
///
/// Offsets are buffered for the current block and flushed as one block as
/// soon as a position in a later block arrives. Feeding positions out of
/// order or twice is a contract violation caught by debug assertions only.
pub struct VectorBuilder {
    options: VectorOptions,
    blocks: BlockArray,
    current_no: u32,
    offsets: Vec<u16>,
    next_pos: u64,
}

impl Default for VectorBuilder {
    fn default() -> Self {
        Self::new(VectorOptions::default())
    }
}

impl VectorBuilder {
    pub fn new(options: VectorOptions) -> VectorBuilder {
        VectorBuilder {
            options,
            blocks: BlockArray::new(),
            current_no: 0,
            offsets: Vec::new(),
            next_pos: 0,
        }
    }

    /// Smallest position the builder still accepts.
    #[inline]
    pub fn next_pos(&self) -> u64 {
        self.next_pos
    }

    pub fn push(&mut self, pos: u64) -> Result<()> {
        check_domain(pos)?;
        debug_assert!(pos >= self.next_pos, "positions must be ascending and unique");
        let (no, offset) = split_position(pos);
        if no != self.current_no {
            self.flush();
            self.current_no = no;
        }
        self.offsets.push(offset);
        self.next_pos = pos + 1;
        Ok(())
    }

    /// Adds every position of `range`.
    pub fn push_range(&mut self, range: Range<u64>) -> Result<()> {
        if range.is_empty() {
            return Ok(());
        }
        check_domain(range.end - 1)?;
        debug_assert!(range.start >= self.next_pos, "ranges must be ascending and disjoint");
        let mut pos = range.start;
        while pos < range.end {
            let (no, offset) = split_position(pos);
            if no != self.current_no {
                self.flush();
                self.current_no = no;
            }
            let block_end = block_start(no) + Block::SIZE as u64;
            let end = block_end.min(range.end);
            // At most `Block::SIZE`, which still fits in `u16`.
            let end_offset = (end - block_start(no)) as u16;
            self.offsets.extend(offset..end_offset);
            pos = end;
        }
        self.next_pos = range.end;
        Ok(())
    }

    /// Adds a sorted, unique slice of positions, one block at a time.
    pub fn extend_from_sorted_slice(&mut self, mut positions: &[u64]) -> Result<()> {
        if let Some(&last) = positions.last() {
            check_domain(last)?;
        }
        while let Some(&first) = positions.first() {
            debug_assert!(first >= self.next_pos, "positions must be ascending and unique");
            let (no, _) = split_position(first);
            if no != self.current_no {
                self.flush();
                self.current_no = no;
            }
            let block_end = block_start(no) + Block::SIZE as u64;
            let len = positions.partition_point(|&pos| pos < block_end);
            self.offsets
                .extend(positions[..len].iter().map(|&pos| split_position(pos).1));
            self.next_pos = positions[len - 1] + 1;
            positions = &positions[len..];
        }
        Ok(())
    }

    pub fn build(mut self) -> Vector {
        self.flush();
        Vector::from_parts(self.blocks, Polarity::Unity, self.options)
    }

    fn flush(&mut self) {
        if self.offsets.is_empty() {
            return;
        }
        let block = Block::from_offsets(self.options.family, &self.offsets);
        self.blocks.push(self.current_no, block);
        self.offsets.clear();
    }
}

fn check_domain(pos: u64) -> Result<()> {
    if pos < Vector::DOMAIN_END {
        Ok(())
    } else {
        Err(Error::index_out_of_domain(pos, Vector::DOMAIN_END))
    }
}
