//! Blocks are compact encodings of a fixed-size, aligned window of bit positions.
//! - Each block covers `Block::SIZE` consecutive positions; local offsets are `u16`.
//! - Two encoding families exist and share the `Empty`/`Full` sentinels:
//!   list (`PosList`/`InvPosList`) and map (`BitMap`/`ZeroMap`).
//! - Every operator result is collapsed to `Empty`/`Full` when it reaches zero or
//!   full cardinality, and list results are re-balanced to the shorter list.
//! - Combining a list payload with a map payload is an error, never a conversion.

use std::{fmt, ops::Range};

use polarbits_common::{Error, Result};

use crate::block::{
    list::{ComplementIter, OffsetList},
    map::{WordBitsIter, WordMap},
};

pub mod list;
pub mod map;

/// One `Block::SIZE`-bit window of a vector, in one of six encodings.
///
/// `PartialEq` is structural: two blocks holding the same bits in different
/// encodings compare unequal. Use [`Block::is_equal_to`] for value equality.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Block {
    /// No bits set.
    Empty,
    /// All bits set.
    Full,
    /// Ascending offsets of the set bits.
    PosList(OffsetList),
    /// Ascending offsets of the unset bits.
    InvPosList(OffsetList),
    /// One bit per offset, 1 = set.
    BitMap(WordMap),
    /// One bit per offset, 1 = unset.
    ZeroMap(WordMap),
}

/// Identifies the encoding used by a [`Block`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Empty,
    Full,
    PosList,
    InvPosList,
    BitMap,
    ZeroMap,
}

/// The set of payload encodings a vector is allowed to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EncodingFamily {
    /// `Empty`, `Full`, `PosList`, `InvPosList`.
    #[default]
    List,
    /// `Empty`, `Full`, `BitMap`, `ZeroMap`.
    Map,
}

impl BlockKind {
    /// The family of a payload encoding; `None` for the shared sentinels.
    pub fn family(self) -> Option<EncodingFamily> {
        match self {
            BlockKind::Empty | BlockKind::Full => None,
            BlockKind::PosList | BlockKind::InvPosList => Some(EncodingFamily::List),
            BlockKind::BitMap | BlockKind::ZeroMap => Some(EncodingFamily::Map),
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BlockKind::Empty => "empty",
            BlockKind::Full => "full",
            BlockKind::PosList => "position list",
            BlockKind::InvPosList => "inverted position list",
            BlockKind::BitMap => "bit map",
            BlockKind::ZeroMap => "zero map",
        };
        f.write_str(name)
    }
}

impl fmt::Display for EncodingFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingFamily::List => f.write_str("list"),
            EncodingFamily::Map => f.write_str("map"),
        }
    }
}

impl std::str::FromStr for EncodingFamily {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "list" => Ok(EncodingFamily::List),
            "map" => Ok(EncodingFamily::Map),
            other => Err(format!("unknown encoding family '{other}'")),
        }
    }
}

impl Block {
    /// `log2` of the number of positions covered by a block.
    pub const POWER: u32 = 13;

    /// Number of positions covered by a block.
    pub const SIZE: usize = 1 << Self::POWER;

    /// Number of 64-bit words in a dense block.
    pub const WORDS: usize = Self::SIZE / 64;

    /// Largest number of offsets kept in a `PosList`; denser blocks are
    /// stored as an `InvPosList` of their unset offsets.
    pub const MAX_LIST_LEN: usize = Self::SIZE / 2;
}

/// Splits a global position into its block number and local offset.
///
/// The caller guarantees `pos` is inside the addressable domain.
#[inline]
pub fn split_position(pos: u64) -> (u32, u16) {
    (
        (pos >> Block::POWER) as u32,
        (pos & (Block::SIZE as u64 - 1)) as u16,
    )
}

/// First global position covered by block `no`.
#[inline]
pub fn block_start(no: u32) -> u64 {
    (no as u64) << Block::POWER
}

impl Block {
    /// Builds a block from the ascending offsets of its set bits, using the
    /// minimal encoding of `family`.
    pub fn from_offsets(family: EncodingFamily, offsets: &[u16]) -> Block {
        if offsets.len() == Block::SIZE {
            return Block::Full;
        }
        match family {
            EncodingFamily::List => Block::from_set_offsets(OffsetList::from_slice(offsets)),
            EncodingFamily::Map => Block::from_set_words(WordMap::from_offsets(offsets.iter().copied())),
        }
    }

    /// Collapses or re-balances a list of set offsets.
    pub fn from_set_offsets(set: OffsetList) -> Block {
        match set.len() {
            0 => Block::Empty,
            Block::SIZE => Block::Full,
            n if n > Block::MAX_LIST_LEN => Block::InvPosList(set.complement()),
            _ => Block::PosList(set),
        }
    }

    /// Collapses or re-balances a list of unset offsets. A block with exactly
    /// half of its bits set is stored as a `PosList`.
    pub fn from_unset_offsets(unset: OffsetList) -> Block {
        match unset.len() {
            0 => Block::Full,
            Block::SIZE => Block::Empty,
            n if n >= Block::MAX_LIST_LEN => Block::PosList(unset.complement()),
            _ => Block::InvPosList(unset),
        }
    }

    /// Collapses a word map whose 1 bits are the set bits.
    pub fn from_set_words(map: WordMap) -> Block {
        if map.is_all_zeros() {
            Block::Empty
        } else if map.is_all_ones() {
            Block::Full
        } else {
            Block::BitMap(map)
        }
    }

    /// Collapses a word map whose 1 bits are the unset bits.
    pub fn from_unset_words(map: WordMap) -> Block {
        if map.is_all_zeros() {
            Block::Full
        } else if map.is_all_ones() {
            Block::Empty
        } else {
            Block::ZeroMap(map)
        }
    }

    pub fn kind(&self) -> BlockKind {
        match self {
            Block::Empty => BlockKind::Empty,
            Block::Full => BlockKind::Full,
            Block::PosList(_) => BlockKind::PosList,
            Block::InvPosList(_) => BlockKind::InvPosList,
            Block::BitMap(_) => BlockKind::BitMap,
            Block::ZeroMap(_) => BlockKind::ZeroMap,
        }
    }

    pub fn family(&self) -> Option<EncodingFamily> {
        self.kind().family()
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Block::Empty)
    }

    pub fn is_full(&self) -> bool {
        matches!(self, Block::Full)
    }

    /// Whether the bit at local `offset` is set.
    pub fn contains(&self, offset: u16) -> bool {
        debug_assert!((offset as usize) < Block::SIZE);
        match self {
            Block::Empty => false,
            Block::Full => true,
            Block::PosList(set) => set.contains(offset),
            Block::InvPosList(unset) => !unset.contains(offset),
            Block::BitMap(map) => map.contains(offset),
            Block::ZeroMap(map) => !map.contains(offset),
        }
    }

    /// Number of set bits.
    pub fn cardinality(&self) -> usize {
        match self {
            Block::Empty => 0,
            Block::Full => Block::SIZE,
            Block::PosList(set) => set.len(),
            Block::InvPosList(unset) => Block::SIZE - unset.len(),
            Block::BitMap(map) => map.count_ones(),
            Block::ZeroMap(map) => map.count_zeros(),
        }
    }

    /// Highest set local offset, `None` for an empty block.
    pub fn last_set_offset(&self) -> Option<u16> {
        match self {
            Block::Empty => None,
            Block::Full => Some((Block::SIZE - 1) as u16),
            Block::PosList(set) => set.last(),
            Block::InvPosList(unset) => unset.last_absent(),
            Block::BitMap(map) => map.last_one(),
            Block::ZeroMap(map) => map.last_zero(),
        }
    }

    /// Set local offsets, ascending.
    pub fn offsets(&self) -> OffsetsIter<'_> {
        match self {
            Block::Empty => OffsetsIter::Range(0..0),
            Block::Full => OffsetsIter::full(),
            Block::PosList(set) => OffsetsIter::List(set.as_slice().iter()),
            Block::InvPosList(unset) => OffsetsIter::Complement(ComplementIter::new(unset.as_slice())),
            Block::BitMap(map) => OffsetsIter::Words(map.ones()),
            Block::ZeroMap(map) => OffsetsIter::Words(map.zeros()),
        }
    }

    /// Bitwise complement. Keeps the payload and swaps its meaning.
    pub fn not(&self) -> Block {
        match self {
            Block::Empty => Block::Full,
            Block::Full => Block::Empty,
            Block::PosList(list) => Block::InvPosList(list.clone()),
            Block::InvPosList(list) => Block::PosList(list.clone()),
            Block::BitMap(map) => Block::ZeroMap(map.clone()),
            Block::ZeroMap(map) => Block::BitMap(map.clone()),
        }
    }

    pub fn and(&self, other: &Block) -> Result<Block> {
        use Block::*;
        Ok(match (self, other) {
            (Empty, _) | (_, Empty) => Empty,
            (Full, b) => b.clone(),
            (a, Full) => a.clone(),
            (PosList(a), PosList(b)) => Block::from_set_offsets(a.intersect(b)),
            (PosList(set), InvPosList(unset)) | (InvPosList(unset), PosList(set)) => {
                Block::from_set_offsets(set.difference(unset))
            }
            (InvPosList(a), InvPosList(b)) => Block::from_unset_offsets(a.union(b)),
            (BitMap(a), BitMap(b)) => Block::from_set_words(a.and(b)),
            (BitMap(set), ZeroMap(unset)) | (ZeroMap(unset), BitMap(set)) => {
                Block::from_set_words(set.and_not(unset))
            }
            (ZeroMap(a), ZeroMap(b)) => Block::from_unset_words(a.or(b)),
            (a, b) => return Err(mixed_family(a, b)),
        })
    }

    pub fn or(&self, other: &Block) -> Result<Block> {
        use Block::*;
        Ok(match (self, other) {
            (Full, _) | (_, Full) => Full,
            (Empty, b) => b.clone(),
            (a, Empty) => a.clone(),
            (PosList(a), PosList(b)) => Block::from_set_offsets(a.union(b)),
            (PosList(set), InvPosList(unset)) | (InvPosList(unset), PosList(set)) => {
                Block::from_unset_offsets(unset.difference(set))
            }
            (InvPosList(a), InvPosList(b)) => Block::from_unset_offsets(a.intersect(b)),
            (BitMap(a), BitMap(b)) => Block::from_set_words(a.or(b)),
            (BitMap(set), ZeroMap(unset)) | (ZeroMap(unset), BitMap(set)) => {
                Block::from_unset_words(unset.and_not(set))
            }
            (ZeroMap(a), ZeroMap(b)) => Block::from_unset_words(a.and(b)),
            (a, b) => return Err(mixed_family(a, b)),
        })
    }

    pub fn xor(&self, other: &Block) -> Result<Block> {
        use Block::*;
        Ok(match (self, other) {
            (Empty, b) => b.clone(),
            (a, Empty) => a.clone(),
            (Full, b) => b.not(),
            (a, Full) => a.not(),
            (PosList(a), PosList(b)) => Block::from_set_offsets(a.symmetric_difference(b)),
            (PosList(set), InvPosList(unset)) | (InvPosList(unset), PosList(set)) => {
                Block::from_unset_offsets(set.symmetric_difference(unset))
            }
            (InvPosList(a), InvPosList(b)) => Block::from_set_offsets(a.symmetric_difference(b)),
            (BitMap(a), BitMap(b)) => Block::from_set_words(a.xor(b)),
            (BitMap(set), ZeroMap(unset)) | (ZeroMap(unset), BitMap(set)) => {
                Block::from_unset_words(set.xor(unset))
            }
            (ZeroMap(a), ZeroMap(b)) => Block::from_set_words(a.xor(b)),
            (a, b) => return Err(mixed_family(a, b)),
        })
    }

    pub fn nand(&self, other: &Block) -> Result<Block> {
        Ok(self.and(other)?.not())
    }

    /// `self AND NOT other`, without materializing `NOT other`.
    pub fn sub(&self, other: &Block) -> Result<Block> {
        use Block::*;
        Ok(match (self, other) {
            (Empty, _) | (_, Full) => Empty,
            (a, Empty) => a.clone(),
            (Full, b) => b.not(),
            (PosList(a), PosList(b)) => Block::from_set_offsets(a.difference(b)),
            (PosList(set), InvPosList(unset)) => Block::from_set_offsets(set.intersect(unset)),
            (InvPosList(unset), PosList(set)) => Block::from_unset_offsets(unset.union(set)),
            (InvPosList(a), InvPosList(b)) => Block::from_set_offsets(b.difference(a)),
            (BitMap(a), BitMap(b)) => Block::from_set_words(a.and_not(b)),
            (BitMap(set), ZeroMap(unset)) => Block::from_set_words(set.and(unset)),
            (ZeroMap(unset), BitMap(set)) => Block::from_unset_words(unset.or(set)),
            (ZeroMap(a), ZeroMap(b)) => Block::from_set_words(b.and_not(a)),
            (a, b) => return Err(mixed_family(a, b)),
        })
    }

    /// Value equality, independent of the encoding.
    pub fn is_equal_to(&self, other: &Block) -> bool {
        use Block::*;
        match (self, other) {
            (Empty, Empty) | (Full, Full) => true,
            (PosList(a), PosList(b)) | (InvPosList(a), InvPosList(b)) => a == b,
            (BitMap(a), BitMap(b)) | (ZeroMap(a), ZeroMap(b)) => a == b,
            _ => {
                self.cardinality() == other.cardinality() && self.offsets().eq(other.offsets())
            }
        }
    }

    /// Re-derives the minimal encoding of this block in fresh, unshared storage.
    pub fn optimize(&self) -> Block {
        match self {
            Block::Empty => Block::Empty,
            Block::Full => Block::Full,
            Block::PosList(set) => Block::from_set_offsets(set.compact()),
            Block::InvPosList(unset) => Block::from_unset_offsets(unset.compact()),
            Block::BitMap(map) => Block::from_set_words(map.compact()),
            Block::ZeroMap(map) => Block::from_unset_words(map.compact()),
        }
    }

    pub fn heap_size_bytes(&self) -> usize {
        match self {
            Block::Empty | Block::Full => 0,
            Block::PosList(list) | Block::InvPosList(list) => list.heap_size_bytes(),
            Block::BitMap(map) | Block::ZeroMap(map) => map.heap_size_bytes(),
        }
    }
}

#[cold]
fn mixed_family(a: &Block, b: &Block) -> Error {
    Error::mixed_encoding_family(a.kind(), b.kind())
}

/// Ascending iterator over the set local offsets of a [`Block`].
#[derive(Clone, Debug)]
pub enum OffsetsIter<'a> {
    Range(Range<u16>),
    List(std::slice::Iter<'a, u16>),
    Complement(ComplementIter<'a>),
    Words(WordBitsIter<'a>),
}

impl OffsetsIter<'_> {
    /// Every offset of a block.
    pub fn full() -> OffsetsIter<'static> {
        OffsetsIter::Range(0..Block::SIZE as u16)
    }
}

impl Iterator for OffsetsIter<'_> {
    type Item = u16;

    #[inline]
    fn next(&mut self) -> Option<u16> {
        match self {
            OffsetsIter::Range(range) => range.next(),
            OffsetsIter::List(iter) => iter.next().copied(),
            OffsetsIter::Complement(iter) => iter.next(),
            OffsetsIter::Words(iter) => iter.next(),
        }
    }
}
