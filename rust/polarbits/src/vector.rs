//! The public bit-vector type.

use std::fmt;

use polarbits_common::{Error, Result, verify_input};

use crate::{
    block::{Block, BlockKind, EncodingFamily, block_start, split_position},
    block_array::BlockArray,
    builder::VectorBuilder,
    config::VectorOptions,
    plan::{BlockOp, MergePlan, Polarity},
    positions::Positions,
};

/// An immutable, block-compressed set of `u64` positions.
///
/// Overview
/// - Positions are grouped into blocks of `Block::SIZE` bits; only blocks that
///   differ from the vector's implicit block are stored.
/// - The [`Polarity`] fixes the implicit block: `Empty` for a unity vector (a
///   finite set), `Full` for a zero vector (the complement of a finite set).
/// - Every operation returns a new vector. [`not`](Self::not) flips the
///   polarity, so complements stay as compact as their inputs.
///
/// Domain
/// - Valid positions are `[0, Vector::DOMAIN_END)`; block numbers are `u32`.
///
/// Operand compatibility
/// - Binary operations require both operands to use the same
///   [`EncodingFamily`] and are evaluated with the left operand's options.
#[derive(Clone)]
pub struct Vector {
    blocks: BlockArray,
    polarity: Polarity,
    options: VectorOptions,
}

impl Vector {
    /// Exclusive upper bound of addressable positions.
    pub const DOMAIN_END: u64 = (u32::MAX as u64 + 1) << Block::POWER;

    pub(crate) fn from_parts(blocks: BlockArray, polarity: Polarity, options: VectorOptions) -> Vector {
        #[cfg(debug_assertions)]
        blocks.check_invariants(polarity);
        Vector {
            blocks,
            polarity,
            options,
        }
    }

    /// The empty set.
    pub fn empty() -> Vector {
        Vector::empty_with_options(VectorOptions::default())
    }

    pub fn empty_with_options(options: VectorOptions) -> Vector {
        Vector::from_parts(BlockArray::new(), Polarity::Unity, options)
    }

    /// The set of every position in the domain.
    pub fn universe() -> Vector {
        Vector::universe_with_options(VectorOptions::default())
    }

    pub fn universe_with_options(options: VectorOptions) -> Vector {
        Vector::from_parts(BlockArray::new(), Polarity::Zero, options)
    }

    /// Builds a unity vector from sorted, unique positions.
    ///
    /// Unsorted or duplicate input is a contract violation and is only
    /// detected by debug assertions.
    pub fn from_sorted_slice(positions: &[u64]) -> Result<Vector> {
        Vector::from_sorted_slice_with_options(positions, VectorOptions::default())
    }

    pub fn from_sorted_slice_with_options(positions: &[u64], options: VectorOptions) -> Result<Vector> {
        let mut builder = VectorBuilder::new(options);
        builder.extend_from_sorted_slice(positions)?;
        Ok(builder.build())
    }

    /// Builds a unity vector from the first `size` positions of a sorted,
    /// unique slice.
    pub fn from_sorted_prefix(positions: &[u64], size: usize) -> Result<Vector> {
        Vector::from_sorted_prefix_with_options(positions, size, VectorOptions::default())
    }

    pub fn from_sorted_prefix_with_options(
        positions: &[u64],
        size: usize,
        options: VectorOptions,
    ) -> Result<Vector> {
        verify_input!(size, size <= positions.len());
        Vector::from_sorted_slice_with_options(&positions[..size], options)
    }

    /// Builds a unity vector from an ascending iterator of unique positions.
    pub fn from_positions(positions: impl IntoIterator<Item = u64>) -> Result<Vector> {
        Vector::from_positions_with_options(positions, VectorOptions::default())
    }

    pub fn from_positions_with_options(
        positions: impl IntoIterator<Item = u64>,
        options: VectorOptions,
    ) -> Result<Vector> {
        let mut builder = VectorBuilder::new(options);
        for pos in positions {
            builder.push(pos)?;
        }
        Ok(builder.build())
    }

    /// Builds a unity vector from positions produced on demand by `supplier`.
    pub fn from_supplier<I, F>(supplier: F) -> Result<Vector>
    where
        F: FnOnce() -> I,
        I: IntoIterator<Item = u64>,
    {
        Vector::from_positions(supplier())
    }

    pub fn from_supplier_with_options<I, F>(supplier: F, options: VectorOptions) -> Result<Vector>
    where
        F: FnOnce() -> I,
        I: IntoIterator<Item = u64>,
    {
        Vector::from_positions_with_options(supplier(), options)
    }
}

impl Vector {
    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    pub fn family(&self) -> EncodingFamily {
        self.options.family
    }

    pub fn options(&self) -> &VectorOptions {
        &self.options
    }

    /// Returns a copy of this vector evaluated with different options.
    ///
    /// The encoding family is part of the stored blocks and is kept.
    pub fn with_options(&self, options: VectorOptions) -> Vector {
        Vector {
            blocks: self.blocks.clone(),
            polarity: self.polarity,
            options: VectorOptions {
                family: self.options.family,
                ..options
            },
        }
    }

    /// The explicitly stored blocks.
    pub fn blocks(&self) -> &BlockArray {
        &self.blocks
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the bit at `index` is set.
    pub fn get(&self, index: u64) -> Result<bool> {
        if index >= Self::DOMAIN_END {
            return Err(Error::index_out_of_domain(index, Self::DOMAIN_END));
        }
        let (no, offset) = split_position(index);
        Ok(match self.blocks.get(no) {
            Some(block) => block.contains(offset),
            None => self.polarity.implicit_bit(),
        })
    }

    /// Number of set bits.
    pub fn cardinality(&self) -> Result<u64> {
        self.verify_bounded("cardinality")?;
        Ok(self.stored_cardinality())
    }

    /// Highest set position, `None` for the empty set.
    pub fn max_bit_position(&self) -> Result<Option<u64>> {
        self.verify_bounded("max bit position")?;
        Ok(self.blocks.last().and_then(|entry| {
            entry
                .block
                .last_set_offset()
                .map(|offset| block_start(entry.no) + offset as u64)
        }))
    }

    pub fn not(&self) -> Vector {
        Vector::from_parts(
            self.blocks.map_blocks(Block::not),
            self.polarity.flip(),
            self.options.clone(),
        )
    }

    pub fn and(&self, other: &Vector) -> Result<Vector> {
        self.binary(BlockOp::And, other)
    }

    pub fn or(&self, other: &Vector) -> Result<Vector> {
        self.binary(BlockOp::Or, other)
    }

    pub fn xor(&self, other: &Vector) -> Result<Vector> {
        self.binary(BlockOp::Xor, other)
    }

    pub fn nand(&self, other: &Vector) -> Result<Vector> {
        self.binary(BlockOp::Nand, other)
    }

    /// `self AND NOT other`.
    pub fn sub(&self, other: &Vector) -> Result<Vector> {
        self.binary(BlockOp::Sub, other)
    }

    /// Applies a binary operator.
    pub fn binary(&self, op: BlockOp, other: &Vector) -> Result<Vector> {
        if self.family() != other.family() {
            return Err(Error::mixed_encoding_family(self.family(), other.family()));
        }
        let plan = MergePlan::for_op(op, self.polarity, other.polarity);
        let blocks = self
            .blocks
            .merge(&other.blocks, &plan, &self.options.parallel)?;
        Ok(Vector::from_parts(blocks, plan.output, self.options.clone()))
    }

    /// Returns the same set with every block in its minimal encoding and
    /// exactly sized storage. `self` is left untouched.
    pub fn optimize(&self) -> Vector {
        let optimized = Vector::from_parts(
            self.blocks.optimized(self.polarity),
            self.polarity,
            self.options.clone(),
        );
        log::trace!(
            "optimized vector: {} -> {} heap bytes",
            self.heap_size_bytes(),
            optimized.heap_size_bytes()
        );
        optimized
    }

    /// All set positions, ascending.
    ///
    /// Fails for a zero vector, whose set positions are unbounded.
    pub fn positions(&self) -> Result<Positions<'_>> {
        match self.polarity {
            Polarity::Unity => Ok(Positions::new(self.blocks.entries(), self.polarity, u64::MAX)),
            Polarity::Zero => Err(Error::unbounded_sequence()),
        }
    }

    /// Set positions below `limit`, ascending.
    pub fn positions_until(&self, limit: u64) -> Positions<'_> {
        Positions::new(
            self.blocks.entries(),
            self.polarity,
            limit.min(Self::DOMAIN_END),
        )
    }

    pub fn to_vec(&self) -> Result<Vec<u64>> {
        Ok(self.positions()?.collect())
    }

    pub fn to_vec_until(&self, limit: u64) -> Vec<u64> {
        self.positions_until(limit).collect()
    }

    /// Value equality: same polarity and the same set positions.
    pub fn is_equal_to(&self, other: &Vector) -> bool {
        self.polarity == other.polarity
            && self.blocks.len() == other.blocks.len()
            && self
                .blocks
                .iter()
                .zip(other.blocks.iter())
                .all(|(a, b)| a.no == b.no && a.block.is_equal_to(&b.block))
    }

    pub fn compute_stats(&self) -> VectorStats {
        let mut stats = VectorStats {
            polarity: self.polarity,
            family: self.family(),
            block_count: self.blocks.len(),
            stored_cardinality: self.stored_cardinality(),
            heap_size: self.heap_size_bytes(),
            ..Default::default()
        };
        for entry in self.blocks.iter() {
            match entry.block.kind() {
                BlockKind::Empty => stats.empty_blocks += 1,
                BlockKind::Full => stats.full_blocks += 1,
                BlockKind::PosList => stats.pos_list_blocks += 1,
                BlockKind::InvPosList => stats.inv_pos_list_blocks += 1,
                BlockKind::BitMap => stats.bit_map_blocks += 1,
                BlockKind::ZeroMap => stats.zero_map_blocks += 1,
            }
        }
        stats
    }

    pub fn heap_size_bytes(&self) -> usize {
        self.blocks.heap_size_bytes()
    }

    /// Panics if the block array violates its invariants.
    pub fn check_invariants(&self) {
        self.blocks.check_invariants(self.polarity);
        for entry in self.blocks.iter() {
            if let Some(family) = entry.block.family() {
                assert_eq!(family, self.family(), "block {} has a foreign encoding", entry.no);
            }
        }
    }

    /// Average number of set bits over the stored blocks.
    pub fn avg_cardinality_per_block(&self) -> f64 {
        if self.blocks.is_empty() {
            0.0
        } else {
            self.stored_cardinality() as f64 / self.blocks.len() as f64
        }
    }

    fn stored_cardinality(&self) -> u64 {
        self.blocks
            .iter()
            .map(|entry| entry.block.cardinality() as u64)
            .sum()
    }

    fn verify_bounded(&self, operation: &'static str) -> Result<()> {
        match self.polarity {
            Polarity::Unity => Ok(()),
            Polarity::Zero => Err(Error::unbounded_cardinality(operation)),
        }
    }
}

impl PartialEq for Vector {
    fn eq(&self, other: &Self) -> bool {
        self.is_equal_to(other)
    }
}

impl Eq for Vector {}

impl std::ops::Not for &Vector {
    type Output = Vector;

    fn not(self) -> Vector {
        Vector::not(self)
    }
}

impl fmt::Debug for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vector")
            .field("polarity", &self.polarity)
            .field("family", &self.options.family)
            .field("blocks", &self.blocks.len())
            .finish()
    }
}

/// Diagnostic summary: cardinality, highest bit, block count and average
/// cardinality per block.
impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.polarity {
            Polarity::Unity => {
                write!(f, "cardinality: {}, ", self.stored_cardinality())?;
                match self.max_bit_position() {
                    Ok(Some(pos)) => write!(f, "highest bit: {pos}, ")?,
                    _ => write!(f, "highest bit: none, ")?,
                }
            }
            Polarity::Zero => write!(f, "cardinality: unbounded, highest bit: unbounded, ")?,
        }
        write!(
            f,
            "blocks: {}, average cardinality per block: {:.2}",
            self.blocks.len(),
            self.avg_cardinality_per_block()
        )
    }
}

/// Summary statistics for a [`Vector`] and its block layout.
///
/// `stored_cardinality` counts the set bits of the stored blocks only; for a
/// zero vector the absent blocks are not included.
#[derive(Debug, Clone, Default)]
pub struct VectorStats {
    pub polarity: Polarity,
    pub family: EncodingFamily,
    pub heap_size: usize,
    pub stored_cardinality: u64,
    pub block_count: usize,
    pub empty_blocks: usize,
    pub full_blocks: usize,
    pub pos_list_blocks: usize,
    pub inv_pos_list_blocks: usize,
    pub bit_map_blocks: usize,
    pub zero_map_blocks: usize,
}
