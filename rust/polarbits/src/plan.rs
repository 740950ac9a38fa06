//! The operator × polarity table that drives every vector-level merge.
//!
//! A vector's polarity fixes the value of the blocks it does not store:
//! `Empty` for [`Polarity::Unity`], `Full` for [`Polarity::Zero`]. For a binary
//! operator the output polarity is the one whose implicit block equals
//! `implicit(lhs) op implicit(rhs)`, and a block stored on one side only
//! combines with the other side's implicit block into either a constant (the
//! output's implicit block, so it is discarded), the block itself, or its
//! complement.

use polarbits_common::Result;

use crate::block::Block;

/// Value of the blocks a vector does not store explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Polarity {
    /// Absent blocks are `Empty`; the vector is a finite set.
    #[default]
    Unity,
    /// Absent blocks are `Full`; the vector is a co-finite set.
    Zero,
}

impl Polarity {
    /// Bit value of every position in an absent block.
    pub fn implicit_bit(self) -> bool {
        matches!(self, Polarity::Zero)
    }

    pub fn implicit_block(self) -> Block {
        match self {
            Polarity::Unity => Block::Empty,
            Polarity::Zero => Block::Full,
        }
    }

    /// Whether `block` is indistinguishable from an absent entry.
    #[inline]
    pub fn is_implicit(self, block: &Block) -> bool {
        match self {
            Polarity::Unity => block.is_empty(),
            Polarity::Zero => block.is_full(),
        }
    }

    pub fn flip(self) -> Polarity {
        match self {
            Polarity::Unity => Polarity::Zero,
            Polarity::Zero => Polarity::Unity,
        }
    }
}

impl std::fmt::Display for Polarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Polarity::Unity => f.write_str("unity"),
            Polarity::Zero => f.write_str("zero"),
        }
    }
}

/// Binary block operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockOp {
    And,
    Or,
    Xor,
    Nand,
    /// `lhs AND NOT rhs`.
    Sub,
}

impl BlockOp {
    pub const ALL: [BlockOp; 5] = [
        BlockOp::And,
        BlockOp::Or,
        BlockOp::Xor,
        BlockOp::Nand,
        BlockOp::Sub,
    ];

    #[inline]
    pub fn apply(self, lhs: &Block, rhs: &Block) -> Result<Block> {
        match self {
            BlockOp::And => lhs.and(rhs),
            BlockOp::Or => lhs.or(rhs),
            BlockOp::Xor => lhs.xor(rhs),
            BlockOp::Nand => lhs.nand(rhs),
            BlockOp::Sub => lhs.sub(rhs),
        }
    }

    /// The operator applied to single bits.
    pub fn eval(self, lhs: bool, rhs: bool) -> bool {
        match self {
            BlockOp::And => lhs && rhs,
            BlockOp::Or => lhs || rhs,
            BlockOp::Xor => lhs ^ rhs,
            BlockOp::Nand => !(lhs && rhs),
            BlockOp::Sub => lhs && !rhs,
        }
    }
}

impl std::str::FromStr for BlockOp {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "and" => Ok(BlockOp::And),
            "or" => Ok(BlockOp::Or),
            "xor" => Ok(BlockOp::Xor),
            "nand" => Ok(BlockOp::Nand),
            "sub" | "and-not" | "andnot" => Ok(BlockOp::Sub),
            other => Err(format!("unknown operator '{other}'")),
        }
    }
}

/// What a merge emits for a block number stored by one operand only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unmatched {
    /// The result equals the output's implicit block; emit nothing.
    Discard,
    /// The result is the stored block itself.
    PassThrough,
    /// The result is the complement of the stored block.
    Invert,
}

impl Unmatched {
    #[inline]
    pub fn emit(self, block: &Block) -> Option<Block> {
        match self {
            Unmatched::Discard => None,
            Unmatched::PassThrough => Some(block.clone()),
            Unmatched::Invert => Some(block.not()),
        }
    }

    pub fn is_discard(self) -> bool {
        matches!(self, Unmatched::Discard)
    }
}

/// Which keys a merge walk can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MergeShape {
    /// Only keys stored by both sides.
    Intersect,
    /// Keys stored by either side.
    Union,
    /// Keys stored by the left side (matched or not).
    KeepLeft,
    /// Keys stored by the right side (matched or not).
    KeepRight,
}

/// A fully resolved merge: the block operator, the per-side treatment of
/// unmatched keys, and the polarity of the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MergePlan {
    pub op: BlockOp,
    pub output: Polarity,
    pub left: Unmatched,
    pub right: Unmatched,
}

impl MergePlan {
    pub fn for_op(op: BlockOp, lhs: Polarity, rhs: Polarity) -> MergePlan {
        use BlockOp::*;
        use Polarity::{Unity as U, Zero as Z};
        use Unmatched::{Discard as D, Invert as I, PassThrough as P};

        let (output, left, right) = match (op, lhs, rhs) {
            (And, U, U) => (U, D, D),
            (And, U, Z) => (U, P, D),
            (And, Z, U) => (U, D, P),
            (And, Z, Z) => (Z, P, P),

            (Or, U, U) => (U, P, P),
            (Or, U, Z) => (Z, D, P),
            (Or, Z, U) => (Z, P, D),
            (Or, Z, Z) => (Z, D, D),

            (Xor, U, U) => (U, P, P),
            (Xor, U, Z) => (Z, I, P),
            (Xor, Z, U) => (Z, P, I),
            (Xor, Z, Z) => (U, I, I),

            (Nand, U, U) => (Z, D, D),
            (Nand, U, Z) => (Z, I, D),
            (Nand, Z, U) => (Z, D, I),
            (Nand, Z, Z) => (U, I, I),

            (Sub, U, U) => (U, P, D),
            (Sub, U, Z) => (U, D, D),
            (Sub, Z, U) => (Z, P, I),
            (Sub, Z, Z) => (U, D, I),
        };
        MergePlan {
            op,
            output,
            left,
            right,
        }
    }

    pub fn shape(&self) -> MergeShape {
        match (self.left.is_discard(), self.right.is_discard()) {
            (true, true) => MergeShape::Intersect,
            (false, false) => MergeShape::Union,
            (false, true) => MergeShape::KeepLeft,
            (true, false) => MergeShape::KeepRight,
        }
    }

    /// Upper bound on the number of entries the merge can emit.
    pub fn max_output_len(&self, left_len: usize, right_len: usize) -> usize {
        match self.shape() {
            MergeShape::Intersect => left_len.min(right_len),
            MergeShape::Union => left_len + right_len,
            MergeShape::KeepLeft => left_len,
            MergeShape::KeepRight => right_len,
        }
    }
}
