//! Block-compressed bit vectors with polarity-aware set algebra.
//!
//! A [`Vector`] partitions the position space into blocks of [`Block::SIZE`]
//! bits, stores only the blocks that differ from an implicit default, and
//! combines vectors with NOT/AND/OR/XOR/NAND/AND-NOT through sorted merges
//! that keep every block in its most compact encoding.

pub mod block;
pub mod block_array;
pub mod builder;
pub mod column;
pub mod config;
pub mod parallel;
pub mod plan;
pub mod positions;
pub mod vector;
pub mod word_ops;
#[cfg(test)]
mod tests;

pub use block::{Block, BlockKind, EncodingFamily};
pub use builder::VectorBuilder;
pub use column::BitSlicedColumn;
pub use config::{ParallelOptions, VectorOptions};
pub use plan::{BlockOp, Polarity};
pub use polarbits_common::{Error, ErrorKind, Result};
pub use vector::{Vector, VectorStats};
