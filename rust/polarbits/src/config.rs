//! Construction and evaluation options.

use crate::block::EncodingFamily;

/// Options carried by every [`Vector`](crate::Vector).
///
/// The options of the left operand govern a binary operation; the encoding
/// families of both operands must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VectorOptions {
    /// Payload encodings used by the vector's blocks.
    pub family: EncodingFamily,
    /// When and how block merges are spread over the merge pool.
    pub parallel: ParallelOptions,
}

impl VectorOptions {
    pub fn with_family(family: EncodingFamily) -> VectorOptions {
        VectorOptions {
            family,
            ..Default::default()
        }
    }

    /// Options that never use the merge pool.
    pub fn sequential(family: EncodingFamily) -> VectorOptions {
        VectorOptions {
            family,
            parallel: ParallelOptions::disabled(),
        }
    }
}

/// Controls the parallel block merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParallelOptions {
    pub enabled: bool,
    /// Both operands must store at least this many blocks for the merge to
    /// be dispatched to the pool.
    pub min_blocks: usize,
    /// Upper bound on the number of concurrently evaluated work chunks.
    /// `Some(1)` forces sequential evaluation.
    pub max_degree: Option<usize>,
}

impl ParallelOptions {
    pub const DEFAULT_MIN_BLOCKS: usize = 1024;

    pub fn disabled() -> ParallelOptions {
        ParallelOptions {
            enabled: false,
            ..Default::default()
        }
    }

    /// Whether merging arrays of the given lengths should use the pool.
    pub fn should_parallelize(&self, left_len: usize, right_len: usize) -> bool {
        self.enabled
            && self.max_degree.unwrap_or(usize::MAX) > 1
            && left_len.min(right_len) >= self.min_blocks.max(1)
    }
}

impl Default for ParallelOptions {
    fn default() -> Self {
        ParallelOptions {
            enabled: true,
            min_blocks: Self::DEFAULT_MIN_BLOCKS,
            max_degree: None,
        }
    }
}
