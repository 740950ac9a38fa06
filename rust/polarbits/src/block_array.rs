//! Sparse, ascending arrays of numbered blocks and the merge-join over them.

use std::cmp::Ordering;

use polarbits_common::Result;

use crate::{
    block::{Block, BlockKind},
    config::ParallelOptions,
    parallel::MergePool,
    plan::{MergePlan, Polarity, Unmatched},
};

/// A block together with its block number.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockEntry {
    pub no: u32,
    pub block: Block,
}

impl BlockEntry {
    pub fn new(no: u32, block: Block) -> BlockEntry {
        BlockEntry { no, block }
    }
}

/// Blocks stored by a vector, keyed by strictly ascending block number.
///
/// The array never stores the owning vector's implicit block (see
/// [`Polarity::is_implicit`]); an absent key stands for it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockArray {
    entries: Vec<BlockEntry>,
}

impl BlockArray {
    pub fn new() -> BlockArray {
        BlockArray::default()
    }

    pub fn with_capacity(capacity: usize) -> BlockArray {
        BlockArray {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Appends a block; `no` must be greater than every stored block number.
    pub fn push(&mut self, no: u32, block: Block) {
        debug_assert!(self.entries.last().is_none_or(|last| last.no < no));
        self.entries.push(BlockEntry { no, block });
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn entries(&self) -> &[BlockEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BlockEntry> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&BlockEntry> {
        self.entries.last()
    }

    /// The block stored under `no`, located by binary search.
    pub fn get(&self, no: u32) -> Option<&Block> {
        self.entries
            .binary_search_by_key(&no, |entry| entry.no)
            .ok()
            .map(|i| &self.entries[i].block)
    }

    /// Applies `f` to every block, keeping the block numbers.
    pub fn map_blocks(&self, f: impl Fn(&Block) -> Block) -> BlockArray {
        BlockArray {
            entries: self
                .entries
                .iter()
                .map(|entry| BlockEntry::new(entry.no, f(&entry.block)))
                .collect(),
        }
    }

    /// Re-encodes every block minimally into an exactly sized array.
    ///
    /// Blocks that turn out to equal the implicit block of `polarity` are dropped.
    pub fn optimized(&self, polarity: Polarity) -> BlockArray {
        let mut entries = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let block = entry.block.optimize();
            if !polarity.is_implicit(&block) {
                entries.push(BlockEntry::new(entry.no, block));
            }
        }
        entries.shrink_to_fit();
        BlockArray { entries }
    }

    pub fn heap_size_bytes(&self) -> usize {
        self.entries
            .iter()
            .map(|entry| entry.block.heap_size_bytes())
            .sum::<usize>()
            + self.entries.capacity() * std::mem::size_of::<BlockEntry>()
    }

    /// Counts the stored blocks of the given encoding.
    pub fn count_kind(&self, kind: BlockKind) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.block.kind() == kind)
            .count()
    }

    /// Panics if block numbers are not strictly ascending or an implicit
    /// block of `polarity` is stored.
    pub fn check_invariants(&self, polarity: Polarity) {
        assert!(
            self.entries.windows(2).all(|w| w[0].no < w[1].no),
            "block numbers must be strictly ascending"
        );
        for entry in &self.entries {
            assert!(
                !polarity.is_implicit(&entry.block),
                "block {} stores the implicit block of a {polarity} vector",
                entry.no
            );
        }
    }
}

impl BlockArray {
    /// Combines two arrays according to `plan`.
    ///
    /// Keys are visited in ascending order with a two-pointer walk. Matched
    /// keys are combined with the plan's block operator and the result is
    /// dropped when it equals the output polarity's implicit block; unmatched
    /// keys follow the plan's per-side [`Unmatched`] policy.
    ///
    /// When both arrays are large enough per `parallel`, the matched block
    /// pairs are evaluated on the [`MergePool`].
    pub fn merge(
        &self,
        other: &BlockArray,
        plan: &MergePlan,
        parallel: &ParallelOptions,
    ) -> Result<BlockArray> {
        if parallel.should_parallelize(self.len(), other.len()) {
            if let Some(pool) = MergePool::global() {
                return self.par_merge(other, plan, pool, parallel.max_degree);
            }
        }
        self.seq_merge(other, plan)
    }

    /// Sequential form of [`merge`](Self::merge).
    pub fn seq_merge(&self, other: &BlockArray, plan: &MergePlan) -> Result<BlockArray> {
        let mut result = BlockArray::with_capacity(plan.max_output_len(self.len(), other.len()));
        let mut sink = |no: u32, block: Block| {
            if !plan.output.is_implicit(&block) {
                result.entries.push(BlockEntry { no, block });
            }
        };
        let mut failure = None;
        walk(&self.entries, &other.entries, plan, |step| {
            if failure.is_some() {
                return;
            }
            match step {
                Step::Ready(no, block) => sink(no, block),
                Step::Pair(no, a, b) => match plan.op.apply(a, b) {
                    Ok(block) => sink(no, block),
                    Err(e) => failure = Some(e),
                },
            }
        });
        match failure {
            Some(e) => Err(e),
            None => Ok(result),
        }
    }

    /// Parallel form of [`merge`](Self::merge), evaluated on `pool`.
    ///
    /// The walk runs on the calling thread and records one slot per output
    /// candidate in key order. Matched pairs are then evaluated on the pool
    /// and written back into their slots, so the result does not depend on
    /// scheduling.
    pub fn par_merge(
        &self,
        other: &BlockArray,
        plan: &MergePlan,
        pool: &MergePool,
        max_degree: Option<usize>,
    ) -> Result<BlockArray> {
        let mut slots: Vec<(u32, Option<Block>)> =
            Vec::with_capacity(plan.max_output_len(self.len(), other.len()));
        let mut pairs: Vec<(&Block, &Block)> = Vec::new();
        walk(&self.entries, &other.entries, plan, |step| match step {
            Step::Ready(no, block) => slots.push((no, Some(block))),
            Step::Pair(no, a, b) => {
                slots.push((no, None));
                pairs.push((a, b));
            }
        });

        log::debug!(
            "parallel {:?} merge: {} block pairs on {} threads",
            plan.op,
            pairs.len(),
            pool.thread_count()
        );
        let op = plan.op;
        let mut evaluated = pool
            .map_ordered(&pairs, max_degree, |(a, b)| op.apply(a, b))
            .into_iter();

        let mut result = BlockArray::with_capacity(slots.len());
        for (no, slot) in slots {
            let block = match slot {
                Some(block) => block,
                None => match evaluated.next() {
                    Some(block) => block?,
                    None => unreachable!("one evaluated block per recorded pair"),
                },
            };
            if !plan.output.is_implicit(&block) {
                result.entries.push(BlockEntry { no, block });
            }
        }
        Ok(result)
    }
}

/// One output candidate produced by [`walk`].
enum Step<'a> {
    /// An unmatched key, already resolved.
    Ready(u32, Block),
    /// A key stored on both sides, still to be combined.
    Pair(u32, &'a Block, &'a Block),
}

/// The two-pointer walk shared by the sequential and parallel merges.
fn walk<'a>(
    left: &'a [BlockEntry],
    right: &'a [BlockEntry],
    plan: &MergePlan,
    mut emit: impl FnMut(Step<'a>),
) {
    let (mut i, mut j) = (0, 0);
    while i < left.len() && j < right.len() {
        let (a, b) = (&left[i], &right[j]);
        match a.no.cmp(&b.no) {
            Ordering::Less => {
                emit_unmatched(plan.left, a, &mut emit);
                i += 1;
            }
            Ordering::Greater => {
                emit_unmatched(plan.right, b, &mut emit);
                j += 1;
            }
            Ordering::Equal => {
                emit(Step::Pair(a.no, &a.block, &b.block));
                i += 1;
                j += 1;
            }
        }
    }
    if !plan.left.is_discard() {
        left[i..]
            .iter()
            .for_each(|entry| emit_unmatched(plan.left, entry, &mut emit));
    }
    if !plan.right.is_discard() {
        right[j..]
            .iter()
            .for_each(|entry| emit_unmatched(plan.right, entry, &mut emit));
    }
}

#[inline]
fn emit_unmatched<'a>(
    policy: Unmatched,
    entry: &'a BlockEntry,
    emit: &mut impl FnMut(Step<'a>),
) {
    if let Some(block) = policy.emit(&entry.block) {
        emit(Step::Ready(entry.no, block));
    }
}
