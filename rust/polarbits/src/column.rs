//! A `u32` column stored as one bit vector per value bit.

use polarbits_common::Result;

use crate::{Vector, builder::VectorBuilder, config::VectorOptions};

/// Maps positions to `u32` values using 32 bit-slice vectors.
///
/// Slice `i` holds the positions whose value has bit `i` set; `presence`
/// holds every position that has a value at all (including value 0).
#[derive(Clone, Debug)]
pub struct BitSlicedColumn {
    presence: Vector,
    slices: Vec<Vector>,
}

impl BitSlicedColumn {
    pub const BITS: usize = u32::BITS as usize;

    /// Builds the column from `(position, value)` pairs sorted by unique position.
    pub fn from_pairs(pairs: &[(u64, u32)]) -> Result<BitSlicedColumn> {
        BitSlicedColumn::from_pairs_with_options(pairs, VectorOptions::default())
    }

    pub fn from_pairs_with_options(
        pairs: &[(u64, u32)],
        options: VectorOptions,
    ) -> Result<BitSlicedColumn> {
        let mut presence = VectorBuilder::new(options.clone());
        let mut slices = (0..Self::BITS)
            .map(|_| VectorBuilder::new(options.clone()))
            .collect::<Vec<_>>();
        for &(pos, value) in pairs {
            presence.push(pos)?;
            let mut bits = value;
            while bits != 0 {
                let bit = bits.trailing_zeros() as usize;
                slices[bit].push(pos)?;
                bits &= bits - 1;
            }
        }
        Ok(BitSlicedColumn {
            presence: presence.build(),
            slices: slices.into_iter().map(VectorBuilder::build).collect(),
        })
    }

    pub fn presence(&self) -> &Vector {
        &self.presence
    }

    /// The vector of positions whose value has bit `bit` set.
    pub fn bit_slice(&self, bit: usize) -> Option<&Vector> {
        self.slices.get(bit)
    }

    /// Masks every value with `mask`; positions keep their presence.
    pub fn and_value(&self, mask: u32) -> Result<BitSlicedColumn> {
        let slices = self
            .slices
            .iter()
            .enumerate()
            .map(|(bit, slice)| {
                if mask & (1 << bit) != 0 {
                    slice.and(&self.presence)
                } else {
                    Ok(Vector::empty_with_options(slice.options().clone()))
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(BitSlicedColumn {
            presence: self.presence.clone(),
            slices,
        })
    }

    /// Positions whose value equals `value`.
    pub fn positions_equal_to(&self, value: u32) -> Result<Vector> {
        let mut result = self.presence.clone();
        for (bit, slice) in self.slices.iter().enumerate() {
            result = if value & (1 << bit) != 0 {
                result.and(slice)?
            } else {
                result.sub(slice)?
            };
        }
        Ok(result)
    }

    /// Value stored at `pos`, or `None` when the position has no value.
    pub fn value_at(&self, pos: u64) -> Result<Option<u32>> {
        if !self.presence.get(pos)? {
            return Ok(None);
        }
        let mut value = 0u32;
        for (bit, slice) in self.slices.iter().enumerate() {
            if slice.get(pos)? {
                value |= 1 << bit;
            }
        }
        Ok(Some(value))
    }
}

impl std::fmt::Display for BitSlicedColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "presence: {}", self.presence)?;
        for (bit, slice) in self.slices.iter().enumerate() {
            writeln!(f, "bit {bit}: {slice}")?;
        }
        Ok(())
    }
}
