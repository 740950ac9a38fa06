mod block_tests;
mod map_tests;

use crate::{Block, EncodingFamily, Polarity, Vector, VectorOptions};

/// Number of blocks covered by the randomized models.
pub(crate) const WINDOW_BLOCKS: usize = 6;

pub(crate) fn window() -> u64 {
    (WINDOW_BLOCKS * Block::SIZE) as u64
}

/// Random bits where every block gets its own density class, so that every
/// encoding (and both sentinels) shows up.
pub(crate) fn random_bits(rng: &mut fastrand::Rng, len: usize) -> Vec<bool> {
    let mut bits = vec![false; len];
    for chunk in bits.chunks_mut(Block::SIZE) {
        let density = match rng.u8(0..7) {
            0 => 0.0,
            1 => 0.002,
            2 => 0.3,
            3 => 0.55,
            4 => 0.8,
            5 => 0.998,
            _ => 1.0,
        };
        chunk.iter_mut().for_each(|b| *b = rng.f64() < density);
    }
    bits
}

pub(crate) fn positions_of(bits: &[bool]) -> Vec<u64> {
    bits.iter()
        .enumerate()
        .filter(|(_, b)| **b)
        .map(|(i, _)| i as u64)
        .collect()
}

/// Builds a vector whose bits inside `[0, bits.len())` are `bits`; outside of
/// that window every bit equals the polarity's implicit bit.
pub(crate) fn vector_from_bits(bits: &[bool], polarity: Polarity, options: &VectorOptions) -> Vector {
    match polarity {
        Polarity::Unity => {
            Vector::from_sorted_slice_with_options(&positions_of(bits), options.clone()).unwrap()
        }
        Polarity::Zero => {
            let inverted = bits.iter().map(|b| !b).collect::<Vec<_>>();
            Vector::from_sorted_slice_with_options(&positions_of(&inverted), options.clone())
                .unwrap()
                .not()
        }
    }
}

pub(crate) fn families() -> [EncodingFamily; 2] {
    [EncodingFamily::List, EncodingFamily::Map]
}

pub(crate) fn polarity_pairs() -> [(Polarity, Polarity); 4] {
    [
        (Polarity::Unity, Polarity::Unity),
        (Polarity::Unity, Polarity::Zero),
        (Polarity::Zero, Polarity::Unity),
        (Polarity::Zero, Polarity::Zero),
    ]
}
