use itertools::iproduct;
use polarbits_common::ErrorKind;

use crate::{
    block::{
        Block, BlockKind, EncodingFamily,
        list::OffsetList,
        map::WordMap,
    },
    plan::BlockOp,
};

fn block_from_bits(family: EncodingFamily, bits: &[bool]) -> Block {
    let offsets = bits
        .iter()
        .enumerate()
        .filter(|(_, b)| **b)
        .map(|(i, _)| i as u16)
        .collect::<Vec<_>>();
    Block::from_offsets(family, &offsets)
}

fn bits_of(block: &Block) -> Vec<bool> {
    (0..Block::SIZE).map(|i| block.contains(i as u16)).collect()
}

fn random_block_bits(rng: &mut fastrand::Rng) -> Vec<bool> {
    let density = [0.0, 0.001, 0.1, 0.49, 0.51, 0.9, 0.999, 1.0][rng.usize(0..8)];
    (0..Block::SIZE).map(|_| rng.f64() < density).collect()
}

/// Random blocks of a family, covering every encoding of that family.
fn random_blocks(family: EncodingFamily, rng: &mut fastrand::Rng, count: usize) -> Vec<(Block, Vec<bool>)> {
    let mut blocks = vec![
        (Block::Empty, vec![false; Block::SIZE]),
        (Block::Full, vec![true; Block::SIZE]),
    ];
    for _ in 0..count {
        let bits = random_block_bits(rng);
        let block = block_from_bits(family, &bits);
        // The map family only produces zero maps through complements.
        let inverted = bits.iter().map(|b| !b).collect::<Vec<_>>();
        let complement = block_from_bits(family, &inverted).not();
        blocks.push((block, bits.clone()));
        blocks.push((complement, bits));
    }
    blocks
}

fn assert_canonical(block: &Block) {
    let cardinality = block.cardinality();
    match block {
        Block::Empty => assert_eq!(cardinality, 0),
        Block::Full => assert_eq!(cardinality, Block::SIZE),
        Block::PosList(set) => {
            assert!(!set.is_empty());
            assert!(set.len() <= Block::MAX_LIST_LEN);
        }
        Block::InvPosList(unset) => {
            assert!(!unset.is_empty());
            assert!(unset.len() <= Block::MAX_LIST_LEN);
        }
        Block::BitMap(_) | Block::ZeroMap(_) => {
            assert!(cardinality > 0 && cardinality < Block::SIZE);
        }
    }
}

#[test]
fn test_from_offsets_collapses_sentinels() {
    for family in super::families() {
        assert_eq!(Block::from_offsets(family, &[]), Block::Empty);
        let all = (0..Block::SIZE as u16).collect::<Vec<_>>();
        assert_eq!(Block::from_offsets(family, &all), Block::Full);
    }
    assert_eq!(Block::from_set_offsets(OffsetList::empty()), Block::Empty);
    assert_eq!(Block::from_unset_offsets(OffsetList::empty()), Block::Full);
    assert_eq!(Block::from_unset_offsets(OffsetList::all()), Block::Empty);
    assert_eq!(Block::from_set_words(WordMap::zeroed()), Block::Empty);
    assert_eq!(Block::from_unset_words(WordMap::zeroed()), Block::Full);
}

#[test]
fn test_list_family_rebalances_dense_blocks() {
    let offsets = (0..5000u16).collect::<Vec<_>>();
    let block = Block::from_offsets(EncodingFamily::List, &offsets);
    assert_eq!(block.kind(), BlockKind::InvPosList);
    assert_eq!(block.cardinality(), 5000);
    assert!(block.contains(4999));
    assert!(!block.contains(5000));
    assert_eq!(block.last_set_offset(), Some(4999));

    let sparse = Block::from_offsets(EncodingFamily::List, &offsets[..4096]);
    assert_eq!(sparse.kind(), BlockKind::PosList);
}

#[test]
fn test_map_family_uses_bit_maps() {
    let block = Block::from_offsets(EncodingFamily::Map, &[1, 2, 3]);
    assert_eq!(block.kind(), BlockKind::BitMap);
    assert_eq!(block.not().kind(), BlockKind::ZeroMap);
    assert_eq!(block.not().cardinality(), Block::SIZE - 3);
    assert_eq!(block.family(), Some(EncodingFamily::Map));
    assert_eq!(Block::Full.family(), None);
}

#[test]
fn test_not_swaps_variants() {
    let list = OffsetList::from_slice(&[4, 8]);
    assert_eq!(Block::Empty.not(), Block::Full);
    assert_eq!(Block::Full.not(), Block::Empty);
    assert_eq!(
        Block::PosList(list.clone()).not(),
        Block::InvPosList(list.clone())
    );
    assert_eq!(Block::InvPosList(list.clone()).not(), Block::PosList(list));
    let map = WordMap::from_offsets([1u16]);
    assert_eq!(Block::BitMap(map.clone()).not(), Block::ZeroMap(map));
}

#[test]
fn test_operators_match_bitwise_model() {
    let mut rng = fastrand::Rng::with_seed(0xb10c);
    for family in super::families() {
        let blocks = random_blocks(family, &mut rng, 6);
        for ((a, a_bits), (b, b_bits), op) in iproduct!(&blocks, &blocks, BlockOp::ALL) {
            let result = op.apply(a, b).unwrap();
            assert_canonical(&result);
            if let Some(result_family) = result.family() {
                assert_eq!(result_family, family);
            }
            let expected = a_bits
                .iter()
                .zip(b_bits)
                .map(|(&x, &y)| op.eval(x, y))
                .collect::<Vec<_>>();
            assert!(
                bits_of(&result) == expected,
                "{op:?} of {:?} and {:?}",
                a.kind(),
                b.kind()
            );
        }
    }
}

#[test]
fn test_offsets_and_cardinality_agree() {
    let mut rng = fastrand::Rng::with_seed(11);
    for family in super::families() {
        for (block, bits) in random_blocks(family, &mut rng, 4) {
            let expected = bits
                .iter()
                .enumerate()
                .filter(|(_, b)| **b)
                .map(|(i, _)| i as u16)
                .collect::<Vec<_>>();
            assert_eq!(block.offsets().collect::<Vec<_>>(), expected);
            assert_eq!(block.cardinality(), expected.len());
            assert_eq!(block.last_set_offset(), expected.last().copied());
        }
    }
}

#[test]
fn test_and_of_pos_list_and_inv_pos_list_is_pos_list() {
    let set = Block::from_offsets(EncodingFamily::List, &[1, 2, 3, 10]);
    let dense = Block::from_offsets(EncodingFamily::List, &(3..8000).collect::<Vec<_>>());
    assert_eq!(dense.kind(), BlockKind::InvPosList);
    let result = set.and(&dense).unwrap();
    assert_eq!(result, Block::PosList(OffsetList::from_slice(&[3, 10])));
    assert_eq!(dense.and(&set).unwrap(), result);
}

#[test]
fn test_xor_of_pos_list_and_inv_pos_list_is_inv_pos_list() {
    let set = Block::from_offsets(EncodingFamily::List, &[1, 2]);
    let dense = Block::InvPosList(OffsetList::from_slice(&[2, 5]));
    let result = set.xor(&dense).unwrap();
    assert_eq!(result, Block::InvPosList(OffsetList::from_slice(&[1, 5])));
}

#[test]
fn test_full_and_empty_identities() {
    let block = Block::from_offsets(EncodingFamily::List, &[42]);
    assert_eq!(block.and(&Block::Full).unwrap(), block);
    assert_eq!(Block::Full.and(&block).unwrap(), block);
    assert_eq!(block.and(&Block::Empty).unwrap(), Block::Empty);
    assert_eq!(block.or(&Block::Empty).unwrap(), block);
    assert_eq!(block.or(&Block::Full).unwrap(), Block::Full);
    assert_eq!(block.xor(&Block::Full).unwrap(), block.not());
    assert_eq!(block.sub(&Block::Full).unwrap(), Block::Empty);
    assert_eq!(Block::Full.sub(&block).unwrap(), block.not());
    assert_eq!(block.nand(&block).unwrap(), block.not());
}

#[test]
fn test_collapse_to_sentinels() {
    let a = Block::from_offsets(EncodingFamily::List, &[1, 2]);
    let b = Block::from_offsets(EncodingFamily::List, &[3, 4]);
    assert_eq!(a.and(&b).unwrap(), Block::Empty);
    assert_eq!(a.xor(&a).unwrap(), Block::Empty);
    assert_eq!(a.or(&a.not()).unwrap(), Block::Full);

    let m = Block::from_offsets(EncodingFamily::Map, &[1, 2]);
    assert_eq!(m.and(&m.not()).unwrap(), Block::Empty);
    assert_eq!(m.or(&m.not()).unwrap(), Block::Full);
    assert_eq!(m.not().xor(&m.not()).unwrap(), Block::Empty);
}

#[test]
fn test_mixed_family_is_rejected() {
    let list = Block::from_offsets(EncodingFamily::List, &[1]);
    let map = Block::from_offsets(EncodingFamily::Map, &[1]);
    for op in BlockOp::ALL {
        let err = op.apply(&list, &map).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::MixedEncodingFamily { .. }));
        assert!(op.apply(&map.not(), &list).is_err());
    }
    // The sentinels are shared by both families.
    assert_eq!(Block::Full.and(&map).unwrap(), map);
    assert_eq!(list.or(&Block::Empty).unwrap(), list);
}

#[test]
fn test_is_equal_to_across_encodings() {
    let map = WordMap::from_offsets([1u16, 5]);
    let bit_map = Block::BitMap(map.clone());
    let zero_map = Block::ZeroMap(map.complement());
    assert_ne!(bit_map, zero_map);
    assert!(bit_map.is_equal_to(&zero_map));

    let pos_list = Block::PosList(OffsetList::from_slice(&[1, 5]));
    assert!(pos_list.is_equal_to(&bit_map));
    assert!(!pos_list.is_equal_to(&Block::Empty));
}

#[test]
fn test_optimize_rebalances_unbalanced_lists() {
    let dense = Block::PosList(OffsetList::new((0..6000).collect()));
    let optimized = dense.optimize();
    assert_eq!(optimized.kind(), BlockKind::InvPosList);
    assert!(optimized.is_equal_to(&dense));
    assert_eq!(Block::PosList(OffsetList::all()).optimize(), Block::Full);
    assert_eq!(Block::ZeroMap(WordMap::zeroed()).optimize(), Block::Full);
}

#[test]
fn test_heap_size() {
    assert_eq!(Block::Empty.heap_size_bytes(), 0);
    assert_eq!(
        Block::from_offsets(EncodingFamily::List, &[1, 2]).heap_size_bytes(),
        4
    );
    assert_eq!(
        Block::from_offsets(EncodingFamily::Map, &[1, 2]).heap_size_bytes(),
        Block::WORDS * 8
    );
}

#[test]
fn test_half_full_block_is_pos_list() {
    let evens = (0..Block::SIZE as u16).step_by(2).collect::<Vec<_>>();
    assert_eq!(evens.len(), Block::MAX_LIST_LEN);
    let from_set = Block::from_set_offsets(OffsetList::from_slice(&evens));
    let from_unset = Block::from_unset_offsets(OffsetList::from_slice(&evens));
    assert_eq!(from_set.kind(), BlockKind::PosList);
    assert_eq!(from_unset.kind(), BlockKind::PosList);
    assert_eq!(from_unset.cardinality(), Block::MAX_LIST_LEN);
    assert!(from_unset.contains(1) && !from_unset.contains(0));

    // `not` keeps the payload, so the tie shows up as an inverted list
    // until the block is optimized.
    let inverted = from_set.not();
    assert_eq!(inverted.kind(), BlockKind::InvPosList);
    let optimized = inverted.optimize();
    assert_eq!(optimized.kind(), BlockKind::PosList);
    assert!(optimized.is_equal_to(&inverted));
}
