use crate::{
    block::{Block, map::WordMap},
    word_ops::WordKernels,
};

#[test]
fn test_from_offsets_and_contains() {
    let map = WordMap::from_offsets([0u16, 63, 64, 8191]);
    assert_eq!(map.count_ones(), 4);
    assert_eq!(map.count_zeros(), Block::SIZE - 4);
    assert!(map.contains(0));
    assert!(map.contains(63));
    assert!(map.contains(64));
    assert!(!map.contains(65));
    assert!(map.contains(8191));
    assert_eq!(map.words()[0], 1 | (1 << 63));
    assert_eq!(map.words()[1], 1);
}

#[test]
fn test_ones_and_zeros() {
    let map = WordMap::from_offsets([3u16, 64, 4000]);
    assert_eq!(map.ones().collect::<Vec<_>>(), vec![3, 64, 4000]);

    let zeros = map.complement();
    assert_eq!(zeros.zeros().collect::<Vec<_>>(), vec![3, 64, 4000]);
    assert_eq!(WordMap::zeroed().ones().count(), 0);
    assert_eq!(WordMap::zeroed().zeros().count(), Block::SIZE);
}

#[test]
fn test_last_one_and_last_zero() {
    assert_eq!(WordMap::zeroed().last_one(), None);
    assert_eq!(WordMap::zeroed().last_zero(), Some(8191));
    let map = WordMap::from_offsets([5u16, 130]);
    assert_eq!(map.last_one(), Some(130));
    let inverted = map.complement();
    assert_eq!(inverted.last_zero(), Some(130));
    assert_eq!(WordMap::zeroed().complement().last_zero(), None);
}

#[test]
fn test_all_zeros_all_ones() {
    assert!(WordMap::zeroed().is_all_zeros());
    assert!(!WordMap::zeroed().is_all_ones());
    assert!(WordMap::zeroed().complement().is_all_ones());
}

#[test]
fn test_word_ops() {
    let a = WordMap::from_offsets([1u16, 2, 3, 100]);
    let b = WordMap::from_offsets([2u16, 3, 4, 200]);
    assert_eq!(a.and(&b).ones().collect::<Vec<_>>(), vec![2, 3]);
    assert_eq!(a.or(&b).ones().collect::<Vec<_>>(), vec![1, 2, 3, 4, 100, 200]);
    assert_eq!(a.xor(&b).ones().collect::<Vec<_>>(), vec![1, 4, 100, 200]);
    assert_eq!(a.and_not(&b).ones().collect::<Vec<_>>(), vec![1, 100]);
}

#[test]
fn test_and_with_explicit_kernels() {
    let mut rng = fastrand::Rng::with_seed(7);
    let a = WordMap::new((0..Block::WORDS).map(|_| rng.u64(..)).collect());
    let b = WordMap::new((0..Block::WORDS).map(|_| rng.u64(..)).collect());
    let scalar = a.and_with(&b, &WordKernels::scalar());
    let detected = a.and_with(&b, &WordKernels::detect());
    assert_eq!(scalar, detected);
    assert_eq!(scalar, a.and(&b));
}

#[test]
#[should_panic]
fn test_wrong_word_count_rejected() {
    WordMap::new(vec![0; 3]);
}
