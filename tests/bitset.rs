//! Cross-module / scenario-level `BitSet` tests (`spec.md` §8 seed tests).

use bitrope::bitset::BitSet;

#[test]
fn canonical_form_after_remove_tail() {
    let mut s: BitSet = [0, 64, 128].into_iter().collect();
    s.remove(128);
    assert_eq!(s.len(), 2);
    assert!(s.contains(0));
    assert!(s.contains(64));
    assert!(!s.contains(128));
}

#[test]
fn set_algebra_scenario() {
    let a: BitSet = [1, 2, 3, 4].into_iter().collect();
    let b: BitSet = [0, 2, 4, 6].into_iter().collect();
    assert_eq!(a.union(&b).iter().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4, 6]);
    assert_eq!(a.intersection(&b).iter().collect::<Vec<_>>(), vec![2, 4]);
    assert_eq!(a.subtracting(&b).iter().collect::<Vec<_>>(), vec![1, 3]);
    assert_eq!(a.symmetric_difference(&b).iter().collect::<Vec<_>>(), vec![0, 1, 3, 6]);
    assert!(!a.is_disjoint(&b));
    let full = BitSet::from_range(0..10);
    assert!(a.is_subset(&full));
}

#[test]
fn range_insertion_scenario() {
    let mut s = BitSet::new();
    s.insert_range(3..130);
    assert_eq!(s.len(), 127);
    assert!(!s.contains(2));
    assert!(s.contains(3));
    assert!(s.contains(129));
    assert!(!s.contains(130));
}

#[test]
fn universal_invariant_union_of_iterables_matches_set_union() {
    let x = [1, 2, 2, 3, 5];
    let y = [3, 4, 4, 5, 6];
    let union_of_sets = BitSet::from_iter(x).union(&BitSet::from_iter(y));
    let union_of_iters: BitSet = x.into_iter().chain(y).collect();
    assert!(union_of_sets.is_equal_set(&union_of_iters));
}

#[test]
fn subset_both_ways_implies_equal() {
    let a: BitSet = [1, 2, 3].into_iter().collect();
    let b: BitSet = [3, 2, 1].into_iter().collect();
    assert!(a.is_subset(&b) && b.is_subset(&a));
    assert!(a.is_equal_set(&b));
}

#[test]
fn symmetric_difference_matches_union_minus_intersection() {
    let a: BitSet = [1, 2, 3, 4].into_iter().collect();
    let b: BitSet = [3, 4, 5, 6].into_iter().collect();
    let lhs = a.symmetric_difference(&b);
    let rhs = a.union(&b).subtracting(&a.intersection(&b));
    assert!(lhs.is_equal_set(&rhs));
}

#[test]
fn intersection_disjoint_with_symmetric_difference() {
    let a: BitSet = [1, 2, 3, 4, 1000].into_iter().collect();
    let b: BitSet = [2, 3, 4, 5, 2000].into_iter().collect();
    assert!(a.intersection(&b).is_disjoint(&a.symmetric_difference(&b)));
}

#[test]
fn wire_format_round_trips_large_sparse_set() {
    let s: BitSet = [0, 63, 64, 65, 1_000_000].into_iter().collect();
    let bytes = s.to_wire_bytes();
    let back = BitSet::from_wire_bytes(&bytes);
    assert!(s.is_equal_set(&back));
}

#[test]
fn empty_set_wire_format_is_empty() {
    assert!(BitSet::new().to_wire_bytes().is_empty());
    assert!(BitSet::from_wire_bytes(&[]).is_empty());
}

#[test]
#[should_panic]
fn negative_range_bound_is_fatal_on_insert() {
    let mut s = BitSet::new();
    s.insert_range(-5..10);
}

#[test]
fn negative_range_bound_clamps_to_empty_on_query_side() {
    let mut s: BitSet = [1, 2, 3].into_iter().collect();
    // remove_range/intersect_range clamp rather than panic (§7 item 3).
    s.remove_range(-10..2);
    assert_eq!(s.iter().collect::<Vec<_>>(), vec![2, 3]);
}
