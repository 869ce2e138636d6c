extern crate std;

use std::{ops::Range, prelude::v1::*};

use proptest::prelude::*;

use crate::model;

use super::*;

fn build(keys: &[u32]) -> AvlTree<u32, u32> {
    let mut tree = AvlTree::new();

    for &key in keys {
        assert!(tree.insert(key, key * 10));
        tree.assert_invariants();
    }

    tree
}

fn key_of(node: Option<NodeRef<'_, u32, u32>>) -> Option<u32> {
    node.map(|n| *n.key())
}

fn shape(tree: &AvlTree<u32, u32>) -> String {
    let mut out = String::new();
    tree.dotgraph("shape", &mut out).unwrap();
    out
}

fn insert_find_all(keys: &[u32]) {
    let tree = build(keys);

    for key in keys {
        assert_eq!(tree.get(key), Some(&(key * 10)));
    }

    assert_eq!(tree.len(), keys.len());
}

#[test]
fn zero_elems_find() {
    insert_find_all(&[]);
}

#[test]
fn single_elem_find() {
    insert_find_all(&[0]);
}

#[test]
fn two_elems_find() {
    insert_find_all(&[0, 1]);
    insert_find_all(&[1, 0]);
}

#[test]
fn three_elems_find() {
    insert_find_all(&[0, 1, 2]);
    insert_find_all(&[0, 2, 1]);
    insert_find_all(&[1, 0, 2]);
    insert_find_all(&[1, 2, 0]);
    insert_find_all(&[2, 0, 1]);
    insert_find_all(&[2, 1, 0]);
}

// Calls `f` with every permutation of `keys` (Heap's algorithm).
fn for_each_permutation(keys: &mut [u32], k: usize, f: &mut impl FnMut(&[u32])) {
    if k <= 1 {
        f(keys);
        return;
    }

    for i in 0..k - 1 {
        for_each_permutation(keys, k - 1, f);

        if k % 2 == 0 {
            keys.swap(i, k - 1);
        } else {
            keys.swap(0, k - 1);
        }
    }

    for_each_permutation(keys, k - 1, f);
}

#[test]
fn five_elems_find() {
    let mut keys = [0, 1, 2, 3, 4];
    for_each_permutation(&mut keys, 5, &mut |keys: &[u32]| insert_find_all(keys));
}

fn insert_remove_all(keys: &[u32]) {
    let mut tree = build(keys);

    for key in keys {
        assert!(tree.remove(key));
        assert_eq!(tree.get(key), None);
        tree.assert_invariants();
    }

    assert!(tree.is_empty());

    for &key in keys {
        assert!(tree.insert(key, key));
        tree.assert_invariants();
    }

    for key in keys.iter().rev() {
        assert_eq!(tree.remove_entry(key), Some((*key, *key)));
        tree.assert_invariants();
    }

    assert!(tree.is_empty());
    assert_eq!(tree.height(), -1);
}

#[test]
fn remove_one() {
    insert_remove_all(&[0]);
}

#[test]
fn remove_two() {
    insert_remove_all(&[0, 1]);
    insert_remove_all(&[1, 0]);
}

#[test]
fn remove_three() {
    insert_remove_all(&[0, 1, 2]);
    insert_remove_all(&[0, 2, 1]);
    insert_remove_all(&[1, 0, 2]);
    insert_remove_all(&[1, 2, 0]);
    insert_remove_all(&[2, 0, 1]);
    insert_remove_all(&[2, 1, 0]);
}

#[test]
fn remove_six() {
    let mut keys = [0, 1, 2, 3, 4, 5];
    for_each_permutation(&mut keys, 6, &mut |keys: &[u32]| insert_remove_all(keys));
}

// Removes every key from every tree shape reachable by inserting a permutation of `0..7`.
#[test]
fn remove_each_from_seven() {
    let mut keys = [0, 1, 2, 3, 4, 5, 6];
    for_each_permutation(&mut keys, 7, &mut |keys: &[u32]| {
        for victim in 0..7 {
            let mut tree = build(keys);
            assert!(tree.remove(&victim));
            tree.assert_invariants();
            assert_eq!(tree.len(), 6);
            assert!(!tree.contains_key(&victim));
        }
    });
}

#[test]
fn empty_tree() {
    let mut tree: AvlTree<u32, u32> = AvlTree::new();

    assert!(tree.is_empty());
    assert_eq!(tree.len(), 0);
    assert_eq!(tree.height(), -1);
    assert!(tree.root().is_none());
    assert_eq!(tree.get(&1), None);
    assert!(!tree.remove(&1));
    tree.assert_invariants();
}

#[test]
fn ascending_insert_rotates_left() {
    let tree = build(&[10, 20, 30]);
    let root = tree.root().unwrap();

    assert_eq!(*root.key(), 20);
    assert_eq!(key_of(root.left()), Some(10));
    assert_eq!(key_of(root.right()), Some(30));
    assert_eq!(tree.height(), 1);
    assert!(root.parent().is_none());
}

#[test]
fn zig_zag_insert_rotates_twice() {
    let tree = build(&[30, 10, 20]);
    let root = tree.root().unwrap();

    assert_eq!(*root.key(), 20);
    assert_eq!(key_of(root.left()), Some(10));
    assert_eq!(key_of(root.right()), Some(30));
    assert_eq!(tree.height(), 1);
}

#[test]
fn mirrored_zig_zag_insert_rotates_twice() {
    let tree = build(&[10, 30, 20]);
    assert_eq!(key_of(tree.root()), Some(20));
    assert_eq!(tree.height(), 1);
}

#[test]
fn remove_with_leaf_predecessor() {
    let mut tree = build(&[50, 30, 70, 20, 40, 60, 80]);

    assert!(tree.remove(&30));
    tree.assert_invariants();

    assert_eq!(tree.len(), 6);
    assert_eq!(tree.get(&30), None);
    assert_eq!(tree.get(&20), Some(&200));
    assert_eq!(tree.get(&40), Some(&400));

    // The left child was the predecessor and took the removed node's place.
    let left = tree.root().unwrap().left().unwrap();
    assert_eq!(*left.key(), 20);
    assert_eq!(key_of(left.right()), Some(40));
    assert_eq!(key_of(left.parent()), Some(50));
}

#[test]
fn remove_with_leaf_successor() {
    let mut tree = build(&[50, 30, 70, 20, 40, 60, 80, 25]);

    assert!(tree.remove(&30));
    tree.assert_invariants();

    // 40 adopts 20 and becomes left-heavy with a right-leaning child, so the subtree is
    // straightened with a double rotation around 25.
    let left = tree.root().unwrap().left().unwrap();
    assert_eq!(*left.key(), 25);
    assert_eq!(key_of(left.left()), Some(20));
    assert_eq!(key_of(left.right()), Some(40));
}

#[test]
fn remove_with_deep_predecessor() {
    let mut tree = build(&[50, 30, 70, 20, 40, 60, 80, 25, 35]);

    assert!(tree.remove(&30));
    tree.assert_invariants();

    let left = tree.root().unwrap().left().unwrap();
    assert_eq!(*left.key(), 25);
    assert_eq!(key_of(left.left()), Some(20));
    assert_eq!(key_of(left.right()), Some(40));
    assert!(left.left().unwrap().is_leaf());
    assert_eq!(left.height(), 2);
}

#[test]
fn remove_root() {
    let mut tree = build(&[2, 1, 3]);

    assert!(tree.remove(&2));
    tree.assert_invariants();
    assert_eq!(key_of(tree.root()), Some(1));
    assert!(tree.root().unwrap().parent().is_none());

    assert!(tree.remove(&1));
    assert!(tree.remove(&3));
    assert!(tree.root().is_none());
}

// Removing from the shallow side of the tree rotates at the root.
#[test]
fn remove_rebalances_up_to_root() {
    let mut tree = build(&[5, 3, 8, 2, 4, 7, 10, 1, 6, 9, 11, 12]);
    let height = tree.height();

    assert!(tree.remove(&1));
    tree.assert_invariants();
    assert!(tree.remove(&2));
    tree.assert_invariants();
    assert!(tree.remove(&4));
    tree.assert_invariants();

    assert!(tree.height() <= height);
    assert_eq!(key_of(tree.root()), Some(8));
}

#[test]
fn duplicate_insert_is_rejected() {
    let mut tree = build(&[1, 2, 3]);
    let before = shape(&tree);

    assert!(!tree.insert(2, 0));
    assert_eq!(tree.get(&2), Some(&20));
    assert_eq!(tree.len(), 3);
    assert_eq!(shape(&tree), before);
}

#[test]
fn removing_absent_key_changes_nothing() {
    let mut tree = build(&[4, 2, 6, 1, 3, 5, 7]);
    let before = shape(&tree);

    assert!(!tree.remove(&8));
    assert!(tree.remove(&3));
    let after_removal = shape(&tree);
    assert!(!tree.remove(&3));

    assert_eq!(shape(&tree), after_removal);
    assert_ne!(before, after_removal);
    assert_eq!(tree.len(), 6);
}

#[test]
fn get_mut_updates_value() {
    let mut tree = build(&[1, 2, 3]);

    *tree.get_mut(&2).unwrap() = 99;
    assert_eq!(tree.get(&2), Some(&99));
    assert_eq!(tree.get_mut(&4), None);
}

#[test]
fn borrowed_lookup() {
    let mut tree: AvlTree<String, usize> = AvlTree::new();

    for word in ["pear", "apple", "fig"] {
        assert!(tree.insert(word.to_string(), word.len()));
    }

    assert_eq!(tree.get("fig"), Some(&3));
    assert!(tree.remove("apple"));
    assert!(!tree.contains_key("apple"));
    tree.assert_invariants();
}

#[test]
fn slots_are_reused() {
    let mut tree = build(&[1, 2, 3, 4]);

    assert!(tree.remove(&2));
    assert!(tree.remove(&3));
    assert!(tree.insert(5, 50));
    assert!(tree.insert(6, 60));
    tree.assert_invariants();

    assert_eq!(tree.get(&5), Some(&50));
    assert_eq!(tree.get(&6), Some(&60));
}

#[test]
fn sequential_inserts_stay_logarithmic() {
    let mut tree = AvlTree::new();

    for key in 0u32..1023 {
        assert!(tree.insert(key, ()));
    }
    tree.assert_invariants();

    // Sequential insertion of 2^k - 1 keys yields a perfect tree.
    assert_eq!(tree.height(), 9);

    for key in (0u32..1023).step_by(2) {
        assert!(tree.remove(&key));
    }
    tree.assert_invariants();
    assert_eq!(tree.len(), 511);
}

#[test]
fn parent_links_mirror_children() {
    let tree = build(&[8, 4, 12, 2, 6, 10, 14, 1, 3, 5, 7]);
    let mut stack = vec![tree.root().unwrap()];

    while let Some(node) = stack.pop() {
        assert!(node.is_balanced());

        for child in [node.left(), node.right()].into_iter().flatten() {
            assert_eq!(child.parent(), Some(node));
            stack.push(child);
        }
    }
}

#[test]
fn clear_empties_tree() {
    let mut tree = build(&[3, 1, 2]);

    tree.clear();
    tree.assert_invariants();
    assert!(tree.is_empty());
    assert_eq!(tree.height(), -1);

    assert!(tree.insert(1, 1));
    tree.assert_invariants();
}

#[test]
fn debug_lists_entries_in_order() {
    let tree = build(&[2, 3, 1]);
    assert_eq!(format!("{tree:?}"), "{1: 10, 2: 20, 3: 30}");

    let root = tree.root().unwrap();
    assert_eq!(
        format!("{root:?}"),
        "NodeRef { key: 2, value: 20, height: 1 }"
    );
}

#[test]
fn dotgraph_labels_heights() {
    let empty: AvlTree<u32, u32> = AvlTree::new();
    assert_eq!(shape(&empty), "digraph \"graph-shape\" {}");

    let graph = shape(&build(&[1, 2]));
    assert!(graph.contains("\"graphshape-1\" [label=\"1:1\"];"));
    assert!(graph.contains("\"graphshape-2\" [label=\"2:0\"];"));
    assert!(graph.contains("\"graphshape-1\" -> \"graphshape-2\";"));
    assert!(graph.contains("\"graphshape-1\" -> \"graphshape-missing0\";"));
}

#[cfg(miri)]
const FUZZ_RANGE: Range<usize> = 0..10;

#[cfg(not(miri))]
const FUZZ_RANGE: Range<usize> = 0..1000;

proptest::proptest! {
    #![proptest_config(ProptestConfig {
        max_shrink_iters: 65536,
        .. ProptestConfig::default()
    })]

    #[test]
    fn btree_equivalence(ops in proptest::collection::vec(model::op_strategy(), FUZZ_RANGE)) {
        model::run_btree_equivalence(ops);
    }

    #[test]
    fn insert_then_get(keys in proptest::collection::vec(any::<u16>(), 0..200)) {
        let mut tree = AvlTree::new();

        for (i, &key) in keys.iter().enumerate() {
            let inserted = tree.insert(key, i);
            prop_assert_eq!(inserted, !keys[..i].contains(&key));
        }

        tree.assert_invariants();

        for (i, &key) in keys.iter().enumerate() {
            let first = keys.iter().position(|&k| k == key).unwrap();
            prop_assert_eq!(tree.get(&key), Some(&first));
            prop_assert!(first <= i);
        }
    }
}
