extern crate std;

use std::{
    collections::{btree_map::Entry, BTreeMap},
    prelude::v1::*,
};

use arbitrary::Arbitrary;
use proptest::strategy::{Just, Strategy};

use crate::AvlTree;

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum ItemValue {
    Index(usize),
    Random(u32),
}

proptest::prop_compose! {
    fn index_strategy()(
        index in 0usize..1000,
    ) -> ItemValue {
        ItemValue::Index(index)
    }
}

proptest::prop_compose! {
    fn random_strategy()(
        random in 0u32..1000,
    ) -> ItemValue {
        ItemValue::Random(random)
    }
}

fn value_strategy() -> impl Strategy<Value = ItemValue> {
    proptest::prop_oneof![index_strategy(), random_strategy()]
}

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum Op {
    Insert(ItemValue),
    Get(ItemValue),
    GetMut(ItemValue),
    Remove(ItemValue),
    RemoveEntry(ItemValue),
    Clear,
}

impl Op {
    // Resolves `Index` items against the keys currently present, so that operations on existing
    // keys are generated as often as operations on fresh ones.
    fn finalize(self, sorted: &[u32]) -> FinalOp {
        fn get_value(v: &[u32], i: ItemValue) -> u32 {
            match i {
                ItemValue::Index(idx) => {
                    if v.is_empty() {
                        idx as u32
                    } else {
                        v[idx % v.len()]
                    }
                }
                ItemValue::Random(v) => v,
            }
        }

        match self {
            Op::Insert(item) => FinalOp::Insert(get_value(sorted, item)),
            Op::Get(item) => FinalOp::Get(get_value(sorted, item)),
            Op::GetMut(item) => FinalOp::GetMut(get_value(sorted, item)),
            Op::Remove(item) => FinalOp::Remove(get_value(sorted, item)),
            Op::RemoveEntry(item) => FinalOp::RemoveEntry(get_value(sorted, item)),
            Op::Clear => FinalOp::Clear,
        }
    }
}

#[derive(Copy, Clone, Debug)]
enum FinalOp {
    Insert(u32),
    Get(u32),
    GetMut(u32),
    Remove(u32),
    RemoveEntry(u32),
    Clear,
}

pub fn op_strategy() -> impl Strategy<Value = Op> {
    proptest::prop_oneof![
        4 => value_strategy().prop_map(Op::Insert),
        2 => value_strategy().prop_map(Op::Get),
        1 => value_strategy().prop_map(Op::GetMut),
        2 => value_strategy().prop_map(Op::Remove),
        1 => value_strategy().prop_map(Op::RemoveEntry),
        1 => Just(Op::Clear),
    ]
}

/// Applies `ops` to both an [`AvlTree`] and a [`BTreeMap`], panicking on the first divergence.
///
/// Inserted values are the index of the inserting op, so a duplicate insert that overwrote the
/// stored value would be caught by a later lookup.
pub fn run_btree_equivalence(ops: Vec<Op>) {
    let mut sorted_keys = Vec::with_capacity(ops.len());
    let mut btree = BTreeMap::new();
    let mut avl: AvlTree<u32, usize> = AvlTree::new();

    fn insert_sorted(v: &mut Vec<u32>, key: u32) {
        if let Err(idx) = v.binary_search(&key) {
            v.insert(idx, key);
        }
    }

    fn remove_sorted(v: &mut Vec<u32>, key: u32) {
        if let Ok(idx) = v.binary_search(&key) {
            v.remove(idx);
        }
    }

    for (op_id, op) in ops.into_iter().enumerate() {
        let final_op = op.finalize(&sorted_keys);

        match final_op {
            FinalOp::Insert(key) => {
                insert_sorted(&mut sorted_keys, key);

                let from_btree = match btree.entry(key) {
                    Entry::Vacant(entry) => {
                        entry.insert(op_id);
                        true
                    }
                    Entry::Occupied(_) => false,
                };
                let from_avl = avl.insert(key, op_id);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Get(key) => {
                let from_btree = btree.get(&key);
                let from_avl = avl.get(&key);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::GetMut(key) => {
                let from_btree = btree.get_mut(&key).map(|v| {
                    *v += 1;
                    *v
                });
                let from_avl = avl.get_mut(&key).map(|v| {
                    *v += 1;
                    *v
                });

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Remove(key) => {
                remove_sorted(&mut sorted_keys, key);

                let from_btree = btree.remove(&key).is_some();
                let from_avl = avl.remove(&key);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::RemoveEntry(key) => {
                remove_sorted(&mut sorted_keys, key);

                let from_btree = btree.remove_entry(&key);
                let from_avl = avl.remove_entry(&key);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Clear => {
                sorted_keys.clear();
                btree.clear();
                avl.clear();
            }
        }

        avl.assert_invariants();
        assert_eq!(btree.len(), avl.len());
        assert!(btree.iter().all(|(k, v)| avl.get(k) == Some(v)));
    }
}
