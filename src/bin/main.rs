use arena_avl::AvlTree;

fn print_tree(tree: &AvlTree<u32, &str>, name: &str) {
    let mut graph = String::new();
    tree.dotgraph(name, &mut graph).unwrap();
    println!("{graph}");
    println!("// {tree:?} height={} len={}", tree.height(), tree.len());
}

fn main() {
    let mut tree: AvlTree<u32, &str> = AvlTree::new();

    for (key, value) in [
        (50, "fifty"),
        (30, "thirty"),
        (70, "seventy"),
        (20, "twenty"),
        (40, "forty"),
        (60, "sixty"),
        (80, "eighty"),
        (25, "twenty-five"),
        (35, "thirty-five"),
    ] {
        assert!(tree.insert(key, value));
        tree.assert_invariants();
    }

    print_tree(&tree, "built");

    assert!(!tree.insert(30, "duplicate"));
    assert_eq!(tree.get(&30), Some(&"thirty"));

    assert!(tree.remove(&30));
    tree.assert_invariants();
    print_tree(&tree, "removed-30");

    assert_eq!(tree.try_insert(None, Some("nothing")), Err(arena_avl::Error::MissingKey));

    drop(tree);
}
