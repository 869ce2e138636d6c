use alloc::{collections::VecDeque, string::String};
use core::fmt;

use crate::{node::NodeId, AvlTree};

impl<K, V> AvlTree<K, V>
where
    K: fmt::Display,
{
    /// Writes the tree to `w` as a Graphviz digraph.
    ///
    /// Each level of the tree is one rank of the graph. Nodes are labelled `key:height`, and
    /// missing children are drawn as points.
    pub fn dotgraph<W>(&self, name: &str, mut w: W) -> fmt::Result
    where
        W: fmt::Write,
    {
        let root = match self.root {
            Some(r) => r,
            None => return write!(w, "digraph \"graph-{name}\" {{}}"),
        };

        enum Item {
            Node(NodeId),
            Missing(u32),
        }

        let mut queue = VecDeque::new();
        queue.push_back(Item::Node(root));

        write!(
            w,
            "digraph \"graph-{name}\" {{\n subgraph \"subgraph-{name}\" {{"
        )?;

        let mut missing = 0;
        let mut edges = String::new();

        while !queue.is_empty() {
            use fmt::Write;

            write!(w, "{{rank=same; ")?;

            for _ in 0..queue.len() {
                let node = match queue.pop_front() {
                    Some(Item::Node(node)) => node,
                    Some(Item::Missing(id)) => {
                        write!(w, "\"graph{name}-missing{id}\" [shape=point]; ")?;
                        continue;
                    }
                    None => break,
                };

                let key = &self.arena.get(node).key;
                let height = self.links(node).height();
                write!(w, "\"graph{name}-{key}\" [label=\"{key}:{height}\"]; ")?;

                let links = self.links(node);
                for child in [links.left(), links.right()] {
                    match child {
                        Some(child) => {
                            let child_key = &self.arena.get(child).key;

                            queue.push_back(Item::Node(child));
                            writeln!(
                                edges,
                                "\"graph{name}-{key}\" -> \"graph{name}-{child_key}\";"
                            )?;
                        }

                        None => {
                            queue.push_back(Item::Missing(missing));
                            writeln!(
                                edges,
                                "\"graph{name}-{key}\" -> \"graph{name}-missing{missing}\";"
                            )?;
                            missing += 1;
                        }
                    }
                }
            }

            writeln!(w, "}}")?;
        }

        w.write_str(&edges)?;

        w.write_str(" }\n}")
    }
}
