extern crate std;

use core::ptr::NonNull;
use std::{collections::VecDeque, fmt, prelude::v1::*};

use crate::{
    bst::balance_factor, comparator::Compare, AvlTree, BinarySearchTree, Links, TreeNode,
};

impl<T, C> BinarySearchTree<T, C>
where
    T: TreeNode<Links<T>>,
{
    /// Writes the tree to `w` as a Graphviz digraph named `name`.
    ///
    /// Each node is labeled `key:balance_factor` and nodes of equal depth share a rank. Missing
    /// children are drawn as points so that left and right stay distinguishable.
    pub fn dotgraph<W>(&self, name: &str, mut w: W) -> fmt::Result
    where
        W: fmt::Write,
        T::Key: fmt::Display,
    {
        let root = match self.root {
            Some(r) => r,
            None => return write!(w, "digraph \"graph-{name}\" {{}}"),
        };

        enum Item<T> {
            Node(NonNull<T>),
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

            for item in queue.drain(..).collect::<Vec<_>>() {
                let node = match item {
                    Item::Node(node) => node,
                    Item::Missing(id) => {
                        write!(w, "\"graph{name}-missing{id}\" [shape=point]; ")?;
                        continue;
                    }
                };

                let key = unsafe { node.as_ref().key() };
                let factor = unsafe { balance_factor(node) };
                write!(w, "\"graph{name}-{key}\" [label=\"{key}:{factor}\"]; ")?;

                let links = unsafe { T::links(node).as_ref() };
                for child in [links.left(), links.right()] {
                    match child {
                        Some(child) => {
                            let child_key = unsafe { child.as_ref().key() };

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

impl<T, C> AvlTree<T, C>
where
    T: TreeNode<Links<T>>,
    C: Compare<T::Key>,
{
    /// Writes the tree to `w` as a Graphviz digraph. See [`BinarySearchTree::dotgraph`].
    pub fn dotgraph<W>(&self, name: &str, w: W) -> fmt::Result
    where
        W: fmt::Write,
        T::Key: fmt::Display,
    {
        self.as_bst().dotgraph(name, w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TestNode;

    #[test]
    fn empty_graph() {
        let tree: AvlTree<TestNode> = AvlTree::new();

        let mut out = String::new();
        tree.dotgraph("empty", &mut out).unwrap();

        assert_eq!(out, "digraph \"graph-empty\" {}");
    }

    #[test]
    fn labels_carry_balance_factors() {
        let mut tree: BinarySearchTree<TestNode> = BinarySearchTree::new();
        for key in [2, 1, 3, 4] {
            assert!(tree.insert(TestNode::new(key)).is_ok());
        }

        let mut out = String::new();
        tree.dotgraph("t", &mut out).unwrap();

        assert!(out.starts_with("digraph \"graph-t\" {"));
        assert!(out.contains("\"grapht-2\" [label=\"2:-1\"];"));
        assert!(out.contains("\"grapht-1\" [label=\"1:0\"];"));
        assert!(out.contains("\"grapht-3\" [label=\"3:-1\"];"));
        assert!(out.contains("\"grapht-4\" [label=\"4:0\"];"));
        assert!(out.contains("\"grapht-2\" -> \"grapht-1\";"));
        assert!(out.contains("\"grapht-3\" -> \"grapht-4\";"));
        assert!(out.contains("\"grapht-3\" -> \"grapht-missing2\";"));
        assert_eq!(out.matches("{rank=same; ").count(), 4);
        assert!(out.ends_with(" }\n}"));
    }
}
