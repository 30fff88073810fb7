use std::cmp::Ordering;
use std::ops::ControlFlow;
use crate::error::Result;
use crate::util::arena::{Arena, Handle};

pub mod sort;

// -- Capabilities -------------------------------------------------------------------------------

/// A three-way comparison over `T`.
///
/// Implementations must be deterministic and describe a total order (transitive and
/// antisymmetric) for as long as they are used with one [`Tree`]. Violations are not detected;
/// they leave the tree ordered in some unspecified way.
pub trait Comparator<T: ?Sized> {
    fn compare(&self, a: &T, b: &T) -> Ordering;
}

impl<T: ?Sized, F: Fn(&T, &T) -> Ordering> Comparator<T> for F {
    fn compare(&self, a: &T, b: &T) -> Ordering { return self(a, b); }
}

/// Orders values by their [`Ord`] implementation.
#[derive(Clone, Copy, Debug, Default)]
pub struct NaturalOrder;

impl<T: Ord + ?Sized> Comparator<T> for NaturalOrder {
    fn compare(&self, a: &T, b: &T) -> Ordering { return a.cmp(b); }
}

/// Called once per node by [`Tree::traverse_in_order`]. Returning [`ControlFlow::Break`] stops
/// the traversal immediately and hands the break value to the caller.
pub trait Visitor<T, B> {
    fn visit(&mut self, node: NodeId<T>, data: &T) -> ControlFlow<B>;
}

impl<T, B, F: FnMut(NodeId<T>, &T) -> ControlFlow<B>> Visitor<T, B> for F {
    fn visit(&mut self, node: NodeId<T>, data: &T) -> ControlFlow<B> { return self(node, data); }
}

// -- Tree ---------------------------------------------------------------------------------------

pub type NodeId<T> = Handle<TreeNode<T>>;

pub struct TreeNode<T> {
    data: T,
    left: Option<NodeId<T>>,
    right: Option<NodeId<T>>,
    /// Next node whose data compared equal to this position's data, in insertion order.
    tie: Option<NodeId<T>>,
    /// Only maintained on the node that owns the tree position.
    last_tie: Option<NodeId<T>>,
    linked: bool
}

/// An unbalanced binary search tree ordered by a caller-supplied [`Comparator`].
///
/// For every position in the tree, all data in the left subtree compares less and all data in
/// the right subtree compares greater. A value that compares equal to an existing position
/// does not open a new position; it is chained behind that position's node in insertion order,
/// so ties are never lost and in-order traversal is stable.
///
/// # Runtime Complexity
/// Insertion and lookup are `O(log n)` on average but `O(n)` for sorted or reverse-sorted
/// insertion order, since no rebalancing is performed.
///
/// # Implementation
/// Nodes live in an [`Arena`] and refer to their children through [`NodeId`]s. Every walk
/// uses a loop or an explicit stack, so degenerate trees cannot exhaust the call stack.
/// There is no per-node removal; all nodes are released together with the tree.
pub struct Tree<T> {
    nodes: Arena<TreeNode<T>>,
    root: Option<NodeId<T>>,
    len: usize
}

impl<T> Default for Tree<T> {
    fn default() -> Self { return Self { nodes: Arena::new(), root: None, len: 0 }; }
}

impl<T> Tree<T> {
    pub fn new() -> Self { return Self::default(); }

    pub fn with_capacity(capacity: usize) -> Result<Self> {
        return Ok(Self { nodes: Arena::with_capacity(capacity)?, root: None, len: 0 });
    }

    /// Allocates a detached node holding `data`. The node takes no part in the tree's order
    /// until it is passed to [`Tree::insert`].
    pub fn create(&mut self, data: T) -> Result<NodeId<T>> {
        let node = TreeNode { data, left: None, right: None, tie: None, last_tie: None,
            linked: false };
        return self.nodes.alloc(node);
    }

    /// Links the detached `node` into the tree and returns the root.
    ///
    /// Panics if `node` was already inserted.
    pub fn insert(&mut self, node: NodeId<T>, cmp: &impl Comparator<T>) -> NodeId<T> {
        assert!(!self.nodes.get(node).linked, "tree node inserted twice");
        self.nodes.get_mut(node).linked = true;
        self.len += 1;

        let Some(root) = self.root else {
            self.root = Some(node);
            return node;
        };

        let mut cur = root;
        loop {
            let ordering = cmp.compare(&self.nodes.get(node).data, &self.nodes.get(cur).data);
            let child = match ordering {
                Ordering::Less => self.nodes.get(cur).left,
                Ordering::Greater => self.nodes.get(cur).right,
                Ordering::Equal => {
                    self.push_tie(cur, node);
                    return root;
                }
            };
            match child {
                Some(next) => cur = next,
                None => {
                    let parent = self.nodes.get_mut(cur);
                    if ordering == Ordering::Less {
                        parent.left = Some(node);
                    } else {
                        parent.right = Some(node);
                    }
                    return root;
                }
            }
        }
    }

    /// Allocates a node for `data` and inserts it. Returns the new node.
    pub fn insert_value(&mut self, data: T, cmp: &impl Comparator<T>) -> Result<NodeId<T>> {
        let node = self.create(data)?;
        self.insert(node, cmp);
        return Ok(node);
    }

    fn push_tie(&mut self, position: NodeId<T>, node: NodeId<T>) {
        match self.nodes.get(position).last_tie {
            Some(last) => self.nodes.get_mut(last).tie = Some(node),
            None => self.nodes.get_mut(position).tie = Some(node),
        }
        self.nodes.get_mut(position).last_tie = Some(node);
    }

    /// Finds the node whose data compares equal to `key`. When several nodes share that
    /// position, the first one inserted is returned.
    pub fn lookup(&self, key: &T, cmp: &impl Comparator<T>) -> Option<NodeId<T>> {
        let mut cur = self.root;
        while let Some(node) = cur {
            cur = match cmp.compare(key, &self.nodes.get(node).data) {
                Ordering::Less => self.nodes.get(node).left,
                Ordering::Greater => self.nodes.get(node).right,
                Ordering::Equal => return Some(node),
            };
        }
        return None;
    }

    /// Visits every inserted node in ascending order: left subtree, the position's nodes, then
    /// the right subtree. Stops at the first [`ControlFlow::Break`] and returns it.
    pub fn traverse_in_order<B>(&self, visitor: &mut impl Visitor<T, B>) -> ControlFlow<B> {
        let mut stack: Vec<NodeId<T>> = Vec::new();
        let mut cur = self.root;
        loop {
            while let Some(node) = cur {
                stack.push(node);
                cur = self.nodes.get(node).left;
            }
            let Some(position) = stack.pop() else { return ControlFlow::Continue(()); };
            let mut tie = Some(position);
            while let Some(node) = tie {
                let tree_node = self.nodes.get(node);
                visitor.visit(node, &tree_node.data)?;
                tie = tree_node.tie;
            }
            cur = self.nodes.get(position).right;
        }
    }

    pub fn get(&self, node: NodeId<T>) -> &T { return &self.nodes.get(node).data; }

    /// Replaces the data held by `node` and returns the previous data. The new data must
    /// compare the same as the old, otherwise the ordering invariant is broken.
    pub fn set_data(&mut self, node: NodeId<T>, data: T) -> T {
        return std::mem::replace(&mut self.nodes.get_mut(node).data, data);
    }

    pub fn root(&self) -> Option<NodeId<T>> { return self.root; }

    /// Number of inserted nodes. Detached nodes are not counted.
    pub fn len(&self) -> usize { return self.len; }

    pub fn is_empty(&self) -> bool { return self.len == 0; }

    /// Consumes the tree and returns the data of every inserted node in ascending order.
    /// Detached nodes are dropped.
    pub fn into_in_order(self) -> Vec<T> {
        let mut order: Vec<NodeId<T>> = Vec::with_capacity(self.len);
        let _ = self.traverse_in_order(&mut |node: NodeId<T>, _: &T| {
            order.push(node);
            return ControlFlow::<()>::Continue(());
        });
        let mut slots: Vec<Option<T>> = self.nodes.into_values().into_iter()
            .map(|node| Some(node.data))
            .collect();
        return order.into_iter()
            .filter_map(|node| slots[node.index()].take())
            .collect();
    }
}

#[cfg(test)]
mod test_tree {
    use std::cmp::Ordering;
    use std::ops::ControlFlow;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use super::{NaturalOrder, NodeId, Tree};

    fn in_order<T: Clone>(tree: &Tree<T>) -> Vec<T> {
        let mut out = Vec::new();
        let _ = tree.traverse_in_order(&mut |_: NodeId<T>, data: &T| {
            out.push(data.clone());
            return ControlFlow::<()>::Continue(());
        });
        return out;
    }

    #[test]
    fn test_in_order_traversal_is_sorted() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut tree: Tree<i64> = Tree::new();
        let mut expected: Vec<i64> = Vec::new();
        for _ in 0..500 {
            let value = rng.gen_range(-1000..1000);
            tree.insert_value(value, &NaturalOrder).unwrap();
            expected.push(value);
        }
        expected.sort();
        assert_eq!(in_order(&tree), expected);
        assert_eq!(tree.len(), 500);
    }

    #[test]
    fn test_caller_supplied_order() {
        let by_len_desc = |a: &&str, b: &&str| b.len().cmp(&a.len());
        let mut tree: Tree<&str> = Tree::new();
        for word in ["a", "abc", "ab", "abcd"] {
            tree.insert_value(word, &by_len_desc).unwrap();
        }
        assert_eq!(in_order(&tree), vec!["abcd", "abc", "ab", "a"]);
    }

    #[test]
    fn test_create_then_insert_returns_root() {
        let mut tree: Tree<u8> = Tree::new();
        let first = tree.create(5).unwrap();
        let second = tree.create(3).unwrap();
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.insert(first, &NaturalOrder), first);
        assert_eq!(tree.insert(second, &NaturalOrder), first);
        assert_eq!(tree.root(), Some(first));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    #[should_panic]
    fn test_double_insert_panics() {
        let mut tree: Tree<u8> = Tree::new();
        let node = tree.insert_value(1, &NaturalOrder).unwrap();
        tree.insert(node, &NaturalOrder);
    }

    #[test]
    fn test_lookup() {
        let mut tree: Tree<u32> = Tree::new();
        assert_eq!(tree.lookup(&1, &NaturalOrder), None);
        let mut nodes = Vec::new();
        for value in [50, 20, 80, 10, 30] {
            nodes.push(tree.insert_value(value, &NaturalOrder).unwrap());
        }
        assert_eq!(tree.lookup(&30, &NaturalOrder), Some(nodes[4]));
        assert_eq!(tree.lookup(&50, &NaturalOrder), Some(nodes[0]));
        assert_eq!(tree.lookup(&31, &NaturalOrder), None);
    }

    #[test]
    fn test_ties_share_a_position_in_insertion_order() {
        let by_key = |a: &(u8, char), b: &(u8, char)| a.0.cmp(&b.0);
        let mut tree: Tree<(u8, char)> = Tree::new();
        let first = tree.insert_value((3, 'a'), &by_key).unwrap();
        tree.insert_value((1, 'b'), &by_key).unwrap();
        tree.insert_value((3, 'c'), &by_key).unwrap();
        tree.insert_value((3, 'd'), &by_key).unwrap();
        assert_eq!(tree.lookup(&(3, 'z'), &by_key), Some(first));
        assert_eq!(in_order(&tree), vec![(1, 'b'), (3, 'a'), (3, 'c'), (3, 'd')]);
    }

    #[test]
    fn test_traversal_stops_on_break() {
        let mut tree: Tree<u32> = Tree::new();
        for value in [4, 2, 6, 1, 3, 5, 7] {
            tree.insert_value(value, &NaturalOrder).unwrap();
        }
        let mut visited = Vec::new();
        let result = tree.traverse_in_order(&mut |_: NodeId<u32>, data: &u32| {
            visited.push(*data);
            if *data == 3 { return ControlFlow::Break(*data * 10); }
            return ControlFlow::Continue(());
        });
        assert_eq!(result, ControlFlow::Break(30));
        assert_eq!(visited, vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_traversal_continues() {
        let tree: Tree<u32> = Tree::new();
        let result = tree.traverse_in_order(&mut |_: NodeId<u32>, _: &u32| ControlFlow::Break(()));
        assert_eq!(result, ControlFlow::Continue(()));
    }

    #[test]
    fn test_degenerate_tree_does_not_overflow_stack() {
        let mut tree: Tree<u32> = Tree::new();
        for value in 0..10_000 {
            tree.insert_value(value, &NaturalOrder).unwrap();
        }
        let values = tree.into_in_order();
        assert_eq!(values.len(), 10_000);
        assert!(values.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_set_data_returns_previous() {
        let mut tree: Tree<(u8, &str)> = Tree::new();
        let by_key = |a: &(u8, &str), b: &(u8, &str)| a.0.cmp(&b.0);
        let node = tree.insert_value((1, "old"), &by_key).unwrap();
        assert_eq!(tree.set_data(node, (1, "new")), (1, "old"));
        assert_eq!(*tree.get(node), (1, "new"));
    }

    #[test]
    fn test_into_in_order_drops_detached_nodes() {
        let mut tree: Tree<String> = Tree::new();
        tree.insert_value("b".to_string(), &NaturalOrder).unwrap();
        tree.create("detached".to_string()).unwrap();
        tree.insert_value("a".to_string(), &NaturalOrder).unwrap();
        assert_eq!(tree.into_in_order(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_reverse_comparator() {
        let reverse = |a: &i32, b: &i32| -> Ordering { b.cmp(a) };
        let mut tree: Tree<i32> = Tree::new();
        for value in [2, 9, -4, 0] {
            tree.insert_value(value, &reverse).unwrap();
        }
        assert_eq!(tree.into_in_order(), vec![9, 2, 0, -4]);
    }
}
