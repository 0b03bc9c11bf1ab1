use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::mem;

use log::{debug, log_enabled, trace, Level};

use crate::error::Result;
use crate::frequency::FrequencyTable;
use crate::min_heap::MinHeap;

/// Tie-break character for internal nodes of equal weight. Leaves use their
/// own symbol, so internal nodes sort between `'#'` and `'%'` leaves.
pub const INTERNAL_TIE_KEY: char = '$';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    pub root: HuffNode,
}

impl HuffmanTree {
    pub fn new(root: HuffNode) -> Self {
        HuffmanTree { root }
    }

    /// Builds a tree straight from text. `None` for empty input.
    pub fn from_text(text: &str) -> Result<Option<Self>> {
        HuffmanTree::from_frequencies(&FrequencyTable::build(text))
    }

    /// Builds the Huffman tree for `table`, or `None` when the table is empty.
    ///
    /// Nodes are ordered by weight, then by tie-break character, then by the
    /// order they entered the heap. The first node popped becomes the left
    /// child of each merge.
    pub fn from_frequencies(table: &FrequencyTable) -> Result<Option<Self>> {
        if table.is_empty() {
            return Ok(None);
        }
        let nodes: Vec<HeapEntry> = table
            .iter()
            .enumerate()
            .map(|(seq, (symbol, count))| HeapEntry::new(HuffNode::new(symbol, count), seq))
            .collect();
        let mut next_seq = nodes.len();

        let mut heap = MinHeap::build(nodes)?;
        while heap.heap_size() > 1 {
            let x = heap.extract_min()?;
            let y = heap.extract_min()?;
            trace!(
                "merging weight {} ({:?}) with weight {} ({:?})",
                x.weight,
                x.tie,
                y.weight,
                y.tie
            );
            heap.insert(HeapEntry::new(HuffNode::merge(x.node, y.node), next_seq));
            next_seq += 1;
        }
        let root = heap.extract_min()?.node;

        let tree = HuffmanTree { root };
        tree.log_structure();
        Ok(Some(tree))
    }

    /// Root-to-leaf codes, `'0'` for left and `'1'` for right. A tree that is
    /// a single leaf gives that symbol the empty code.
    pub fn code_table(&self) -> CodeTable {
        let mut table = CodeTable::default();
        let mut stack = vec![(&self.root, String::new())];
        while let Some((node, path)) = stack.pop() {
            match node {
                HuffNode::Leaf { symbol, .. } => {
                    debug!("{:?} {}", symbol, path);
                    table.insert(*symbol, path);
                }
                HuffNode::Internal { left, right, .. } => {
                    let mut right_path = path.clone();
                    right_path.push('1');
                    let mut left_path = path;
                    left_path.push('0');
                    stack.push((&**right, right_path));
                    stack.push((&**left, left_path));
                }
            }
        }
        table
    }

    pub fn weight(&self) -> usize {
        self.root.weight()
    }

    pub fn symbol_count(&self) -> usize {
        self.root
            .preorder()
            .filter(|node| matches!(node, HuffNode::Leaf { .. }))
            .count()
    }

    /// Length of the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(&self.root, 0)];
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            if let HuffNode::Internal { left, right, .. } = node {
                stack.push((&**right, depth + 1));
                stack.push((&**left, depth + 1));
            }
        }
        deepest
    }

    pub fn is_degenerate(&self) -> bool {
        matches!(self.root, HuffNode::Leaf { .. })
    }

    pub fn log_structure(&self) {
        if !log_enabled!(Level::Debug) {
            return;
        }
        debug!("Huffman tree structure:");
        let mut stack = vec![(&self.root, 0, "root")];
        while let Some((node, depth, label)) = stack.pop() {
            let indent = "  ".repeat(depth);
            match node {
                HuffNode::Leaf { symbol, weight } => {
                    debug!("{}{}-> Leaf: {:?} [weight: {}]", indent, label, symbol, weight);
                }
                HuffNode::Internal { weight, left, right } => {
                    debug!("{}{}-> Internal [weight: {}]", indent, label, weight);
                    stack.push((&**right, depth + 1, "R"));
                    stack.push((&**left, depth + 1, "L"));
                }
            }
        }
    }
}

/// Node of a full binary tree. Trees may be arbitrarily deep, so dropping,
/// cloning and comparing all walk the tree with an explicit stack.
pub enum HuffNode {
    Leaf {
        weight: usize,
        symbol: char,
    },
    Internal {
        weight: usize,
        left: Box<HuffNode>,
        right: Box<HuffNode>,
    },
}

impl HuffNode {
    pub fn new(symbol: char, weight: usize) -> Self {
        HuffNode::Leaf { weight, symbol }
    }

    pub fn weight(&self) -> usize {
        match self {
            HuffNode::Leaf { weight, .. } => *weight,
            HuffNode::Internal { weight, .. } => *weight,
        }
    }

    pub fn merge(left: Self, right: Self) -> Self {
        let weight = left.weight().saturating_add(right.weight());
        HuffNode::Internal {
            weight,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Nodes in preorder: each internal node, then its left subtree, then its
    /// right subtree.
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder { stack: vec![self] }
    }

    fn tie_key(&self) -> char {
        match self {
            HuffNode::Leaf { symbol, .. } => *symbol,
            HuffNode::Internal { .. } => INTERNAL_TIE_KEY,
        }
    }

    /// Moves internal children onto `stack`, leaving empty leaves behind.
    fn detach_children(&mut self, stack: &mut Vec<HuffNode>) {
        if let HuffNode::Internal { left, right, .. } = self {
            for child in [left, right] {
                if let HuffNode::Internal { .. } = **child {
                    stack.push(mem::replace(&mut **child, HuffNode::new('\0', 0)));
                }
            }
        }
    }
}

impl Drop for HuffNode {
    fn drop(&mut self) {
        let mut stack = Vec::new();
        self.detach_children(&mut stack);
        while let Some(mut node) = stack.pop() {
            node.detach_children(&mut stack);
        }
    }
}

impl Clone for HuffNode {
    fn clone(&self) -> Self {
        let mut builder = PreorderBuilder::default();
        for node in self.preorder() {
            match node {
                HuffNode::Internal { weight, .. } => builder.open_internal(*weight),
                HuffNode::Leaf { weight, symbol } => {
                    if let Some(root) = builder.push_leaf(HuffNode::new(*symbol, *weight)) {
                        return root;
                    }
                }
            }
        }
        unreachable!("preorder of a full binary tree ends on the leaf that completes it")
    }
}

impl PartialEq for HuffNode {
    fn eq(&self, other: &Self) -> bool {
        // Preorder with variant tags fixes the shape of a full binary tree,
        // so comparing nodes pairwise compares whole trees.
        let mut ours = self.preorder();
        let mut theirs = other.preorder();
        loop {
            match (ours.next(), theirs.next()) {
                (None, None) => return true,
                (
                    Some(HuffNode::Leaf { weight: w1, symbol: a }),
                    Some(HuffNode::Leaf { weight: w2, symbol: b }),
                ) if w1 == w2 && a == b => {}
                (
                    Some(HuffNode::Internal { weight: w1, .. }),
                    Some(HuffNode::Internal { weight: w2, .. }),
                ) if w1 == w2 => {}
                _ => return false,
            }
        }
    }
}

impl Eq for HuffNode {}

impl fmt::Debug for HuffNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HuffNode::Leaf { weight, symbol } => f
                .debug_struct("Leaf")
                .field("weight", weight)
                .field("symbol", symbol)
                .finish(),
            HuffNode::Internal { weight, .. } => {
                let leaves = self
                    .preorder()
                    .filter(|node| matches!(node, HuffNode::Leaf { .. }))
                    .count();
                f.debug_struct("Internal")
                    .field("weight", weight)
                    .field("leaves", &leaves)
                    .finish()
            }
        }
    }
}

pub struct Preorder<'a> {
    stack: Vec<&'a HuffNode>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a HuffNode;

    fn next(&mut self) -> Option<&'a HuffNode> {
        let node = self.stack.pop()?;
        if let HuffNode::Internal { left, right, .. } = node {
            self.stack.push(&**right);
            self.stack.push(&**left);
        }
        Some(node)
    }
}

/// Rebuilds a tree from its nodes in preorder.
#[derive(Default)]
pub(crate) struct PreorderBuilder {
    // Open internal nodes: (weight, left subtree once it is complete).
    pending: Vec<(usize, Option<HuffNode>)>,
}

impl PreorderBuilder {
    pub(crate) fn open_internal(&mut self, weight: usize) {
        self.pending.push((weight, None));
    }

    /// Adds a leaf and closes every internal node it completes. Returns the
    /// root once the whole tree is complete.
    pub(crate) fn push_leaf(&mut self, leaf: HuffNode) -> Option<HuffNode> {
        let mut node = leaf;
        loop {
            match self.pending.pop() {
                None => return Some(node),
                Some((weight, None)) => {
                    self.pending.push((weight, Some(node)));
                    return None;
                }
                Some((weight, Some(left))) => {
                    node = HuffNode::Internal {
                        weight,
                        left: Box::new(left),
                        right: Box::new(node),
                    }
                }
            }
        }
    }
}

/// A node waiting in the build heap, keyed by (weight, tie-break, sequence).
/// The sequence number is unique per entry, so no two entries compare equal.
#[derive(Debug)]
struct HeapEntry {
    weight: usize,
    tie: char,
    seq: usize,
    node: HuffNode,
}

impl HeapEntry {
    fn new(node: HuffNode, seq: usize) -> Self {
        HeapEntry {
            weight: node.weight(),
            tie: node.tie_key(),
            seq,
            node,
        }
    }

    fn key(&self) -> (usize, char, usize) {
        (self.weight, self.tie, self.seq)
    }
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Symbol to code mapping, ordered by symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeTable {
    codes: BTreeMap<char, String>,
}

impl CodeTable {
    pub fn get(&self, symbol: char) -> Option<&str> {
        self.codes.get(&symbol).map(String::as_str)
    }

    pub fn insert(&mut self, symbol: char, code: String) {
        self.codes.insert(symbol, code);
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, &str)> + '_ {
        self.codes.iter().map(|(&symbol, code)| (symbol, code.as_str()))
    }

    /// True when no code is a prefix of another.
    pub fn is_prefix_free(&self) -> bool {
        let codes: Vec<&str> = self.codes.values().map(String::as_str).collect();
        codes.iter().enumerate().all(|(i, a)| {
            codes
                .iter()
                .enumerate()
                .all(|(j, b)| i == j || !b.starts_with(a))
        })
    }
}

impl fmt::Display for CodeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (symbol, code) in self.iter() {
            writeln!(f, "{:?} {}", symbol, code)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn tree(text: &str) -> HuffmanTree {
        HuffmanTree::from_text(text).unwrap().unwrap()
    }

    #[test]
    fn equal_weights_break_ties_by_symbol() {
        let t = tree("BBAA");
        let codes = t.code_table();
        assert_eq!(codes.get('A'), Some("0"));
        assert_eq!(codes.get('B'), Some("1"));
        assert_eq!(t.weight(), 4);
    }

    #[test]
    fn sample_text_codes() {
        // A:7 B:5 C:2 D:2 S:2
        let codes = tree("AABBCDCAASDBSAAABB").code_table();
        assert_eq!(codes.get('A'), Some("0"));
        assert_eq!(codes.get('B'), Some("10"));
        assert_eq!(codes.get('S'), Some("110"));
        assert_eq!(codes.get('C'), Some("1110"));
        assert_eq!(codes.get('D'), Some("1111"));
        assert!(codes.is_prefix_free());
    }

    #[test]
    fn internal_nodes_tie_as_dollar() {
        // a+b merge into a weight 2 node that ties with 'c' and 'd'. It sorts
        // as '$', ahead of both, so it is merged with 'c' before 'd' is touched.
        let t = tree("abccdd");
        match &t.root {
            HuffNode::Internal { left, right, .. } => {
                assert_eq!(**left, HuffNode::new('d', 2));
                assert!(matches!(**right, HuffNode::Internal { .. }));
            }
            HuffNode::Leaf { .. } => panic!("expected internal root"),
        }
        let codes = t.code_table();
        assert_eq!(codes.get('d'), Some("0"));
        assert_eq!(codes.get('a'), Some("100"));
        assert_eq!(codes.get('b'), Some("101"));
        assert_eq!(codes.get('c'), Some("11"));
    }

    #[test]
    fn equal_keys_are_not_lost() {
        // '$' is a real symbol here and ties with internal nodes of weight 2.
        let t = tree("$$ab");
        assert_eq!(t.symbol_count(), 3);
        assert_eq!(t.code_table().len(), 3);
        assert!(t.code_table().is_prefix_free());
    }

    #[test]
    fn single_symbol_gets_empty_code() {
        let t = tree("AAAA");
        assert!(t.is_degenerate());
        assert_eq!(t.depth(), 0);
        assert_eq!(t.code_table().get('A'), Some(""));
    }

    #[test]
    fn empty_table_has_no_tree() {
        assert!(HuffmanTree::from_text("").unwrap().is_none());
    }

    #[test]
    fn build_is_deterministic() {
        let table = FrequencyTable::build("the quick brown fox jumps over the lazy dog");
        let a = HuffmanTree::from_frequencies(&table).unwrap().unwrap();
        let b = HuffmanTree::from_frequencies(&table).unwrap().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.code_table(), b.code_table());
    }

    #[test]
    fn every_symbol_gets_one_code() {
        let text = "mississippi river";
        let table = FrequencyTable::build(text);
        let codes = tree(text).code_table();
        assert_eq!(codes.len(), table.len());
        for (symbol, _) in table.iter() {
            assert!(codes.get(symbol).is_some());
        }
    }

    fn spine(leaves: u32) -> HuffNode {
        // Right-leaning chain over distinct symbols, built bottom-up.
        let mut node = HuffNode::new(char::from_u32(0x10000 + leaves).unwrap(), 1);
        for i in (0..leaves).rev() {
            node = HuffNode::merge(HuffNode::new(char::from_u32(0x10000 + i).unwrap(), 1), node);
        }
        node
    }

    #[test]
    fn deep_tree_walks_without_recursion() {
        let t = HuffmanTree::new(spine(300_000));
        assert_eq!(t.depth(), 300_000);
        assert_eq!(t.symbol_count(), 300_001);
        assert_eq!(t.weight(), 300_001);
        let copy = t.clone();
        assert_eq!(copy, t);
        t.log_structure();
        drop(t);
        drop(copy);
    }

    #[test]
    fn clone_and_eq_see_weights_and_shape() {
        let t = tree("AABBCDCAASDBSAAABB");
        assert_eq!(t.clone(), t);

        let mirrored = HuffmanTree::new(HuffNode::merge(HuffNode::new('b', 1), HuffNode::new('a', 1)));
        let straight = HuffmanTree::new(HuffNode::merge(HuffNode::new('a', 1), HuffNode::new('b', 1)));
        assert_ne!(mirrored, straight);
        assert_ne!(HuffNode::new('a', 1), HuffNode::new('a', 2));
    }
}
