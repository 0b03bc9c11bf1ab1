//! Text form of a [`HuffmanTree`].
//!
//! The tree is written in preorder. A leaf is `'1'` followed by its symbol;
//! an internal node is a lone `'0'` followed by its left and then its right
//! subtree. There are no delimiters: the full-binary shape tells the parser
//! where each subtree ends.

use std::collections::HashSet;

use crate::error::{HuffmanError, Result, TreeFormatError};
use crate::hufftree::{HuffNode, HuffmanTree, PreorderBuilder};

pub const LEAF_MARKER: char = '1';
pub const INTERNAL_MARKER: char = '0';

pub fn serialize(tree: &HuffmanTree) -> String {
    let mut out = String::new();
    for node in tree.root.preorder() {
        match node {
            HuffNode::Leaf { symbol, .. } => {
                out.push(LEAF_MARKER);
                out.push(*symbol);
            }
            HuffNode::Internal { .. } => out.push(INTERNAL_MARKER),
        }
    }
    out
}

/// Rebuilds a tree from its text form. Weights are not stored, so every node
/// of the result has weight zero.
///
/// Offsets in errors count chars, not bytes. Parsing keeps an explicit stack
/// of open internal nodes, so tree depth is bounded only by the input length.
pub fn deserialize(data: &str) -> Result<HuffmanTree> {
    let mut builder = PreorderBuilder::default();
    let mut seen = HashSet::new();
    let mut chars = data.chars();
    let mut offset = 0;

    let root = loop {
        let marker = chars
            .next()
            .ok_or_else(|| malformed(offset, TreeFormatError::UnexpectedEnd))?;
        match marker {
            LEAF_MARKER => {
                let symbol = chars
                    .next()
                    .ok_or_else(|| malformed(offset + 1, TreeFormatError::UnexpectedEnd))?;
                if !seen.insert(symbol) {
                    return Err(malformed(offset + 1, TreeFormatError::DuplicateSymbol(symbol)));
                }
                offset += 2;
                if let Some(root) = builder.push_leaf(HuffNode::new(symbol, 0)) {
                    break root;
                }
            }
            INTERNAL_MARKER => {
                offset += 1;
                builder.open_internal(0);
            }
            other => return Err(malformed(offset, TreeFormatError::UnknownMarker(other))),
        }
    };

    if chars.next().is_some() {
        return Err(malformed(offset, TreeFormatError::TrailingInput));
    }
    Ok(HuffmanTree::new(root))
}

fn malformed(offset: usize, reason: TreeFormatError) -> HuffmanError {
    HuffmanError::MalformedTree { offset, reason }
}

#[cfg(test)]
mod test {
    use super::*;

    fn leaf(symbol: char) -> HuffNode {
        HuffNode::new(symbol, 0)
    }

    fn reason(data: &str) -> (usize, TreeFormatError) {
        match deserialize(data) {
            Err(HuffmanError::MalformedTree { offset, reason }) => (offset, reason),
            other => panic!("expected malformed tree, got {:?}", other),
        }
    }

    #[test]
    fn three_leaf_tree() {
        let tree = HuffmanTree::new(HuffNode::merge(
            leaf('A'),
            HuffNode::merge(leaf('B'), leaf('C')),
        ));
        let text = serialize(&tree);
        assert_eq!(text, "01A01B1C");

        let parsed = deserialize(&text).unwrap();
        assert_eq!(parsed, tree);
        assert_eq!(parsed.code_table(), tree.code_table());
    }

    #[test]
    fn left_heavy_tree() {
        let tree = HuffmanTree::new(HuffNode::merge(
            HuffNode::merge(leaf('x'), leaf('y')),
            leaf('z'),
        ));
        assert_eq!(serialize(&tree), "001x1y1z");
        assert_eq!(deserialize("001x1y1z").unwrap(), tree);
    }

    #[test]
    fn sample_tree_text() {
        let tree = HuffmanTree::from_text("AABBCDCAASDBSAAABB").unwrap().unwrap();
        assert_eq!(serialize(&tree), "01A01B01S01C1D");
    }

    #[test]
    fn marker_characters_as_symbols() {
        let tree = HuffmanTree::new(HuffNode::merge(leaf('0'), leaf('1')));
        let text = serialize(&tree);
        assert_eq!(text, "01011");
        assert_eq!(deserialize(&text).unwrap(), tree);
    }

    #[test]
    fn single_leaf() {
        let tree = HuffmanTree::new(leaf('Q'));
        assert_eq!(serialize(&tree), "1Q");
        assert_eq!(deserialize("1Q").unwrap(), tree);
    }

    #[test]
    fn truncated_streams() {
        assert_eq!(reason(""), (0, TreeFormatError::UnexpectedEnd));
        assert_eq!(reason("1"), (1, TreeFormatError::UnexpectedEnd));
        assert_eq!(reason("01A"), (3, TreeFormatError::UnexpectedEnd));
        assert_eq!(reason("01A0"), (4, TreeFormatError::UnexpectedEnd));
    }

    #[test]
    fn unknown_marker() {
        assert_eq!(reason("01Ax"), (3, TreeFormatError::UnknownMarker('x')));
    }

    #[test]
    fn trailing_input() {
        assert_eq!(reason("1A1B"), (2, TreeFormatError::TrailingInput));
    }

    #[test]
    fn duplicate_symbol() {
        assert_eq!(reason("01A1A"), (4, TreeFormatError::DuplicateSymbol('A')));
    }

    #[test]
    fn deep_garbage_does_not_overflow() {
        let data = "0".repeat(100_000);
        assert_eq!(reason(&data), (100_000, TreeFormatError::UnexpectedEnd));
    }

    /// `"01a01b...1z"` over `leaves` distinct symbols.
    fn spine_text(leaves: u32) -> String {
        let mut text = String::new();
        for i in 0..leaves - 1 {
            text.push(INTERNAL_MARKER);
            text.push(LEAF_MARKER);
            text.push(char::from_u32(0x10000 + i).unwrap());
        }
        text.push(LEAF_MARKER);
        text.push(char::from_u32(0x10000 + leaves - 1).unwrap());
        text
    }

    #[test]
    fn deep_spine_parses_and_drops() {
        let text = spine_text(300_000);
        let tree = deserialize(&text).unwrap();
        assert_eq!(tree.depth(), 299_999);
        assert_eq!(tree.symbol_count(), 300_000);
        assert_eq!(serialize(&tree), text);
        drop(tree);
    }
}
