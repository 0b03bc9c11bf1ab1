use log::debug;

use crate::bits::BitSequence;
use crate::error::{HuffmanError, Result};
use crate::hufftree::{CodeTable, HuffNode, HuffmanTree};
use crate::tree_codec;

/// Code given to the only symbol of a single-symbol alphabet, one bit per
/// occurrence. The tree itself has no edges to label, so its code table
/// reports the empty code instead.
pub const DEGENERATE_CODE: &str = "0";

/// Output of [`compress`]: the encoded bits and the tree needed to decode them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compressed {
    pub bits: BitSequence,
    /// `None` only for empty input.
    pub tree: Option<HuffmanTree>,
}

impl Compressed {
    pub fn bit_string(&self) -> String {
        self.bits.to_string()
    }

    /// Text form of the tree; empty when there is no tree.
    pub fn serialized_tree(&self) -> String {
        self.tree.as_ref().map(tree_codec::serialize).unwrap_or_default()
    }

    pub fn decompress(&self) -> Result<String> {
        decode_with(self.tree.as_ref(), &self.bits)
    }
}

pub struct HuffmanCodec {
    tree: HuffmanTree,
    encode_table: CodeTable,
}

impl HuffmanCodec {
    pub fn new(tree: HuffmanTree) -> Self {
        let mut encode_table = tree.code_table();
        if let HuffNode::Leaf { symbol, .. } = &tree.root {
            encode_table.insert(*symbol, DEGENERATE_CODE.to_string());
        }
        HuffmanCodec { tree, encode_table }
    }

    /// Codec for the alphabet of `text`, or `None` if `text` is empty.
    pub fn from_text(text: &str) -> Result<Option<Self>> {
        Ok(HuffmanTree::from_text(text)?.map(Self::new))
    }

    pub fn tree(&self) -> &HuffmanTree {
        &self.tree
    }

    pub fn into_tree(self) -> HuffmanTree {
        self.tree
    }

    /// Codes used when encoding. Same as the tree's code table except for a
    /// single-symbol tree, which encodes with [`DEGENERATE_CODE`].
    pub fn code_table(&self) -> &CodeTable {
        &self.encode_table
    }

    pub fn encode(&self, data: &str) -> Result<BitSequence> {
        let mut bits = BitSequence::new();
        let mut symbols = 0;
        for symbol in data.chars() {
            symbols += 1;
            let code = self
                .encode_table
                .get(symbol)
                .ok_or(HuffmanError::UnknownSymbol(symbol))?;
            bits.push_code(code);
        }
        debug!("encoded {} chars into {} bits", symbols, bits.bit_count());
        Ok(bits)
    }

    pub fn decode(&self, bits: &BitSequence) -> Result<String> {
        walk(&self.tree, bits)
    }
}

/// Builds the code for `input` and encodes it. Empty input gives no bits and
/// no tree.
pub fn compress(input: &str) -> Result<Compressed> {
    let codec = match HuffmanCodec::from_text(input)? {
        Some(codec) => codec,
        None => {
            return Ok(Compressed {
                bits: BitSequence::new(),
                tree: None,
            })
        }
    };
    let bits = codec.encode(input)?;
    Ok(Compressed {
        bits,
        tree: Some(codec.into_tree()),
    })
}

/// Decodes a `'0'`/`'1'` string with `tree`.
pub fn decompress(bits: &str, tree: &HuffmanTree) -> Result<String> {
    let bits = BitSequence::parse(bits)?;
    decode_with(Some(tree), &bits)
}

/// Walks the tree once per bit: `0` goes left, `1` goes right, and every leaf
/// reached emits its symbol and restarts at the root.
fn walk(tree: &HuffmanTree, bits: &BitSequence) -> Result<String> {
    let root = &tree.root;
    let mut result = String::new();

    if let HuffNode::Leaf { symbol, .. } = root {
        for (position, bit) in bits.iter().enumerate() {
            if bit {
                return Err(HuffmanError::UnknownCode { position });
            }
            result.push(*symbol);
        }
        return Ok(result);
    }

    let mut node = root;
    let mut code_start = 0;
    for (position, bit) in bits.iter().enumerate() {
        // `node` is internal here: a leaf root returned above, and every
        // leaf reached below resets it to the root.
        if let HuffNode::Internal { left, right, .. } = node {
            node = if bit { &**right } else { &**left };
        }
        if let HuffNode::Leaf { symbol, .. } = node {
            result.push(*symbol);
            node = root;
            code_start = position + 1;
        }
    }

    if code_start != bits.bit_count() {
        return Err(HuffmanError::TruncatedCode {
            position: code_start,
        });
    }
    Ok(result)
}

pub(crate) fn decode_with(tree: Option<&HuffmanTree>, bits: &BitSequence) -> Result<String> {
    match tree {
        Some(tree) => walk(tree, bits),
        None if bits.is_empty() => Ok(String::new()),
        None => Err(HuffmanError::MissingTree),
    }
}
