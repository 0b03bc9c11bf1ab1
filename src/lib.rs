//! # huffcode
//!
//! Huffman coding for text, with a compact preorder text format for the tree.
//!
//! ## Quick Start
//!
//! ```rust
//! use huffcode::{compress, decompress, tree_codec};
//!
//! let compressed = compress("AABB")?;
//! assert_eq!(compressed.bit_string(), "0011");
//!
//! // Hand the tree over in its text form, then decode.
//! let tree_text = compressed.serialized_tree();
//! let tree = tree_codec::deserialize(&tree_text)?;
//! assert_eq!(decompress("0011", &tree)?, "AABB");
//! # Ok::<(), huffcode::HuffmanError>(())
//! ```

pub mod bits;
pub mod codec;
pub mod compressed_data;
pub mod error;
pub mod frequency;
pub mod hufftree;
pub mod storage;
pub mod tree_codec;

// Internal modules - not part of public API
mod min_heap;

// Re-export main types for convenience
pub use bits::BitSequence;
pub use codec::{compress, decompress, Compressed, HuffmanCodec};
pub use compressed_data::CompressedData;
pub use error::{HuffmanError, Result, TreeFormatError};
pub use frequency::FrequencyTable;
pub use hufftree::{CodeTable, HuffNode, HuffmanTree};
pub use min_heap::HeapErr;
pub use storage::{compress_to, decompress_from, FileStorage, MemoryStorage, Storage};
