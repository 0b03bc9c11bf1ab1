//! Whole-text persistence for serialized trees, and the compress/decompress
//! entry points that hand the tree over through it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::bits::BitSequence;
use crate::codec::{self, Compressed};
use crate::error::Result;
use crate::tree_codec;

/// File name the tree is stored under when the caller does not pick one.
pub const DEFAULT_TREE_PATH: &str = "compressedTree.txt";

pub trait Storage {
    fn save(&self, path: &Path, content: &str) -> io::Result<()>;
    fn load(&self, path: &Path) -> io::Result<String>;
}

/// Reads and writes whole files on the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileStorage;

impl Storage for FileStorage {
    fn save(&self, path: &Path, content: &str) -> io::Result<()> {
        fs::write(path, content)
    }

    fn load(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }
}

/// In-process storage keyed by path.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: RefCell<HashMap<PathBuf, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path) -> Option<String> {
        self.files.borrow().get(path).cloned()
    }
}

impl Storage for MemoryStorage {
    fn save(&self, path: &Path, content: &str) -> io::Result<()> {
        self.files
            .borrow_mut()
            .insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn load(&self, path: &Path) -> io::Result<String> {
        self.get(path).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            )
        })
    }
}

/// Compresses `input` and saves its serialized tree to `tree_path`. Empty
/// input stores an empty tree.
pub fn compress_to<S: Storage + ?Sized>(
    storage: &S,
    tree_path: &Path,
    input: &str,
) -> Result<Compressed> {
    let compressed = codec::compress(input)?;
    storage.save(tree_path, &compressed.serialized_tree())?;
    info!(
        "compressed {} chars into {} bits, tree saved to {}",
        input.chars().count(),
        compressed.bits.bit_count(),
        tree_path.display()
    );
    Ok(compressed)
}

/// Loads the tree saved at `tree_path` and decodes `bits` with it.
pub fn decompress_from<S: Storage + ?Sized>(
    storage: &S,
    tree_path: &Path,
    bits: &str,
) -> Result<String> {
    let data = storage.load(tree_path)?;
    let bits = BitSequence::parse(bits)?;
    let tree = if data.is_empty() {
        None
    } else {
        Some(tree_codec::deserialize(&data)?)
    };
    debug!("loaded tree of {} chars from {}", data.chars().count(), tree_path.display());
    codec::decode_with(tree.as_ref(), &bits)
}
