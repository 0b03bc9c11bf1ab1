use std::io;

use thiserror::Error;

use crate::min_heap::HeapErr;

pub type Result<T> = std::result::Result<T, HuffmanError>;

#[derive(Error, Debug)]
pub enum HuffmanError {
    #[error("malformed tree at offset {offset}: {reason}")]
    MalformedTree { offset: usize, reason: TreeFormatError },

    #[error("symbol {0:?} is not in the code table")]
    UnknownSymbol(char),

    #[error("invalid bit {found:?} at position {position}")]
    InvalidBit { position: usize, found: char },

    #[error("bit sequence ends inside a code at position {position}")]
    TruncatedCode { position: usize },

    #[error("bit at position {position} does not lead to any symbol")]
    UnknownCode { position: usize },

    #[error("bit sequence is not empty but no tree was stored")]
    MissingTree,

    #[error("corrupt container: {reason}")]
    CorruptContainer { reason: String },

    #[error("heap error: {0}")]
    Heap(#[from] HeapErr),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Why a serialized tree could not be parsed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeFormatError {
    #[error("unexpected end of input")]
    UnexpectedEnd,

    #[error("unknown marker {0:?}")]
    UnknownMarker(char),

    #[error("trailing input after complete tree")]
    TrailingInput,

    #[error("symbol {0:?} appears twice")]
    DuplicateSymbol(char),
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn malformed_tree_message_includes_reason() {
        let err = HuffmanError::MalformedTree {
            offset: 4,
            reason: TreeFormatError::DuplicateSymbol('A'),
        };
        assert_eq!(err.to_string(), "malformed tree at offset 4: symbol 'A' appears twice");
        assert_eq!(
            TreeFormatError::UnknownMarker('x').to_string(),
            "unknown marker 'x'"
        );
        assert_eq!(
            TreeFormatError::UnexpectedEnd.to_string(),
            "unexpected end of input"
        );
    }
}
