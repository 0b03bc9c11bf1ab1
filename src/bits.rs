use std::fmt;
use std::str::FromStr;

use bitvec::prelude::*;

use crate::error::{HuffmanError, Result};

/// Logical sequence of bits. Text form is one `'0'`/`'1'` per bit; packed form
/// stores 8 bits per byte, most significant bit first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitSequence {
    bits: BitVec<u8, Msb0>,
}

impl BitSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bit_count(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn push_bit(&mut self, bit: bool) {
        self.bits.push(bit);
    }

    /// Appends a code from a code table. Codes only hold `'0'` and `'1'`.
    pub fn push_code(&mut self, code: &str) {
        self.bits.extend(code.bytes().map(|b| b == b'1'));
    }

    /// Parses text made of `'0'` and `'1'`. Positions in errors are char
    /// offsets into `text`.
    pub fn parse(text: &str) -> Result<Self> {
        let mut bits = BitVec::with_capacity(text.len());
        for (position, c) in text.chars().enumerate() {
            match c {
                '0' => bits.push(false),
                '1' => bits.push(true),
                found => return Err(HuffmanError::InvalidBit { position, found }),
            }
        }
        Ok(BitSequence { bits })
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.bits.iter().by_vals()
    }

    /// Packed bytes; the unused tail of the last byte is zero.
    pub fn to_packed(&self) -> Vec<u8> {
        let mut bits = self.bits.clone();
        bits.set_uninitialized(false);
        bits.into_vec()
    }

    pub fn from_packed(bytes: &[u8], bit_count: usize) -> Result<Self> {
        let available = bytes.len().saturating_mul(8);
        if bit_count > available {
            return Err(HuffmanError::CorruptContainer {
                reason: format!("{} bits declared but only {} stored", bit_count, available),
            });
        }
        let mut bits = BitVec::<u8, Msb0>::from_slice(bytes);
        bits.truncate(bit_count);
        Ok(BitSequence { bits })
    }
}

impl fmt::Display for BitSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl FromStr for BitSequence {
    type Err = HuffmanError;

    fn from_str(s: &str) -> Result<Self> {
        BitSequence::parse(s)
    }
}
