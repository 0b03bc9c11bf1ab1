use std::io::{self, Cursor, Read, Write};

use crate::bits::BitSequence;
use crate::codec::{self, Compressed};
use crate::error::{HuffmanError, Result};
use crate::tree_codec;

/// Self-contained binary form of a [`Compressed`] result: the serialized tree
/// plus the bits packed eight to a byte.
///
/// Layout, integers as little-endian `u64`: original length in chars, bit
/// count, tree length in bytes, tree text (UTF-8), packed length in bytes,
/// packed bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedData {
    pub compressed_bits: Vec<u8>,
    pub bit_count: usize,
    pub tree_data: String,
    pub original_length: usize,
}

impl CompressedData {
    pub fn from_compressed(compressed: &Compressed, original_length: usize) -> Self {
        CompressedData {
            compressed_bits: compressed.bits.to_packed(),
            bit_count: compressed.bits.bit_count(),
            tree_data: compressed.serialized_tree(),
            original_length,
        }
    }

    pub fn compress(input: &str) -> Result<Self> {
        let compressed = codec::compress(input)?;
        Ok(Self::from_compressed(&compressed, input.chars().count()))
    }

    pub fn serialize(&self) -> io::Result<Vec<u8>> {
        let mut bytes = Vec::new();

        write_len(&mut bytes, self.original_length)?;
        write_len(&mut bytes, self.bit_count)?;

        write_len(&mut bytes, self.tree_data.len())?;
        bytes.write_all(self.tree_data.as_bytes())?;

        write_len(&mut bytes, self.compressed_bits.len())?;
        bytes.write_all(&self.compressed_bits)?;

        Ok(bytes)
    }

    pub fn deserialize(data: &[u8]) -> Result<CompressedData> {
        let mut cursor = Cursor::new(data);

        let original_length = read_len(&mut cursor)?;
        let bit_count = read_len(&mut cursor)?;

        let tree_bytes = read_block(&mut cursor)?;
        let tree_data = String::from_utf8(tree_bytes).map_err(|_| corrupt("tree is not UTF-8"))?;

        let compressed_bits = read_block(&mut cursor)?;

        if cursor.position() != data.len() as u64 {
            return Err(corrupt("trailing bytes after packed bits"));
        }

        Ok(CompressedData {
            compressed_bits,
            bit_count,
            tree_data,
            original_length,
        })
    }

    /// Unpacks the bits and the tree back into a [`Compressed`] value.
    pub fn to_compressed(&self) -> Result<Compressed> {
        let bits = BitSequence::from_packed(&self.compressed_bits, self.bit_count)?;
        if (self.bit_count + 7) / 8 != self.compressed_bits.len() {
            return Err(corrupt("packed length does not match bit count"));
        }
        let tree = if self.tree_data.is_empty() {
            None
        } else {
            Some(tree_codec::deserialize(&self.tree_data)?)
        };
        Ok(Compressed { bits, tree })
    }

    pub fn decode(&self) -> Result<String> {
        let text = self.to_compressed()?.decompress()?;
        let decoded_length = text.chars().count();
        if decoded_length != self.original_length {
            return Err(corrupt(&format!(
                "expected {} chars, got {}",
                self.original_length, decoded_length
            )));
        }
        Ok(text)
    }
}

fn corrupt(reason: &str) -> HuffmanError {
    HuffmanError::CorruptContainer {
        reason: reason.to_string(),
    }
}

fn write_len<W: Write>(writer: &mut W, len: usize) -> io::Result<()> {
    writer.write_all(&(len as u64).to_le_bytes())
}

fn read_len<R: Read>(reader: &mut R) -> Result<usize> {
    let mut len_bytes = [0u8; 8];
    reader
        .read_exact(&mut len_bytes)
        .map_err(|_| corrupt("header cut short"))?;
    usize::try_from(u64::from_le_bytes(len_bytes)).map_err(|_| corrupt("length out of range"))
}

fn read_block(cursor: &mut Cursor<&[u8]>) -> Result<Vec<u8>> {
    let len = read_len(cursor)?;
    let remaining = cursor.get_ref().len() as u64 - cursor.position();
    if len as u64 > remaining {
        return Err(corrupt("block longer than remaining data"));
    }
    let mut block = vec![0u8; len];
    cursor
        .read_exact(&mut block)
        .map_err(|_| corrupt("block cut short"))?;
    Ok(block)
}

#[cfg(test)]
mod test {
    use super::*;

    const SAMPLE: &str = "AABBCDCAASDBSAAABB";

    #[test]
    fn roundtrip_through_bytes() {
        let data = CompressedData::compress(SAMPLE).unwrap();
        assert_eq!(data.bit_count, 39);
        assert_eq!(data.compressed_bits.len(), 5);
        assert_eq!(data.tree_data, "01A01B01S01C1D");

        let bytes = data.serialize().unwrap();
        assert_eq!(bytes.len(), 8 * 4 + 14 + 5);

        let parsed = CompressedData::deserialize(&bytes).unwrap();
        assert_eq!(parsed, data);
        assert_eq!(parsed.decode().unwrap(), SAMPLE);
    }

    #[test]
    fn packed_bits_match_text_bits() {
        let data = CompressedData::compress("AABB").unwrap();
        assert_eq!(data.compressed_bits, vec![0b0011_0000]);
        assert_eq!(data.bit_count, 4);
    }

    #[test]
    fn empty_input() {
        let data = CompressedData::compress("").unwrap();
        let parsed = CompressedData::deserialize(&data.serialize().unwrap()).unwrap();
        assert_eq!(parsed.decode().unwrap(), "");
    }

    #[test]
    fn truncated_container() {
        let bytes = CompressedData::compress(SAMPLE).unwrap().serialize().unwrap();
        for cut in [0, 7, 20, bytes.len() - 1] {
            assert!(matches!(
                CompressedData::deserialize(&bytes[..cut]),
                Err(HuffmanError::CorruptContainer { .. })
            ));
        }
    }

    #[test]
    fn wrong_original_length() {
        let mut data = CompressedData::compress(SAMPLE).unwrap();
        data.original_length += 1;
        assert!(matches!(
            data.decode(),
            Err(HuffmanError::CorruptContainer { .. })
        ));
    }

    #[test]
    fn bit_count_beyond_data() {
        let mut data = CompressedData::compress(SAMPLE).unwrap();
        data.bit_count = 41;
        assert!(data.decode().is_err());
    }
}
