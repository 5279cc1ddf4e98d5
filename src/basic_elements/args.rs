use alloy_primitives::{I256, U256};
use anyhow::{Context, Result, anyhow, bail};
use byteorder::{LittleEndian, ReadBytesExt};

use crate::types::ValueTag;

use super::next_arg::NextArg;

// 32 / 8 bits = 4 bytes
pub const BYTES_32_OFFSET: usize = 4;
// 64 / 8 bits = 8 bytes
pub const BYTES_64_OFFSET: usize = 8;
// 256 / 8 bits = 32 bytes
pub const BYTES_256_OFFSET: usize = 32;
pub const DEFAULT_OFFSET: usize = 0;

// Length prefixes are u32, so no variable-size value may exceed this.
const MAX_PREFIXED_LEN: usize = u32::MAX as usize;

/// Types with their own fixed layout inside an argument buffer.
pub trait Serializable: Sized {
    fn serialize(&self) -> Vec<u8>;

    /// Deserializes from `data` starting at `offset`.
    /// Returns the value and the offset just past it.
    fn deserialize(data: &[u8], offset: usize) -> Result<(Self, usize)>;
}

/// Positional argument buffer.
///
/// Values are appended with the `add_*` builders and read back in the same
/// order with the `next_*` readers. Every integer is little endian and every
/// variable-size value carries a u32 length prefix.
#[derive(Debug, Clone, Default)]
pub struct Args {
    serialized: Vec<u8>,
    offset: usize,
}

impl Args {
    pub fn new() -> Self {
        Self {
            serialized: Vec::new(),
            offset: DEFAULT_OFFSET,
        }
    }

    /// Creates Args from existing serialized data, ready for reading.
    pub fn from_bytes(serialized: Vec<u8>) -> Self {
        Self {
            serialized,
            offset: DEFAULT_OFFSET,
        }
    }

    pub fn get_offset(&self) -> usize {
        self.offset
    }

    /// Bytes not consumed by the readers yet.
    pub fn remaining(&self) -> usize {
        self.serialized.len().saturating_sub(self.offset)
    }

    pub fn serialize(&self) -> Vec<u8> {
        self.serialized.clone()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.serialized
    }

    /// Reads `len` bytes from the current offset and advances it.
    fn read_bytes(&mut self, len: usize) -> Result<&[u8]> {
        let current_offset = self.offset;
        let end_offset = current_offset.checked_add(len).ok_or_else(|| {
            anyhow!(
                "Offset overflow while trying to read {} bytes from offset {}",
                len,
                current_offset
            )
        })?;

        if end_offset > self.serialized.len() {
            bail!(
                "Not enough bytes to read. Wanted {} bytes from offset {}, but buffer length is {}",
                len,
                current_offset,
                self.serialized.len()
            );
        }

        self.offset = end_offset;
        Ok(&self.serialized[current_offset..end_offset])
    }

    fn read_word(&mut self) -> Result<[u8; BYTES_256_OFFSET]> {
        let le_bytes = self.read_bytes(BYTES_256_OFFSET)?;
        let mut word = [0u8; BYTES_256_OFFSET];
        word.copy_from_slice(le_bytes);
        Ok(word)
    }

    fn next_len_prefix(&mut self) -> Result<usize> {
        Ok(self.next_u32().context("Failed to read length prefix")? as usize)
    }

    pub fn next_u8(&mut self) -> Result<u8> {
        self.read_bytes(1)?.read_u8().context("Failed to read u8")
    }

    pub fn next_u32(&mut self) -> Result<u32> {
        self.read_bytes(BYTES_32_OFFSET)?
            .read_u32::<LittleEndian>()
            .context("Failed to read u32")
    }

    pub fn next_u64(&mut self) -> Result<u64> {
        self.read_bytes(BYTES_64_OFFSET)?
            .read_u64::<LittleEndian>()
            .context("Failed to read u64")
    }

    pub fn next_i32(&mut self) -> Result<i32> {
        self.read_bytes(BYTES_32_OFFSET)?
            .read_i32::<LittleEndian>()
            .context("Failed to read i32")
    }

    pub fn next_u256(&mut self) -> Result<U256> {
        let word = self.read_word().context("Failed to read u256")?;
        Ok(U256::from_le_bytes(word))
    }

    /// Reads a two's complement 256-bit signed integer.
    pub fn next_i256(&mut self) -> Result<I256> {
        let word = self.read_word().context("Failed to read i256")?;
        Ok(I256::from_raw(U256::from_le_bytes(word)))
    }

    /// Reads a boolean stored as a u8, non-zero is true.
    pub fn next_bool(&mut self) -> Result<bool> {
        let val = self.next_u8()?;
        Ok(val != 0)
    }

    pub fn next_string(&mut self) -> Result<String> {
        let len = self.next_len_prefix()?;
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes.to_vec())
            .with_context(|| format!("Failed to decode UTF-8 string with length {}", len))
    }

    pub fn next_bytes(&mut self) -> Result<Vec<u8>> {
        let len = self.next_len_prefix()?;
        let bytes = self.read_bytes(len)?;
        Ok(bytes.to_vec())
    }

    pub fn next_serializable<T: Serializable>(&mut self) -> Result<T> {
        let (instance, new_offset) = T::deserialize(&self.serialized, self.offset)?;
        if new_offset < self.offset || new_offset > self.serialized.len() {
            bail!(
                "Invalid offset {} returned by {}::deserialize (previous offset {}, buffer length {})",
                new_offset,
                std::any::type_name::<T>(),
                self.offset,
                self.serialized.len()
            );
        }
        self.offset = new_offset;
        Ok(instance)
    }

    /// Reads a count-prefixed array whose elements all carry `element_type`.
    pub fn next_array<T>(&mut self, element_type: ValueTag) -> Result<Vec<T>>
    where
        Args: NextArg<T>,
    {
        let len = self.next_len_prefix()?;
        // Each element takes at least one byte, so a count larger than the
        // remaining buffer is corrupt; checked before allocating.
        if len > self.remaining() {
            bail!(
                "Array of {} {} elements cannot fit in the {} remaining bytes",
                len,
                element_type,
                self.remaining()
            );
        }
        let mut result = Vec::with_capacity(len);
        for _ in 0..len {
            result.push(self.next_arg(element_type)?);
        }
        Ok(result)
    }

    pub fn next_u256_array(&mut self) -> Result<Vec<U256>> {
        self.next_array(ValueTag::Uint256)
    }

    pub fn next_string_array(&mut self) -> Result<Vec<String>> {
        self.next_array(ValueTag::String)
    }

    pub fn add_u8(&mut self, value: u8) -> &mut Self {
        self.serialized.push(value);
        self
    }

    pub fn add_u32(&mut self, value: u32) -> &mut Self {
        self.serialized.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn add_u64(&mut self, value: u64) -> &mut Self {
        self.serialized.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn add_i32(&mut self, value: i32) -> &mut Self {
        self.serialized.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn add_u256(&mut self, value: U256) -> &mut Self {
        self.serialized.extend_from_slice(&value.to_le_bytes_vec());
        self
    }

    /// Adds a 256-bit signed integer as its two's complement word.
    pub fn add_i256(&mut self, value: I256) -> &mut Self {
        self.add_u256(value.into_raw())
    }

    /// Adds a boolean as a u8: 1 for true, 0 for false.
    pub fn add_bool(&mut self, value: bool) -> &mut Self {
        self.add_u8(u8::from(value))
    }

    fn add_len_prefix(&mut self, len: usize, what: &str) -> Result<&mut Self> {
        if len > MAX_PREFIXED_LEN {
            bail!(
                "{} length {} exceeds maximum allowed size {}",
                what,
                len,
                MAX_PREFIXED_LEN
            );
        }
        Ok(self.add_u32(len as u32))
    }

    pub fn add_string(&mut self, value: &str) -> Result<&mut Self> {
        let bytes = value.as_bytes();
        self.add_len_prefix(bytes.len(), "String")?;
        self.serialized.extend_from_slice(bytes);
        Ok(self)
    }

    pub fn add_bytes(&mut self, value: &[u8]) -> Result<&mut Self> {
        self.add_len_prefix(value.len(), "Byte array")?;
        self.serialized.extend_from_slice(value);
        Ok(self)
    }

    /// Adds a `Serializable` value without a length prefix.
    pub fn add_serializable<T: Serializable>(&mut self, value: &T) -> &mut Self {
        let bytes = value.serialize();
        self.serialized.extend_from_slice(&bytes);
        self
    }

    pub fn add_u256_array(&mut self, values: &[U256]) -> Result<&mut Self> {
        self.add_len_prefix(values.len(), "u256 array")?;
        for value in values {
            self.add_u256(*value);
        }
        Ok(self)
    }

    pub fn add_string_array(&mut self, values: &[String]) -> Result<&mut Self> {
        self.add_len_prefix(values.len(), "String array")?;
        for value in values {
            self.add_string(value)?;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Clone)]
    struct Point {
        x: i32,
        y: i32,
    }

    impl Serializable for Point {
        fn serialize(&self) -> Vec<u8> {
            let mut args = Args::new();
            args.add_i32(self.x).add_i32(self.y);
            args.into_bytes()
        }

        fn deserialize(data: &[u8], offset: usize) -> Result<(Self, usize)> {
            let mut args = Args::from_bytes(data[offset..].to_vec());
            let x = args.next_i32().context("Failed to read Point.x")?;
            let y = args.next_i32().context("Failed to read Point.y")?;
            Ok((Point { x, y }, offset + args.get_offset()))
        }
    }

    #[test]
    fn test_add_and_next_primitives() -> Result<()> {
        let mut args = Args::new();
        args.add_u8(10).add_i32(-500).add_bool(true).add_u64(123_456);

        let mut reader_args = Args::from_bytes(args.serialize());
        assert_eq!(reader_args.next_u8()?, 10);
        assert_eq!(reader_args.next_i32()?, -500);
        assert!(reader_args.next_bool()?);
        assert_eq!(reader_args.next_u64()?, 123_456);
        assert_eq!(reader_args.get_offset(), 1 + 4 + 1 + 8);
        assert_eq!(reader_args.remaining(), 0);

        Ok(())
    }

    #[test]
    fn test_u256_is_little_endian_word() -> Result<()> {
        let mut args = Args::new();
        args.add_u256(U256::from(0x0102u64));

        let bytes = args.serialize();
        assert_eq!(bytes.len(), BYTES_256_OFFSET);
        assert_eq!(bytes[0], 0x02);
        assert_eq!(bytes[1], 0x01);
        assert!(bytes[2..].iter().all(|b| *b == 0));

        Ok(())
    }

    #[test]
    fn test_negative_i256_keeps_sign() -> Result<()> {
        let value = I256::try_from(-42i64).unwrap();
        let mut args = Args::new();
        args.add_i256(value).add_i256(I256::MAX).add_i256(I256::MIN);

        let mut reader_args = Args::from_bytes(args.serialize());
        assert_eq!(reader_args.next_i256()?, value);
        assert_eq!(reader_args.next_i256()?, I256::MAX);
        assert_eq!(reader_args.next_i256()?, I256::MIN);

        Ok(())
    }

    #[test]
    fn test_add_and_next_string() -> Result<()> {
        let mut args = Args::new();
        let s1 = "hello";
        let s2 = "électricité";
        args.add_string(s1)?.add_string(s2)?;

        let mut reader_args = Args::from_bytes(args.serialize());
        assert_eq!(reader_args.next_string()?, s1);
        assert_eq!(reader_args.next_string()?, s2);
        assert_eq!(reader_args.get_offset(), (4 + s1.len()) + (4 + s2.len()));

        Ok(())
    }

    #[test]
    fn test_add_and_next_serializable() -> Result<()> {
        let mut args = Args::new();
        let p1 = Point { x: 1, y: 2 };
        let p2 = Point { x: -10, y: -20 };
        args.add_serializable(&p1).add_serializable(&p2);

        let mut reader_args = Args::from_bytes(args.serialize());
        assert_eq!(reader_args.next_serializable::<Point>()?, p1);
        assert_eq!(reader_args.next_serializable::<Point>()?, p2);
        assert_eq!(reader_args.get_offset(), 8 + 8);

        Ok(())
    }

    #[test]
    fn test_add_and_next_u256_array() -> Result<()> {
        let data = vec![U256::from(10u64), U256::MAX, U256::ZERO];
        let mut args = Args::new();
        args.add_u256_array(&data)?;

        let mut reader_args = Args::from_bytes(args.serialize());
        assert_eq!(reader_args.next_u256_array()?, data);
        assert_eq!(reader_args.get_offset(), 4 + 3 * 32);

        Ok(())
    }

    #[test]
    fn test_add_and_next_string_array() -> Result<()> {
        let data: Vec<String> = vec!["a".to_string(), "bb".to_string(), "ccc".to_string()];
        let mut args = Args::new();
        args.add_string_array(&data)?;

        let mut reader_args = Args::from_bytes(args.serialize());
        assert_eq!(reader_args.next_string_array()?, data);
        assert_eq!(reader_args.get_offset(), 4 + (4 + 1) + (4 + 2) + (4 + 3));

        Ok(())
    }

    #[test]
    fn test_read_past_end() {
        let mut args = Args::new();
        args.add_u8(1).add_u8(2);

        let mut reader_args = Args::from_bytes(args.serialize());
        assert!(reader_args.next_u8().is_ok());
        assert!(reader_args.next_u8().is_ok());
        assert!(reader_args.next_u8().is_err());
    }

    #[test]
    fn test_read_string_not_enough_data_for_content() {
        let mut args = Args::new();
        args.add_u32(10);
        args.serialized.push(1);
        args.serialized.push(2);

        let mut reader_args = Args::from_bytes(args.serialize());
        assert!(reader_args.next_string().is_err());
    }

    #[test]
    fn test_oversized_array_count_is_rejected() {
        let mut args = Args::new();
        args.add_u32(u32::MAX);

        let mut reader_args = Args::from_bytes(args.serialize());
        assert!(reader_args.next_u256_array().is_err());
    }
}
