use anyhow::{Result, bail};

// Read a u64 from the first 8 bytes (little-endian) of a slice
pub fn bytes_to_u64(bytes: &[u8]) -> Result<u64> {
    let Some(head) = bytes.get(..8) else {
        bail!(
            "Input must be at least 8 bytes long for u64, got {}",
            bytes.len()
        );
    };
    let mut word = [0u8; 8];
    word.copy_from_slice(head);
    Ok(u64::from_le_bytes(word))
}
