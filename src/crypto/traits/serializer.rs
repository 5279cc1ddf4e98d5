use anyhow::Result;

/// Text encoding for versioned key and signature bytes.
pub trait Serializer: Send + Sync {
    fn serialize(&self, data: &[u8]) -> String;
    fn deserialize(&self, s: &str) -> Result<Vec<u8>>;
}
