use anyhow::{Context, Result, anyhow, bail};
use ed25519_dalek::{
    PUBLIC_KEY_LENGTH, SECRET_KEY_LENGTH, SIGNATURE_LENGTH, Signature as DalekSignature,
    Signer as _, SigningKey, Verifier as _, VerifyingKey,
};
use std::fmt;

use crate::crypto::{base58::Base58Serializer, traits::serializer::Serializer};

pub const PRIVATE_KEY_PREFIX: &str = "S";
pub const PUBLIC_KEY_PREFIX: &str = "P";

// PKCS#8 / SPKI headers that precede the raw ed25519 key in DER hex exports.
const ED25519_DER_PRIVATE_PREFIX: &str = "302e020100300506032b657004220420";
const ED25519_DER_PUBLIC_PREFIX: &str = "302a300506032b6570032100";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Version {
    V0 = 0,
}

impl Version {
    fn from_u8(byte: u8) -> Result<Self> {
        match byte {
            0 => Ok(Version::V0),
            _ => bail!("Unsupported version byte: {}", byte),
        }
    }
}

/// Prepends the single version byte.
fn attach_version(version: Version, raw_data: &[u8]) -> Vec<u8> {
    let mut versioned_data = Vec::with_capacity(1 + raw_data.len());
    versioned_data.push(version as u8);
    versioned_data.extend_from_slice(raw_data);
    versioned_data
}

fn extract_version(versioned_data: &[u8]) -> Result<(Version, &[u8])> {
    let Some((&version_byte, raw_data)) = versioned_data.split_first() else {
        bail!("Cannot extract version from empty data");
    };
    Ok((Version::from_u8(version_byte)?, raw_data))
}

/// Messages are hashed with blake3 and the 32-byte digest is what gets signed.
pub fn hash_message(message: &[u8]) -> [u8; 32] {
    *blake3::hash(message).as_bytes()
}

fn fixed<const N: usize>(bytes: &[u8], what: &str) -> Result<[u8; N]> {
    bytes
        .try_into()
        .map_err(|_| anyhow!("Invalid {} length: expected {} bytes, got {}", what, N, bytes.len()))
}

/// Versioned ed25519 signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    versioned_bytes: Vec<u8>,
}

impl Signature {
    pub fn from_bytes(versioned_bytes: Vec<u8>) -> Result<Self> {
        let (_, raw) = extract_version(&versioned_bytes)?;
        if raw.len() != SIGNATURE_LENGTH {
            bail!(
                "Invalid signature length: expected {} bytes, got {}",
                SIGNATURE_LENGTH,
                raw.len()
            );
        }
        Ok(Self { versioned_bytes })
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.versioned_bytes.clone()
    }

    fn raw(&self) -> Result<[u8; SIGNATURE_LENGTH]> {
        let (_, raw) = extract_version(&self.versioned_bytes)?;
        fixed(raw, "signature")
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&Base58Serializer.serialize(&self.versioned_bytes))
    }
}

/// Operator or wallet signing key.
#[derive(Clone)]
pub struct PrivateKey {
    signing_key: SigningKey,
}

// Never print key material.
impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("public_key", &self.public_key().to_string())
            .finish()
    }
}

impl PrivateKey {
    pub fn generate() -> Self {
        let secret = rand::random::<[u8; SECRET_KEY_LENGTH]>();
        Self {
            signing_key: SigningKey::from_bytes(&secret),
        }
    }

    pub fn from_raw_bytes(bytes: &[u8]) -> Result<Self> {
        let secret = fixed::<SECRET_KEY_LENGTH>(bytes, "private key")?;
        Ok(Self {
            signing_key: SigningKey::from_bytes(&secret),
        })
    }

    /// Parses the `S`-prefixed base58 form.
    pub fn from_string(s: &str) -> Result<Self> {
        let data_part = s.strip_prefix(PRIVATE_KEY_PREFIX).ok_or_else(|| {
            anyhow!(
                "Invalid private key prefix: expected '{}'",
                PRIVATE_KEY_PREFIX
            )
        })?;
        let versioned = Base58Serializer
            .deserialize(data_part)
            .context("Failed to deserialize private key data")?;
        let (_, raw) = extract_version(&versioned)
            .context("Failed to extract version from private key bytes")?;
        Self::from_raw_bytes(raw)
    }

    /// Parses a DER (PKCS#8) hex export, as produced by most ledger portals.
    pub fn from_der_hex(s: &str) -> Result<Self> {
        let lowered = s.trim().to_ascii_lowercase();
        let lowered = lowered.trim_start_matches("0x");
        let raw_hex = lowered.strip_prefix(ED25519_DER_PRIVATE_PREFIX).ok_or_else(|| {
            anyhow!("Private key is not a DER encoded ed25519 key")
        })?;
        let raw = hex::decode(raw_hex).context("Invalid hex in DER private key")?;
        Self::from_raw_bytes(&raw)
    }

    /// Accepts the base58 form, a DER hex export or 32 raw bytes in hex.
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.starts_with(PRIVATE_KEY_PREFIX) {
            return Self::from_string(trimmed);
        }
        let hex_part = trimmed.trim_start_matches("0x").to_ascii_lowercase();
        if hex_part.starts_with(ED25519_DER_PRIVATE_PREFIX) {
            return Self::from_der_hex(&hex_part);
        }
        let raw = hex::decode(&hex_part).context("Private key is neither base58, DER nor raw hex")?;
        Self::from_raw_bytes(&raw)
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            verifying_key: self.signing_key.verifying_key(),
        }
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        let digest = hash_message(message);
        let raw_signature = self.signing_key.sign(&digest);
        Signature {
            versioned_bytes: attach_version(Version::V0, &raw_signature.to_bytes()),
        }
    }
}

impl fmt::Display for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let versioned = attach_version(Version::V0, self.signing_key.as_bytes());
        write!(
            f,
            "{}{}",
            PRIVATE_KEY_PREFIX,
            Base58Serializer.serialize(&versioned)
        )
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey {
    verifying_key: VerifyingKey,
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PublicKey").field(&self.to_string()).finish()
    }
}

impl PublicKey {
    /// Parses versioned public key bytes.
    pub fn from_bytes(versioned: &[u8]) -> Result<Self> {
        let (_, raw) = extract_version(versioned)?;
        let raw = fixed::<PUBLIC_KEY_LENGTH>(raw, "public key")?;
        let verifying_key =
            VerifyingKey::from_bytes(&raw).context("Public key is not a valid ed25519 point")?;
        Ok(Self { verifying_key })
    }

    pub fn from_string(s: &str) -> Result<Self> {
        let data_part = s.strip_prefix(PUBLIC_KEY_PREFIX).ok_or_else(|| {
            anyhow!(
                "Invalid public key prefix: expected '{}'",
                PUBLIC_KEY_PREFIX
            )
        })?;
        let versioned = Base58Serializer
            .deserialize(data_part)
            .context("Failed to deserialize public key data")?;
        Self::from_bytes(&versioned)
    }

    pub fn from_der_hex(s: &str) -> Result<Self> {
        let lowered = s.trim().to_ascii_lowercase();
        let raw_hex = lowered
            .strip_prefix(ED25519_DER_PUBLIC_PREFIX)
            .ok_or_else(|| anyhow!("Public key is not a DER encoded ed25519 key"))?;
        let raw = hex::decode(raw_hex).context("Invalid hex in DER public key")?;
        Self::from_bytes(&attach_version(Version::V0, &raw))
    }

    /// Versioned bytes, as carried on the wire.
    pub fn to_bytes(&self) -> Vec<u8> {
        attach_version(Version::V0, self.verifying_key.as_bytes())
    }

    /// Checks `signature` against the blake3 digest of `message`.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        let Ok(raw) = signature.raw() else {
            return false;
        };
        let digest = hash_message(message);
        self.verifying_key
            .verify(&digest, &DalekSignature::from_bytes(&raw))
            .is_ok()
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            PUBLIC_KEY_PREFIX,
            Base58Serializer.serialize(&self.to_bytes())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known test vector key, never funded.
    const DER_PRIVATE_KEY: &str = "302e020100300506032b6570042204209d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";

    #[test]
    fn sign_and_verify() {
        let private_key = PrivateKey::generate();
        let public_key = private_key.public_key();
        let message = b"addBill";

        let signature = private_key.sign(message);
        assert_eq!(signature.to_vec().len(), 1 + SIGNATURE_LENGTH);
        assert!(public_key.verify(message, &signature));
        assert!(!public_key.verify(b"deleteBill", &signature));

        let other = PrivateKey::generate().public_key();
        assert!(!other.verify(message, &signature));
    }

    #[test]
    fn string_forms_round_trip() -> Result<()> {
        let private_key = PrivateKey::generate();
        let parsed = PrivateKey::from_string(&private_key.to_string())?;
        assert_eq!(parsed.public_key(), private_key.public_key());

        let public_key = private_key.public_key();
        assert_eq!(PublicKey::from_string(&public_key.to_string())?, public_key);
        assert_eq!(PublicKey::from_bytes(&public_key.to_bytes())?, public_key);
        Ok(())
    }

    #[test]
    fn der_and_raw_hex_keys_match() -> Result<()> {
        let from_der = PrivateKey::parse(DER_PRIVATE_KEY)?;
        let from_raw = PrivateKey::parse(
            "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60",
        )?;
        assert_eq!(from_der.public_key(), from_raw.public_key());
        Ok(())
    }

    #[test]
    fn invalid_keys_are_rejected() {
        assert!(PrivateKey::from_string("X12345").is_err());
        assert!(PublicKey::from_string("S12345").is_err());
        assert!(PrivateKey::parse(&format!("{}InvalidChars!", PRIVATE_KEY_PREFIX)).is_err());
        assert!(PrivateKey::parse("abcd").is_err());
        assert!(Signature::from_bytes(vec![0, 1, 2]).is_err());
    }
}
