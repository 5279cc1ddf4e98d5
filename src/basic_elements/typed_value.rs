use std::fmt;

use alloy_primitives::{I256, U256};
use anyhow::{Context, Result, anyhow, bail};

use crate::types::ValueTag;

use super::args::Args;

/// A contract parameter or return value together with its wire type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedValue {
    String(String),
    Uint256(U256),
    Int256(I256),
    Bool(bool),
    Uint256Array(Vec<U256>),
    StringArray(Vec<String>),
    Bytes(Vec<u8>),
}

impl TypedValue {
    pub fn tag(&self) -> ValueTag {
        match self {
            TypedValue::String(_) => ValueTag::String,
            TypedValue::Uint256(_) => ValueTag::Uint256,
            TypedValue::Int256(_) => ValueTag::Int256,
            TypedValue::Bool(_) => ValueTag::Bool,
            TypedValue::Uint256Array(_) => ValueTag::Uint256Array,
            TypedValue::StringArray(_) => ValueTag::StringArray,
            TypedValue::Bytes(_) => ValueTag::Bytes,
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        TypedValue::String(value.into())
    }

    pub fn uint(value: u64) -> Self {
        TypedValue::Uint256(U256::from(value))
    }

    /// Builds a value from its text form, failing when `raw` does not fit `tag`.
    ///
    /// Arrays are comma separated; bytes are hex with an optional `0x` prefix.
    pub fn parse(tag: ValueTag, raw: &str) -> Result<Self> {
        let value = match tag {
            ValueTag::String => TypedValue::String(raw.to_string()),
            ValueTag::Uint256 => TypedValue::Uint256(parse_u256(raw)?),
            ValueTag::Int256 => TypedValue::Int256(
                raw.trim()
                    .parse::<I256>()
                    .map_err(|e| anyhow!("Invalid int256 '{}': {}", raw, e))?,
            ),
            ValueTag::Bool => match raw.trim() {
                "true" | "1" => TypedValue::Bool(true),
                "false" | "0" => TypedValue::Bool(false),
                other => bail!("Invalid bool '{}'", other),
            },
            ValueTag::Uint256Array => TypedValue::Uint256Array(
                split_list(raw)
                    .map(parse_u256)
                    .collect::<Result<Vec<_>>>()?,
            ),
            ValueTag::StringArray => {
                TypedValue::StringArray(split_list(raw).map(str::to_string).collect())
            }
            ValueTag::Bytes => TypedValue::Bytes(
                hex::decode(raw.trim().trim_start_matches("0x"))
                    .with_context(|| format!("Invalid hex bytes '{}'", raw))?,
            ),
        };
        Ok(value)
    }

    /// Appends this value using its fixed-width encoding rule.
    pub fn encode_into(&self, args: &mut Args) -> Result<()> {
        match self {
            TypedValue::String(value) => {
                args.add_string(value)?;
            }
            TypedValue::Uint256(value) => {
                args.add_u256(*value);
            }
            TypedValue::Int256(value) => {
                args.add_i256(*value);
            }
            TypedValue::Bool(value) => {
                args.add_bool(*value);
            }
            TypedValue::Uint256Array(values) => {
                args.add_u256_array(values)?;
            }
            TypedValue::StringArray(values) => {
                args.add_string_array(values)?;
            }
            TypedValue::Bytes(value) => {
                args.add_bytes(value)?;
            }
        }
        Ok(())
    }

    pub fn decode_from(args: &mut Args, tag: ValueTag) -> Result<Self> {
        let value = match tag {
            ValueTag::String => TypedValue::String(args.next_string()?),
            ValueTag::Uint256 => TypedValue::Uint256(args.next_u256()?),
            ValueTag::Int256 => TypedValue::Int256(args.next_i256()?),
            ValueTag::Bool => TypedValue::Bool(args.next_bool()?),
            ValueTag::Uint256Array => TypedValue::Uint256Array(args.next_u256_array()?),
            ValueTag::StringArray => TypedValue::StringArray(args.next_string_array()?),
            ValueTag::Bytes => TypedValue::Bytes(args.next_bytes()?),
        };
        Ok(value)
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::String(value) => f.write_str(value),
            TypedValue::Uint256(value) => write!(f, "{value}"),
            TypedValue::Int256(value) => write!(f, "{value}"),
            TypedValue::Bool(value) => write!(f, "{value}"),
            TypedValue::Uint256Array(values) => {
                let items: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", items.join(","))
            }
            TypedValue::StringArray(values) => write!(f, "[{}]", values.join(",")),
            TypedValue::Bytes(value) => write!(f, "0x{}", hex::encode(value)),
        }
    }
}

impl From<bool> for TypedValue {
    fn from(value: bool) -> Self {
        TypedValue::Bool(value)
    }
}

impl From<U256> for TypedValue {
    fn from(value: U256) -> Self {
        TypedValue::Uint256(value)
    }
}

impl From<I256> for TypedValue {
    fn from(value: I256) -> Self {
        TypedValue::Int256(value)
    }
}

impl From<&str> for TypedValue {
    fn from(value: &str) -> Self {
        TypedValue::String(value.to_string())
    }
}

impl From<String> for TypedValue {
    fn from(value: String) -> Self {
        TypedValue::String(value)
    }
}

impl From<Vec<U256>> for TypedValue {
    fn from(values: Vec<U256>) -> Self {
        TypedValue::Uint256Array(values)
    }
}

fn parse_u256(raw: &str) -> Result<U256> {
    raw.trim()
        .parse::<U256>()
        .map_err(|e| anyhow!("Invalid uint256 '{}': {}", raw, e))
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|item| !item.is_empty())
}

/// Encodes a parameter list in declared order.
pub fn encode_values(values: &[TypedValue]) -> Result<Vec<u8>> {
    let mut args = Args::new();
    for (index, value) in values.iter().enumerate() {
        value
            .encode_into(&mut args)
            .with_context(|| format!("Failed to encode parameter {} ({})", index, value.tag()))?;
    }
    Ok(args.into_bytes())
}

/// Decodes `bytes` against a schema; the buffer must be consumed exactly.
pub fn decode_values(bytes: &[u8], schema: &[ValueTag]) -> Result<Vec<TypedValue>> {
    let mut args = Args::from_bytes(bytes.to_vec());
    let mut values = Vec::with_capacity(schema.len());
    for (index, tag) in schema.iter().enumerate() {
        let value = TypedValue::decode_from(&mut args, *tag)
            .with_context(|| format!("Failed to decode value {} as {}", index, tag))?;
        values.push(value);
    }

    if args.remaining() != 0 {
        bail!(
            "{} trailing bytes after decoding {} values",
            args.remaining(),
            schema.len()
        );
    }

    Ok(values)
}
