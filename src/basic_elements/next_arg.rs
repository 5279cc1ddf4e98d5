use alloy_primitives::{I256, U256};
use anyhow::{Result, bail};

use crate::types::ValueTag;

use super::args::Args;

/// Reads one array element after checking that the declared element tag
/// matches the requested Rust type.
pub trait NextArg<T> {
    fn next_arg(&mut self, element_type: ValueTag) -> Result<T>;
}

impl NextArg<U256> for Args {
    fn next_arg(&mut self, element_type: ValueTag) -> Result<U256> {
        if element_type == ValueTag::Uint256 {
            self.next_u256()
        } else {
            bail!(
                "Type mismatch: Expected {}, but got request for uint256",
                element_type
            );
        }
    }
}

impl NextArg<I256> for Args {
    fn next_arg(&mut self, element_type: ValueTag) -> Result<I256> {
        if element_type == ValueTag::Int256 {
            self.next_i256()
        } else {
            bail!(
                "Type mismatch: Expected {}, but got request for int256",
                element_type
            );
        }
    }
}

impl NextArg<String> for Args {
    fn next_arg(&mut self, element_type: ValueTag) -> Result<String> {
        if element_type == ValueTag::String {
            self.next_string()
        } else {
            bail!(
                "Type mismatch: Expected {}, but got request for string",
                element_type
            );
        }
    }
}

impl NextArg<bool> for Args {
    fn next_arg(&mut self, element_type: ValueTag) -> Result<bool> {
        if element_type == ValueTag::Bool {
            self.next_bool()
        } else {
            bail!(
                "Type mismatch: Expected {}, but got request for bool",
                element_type
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatched_element_tag_is_refused() -> Result<()> {
        let mut args = Args::new();
        args.add_u256(U256::from(7u64));

        let mut reader = Args::from_bytes(args.serialize());
        let wrong: Result<String> = reader.next_arg(ValueTag::Uint256);
        assert!(wrong.is_err());

        let mut reader = Args::from_bytes(args.serialize());
        let right: U256 = reader.next_arg(ValueTag::Uint256)?;
        assert_eq!(right, U256::from(7u64));

        Ok(())
    }
}
