use std::fmt;

use alloy_primitives::{I256, U256};
use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::{
    basic_elements::typed_value::{TypedValue, encode_values},
    error::DispatchError,
};

use super::{ContractHandle, ValueTag};

/// Whether a function changes ledger state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallKind {
    Execute,
    Query,
}

impl fmt::Display for CallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallKind::Execute => f.write_str("execute"),
            CallKind::Query => f.write_str("query"),
        }
    }
}

/// Declared shape of a contract function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    pub name: String,
    pub kind: CallKind,
    pub params: Vec<ValueTag>,
    pub returns: Vec<ValueTag>,
    pub gas_limit: u64,
}

/// A validated request to call one contract function.
///
/// Only [`CallDescriptor::build`] creates one, so the parameters always match
/// the declared signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallDescriptor {
    target: ContractHandle,
    function: String,
    parameters: Vec<TypedValue>,
    gas_limit: u64,
    kind: CallKind,
    returns: Vec<ValueTag>,
    idempotency_key: Option<String>,
}

impl CallDescriptor {
    pub fn build(
        target: ContractHandle,
        signature: &FunctionSignature,
        parameters: Vec<TypedValue>,
    ) -> Result<Self, DispatchError> {
        if parameters.len() != signature.params.len() {
            return Err(DispatchError::validation(
                &signature.name,
                format!(
                    "expected {} parameters, got {}",
                    signature.params.len(),
                    parameters.len()
                ),
            ));
        }

        for (index, (value, expected)) in parameters.iter().zip(&signature.params).enumerate() {
            if value.tag() != *expected {
                return Err(DispatchError::validation(
                    &signature.name,
                    format!(
                        "parameter {} must be {}, got {}",
                        index,
                        expected,
                        value.tag()
                    ),
                ));
            }
        }

        if signature.gas_limit == 0 {
            return Err(DispatchError::validation(
                &signature.name,
                "gas limit must be positive",
            ));
        }

        Ok(Self {
            target,
            function: signature.name.clone(),
            parameters,
            gas_limit: signature.gas_limit,
            kind: signature.kind,
            returns: signature.returns.clone(),
            idempotency_key: None,
        })
    }

    /// Same call with a different gas limit. Zero is rejected.
    pub fn with_gas_limit(&self, gas_limit: u64) -> Result<Self, DispatchError> {
        if gas_limit == 0 {
            return Err(DispatchError::validation(
                &self.function,
                "gas limit must be positive",
            ));
        }
        Ok(Self {
            gas_limit,
            ..self.clone()
        })
    }

    /// Marks the call as safe to resubmit when its outcome is unknown.
    pub fn with_idempotency_key(&self, key: impl Into<String>) -> Self {
        Self {
            idempotency_key: Some(key.into()),
            ..self.clone()
        }
    }

    pub fn target(&self) -> ContractHandle {
        self.target
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn parameters(&self) -> &[TypedValue] {
        &self.parameters
    }

    pub fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    pub fn kind(&self) -> CallKind {
        self.kind
    }

    pub fn returns(&self) -> &[ValueTag] {
        &self.returns
    }

    pub fn idempotency_key(&self) -> Option<&str> {
        self.idempotency_key.as_deref()
    }

    pub fn encoded_parameters(&self) -> Result<Vec<u8>> {
        encode_values(&self.parameters)
    }
}

/// Decoded values returned by a query, in declared order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryResult {
    values: Vec<TypedValue>,
}

macro_rules! positional_getter {
    ($name:ident, $variant:ident, $ty:ty, $tag:expr) => {
        pub fn $name(&self, index: usize) -> Result<$ty> {
            match self.values.get(index) {
                Some(TypedValue::$variant(value)) => Ok(value.clone()),
                Some(other) => anyhow::bail!(
                    "Result value {} is {}, not {}",
                    index,
                    other.tag(),
                    $tag
                ),
                None => anyhow::bail!(
                    "Result has {} values, no index {}",
                    self.values.len(),
                    index
                ),
            }
        }
    };
}

impl QueryResult {
    pub fn new(values: Vec<TypedValue>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[TypedValue] {
        &self.values
    }

    pub fn into_values(self) -> Vec<TypedValue> {
        self.values
    }

    positional_getter!(get_string, String, String, ValueTag::String);
    positional_getter!(get_u256, Uint256, U256, ValueTag::Uint256);
    positional_getter!(get_i256, Int256, I256, ValueTag::Int256);
    positional_getter!(get_bool, Bool, bool, ValueTag::Bool);
    positional_getter!(get_u256_array, Uint256Array, Vec<U256>, ValueTag::Uint256Array);
    positional_getter!(get_string_array, StringArray, Vec<String>, ValueTag::StringArray);
    positional_getter!(get_bytes, Bytes, Vec<u8>, ValueTag::Bytes);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pay_bill() -> FunctionSignature {
        FunctionSignature {
            name: "payBill".to_string(),
            kind: CallKind::Execute,
            params: vec![ValueTag::Uint256],
            returns: Vec::new(),
            gas_limit: 100_000,
        }
    }

    #[test]
    fn build_checks_arity_and_types() {
        let target = ContractHandle::new(0, 0, 1001);

        assert!(CallDescriptor::build(target, &pay_bill(), vec![TypedValue::uint(1)]).is_ok());

        let missing = CallDescriptor::build(target, &pay_bill(), Vec::new());
        assert!(matches!(missing, Err(DispatchError::Validation { .. })));

        let wrong_type =
            CallDescriptor::build(target, &pay_bill(), vec![TypedValue::string("1")]);
        assert!(matches!(wrong_type, Err(DispatchError::Validation { .. })));
    }

    #[test]
    fn builders_return_new_descriptors() -> Result<()> {
        let descriptor = CallDescriptor::build(
            ContractHandle::new(0, 0, 1001),
            &pay_bill(),
            vec![TypedValue::uint(3)],
        )?;

        let raised = descriptor.with_gas_limit(150_000)?;
        assert_eq!(raised.gas_limit(), 150_000);
        assert_eq!(descriptor.gas_limit(), 100_000);
        assert!(descriptor.with_gas_limit(0).is_err());

        let keyed = descriptor.with_idempotency_key("bill-3-payment");
        assert_eq!(keyed.idempotency_key(), Some("bill-3-payment"));
        assert_eq!(descriptor.idempotency_key(), None);
        Ok(())
    }

    #[test]
    fn positional_getters_check_the_tag() -> Result<()> {
        let result = QueryResult::new(vec![
            TypedValue::string("Tunis"),
            TypedValue::uint(42),
            TypedValue::Bool(false),
        ]);

        assert_eq!(result.get_string(0)?, "Tunis");
        assert_eq!(result.get_u256(1)?, U256::from(42u64));
        assert!(!result.get_bool(2)?);
        assert!(result.get_u256(0).is_err());
        assert!(result.get_string(3).is_err());
        Ok(())
    }
}
