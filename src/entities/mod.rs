//! Declarative function tables of the deployed contracts.
//!
//! Every contract kind lists its functions once, with parameter and return
//! types and the gas each call is sent with. Descriptors are always built
//! through these tables, so a call with the wrong shape fails before it is
//! signed.

pub mod billing;
pub mod delivery;
pub mod institution;
pub mod person;
pub mod tables;
pub mod university;

use std::{fmt, str::FromStr};

use alloy_primitives::U256;
use anyhow::bail;

use crate::{
    basic_elements::typed_value::TypedValue,
    error::DispatchError,
    types::{CallDescriptor, CallKind, ContractHandle, FunctionSignature, QueryResult, ValueTag},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractKind {
    Steg,
    Sonede,
    Internet,
    Hopital,
    Cnam,
    University,
    Oou,
    Delivery,
    PersonRegistry,
}

impl ContractKind {
    pub const ALL: [ContractKind; 9] = [
        ContractKind::Steg,
        ContractKind::Sonede,
        ContractKind::Internet,
        ContractKind::Hopital,
        ContractKind::Cnam,
        ContractKind::University,
        ContractKind::Oou,
        ContractKind::Delivery,
        ContractKind::PersonRegistry,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContractKind::Steg => "steg",
            ContractKind::Sonede => "sonede",
            ContractKind::Internet => "internet",
            ContractKind::Hopital => "hopital",
            ContractKind::Cnam => "cnam",
            ContractKind::University => "university",
            ContractKind::Oou => "oou",
            ContractKind::Delivery => "delivery",
            ContractKind::PersonRegistry => "person",
        }
    }

    pub fn functions(&self) -> &'static [FunctionSpec] {
        tables::functions(*self)
    }

    /// Constructor parameter types: `(owner, name)` for institutions.
    pub fn constructor_params(&self) -> &'static [ValueTag] {
        match self {
            ContractKind::PersonRegistry => &[],
            _ => &[ValueTag::String, ValueTag::String],
        }
    }

    pub fn spec(&self, entity: Entity, operation: Operation) -> Option<&'static FunctionSpec> {
        self.functions()
            .iter()
            .find(|spec| spec.entity == entity && spec.operation == operation)
    }

    pub fn by_name(&self, name: &str) -> Option<&'static FunctionSpec> {
        self.functions().iter().find(|spec| spec.name == name)
    }
}

impl fmt::Display for ContractKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContractKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        match ContractKind::ALL.iter().find(|kind| kind.as_str() == lowered) {
            Some(kind) => Ok(*kind),
            None => bail!("Unknown contract kind '{}'", s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Institution,
    UtilityBill,
    InternetBill,
    HospitalBill,
    ClaimPaper,
    TuitionFee,
    Scholarship,
    DeliveryFee,
    Product,
    Rating,
    Person,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GetOwner,
    GetName,
    UpdateDetails,
    DeleteInstitution,
    Add,
    Get,
    Update,
    Pay,
    Delete,
    GetAll,
    GetAllByCin,
    Register,
    Modify,
    UpdatePassword,
    Login,
    GetAccountId,
    GetFullname,
    CanLogin,
}

/// One row of a contract's function table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionSpec {
    pub entity: Entity,
    pub operation: Operation,
    pub name: &'static str,
    pub kind: CallKind,
    pub params: &'static [ValueTag],
    pub returns: &'static [ValueTag],
    pub gas: u64,
}

impl FunctionSpec {
    pub const fn execute(
        entity: Entity,
        operation: Operation,
        name: &'static str,
        params: &'static [ValueTag],
        gas: u64,
    ) -> Self {
        Self {
            entity,
            operation,
            name,
            kind: CallKind::Execute,
            params,
            returns: &[],
            gas,
        }
    }

    pub const fn query(
        entity: Entity,
        operation: Operation,
        name: &'static str,
        params: &'static [ValueTag],
        returns: &'static [ValueTag],
        gas: u64,
    ) -> Self {
        Self {
            entity,
            operation,
            name,
            kind: CallKind::Query,
            params,
            returns,
            gas,
        }
    }

    pub fn signature(&self) -> FunctionSignature {
        FunctionSignature {
            name: self.name.to_string(),
            kind: self.kind,
            params: self.params.to_vec(),
            returns: self.returns.to_vec(),
            gas_limit: self.gas,
        }
    }
}

/// Validated descriptor for `entity`/`operation` on a contract of `kind`.
pub fn descriptor(
    kind: ContractKind,
    contract: ContractHandle,
    entity: Entity,
    operation: Operation,
    params: Vec<TypedValue>,
) -> Result<CallDescriptor, DispatchError> {
    let spec = kind.spec(entity, operation).ok_or_else(|| {
        DispatchError::validation(
            &format!("{entity:?}::{operation:?}"),
            format!("{kind} contracts have no such function"),
        )
    })?;
    CallDescriptor::build(contract, &spec.signature(), params)
}

/// Validated descriptor for a function looked up by its contract-level name.
pub fn descriptor_by_name(
    kind: ContractKind,
    contract: ContractHandle,
    name: &str,
    params: Vec<TypedValue>,
) -> Result<CallDescriptor, DispatchError> {
    let spec = kind.by_name(name).ok_or_else(|| {
        DispatchError::validation(name, format!("{kind} contracts have no such function"))
    })?;
    CallDescriptor::build(contract, &spec.signature(), params)
}

/// A record that a contract stores and can be written from typed fields.
pub trait EntityRecord: Sized {
    const ENTITY: Entity;

    /// Parameters of the add call, in declared order.
    fn to_params(&self) -> Vec<TypedValue>;

    /// Parameters of the update call for the record with `id`.
    fn update_params(&self, id: U256) -> Vec<TypedValue> {
        let mut params = vec![TypedValue::Uint256(id)];
        params.extend(self.to_params());
        params
    }
}

/// Decoding of a getter's positional result.
pub trait FromQueryResult: Sized {
    fn from_result(result: &QueryResult) -> anyhow::Result<Self>;
}

/// A stored record as returned by id-keyed getters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stored<T> {
    pub id: U256,
    pub record: T,
    pub paid: bool,
}

pub fn add<R: EntityRecord>(
    kind: ContractKind,
    contract: ContractHandle,
    record: &R,
) -> Result<CallDescriptor, DispatchError> {
    descriptor(kind, contract, R::ENTITY, Operation::Add, record.to_params())
}

pub fn update<R: EntityRecord>(
    kind: ContractKind,
    contract: ContractHandle,
    id: U256,
    record: &R,
) -> Result<CallDescriptor, DispatchError> {
    descriptor(kind, contract, R::ENTITY, Operation::Update, record.update_params(id))
}

/// Get, pay or delete by id.
pub fn by_id(
    kind: ContractKind,
    contract: ContractHandle,
    entity: Entity,
    operation: Operation,
    id: U256,
) -> Result<CallDescriptor, DispatchError> {
    descriptor(kind, contract, entity, operation, vec![TypedValue::Uint256(id)])
}

pub fn get_all(
    kind: ContractKind,
    contract: ContractHandle,
    entity: Entity,
) -> Result<CallDescriptor, DispatchError> {
    descriptor(kind, contract, entity, Operation::GetAll, Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_table_has_unique_names_and_positive_gas() {
        for kind in ContractKind::ALL {
            let functions = kind.functions();
            assert!(!functions.is_empty(), "{kind} has no functions");
            for (index, spec) in functions.iter().enumerate() {
                assert!(spec.gas > 0, "{} has no gas", spec.name);
                assert!(
                    functions[index + 1..].iter().all(|other| other.name != spec.name),
                    "{} listed twice for {kind}",
                    spec.name
                );
                assert!(
                    spec.kind == CallKind::Query || spec.returns.is_empty(),
                    "{} executes but declares returns",
                    spec.name
                );
            }
        }
    }

    #[test]
    fn kinds_parse_from_their_names() -> anyhow::Result<()> {
        for kind in ContractKind::ALL {
            assert_eq!(kind.as_str().parse::<ContractKind>()?, kind);
        }
        assert_eq!("STEG".parse::<ContractKind>()?, ContractKind::Steg);
        assert!("bank".parse::<ContractKind>().is_err());
        Ok(())
    }

    #[test]
    fn missing_operation_is_a_validation_error() {
        let contract = ContractHandle::new(0, 0, 1500);
        let result = by_id(
            ContractKind::PersonRegistry,
            contract,
            Entity::UtilityBill,
            Operation::Pay,
            U256::from(1u64),
        );
        assert!(matches!(result, Err(DispatchError::Validation { .. })));
    }

    #[test]
    fn lookup_by_name_matches_lookup_by_operation() {
        let by_op = ContractKind::Oou
            .spec(Entity::Institution, Operation::UpdateDetails)
            .map(|spec| spec.name);
        assert_eq!(by_op, Some("updateOOURegion"));
        assert_eq!(
            ContractKind::Oou.by_name("updateOOURegion").map(|spec| spec.operation),
            Some(Operation::UpdateDetails)
        );
    }
}
