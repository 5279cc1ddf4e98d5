use std::fmt;

use alloy_primitives::I256;

use crate::{
    basic_elements::typed_value::TypedValue,
    error::DispatchError,
    types::{CallDescriptor, ContractHandle},
};

use super::{ContractKind, Entity, Operation, descriptor};

/// A person linked to a ledger account, keyed by national id.
#[derive(Clone, PartialEq, Eq)]
pub struct PersonRegistration {
    pub account_id: String,
    pub fullname: String,
    pub cin: I256,
    pub password: String,
}

impl fmt::Debug for PersonRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersonRegistration")
            .field("account_id", &self.account_id)
            .field("fullname", &self.fullname)
            .field("cin", &self.cin)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn person(
    contract: ContractHandle,
    operation: Operation,
    params: Vec<TypedValue>,
) -> Result<CallDescriptor, DispatchError> {
    descriptor(
        ContractKind::PersonRegistry,
        contract,
        Entity::Person,
        operation,
        params,
    )
}

pub fn register(
    contract: ContractHandle,
    registration: &PersonRegistration,
) -> Result<CallDescriptor, DispatchError> {
    person(
        contract,
        Operation::Register,
        vec![
            registration.account_id.clone().into(),
            registration.fullname.clone().into(),
            registration.cin.into(),
            registration.password.clone().into(),
        ],
    )
}

pub fn modify(
    contract: ContractHandle,
    cin: I256,
    fullname: &str,
    account_id: &str,
) -> Result<CallDescriptor, DispatchError> {
    person(
        contract,
        Operation::Modify,
        vec![cin.into(), fullname.into(), account_id.into()],
    )
}

pub fn update_password(
    contract: ContractHandle,
    cin: I256,
    password: &str,
) -> Result<CallDescriptor, DispatchError> {
    person(contract, Operation::UpdatePassword, vec![cin.into(), password.into()])
}

pub fn login(
    contract: ContractHandle,
    cin: I256,
    password: &str,
) -> Result<CallDescriptor, DispatchError> {
    person(contract, Operation::Login, vec![cin.into(), password.into()])
}

pub fn get_account_id(contract: ContractHandle, cin: I256) -> Result<CallDescriptor, DispatchError> {
    person(contract, Operation::GetAccountId, vec![cin.into()])
}

pub fn get_fullname(contract: ContractHandle, cin: I256) -> Result<CallDescriptor, DispatchError> {
    person(contract, Operation::GetFullname, vec![cin.into()])
}

pub fn can_login(contract: ContractHandle, cin: I256) -> Result<CallDescriptor, DispatchError> {
    person(contract, Operation::CanLogin, vec![cin.into()])
}
