use alloy_primitives::U256;
use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};

use crate::{
    basic_elements::typed_value::TypedValue,
    error::DispatchError,
    types::{CallDescriptor, ContractHandle, QueryResult},
};

use super::{ContractKind, Entity, EntityRecord, FromQueryResult, Operation, Stored, descriptor};

/// Tuition owed by the student with national id `cin` for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuitionFee {
    pub cin: U256,
    pub amount: U256,
    pub beginning_date: U256,
    pub end_date: U256,
}

impl EntityRecord for TuitionFee {
    const ENTITY: Entity = Entity::TuitionFee;

    fn to_params(&self) -> Vec<TypedValue> {
        vec![
            self.cin.into(),
            self.amount.into(),
            self.beginning_date.into(),
            self.end_date.into(),
        ]
    }
}

/// Scholarship granted by a university or the OOU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scholarship {
    pub cin: U256,
    pub amount: U256,
    pub beginning_date: U256,
    pub end_date: U256,
}

impl EntityRecord for Scholarship {
    const ENTITY: Entity = Entity::Scholarship;

    fn to_params(&self) -> Vec<TypedValue> {
        vec![
            self.cin.into(),
            self.amount.into(),
            self.beginning_date.into(),
            self.end_date.into(),
        ]
    }
}

impl FromQueryResult for Stored<Scholarship> {
    fn from_result(result: &QueryResult) -> Result<Self> {
        ensure!(
            result.len() == 6,
            "Scholarship result has {} values, expected 6",
            result.len()
        );
        Ok(Stored {
            id: result.get_u256(0)?,
            record: Scholarship {
                cin: result.get_u256(1)?,
                amount: result.get_u256(2)?,
                beginning_date: result.get_u256(3)?,
                end_date: result.get_u256(4)?,
            },
            paid: result.get_bool(5)?,
        })
    }
}

// Fees and scholarships are addressed by record id and the holder's cin.
fn by_id_and_cin(
    kind: ContractKind,
    contract: ContractHandle,
    entity: Entity,
    operation: Operation,
    id: U256,
    cin: U256,
) -> Result<CallDescriptor, DispatchError> {
    descriptor(kind, contract, entity, operation, vec![id.into(), cin.into()])
}

pub fn pay_fees(
    contract: ContractHandle,
    id: U256,
    cin: U256,
) -> Result<CallDescriptor, DispatchError> {
    by_id_and_cin(
        ContractKind::University,
        contract,
        Entity::TuitionFee,
        Operation::Pay,
        id,
        cin,
    )
}

pub fn get_scholarship(
    kind: ContractKind,
    contract: ContractHandle,
    id: U256,
    cin: U256,
) -> Result<CallDescriptor, DispatchError> {
    by_id_and_cin(kind, contract, Entity::Scholarship, Operation::Get, id, cin)
}

pub fn pay_scholarship(
    kind: ContractKind,
    contract: ContractHandle,
    id: U256,
    cin: U256,
) -> Result<CallDescriptor, DispatchError> {
    by_id_and_cin(kind, contract, Entity::Scholarship, Operation::Pay, id, cin)
}

pub fn delete_scholarship(
    kind: ContractKind,
    contract: ContractHandle,
    id: U256,
    cin: U256,
) -> Result<CallDescriptor, DispatchError> {
    by_id_and_cin(kind, contract, Entity::Scholarship, Operation::Delete, id, cin)
}

/// Ids of every fee or scholarship recorded for `cin`.
pub fn get_all_by_cin(
    kind: ContractKind,
    contract: ContractHandle,
    entity: Entity,
    cin: U256,
) -> Result<CallDescriptor, DispatchError> {
    descriptor(kind, contract, entity, Operation::GetAllByCin, vec![cin.into()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{entities::update, types::CallKind};

    #[test]
    fn scholarships_are_shared_by_university_and_oou() -> anyhow::Result<()> {
        let contract = ContractHandle::new(0, 0, 4001);
        let id = U256::from(1u64);
        let cin = U256::from(11_223_344u64);

        for kind in [ContractKind::University, ContractKind::Oou] {
            let get = get_scholarship(kind, contract, id, cin)?;
            assert_eq!(get.function(), "getScholarshipDetails");
            assert_eq!(get.kind(), CallKind::Query);
            assert_eq!(pay_scholarship(kind, contract, id, cin)?.function(), "payScholarship");
            assert_eq!(
                delete_scholarship(kind, contract, id, cin)?.function(),
                "deleteScholarship"
            );
            assert_eq!(
                get_all_by_cin(kind, contract, Entity::Scholarship, cin)?.function(),
                "getAllScholarshipsByCIN"
            );
        }
        Ok(())
    }

    #[test]
    fn tuition_fees_only_exist_at_universities() -> anyhow::Result<()> {
        let contract = ContractHandle::new(0, 0, 4001);
        let cin = U256::from(11_223_344u64);

        assert_eq!(pay_fees(contract, U256::from(2u64), cin)?.parameters().len(), 2);
        assert!(get_all_by_cin(ContractKind::Oou, contract, Entity::TuitionFee, cin).is_err());
        Ok(())
    }

    #[test]
    fn scholarship_update_leads_with_id() -> anyhow::Result<()> {
        let scholarship = Scholarship {
            cin: U256::from(11_223_344u64),
            amount: U256::from(250u64),
            beginning_date: U256::from(1_725_148_800u64),
            end_date: U256::from(1_751_328_000u64),
        };
        let contract = ContractHandle::new(0, 0, 4002);
        let descriptor = update(ContractKind::Oou, contract, U256::from(3u64), &scholarship)?;
        assert_eq!(descriptor.function(), "updateScholarshipDetails");
        assert_eq!(descriptor.parameters()[0], TypedValue::uint(3));
        assert_eq!(descriptor.parameters()[1], TypedValue::uint(11_223_344));
        Ok(())
    }
}
