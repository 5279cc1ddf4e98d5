//! Bills kept by utility, internet and hospital contracts, and CNAM claim papers.
//!
//! Stored getters return the record id first and the paid flag last, with the
//! record fields in between in the order they were added.

use alloy_primitives::U256;
use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};

use crate::{
    basic_elements::typed_value::TypedValue,
    types::QueryResult,
};

use super::{Entity, EntityRecord, FromQueryResult, Stored};

fn expect_len(result: &QueryResult, len: usize, what: &str) -> Result<()> {
    ensure!(
        result.len() == len,
        "{} result has {} values, expected {}",
        what,
        result.len(),
        len
    );
    Ok(())
}

/// Electricity (STEG) or water (SONEDE) bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtilityBill {
    pub previous_index: U256,
    pub new_index: U256,
    pub months: U256,
    pub vat: U256,
    pub amount: U256,
    pub description: String,
    pub address: String,
    pub beginning_date: U256,
    pub end_date: U256,
}

impl EntityRecord for UtilityBill {
    const ENTITY: Entity = Entity::UtilityBill;

    fn to_params(&self) -> Vec<TypedValue> {
        vec![
            self.previous_index.into(),
            self.new_index.into(),
            self.months.into(),
            self.vat.into(),
            self.amount.into(),
            self.description.clone().into(),
            self.address.clone().into(),
            self.beginning_date.into(),
            self.end_date.into(),
        ]
    }
}

impl FromQueryResult for Stored<UtilityBill> {
    fn from_result(result: &QueryResult) -> Result<Self> {
        expect_len(result, 11, "Utility bill")?;
        Ok(Stored {
            id: result.get_u256(0)?,
            record: UtilityBill {
                previous_index: result.get_u256(1)?,
                new_index: result.get_u256(2)?,
                months: result.get_u256(3)?,
                vat: result.get_u256(4)?,
                amount: result.get_u256(5)?,
                description: result.get_string(6)?,
                address: result.get_string(7)?,
                beginning_date: result.get_u256(8)?,
                end_date: result.get_u256(9)?,
            },
            paid: result.get_bool(10)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternetBill {
    pub cin: U256,
    pub amount: U256,
    pub description: String,
    pub beginning_date: U256,
    pub end_date: U256,
}

impl EntityRecord for InternetBill {
    const ENTITY: Entity = Entity::InternetBill;

    fn to_params(&self) -> Vec<TypedValue> {
        vec![
            self.cin.into(),
            self.amount.into(),
            self.description.clone().into(),
            self.beginning_date.into(),
            self.end_date.into(),
        ]
    }
}

impl FromQueryResult for Stored<InternetBill> {
    fn from_result(result: &QueryResult) -> Result<Self> {
        expect_len(result, 7, "Internet bill")?;
        Ok(Stored {
            id: result.get_u256(0)?,
            record: InternetBill {
                cin: result.get_u256(1)?,
                amount: result.get_u256(2)?,
                description: result.get_string(3)?,
                beginning_date: result.get_u256(4)?,
                end_date: result.get_u256(5)?,
            },
            paid: result.get_bool(6)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HospitalBill {
    pub patient_name: String,
    pub description: String,
    pub amount: U256,
    pub reception_date: U256,
}

impl EntityRecord for HospitalBill {
    const ENTITY: Entity = Entity::HospitalBill;

    fn to_params(&self) -> Vec<TypedValue> {
        vec![
            self.patient_name.clone().into(),
            self.description.clone().into(),
            self.amount.into(),
            self.reception_date.into(),
        ]
    }
}

impl FromQueryResult for Stored<HospitalBill> {
    fn from_result(result: &QueryResult) -> Result<Self> {
        expect_len(result, 6, "Hospital bill")?;
        Ok(Stored {
            id: result.get_u256(0)?,
            record: HospitalBill {
                patient_name: result.get_string(1)?,
                description: result.get_string(2)?,
                amount: result.get_u256(3)?,
                reception_date: result.get_u256(4)?,
            },
            paid: result.get_bool(5)?,
        })
    }
}

/// Health insurance claim. Papers are keyed by the claim id chosen on add.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimPaper {
    pub id_claim: U256,
    pub person_name: String,
    pub description: String,
    pub amount: U256,
    pub reception_date: U256,
}

impl EntityRecord for ClaimPaper {
    const ENTITY: Entity = Entity::ClaimPaper;

    fn to_params(&self) -> Vec<TypedValue> {
        vec![
            self.id_claim.into(),
            self.person_name.clone().into(),
            self.description.clone().into(),
            self.amount.into(),
            self.reception_date.into(),
        ]
    }

    // updatePaper takes the claim id in place of the stored one.
    fn update_params(&self, id: U256) -> Vec<TypedValue> {
        let mut params = self.to_params();
        params[0] = id.into();
        params
    }
}

impl FromQueryResult for Stored<ClaimPaper> {
    fn from_result(result: &QueryResult) -> Result<Self> {
        expect_len(result, 6, "Claim paper")?;
        let id = result.get_u256(0)?;
        Ok(Stored {
            id,
            record: ClaimPaper {
                id_claim: id,
                person_name: result.get_string(1)?,
                description: result.get_string(2)?,
                amount: result.get_u256(3)?,
                reception_date: result.get_u256(4)?,
            },
            paid: result.get_bool(5)?,
        })
    }
}
