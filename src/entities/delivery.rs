//! Delivery company records. Their getters return the fields only, without
//! id or paid flag.

use alloy_primitives::U256;
use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};

use crate::{basic_elements::typed_value::TypedValue, types::QueryResult};

use super::{Entity, EntityRecord, FromQueryResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryFee {
    pub full_name: String,
    pub phone: U256,
    pub product_ids: Vec<U256>,
}

impl EntityRecord for DeliveryFee {
    const ENTITY: Entity = Entity::DeliveryFee;

    fn to_params(&self) -> Vec<TypedValue> {
        vec![
            self.full_name.clone().into(),
            self.phone.into(),
            self.product_ids.clone().into(),
        ]
    }
}

impl FromQueryResult for DeliveryFee {
    fn from_result(result: &QueryResult) -> Result<Self> {
        ensure!(result.len() == 3, "Fees result has {} values, expected 3", result.len());
        Ok(Self {
            full_name: result.get_string(0)?,
            phone: result.get_u256(1)?,
            product_ids: result.get_u256_array(2)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub quantity: U256,
    pub price: U256,
    pub location: String,
}

impl EntityRecord for Product {
    const ENTITY: Entity = Entity::Product;

    fn to_params(&self) -> Vec<TypedValue> {
        vec![
            self.name.clone().into(),
            self.quantity.into(),
            self.price.into(),
            self.location.clone().into(),
        ]
    }
}

impl FromQueryResult for Product {
    fn from_result(result: &QueryResult) -> Result<Self> {
        ensure!(result.len() == 4, "Product result has {} values, expected 4", result.len());
        Ok(Self {
            name: result.get_string(0)?,
            quantity: result.get_u256(1)?,
            price: result.get_u256(2)?,
            location: result.get_string(3)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub stars: U256,
    pub comment: String,
}

impl EntityRecord for Rating {
    const ENTITY: Entity = Entity::Rating;

    fn to_params(&self) -> Vec<TypedValue> {
        vec![self.stars.into(), self.comment.clone().into()]
    }
}

impl FromQueryResult for Rating {
    fn from_result(result: &QueryResult) -> Result<Self> {
        ensure!(result.len() == 2, "Rating result has {} values, expected 2", result.len());
        Ok(Self {
            stars: result.get_u256(0)?,
            comment: result.get_string(1)?,
        })
    }
}
