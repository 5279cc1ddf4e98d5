use serde::{Deserialize, Serialize};

use crate::{
    basic_elements::typed_value::TypedValue,
    error::DispatchError,
    types::{CallDescriptor, ContractHandle},
};

use super::{ContractKind, Entity, Operation, descriptor};

/// Owner and display name every institution contract is deployed with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstitutionDetails {
    pub owner: String,
    pub name: String,
}

impl InstitutionDetails {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Constructor arguments in deployment order.
    pub fn constructor_params(&self) -> Vec<TypedValue> {
        vec![
            TypedValue::string(self.owner.clone()),
            TypedValue::string(self.name.clone()),
        ]
    }
}

pub fn get_owner(
    kind: ContractKind,
    contract: ContractHandle,
) -> Result<CallDescriptor, DispatchError> {
    descriptor(kind, contract, Entity::Institution, Operation::GetOwner, Vec::new())
}

pub fn get_name(
    kind: ContractKind,
    contract: ContractHandle,
) -> Result<CallDescriptor, DispatchError> {
    descriptor(kind, contract, Entity::Institution, Operation::GetName, Vec::new())
}

pub fn update_details(
    kind: ContractKind,
    contract: ContractHandle,
    details: &InstitutionDetails,
) -> Result<CallDescriptor, DispatchError> {
    descriptor(
        kind,
        contract,
        Entity::Institution,
        Operation::UpdateDetails,
        details.constructor_params(),
    )
}

pub fn delete(kind: ContractKind, contract: ContractHandle) -> Result<CallDescriptor, DispatchError> {
    descriptor(
        kind,
        contract,
        Entity::Institution,
        Operation::DeleteInstitution,
        Vec::new(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CallKind;

    #[test]
    fn institution_functions_follow_the_contract_kind() -> anyhow::Result<()> {
        let contract = ContractHandle::new(0, 0, 2001);

        let owner = get_owner(ContractKind::Steg, contract)?;
        assert_eq!(owner.function(), "getSTEGOwner");
        assert_eq!(owner.kind(), CallKind::Query);

        let name = get_name(ContractKind::Internet, contract)?;
        assert_eq!(name.function(), "getOperatorName");

        let details = InstitutionDetails::new("0.0.1001", "Tunis North");
        let update = update_details(ContractKind::Oou, contract, &details)?;
        assert_eq!(update.function(), "updateOOURegion");
        assert_eq!(update.kind(), CallKind::Execute);
        assert_eq!(update.parameters(), details.constructor_params().as_slice());

        assert_eq!(delete(ContractKind::Delivery, contract)?.function(), "deleteCompany");
        Ok(())
    }

    #[test]
    fn person_registry_has_no_institution_functions() {
        let contract = ContractHandle::new(0, 0, 2001);
        assert!(matches!(
            get_owner(ContractKind::PersonRegistry, contract),
            Err(DispatchError::Validation { .. })
        ));
    }
}
