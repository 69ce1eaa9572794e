use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult, Entity, id_newtype};

/// Shipper identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShipperId(i64);

id_newtype!(ShipperId, "ShipperId");

/// A carrier that can be assigned to an order. Optional on placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shipper {
    id: ShipperId,
    name: String,
    shipper_code: Option<String>,
}

impl Shipper {
    pub fn new(
        id: ShipperId,
        name: impl Into<String>,
        shipper_code: Option<String>,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        Ok(Self {
            id,
            name,
            shipper_code,
        })
    }

    pub fn id_typed(&self) -> ShipperId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shipper_code(&self) -> Option<&str> {
        self.shipper_code.as_deref()
    }
}

impl Entity for Shipper {
    type Id = ShipperId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_blank_name() {
        let err = Shipper::new(ShipperId::new(1), "   ", None).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn code_is_optional() {
        let shipper = Shipper::new(ShipperId::new(2), "Speedy Express", None).unwrap();
        assert_eq!(shipper.shipper_code(), None);
    }
}
