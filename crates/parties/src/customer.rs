use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult, Entity, id_newtype};

/// Customer identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(i64);

id_newtype!(CustomerId, "CustomerId");

/// A customer able to place orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    id: CustomerId,
    name: String,
    contact_name: Option<String>,
    country: Option<String>,
}

impl Customer {
    pub fn new(
        id: CustomerId,
        name: impl Into<String>,
        contact_name: Option<String>,
        country: Option<String>,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        Ok(Self {
            id,
            name,
            contact_name,
            country,
        })
    }

    pub fn id_typed(&self) -> CustomerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contact_name(&self) -> Option<&str> {
        self.contact_name.as_deref()
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }
}

impl Entity for Customer {
    type Id = CustomerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_blank_name() {
        let err = Customer::new(CustomerId::new(1), "", None, None).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn optional_fields_are_preserved() {
        let customer = Customer::new(
            CustomerId::new(7),
            "Alfreds Futterkiste",
            Some("Maria Anders".to_string()),
            Some("Germany".to_string()),
        )
        .unwrap();

        assert_eq!(customer.id_typed(), CustomerId::new(7));
        assert_eq!(customer.contact_name(), Some("Maria Anders"));
        assert_eq!(customer.country(), Some("Germany"));
    }
}
