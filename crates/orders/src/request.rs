use serde::{Deserialize, Serialize};

use storefront_catalog::ProductId;
use storefront_core::{DomainError, DomainResult};
use storefront_parties::{CustomerId, ShipperId};

/// One (product, quantity) pair within a purchase request.
///
/// No price field: unit prices are captured server-side from the catalog at
/// placement time and are never trusted from the caller.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestedLine {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// A purchase request as it arrives from the (excluded) HTTP layer, already
/// strongly typed. [`PurchaseRequest::validate`] enforces everything that can
/// be checked without touching a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRequest {
    pub customer_id: CustomerId,
    pub shipper_id: Option<ShipperId>,
    pub lines: Vec<RequestedLine>,
}

impl PurchaseRequest {
    /// Shape-level validation; performs no IO.
    pub fn validate(&self) -> DomainResult<()> {
        if self.lines.is_empty() {
            return Err(DomainError::validation(
                "purchase request must contain at least one line",
            ));
        }
        for line in &self.lines {
            if line.quantity <= 0 {
                return Err(DomainError::validation(format!(
                    "quantity for product {} must be positive",
                    line.product_id
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with_lines(lines: Vec<RequestedLine>) -> PurchaseRequest {
        PurchaseRequest {
            customer_id: CustomerId::new(1),
            shipper_id: None,
            lines,
        }
    }

    #[test]
    fn empty_line_list_is_rejected() {
        let err = request_with_lines(vec![]).validate().unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let request = request_with_lines(vec![RequestedLine {
            product_id: ProductId::new(3),
            quantity: 0,
        }]);
        let err = request.validate().unwrap_err();
        match err {
            DomainError::Validation(msg) => assert!(msg.contains("product 3")),
            _ => panic!("expected Validation error"),
        }
    }

    #[test]
    fn negative_quantity_is_rejected() {
        let request = request_with_lines(vec![
            RequestedLine {
                product_id: ProductId::new(1),
                quantity: 2,
            },
            RequestedLine {
                product_id: ProductId::new(2),
                quantity: -1,
            },
        ]);
        assert!(request.validate().is_err());
    }

    #[test]
    fn well_formed_request_passes() {
        let request = PurchaseRequest {
            customer_id: CustomerId::new(1),
            shipper_id: Some(ShipperId::new(4)),
            lines: vec![RequestedLine {
                product_id: ProductId::new(1),
                quantity: 3,
            }],
        };
        assert!(request.validate().is_ok());
    }
}
