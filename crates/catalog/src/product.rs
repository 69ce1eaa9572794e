use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult, Entity, id_newtype};

/// Product identifier.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ProductId(i64);

id_newtype!(ProductId, "ProductId");

/// A sellable catalog item.
///
/// `stock_quantity` is the only shared mutable field in the system and must
/// never go negative. All stock reductions go through [`Product::apply_decrement`],
/// the compare-and-decrement primitive the stores build their conditional
/// update on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: String,
    /// Price in smallest currency unit (e.g., cents).
    unit_price: u64,
    stock_quantity: i64,
}

impl Product {
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        unit_price: u64,
        stock_quantity: i64,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if stock_quantity < 0 {
            return Err(DomainError::invariant("stock_quantity cannot be negative"));
        }
        Ok(Self {
            id,
            name,
            unit_price,
            stock_quantity,
        })
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit_price(&self) -> u64 {
        self.unit_price
    }

    pub fn stock_quantity(&self) -> i64 {
        self.stock_quantity
    }

    /// Whether a request for `quantity` units could be satisfied right now.
    ///
    /// Advisory only: stock may be consumed concurrently between this check
    /// and the decrement. The decrement itself re-checks.
    pub fn can_fulfill(&self, quantity: i64) -> bool {
        quantity > 0 && quantity <= self.stock_quantity
    }

    /// Conditionally decrement stock by `quantity`.
    ///
    /// Applies only if the result would stay non-negative; returns whether it
    /// was applied. Non-positive quantities are never applied.
    pub fn apply_decrement(&mut self, quantity: i64) -> bool {
        if !self.can_fulfill(quantity) {
            return false;
        }
        self.stock_quantity -= quantity;
        true
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_product(stock: i64) -> Product {
        Product::new(ProductId::new(1), "Widget", 500, stock).unwrap()
    }

    #[test]
    fn new_rejects_empty_name() {
        let err = Product::new(ProductId::new(1), "  ", 500, 10).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn new_rejects_negative_stock() {
        let err = Product::new(ProductId::new(1), "Widget", 500, -1).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn decrement_within_stock_is_applied() {
        let mut product = test_product(10);
        assert!(product.apply_decrement(3));
        assert_eq!(product.stock_quantity(), 7);
    }

    #[test]
    fn decrement_beyond_stock_is_rejected_and_leaves_stock_unchanged() {
        let mut product = test_product(2);
        assert!(!product.apply_decrement(5));
        assert_eq!(product.stock_quantity(), 2);
    }

    #[test]
    fn decrement_of_exact_stock_drains_to_zero() {
        let mut product = test_product(4);
        assert!(product.apply_decrement(4));
        assert_eq!(product.stock_quantity(), 0);
        assert!(!product.apply_decrement(1));
    }

    #[test]
    fn non_positive_decrements_are_rejected() {
        let mut product = test_product(10);
        assert!(!product.apply_decrement(0));
        assert!(!product.apply_decrement(-3));
        assert_eq!(product.stock_quantity(), 10);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 1000,
                ..ProptestConfig::default()
            })]

            /// Property: stock never goes negative under any decrement sequence.
            #[test]
            fn stock_never_negative(
                initial in 0i64..10_000,
                quantities in proptest::collection::vec(-100i64..1_000, 0..50)
            ) {
                let mut product = Product::new(
                    ProductId::new(1), "Widget", 500, initial,
                ).unwrap();

                for qty in quantities {
                    product.apply_decrement(qty);
                    prop_assert!(product.stock_quantity() >= 0);
                }
            }

            /// Property: stock is conserved — initial minus the applied
            /// quantities equals the final stock.
            #[test]
            fn applied_decrements_account_for_all_stock(
                initial in 0i64..10_000,
                quantities in proptest::collection::vec(1i64..1_000, 0..50)
            ) {
                let mut product = Product::new(
                    ProductId::new(1), "Widget", 500, initial,
                ).unwrap();

                let mut applied = 0i64;
                for qty in quantities {
                    if product.apply_decrement(qty) {
                        applied += qty;
                    }
                }
                prop_assert_eq!(product.stock_quantity(), initial - applied);
            }

            /// Property: a decrement is applied iff it fits in current stock.
            #[test]
            fn decrement_applied_iff_it_fits(
                initial in 0i64..1_000,
                qty in 1i64..2_000
            ) {
                let mut product = Product::new(
                    ProductId::new(1), "Widget", 500, initial,
                ).unwrap();

                let fits = qty <= initial;
                prop_assert_eq!(product.apply_decrement(qty), fits);
            }
        }
    }
}
