//! Strongly-typed identifiers.
//!
//! Every record in the system is keyed by a database-assigned `i64` surrogate
//! key. Each domain crate declares a newtype around that key and implements
//! the common surface with [`id_newtype!`], so a `ProductId` can never be
//! passed where a `CustomerId` is expected.

/// Implement the common identifier surface for an `i64` newtype.
///
/// The newtype itself is declared at the call site (with its derives and
/// `#[serde(transparent)]`); this macro adds constructors, `Display`,
/// `From`/`Into` and a checked `FromStr`.
#[macro_export]
macro_rules! id_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Wrap a raw database key.
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            pub const fn get(&self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $t {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$t> for i64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl core::str::FromStr for $t {
            type Err = $crate::error::DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value: i64 = s.parse().map_err(|e| {
                    $crate::error::DomainError::invalid_id(format!("{}: {}", $name, e))
                })?;
                Ok(Self(value))
            }
        }
    };
}
