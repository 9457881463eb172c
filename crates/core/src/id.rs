//! Strongly-typed identifiers used across the domain.
//!
//! Invoice and party identifiers are minted by the backend (opaque strings);
//! invoice numbers and order ids are minted client-side from a caller-supplied
//! timestamp so that tests stay deterministic.

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Backend identifier of a persisted invoice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InvoiceId(String);

/// Backend identifier of a user acting as an invoice party.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PartyId(String);

/// Human-facing invoice number (e.g. `INV-1714557600000`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InvoiceNumber(String);

/// Order reference printed on the platform-fee document (e.g. `ORD-1714557600000`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderId(String);

macro_rules! impl_string_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Wrap an identifier, rejecting blank values.
            pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
                let value = value.into();
                if value.trim().is_empty() {
                    return Err(DomainError::invalid_id(format!("{}: empty", $name)));
                }
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $t {
            type Error = DomainError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$t> for String {
            fn from(id: $t) -> String {
                id.0
            }
        }
    };
}

impl_string_newtype!(InvoiceId, "InvoiceId");
impl_string_newtype!(PartyId, "PartyId");
impl_string_newtype!(InvoiceNumber, "InvoiceNumber");
impl_string_newtype!(OrderId, "OrderId");

impl InvoiceNumber {
    /// `INV-{unix_millis}`.
    pub fn generate(at: DateTime<Utc>) -> Self {
        Self(format!("INV-{}", at.timestamp_millis()))
    }
}

impl OrderId {
    /// `ORD-{unix_millis}`.
    pub fn generate(at: DateTime<Utc>) -> Self {
        Self(format!("ORD-{}", at.timestamp_millis()))
    }
}

/// Identifier of a single export run (used to correlate log lines).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExportId(Uuid);

impl ExportId {
    /// Create a new identifier.
    ///
    /// Uses UUIDv7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ExportId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for ExportId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn blank_ids_are_rejected() {
        assert!(matches!(InvoiceId::new("  "), Err(DomainError::InvalidId(_))));
        assert!("".parse::<PartyId>().is_err());
        assert_eq!(PartyId::new("64f0c2").unwrap().as_str(), "64f0c2");
    }

    #[test]
    fn generated_numbers_use_unix_millis() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        assert_eq!(InvoiceNumber::generate(at).as_str(), "INV-1714557600000");
        assert_eq!(OrderId::generate(at).as_str(), "ORD-1714557600000");
    }

    #[test]
    fn ids_serialize_transparently() {
        let id = InvoiceId::new("abc").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
        assert_eq!(serde_json::from_str::<InvoiceId>("\"abc\"").unwrap(), id);
    }

    #[test]
    fn blank_ids_fail_to_deserialize() {
        assert!(serde_json::from_str::<InvoiceId>("\"\"").is_err());
        assert!(serde_json::from_str::<PartyId>("\"   \"").is_err());
        assert!(serde_json::from_str::<InvoiceNumber>("\"\"").is_err());
        let err = serde_json::from_str::<OrderId>("\"\"").unwrap_err();
        assert!(err.to_string().contains("OrderId: empty"));
    }
}
