use qikspare_core::PartyId;
use serde::{Deserialize, Serialize};

use crate::lenient;

/// Role of a user in the directory. Only garages (buyers) and vendors
/// (sellers) take part in invoices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyRole {
    Garage,
    Vendor,
    Delivery,
    Admin,
    #[serde(other)]
    Other,
}

impl PartyRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartyRole::Garage => "garage",
            PartyRole::Vendor => "vendor",
            PartyRole::Delivery => "delivery",
            PartyRole::Admin => "admin",
            PartyRole::Other => "other",
        }
    }
}

impl core::str::FromStr for PartyRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "garage" => Ok(PartyRole::Garage),
            "vendor" => Ok(PartyRole::Vendor),
            "delivery" => Ok(PartyRole::Delivery),
            "admin" => Ok(PartyRole::Admin),
            other => Err(format!("unknown party role: {other}")),
        }
    }
}

/// Contact block printed for the buyer (garage) or seller (vendor).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyInfo {
    #[serde(
        rename = "userId",
        alias = "id",
        alias = "_id",
        alias = "value",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_id"
    )]
    pub id: Option<PartyId>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub phone: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::optional_text")]
    pub gstin: Option<String>,
}

impl PartyInfo {
    /// A party counts as selected once it has a backend id or at least a name.
    pub fn is_selected(&self) -> bool {
        self.id.is_some() || !self.name.trim().is_empty()
    }
}
