//! User directory records, reduced to the party options offered when
//! authoring an invoice.

use qikspare_core::PartyId;
use qikspare_invoicing::{PartyInfo, PartyRole};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UsersResponse {
    #[serde(default)]
    pub users: Vec<UserRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "_id", alias = "id", default, deserialize_with = "loose_string")]
    pub id: String,
    #[serde(default = "unknown_role")]
    pub role: PartyRole,
    #[serde(default, deserialize_with = "loose_string")]
    pub full_name: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub username: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub phone: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub email: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub gstin: String,
    #[serde(default)]
    pub location: Option<Location>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default, deserialize_with = "loose_string")]
    pub address_line: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub city: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub state: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub pincode: String,
}

impl Location {
    /// Non-empty parts joined with `", "`.
    pub fn formatted(&self) -> String {
        [&self.address_line, &self.city, &self.state, &self.pincode]
            .into_iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl UserRecord {
    pub fn display_name(&self) -> &str {
        if self.full_name.trim().is_empty() {
            &self.username
        } else {
            &self.full_name
        }
    }

    pub fn to_party(&self) -> PartyInfo {
        PartyInfo {
            id: PartyId::new(&self.id).ok(),
            name: self.display_name().to_string(),
            phone: self.phone.clone(),
            email: self.email.clone(),
            address: self.location.as_ref().map(Location::formatted).unwrap_or_default(),
            gstin: Some(self.gstin.trim().to_string()).filter(|g| !g.is_empty()),
        }
    }
}

/// Party options for `role`, in directory order.
pub fn parties_with_role(users: &[UserRecord], role: PartyRole) -> Vec<PartyInfo> {
    users
        .iter()
        .filter(|u| u.role == role)
        .map(UserRecord::to_party)
        .collect()
}

fn unknown_role() -> PartyRole {
    PartyRole::Other
}

/// Strings, numbers (pincodes) and nulls all become text.
fn loose_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> Vec<UserRecord> {
        let body = r#"{"users":[
            {"_id":"g1","role":"garage","full_name":"Sai Motors","phone":"98765","email":"sai@example.com",
             "location":{"addressLine":"12 MG Road","city":"Pune","state":"","pincode":411001}},
            {"_id":"v1","role":"vendor","full_name":"","username":"partshub","gstin":"27AAAAA0000A1Z5","location":null},
            {"_id":"d1","role":"delivery","full_name":"Ravi"},
            {"_id":"s1","role":"support","username":"helpdesk"}
        ]}"#;
        serde_json::from_str::<UsersResponse>(body).unwrap().users
    }

    #[test]
    fn garages_map_to_buyer_parties() {
        let garages = parties_with_role(&users(), PartyRole::Garage);
        assert_eq!(garages.len(), 1);
        let g = &garages[0];
        assert_eq!(g.id.as_ref().map(|id| id.as_str()), Some("g1"));
        assert_eq!(g.name, "Sai Motors");
        assert_eq!(g.address, "12 MG Road, Pune, 411001");
        assert_eq!(g.gstin, None);
    }

    #[test]
    fn vendors_fall_back_to_username() {
        let vendors = parties_with_role(&users(), PartyRole::Vendor);
        assert_eq!(vendors[0].name, "partshub");
        assert_eq!(vendors[0].address, "");
        assert_eq!(vendors[0].gstin.as_deref(), Some("27AAAAA0000A1Z5"));
    }

    #[test]
    fn unknown_roles_are_never_offered() {
        let all = users();
        assert_eq!(all[3].role, PartyRole::Other);
        assert!(parties_with_role(&all, PartyRole::Admin).is_empty());
    }
}
