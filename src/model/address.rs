use serde::{Deserialize, Serialize};

use super::ids::Id;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddressType {
    #[default]
    Business,
    Billing,
    Shipping,
}

impl AddressType {
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "Business" => Some(AddressType::Business),
            "Billing" => Some(AddressType::Billing),
            "Shipping" => Some(AddressType::Shipping),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            AddressType::Business => "Business",
            AddressType::Billing => "Billing",
            AddressType::Shipping => "Shipping",
        }
    }
}

/// A postal address owned by exactly one record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: Option<Id<Address>>,
    pub street1: Option<String>,
    pub street2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub country: Option<String>,
    /// Free-form address as typed into a single text area.
    pub full_address: Option<String>,
    pub address_type: AddressType,
}

impl Address {
    pub fn business() -> Self {
        Self::default()
    }

    /// A fresh, unsaved copy tagged as a business address.
    pub fn copy_as_business(&self) -> Self {
        Self {
            id: None,
            address_type: AddressType::Business,
            ..self.clone()
        }
    }

    /// Single-line rendering used by exports.
    pub fn full_address_without_line_breaks(&self) -> String {
        if let Some(full) = self.full_address.as_deref().filter(|s| !s.trim().is_empty()) {
            return full
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .collect::<Vec<_>>()
                .join(", ");
        }

        [
            &self.street1,
            &self.street2,
            &self.city,
            &self.state,
            &self.zipcode,
            &self.country,
        ]
        .iter()
        .filter_map(|part| part.as_deref())
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }
}
