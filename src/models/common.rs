use serde::{Deserialize, Serialize};

/// Seller identity printed in the top-right header column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShopIdentity {
    pub name: String,
    pub address: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl BillingDetails {
    /// Lines in print order.
    pub fn lines(&self) -> [&str; 4] {
        [&self.name, &self.email, &self.phone, &self.address]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingDetails {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub country: String,
}

impl ShippingDetails {
    pub fn lines(&self) -> [&str; 4] {
        [&self.name, &self.phone, &self.address, &self.country]
    }
}
