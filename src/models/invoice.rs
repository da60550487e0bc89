use serde::{Deserialize, Serialize};

use super::{BillingDetails, ShippingDetails, ShopIdentity};
use crate::core::{ServiceError, ServiceResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLineItem {
    pub product: String,
    pub quantity: u32,
    pub price: f64,
    /// Line total as computed by the caller; printed as-is.
    pub total: f64,
}

/// Invoice body as posted to `/api/generate-invoice`.
///
/// Every field is optional at this stage so missing data can be reported
/// as a validation failure instead of a deserialization error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvoicePayload {
    #[serde(deserialize_with = "string_or_number")]
    pub invoice_number: Option<String>,
    pub shop_name: Option<String>,
    pub shop_address: Option<String>,
    pub shop_email: Option<String>,
    pub shop_phone: Option<String>,
    pub billing_details: Option<BillingDetails>,
    pub shipping_details: Option<ShippingDetails>,
    pub items: Option<Vec<InvoiceLineItem>>,
    pub subtotal: Option<f64>,
    pub shipping: Option<f64>,
    pub total: Option<f64>,
    pub payment_method: Option<String>,
    pub transaction_id: Option<String>,
    pub footer_note: Option<String>,
}

/// A validated invoice, ready to be laid out.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDocument {
    pub invoice_number: String,
    pub shop: ShopIdentity,
    pub billing: BillingDetails,
    pub shipping_party: ShippingDetails,
    pub items: Vec<InvoiceLineItem>,
    pub subtotal: f64,
    pub shipping_cost: f64,
    /// Grand total supplied by the caller. Never recomputed.
    pub total: f64,
    pub payment_method: String,
    pub transaction_id: String,
    pub footer_note: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Text(String),
    Number(serde_json::Number),
}

/// Invoice numbers arrive as either `"INV-7"` or `7`.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<StringOrNumber>::deserialize(deserializer)?.map(|value| match value {
        StringOrNumber::Text(text) => text,
        StringOrNumber::Number(number) => number.to_string(),
    }))
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().map(|v| !v.trim().is_empty()).unwrap_or(false)
}

impl InvoicePayload {
    /// Names of the required fields that are absent or empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !present(&self.invoice_number) {
            missing.push("invoiceNumber");
        }
        if !present(&self.shop_name) {
            missing.push("shopName");
        }
        if self.items.as_ref().map(|items| items.is_empty()).unwrap_or(true) {
            missing.push("items");
        }
        if self.total.is_none() {
            missing.push("total");
        }
        missing
    }

    pub fn validate(self) -> ServiceResult<InvoiceDocument> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(ServiceError::Validation(format!(
                "Missing required invoice data: {}",
                missing.join(", ")
            )));
        }

        if let Some(item) = self
            .items
            .iter()
            .flatten()
            .find(|item| item.quantity == 0 || item.price < 0.0)
        {
            return Err(ServiceError::Validation(format!(
                "Invalid line item '{}': quantity must be positive and price non-negative",
                item.product
            )));
        }

        Ok(InvoiceDocument {
            invoice_number: self.invoice_number.unwrap_or_default(),
            shop: ShopIdentity {
                name: self.shop_name.unwrap_or_default(),
                address: self.shop_address.unwrap_or_default(),
                email: self.shop_email.unwrap_or_default(),
                phone: self.shop_phone.unwrap_or_default(),
            },
            billing: self.billing_details.unwrap_or_default(),
            shipping_party: self.shipping_details.unwrap_or_default(),
            items: self.items.unwrap_or_default(),
            subtotal: self.subtotal.unwrap_or_default(),
            shipping_cost: self.shipping.unwrap_or_default(),
            total: self.total.unwrap_or_default(),
            payment_method: self.payment_method.unwrap_or_default(),
            transaction_id: self.transaction_id.unwrap_or_default(),
            footer_note: self.footer_note.unwrap_or_default(),
        })
    }
}

impl InvoiceDocument {
    /// Name under which the rendered PDF is stored.
    pub fn file_name(&self) -> String {
        format!("invoice-{}.pdf", self.invoice_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: serde_json::Value) -> InvoicePayload {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn accepts_minimal_invoice() {
        let doc = payload(json!({
            "invoiceNumber": "INV-1",
            "shopName": "Corner Shop",
            "items": [{ "product": "Mug", "quantity": 1, "price": 100.0, "total": 100.0 }],
            "total": 100.0
        }))
        .validate()
        .unwrap();

        assert_eq!(doc.invoice_number, "INV-1");
        assert_eq!(doc.items.len(), 1);
        assert_eq!(doc.billing, BillingDetails::default());
        assert_eq!(doc.file_name(), "invoice-INV-1.pdf");
    }

    #[test]
    fn numeric_invoice_number_is_accepted() {
        let doc = payload(json!({
            "invoiceNumber": 123,
            "shopName": "Corner Shop",
            "items": [{ "product": "Mug", "quantity": 1, "price": 1.0, "total": 1.0 }],
            "total": 1.0
        }))
        .validate()
        .unwrap();

        assert_eq!(doc.invoice_number, "123");
        assert_eq!(doc.file_name(), "invoice-123.pdf");
    }

    #[test]
    fn reports_every_missing_field() {
        let missing = payload(json!({ "shopName": "Corner Shop" })).missing_fields();
        assert_eq!(missing, vec!["invoiceNumber", "items", "total"]);
    }

    #[test]
    fn empty_items_are_missing() {
        let err = payload(json!({
            "invoiceNumber": "INV-1",
            "shopName": "Corner Shop",
            "items": [],
            "total": 0
        }))
        .validate()
        .unwrap_err();

        assert!(matches!(err, ServiceError::Validation(ref msg) if msg.contains("items")));
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let err = payload(json!({
            "invoiceNumber": "INV-1",
            "shopName": "Corner Shop",
            "items": [{ "product": "Mug", "quantity": 0, "price": 1.0, "total": 0.0 }],
            "total": 0
        }))
        .validate()
        .unwrap_err();

        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn reads_nested_parties() {
        let doc = payload(json!({
            "invoiceNumber": "INV-7",
            "shopName": "Corner Shop",
            "billingDetails": { "name": "Ada", "email": "ada@example.com" },
            "shippingDetails": { "name": "Ada", "country": "UK" },
            "items": [{ "product": "Mug", "quantity": 2, "price": 4.5, "total": 9.0 }],
            "total": 9
        }))
        .validate()
        .unwrap();

        assert_eq!(doc.billing.lines(), ["Ada", "ada@example.com", "", ""]);
        assert_eq!(doc.shipping_party.country, "UK");
    }
}
