//! Invoice Model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Invoice status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Sent,
    Paid,
    Overdue,
    Cancelled,
}

/// Invoice line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItem {
    pub description: String,
    pub quantity: u32,
    pub unit_price: f64,
}

impl InvoiceItem {
    pub fn total(&self) -> f64 {
        f64::from(self.quantity) * self.unit_price
    }
}

/// Invoice entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub booking_id: Option<String>,
    pub client_name: String,
    #[serde(default)]
    pub client_email: Option<String>,
    #[serde(default)]
    pub items: Vec<InvoiceItem>,
    #[serde(default)]
    pub tax_rate: f64,
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub status: InvoiceStatus,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Create invoice payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceCreate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<String>,
    pub client_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_email: Option<String>,
    pub items: Vec<InvoiceItem>,
    pub tax_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl InvoiceCreate {
    pub fn subtotal(&self) -> f64 {
        self.items.iter().map(InvoiceItem::total).sum()
    }

    pub fn total(&self) -> f64 {
        let subtotal = self.subtotal();
        subtotal + subtotal * self.tax_rate / 100.0
    }
}

/// Update invoice payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<InvoiceItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<InvoiceStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_totals() {
        let create = InvoiceCreate {
            booking_id: None,
            client_name: "Ada".into(),
            client_email: None,
            items: vec![
                InvoiceItem {
                    description: "DJ set".into(),
                    quantity: 2,
                    unit_price: 300.0,
                },
                InvoiceItem {
                    description: "Lights".into(),
                    quantity: 1,
                    unit_price: 150.0,
                },
            ],
            tax_rate: 10.0,
            due_date: None,
            notes: None,
        };
        assert_eq!(create.subtotal(), 750.0);
        assert_eq!(create.total(), 825.0);
    }

    #[test]
    fn test_update_serializes_only_set_fields() {
        let update = InvoiceUpdate {
            status: Some(InvoiceStatus::Paid),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(update).unwrap(), json!({"status": "paid"}));
    }
}
