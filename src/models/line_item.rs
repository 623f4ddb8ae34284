//! Line item model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One billable entry on an invoice.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LineItem {
    pub item_id: i64,
    pub invoice_id: i64,
    pub description: String,
    pub qty: f64,
    pub unit_price: f64,
    /// Open tag, `Labor`/`Materials` by convention. Stored verbatim, not
    /// an enforced enum.
    pub category: String,
}

impl LineItem {
    pub fn line_total(&self) -> f64 {
        self.qty * self.unit_price
    }
}

/// Input for appending a line item to an invoice.
#[derive(Debug, Clone)]
pub struct CreateLineItem {
    pub description: String,
    pub qty: f64,
    pub unit_price: f64,
    pub category: String,
}
