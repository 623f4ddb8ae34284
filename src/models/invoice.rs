//! Invoice model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{Client, LineItem};

/// Invoice header row.
///
/// `invoice_number` is the human-facing identifier (`<year>-<5-digit-seq>`),
/// assigned exactly once at creation and strictly increasing across the
/// whole store; the year prefix is cosmetic, there is no per-year reset.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Invoice {
    pub invoice_id: i64,
    pub invoice_number: String,
    pub client_id: i64,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub notes: Option<String>,
    pub tax_rate: f64,
    pub status: String,
    /// Set once rendering completes.
    pub pdf_path: Option<String>,
}

/// Input for inserting an invoice header. The number comes from the
/// sequence counter, never from user input.
#[derive(Debug, Clone)]
pub struct CreateInvoice {
    pub invoice_number: String,
    pub client_id: i64,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub notes: Option<String>,
    pub tax_rate: f64,
}

/// A fully hydrated invoice: header, owning client, and line items in
/// creation order. This is what the renderer consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceWithItems {
    pub invoice: Invoice,
    pub client: Client,
    pub items: Vec<LineItem>,
}

impl InvoiceWithItems {
    /// Sum of all line totals, unrounded.
    pub fn subtotal(&self) -> f64 {
        self.items.iter().map(LineItem::line_total).sum()
    }

    pub fn tax(&self) -> f64 {
        self.subtotal() * self.invoice.tax_rate
    }

    pub fn total(&self) -> f64 {
        self.subtotal() + self.tax()
    }
}
