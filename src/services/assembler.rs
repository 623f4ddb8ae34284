//! Invoice assembly: draft validation, totals, numbering, and persistence.

use chrono::{Datelike, NaiveDate};
use tracing::{info, instrument};

use crate::error::AppError;
use crate::models::{CreateInvoice, CreateLineItem, InvoiceWithItems};
use crate::services::renderer::{format_qty, money};
use crate::services::Database;

/// Everything the caller chooses about a new invoice. The invoice number
/// is not part of the draft; it is issued by the store during assembly.
#[derive(Debug, Clone)]
pub struct InvoiceDraft {
    pub client_id: i64,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub tax_rate: f64,
    pub notes: Option<String>,
    pub items: Vec<CreateLineItem>,
}

/// Computed invoice amounts. Values are unrounded; rounding happens only
/// when an amount is displayed.
#[derive(Debug, Clone, Copy)]
pub struct Totals {
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
}

/// Compute subtotal, tax, and total for a set of line items.
pub fn compute_totals(items: &[CreateLineItem], tax_rate: f64) -> Totals {
    let subtotal: f64 = items.iter().map(|item| item.qty * item.unit_price).sum();
    let tax = subtotal * tax_rate;
    Totals {
        subtotal,
        tax,
        total: subtotal + tax,
    }
}

/// Standard description for a labor line, e.g.
/// `Painting (3.5 hrs @ $85.00/hr)`.
pub fn labor_description(work: &str, hours: f64, hourly_rate: f64) -> String {
    format!(
        "{} ({} hrs @ {}/hr)",
        work,
        format_qty(hours),
        money(hourly_rate)
    )
}

fn validate_draft(draft: &InvoiceDraft) -> Result<(), AppError> {
    if draft.items.is_empty() {
        return Err(AppError::ValidationError(
            "Invoice must have at least one line item".to_string(),
        ));
    }
    for (index, item) in draft.items.iter().enumerate() {
        if item.description.trim().is_empty() {
            return Err(AppError::ValidationError(format!(
                "Line item {} has an empty description",
                index + 1
            )));
        }
        // The negated comparisons also reject NaN.
        if !(item.qty >= 0.0) {
            return Err(AppError::ValidationError(format!(
                "Line item {} quantity must be a non-negative number",
                index + 1
            )));
        }
        if !(item.unit_price >= 0.0) {
            return Err(AppError::ValidationError(format!(
                "Line item {} unit price must be a non-negative number",
                index + 1
            )));
        }
    }
    Ok(())
}

/// Assemble and persist a complete invoice from a draft.
///
/// The draft is validated before a number is issued, so a rejected draft
/// burns nothing. After that the steps are: issue the next invoice number
/// (year taken from the issue date), insert the header, insert the line
/// items in draft order, and re-read the stored invoice. A header insert
/// that fails after numbering leaves a gap in the sequence; gaps are
/// acceptable, reuse is not.
#[instrument(skip(db, draft), fields(client_id = draft.client_id))]
pub async fn create_invoice(
    db: &Database,
    draft: &InvoiceDraft,
) -> Result<InvoiceWithItems, AppError> {
    validate_draft(draft)?;
    let totals = compute_totals(&draft.items, draft.tax_rate);

    let invoice_number = db.next_invoice_number(draft.issue_date.year()).await?;

    let notes = draft
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);

    let invoice_id = db
        .create_invoice(&CreateInvoice {
            invoice_number,
            client_id: draft.client_id,
            issue_date: draft.issue_date,
            due_date: draft.due_date,
            notes,
            tax_rate: draft.tax_rate,
        })
        .await?;

    for item in &draft.items {
        db.add_item(invoice_id, item).await?;
    }

    info!(
        invoice_id,
        items = draft.items.len(),
        total = totals.total,
        "Invoice assembled"
    );

    db.get_invoice_with_items(invoice_id).await
}
