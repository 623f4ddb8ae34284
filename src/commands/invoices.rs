//! Invoice commands: create, show, render.

use chrono::{Duration, Local, NaiveDate};

use crate::config::Settings;
use crate::error::AppError;
use crate::models::CreateLineItem;
use crate::services::assembler::{self, InvoiceDraft};
use crate::services::renderer::{self, format_qty, money};

/// One `--labor` argument: a labor line billed by the hour.
#[derive(Debug, Clone)]
pub struct LaborSpec {
    pub description: String,
    pub hours: f64,
    /// Hourly rate override; the configured default applies when absent.
    pub rate: Option<f64>,
}

/// One `--item` argument: a materials or flat-fee line.
#[derive(Debug, Clone)]
pub struct ItemSpec {
    pub description: String,
    pub qty: f64,
    pub unit_price: f64,
    /// Category label; defaults to `Materials`.
    pub category: Option<String>,
}

/// `invoice create`: assemble, persist, and (unless `--no-pdf`) render a
/// new invoice. Labor lines come first, in argument order, then items.
#[allow(clippy::too_many_arguments)]
pub async fn run_create(
    settings: &Settings,
    client_id: i64,
    issue_date: Option<NaiveDate>,
    due_date: Option<NaiveDate>,
    tax_rate: Option<f64>,
    notes: Option<String>,
    labor: Vec<LaborSpec>,
    items: Vec<ItemSpec>,
    no_pdf: bool,
) -> Result<(), AppError> {
    let db = super::open_store(settings).await?;

    let issue_date = issue_date.unwrap_or_else(|| Local::now().date_naive());
    let due_date = due_date.unwrap_or_else(|| issue_date + Duration::days(14));
    let tax_rate = tax_rate.unwrap_or(settings.billing.default_tax_rate);

    let mut line_items = Vec::with_capacity(labor.len() + items.len());
    for spec in labor {
        let rate = spec.rate.unwrap_or(settings.billing.default_hourly_rate);
        line_items.push(CreateLineItem {
            description: assembler::labor_description(&spec.description, spec.hours, rate),
            qty: spec.hours,
            unit_price: rate,
            category: "Labor".to_string(),
        });
    }
    for spec in items {
        line_items.push(CreateLineItem {
            description: spec.description,
            qty: spec.qty,
            unit_price: spec.unit_price,
            category: spec.category.unwrap_or_else(|| "Materials".to_string()),
        });
    }

    let draft = InvoiceDraft {
        client_id,
        issue_date,
        due_date,
        tax_rate,
        notes,
        items: line_items,
    };
    let bundle = assembler::create_invoice(&db, &draft).await?;

    println!(
        "Created invoice {} for {}.",
        bundle.invoice.invoice_number, bundle.client.name
    );
    println!("  Subtotal: {}", money(bundle.subtotal()));
    println!("  Tax:      {}", money(bundle.tax()));
    println!("  Total:    {}", money(bundle.total()));

    if !no_pdf {
        let pdf_path = renderer::render_invoice(settings, &bundle)?;
        db.set_pdf_path(bundle.invoice.invoice_id, &pdf_path.to_string_lossy())
            .await?;
        println!("  PDF:      {}", pdf_path.display());
    }

    Ok(())
}

/// `invoice show`: print one invoice with items and totals.
pub async fn run_show(settings: &Settings, invoice_id: i64, json: bool) -> Result<(), AppError> {
    let db = super::open_store(settings).await?;
    let bundle = db.get_invoice_with_items(invoice_id).await?;

    if json {
        let rendered = serde_json::to_string_pretty(&bundle)
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("Failed to encode JSON: {}", e)))?;
        println!("{}", rendered);
        return Ok(());
    }

    let invoice = &bundle.invoice;
    println!("Invoice {}", invoice.invoice_number);
    println!("Client:  {} (id {})", bundle.client.name, bundle.client.client_id);
    println!("Issued:  {}   Due: {}", invoice.issue_date, invoice.due_date);
    println!("Status:  {}", invoice.status);
    println!();
    for item in &bundle.items {
        println!(
            "  [{}] {}  {} @ {} = {}",
            item.category,
            item.description,
            format_qty(item.qty),
            money(item.unit_price),
            money(item.line_total()),
        );
    }
    println!();
    println!("Subtotal: {}", money(bundle.subtotal()));
    println!(
        "Tax ({:.2}%): {}",
        invoice.tax_rate * 100.0,
        money(bundle.tax())
    );
    println!("Total: {}", money(bundle.total()));
    if let Some(pdf_path) = &invoice.pdf_path {
        println!("PDF: {}", pdf_path);
    }
    Ok(())
}

/// `invoice render`: write (or rewrite) the PDF for a stored invoice.
pub async fn run_render(settings: &Settings, invoice_id: i64) -> Result<(), AppError> {
    let db = super::open_store(settings).await?;
    let bundle = db.get_invoice_with_items(invoice_id).await?;

    let pdf_path = renderer::render_invoice(settings, &bundle)?;
    db.set_pdf_path(bundle.invoice.invoice_id, &pdf_path.to_string_lossy())
        .await?;
    println!("Wrote {}", pdf_path.display());
    Ok(())
}
