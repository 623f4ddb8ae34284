//! Shared test harness: a fresh database and settings in a temp dir per
//! test.

#![allow(dead_code)]

use chrono::NaiveDate;
use tempfile::TempDir;

use invoicer::config::Settings;
use invoicer::models::{CreateClient, CreateLineItem};
use invoicer::services::assembler::InvoiceDraft;
use invoicer::services::Database;

pub struct TestApp {
    pub db: Database,
    pub settings: Settings,
    /// Holds the temp dir open for the lifetime of the test.
    _dir: TempDir,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");

        let mut settings = Settings::default();
        settings.storage.db_path = dir.path().join("invoicer.db");
        settings.storage.output_dir = dir.path().join("invoices");
        settings.business.logo_path = dir.path().join("no-logo.png");

        let db = Database::new(&settings.storage.db_path)
            .await
            .expect("Failed to open database");
        db.run_migrations().await.expect("Failed to run migrations");

        Self {
            db,
            settings,
            _dir: dir,
        }
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub fn labor_item(description: &str, qty: f64, unit_price: f64) -> CreateLineItem {
    CreateLineItem {
        description: description.to_string(),
        qty,
        unit_price,
        category: "Labor".to_string(),
    }
}

pub fn material_item(description: &str, qty: f64, unit_price: f64) -> CreateLineItem {
    CreateLineItem {
        description: description.to_string(),
        qty,
        unit_price,
        category: "Materials".to_string(),
    }
}

/// A draft issued 2026-03-10, due two weeks later, at 10.25% tax.
pub fn simple_draft(client_id: i64, items: Vec<CreateLineItem>) -> InvoiceDraft {
    InvoiceDraft {
        client_id,
        issue_date: date(2026, 3, 10),
        due_date: date(2026, 3, 24),
        tax_rate: 0.1025,
        notes: None,
        items,
    }
}

pub async fn seed_client(db: &Database, name: &str) -> i64 {
    db.create_client(&CreateClient {
        name: name.to_string(),
        phone: None,
        email: None,
        address: None,
    })
    .await
    .expect("Failed to create client")
}
