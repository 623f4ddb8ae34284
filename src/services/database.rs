//! Database service: schema management and all durable state.

use crate::error::AppError;
use crate::models::{
    Client, CreateClient, CreateInvoice, CreateLineItem, Invoice, InvoiceWithItems, LineItem,
};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, instrument};

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if missing) the SQLite database at `db_path`.
    ///
    /// The parent directory is created on demand. WAL journaling and a busy
    /// timeout keep interleaved writers safe; foreign keys are enforced.
    #[instrument(skip(db_path))]
    pub async fn new(db_path: &Path) -> Result<Self, AppError> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Invalid database path: {}", e)))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!(db_path = %db_path.display(), "SQLite connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// Run database migrations. Idempotent, safe on every startup; also
    /// seeds the invoice sequence counter.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Client Operations
    // -------------------------------------------------------------------------

    /// Create a new client and return its id.
    ///
    /// The name is stored trimmed and must be non-empty; there is no
    /// uniqueness constraint on name or email.
    #[instrument(skip(self, input))]
    pub async fn create_client(&self, input: &CreateClient) -> Result<i64, AppError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(AppError::ValidationError(
                "Client name must not be empty".to_string(),
            ));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO clients (name, phone, email, address)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(name)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.address)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to create client: {}", e)))?;

        let client_id = result.last_insert_rowid();

        info!(client_id, name = %name, "Client created");

        Ok(client_id)
    }

    /// Get a client by id.
    #[instrument(skip(self))]
    pub async fn get_client(&self, client_id: i64) -> Result<Client, AppError> {
        sqlx::query_as::<_, Client>(
            r#"
            SELECT client_id, name, phone, email, address
            FROM clients
            WHERE client_id = ?
            "#,
        )
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get client: {}", e)))?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Client {} not found", client_id)))
    }

    /// List all clients, ordered lexicographically by name.
    #[instrument(skip(self))]
    pub async fn list_clients(&self) -> Result<Vec<Client>, AppError> {
        sqlx::query_as::<_, Client>(
            r#"
            SELECT client_id, name, phone, email, address
            FROM clients
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list clients: {}", e)))
    }

    // -------------------------------------------------------------------------
    // Invoice Numbering
    // -------------------------------------------------------------------------

    /// Atomically advance the sequence counter and return the next invoice
    /// number, formatted `<year>-<5-digit-seq>` from the new counter value
    /// (the first number ever issued has sequence 1).
    ///
    /// The single UPDATE .. RETURNING statement is the whole read-modify-
    /// write, so interleaved callers can never observe the same value.
    /// Numbers are global: the year prefix is cosmetic, not a per-year
    /// reset, and issued numbers are never reused even when a later step
    /// fails.
    #[instrument(skip(self))]
    pub async fn next_invoice_number(&self, year: i32) -> Result<String, AppError> {
        let row: Option<(i64,)> = sqlx::query_as(
            r#"
            UPDATE counters
            SET value = value + 1
            WHERE key = 'invoice_seq'
            RETURNING value
            "#,
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to advance invoice sequence: {}", e))
        })?;

        let (seq,) = row.ok_or_else(|| {
            AppError::DatabaseError(anyhow::anyhow!(
                "invoice_seq counter row missing; run migrations first"
            ))
        })?;

        let number = format!("{}-{:05}", year, seq);

        info!(number = %number, "Invoice number issued");

        Ok(number)
    }

    // -------------------------------------------------------------------------
    // Invoice Operations
    // -------------------------------------------------------------------------

    /// Insert an invoice header and return its id.
    #[instrument(skip(self, input), fields(invoice_number = %input.invoice_number))]
    pub async fn create_invoice(&self, input: &CreateInvoice) -> Result<i64, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO invoices (invoice_number, client_id, issue_date, due_date, notes, tax_rate)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&input.invoice_number)
        .bind(input.client_id)
        .bind(input.issue_date)
        .bind(input.due_date)
        .bind(&input.notes)
        .bind(input.tax_rate)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(anyhow::anyhow!(
                    "Invoice number {} already exists",
                    input.invoice_number
                ))
            }
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                AppError::ReferenceError(anyhow::anyhow!(
                    "Client {} does not exist",
                    input.client_id
                ))
            }
            _ => AppError::DatabaseError(anyhow::anyhow!("Failed to create invoice: {}", e)),
        })?;

        let invoice_id = result.last_insert_rowid();

        info!(invoice_id, number = %input.invoice_number, "Invoice created");

        Ok(invoice_id)
    }

    /// Append one line item to an invoice and return the item id. Items
    /// keep their insertion order.
    #[instrument(skip(self, input))]
    pub async fn add_item(&self, invoice_id: i64, input: &CreateLineItem) -> Result<i64, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO invoice_items (invoice_id, description, qty, unit_price, category)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(invoice_id)
        .bind(&input.description)
        .bind(input.qty)
        .bind(input.unit_price)
        .bind(&input.category)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                AppError::ReferenceError(anyhow::anyhow!("Invoice {} does not exist", invoice_id))
            }
            _ => AppError::DatabaseError(anyhow::anyhow!("Failed to add line item: {}", e)),
        })?;

        let item_id = result.last_insert_rowid();

        info!(item_id, invoice_id, "Line item added");

        Ok(item_id)
    }

    /// Fetch an invoice with its client and its line items in creation
    /// order.
    #[instrument(skip(self))]
    pub async fn get_invoice_with_items(
        &self,
        invoice_id: i64,
    ) -> Result<InvoiceWithItems, AppError> {
        let invoice = sqlx::query_as::<_, Invoice>(
            r#"
            SELECT invoice_id, invoice_number, client_id, issue_date, due_date,
                   notes, tax_rate, status, pdf_path
            FROM invoices
            WHERE invoice_id = ?
            "#,
        )
        .bind(invoice_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get invoice: {}", e)))?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Invoice {} not found", invoice_id)))?;

        let items = sqlx::query_as::<_, LineItem>(
            r#"
            SELECT item_id, invoice_id, description, qty, unit_price, category
            FROM invoice_items
            WHERE invoice_id = ?
            ORDER BY item_id
            "#,
        )
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get line items: {}", e)))?;

        let client = sqlx::query_as::<_, Client>(
            r#"
            SELECT client_id, name, phone, email, address
            FROM clients
            WHERE client_id = ?
            "#,
        )
        .bind(invoice.client_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to get invoice client: {}", e))
        })?;

        Ok(InvoiceWithItems {
            invoice,
            client,
            items,
        })
    }

    /// Record the rendered document path on an invoice.
    #[instrument(skip(self, pdf_path))]
    pub async fn set_pdf_path(&self, invoice_id: i64, pdf_path: &str) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE invoices
            SET pdf_path = ?
            WHERE invoice_id = ?
            "#,
        )
        .bind(pdf_path)
        .bind(invoice_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to set PDF path: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(anyhow::anyhow!(
                "Invoice {} not found",
                invoice_id
            )));
        }

        info!(invoice_id, pdf_path = %pdf_path, "Invoice PDF path recorded");

        Ok(())
    }
}
