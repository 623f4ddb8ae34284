//! # Invoicer CLI (`invoicer`)
//!
//! The `invoicer` binary is the command-line interface for the invoicer
//! core: a local-first client book, gap-tolerant monotonic invoice
//! numbering, and PDF generation.
//!
//! ## Usage
//!
//! ```bash
//! invoicer --config ./invoicer.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `invoicer init` | Create the SQLite database and run schema migrations |
//! | `invoicer client add <name>` | Add a client to the client book |
//! | `invoicer client list` | List clients sorted by name |
//! | `invoicer client show <id>` | Show one client |
//! | `invoicer invoice create` | Assemble, number, persist, and render an invoice |
//! | `invoicer invoice show <id>` | Print a stored invoice with items and totals |
//! | `invoicer invoice render <id>` | Write (or rewrite) the PDF for a stored invoice |
//!
//! ## Examples
//!
//! ```bash
//! # One-time setup
//! invoicer init
//!
//! # Add a client
//! invoicer client add "Amy Pond" --phone 555-0100 --email amy@example.com \
//!     --address $'42 Oak Ave\nSpringfield'
//!
//! # Bill 3.5 hours of painting plus materials, render the PDF
//! invoicer invoice create --client 1 \
//!     --labor "Painting|3.5" \
//!     --item "Paint (gal)|2|38.00" \
//!     --notes "Thanks for the quick turnaround"
//!
//! # Inspect it later
//! invoicer invoice show 1
//! ```

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use invoicer::commands;
use invoicer::commands::invoices::{ItemSpec, LaborSpec};
use invoicer::config::get_configuration;
use invoicer::models::CreateClient;
use invoicer::observability::init_tracing;

/// Invoicer, a local-first invoicing tool for a one-person service
/// business.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/invoicer.example.toml` for a full example. Settings
/// can also be overridden with `INVOICER_`-prefixed environment variables.
#[derive(Parser)]
#[command(
    name = "invoicer",
    about = "Local-first invoicing: client book, monotonic invoice numbers, PDF output",
    version,
    long_about = "Invoicer keeps clients and invoices in a single SQLite file, assigns \
    strictly increasing invoice numbers (<year>-<seq>), and renders finished invoices \
    as US Letter PDFs with your business identity, line items, and tax."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./invoicer.toml`. Business identity, default rates,
    /// and storage paths are read from this file; missing files fall back
    /// to built-in defaults.
    #[arg(long, global = true, default_value = "invoicer.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file, its parent directory, and all
    /// required tables, and seeds the invoice sequence counter. Safe to
    /// run multiple times.
    Init,

    /// Manage the client book.
    Client {
        #[command(subcommand)]
        action: ClientAction,
    },

    /// Create, inspect, and render invoices.
    Invoice {
        #[command(subcommand)]
        action: InvoiceAction,
    },
}

/// Client book subcommands.
#[derive(Subcommand)]
enum ClientAction {
    /// Add a client.
    ///
    /// Only the name is required; phone, email, and address are optional
    /// and appear on rendered invoices when present.
    Add {
        /// Client name (must be non-empty).
        name: String,

        /// Phone number.
        #[arg(long)]
        phone: Option<String>,

        /// Email address.
        #[arg(long)]
        email: Option<String>,

        /// Postal address; embedded newlines become separate lines on the
        /// rendered invoice.
        #[arg(long)]
        address: Option<String>,
    },

    /// List all clients, sorted by name.
    List {
        /// Emit JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Show one client by id.
    Show {
        /// Client id.
        id: i64,

        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}

/// Invoice subcommands.
#[derive(Subcommand)]
enum InvoiceAction {
    /// Create an invoice for a client.
    ///
    /// Labor lines are expanded into descriptions like
    /// `Painting (3.5 hrs @ $85.00/hr)` and billed at the configured
    /// hourly rate unless one is given. The invoice number is assigned
    /// atomically; concurrent creates never collide.
    Create {
        /// Client id (see `invoicer client list`).
        #[arg(long)]
        client: i64,

        /// Issue date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        issue_date: Option<NaiveDate>,

        /// Due date (YYYY-MM-DD). Defaults to 14 days after the issue date.
        #[arg(long)]
        due_date: Option<NaiveDate>,

        /// Tax rate as a fraction, e.g. 0.1025 for 10.25%. Defaults to
        /// `[billing].default_tax_rate`.
        #[arg(long)]
        tax_rate: Option<f64>,

        /// Free-form notes printed near the bottom of the PDF.
        #[arg(long)]
        notes: Option<String>,

        /// Labor line: `description|hours` or `description|hours|rate`.
        /// Repeatable; labor lines come before `--item` lines.
        #[arg(long = "labor", value_parser = parse_labor)]
        labor: Vec<LaborSpec>,

        /// Item line: `description|qty|unit_price` or
        /// `description|qty|unit_price|category`. Repeatable.
        #[arg(long = "item", value_parser = parse_item)]
        item: Vec<ItemSpec>,

        /// Persist the invoice without rendering a PDF.
        #[arg(long)]
        no_pdf: bool,
    },

    /// Show a stored invoice with its items and totals.
    Show {
        /// Invoice id.
        id: i64,

        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Render (or re-render) the PDF for a stored invoice.
    Render {
        /// Invoice id.
        id: i64,
    },
}

/// Parse a `--labor` value of the form `description|hours[|rate]`.
fn parse_labor(s: &str) -> Result<LaborSpec, String> {
    let parts: Vec<&str> = s.split('|').collect();
    let (description, hours, rate) = match parts.as_slice() {
        [description, hours] => (description, hours, None),
        [description, hours, rate] => (description, hours, Some(rate)),
        _ => {
            return Err(format!(
                "invalid labor spec '{}': expected 'description|hours' or 'description|hours|rate'",
                s
            ))
        }
    };
    let hours: f64 = hours
        .parse()
        .map_err(|_| format!("invalid hours '{}' in labor spec", hours))?;
    let rate: Option<f64> = match rate {
        Some(rate) => Some(
            rate.parse()
                .map_err(|_| format!("invalid rate '{}' in labor spec", rate))?,
        ),
        None => None,
    };
    Ok(LaborSpec {
        description: description.to_string(),
        hours,
        rate,
    })
}

/// Parse an `--item` value of the form `description|qty|unit_price[|category]`.
fn parse_item(s: &str) -> Result<ItemSpec, String> {
    let parts: Vec<&str> = s.split('|').collect();
    let (description, qty, unit_price, category) = match parts.as_slice() {
        [description, qty, unit_price] => (description, qty, unit_price, None),
        [description, qty, unit_price, category] => {
            (description, qty, unit_price, Some(category.to_string()))
        }
        _ => {
            return Err(format!(
                "invalid item spec '{}': expected 'description|qty|unit_price[|category]'",
                s
            ))
        }
    };
    let qty: f64 = qty
        .parse()
        .map_err(|_| format!("invalid qty '{}' in item spec", qty))?;
    let unit_price: f64 = unit_price
        .parse()
        .map_err(|_| format!("invalid unit price '{}' in item spec", unit_price))?;
    Ok(ItemSpec {
        description: description.to_string(),
        qty,
        unit_price,
        category,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let settings = get_configuration(&cli.config)?;
    init_tracing(&settings.log_level);

    match cli.command {
        Commands::Init => {
            commands::run_init(&settings).await?;
        }
        Commands::Client { action } => match action {
            ClientAction::Add {
                name,
                phone,
                email,
                address,
            } => {
                commands::clients::run_add(
                    &settings,
                    CreateClient {
                        name,
                        phone,
                        email,
                        address,
                    },
                )
                .await?;
            }
            ClientAction::List { json } => {
                commands::clients::run_list(&settings, json).await?;
            }
            ClientAction::Show { id, json } => {
                commands::clients::run_show(&settings, id, json).await?;
            }
        },
        Commands::Invoice { action } => match action {
            InvoiceAction::Create {
                client,
                issue_date,
                due_date,
                tax_rate,
                notes,
                labor,
                item,
                no_pdf,
            } => {
                commands::invoices::run_create(
                    &settings, client, issue_date, due_date, tax_rate, notes, labor, item, no_pdf,
                )
                .await?;
            }
            InvoiceAction::Show { id, json } => {
                commands::invoices::run_show(&settings, id, json).await?;
            }
            InvoiceAction::Render { id } => {
                commands::invoices::run_render(&settings, id).await?;
            }
        },
    }

    Ok(())
}
