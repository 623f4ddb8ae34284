//! Domain models for invoicer.

mod client;
mod invoice;
mod line_item;

pub use client::{Client, CreateClient};
pub use invoice::{CreateInvoice, Invoice, InvoiceWithItems};
pub use line_item::{CreateLineItem, LineItem};
