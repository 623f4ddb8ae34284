//! Invoicer core: a local-first client book, gap-tolerant monotonic
//! invoice numbering, and PDF rendering, all backed by a single SQLite
//! file.

pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod observability;
pub mod services;
