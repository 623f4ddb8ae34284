//! Services module: storage, assembly, text layout, and PDF rendering.

pub mod assembler;
pub mod database;
pub mod renderer;
pub mod text;

pub use database::Database;
