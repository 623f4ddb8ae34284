//! Client model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A client in the address book. Contact fields are free text and may be
/// blank or a placeholder like "N/A"; the renderer filters those out.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Client {
    pub client_id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// Input for creating a client.
#[derive(Debug, Clone)]
pub struct CreateClient {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}
