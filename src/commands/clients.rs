//! Client book commands.

use crate::config::Settings;
use crate::error::AppError;
use crate::models::CreateClient;

/// `client add`: store a new client and print its id.
pub async fn run_add(settings: &Settings, input: CreateClient) -> Result<(), AppError> {
    let db = super::open_store(settings).await?;
    let client_id = db.create_client(&input).await?;
    println!("Added client {}: {}", client_id, input.name.trim());
    Ok(())
}

/// `client list`: all clients, sorted by name.
pub async fn run_list(settings: &Settings, json: bool) -> Result<(), AppError> {
    let db = super::open_store(settings).await?;
    let clients = db.list_clients().await?;

    if json {
        let rendered = serde_json::to_string_pretty(&clients)
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("Failed to encode JSON: {}", e)))?;
        println!("{}", rendered);
        return Ok(());
    }

    if clients.is_empty() {
        println!("No clients yet.");
        return Ok(());
    }
    for client in clients {
        println!(
            "{:>5}  {:<24}  {:<16}  {}",
            client.client_id,
            client.name,
            client.phone.as_deref().unwrap_or("-"),
            client.email.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}

/// `client show`: one client, by id.
pub async fn run_show(settings: &Settings, client_id: i64, json: bool) -> Result<(), AppError> {
    let db = super::open_store(settings).await?;
    let client = db.get_client(client_id).await?;

    if json {
        let rendered = serde_json::to_string_pretty(&client)
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("Failed to encode JSON: {}", e)))?;
        println!("{}", rendered);
        return Ok(());
    }

    println!("Client {}: {}", client.client_id, client.name);
    if let Some(phone) = &client.phone {
        println!("Phone:   {}", phone);
    }
    if let Some(email) = &client.email {
        println!("Email:   {}", email);
    }
    if let Some(address) = &client.address {
        println!("Address:");
        for line in address.lines() {
            println!("  {}", line);
        }
    }
    Ok(())
}
