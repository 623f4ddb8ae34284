//! Client book integration tests.

mod common;

use common::{seed_client, TestApp};
use invoicer::error::AppError;
use invoicer::models::CreateClient;

#[tokio::test]
async fn create_client_persists_all_fields() {
    let app = TestApp::spawn().await;

    let client_id = app
        .db
        .create_client(&CreateClient {
            name: "Amy Pond".to_string(),
            phone: Some("555-0100".to_string()),
            email: Some("amy@example.com".to_string()),
            address: Some("42 Oak Ave\nSpringfield".to_string()),
        })
        .await
        .expect("Failed to create client");

    let client = app
        .db
        .get_client(client_id)
        .await
        .expect("Failed to get client");

    assert_eq!(client.client_id, client_id);
    assert_eq!(client.name, "Amy Pond");
    assert_eq!(client.phone.as_deref(), Some("555-0100"));
    assert_eq!(client.email.as_deref(), Some("amy@example.com"));
    assert_eq!(client.address.as_deref(), Some("42 Oak Ave\nSpringfield"));
}

#[tokio::test]
async fn create_client_trims_name() {
    let app = TestApp::spawn().await;

    let client_id = app
        .db
        .create_client(&CreateClient {
            name: "  Amy  ".to_string(),
            phone: None,
            email: None,
            address: None,
        })
        .await
        .expect("Failed to create client");

    let client = app
        .db
        .get_client(client_id)
        .await
        .expect("Failed to get client");
    assert_eq!(client.name, "Amy");
}

#[tokio::test]
async fn create_client_rejects_blank_name() {
    let app = TestApp::spawn().await;

    for name in ["", "   "] {
        let err = app
            .db
            .create_client(&CreateClient {
                name: name.to_string(),
                phone: None,
                email: None,
                address: None,
            })
            .await
            .expect_err("Blank name should be rejected");
        assert!(matches!(err, AppError::ValidationError(_)));
    }
}

#[tokio::test]
async fn list_clients_sorted_by_name() {
    let app = TestApp::spawn().await;

    let clients = app.db.list_clients().await.expect("Failed to list clients");
    assert!(clients.is_empty());

    seed_client(&app.db, "Bob").await;
    seed_client(&app.db, "Amy").await;
    seed_client(&app.db, "Cleo").await;

    let clients = app.db.list_clients().await.expect("Failed to list clients");
    let names: Vec<&str> = clients.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Amy", "Bob", "Cleo"]);
}

#[tokio::test]
async fn duplicate_client_names_are_allowed() {
    let app = TestApp::spawn().await;

    let first = seed_client(&app.db, "Amy").await;
    let second = seed_client(&app.db, "Amy").await;

    assert_ne!(first, second);
    let clients = app.db.list_clients().await.expect("Failed to list clients");
    assert_eq!(clients.len(), 2);
}

#[tokio::test]
async fn get_client_not_found() {
    let app = TestApp::spawn().await;

    let err = app
        .db
        .get_client(9999)
        .await
        .expect_err("Missing client should be an error");
    assert!(matches!(err, AppError::NotFound(_)));
}
