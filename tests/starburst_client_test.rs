use anyhow::Result;
use datamesh_sync::config::toml_config::ConnectionConfig;
use datamesh_sync::domain::model::{DataProduct, Dataset, Domain};
use datamesh_sync::domain::ports::CatalogClient;
use datamesh_sync::utils::error::ErrorSeverity;
use datamesh_sync::{DatameshError, StarburstClient};
use httpmock::prelude::*;
use serde_json::json;

// base64("migrator:secret")
const BASIC_AUTH: &str = "Basic bWlncmF0b3I6c2VjcmV0";

fn connection(server: &MockServer) -> ConnectionConfig {
    ConnectionConfig {
        host: server.host(),
        port: server.port(),
        protocol: "http".to_string(),
        user: "migrator".to_string(),
        password: Some("secret".to_string()),
        timeout_seconds: 5,
    }
}

fn domains_body() -> serde_json::Value {
    json!([
        {"id": "d-1", "name": "marketing", "assignedDataProducts": []},
        {
            "id": "d-2",
            "name": "finance",
            "description": "Finance domain",
            "assignedDataProducts": [
                {"id": "p-1", "name": "sales"},
                {"id": "p-2", "name": "archived"}
            ]
        }
    ])
}

#[tokio::test]
async fn test_get_domain_by_name_uses_basic_auth() -> Result<()> {
    let server = MockServer::start_async().await;
    let domains_mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v1/dataProduct/domains")
                .header("authorization", BASIC_AUTH);
            then.status(200).json_body(domains_body());
        })
        .await;

    let client = StarburstClient::new(&connection(&server))?;

    let domain = client.get_domain_by_name("finance").await?.unwrap();
    assert_eq!(domain.id.as_deref(), Some("d-2"));
    assert_eq!(domain.assigned_data_products.len(), 2);

    assert!(client.get_domain_by_name("hr").await?.is_none());
    domains_mock.assert_hits_async(2).await;
    Ok(())
}

#[tokio::test]
async fn test_get_data_product_resolves_through_domain() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/dataProduct/domains");
            then.status(200).json_body(domains_body());
        })
        .await;
    let product_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/dataProduct/products/p-1");
            then.status(200).json_body(json!({
                "id": "p-1",
                "name": "sales",
                "catalogName": "dev_catalog",
                "dataDomainId": "d-2",
                "views": [{"name": "v1", "definitionQuery": "SELECT 1"}],
                "materializedViews": [],
                "owners": [{"name": "alice"}]
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/dataProduct/products/p-2");
            then.status(404);
        })
        .await;

    let client = StarburstClient::new(&connection(&server))?;

    let product = client.get_data_product("finance", "sales").await?.unwrap();
    assert_eq!(product.catalog_name.as_deref(), Some("dev_catalog"));
    assert_eq!(product.views[0].name, "v1");
    assert!(product.extra.contains_key("owners"));
    product_mock.assert_async().await;

    // listed on the domain but gone at the instance
    assert!(client.get_data_product("finance", "archived").await?.is_none());
    // not listed at all
    assert!(client.get_data_product("finance", "missing").await?.is_none());
    assert!(client.get_data_product("hr", "sales").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_update_data_product_puts_by_id() -> Result<()> {
    let server = MockServer::start_async().await;
    let update_mock = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/api/v1/dataProduct/products/p-1")
                .header("authorization", BASIC_AUTH)
                .json_body_partial(
                    json!({
                        "id": "p-1",
                        "name": "sales",
                        "views": [{"name": "v1", "definitionQuery": "SELECT 2"}]
                    })
                    .to_string(),
                );
            then.status(200).json_body(json!({"id": "p-1"}));
        })
        .await;

    let client = StarburstClient::new(&connection(&server))?;
    let mut product = DataProduct::new("sales");
    product.id = Some("p-1".to_string());
    product.views = vec![Dataset::new("v1", "SELECT 2")];

    let status = client.update_data_product(&product).await?;

    assert_eq!(status, 200);
    update_mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_write_failure_maps_to_status_error() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v1/dataProduct/domains");
            then.status(500).body("internal failure");
        })
        .await;

    let client = StarburstClient::new(&connection(&server))?;
    let err = client
        .create_domain(&Domain::new("finance"))
        .await
        .unwrap_err();

    match &err {
        DatameshError::ApiStatusError { status, message } => {
            assert_eq!(*status, 500);
            assert_eq!(message, "internal failure");
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(err.severity(), ErrorSeverity::Medium);
    Ok(())
}

#[tokio::test]
async fn test_update_without_id_is_rejected_locally() -> Result<()> {
    let server = MockServer::start_async().await;
    let any_put = server
        .mock_async(|when, then| {
            when.method(PUT);
            then.status(200);
        })
        .await;

    let client = StarburstClient::new(&connection(&server))?;

    let err = client.update_domain(&Domain::new("finance")).await.unwrap_err();
    assert!(matches!(err, DatameshError::MissingIdentityError { .. }));
    assert_eq!(err.severity(), ErrorSeverity::High);
    any_put.assert_hits_async(0).await;
    Ok(())
}
