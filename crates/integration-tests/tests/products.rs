mod harness;

use async_trait::async_trait;
use harness::config::ConfigBuilder;
use harness::server::TestServer;
use jiff::Timestamp;
use serde_json::{Value, json};
use uuid::Uuid;
use verdict_products::{MemoryStore, NewProduct, Product, ProductStore, StoreError};

/// Store whose database is down
struct Unavailable;

#[async_trait]
impl ProductStore for Unavailable {
    async fn create(&self, _: NewProduct, _: Timestamp) -> Result<Product, StoreError> {
        Err(StoreError::Unavailable("database timeout".to_owned()))
    }

    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        Err(StoreError::Unavailable("database timeout".to_owned()))
    }

    async fn get(&self, _: Uuid) -> Result<Product, StoreError> {
        Err(StoreError::Unavailable("database timeout".to_owned()))
    }
}

/// Store with a bug in it
struct Broken;

#[async_trait]
impl ProductStore for Broken {
    async fn create(&self, _: NewProduct, _: Timestamp) -> Result<Product, StoreError> {
        unimplemented!()
    }

    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        panic!("index out of range")
    }

    async fn get(&self, _: Uuid) -> Result<Product, StoreError> {
        unimplemented!()
    }
}

async fn start(store: impl ProductStore) -> TestServer {
    TestServer::start(ConfigBuilder::new().build(), store).await.unwrap()
}

#[tokio::test]
async fn create_then_retrieve() {
    let server = start(MemoryStore::new()).await;

    let resp = server
        .client()
        .post(server.url("/v1/products"))
        .json(&json!({ "name": "Comic Books", "cost": 50, "quantity": 42 }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 201);
    assert_eq!(resp.headers()["content-type"], "application/json");
    let created: Value = resp.json().await.unwrap();
    let id = created["id"].as_str().unwrap().to_owned();

    let resp = server
        .client()
        .get(server.url(&format!("/v1/products/{id}")))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let fetched: Value = resp.json().await.unwrap();
    assert_eq!(fetched, created);
    assert!(server.logged().is_empty());
}

#[tokio::test]
async fn list_starts_empty() {
    let server = start(MemoryStore::new()).await;

    let resp = server.client().get(server.url("/v1/products")).send().await.unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.json::<Value>().await.unwrap(), json!([]));
}

#[tokio::test]
async fn invalid_product_lists_fields() {
    let server = start(MemoryStore::new()).await;

    let resp = server
        .client()
        .post(server.url("/v1/products"))
        .json(&json!({ "cost": -1 }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    assert_eq!(
        resp.json::<Value>().await.unwrap(),
        json!({
            "error": "field validation error",
            "fields": [
                { "field": "name", "reason": "name is a required field" },
                { "field": "cost", "reason": "cost must be 0 or greater" },
                { "field": "quantity", "reason": "quantity must be 1 or greater" },
            ],
        })
    );
    assert_eq!(server.logged().len(), 1);
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let server = start(MemoryStore::new()).await;

    let resp = server
        .client()
        .post(server.url("/v1/products"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("decoding request body: "));
    assert!(body.get("fields").is_none());
}

#[tokio::test]
async fn malformed_id_is_bad_request() {
    let server = start(MemoryStore::new()).await;

    let resp = server
        .client()
        .get(server.url("/v1/products/not-a-uuid"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    assert_eq!(
        resp.json::<Value>().await.unwrap(),
        json!({ "error": "ID is not in its proper form" })
    );
}

#[tokio::test]
async fn unknown_id_is_not_found() {
    let server = start(MemoryStore::new()).await;
    let id = Uuid::new_v4();

    let resp = server
        .client()
        .get(server.url(&format!("/v1/products/{id}")))
        .header("x-request-id", "trace-404")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 404);
    assert_eq!(resp.headers()["x-request-id"], "trace-404");
    assert_eq!(resp.json::<Value>().await.unwrap(), json!({ "error": "Product not found" }));
    assert_eq!(
        server.logged(),
        [format!("trace-404 : ERROR : getting product {id}: Product not found")]
    );
}

#[tokio::test]
async fn store_outage_is_hidden_from_client() {
    let server = start(Unavailable).await;

    let resp = server
        .client()
        .get(server.url("/v1/products"))
        .header("x-request-id", "trace-500")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 500);
    assert_eq!(
        resp.json::<Value>().await.unwrap(),
        json!({ "error": "Internal Server Error" })
    );
    assert_eq!(
        server.logged(),
        ["trace-500 : ERROR : getting product list: store unavailable: database timeout"]
    );
}

#[tokio::test]
async fn panic_is_answered_as_internal_error() {
    let server = start(Broken).await;

    let resp = server.client().get(server.url("/v1/products")).send().await.unwrap();

    assert_eq!(resp.status(), 500);
    assert_eq!(
        resp.json::<Value>().await.unwrap(),
        json!({ "error": "Internal Server Error" })
    );
    let logged = server.logged();
    assert_eq!(logged.len(), 1);
    assert!(logged[0].ends_with("panic: index out of range"));
}

#[tokio::test]
async fn custom_request_id_header_is_echoed() {
    let config = ConfigBuilder::new().with_request_id_header("x-correlation-id").build();
    let server = TestServer::start(config, MemoryStore::new()).await.unwrap();

    let resp = server
        .client()
        .get(server.url("/v1/products/nope"))
        .header("x-correlation-id", "corr-7")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.headers()["x-correlation-id"], "corr-7");
    assert!(resp.headers().get("x-request-id").is_none());
    assert!(server.logged()[0].starts_with("corr-7 : ERROR : "));
}

#[tokio::test]
async fn oversized_body_is_rejected_before_the_chain() {
    let config = ConfigBuilder::new().with_body_limit(16).build();
    let server = TestServer::start(config, MemoryStore::new()).await.unwrap();

    let resp = server
        .client()
        .post(server.url("/v1/products"))
        .json(&json!({ "name": "A very long product name indeed", "cost": 1, "quantity": 1 }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 413);
    assert!(server.logged().is_empty());
}
