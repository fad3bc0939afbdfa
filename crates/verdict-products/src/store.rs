use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use jiff::Timestamp;
use thiserror::Error;
use uuid::Uuid;

use crate::product::{NewProduct, Product};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("product {0} not found")]
    NotFound(Uuid),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence for products
#[async_trait]
pub trait ProductStore: Send + Sync + 'static {
    async fn create(&self, new: NewProduct, now: Timestamp) -> Result<Product, StoreError>;

    /// All products, oldest first
    async fn list(&self) -> Result<Vec<Product>, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Product, StoreError>;
}

/// Process-local store, lost on restart
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    products: Arc<DashMap<Uuid, Product>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn create(&self, new: NewProduct, now: Timestamp) -> Result<Product, StoreError> {
        let product = Product {
            id: Uuid::new_v4(),
            name: new.name,
            cost: new.cost,
            quantity: new.quantity,
            date_created: now,
            date_updated: now,
        };

        self.products.insert(product.id, product.clone());
        tracing::debug!(id = %product.id, "product created");

        Ok(product)
    }

    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        let mut products: Vec<Product> = self.products.iter().map(|entry| entry.value().clone()).collect();
        products.sort_by(|a, b| a.date_created.cmp(&b.date_created).then_with(|| a.id.cmp(&b.id)));
        Ok(products)
    }

    async fn get(&self, id: Uuid) -> Result<Product, StoreError> {
        self.products
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(StoreError::NotFound(id))
    }
}
