//! Product catalogue endpoints
//!
//! Handlers report client mistakes as [`ApplicationError`]s and annotate
//! store failures with what they were doing; turning either into a
//! response is left to the middleware chain.

mod product;
mod store;

use std::sync::Arc;

use http::StatusCode;
use jiff::Timestamp;
use uuid::Uuid;
use verdict_core::{
    ApplicationError, Failure, PathParams, Request, ResponseSink, ResultExt, decode, respond, run,
};
use verdict_server::{App, MethodFilter};

pub use product::{NewProduct, Product};
pub use store::{MemoryStore, ProductStore, StoreError};

/// Handlers for the product endpoints
pub struct Products<S> {
    store: S,
}

impl<S: ProductStore> Products<S> {
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// `POST /v1/products`
    ///
    /// # Errors
    ///
    /// Returns a 400 for an undecodable or invalid body and an annotated
    /// store failure otherwise.
    pub async fn create(&self, request: Request, sink: &mut dyn ResponseSink) -> Result<(), Failure> {
        let new: NewProduct = decode(&request)?;
        new.validate()?;

        let product = self
            .store
            .create(new, Timestamp::now())
            .await
            .context("creating new product")?;

        respond(sink, &product, StatusCode::CREATED)?;
        Ok(())
    }

    /// `GET /v1/products`
    ///
    /// # Errors
    ///
    /// Returns the annotated store failure.
    pub async fn list(&self, _request: Request, sink: &mut dyn ResponseSink) -> Result<(), Failure> {
        let products = self.store.list().await.context("getting product list")?;

        respond(sink, &products, StatusCode::OK)?;
        Ok(())
    }

    /// `GET /v1/products/{id}`
    ///
    /// # Errors
    ///
    /// Returns a 400 for a malformed id, a 404 for an unknown one and an
    /// annotated store failure otherwise.
    pub async fn retrieve(&self, request: Request, sink: &mut dyn ResponseSink) -> Result<(), Failure> {
        let raw = PathParams::of(&request, "id").unwrap_or_default();
        let id = Uuid::parse_str(raw).map_err(|_| ApplicationError::bad_request("ID is not in its proper form"))?;

        let product = self.store.get(id).await.map_err(|e| {
            let failure = match e {
                StoreError::NotFound(_) => Failure::from(ApplicationError::not_found("Product not found")),
                other => Failure::from(other),
            };
            failure.annotate(format!("getting product {id}"))
        })?;

        respond(sink, &product, StatusCode::OK)?;
        Ok(())
    }
}

/// Register the product endpoints on `app`
#[must_use]
pub fn routes<S: ProductStore>(app: App, store: S) -> App {
    let products = Arc::new(Products::new(store));

    let create = {
        let products = Arc::clone(&products);
        run(move |request, sink| {
            let products = Arc::clone(&products);
            Box::pin(async move { products.create(request, sink).await })
        })
    };

    let list = {
        let products = Arc::clone(&products);
        run(move |request, sink| {
            let products = Arc::clone(&products);
            Box::pin(async move { products.list(request, sink).await })
        })
    };

    let retrieve = run(move |request, sink| {
        let products = Arc::clone(&products);
        Box::pin(async move { products.retrieve(request, sink).await })
    });

    app.handle(MethodFilter::POST, "/v1/products", create)
        .handle(MethodFilter::GET, "/v1/products", list)
        .handle(MethodFilter::GET, "/v1/products/{id}", retrieve)
}
