use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::logging::log_fetched;
use crate::model::{Entity, Reference};

mod http;
mod memory;

pub use http::HttpBackend;
pub use memory::MemoryBackend;

/// JSON transport to the planning API. Paths are relative to the schema
/// prefix (`task`, `task/7`, `daily_progress_monitoring/progress_by_date`).
///
/// Every call is single-shot: no retry, no cancellation. Transport errors and
/// non-2xx answers come back as the same error carrying a readable message.
#[async_trait]
pub trait Backend {
    async fn get(&self, path: &str) -> Result<Value>;
    async fn post(&self, path: &str, body: &Value) -> Result<Value>;
    async fn put(&self, path: &str, body: &Value) -> Result<Value>;
    async fn delete(&self, path: &str) -> Result<()>;
}

pub type SharedBackend = Arc<dyn Backend + Send + Sync>;

pub(crate) fn decode<T: DeserializeOwned>(what: &str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| anyhow!("unexpected {} payload: {}", what, e))
}

/// Typed list/create/update/delete against one resource collection.
pub struct ResourceClient<E> {
    backend: SharedBackend,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for ResourceClient<E> {
    fn clone(&self) -> Self {
        Self { backend: self.backend.clone(), _entity: PhantomData }
    }
}

impl<E: Entity> ResourceClient<E> {
    pub fn new(backend: SharedBackend) -> Self {
        Self { backend, _entity: PhantomData }
    }

    fn item_path(id: E::Id) -> String {
        format!("{}/{}", E::PATH, id)
    }

    pub async fn list(&self) -> Result<Vec<E>> {
        let value = self.backend.get(E::PATH).await?;
        let items: Vec<E> = decode(E::LABEL, value)?;
        log_fetched(E::PATH, items.len());
        Ok(items)
    }

    /// The created record as the server returns it, identifier included.
    pub async fn create(&self, draft: &E::Draft) -> Result<E> {
        let body = serde_json::to_value(draft)?;
        let value = self.backend.post(E::PATH, &body).await?;
        decode(E::LABEL, value)
    }

    /// Returns the server's post-update record when the answer is one.
    pub async fn update(&self, id: E::Id, draft: &E::Draft) -> Result<Option<E>> {
        let body = serde_json::to_value(draft)?;
        let value = self.backend.put(&Self::item_path(id), &body).await?;
        Ok(serde_json::from_value::<E>(value).ok().filter(|e| e.id() == id))
    }

    pub async fn delete(&self, id: E::Id) -> Result<()> {
        self.backend.delete(&Self::item_path(id)).await
    }
}

/// Read-only list of a reference collection.
pub struct ReferenceClient<R> {
    backend: SharedBackend,
    _reference: PhantomData<fn() -> R>,
}

impl<R: Reference> ReferenceClient<R> {
    pub fn new(backend: SharedBackend) -> Self {
        Self { backend, _reference: PhantomData }
    }

    pub async fn list(&self) -> Result<Vec<R>> {
        let value = self.backend.get(R::PATH).await?;
        let items: Vec<R> = decode(R::PATH, value)?;
        log_fetched(R::PATH, items.len());
        Ok(items)
    }
}
