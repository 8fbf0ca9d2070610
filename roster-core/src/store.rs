//! The owned store handle.
//!
//! A [`DocumentStore`] owns one backend for the lifetime of the program. It is
//! created once at startup, lent to every operation as `&DocumentStore<B>`, and
//! consumed by [`DocumentStore::shutdown`] at the end.
//!
//! ```ignore
//! let store = DocumentStore::new(backend);
//! store.ping().await?;
//! let people = store.typed_collection::<Person>();
//! // ...
//! store.shutdown().await?;
//! ```

use crate::{
    backend::StoreBackend,
    collection::TypedCollection,
    document::Document,
    error::StoreResult,
};

#[derive(Debug)]
pub struct DocumentStore<B: StoreBackend> {
    backend: B,
}

impl<B: StoreBackend> DocumentStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Returns the collection that stores documents of type `D`.
    pub fn typed_collection<'a, D: Document>(&'a self) -> TypedCollection<'a, B, D> {
        TypedCollection::new(D::collection_name().to_string(), &self.backend)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Round-trips to the backend to confirm it is reachable.
    pub async fn ping(&self) -> StoreResult<()> {
        self.backend.ping().await
    }

    pub async fn shutdown(self) -> StoreResult<()> {
        self.backend.shutdown().await?;

        Ok(())
    }
}
