//! Storage backend abstraction.
//!
//! [`StoreBackend`] is the seam between the typed collection API and a concrete
//! store. Backends exchange raw BSON documents keyed by [`Uuid`]; typing,
//! validation and id assignment happen above this layer.
//!
//! # Example
//!
//! ```ignore
//! use roster_core::backend::StoreBackend;
//! use bson::{Uuid, Bson, doc};
//!
//! let backend = MyBackendImpl::new();
//!
//! let id = Uuid::new();
//! let doc = Bson::Document(doc! { "id": id, "name": "Mary", "age": 22 });
//! backend.insert_documents(vec![(id, doc)], "people").await?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use async_trait::async_trait;
use bson::{Bson, Uuid};
use std::fmt::Debug;

use crate::{
    error::StoreResult,
    query::{Expr, Query, Update},
};

/// Abstract interface for document storage backends.
///
/// Implementations must be safe to share between async tasks. Reads that match
/// nothing return empty results rather than errors.
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// Checks that the backend is reachable.
    async fn ping(&self) -> StoreResult<()>;

    /// Inserts new documents. Fails if any ID is already present.
    async fn insert_documents(
        &self,
        documents: Vec<(Uuid, Bson)>,
        collection: &str,
    ) -> StoreResult<()>;

    /// Replaces the stored document with the same ID.
    ///
    /// Returns `false` when no document with that ID exists.
    async fn replace_document(
        &self,
        id: Uuid,
        document: Bson,
        collection: &str,
    ) -> StoreResult<bool>;

    /// Fetches documents by ID. Unknown IDs are skipped.
    async fn get_documents(&self, ids: Vec<Uuid>, collection: &str) -> StoreResult<Vec<Bson>>;

    /// Runs a structured query.
    ///
    /// Without a sort, results come back in the store's natural order.
    async fn query_documents(&self, query: Query, collection: &str) -> StoreResult<Vec<Bson>>;

    /// Atomically applies `update` to the first document matching `filter`
    /// and returns the document as it is after the update.
    async fn find_one_and_update(
        &self,
        filter: Expr,
        update: Update,
        collection: &str,
    ) -> StoreResult<Option<Bson>>;

    /// Atomically removes the first document matching `filter` and returns it.
    async fn find_one_and_delete(&self, filter: Expr, collection: &str) -> StoreResult<Option<Bson>>;

    /// Removes every document matching `filter`, returning how many were removed.
    async fn delete_documents(&self, filter: Expr, collection: &str) -> StoreResult<u64>;

    /// Removes a collection and all its documents. Dropping a missing collection is not an error.
    async fn drop_collection(&self, name: &str) -> StoreResult<()>;

    /// Releases connections held by the backend.
    async fn shutdown(self) -> StoreResult<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

/// Factory for backends that need async setup (parsing options, connecting).
#[async_trait]
pub trait StoreBackendBuilder {
    type Backend: StoreBackend;

    async fn build(self) -> StoreResult<Self::Backend>;
}
