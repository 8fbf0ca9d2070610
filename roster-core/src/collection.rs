//! Typed access to a single collection.
//!
//! [`TypedCollection`] converts between a [`Document`] type and the raw BSON the
//! backend stores. It is obtained from
//! [`DocumentStore::typed_collection`](crate::store::DocumentStore::typed_collection):
//!
//! ```ignore
//! let people = store.typed_collection::<Person>();
//! people.insert(vec![person]).await?;
//! let marys = people.find(Query::filtered(Filter::eq("name", "Mary"))).await?;
//! ```

use bson::{Bson, Uuid};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use tracing::debug;

use crate::{
    backend::StoreBackend,
    document::{Document, DocumentExt},
    error::StoreResult,
    query::{Expr, Filter, Query, Update},
};

/// Outcome of a bulk delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeleteResult {
    /// Number of documents removed.
    pub deleted_count: u64,
}

#[derive(Debug)]
pub struct TypedCollection<'a, B: StoreBackend, D: Document> {
    name: String,
    backend: &'a B,
    _marker: PhantomData<D>,
}

impl<'a, B: StoreBackend, D: Document> TypedCollection<'a, B, D> {
    pub(crate) fn new(name: String, backend: &'a B) -> Self {
        Self { name, backend, _marker: PhantomData }
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Inserts new documents in the given order. An empty batch is a no-op.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`](crate::error::StoreError) if serialization or insertion fails,
    /// including when a document with the same ID already exists.
    pub async fn insert(&self, documents: Vec<D>) -> StoreResult<()> {
        if documents.is_empty() {
            return Ok(());
        }

        debug!(collection = %self.name, count = documents.len(), "inserting documents");

        self.backend
            .insert_documents(
                documents
                    .iter()
                    .map(|d| {
                        d.to_bson()
                            .map(|b| (*d.id(), b))
                    })
                    .collect::<StoreResult<Vec<(Uuid, Bson)>>>()?,
                self.name(),
            )
            .await
    }

    /// Writes `document` over the stored copy with the same ID.
    ///
    /// Returns `false` if the document is no longer stored.
    pub async fn replace(&self, document: &D) -> StoreResult<bool> {
        debug!(collection = %self.name, id = %document.id(), "replacing document");

        self.backend
            .replace_document(*document.id(), document.to_bson()?, self.name())
            .await
    }

    /// IDs that don't exist are omitted from the results.
    async fn get(&self, ids: Vec<Uuid>) -> StoreResult<Vec<D>> {
        self.backend
            .get_documents(ids, self.name())
            .await?
            .into_iter()
            .map(D::from_bson)
            .collect()
    }

    /// Retrieves a single document by ID.
    pub async fn get_one(&self, id: Uuid) -> StoreResult<Option<D>> {
        Ok(self
            .get(vec![id])
            .await?
            .into_iter()
            .next())
    }

    /// Returns every document matching `query`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`](crate::error::StoreError) if the query fails or a result
    /// cannot be converted back into `D`. A projection that drops a required field of
    /// `D` surfaces here as a serialization error.
    pub async fn find(&self, query: Query) -> StoreResult<Vec<D>> {
        debug!(collection = %self.name, ?query, "running query");

        self.backend
            .query_documents(query, self.name())
            .await?
            .into_iter()
            .map(D::from_bson)
            .collect()
    }

    /// Returns the first document matching `filter` in natural order.
    pub async fn find_one(&self, filter: Expr) -> StoreResult<Option<D>> {
        Ok(self
            .find(
                Query::builder()
                    .filter(filter)
                    .limit(1)
                    .build(),
            )
            .await?
            .into_iter()
            .next())
    }

    /// Atomically updates the first match and returns it as stored after the update.
    pub async fn find_one_and_update(&self, filter: Expr, update: Update) -> StoreResult<Option<D>> {
        debug!(collection = %self.name, ?filter, ?update, "find one and update");

        self.backend
            .find_one_and_update(filter, update, self.name())
            .await?
            .map(D::from_bson)
            .transpose()
    }

    /// Atomically removes the first match and returns it.
    pub async fn find_one_and_delete(&self, filter: Expr) -> StoreResult<Option<D>> {
        debug!(collection = %self.name, ?filter, "find one and delete");

        self.backend
            .find_one_and_delete(filter, self.name())
            .await?
            .map(D::from_bson)
            .transpose()
    }

    /// Removes the document with the given ID and returns it.
    pub async fn delete_one(&self, id: Uuid) -> StoreResult<Option<D>> {
        self.find_one_and_delete(Filter::id(id)).await
    }

    /// Removes every document matching `filter`.
    pub async fn delete_many(&self, filter: Expr) -> StoreResult<DeleteResult> {
        debug!(collection = %self.name, ?filter, "deleting documents");

        Ok(DeleteResult {
            deleted_count: self
                .backend
                .delete_documents(filter, self.name())
                .await?,
        })
    }

    /// Removes every document in the collection.
    pub async fn clear(&self) -> StoreResult<()> {
        self.backend.drop_collection(self.name()).await
    }
}
