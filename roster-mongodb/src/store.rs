//! MongoDB implementation of the storage backend.

use async_trait::async_trait;
use futures::TryStreamExt;
use bson::{Document, Bson, Uuid, doc};
use mongodb::{
    Client, Collection as MongoCollection,
    options::{ClientOptions, FindOptions, ReturnDocument},
};
use tracing::debug;
use roster_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    error::{StoreError, StoreResult},
    query::{Expr, Query, Update},
};

use crate::query::{MongoQueryTranslator, projection_document, sort_document, update_document};

/// Database used when neither the builder nor the connection string names one.
pub const DEFAULT_DATABASE: &str = "test";

fn backend_error(err: mongodb::error::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}


#[derive(Debug)]
pub struct MongoDbStore {
    client: Client,
    database: String,
}

impl MongoDbStore {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }

    pub fn builder(dsn: &str) -> MongoDbStoreBuilder {
        MongoDbStoreBuilder::new(dsn)
    }

    /// Name of the database this store reads and writes.
    pub fn database(&self) -> &str {
        &self.database
    }

    fn get_collection(&self, collection_name: &str) -> MongoCollection<Document> {
        self.client
            .database(&self.database)
            .collection(collection_name)
    }

    /// Stored form of a document: its fields plus `_id` mirroring the document id.
    fn prepare_document(id: &Uuid, document: &Bson) -> StoreResult<Document> {
        let mut prepared = document
            .as_document()
            .cloned()
            .ok_or_else(|| StoreError::Backend(format!("Document {id} is not a BSON document")))?;

        prepared.insert("_id", *id);

        Ok(prepared)
    }

    fn find_options(query: &Query) -> StoreResult<FindOptions> {
        let mut options = FindOptions::default();

        if let Some(limit) = query.limit {
            options.limit = Some(
                i64::try_from(limit)
                    .map_err(|_| StoreError::Backend(format!("Query limit {limit} is out of range")))?,
            );
        }
        if let Some(skip) = query.offset {
            options.skip = Some(
                u64::try_from(skip)
                    .map_err(|_| StoreError::Backend(format!("Query offset {skip} is out of range")))?,
            );
        }
        if let Some(sort) = &query.sort {
            options.sort = Some(sort_document(sort));
        }
        if let Some(projection) = &query.projection {
            options.projection = Some(projection_document(projection));
        }

        Ok(options)
    }

    fn restore_document(mut document: Document) -> Bson {
        document.remove("_id");

        Bson::Document(document)
    }
}

#[async_trait]
impl StoreBackend for MongoDbStore {
    async fn ping(&self) -> StoreResult<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(backend_error)?;

        Ok(())
    }

    async fn insert_documents(&self, documents: Vec<(Uuid, Bson)>, collection: &str) -> StoreResult<()> {
        debug!(database = %self.database, collection, count = documents.len(), "mongodb insert_many");

        self.get_collection(collection)
            .insert_many(
                documents
                    .iter()
                    .map(|(id, doc)| Self::prepare_document(id, doc))
                    .collect::<StoreResult<Vec<Document>>>()?,
            )
            .await
            .map_err(backend_error)?;

        Ok(())
    }

    async fn replace_document(&self, id: Uuid, document: Bson, collection: &str) -> StoreResult<bool> {
        let result = self
            .get_collection(collection)
            .replace_one(doc! { "_id": id }, Self::prepare_document(&id, &document)?)
            .await
            .map_err(backend_error)?;

        Ok(result.matched_count == 1)
    }

    async fn get_documents(&self, ids: Vec<Uuid>, collection: &str) -> StoreResult<Vec<Bson>> {
        Ok(
            self.get_collection(collection)
                .find(doc! { "_id": { "$in": ids } })
                .await
                .map_err(backend_error)?
                .try_collect::<Vec<Document>>()
                .await
                .map_err(backend_error)?
                .into_iter()
                .map(Self::restore_document)
                .collect()
        )
    }

    async fn query_documents(&self, query: Query, collection: &str) -> StoreResult<Vec<Bson>> {
        Ok(
            self.get_collection(collection)
                .find(MongoQueryTranslator::translate(query.filter.as_ref())?)
                .with_options(Self::find_options(&query)?)
                .await
                .map_err(backend_error)?
                .try_collect::<Vec<Document>>()
                .await
                .map_err(backend_error)?
                .into_iter()
                .map(Self::restore_document)
                .collect()
        )
    }

    async fn find_one_and_update(&self, filter: Expr, update: Update, collection: &str) -> StoreResult<Option<Bson>> {
        let filter = MongoQueryTranslator::translate(Some(&filter))?;

        // An empty update document is rejected by the server; treat it as a plain lookup.
        if update.is_empty() {
            return Ok(
                self.get_collection(collection)
                    .find_one(filter)
                    .await
                    .map_err(backend_error)?
                    .map(Self::restore_document)
            );
        }

        Ok(
            self.get_collection(collection)
                .find_one_and_update(filter, update_document(&update))
                .return_document(ReturnDocument::After)
                .await
                .map_err(backend_error)?
                .map(Self::restore_document)
        )
    }

    async fn find_one_and_delete(&self, filter: Expr, collection: &str) -> StoreResult<Option<Bson>> {
        Ok(
            self.get_collection(collection)
                .find_one_and_delete(MongoQueryTranslator::translate(Some(&filter))?)
                .await
                .map_err(backend_error)?
                .map(Self::restore_document)
        )
    }

    async fn delete_documents(&self, filter: Expr, collection: &str) -> StoreResult<u64> {
        Ok(
            self.get_collection(collection)
                .delete_many(MongoQueryTranslator::translate(Some(&filter))?)
                .await
                .map_err(backend_error)?
                .deleted_count
        )
    }

    async fn drop_collection(&self, name: &str) -> StoreResult<()> {
        self.get_collection(name)
            .drop()
            .await
            .map_err(backend_error)?;

        Ok(())
    }

    async fn shutdown(self) -> StoreResult<()> {
        self.client.shutdown().await;

        Ok(())
    }
}

pub struct MongoDbStoreBuilder {
    dsn: String,
    database: Option<String>,
}

impl MongoDbStoreBuilder {
    pub fn new(dsn: &str) -> Self {
        Self {
            dsn: dsn.to_string(),
            database: None,
        }
    }

    /// Overrides the database named in the connection string.
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }
}

#[async_trait]
impl StoreBackendBuilder for MongoDbStoreBuilder {
    type Backend = MongoDbStore;

    /// Parses the connection string and creates the client.
    ///
    /// The driver connects lazily; use [`StoreBackend::ping`] to confirm the server is reachable.
    async fn build(self) -> StoreResult<Self::Backend> {
        let options = ClientOptions::parse(&self.dsn)
            .await
            .map_err(|e| StoreError::Initialization(e.to_string()))?;

        let database = self
            .database
            .or_else(|| options.default_database.clone())
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());

        Ok(MongoDbStore::new(
            Client::with_options(options)
                .map_err(|e| StoreError::Initialization(e.to_string()))?,
            database,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_core::query::SortDirection;

    #[test]
    fn prepared_documents_mirror_id() {
        let id = Uuid::new();
        let prepared = MongoDbStore::prepare_document(&id, &Bson::Document(doc! { "id": id, "name": "Mary" })).unwrap();

        assert_eq!(prepared.get("_id"), Some(&Bson::from(id)));
        assert_eq!(prepared.get_str("name").unwrap(), "Mary");
    }

    #[test]
    fn prepare_rejects_non_documents() {
        let err = MongoDbStore::prepare_document(&Uuid::new(), &Bson::String("Mary".into())).unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
    }

    #[test]
    fn restored_documents_drop_internal_id() {
        let id = Uuid::new();
        let restored = MongoDbStore::restore_document(doc! { "_id": id, "id": id, "name": "Mary" });

        assert_eq!(restored, Bson::Document(doc! { "id": id, "name": "Mary" }));
    }

    #[test]
    fn find_options_carry_paging_sort_and_projection() {
        let query = Query::builder()
            .sort("name", SortDirection::Asc)
            .offset(1)
            .limit(2)
            .exclude(["age"])
            .build();
        let options = MongoDbStore::find_options(&query).unwrap();

        assert_eq!(options.limit, Some(2));
        assert_eq!(options.skip, Some(1));
        assert_eq!(options.sort, Some(doc! { "name": 1 }));
        assert_eq!(options.projection, Some(doc! { "age": 0 }));
    }

    #[test]
    fn find_options_reject_oversized_limit() {
        let query = Query::builder().limit(usize::MAX).build();
        let err = MongoDbStore::find_options(&query).unwrap_err();

        assert!(matches!(err, StoreError::Backend(_)));
    }

    #[tokio::test]
    async fn builder_prefers_explicit_database() {
        let store = MongoDbStore::builder("mongodb://localhost:27017/fromuri")
            .database("override")
            .build()
            .await
            .unwrap();
        assert_eq!(store.database(), "override");
    }

    #[tokio::test]
    async fn builder_falls_back_to_uri_then_default() {
        let store = MongoDbStore::builder("mongodb://localhost:27017/fromuri").build().await.unwrap();
        assert_eq!(store.database(), "fromuri");

        let store = MongoDbStore::builder("mongodb://localhost:27017").build().await.unwrap();
        assert_eq!(store.database(), DEFAULT_DATABASE);
    }

    #[tokio::test]
    async fn builder_rejects_malformed_uri() {
        let err = MongoDbStore::builder("not-a-uri").build().await.unwrap_err();
        assert!(matches!(err, StoreError::Initialization(_)));
    }
}
