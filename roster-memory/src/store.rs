//! In-memory storage implementation.
//!
//! Each collection is an insertion-ordered list of `(id, document)` pairs behind a
//! single async-aware read-write lock. Unsorted queries therefore return documents
//! in the order they were inserted, matching MongoDB's natural order for a
//! collection that only sees inserts.

use std::{collections::HashMap, sync::Arc};
use async_trait::async_trait;
use mea::rwlock::RwLock;
use bson::{Uuid, Bson};
use tracing::debug;

use roster_core::{
    query::{Expr, Query, SortDirection, Update},
    error::{StoreError, StoreResult},
    backend::{StoreBackend, StoreBackendBuilder},
};

use crate::evaluator::{DocumentEvaluator, Comparable};

type CollectionList = Vec<(Uuid, Bson)>;
type StoreMap = HashMap<String, CollectionList>;


/// Thread-safe in-memory document storage backend.
///
/// `InMemoryStore` is cheap to clone; clones share the same underlying data.
///
/// # Example
///
/// ```ignore
/// use roster_memory::InMemoryStore;
/// use roster_core::backend::StoreBackend;
/// use bson::{Uuid, Bson, doc};
///
/// let store = InMemoryStore::new();
/// let id = Uuid::new();
/// store.insert_documents(vec![(id, Bson::Document(doc! { "id": id, "name": "Mary" }))], "people").await?;
/// assert_eq!(store.get_documents(vec![id], "people").await?.len(), 1);
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    store: Arc<RwLock<StoreMap>>,
}

impl InMemoryStore {
    /// Creates a new, empty store.
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(StoreMap::new())),
        }
    }

    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::default()
    }

    /// Number of documents currently held in `collection`.
    pub async fn count(&self, collection: &str) -> usize {
        self.store
            .read()
            .await
            .get(collection)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Position of the first document in `list` matching `filter`.
    fn position(list: &CollectionList, filter: &Expr) -> StoreResult<Option<usize>> {
        for (index, (_, doc)) in list.iter().enumerate() {
            if DocumentEvaluator::matches(doc, filter)? {
                return Ok(Some(index));
            }
        }

        Ok(None)
    }
}


#[async_trait]
impl StoreBackend for InMemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn insert_documents(&self, documents: Vec<(Uuid, Bson)>, collection: &str) -> StoreResult<()> {
        let mut store = self.store.write().await;
        let list = store
            .entry(collection.to_string())
            .or_default();

        // Check the whole batch first so a duplicate leaves the collection untouched.
        for (index, (id, doc)) in documents.iter().enumerate() {
            if doc.as_document().is_none() {
                return Err(StoreError::Backend(format!("Document {id} is not a BSON document")));
            }

            let duplicate = list.iter().any(|(existing, _)| existing == id)
                || documents[..index].iter().any(|(earlier, _)| earlier == id);

            if duplicate {
                return Err(StoreError::DocumentAlreadyExists(id.to_string(), collection.to_string()));
            }
        }

        debug!(collection, count = documents.len(), "memory insert");
        list.extend(documents);

        Ok(())
    }

    async fn replace_document(&self, id: Uuid, document: Bson, collection: &str) -> StoreResult<bool> {
        let mut store = self.store.write().await;

        let Some(slot) = store
            .get_mut(collection)
            .and_then(|list| list.iter_mut().find(|(existing, _)| *existing == id))
        else {
            return Ok(false);
        };

        slot.1 = document;

        Ok(true)
    }

    async fn get_documents(&self, ids: Vec<Uuid>, collection: &str) -> StoreResult<Vec<Bson>> {
        let store = self.store.read().await;
        let list = match store.get(collection) {
            Some(list) => list,
            None => return Ok(vec![]),
        };

        Ok(
            ids.iter()
                .filter_map(|id| {
                    list.iter()
                        .find(|(existing, _)| existing == id)
                        .map(|(_, doc)| doc.clone())
                })
                .collect()
        )
    }

    async fn query_documents(&self, query: Query, collection: &str) -> StoreResult<Vec<Bson>> {
        let store = self.store.read().await;
        let list = match store.get(collection) {
            Some(list) => list,
            None => return Ok(vec![]),
        };

        let mut matched = Vec::new();

        for (_, doc) in list {
            let keep = match &query.filter {
                Some(filter) => DocumentEvaluator::matches(doc, filter)?,
                None => true,
            };

            if keep {
                matched.push(doc);
            }
        }

        // Stable sort, so ties keep insertion order.
        if let Some(sort) = &query.sort {
            matched.sort_by(|a, b| {
                let (left, right) = (sort_key(a, &sort.field), sort_key(b, &sort.field));

                match sort.direction {
                    SortDirection::Asc => left.sort_cmp(&right),
                    SortDirection::Desc => right.sort_cmp(&left),
                }
            });
        }

        Ok(
            matched
                .into_iter()
                .skip(query.offset.unwrap_or(0))
                .take(query.limit.unwrap_or(usize::MAX))
                .map(|doc| match (&query.projection, doc.as_document()) {
                    (Some(projection), Some(d)) => Bson::Document(projection.apply(d)),
                    _ => doc.clone(),
                })
                .collect()
        )
    }

    async fn find_one_and_update(&self, filter: Expr, update: Update, collection: &str) -> StoreResult<Option<Bson>> {
        let mut store = self.store.write().await;
        let Some(list) = store.get_mut(collection) else {
            return Ok(None);
        };

        let Some(index) = Self::position(list, &filter)? else {
            return Ok(None);
        };

        let doc = &mut list[index].1;

        if let Some(d) = doc.as_document_mut() {
            update.apply(d);
        }

        Ok(Some(doc.clone()))
    }

    async fn find_one_and_delete(&self, filter: Expr, collection: &str) -> StoreResult<Option<Bson>> {
        let mut store = self.store.write().await;
        let Some(list) = store.get_mut(collection) else {
            return Ok(None);
        };

        Ok(
            Self::position(list, &filter)?
                .map(|index| list.remove(index).1)
        )
    }

    async fn delete_documents(&self, filter: Expr, collection: &str) -> StoreResult<u64> {
        let mut store = self.store.write().await;
        let Some(list) = store.get_mut(collection) else {
            return Ok(0);
        };

        let before = list.len();
        let doomed = list
            .iter()
            .map(|(_, doc)| DocumentEvaluator::matches(doc, &filter))
            .collect::<StoreResult<Vec<bool>>>()?;

        let mut doomed = doomed.into_iter();
        list.retain(|_| !doomed.next().unwrap_or(false));

        Ok((before - list.len()) as u64)
    }

    async fn drop_collection(&self, name: &str) -> StoreResult<()> {
        self.store.write().await.remove(name);

        Ok(())
    }
}

/// Sort key of `doc`: the value of `field`, or null when it is missing.
fn sort_key<'a>(doc: &'a Bson, field: &str) -> Comparable<'a> {
    doc.as_document()
        .and_then(|d| d.get(field))
        .map(Comparable::from)
        .unwrap_or(Comparable::Null)
}


/// Builder for [`InMemoryStore`]. Building always succeeds.
#[derive(Default)]
pub struct InMemoryStoreBuilder;

#[async_trait]
impl StoreBackendBuilder for InMemoryStoreBuilder {
    type Backend = InMemoryStore;

    async fn build(self) -> StoreResult<Self::Backend> {
        Ok(InMemoryStore::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use roster_core::query::Filter;

    const PEOPLE: &str = "people";

    async fn seeded() -> (InMemoryStore, Vec<Uuid>) {
        let store = InMemoryStore::builder().build().await.unwrap();
        let rows = [
            ("Mary", 22, vec!["Burritos", "Pasta"]),
            ("Jane", 28, vec!["Rice", "Chicken"]),
            ("Mark", 30, vec!["Burger", "Burritos"]),
        ];

        let mut ids = Vec::new();
        let mut documents = Vec::new();

        for (name, age, foods) in rows {
            let id = Uuid::new();
            ids.push(id);
            documents.push((id, Bson::Document(doc! {
                "id": id,
                "name": name,
                "age": age,
                "favoriteFoods": foods,
            })));
        }

        store.insert_documents(documents, PEOPLE).await.unwrap();

        (store, ids)
    }

    fn names(docs: &[Bson]) -> Vec<&str> {
        docs.iter()
            .map(|d| d.as_document().unwrap().get_str("name").unwrap())
            .collect()
    }

    #[tokio::test]
    async fn duplicate_insert_leaves_collection_untouched() {
        let (store, ids) = seeded().await;
        let fresh = Uuid::new();

        let err = store
            .insert_documents(
                vec![
                    (fresh, Bson::Document(doc! { "id": fresh, "name": "New" })),
                    (ids[0], Bson::Document(doc! { "id": ids[0], "name": "Dup" })),
                ],
                PEOPLE,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::DocumentAlreadyExists(..)));
        assert_eq!(store.count(PEOPLE).await, 3);
    }

    #[tokio::test]
    async fn unsorted_query_keeps_insertion_order() {
        let (store, _) = seeded().await;
        let docs = store
            .query_documents(Query::filtered(Filter::contains("favoriteFoods", "Burritos")), PEOPLE)
            .await
            .unwrap();

        assert_eq!(names(&docs), vec!["Mary", "Mark"]);
    }

    #[tokio::test]
    async fn sort_limit_and_projection() {
        let (store, _) = seeded().await;
        let query = Query::builder()
            .sort("name", SortDirection::Desc)
            .offset(1)
            .limit(1)
            .exclude(["age", "favoriteFoods"])
            .build();

        let docs = store.query_documents(query, PEOPLE).await.unwrap();

        assert_eq!(names(&docs), vec!["Mark"]);
        let doc = docs[0].as_document().unwrap();
        assert!(doc.get("age").is_none());
        assert!(doc.get("favoriteFoods").is_none());
        assert!(doc.get("id").is_some());
    }

    #[tokio::test]
    async fn find_one_and_update_returns_updated_document() {
        let (store, _) = seeded().await;
        let updated = store
            .find_one_and_update(Filter::eq("name", "Jane"), Update::new().set("age", 20), PEOPLE)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.as_document().unwrap().get_i32("age").unwrap(), 20);

        let missing = store
            .find_one_and_update(Filter::eq("name", "Nobody"), Update::new().set("age", 20), PEOPLE)
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn find_one_and_delete_is_a_no_op_the_second_time() {
        let (store, ids) = seeded().await;

        assert!(store.find_one_and_delete(Filter::id(ids[1]), PEOPLE).await.unwrap().is_some());
        assert!(store.find_one_and_delete(Filter::id(ids[1]), PEOPLE).await.unwrap().is_none());
        assert_eq!(store.count(PEOPLE).await, 2);
    }

    #[tokio::test]
    async fn delete_documents_counts_matches() {
        let (store, _) = seeded().await;
        let deleted = store
            .delete_documents(Filter::contains("favoriteFoods", "Burritos"), PEOPLE)
            .await
            .unwrap();

        assert_eq!(deleted, 2);
        assert_eq!(store.count(PEOPLE).await, 1);
        assert_eq!(store.delete_documents(Filter::eq("name", "Mary"), "other").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn replace_reports_missing_documents() {
        let (store, ids) = seeded().await;
        let replaced = store
            .replace_document(ids[0], Bson::Document(doc! { "id": ids[0], "name": "Maria" }), PEOPLE)
            .await
            .unwrap();
        assert!(replaced);

        let docs = store.get_documents(vec![ids[0], Uuid::new()], PEOPLE).await.unwrap();
        assert_eq!(names(&docs), vec!["Maria"]);

        let unknown = Uuid::new();
        let replaced = store
            .replace_document(unknown, Bson::Document(doc! { "id": unknown, "name": "Ghost" }), PEOPLE)
            .await
            .unwrap();
        assert!(!replaced);
    }

    #[tokio::test]
    async fn drop_collection_clears_documents() {
        let (store, _) = seeded().await;
        store.drop_collection(PEOPLE).await.unwrap();
        store.drop_collection(PEOPLE).await.unwrap();

        assert_eq!(store.count(PEOPLE).await, 0);
    }
}
