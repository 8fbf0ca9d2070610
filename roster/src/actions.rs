//! The CRUD actions on the `people` collection.
//!
//! Each action issues one request through the store (edit-then-save issues two),
//! logs the outcome, and hands the result back. Nothing here retries or
//! escalates: a failed action is reported once and the caller decides what to
//! do next.
//!
//! ```ignore
//! let store = DocumentStore::new(InMemoryStore::new());
//! let mary = create_and_save_person(&store, NewPerson::builder().name("Mary").build()?).await?;
//! let found = find_person_by_id(&store, mary.id).await?;
//! ```

use std::fmt::Debug;
use tracing::{error, info};

use roster_core::{
    backend::StoreBackend,
    collection::{DeleteResult, TypedCollection},
    error::{StoreError, StoreResult},
    query::{Filter, Query, SortDirection, Update},
    store::DocumentStore,
};

use crate::person::{NewPerson, Person, PersonId};

/// Food appended by [`find_edit_then_save`].
pub const EXTRA_FOOD: &str = "hamburger";

/// Age assigned by [`find_and_update`].
pub const UPDATED_AGE: f64 = 20.0;

/// Result size cap of [`query_chain`].
pub const QUERY_CHAIN_LIMIT: usize = 2;

fn people<B: StoreBackend>(store: &DocumentStore<B>) -> TypedCollection<'_, B, Person> {
    store.typed_collection::<Person>()
}

/// Logs an action's outcome and passes it through unchanged.
fn report<T: Debug>(action: &'static str, message: &str, result: StoreResult<T>) -> StoreResult<T> {
    match &result {
        Ok(value) => info!(action, result = ?value, "{message}"),
        Err(err) => error!(action, error = %err, "action failed"),
    }

    result
}

/// Stores a single new person and returns it with its assigned id.
pub async fn create_and_save_person<B: StoreBackend>(
    store: &DocumentStore<B>,
    person: NewPerson,
) -> StoreResult<Person> {
    let person = person.into_person(PersonId::new());
    let result = people(store)
        .insert(vec![person.clone()])
        .await
        .map(|()| person);

    report("create_and_save_person", "Person saved", result)
}

/// Stores every person in one batch, preserving input order.
pub async fn create_many_people<B: StoreBackend>(
    store: &DocumentStore<B>,
    people_to_create: Vec<NewPerson>,
) -> StoreResult<Vec<Person>> {
    let created = people_to_create
        .into_iter()
        .map(|person| person.into_person(PersonId::new()))
        .collect::<Vec<_>>();

    let result = people(store)
        .insert(created.clone())
        .await
        .map(|()| created);

    report("create_many_people", "People created", result)
}

/// Every person whose name is exactly `name`.
pub async fn find_people_by_name<B: StoreBackend>(
    store: &DocumentStore<B>,
    name: &str,
) -> StoreResult<Vec<Person>> {
    let result = people(store)
        .find(Query::filtered(Filter::eq(Person::NAME, name)))
        .await;

    report("find_people_by_name", &format!("People named {name}"), result)
}

/// The earliest stored person whose favorite foods include `food`.
pub async fn find_one_by_food<B: StoreBackend>(
    store: &DocumentStore<B>,
    food: &str,
) -> StoreResult<Option<Person>> {
    let result = people(store)
        .find_one(Filter::contains(Person::FAVORITE_FOODS, food))
        .await;

    report("find_one_by_food", &format!("First person who likes {food}"), result)
}

pub async fn find_person_by_id<B: StoreBackend>(
    store: &DocumentStore<B>,
    id: PersonId,
) -> StoreResult<Option<Person>> {
    let result = people(store).get_one(id.into()).await;

    report("find_person_by_id", "Found by ID", result)
}

/// Fetches a person, appends [`EXTRA_FOOD`] to their favorite foods and saves
/// the whole record back.
///
/// Returns `Ok(None)` if no person has this id. Not atomic: a concurrent write
/// between the fetch and the save is overwritten, and a concurrent delete makes
/// the save fail with [`StoreError::DocumentNotFound`].
pub async fn find_edit_then_save<B: StoreBackend>(
    store: &DocumentStore<B>,
    id: PersonId,
) -> StoreResult<Option<Person>> {
    let result = append_food_and_save(&people(store), id, EXTRA_FOOD).await;

    report("find_edit_then_save", "Updated person", result)
}

async fn append_food_and_save<B: StoreBackend>(
    collection: &TypedCollection<'_, B, Person>,
    id: PersonId,
    food: &str,
) -> StoreResult<Option<Person>> {
    let Some(mut person) = collection.get_one(id.into()).await? else {
        return Ok(None);
    };

    person.favorite_foods.push(food.to_string());

    if !collection.replace(&person).await? {
        return Err(StoreError::DocumentNotFound(id.to_string(), collection.name().to_string()));
    }

    Ok(Some(person))
}

/// Atomically sets the age of the first person named `name` to [`UPDATED_AGE`]
/// and returns the record as updated.
pub async fn find_and_update<B: StoreBackend>(
    store: &DocumentStore<B>,
    name: &str,
) -> StoreResult<Option<Person>> {
    let result = people(store)
        .find_one_and_update(
            Filter::eq(Person::NAME, name),
            Update::new().set(Person::AGE, UPDATED_AGE),
        )
        .await;

    report("find_and_update", "Updated document", result)
}

/// Removes a person and returns the removed record. A second call with the
/// same id returns `Ok(None)`.
pub async fn remove_by_id<B: StoreBackend>(
    store: &DocumentStore<B>,
    id: PersonId,
) -> StoreResult<Option<Person>> {
    let result = people(store).delete_one(id.into()).await;

    report("remove_by_id", "Removed", result)
}

/// Removes everyone named `name` and reports how many records went.
pub async fn remove_many_people<B: StoreBackend>(
    store: &DocumentStore<B>,
    name: &str,
) -> StoreResult<DeleteResult> {
    let result = people(store)
        .delete_many(Filter::eq(Person::NAME, name))
        .await;

    report("remove_many_people", "Deleted", result)
}

/// People who like `food`, sorted by name, at most [`QUERY_CHAIN_LIMIT`] of
/// them, with the age left out.
pub async fn query_chain<B: StoreBackend>(
    store: &DocumentStore<B>,
    food: &str,
) -> StoreResult<Vec<Person>> {
    let query = Query::builder()
        .filter(Filter::contains(Person::FAVORITE_FOODS, food))
        .sort(Person::NAME, SortDirection::Asc)
        .limit(QUERY_CHAIN_LIMIT)
        .exclude([Person::AGE])
        .build();

    let result = people(store).find(query).await;

    report("query_chain", "Query chain result", result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_memory::InMemoryStore;

    fn store() -> DocumentStore<InMemoryStore> {
        DocumentStore::new(InMemoryStore::new())
    }

    fn named(name: &str) -> NewPerson {
        NewPerson::builder().name(name).build().unwrap()
    }

    #[tokio::test]
    async fn create_assigns_distinct_ids() {
        let store = store();
        let a = create_and_save_person(&store, named("Ann")).await.unwrap();
        let b = create_and_save_person(&store, named("Ann")).await.unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(find_people_by_name(&store, "Ann").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn edit_then_save_on_unknown_id_returns_none() {
        let store = store();
        assert_eq!(find_edit_then_save(&store, PersonId::new()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn find_and_update_without_match_returns_none() {
        let store = store();
        create_and_save_person(&store, named("Jane")).await.unwrap();

        assert_eq!(find_and_update(&store, "Nobody").await.unwrap(), None);
    }

    #[tokio::test]
    async fn remove_many_with_no_matches_reports_zero() {
        let store = store();
        let result = remove_many_people(&store, "Mary").await.unwrap();

        assert_eq!(result, DeleteResult { deleted_count: 0 });
    }
}
