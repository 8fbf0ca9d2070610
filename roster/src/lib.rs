//! People stored in a document database.
//!
//! This crate holds the [`Person`](person::Person) model, the CRUD
//! [`actions`] over it and the demo runner behind the `roster` binary. Storage
//! comes from the backend crates, re-exported here:
//!
//! - [`memory`] - in-process storage, used by the tests and `memory://` URIs
//! - [`mongodb`] - MongoDB storage (requires the `mongodb` feature)
//!
//! # Quick Start
//!
//! ```ignore
//! use roster::{prelude::*, memory::InMemoryStore};
//!
//! #[tokio::main]
//! async fn main() -> StoreResult<()> {
//!     let store = DocumentStore::new(InMemoryStore::builder().build().await?);
//!
//!     let mary = NewPerson::builder()
//!         .name("Mary")
//!         .age(22)
//!         .favorite_foods(["Burritos", "Pasta"])
//!         .build()?;
//!
//!     let mary = create_and_save_person(&store, mary).await?;
//!     let lovers = query_chain(&store, "Burritos").await?;
//!
//!     assert_eq!(lovers[0].id, mary.id);
//!     assert_eq!(lovers[0].age, None);
//!
//!     store.shutdown().await
//! }
//! ```

pub mod actions;
pub mod config;
pub mod demo;
pub mod logging;
pub mod person;
pub mod prelude;

pub use roster_core::{backend, collection, document, error, query, store};

pub use bson;

/// In-memory storage backend.
pub mod memory {
    pub use roster_memory::{InMemoryStore, InMemoryStoreBuilder};
}

/// MongoDB storage backend.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use roster_mongodb::{MongoDbStore, MongoDbStoreBuilder};
}
