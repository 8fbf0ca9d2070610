//! In-memory storage backend for roster.
//!
//! A thread-safe implementation of [`StoreBackend`](roster_core::backend::StoreBackend)
//! for development and tests. Documents live in insertion-ordered lists behind an
//! async-aware read-write lock, and filters are evaluated with MongoDB's matching
//! rules so code written against this backend behaves the same on MongoDB.
//!
//! Select it at runtime with a `memory://` connection string.
//!
//! ```ignore
//! use roster_core::{backend::StoreBackendBuilder, store::DocumentStore};
//! use roster_memory::InMemoryStore;
//!
//! let store = DocumentStore::new(InMemoryStore::builder().build().await?);
//! let people = store.typed_collection::<Person>();
//! ```

pub mod store;
mod evaluator;

pub use store::{InMemoryStore, InMemoryStoreBuilder};
