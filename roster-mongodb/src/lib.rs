//! MongoDB backend for roster.
//!
//! Implements [`StoreBackend`](roster_core::backend::StoreBackend) on the official
//! async driver. Filters, sorts, projections and updates are translated to their
//! MongoDB equivalents and executed server-side; `find_one_and_update` and
//! `find_one_and_delete` map to the driver's atomic commands.
//!
//! # Connection
//!
//! The builder takes a connection string. The database comes from
//! [`MongoDbStoreBuilder::database`], else from the connection string's path,
//! else [`DEFAULT_DATABASE`](store::DEFAULT_DATABASE).
//!
//! ```ignore
//! use roster_core::backend::{StoreBackend, StoreBackendBuilder};
//! use roster_mongodb::MongoDbStore;
//!
//! let backend = MongoDbStore::builder("mongodb://localhost:27017/roster")
//!     .build()
//!     .await?;
//! backend.ping().await?;
//! ```

pub mod store;
pub mod query;

pub use store::{MongoDbStore, MongoDbStoreBuilder};
