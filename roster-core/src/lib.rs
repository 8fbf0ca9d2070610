//! Typed document layer shared by the roster backends.
//!
//! - **Documents** ([`document`]) - the [`Document`](document::Document) trait and BSON conversion
//! - **Backends** ([`backend`]) - the async [`StoreBackend`](backend::StoreBackend) seam
//! - **Queries** ([`query`]) - filters, sorting, paging, projection and in-place updates
//! - **Collections** ([`collection`]) - typed CRUD over one collection
//! - **Store** ([`store`]) - the owned handle passed to every operation
//! - **Errors** ([`error`]) - [`StoreError`](error::StoreError) and [`StoreResult`](error::StoreResult)

pub mod backend;
pub mod collection;
pub mod document;
pub mod error;
pub mod query;
pub mod store;
