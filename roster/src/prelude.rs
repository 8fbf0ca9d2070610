//! Common imports for working with people:
//!
//! ```ignore
//! use roster::prelude::*;
//! ```

pub use roster_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    collection::{DeleteResult, TypedCollection},
    document::{Document, DocumentExt},
    error::{StoreError, StoreResult},
    query::{Expr, FieldOp, Filter, Projection, Query, QueryBuilder, Sort, SortDirection, Update},
    store::DocumentStore,
};

pub use crate::{
    actions::*,
    person::{NewPerson, NewPersonBuilder, Person, PersonId},
};
