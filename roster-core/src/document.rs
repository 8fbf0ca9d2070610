//! Core traits for typed documents and their BSON representation.

use bson::{Bson, Uuid, de::deserialize_from_bson, ser::serialize_to_bson};
use serde::{Deserialize, Serialize};

use crate::error::StoreResult;

/// Core trait that every record stored through a [`TypedCollection`](crate::collection::TypedCollection)
/// must implement.
///
/// A document carries its own identifier and names the collection it lives in.
///
/// # Example
///
/// ```ignore
/// use roster_core::document::Document;
/// use bson::Uuid;
/// use serde::{Serialize, Deserialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// pub struct Note {
///     pub id: Uuid,
///     pub text: String,
/// }
///
/// impl Document for Note {
///     fn id(&self) -> &Uuid {
///         &self.id
///     }
///
///     fn collection_name() -> &'static str {
///         "notes"
///     }
/// }
/// ```
pub trait Document: Serialize + for<'de> Deserialize<'de> + Send + Sync + Clone + 'static {
    /// Returns a reference to this document's unique identifier.
    fn id(&self) -> &Uuid;

    /// Returns the name of the collection this document belongs to.
    fn collection_name() -> &'static str;
}

/// BSON conversion helpers, implemented for every [`Document`].
pub trait DocumentExt: Document {
    /// Converts this document to a BSON value for storage.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn to_bson(&self) -> StoreResult<Bson>;

    /// Creates a document from a stored BSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored value does not have the document's shape.
    fn from_bson(bson: Bson) -> StoreResult<Self>;
}

impl<D: Document> DocumentExt for D {
    fn to_bson(&self) -> StoreResult<Bson> {
        Ok(serialize_to_bson(self)?)
    }

    fn from_bson(bson: Bson) -> StoreResult<Self> {
        Ok(deserialize_from_bson(bson)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: Uuid,
        text: String,
    }

    impl Document for Note {
        fn id(&self) -> &Uuid {
            &self.id
        }

        fn collection_name() -> &'static str {
            "notes"
        }
    }

    #[test]
    fn bson_shape_keeps_field_names() {
        let note = Note { id: Uuid::new(), text: "hello".into() };
        let bson = note.to_bson().unwrap();
        let doc = bson.as_document().unwrap();

        assert_eq!(doc.get_str("text").unwrap(), "hello");
        assert_eq!(Note::from_bson(bson).unwrap(), note);
    }

    #[test]
    fn from_bson_rejects_wrong_shape() {
        let err = Note::from_bson(Bson::Document(bson::doc! { "text": 1 })).unwrap_err();
        assert!(matches!(err, crate::error::StoreError::Serialization(_)));
    }
}
