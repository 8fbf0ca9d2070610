//! The `Person` record.
//!
//! A [`Person`] is what the store holds: an id plus the user-supplied fields.
//! New records start out as a [`NewPerson`], which can only be obtained through
//! validation, so a nameless person never reaches the store.
//!
//! Stored field names are `name`, `age` and `favoriteFoods`.

use bson::Uuid;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use roster_core::{
    document::Document,
    error::{StoreError, StoreResult},
};

/// Identifier assigned to a person when it is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(Uuid);

impl PersonId {
    /// Generates a fresh identifier.
    pub fn new() -> Self {
        PersonId(Uuid::new())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PersonId {
    fn default() -> Self {
        PersonId::new()
    }
}

impl From<Uuid> for PersonId {
    fn from(uuid: Uuid) -> Self {
        PersonId(uuid)
    }
}

impl From<PersonId> for Uuid {
    fn from(id: PersonId) -> Self {
        id.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for PersonId {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(PersonId)
            .map_err(|e| StoreError::Validation(format!("invalid person id {s:?}: {e}")))
    }
}

/// A stored person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    /// Any number. Stored integers and doubles both read back as `f64`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<f64>,
    #[serde(default)]
    pub favorite_foods: Vec<String>,
}

impl Person {
    pub const COLLECTION: &'static str = "people";
    pub const NAME: &'static str = "name";
    pub const AGE: &'static str = "age";
    pub const FAVORITE_FOODS: &'static str = "favoriteFoods";
}

impl Document for Person {
    fn id(&self) -> &Uuid {
        self.id.as_uuid()
    }

    fn collection_name() -> &'static str {
        Person::COLLECTION
    }
}

/// A validated person that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPerson {
    name: String,
    age: Option<f64>,
    favorite_foods: Vec<String>,
}

impl NewPerson {
    pub fn builder() -> NewPersonBuilder {
        NewPersonBuilder::default()
    }

    /// Validates loosely shaped JSON input, e.g. `{"name": "Mary", "age": 22}`.
    ///
    /// Unknown fields are ignored.
    ///
    /// # Errors
    ///
    /// [`StoreError::Validation`] when the name is missing or empty,
    /// [`StoreError::Serialization`] when a field has the wrong type.
    pub fn from_json(value: serde_json::Value) -> StoreResult<Self> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Input {
            name: Option<String>,
            age: Option<f64>,
            #[serde(default)]
            favorite_foods: Vec<String>,
        }

        let input: Input = serde_json::from_value(value)?;

        NewPersonBuilder {
            name: input.name,
            age: input.age,
            favorite_foods: input.favorite_foods,
        }
        .build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn age(&self) -> Option<f64> {
        self.age
    }

    pub fn favorite_foods(&self) -> &[String] {
        &self.favorite_foods
    }

    /// Attaches an identifier, producing the record to store.
    pub fn into_person(self, id: PersonId) -> Person {
        Person {
            id,
            name: self.name,
            age: self.age,
            favorite_foods: self.favorite_foods,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewPersonBuilder {
    name: Option<String>,
    age: Option<f64>,
    favorite_foods: Vec<String>,
}

impl NewPersonBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn age(mut self, age: impl Into<f64>) -> Self {
        self.age = Some(age.into());
        self
    }

    /// Appends one favorite food.
    pub fn favorite_food(mut self, food: impl Into<String>) -> Self {
        self.favorite_foods.push(food.into());
        self
    }

    /// Appends several favorite foods, keeping their order.
    pub fn favorite_foods<S: Into<String>>(mut self, foods: impl IntoIterator<Item = S>) -> Self {
        self.favorite_foods.extend(foods.into_iter().map(Into::into));
        self
    }

    /// Validates the fields. The name is required and may not be the empty string.
    pub fn build(self) -> StoreResult<NewPerson> {
        let name = match self.name {
            Some(name) if !name.is_empty() => name,
            Some(_) => return Err(StoreError::Validation("Person name must not be empty".to_string())),
            None => return Err(StoreError::Validation("Person name is required".to_string())),
        };

        Ok(NewPerson {
            name,
            age: self.age,
            favorite_foods: self.favorite_foods,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{Bson, doc};
    use roster_core::document::DocumentExt;
    use serde_json::json;

    #[test]
    fn builder_requires_a_name() {
        let err = NewPerson::builder().age(30).build().unwrap_err();
        assert!(err.is_validation());

        let err = NewPerson::builder().name("").build().unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn whitespace_name_is_still_a_name() {
        let person = NewPerson::builder().name("   ").build().unwrap();
        assert_eq!(person.name(), "   ");
    }

    #[test]
    fn age_accepts_any_number() {
        let person = NewPerson::from_json(json!({ "name": "Mary", "age": 22.5 })).unwrap();
        assert_eq!(person.age(), Some(22.5));

        let person = NewPerson::from_json(json!({ "name": "Mary", "age": -1 })).unwrap();
        assert_eq!(person.age(), Some(-1.0));

        let person = NewPerson::builder().name("Mark").age(30).build().unwrap();
        assert_eq!(person.age(), Some(30.0));
    }

    #[test]
    fn stored_ages_of_any_numeric_type_read_back() {
        for age in [Bson::Int32(30), Bson::Int64(30), Bson::Double(30.0)] {
            let stored = Bson::Document(doc! {
                "id": Uuid::new(),
                "name": "Mary",
                "age": age,
            });

            let person = Person::from_bson(stored).unwrap();
            assert_eq!(person.age, Some(30.0));
            assert!(person.favorite_foods.is_empty());
        }
    }

    #[test]
    fn builder_keeps_food_order() {
        let person = NewPerson::builder()
            .name("Mark")
            .favorite_food("Burger")
            .favorite_foods(["Burritos", "Tacos"])
            .build()
            .unwrap();

        assert_eq!(person.favorite_foods(), ["Burger", "Burritos", "Tacos"]);
        assert_eq!(person.age(), None);
    }

    #[test]
    fn from_json_mirrors_builder_validation() {
        let person = NewPerson::from_json(json!({
            "name": "Jane",
            "age": 28,
            "favoriteFoods": ["Rice", "Chicken"],
            "nickname": "J",
        }))
        .unwrap();
        assert_eq!(person.name(), "Jane");
        assert_eq!(person.age(), Some(28.0));

        let err = NewPerson::from_json(json!({ "age": 28 })).unwrap_err();
        assert!(err.is_validation());

        let err = NewPerson::from_json(json!({ "name": "Jane", "age": "old" })).unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }

    #[test]
    fn stored_shape_uses_camel_case_and_omits_missing_age() {
        let person = NewPerson::builder()
            .name("Mary")
            .favorite_foods(["Burritos"])
            .build()
            .unwrap()
            .into_person(PersonId::new());

        let bson = person.to_bson().unwrap();
        let doc = bson.as_document().unwrap();

        assert!(doc.contains_key("favoriteFoods"));
        assert!(!doc.contains_key("age"));
        assert_eq!(Person::from_bson(bson).unwrap(), person);
    }

    #[test]
    fn person_id_round_trips_through_text() {
        let id = PersonId::new();
        assert_eq!(id.to_string().parse::<PersonId>().unwrap(), id);
        assert!("replace_with_id".parse::<PersonId>().unwrap_err().is_validation());
    }
}
