//! Filter evaluation for in-memory documents.
//!
//! Matching follows MongoDB's rules for the operators the query layer exposes:
//! comparing against an array field matches when any element matches, and a
//! missing field matches nothing except `Ne` and `Exists(_, false)`.

use std::{cmp::Ordering, collections::HashMap};
use bson::{Bson, datetime::DateTime};

use roster_core::{
    query::{QueryVisitor, Expr, FieldOp},
    error::{StoreError, StoreResult},
};


/// Comparable view of a BSON value. Numbers are normalized to `f64` so that
/// `Int32(20)` and `Double(20.0)` compare equal.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    Null,
    Bool(bool),
    Number(f64),
    DateTime(DateTime),
    String(&'a str),
    /// Binary payloads, which is how UUIDs are stored.
    Bytes(&'a [u8]),
    Array(Vec<Comparable<'a>>),
    Map(HashMap<&'a str, Comparable<'a>>),
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Number(*value as f64),
            Bson::Int64(value) => Comparable::Number(*value as f64),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::String(value) => Comparable::String(value),
            Bson::Binary(binary) => Comparable::Bytes(&binary.bytes),
            Bson::Array(arr) => Comparable::Array(
                arr
                    .iter()
                    .map(Comparable::from)
                    .collect::<Vec<_>>()
            ),
            Bson::Document(doc) => Comparable::Map(
                doc
                    .iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect::<HashMap<_, _>>()
            ),
            _ => Comparable::Null,
        }
    }
}

impl<'a> PartialEq for Comparable<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::Bytes(a), Comparable::Bytes(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl<'a> PartialOrd for Comparable<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Number(a), Comparable::Number(b)) => a.partial_cmp(b),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            (Comparable::Bytes(a), Comparable::Bytes(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl<'a> Comparable<'a> {
    /// Sort key ordering: missing and null values first, then by value.
    /// Values of different kinds that can't be compared are treated as equal.
    pub(crate) fn sort_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => Ordering::Equal,
            (Comparable::Null, _) => Ordering::Less,
            (_, Comparable::Null) => Ordering::Greater,
            _ => self.partial_cmp(other).unwrap_or(Ordering::Equal),
        }
    }

    /// Scalar candidates a filter value is compared against: the elements of an
    /// array field, or the value itself.
    fn candidates(self) -> Vec<Comparable<'a>> {
        match self {
            Comparable::Array(items) => items,
            other => vec![other],
        }
    }
}


pub(crate) struct DocumentEvaluator<'a> {
    document: &'a bson::Document,
}

impl<'a> DocumentEvaluator<'a> {
    pub fn new(document: &'a bson::Document) -> Self {
        Self { document }
    }

    pub fn evaluate(&mut self, expr: &Expr) -> StoreResult<bool> {
        self.visit_expr(expr)
    }

    /// Returns `true` when `document` satisfies `expr`. Non-document values never match.
    pub fn matches(document: &Bson, expr: &Expr) -> StoreResult<bool> {
        match document.as_document() {
            Some(doc) => DocumentEvaluator::new(doc).evaluate(expr),
            None => Ok(false),
        }
    }
}

impl<'a> QueryVisitor for DocumentEvaluator<'a> {
    type Output = bool;
    type Error = StoreError;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        for expr in exprs {
            if !self.visit_expr(expr)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        for expr in exprs {
            if self.visit_expr(expr)? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn visit_not(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        Ok(!self.visit_expr(expr)?)
    }

    fn visit_exists(&mut self, field: &str, should_exist: bool) -> Result<Self::Output, Self::Error> {
        Ok(self.document.get(field).is_some() == should_exist)
    }

    fn visit_field(&mut self, field: &str, op: &FieldOp, value: &Bson) -> Result<Self::Output, Self::Error> {
        let Some(field_value) = self.document.get(field) else {
            return Ok(matches!(op, FieldOp::Ne));
        };

        let target = Comparable::from(value);
        let whole = Comparable::from(field_value);

        Ok(match op {
            FieldOp::Eq => whole == target
                || Comparable::from(field_value)
                    .candidates()
                    .iter()
                    .any(|item| *item == target),
            FieldOp::Ne => whole != target
                && !Comparable::from(field_value)
                    .candidates()
                    .iter()
                    .any(|item| *item == target),
            FieldOp::Gt | FieldOp::Gte | FieldOp::Lt | FieldOp::Lte => whole
                .candidates()
                .iter()
                .filter_map(|item| item.partial_cmp(&target))
                .any(|ordering| match op {
                    FieldOp::Gt => ordering == Ordering::Greater,
                    FieldOp::Gte => ordering != Ordering::Less,
                    FieldOp::Lt => ordering == Ordering::Less,
                    _ => ordering != Ordering::Greater,
                }),
            FieldOp::Contains => {
                let items = whole.candidates();
                target
                    .candidates()
                    .iter()
                    .all(|wanted| items.iter().any(|item| item == wanted))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{Uuid, doc};
    use roster_core::query::Filter;

    fn mary() -> Bson {
        Bson::Document(doc! {
            "name": "Mary",
            "age": 22,
            "favoriteFoods": ["Burritos", "Pasta"],
        })
    }

    #[test]
    fn eq_matches_exact_value() {
        assert!(DocumentEvaluator::matches(&mary(), &Filter::eq("name", "Mary")).unwrap());
        assert!(!DocumentEvaluator::matches(&mary(), &Filter::eq("name", "mary")).unwrap());
    }

    #[test]
    fn contains_matches_array_element() {
        assert!(DocumentEvaluator::matches(&mary(), &Filter::contains("favoriteFoods", "Pasta")).unwrap());
        assert!(!DocumentEvaluator::matches(&mary(), &Filter::contains("favoriteFoods", "Rice")).unwrap());
    }

    #[test]
    fn contains_with_array_requires_every_element() {
        let both = Filter::contains("favoriteFoods", vec!["Pasta", "Burritos"]);
        assert!(DocumentEvaluator::matches(&mary(), &both).unwrap());

        let partial = Filter::contains("favoriteFoods", vec!["Pasta", "Rice"]);
        assert!(!DocumentEvaluator::matches(&mary(), &partial).unwrap());
    }

    #[test]
    fn numbers_compare_across_widths() {
        assert!(DocumentEvaluator::matches(&mary(), &Filter::eq("age", 22.0)).unwrap());
        assert!(DocumentEvaluator::matches(&mary(), &Filter::gte("age", 22_i64)).unwrap());
        assert!(!DocumentEvaluator::matches(&mary(), &Filter::gt("age", 22)).unwrap());
    }

    #[test]
    fn missing_field_only_matches_ne() {
        assert!(!DocumentEvaluator::matches(&mary(), &Filter::eq("nickname", "M")).unwrap());
        assert!(DocumentEvaluator::matches(&mary(), &Filter::ne("nickname", "M")).unwrap());
        assert!(DocumentEvaluator::matches(&mary(), &Filter::not_exists("nickname")).unwrap());
    }

    #[test]
    fn uuid_ids_compare_by_bytes() {
        let id = Uuid::new();
        let document = Bson::Document(doc! { "id": id, "name": "Mary" });

        assert!(DocumentEvaluator::matches(&document, &Filter::id(id)).unwrap());
        assert!(!DocumentEvaluator::matches(&document, &Filter::id(Uuid::new())).unwrap());
    }

    #[test]
    fn logical_operators_compose() {
        let expr = Filter::eq("name", "Mary")
            .and(Filter::contains("favoriteFoods", "Burritos"))
            .and(Filter::lt("age", 30).not().not());
        assert!(DocumentEvaluator::matches(&mary(), &expr).unwrap());

        let expr = Filter::or([Filter::eq("name", "Jane"), Filter::eq("name", "Mark")]);
        assert!(!DocumentEvaluator::matches(&mary(), &expr).unwrap());
    }
}
