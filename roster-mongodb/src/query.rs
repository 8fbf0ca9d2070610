//! Translation from roster queries to MongoDB documents.
//!
//! Filters go through [`MongoQueryTranslator`]; sort, projection and update
//! specifications are plain functions. The document `id` field is mirrored in
//! `_id`, so filters on `id` are sent against `_id` to hit the primary index.

use bson::{Document, Bson, doc};

use roster_core::{
    query::{QueryVisitor, Expr, FieldOp, Projection, Sort, SortDirection, Update},
    error::StoreError,
};


/// Translates filter expressions into MongoDB query documents.
pub(crate) struct MongoQueryTranslator;

impl MongoQueryTranslator {
    /// Translates an optional filter; `None` matches every document.
    pub(crate) fn translate(filter: Option<&Expr>) -> Result<Document, StoreError> {
        match filter {
            Some(expr) => MongoQueryTranslator.visit_expr(expr),
            None => Ok(doc! {}),
        }
    }
}

fn field_name(field: &str) -> &str {
    if field == "id" { "_id" } else { field }
}

impl QueryVisitor for MongoQueryTranslator {
    type Output = Document;
    type Error = StoreError;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            "$and": exprs
                .iter()
                .map(|expr| self.visit_expr(expr))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }

    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            "$or": exprs
                .iter()
                .map(|expr| self.visit_expr(expr))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }

    // `$not` only applies to field operators, so a general negation goes through `$nor`.
    fn visit_not(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            "$nor": [self.visit_expr(expr)?],
        })
    }

    fn visit_exists(&mut self, field: &str, should_exist: bool) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            field_name(field): { "$exists": should_exist },
        })
    }

    fn visit_field(&mut self, field: &str, op: &FieldOp, value: &Bson) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            field_name(field): match op {
                FieldOp::Eq => doc! { "$eq": value },
                FieldOp::Ne => doc! { "$ne": value },
                FieldOp::Gt => doc! { "$gt": value },
                FieldOp::Gte => doc! { "$gte": value },
                FieldOp::Lt => doc! { "$lt": value },
                FieldOp::Lte => doc! { "$lte": value },
                FieldOp::Contains => match value {
                    Bson::Array(arr) => doc! { "$all": arr },
                    Bson::Document(_) => return Err(StoreError::Backend("Contains operator requires a scalar or array value".to_string())),
                    _ => doc! { "$eq": value },
                },
            }
        })
    }
}

pub(crate) fn sort_document(sort: &Sort) -> Document {
    doc! {
        field_name(&sort.field): match sort.direction {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        }
    }
}

/// Projection document; `id` is always kept, mirroring the in-memory backend.
pub(crate) fn projection_document(projection: &Projection) -> Document {
    match projection {
        Projection::Include(fields) => {
            let mut projection = Document::from_iter(
                fields
                    .iter()
                    .map(|field| (field.clone(), Bson::Int32(1))),
            );
            projection.insert("id", 1);
            projection
        }
        Projection::Exclude(fields) => Document::from_iter(
            fields
                .iter()
                .filter(|field| !["id", "_id"].contains(&field.as_str()))
                .map(|field| (field.clone(), Bson::Int32(0))),
        ),
    }
}

pub(crate) fn update_document(update: &Update) -> Document {
    let mut document = Document::new();

    if !update.set.is_empty() {
        document.insert("$set", Document::from_iter(update.set.iter().cloned()));
    }

    document
}
