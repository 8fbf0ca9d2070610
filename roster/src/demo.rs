//! The scripted walk through every action.
//!
//! Steps run one after another so later steps can use ids created by earlier
//! ones. A failing step is logged by its action and the walk moves on.

use tracing::{info, warn};

use roster_core::{backend::StoreBackend, error::StoreResult, store::DocumentStore};

use crate::{
    actions,
    person::{NewPerson, PersonId},
};

/// Tally of a demo run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DemoReport {
    pub succeeded: usize,
    pub failed: usize,
    /// Steps not attempted because an earlier step produced nothing to work on.
    pub skipped: usize,
}

impl DemoReport {
    fn record<T>(&mut self, result: &StoreResult<T>) {
        match result {
            Ok(_) => self.succeeded += 1,
            Err(_) => self.failed += 1,
        }
    }
}

/// The person stored by the single-create step.
pub fn john_doe() -> StoreResult<NewPerson> {
    NewPerson::builder()
        .name("John Doe")
        .age(25)
        .favorite_foods(["Pizza", "Pasta"])
        .build()
}

/// The batch stored by the create-many step.
pub fn sample_people() -> StoreResult<Vec<NewPerson>> {
    [
        ("Mary", 22, ["Burritos", "Pasta"]),
        ("Jane", 28, ["Rice", "Chicken"]),
        ("Mark", 30, ["Burger", "Burritos"]),
    ]
    .into_iter()
    .map(|(name, age, foods)| {
        NewPerson::builder()
            .name(name)
            .age(age)
            .favorite_foods(foods)
            .build()
    })
    .collect()
}

/// Runs every action once against `store`.
pub async fn run<B: StoreBackend>(store: &DocumentStore<B>) -> DemoReport {
    let mut report = DemoReport::default();

    let john: Option<PersonId> = match john_doe() {
        Ok(person) => {
            let result = actions::create_and_save_person(store, person).await;
            report.record(&result);
            result.ok().map(|p| p.id)
        }
        Err(err) => {
            warn!(error = %err, "John Doe failed validation");
            report.failed += 1;
            None
        }
    };

    match sample_people() {
        Ok(batch) => report.record(&actions::create_many_people(store, batch).await),
        Err(err) => {
            warn!(error = %err, "sample people failed validation");
            report.failed += 1;
        }
    }

    report.record(&actions::find_people_by_name(store, "Mary").await);
    report.record(&actions::find_one_by_food(store, "Pasta").await);

    match john {
        Some(id) => {
            report.record(&actions::find_person_by_id(store, id).await);
            report.record(&actions::find_edit_then_save(store, id).await);
        }
        None => report.skipped += 2,
    }

    report.record(&actions::find_and_update(store, "Jane").await);
    report.record(&actions::query_chain(store, "Burritos").await);

    match john {
        Some(id) => report.record(&actions::remove_by_id(store, id).await),
        None => report.skipped += 1,
    }

    report.record(&actions::remove_many_people(store, "Mary").await);

    info!(
        succeeded = report.succeeded,
        failed = report.failed,
        skipped = report.skipped,
        "demo finished"
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_data_is_valid() {
        let people = sample_people().unwrap();
        let names = people.iter().map(NewPerson::name).collect::<Vec<_>>();

        assert_eq!(names, ["Mary", "Jane", "Mark"]);
        assert_eq!(john_doe().unwrap().favorite_foods(), ["Pizza", "Pasta"]);
    }
}
