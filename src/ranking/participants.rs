//! Per-participant views over a set of attempts.

use std::collections::{BTreeMap, HashMap};

use uuid::Uuid;

use crate::dao::models::{AttemptEntity, DrinkMethod};

/// Aggregate for one participant name, used to prefill repeat submissions.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantSummary {
    /// Participant name as submitted.
    pub name: String,
    /// Number of attempts under this name.
    pub attempts: usize,
    /// Fastest time among those attempts.
    pub best_time: f64,
    /// Beer type of the participant's most recent attempt.
    pub latest_beer_type: String,
    /// Method of the participant's most recent attempt.
    pub latest_method: DrinkMethod,
}

fn insertion_key(attempt: &AttemptEntity) -> (std::time::SystemTime, Uuid) {
    (attempt.created_at, attempt.id)
}

/// 1-based chronological ordinal of `attempt` among attempts sharing its name
/// within the same party.
///
/// Names match exactly (case-sensitive). Attempts without a party form their
/// own scope. Returns `None` when `attempt` is not part of `attempts`.
pub fn ordinal_for_participant(attempts: &[AttemptEntity], attempt: &AttemptEntity) -> Option<usize> {
    let target = insertion_key(attempt);
    let mut found = false;
    let earlier = attempts
        .iter()
        .filter(|other| other.party_id == attempt.party_id && other.name == attempt.name)
        .inspect(|other| found |= other.id == attempt.id)
        .filter(|other| insertion_key(other) < target)
        .count();
    found.then_some(earlier + 1)
}

/// Ordinals for every attempt in one pass, keyed by attempt id.
///
/// Counts are kept per `(party, name)`, matching [`ordinal_for_participant`].
pub fn participant_ordinals(attempts: &[AttemptEntity]) -> HashMap<Uuid, usize> {
    let mut chronological: Vec<&AttemptEntity> = attempts.iter().collect();
    chronological.sort_by_key(|attempt| insertion_key(attempt));

    let mut counters: HashMap<(Option<Uuid>, &str), usize> = HashMap::new();
    chronological
        .into_iter()
        .map(|attempt| {
            let counter = counters
                .entry((attempt.party_id, attempt.name.as_str()))
                .or_default();
            *counter += 1;
            (attempt.id, *counter)
        })
        .collect()
}

/// Distinct participants, sorted by name.
pub fn participants(attempts: &[AttemptEntity]) -> Vec<ParticipantSummary> {
    let mut by_name: BTreeMap<&str, (ParticipantSummary, (std::time::SystemTime, Uuid))> = BTreeMap::new();

    for attempt in attempts {
        let key = insertion_key(attempt);
        by_name
            .entry(attempt.name.as_str())
            .and_modify(|(summary, latest)| {
                summary.attempts += 1;
                summary.best_time = summary.best_time.min(attempt.time);
                if key > *latest {
                    *latest = key;
                    summary.latest_beer_type = attempt.beer_type.clone();
                    summary.latest_method = attempt.method;
                }
            })
            .or_insert_with(|| {
                (
                    ParticipantSummary {
                        name: attempt.name.clone(),
                        attempts: 1,
                        best_time: attempt.time,
                        latest_beer_type: attempt.beer_type.clone(),
                        latest_method: attempt.method,
                    },
                    key,
                )
            });
    }

    by_name.into_values().map(|(summary, _)| summary).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::test_support::attempt;

    #[test]
    fn first_attempt_is_number_one() {
        let only = attempt("Alice", 2.5, 0);
        assert_eq!(ordinal_for_participant(&[only.clone()], &only), Some(1));
    }

    #[test]
    fn ordinals_follow_creation_order_per_name() {
        let a1 = attempt("Alice", 4.0, 0);
        let b1 = attempt("Bob", 3.0, 1);
        let a2 = attempt("Alice", 2.0, 2);
        let a3 = attempt("Alice", 5.0, 3);
        let all = vec![a3.clone(), a1.clone(), b1.clone(), a2.clone()];

        assert_eq!(ordinal_for_participant(&all, &a1), Some(1));
        assert_eq!(ordinal_for_participant(&all, &a2), Some(2));
        assert_eq!(ordinal_for_participant(&all, &a3), Some(3));
        assert_eq!(ordinal_for_participant(&all, &b1), Some(1));

        let ordinals = participant_ordinals(&all);
        assert_eq!(ordinals[&a1.id], 1);
        assert_eq!(ordinals[&a2.id], 2);
        assert_eq!(ordinals[&a3.id], 3);
        assert_eq!(ordinals[&b1.id], 1);
    }

    #[test]
    fn ordinals_restart_in_each_party() {
        let party_a = Some(Uuid::now_v7());
        let party_b = Some(Uuid::now_v7());
        let mut a1 = attempt("Alice", 5.0, 0);
        a1.party_id = party_a;
        let mut a2 = attempt("Alice", 6.0, 1);
        a2.party_id = party_a;
        let mut b1 = attempt("Alice", 2.0, 2);
        b1.party_id = party_b;
        let loose = attempt("Alice", 3.0, 3);
        let all = vec![a1.clone(), a2.clone(), b1.clone(), loose.clone()];

        assert_eq!(ordinal_for_participant(&all, &a2), Some(2));
        assert_eq!(ordinal_for_participant(&all, &b1), Some(1));
        assert_eq!(ordinal_for_participant(&all, &loose), Some(1));

        let ordinals = participant_ordinals(&all);
        assert_eq!(ordinals[&a2.id], 2);
        assert_eq!(ordinals[&b1.id], 1);
        assert_eq!(ordinals[&loose.id], 1);
    }

    #[test]
    fn names_match_case_sensitively() {
        let lower = attempt("alice", 3.0, 0);
        let upper = attempt("Alice", 3.0, 1);
        let all = vec![lower.clone(), upper.clone()];

        assert_eq!(ordinal_for_participant(&all, &upper), Some(1));
    }

    #[test]
    fn unknown_attempt_has_no_ordinal() {
        let stored = attempt("Alice", 3.0, 0);
        let stranger = attempt("Alice", 2.0, 1);
        assert_eq!(ordinal_for_participant(&[stored], &stranger), None);
    }

    #[test]
    fn participants_summarize_best_and_latest() {
        let mut early = attempt("Alice", 2.0, 0);
        early.beer_type = "stout".into();
        let mut late = attempt("Alice", 4.0, 5);
        late.beer_type = "lager".into();
        late.method = DrinkMethod::Can;
        let bob = attempt("Bob", 3.3, 2);

        let summary = participants(&[late, bob, early]);

        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].name, "Alice");
        assert_eq!(summary[0].attempts, 2);
        assert_eq!(summary[0].best_time, 2.0);
        assert_eq!(summary[0].latest_beer_type, "lager");
        assert_eq!(summary[0].latest_method, DrinkMethod::Can);
        assert_eq!(summary[1].name, "Bob");
    }
}
