use std::collections::HashMap;

use chrono::{Duration, Utc};
use proptest::prelude::*;
use quantification::*;

const MAX_MEMBERS: usize = 8;
const MAX_ITEMS: usize = 40;

/// Praise among community members `m0..mN` plus a pool of outside quantifiers.
fn period_strategy() -> impl Strategy<Value = (Vec<PraiseItem>, Vec<UserId>, usize)> {
    (2usize..=MAX_MEMBERS, 1usize..=3).prop_flat_map(|(members, redundancy)| {
        (
            prop::collection::vec((0..members, 0..members), 1..=MAX_ITEMS),
            redundancy..=redundancy + 4,
            Just(redundancy),
        )
            .prop_map(move |(pairs, pool_size, redundancy)| {
                let start = Utc::now();
                let items = pairs
                    .into_iter()
                    .enumerate()
                    .map(|(i, (giver, receiver))| {
                        PraiseItem::with_id(format!("p{}", i), format!("m{}", giver), format!("m{}", receiver))
                            .with_created_at(start + Duration::seconds(i as i64))
                    })
                    .collect();
                let pool = (0..pool_size).map(|i| UserId::new(format!("q{}", i))).collect();
                (items, pool, redundancy)
            })
    })
}

fn settings_for(redundancy: usize) -> QuantificationSettings {
    QuantificationSettings::default()
        .with_redundancy(redundancy)
        .with_praise_per_quantifier(MAX_ITEMS * 3)
}

fn score_strategy() -> impl Strategy<Value = (u32, bool)> {
    (
        prop::sample::select(settings::DEFAULT_ALLOWED_SCORES.to_vec()),
        prop::bool::weighted(0.2),
    )
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        failure_persistence: None,
        ..ProptestConfig::default()
    })]

    #[test]
    fn assignment_gives_exact_redundancy((items, pool, redundancy) in period_strategy()) {
        let period = Period::new("p", Utc::now()).with_participants_from(&items);
        let outcome = assign_quantifiers(&period, &items, &pool, &settings_for(redundancy)).unwrap();

        prop_assert_eq!(outcome.praise_items.len(), items.len());
        for item in &outcome.praise_items {
            prop_assert_eq!(item.quantifications.len(), redundancy);
            for q in &item.quantifications {
                prop_assert!(!item.involves(&q.quantifier));
            }
        }
    }

    #[test]
    fn assignment_is_balanced_under_uniform_eligibility((items, pool, redundancy) in period_strategy()) {
        let period = Period::new("p", Utc::now()).with_participants_from(&items);
        let outcome = assign_quantifiers(&period, &items, &pool, &settings_for(redundancy)).unwrap();

        let max = outcome.loads.iter().map(|e| e.assigned_count).max().unwrap_or(0);
        let min = outcome.loads.iter().map(|e| e.assigned_count).min().unwrap_or(0);
        prop_assert!(max - min <= 1);
    }

    #[test]
    fn members_are_never_assigned_their_own_praise(pairs in prop::collection::vec((0usize..6, 0usize..6), 1..30)) {
        let items: Vec<PraiseItem> = pairs
            .iter()
            .enumerate()
            .map(|(i, (g, r))| PraiseItem::with_id(format!("p{}", i), format!("u{}", g), format!("u{}", r)))
            .collect();
        let period = Period::new("p", Utc::now()).with_participants_from(&items);
        let pool: Vec<UserId> = (0..6).map(|i| UserId::new(format!("u{}", i))).collect();

        match assign_quantifiers(&period, &items, &pool, &settings_for(2)) {
            Ok(outcome) => {
                for item in &outcome.praise_items {
                    prop_assert_eq!(item.quantifications.len(), 2);
                    for q in &item.quantifications {
                        prop_assert!(!item.involves(&q.quantifier));
                    }
                }
            }
            Err(err) => {
                let is_infeasible = matches!(err, QuantificationError::AssignmentInfeasible { .. });
                prop_assert!(is_infeasible);
            }
        }
    }

    #[test]
    fn no_receivers_never_short(quantifiers in 0usize..100, redundancy in 1usize..5, per in 1usize..100) {
        prop_assert_eq!(check_pool_size(0, quantifiers, redundancy, per).deficit, 0);
    }

    #[test]
    fn realized_score_is_idempotent(slots in prop::collection::vec(score_strategy(), 1..6)) {
        let mut item = PraiseItem::with_id("x", "g", "r");
        for (i, (score, dismissed)) in slots.into_iter().enumerate() {
            let mut q = Quantification::placeholder(UserId::new(format!("q{}", i)));
            q.score = score;
            q.dismissed = dismissed;
            item.quantifications.push(q);
        }
        let scorer = ConsensusScorer::default();
        let lookup: HashMap<PraiseId, f64> = HashMap::new();

        let first = scorer.realize(&item, &lookup);
        scorer.refresh(&mut item, &lookup);
        prop_assert_eq!(scorer.realize(&item, &lookup), first);
        prop_assert!(first >= 0.0);
    }

    #[test]
    fn replacement_never_touches_submitted_work(
        (items, pool, redundancy) in period_strategy(),
        submissions in prop::collection::vec(score_strategy(), MAX_ITEMS),
    ) {
        let settings = settings_for(redundancy);
        let period = Period::new("p", Utc::now()).with_participants_from(&items);
        let outcome = assign_quantifiers(&period, &items, &pool, &settings).unwrap();
        let period = outcome.period;
        let mut items = outcome.praise_items;

        // Resolve the first slot of some items
        for (item, (score, dismissed)) in items.iter_mut().zip(submissions) {
            let q = &mut item.quantifications[0];
            q.score = score;
            q.dismissed = dismissed;
        }

        let outgoing = period.quantifiers[0].clone();
        let replacement = UserId::from("newcomer");
        let before = items.clone();

        let outcome = replace_quantifier(&period, &outgoing, &replacement, &items, &settings).unwrap();
        for changed in &outcome.praise_items {
            let original = before.iter().find(|i| i.id == changed.id).unwrap();
            for (old, new) in original.quantifications.iter().zip(&changed.quantifications) {
                if old.is_resolved() {
                    prop_assert_eq!(old, new);
                }
            }
        }
        prop_assert!(!outcome.period.has_quantifier(&outgoing));
        prop_assert!(outcome.period.has_quantifier(&replacement));
    }
}
