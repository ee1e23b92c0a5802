//! End-to-end flows through the administrative service
//!
//! Covers:
//! - Pool verification and assignment persisted to the ledger
//! - Refused operations leaving the ledger untouched
//! - Submissions, duplicates and bulk quantification
//! - Replacement mid-cycle and period close
//! - Concurrent submissions against one period

use std::sync::Arc;

use chrono::{Duration, Utc};
use praise_admin::*;
use quantification::{
    Period, PeriodId, PeriodStatus, PraiseId, PraiseItem, QuantificationError,
    QuantificationInput, QuantificationSettings, UserId,
};
use tokio_test::{assert_err, assert_ok};

fn admin() -> UserId {
    UserId::from("admin")
}

fn period_id() -> PeriodId {
    PeriodId::from("2024-q1")
}

fn praise() -> Vec<PraiseItem> {
    let start = Utc::now();
    ["alice", "bob", "carol", "alice", "bob", "dave"]
        .iter()
        .enumerate()
        .map(|(i, receiver)| {
            PraiseItem::with_id(format!("praise-{}", i), "erin", *receiver)
                .with_created_at(start + Duration::seconds(i as i64))
        })
        .collect()
}

fn setup(pool: &[&str]) -> (Arc<InMemoryLedger>, QuantificationService) {
    let items = praise();
    let period = Period::new(period_id(), Utc::now()).with_participants_from(&items);
    let ledger = Arc::new(
        InMemoryLedger::new()
            .with_period(period, items)
            .with_quantifier_pool(pool.iter().map(|q| UserId::from(*q))),
    );
    let settings = QuantificationSettings::default()
        .with_redundancy(2)
        .with_praise_per_quantifier(10)
        .with_duplicate_discount(0.5);
    let service = QuantificationService::new(ledger.clone())
        .with_config(AdminConfig::new("praise-bot").with_settings(settings))
        .unwrap();
    (ledger, service)
}

async fn holders(ledger: &InMemoryLedger, praise_id: &str) -> Vec<UserId> {
    let items = ledger.get_praise_items_for_period(&period_id()).await.unwrap();
    items
        .iter()
        .find(|i| i.id.as_str() == praise_id)
        .map(|i| i.quantifications.iter().map(|q| q.quantifier.clone()).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_assignment_is_persisted() {
    let (ledger, service) = setup(&["q1", "q2", "q3"]);

    let report = assert_ok!(service.verify_quantifier_pool_size(&period_id(), &admin()).await);
    assert!(report.is_sufficient());

    let response = assert_ok!(service.assign_quantifiers(&period_id(), &admin()).await);
    assert_eq!(response.period.status, PeriodStatus::Quantify);
    assert_eq!(response.digest.len(), 64);

    let stored = ledger.get_period(&period_id()).await.unwrap().unwrap();
    assert_eq!(stored.status, PeriodStatus::Quantify);
    assert_eq!(stored.quantifiers.len(), 3);

    let items = ledger.get_praise_items_for_period(&period_id()).await.unwrap();
    assert!(items.iter().all(|i| i.quantifications.len() == 2));

    let progress = assert_ok!(service.quantifier_progress(&period_id()).await);
    let total: usize = progress.iter().map(|p| p.assigned_count).sum();
    assert_eq!(total, 12);
    assert!(progress.iter().all(|p| p.assigned_count == 4));
}

#[tokio::test]
async fn test_refused_assignment_writes_nothing() {
    let (ledger, service) = setup(&[]);

    let err = assert_err!(service.assign_quantifiers(&period_id(), &admin()).await);
    assert!(matches!(
        err,
        AdminError::Quantification(QuantificationError::InsufficientPool { deficit: 1 })
    ));
    assert_eq!(ledger.write_count(), 0);

    let stored = ledger.get_period(&period_id()).await.unwrap().unwrap();
    assert_eq!(stored.status, PeriodStatus::Open);

    // A second assignment after success is refused too
    ledger
        .set_quantifier_pool(vec![UserId::from("q1"), UserId::from("q2")])
        .await;
    assert_ok!(service.assign_quantifiers(&period_id(), &admin()).await);
    let err = assert_err!(service.assign_quantifiers(&period_id(), &admin()).await);
    assert!(matches!(
        err,
        AdminError::Quantification(QuantificationError::InvalidPeriodStatus { .. })
    ));
}

#[tokio::test]
async fn test_submissions_and_duplicates() {
    let (ledger, service) = setup(&["q1", "q2", "q3"]);
    assert_ok!(service.assign_quantifiers(&period_id(), &admin()).await);

    let original = PraiseId::from("praise-0");
    for holder in holders(&ledger, "praise-0").await {
        assert_ok!(service.quantify(&original, &holder, &QuantificationInput::score(8)).await);
    }

    // praise-3 repeats praise-0 (both for alice)
    let copy = PraiseId::from("praise-3");
    let copy_holder = holders(&ledger, "praise-3").await[0].clone();
    let changed = assert_ok!(
        service
            .quantify(&copy, &copy_holder, &QuantificationInput::duplicate_of("praise-0"))
            .await
    );
    assert_eq!(changed.len(), 1);
    assert_eq!(changed[0].score_realized, 4.0);

    // Re-scoring the original carries over to the duplicate
    let first_holder = holders(&ledger, "praise-0").await[0].clone();
    let changed = assert_ok!(
        service
            .quantify(&original, &first_holder, &QuantificationInput::score(13))
            .await
    );
    assert_eq!(changed.len(), 2);
    let items = ledger.get_praise_items_for_period(&period_id()).await.unwrap();
    assert_eq!(items[0].score_realized, 10.5);
    assert_eq!(items[3].score_realized, 5.25);

    // Closing the loop is refused
    let err = assert_err!(
        service
            .quantify(&original, &first_holder, &QuantificationInput::duplicate_of("praise-3"))
            .await
    );
    assert!(matches!(
        err,
        AdminError::Quantification(QuantificationError::DuplicateCycle { .. })
    ));

    let totals = assert_ok!(service.receiver_totals(&period_id()).await);
    let alice = totals.iter().find(|t| t.receiver_id.as_str() == "alice").unwrap();
    assert_eq!(alice.praise_count, 2);
    assert_eq!(alice.score_realized, 15.75);
}

#[tokio::test]
async fn test_invalid_submissions() {
    let (ledger, service) = setup(&["q1", "q2", "q3"]);
    assert_ok!(service.assign_quantifiers(&period_id(), &admin()).await);
    let holder = holders(&ledger, "praise-1").await[0].clone();
    let praise_id = PraiseId::from("praise-1");

    let err = assert_err!(service.quantify(&praise_id, &holder, &QuantificationInput::score(4)).await);
    assert!(matches!(
        err,
        AdminError::Quantification(QuantificationError::InvalidScore { score: 4 })
    ));

    let err = assert_err!(
        service
            .quantify(&praise_id, &UserId::from("stranger"), &QuantificationInput::score(5))
            .await
    );
    assert!(matches!(
        err,
        AdminError::Quantification(QuantificationError::NotAssigned { .. })
    ));

    // q1..q3 each hold four of the six items
    let items = ledger.get_praise_items_for_period(&period_id()).await.unwrap();
    let (idle, item) = ["q1", "q2", "q3"]
        .iter()
        .map(|q| UserId::from(*q))
        .find_map(|q| {
            items
                .iter()
                .find(|i| i.quantification_by(&q).is_none())
                .map(|i| (q, i.id.clone()))
        })
        .unwrap();
    let err = assert_err!(service.quantify(&item, &idle, &QuantificationInput::score(5)).await);
    assert!(matches!(
        err,
        AdminError::Quantification(QuantificationError::NotQuantifierOfPraise { .. })
    ));

    let err = assert_err!(
        service
            .quantify(&PraiseId::from("missing"), &holder, &QuantificationInput::score(5))
            .await
    );
    assert!(matches!(err, AdminError::PraiseNotFound(_)));

    let refused = service.audit().stats().await.refused;
    assert_eq!(refused, 3);
}

#[tokio::test]
async fn test_quantify_multiple() {
    let (ledger, service) = setup(&["q1", "q2", "q3"]);
    assert_ok!(service.assign_quantifiers(&period_id(), &admin()).await);

    let items = ledger.get_praise_items_for_period(&period_id()).await.unwrap();
    let quantifier = UserId::from("q1");
    let mine: Vec<PraiseId> = items
        .iter()
        .filter(|i| i.quantification_by(&quantifier).is_some())
        .map(|i| i.id.clone())
        .collect();
    assert!(!mine.is_empty());

    let request = QuantifyMultipleRequest {
        praise_ids: mine.clone(),
        input: QuantificationInput::dismiss(),
    };
    let changed = assert_ok!(service.quantify_multiple(&quantifier, &request).await);
    assert_eq!(changed.len(), mine.len());

    let progress = assert_ok!(service.quantifier_progress(&period_id()).await);
    let q1 = progress.iter().find(|p| p.quantifier_id == quantifier).unwrap();
    assert!(q1.is_done());

    let empty = QuantifyMultipleRequest {
        praise_ids: vec![],
        input: QuantificationInput::score(5),
    };
    assert!(assert_ok!(service.quantify_multiple(&quantifier, &empty).await).is_empty());
}

#[tokio::test]
async fn test_replace_then_close() {
    let (ledger, service) = setup(&["q1", "q2", "q3"]);
    assert_ok!(service.assign_quantifiers(&period_id(), &admin()).await);

    // q1 finishes one item before leaving
    let items = ledger.get_praise_items_for_period(&period_id()).await.unwrap();
    let outgoing = UserId::from("q1");
    let finished = items
        .iter()
        .find(|i| i.quantification_by(&outgoing).is_some())
        .map(|i| i.id.clone())
        .unwrap();
    assert_ok!(service.quantify(&finished, &outgoing, &QuantificationInput::score(5)).await);

    let request = ReplaceQuantifierRequest {
        current_quantifier_id: outgoing.clone(),
        new_quantifier_id: UserId::from("q4"),
    };
    let response = assert_ok!(service.replace_quantifier(&period_id(), &request, &admin()).await);
    assert!(response.period.has_quantifier(&UserId::from("q4")));
    assert!(response.praise_items.iter().all(|i| i.id != finished));

    let items = ledger.get_praise_items_for_period(&period_id()).await.unwrap();
    let kept = items.iter().find(|i| i.id == finished).unwrap();
    assert_eq!(kept.quantification_by(&outgoing).map(|q| q.score), Some(5));

    // Replacing again with the same newcomer is refused
    let again = ReplaceQuantifierRequest {
        current_quantifier_id: UserId::from("q2"),
        new_quantifier_id: UserId::from("q4"),
    };
    let err = assert_err!(service.replace_quantifier(&period_id(), &again, &admin()).await);
    assert!(matches!(
        err,
        AdminError::Quantification(QuantificationError::AlreadyAssigned { .. })
    ));

    let closed = assert_ok!(service.close_period(&period_id(), &admin()).await);
    assert_eq!(closed.status, PeriodStatus::Closed);

    let err = assert_err!(service.replace_quantifier(&period_id(), &request, &admin()).await);
    assert!(matches!(
        err,
        AdminError::Quantification(QuantificationError::InvalidPeriodStatus { .. })
    ));

    let history = service.audit().get_by_period(&period_id(), 10).await;
    assert_eq!(history[0].action, AuditAction::ReplaceQuantifier);
    assert_eq!(history[1].action, AuditAction::ClosePeriod);
}

#[tokio::test]
async fn test_concurrent_submissions_are_all_kept() {
    let (ledger, service) = setup(&["q1", "q2", "q3"]);
    let service = Arc::new(service);
    assert_ok!(service.assign_quantifiers(&period_id(), &admin()).await);

    let items = ledger.get_praise_items_for_period(&period_id()).await.unwrap();
    let mut handles = Vec::new();
    for item in &items {
        for q in &item.quantifications {
            let service = service.clone();
            let praise_id = item.id.clone();
            let quantifier = q.quantifier.clone();
            handles.push(tokio::spawn(async move {
                service
                    .quantify(&praise_id, &quantifier, &QuantificationInput::score(3))
                    .await
            }));
        }
    }
    for handle in handles {
        assert_ok!(handle.await.unwrap());
    }

    let items = ledger.get_praise_items_for_period(&period_id()).await.unwrap();
    assert!(items
        .iter()
        .all(|i| i.quantifications.iter().all(|q| q.score == 3)));
    assert!(items.iter().all(|i| i.score_realized == 3.0));
}
