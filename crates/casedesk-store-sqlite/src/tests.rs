//! Integration tests for `SqliteStore` against an in-memory database.

use casedesk_core::{
  case::{
    CREATED_NOTE, CaseId, CaseUpdate, DEFAULT_API_AREA, DEFAULT_SPECIALIST_ID,
    NewCase, SYSTEM_AUTHOR,
  },
  store::{Aggregation, CaseFilter, CaseStore, GroupField},
  vocab::{CaseStatus, Marketplace, Priority, SubStatus, Workstream},
};
use chrono::{Duration, NaiveDate, Utc};

use crate::{Error, SqliteStore, schema};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn new_case(seller: &str, marketplace: Marketplace) -> NewCase {
  NewCase {
    marketplace: Some(marketplace),
    ..NewCase::new(seller, "Auth failure")
  }
}

async fn row_counts(s: &SqliteStore) -> (i64, i64) {
  s.conn
    .call(|conn| {
      let cases = conn.query_row("SELECT COUNT(*) FROM cases", [], |r| r.get(0))?;
      let updates =
        conn.query_row("SELECT COUNT(*) FROM updates", [], |r| r.get(0))?;
      Ok((cases, updates))
    })
    .await
    .unwrap()
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_fills_defaults_and_records_creation() {
  let s = store().await;
  let case = s.create_case(NewCase::new("Acme", "Auth failure")).await.unwrap();

  assert_eq!(case.case_id.as_str(), "CASE-0001");
  assert_eq!(case.case_status, CaseStatus::Submitted);
  assert_eq!(case.last_sub_status, SubStatus::CaseCreated);
  assert_eq!(case.specialist_id, DEFAULT_SPECIALIST_ID);
  assert_eq!(case.api_area, DEFAULT_API_AREA);
  assert!((10_000..100_000).contains(&case.seller_id));
  assert_eq!(case.listing_start_date, Some(Utc::now().date_naive()));

  let detail = s.get_case(case.case_id.clone(), 5).await.unwrap().unwrap();
  assert_eq!(detail.case, case);
  assert_eq!(detail.recent_updates.len(), 1);
  let created = &detail.recent_updates[0];
  assert_eq!(created.note, CREATED_NOTE);
  assert_eq!(created.author, SYSTEM_AUTHOR);
  assert_eq!(created.sub_status, SubStatus::CaseCreated);
}

#[tokio::test]
async fn create_assigns_sequential_ids() {
  let s = store().await;
  for seller in ["A", "B"] {
    s.create_case(NewCase::new(seller, "x")).await.unwrap();
  }
  let third = s.create_case(NewCase::new("C", "x")).await.unwrap();
  assert_eq!(third.case_id, CaseId::from_seq(3));
}

#[tokio::test]
async fn create_keeps_supplied_seller_id() {
  let s = store().await;
  let case = s
    .create_case(NewCase {
      seller_id: Some(424242),
      ..NewCase::new("Acme", "x")
    })
    .await
    .unwrap();
  assert_eq!(case.seller_id, 424242);
}

#[tokio::test]
async fn create_rejects_missing_seller_without_writing() {
  let s = store().await;
  let err = s
    .create_case(NewCase {
      issue_type: Some("x".into()),
      ..NewCase::default()
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(_)));
  assert_eq!(row_counts(&s).await, (0, 0));
}

// ─── Updates ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_moves_status_and_keeps_history() {
  let s = store().await;
  let case = s.create_case(NewCase::new("Acme", "x")).await.unwrap();

  let update = s
    .apply_update(CaseUpdate::new(
      case.case_id.clone(),
      "Handed over",
      SubStatus::Handover,
      "Alice",
    ))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(update.sub_status, SubStatus::Handover);

  let detail = s.get_case(case.case_id.clone(), 5).await.unwrap().unwrap();
  assert_eq!(detail.case.last_sub_status, SubStatus::Handover);
  assert_eq!(detail.case.case_status, CaseStatus::Completed);
  assert!(detail.case.updated_at >= case.updated_at);
  assert_eq!(detail.recent_updates.len(), 2);
  assert_eq!(detail.recent_updates[0], update);
  assert_eq!(detail.case.updated_at, update.timestamp);
}

#[tokio::test]
async fn update_with_unmapped_sub_status_falls_back_to_wip() {
  let s = store().await;
  let case = s.create_case(NewCase::new("Acme", "x")).await.unwrap();
  s.apply_update(CaseUpdate::new(
    case.case_id.clone(),
    "Draft sent",
    SubStatus::PmaDraft,
    "Alice",
  ))
  .await
  .unwrap();

  let detail = s.get_case(case.case_id, 1).await.unwrap().unwrap();
  assert_eq!(detail.case.case_status, CaseStatus::Wip);
}

#[tokio::test]
async fn update_sets_optional_fields_only_when_given() {
  let s = store().await;
  let case = s.create_case(NewCase::new("Acme", "x")).await.unwrap();

  let mut first =
    CaseUpdate::new(case.case_id.clone(), "csat", SubStatus::Note, "Bob");
  first.satisfaction_score = Some(4.0);
  first.feedback_received = Some(true);
  first.listing_completion_date = NaiveDate::from_ymd_opt(2024, 2, 1);
  s.apply_update(first).await.unwrap();

  s.apply_update(CaseUpdate::new(
    case.case_id.clone(),
    "plain",
    SubStatus::Note,
    "Bob",
  ))
  .await
  .unwrap();

  let detail = s.get_case(case.case_id, 5).await.unwrap().unwrap();
  assert_eq!(detail.case.satisfaction_score, Some(4.0));
  assert!(detail.case.feedback_received);
  assert_eq!(
    detail.case.listing_completion_date,
    NaiveDate::from_ymd_opt(2024, 2, 1)
  );
}

#[tokio::test]
async fn update_of_unknown_case_writes_nothing() {
  let s = store().await;
  s.create_case(NewCase::new("Acme", "x")).await.unwrap();
  let before = row_counts(&s).await;

  let result = s
    .apply_update(CaseUpdate::new(
      CaseId::from_seq(99),
      "n",
      SubStatus::Note,
      "me",
    ))
    .await
    .unwrap();
  assert!(result.is_none());
  assert_eq!(row_counts(&s).await, before);
}

#[tokio::test]
async fn update_rejects_out_of_range_satisfaction() {
  let s = store().await;
  let case = s.create_case(NewCase::new("Acme", "x")).await.unwrap();
  let mut update = CaseUpdate::new(case.case_id, "n", SubStatus::Note, "me");
  update.satisfaction_score = Some(9.0);
  assert!(s.apply_update(update).await.is_err());
  assert_eq!(row_counts(&s).await, (1, 1));
}

#[tokio::test]
async fn get_case_returns_newest_updates_first() {
  let s = store().await;
  let case = s.create_case(NewCase::new("Acme", "x")).await.unwrap();
  for i in 0..7 {
    s.apply_update(CaseUpdate::new(
      case.case_id.clone(),
      format!("note {i}"),
      SubStatus::Note,
      "me",
    ))
    .await
    .unwrap();
  }

  let detail = s.get_case(case.case_id, 5).await.unwrap().unwrap();
  let notes: Vec<_> =
    detail.recent_updates.iter().map(|u| u.note.as_str()).collect();
  assert_eq!(notes, ["note 6", "note 5", "note 4", "note 3", "note 2"]);
}

#[tokio::test]
async fn get_case_missing_returns_none() {
  let s = store().await;
  assert!(s.get_case(CaseId::from_seq(1), 5).await.unwrap().is_none());
}

// ─── Listing & analytics ─────────────────────────────────────────────────────

#[tokio::test]
async fn list_orders_by_most_recent_update() {
  let s = store().await;
  let a = s.create_case(new_case("A", Marketplace::Eu)).await.unwrap();
  let b = s.create_case(new_case("B", Marketplace::Na)).await.unwrap();
  s.apply_update(CaseUpdate::new(a.case_id.clone(), "n", SubStatus::Note, "me"))
    .await
    .unwrap();

  let all = s.list_cases(&CaseFilter::default()).await.unwrap();
  let ids: Vec<_> = all.iter().map(|c| c.case_id.clone()).collect();
  assert_eq!(ids, [a.case_id, b.case_id]);
}

#[tokio::test]
async fn list_applies_filter() {
  let s = store().await;
  s.create_case(new_case("A", Marketplace::Eu)).await.unwrap();
  s.create_case(new_case("B", Marketplace::Na)).await.unwrap();
  s.create_case(new_case("C", Marketplace::Eu)).await.unwrap();

  let filter = CaseFilter {
    marketplaces: vec![Marketplace::Eu],
    ..CaseFilter::default()
  };
  let eu = s.list_cases(&filter).await.unwrap();
  assert_eq!(eu.len(), 2);
  assert!(eu.iter().all(|c| filter.matches(c)));
}

#[tokio::test]
async fn aggregate_groups_and_orders_by_count() {
  let s = store().await;
  s.create_case(new_case("A", Marketplace::Eu)).await.unwrap();
  s.create_case(new_case("B", Marketplace::Na)).await.unwrap();
  s.create_case(new_case("C", Marketplace::Eu)).await.unwrap();

  let result = s
    .aggregate(&Aggregation {
      group_by: Some(GroupField::Marketplace),
      ..Aggregation::default()
    })
    .await
    .unwrap();

  assert_eq!(result.total, 3);
  let groups: Vec<_> = result
    .groups
    .iter()
    .map(|g| (g.key.as_str(), g.count))
    .collect();
  assert_eq!(groups, [("EU", 2), ("NA", 1)]);
}

#[tokio::test]
async fn aggregate_without_group_counts_matches() {
  let s = store().await;
  s.create_case(new_case("A", Marketplace::Eu)).await.unwrap();
  s.create_case(new_case("B", Marketplace::Na)).await.unwrap();

  let result = s
    .aggregate(&Aggregation {
      filter:   CaseFilter {
        marketplaces: vec![Marketplace::Na],
        ..CaseFilter::default()
      },
      group_by: None,
    })
    .await
    .unwrap();
  assert_eq!(result.total, 1);
  assert!(result.groups.is_empty());
}

#[tokio::test]
async fn aggregate_with_no_matches_is_zero() {
  let s = store().await;
  s.create_case(new_case("A", Marketplace::Eu)).await.unwrap();

  let result = s
    .aggregate(&Aggregation {
      filter:   CaseFilter {
        priorities: vec![Priority::High],
        ..CaseFilter::default()
      },
      group_by: Some(GroupField::CaseStatus),
    })
    .await
    .unwrap();
  assert_eq!(result.total, 0);
  assert!(result.groups.is_empty());
}

#[tokio::test]
async fn aggregate_by_created_range() {
  let s = store().await;
  s.create_case(new_case("A", Marketplace::Eu)).await.unwrap();
  let today = Utc::now().date_naive();

  let mut query = Aggregation::default();
  query.filter.created = Some(casedesk_core::store::DateRange::new(
    today - Duration::days(1),
    today,
  ));
  assert_eq!(s.aggregate(&query).await.unwrap().total, 1);

  query.filter.created = Some(casedesk_core::store::DateRange::new(
    today - Duration::days(10),
    today - Duration::days(5),
  ));
  assert_eq!(s.aggregate(&query).await.unwrap().total, 0);
}

#[tokio::test]
async fn breakdown_groups_by_hierarchy() {
  let s = store().await;
  s.create_case(new_case("A", Marketplace::Eu)).await.unwrap();
  s.create_case(new_case("B", Marketplace::Eu)).await.unwrap();
  s.create_case(new_case("C", Marketplace::Na)).await.unwrap();

  let rows = s.breakdown(&CaseFilter::default()).await.unwrap();
  assert_eq!(rows.len(), 2);
  assert!(rows.iter().all(|r| r.workstream == Workstream::Dsr));
  let eu = rows
    .iter()
    .find(|r| r.marketplace == Marketplace::Eu)
    .unwrap();
  assert_eq!(eu.count, 2);
  assert_eq!(eu.last_sub_status, SubStatus::CaseCreated);
}

#[tokio::test]
async fn count_updates_since_respects_cutoff() {
  let s = store().await;
  let case = s.create_case(NewCase::new("Acme", "x")).await.unwrap();
  s.apply_update(CaseUpdate::new(case.case_id, "n", SubStatus::Note, "me"))
    .await
    .unwrap();

  let hour_ago = Utc::now() - Duration::hours(1);
  assert_eq!(s.count_updates_since(hour_ago).await.unwrap(), 2);
  let later = Utc::now() + Duration::hours(1);
  assert_eq!(s.count_updates_since(later).await.unwrap(), 0);
}

// ─── Schema & seed ───────────────────────────────────────────────────────────

#[tokio::test]
async fn migration_from_v1_keeps_rows() {
  let conn = tokio_rusqlite::Connection::open_in_memory().await.unwrap();
  conn
    .call(|conn| {
      schema::migrate_to(conn, 1)?;
      conn.execute(
        "INSERT INTO cases (case_id, seller_id, seller_name, specialist_id,
           specialist_name, marketplace, case_source, case_status, workstream,
           listing_start_date, listing_completion_date, issue_type, complexity,
           priority, api_area, integration_type, seller_type, notes,
           last_sub_status)
         VALUES ('CASE-0001', 1, 'Old Seller', 'SPEC001', 'Alice', 'EU',
           'ASTRO', 'WIP', 'DSR', '2024-01-01', '', 'Legacy', 'Easy', 'Low',
           'Orders API', 'REST API', 'NEW', '', 'INT_WIP')",
        [],
      )?;
      Ok(())
    })
    .await
    .unwrap();

  let s = SqliteStore { conn };
  s.init_schema().await.unwrap();

  let detail = s.get_case(CaseId::from_seq(1), 5).await.unwrap().unwrap();
  assert_eq!(detail.case.seller_name, "Old Seller");
  assert_eq!(detail.case.listing_completion_date, None);
  assert!(!detail.case.feedback_received);
  assert_eq!(detail.case.case_reference, None);

  let next = s.create_case(NewCase::new("New", "x")).await.unwrap();
  assert_eq!(next.case_id, CaseId::from_seq(2));
}

#[tokio::test]
async fn seed_populates_once() {
  let s = store().await;
  assert!(s.seed_demo_data().await.unwrap());
  assert!(!s.seed_demo_data().await.unwrap());
  assert_eq!(row_counts(&s).await, (3, 7));

  let first = s.get_case(CaseId::from_seq(1), 5).await.unwrap().unwrap();
  assert_eq!(first.case.seller_name, "TechCorp Solutions");
  assert_eq!(first.case.last_sub_status, SubStatus::Pma);
  assert_eq!(first.case.case_status, CaseStatus::Wip);
  assert_eq!(first.recent_updates[0].sub_status, SubStatus::Pma);

  let second = s.get_case(CaseId::from_seq(2), 5).await.unwrap().unwrap();
  assert_eq!(second.case.case_status, CaseStatus::Completed);
  assert_eq!(second.case.satisfaction_score, Some(4.5));

  let next = s.create_case(NewCase::new("New", "x")).await.unwrap();
  assert_eq!(next.case_id, CaseId::from_seq(4));
}

#[tokio::test]
async fn seed_skips_non_empty_store() {
  let s = store().await;
  s.create_case(NewCase::new("Acme", "x")).await.unwrap();
  assert!(!s.seed_demo_data().await.unwrap());
  assert_eq!(row_counts(&s).await, (1, 1));
}
