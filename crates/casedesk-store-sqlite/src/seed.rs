//! Demo data for a fresh database.

use casedesk_core::{
  case::{CREATED_NOTE, Case, CaseId, SYSTEM_AUTHOR},
  vocab::{
    CaseSource, Complexity, Marketplace, Priority, SellerType, SubStatus,
    Workstream,
  },
};
use chrono::{DateTime, Duration, NaiveDate, TimeZone as _, Utc};

use crate::{
  Result, SqliteStore,
  encode::stored_now,
  store::{insert_case, insert_update},
};

struct SampleUpdate {
  case_seq:   u64,
  note:       &'static str,
  author:     &'static str,
  sub_status: SubStatus,
}

const SAMPLE_UPDATES: &[SampleUpdate] = &[
  SampleUpdate {
    case_seq:   1,
    note:       "Seller provided API credentials for testing",
    author:     "Alice Johnson",
    sub_status: SubStatus::IntWip,
  },
  SampleUpdate {
    case_seq:   1,
    note:       "API key validated successfully",
    author:     "Alice Johnson",
    sub_status: SubStatus::Pma,
  },
  SampleUpdate {
    case_seq:   2,
    note:       "Issue resolved and handed over to seller",
    author:     "Bob Smith",
    sub_status: SubStatus::Handover,
  },
  SampleUpdate {
    case_seq:   3,
    note:       "Integration started for new seller",
    author:     "Alice Johnson",
    sub_status: SubStatus::IntStart,
  },
];

fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
  NaiveDate::from_ymd_opt(y, m, d)
}

fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
  Utc
    .with_ymd_and_hms(y, m, d, h, 0, 0)
    .single()
    .unwrap_or(DateTime::UNIX_EPOCH)
}

fn sample_cases() -> Vec<Case> {
  let base = |seq: u64, created_at: DateTime<Utc>| Case {
    case_id: CaseId::from_seq(seq),
    case_reference: None,
    seller_id: 0,
    seller_name: String::new(),
    specialist_id: "SPEC001".to_owned(),
    specialist_name: "Alice Johnson".to_owned(),
    marketplace: Marketplace::Eu,
    case_source: CaseSource::Astro,
    case_status: SubStatus::CaseCreated.case_status(),
    workstream: Workstream::SmartConnectEu,
    listing_start_date: Some(created_at.date_naive()),
    listing_completion_date: None,
    issue_type: String::new(),
    complexity: Complexity::Medium,
    priority: Priority::Medium,
    api_area: String::new(),
    integration_type: "REST API".to_owned(),
    seller_type: SellerType::Existing,
    feedback_received: false,
    satisfaction_score: None,
    notes: String::new(),
    last_sub_status: SubStatus::CaseCreated,
    created_at,
    updated_at: created_at,
  };

  vec![
    Case {
      case_reference: Some("AMZ-12345678".to_owned()),
      seller_id: 12345,
      seller_name: "TechCorp Solutions".to_owned(),
      issue_type: "API Authentication".to_owned(),
      priority: Priority::High,
      api_area: "Product API".to_owned(),
      notes: "Seller having trouble with API key authentication".to_owned(),
      ..base(1, at(2024, 1, 15, 10))
    },
    Case {
      case_reference: Some("AMZ-87654321".to_owned()),
      seller_id: 67890,
      seller_name: "Global Retailers Inc".to_owned(),
      specialist_id: "SPEC002".to_owned(),
      specialist_name: "Bob Smith".to_owned(),
      marketplace: Marketplace::Na,
      case_source: CaseSource::Winston,
      workstream: Workstream::Dsr,
      listing_completion_date: date(2024, 1, 20),
      issue_type: "Data Sync Issues".to_owned(),
      complexity: Complexity::Hard,
      priority: Priority::High,
      api_area: "Inventory API".to_owned(),
      integration_type: "Webhook".to_owned(),
      feedback_received: true,
      satisfaction_score: Some(4.5),
      notes: "Inventory sync issue resolved successfully".to_owned(),
      ..base(2, at(2024, 1, 10, 9))
    },
    Case {
      case_reference: Some("AMZ-11111111".to_owned()),
      seller_id: 11111,
      seller_name: "SmartConnect Store".to_owned(),
      issue_type: "Integration Setup".to_owned(),
      complexity: Complexity::Easy,
      api_area: "Orders API".to_owned(),
      seller_type: SellerType::New,
      notes: "New seller onboarding for Smart Connect".to_owned(),
      ..base(3, at(2024, 1, 12, 14))
    },
  ]
}

impl SqliteStore {
  /// Insert the three demo cases and their history into an empty store.
  ///
  /// Returns `false` (and writes nothing) when any case already exists.
  pub async fn seed_demo_data(&self) -> Result<bool> {
    let now = stored_now();

    let seeded = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let count: i64 =
          tx.query_row("SELECT COUNT(*) FROM cases", [], |r| r.get(0))?;
        if count > 0 {
          return Ok(false);
        }

        let step = SAMPLE_UPDATES.len() as i64;
        for mut case in sample_cases() {
          let history: Vec<(DateTime<Utc>, &SampleUpdate)> = SAMPLE_UPDATES
            .iter()
            .enumerate()
            .filter(|(_, u)| u.case_seq == case.case_id.seq())
            .map(|(i, u)| (now - Duration::seconds(step - i as i64), u))
            .collect();

          if let Some((ts, last)) = history.last() {
            case.last_sub_status = last.sub_status;
            case.case_status = last.sub_status.case_status();
            case.updated_at = *ts;
          }

          insert_case(&tx, &case)?;
          insert_update(
            &tx,
            &case.case_id,
            CREATED_NOTE,
            SYSTEM_AUTHOR,
            case.created_at,
            SubStatus::CaseCreated,
          )?;
          for (ts, u) in &history {
            insert_update(
              &tx,
              &case.case_id,
              u.note,
              u.author,
              *ts,
              u.sub_status,
            )?;
          }
        }

        tx.commit()?;
        Ok(true)
      })
      .await?;

    if seeded {
      tracing::info!("seeded demo cases");
    }
    Ok(seeded)
  }
}
