//! Query-string filters shared by the listing, export and analytics routes.
//!
//! Set-valued filters are comma-separated canonical strings, e.g.
//! `?case_status=WIP,ON-HOLD&marketplace=EU`. Dates are `YYYY-MM-DD`; a range
//! with only one end is open on the other.

use casedesk_core::{
  store::{CaseFilter, DateRange},
  vocab::{self, Vocabulary},
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
pub struct FilterParams {
  pub case_status:  Option<String>,
  pub marketplace:  Option<String>,
  pub workstream:   Option<String>,
  pub priority:     Option<String>,
  pub sub_status:   Option<String>,
  pub seller_type:  Option<String>,
  pub listing_from: Option<NaiveDate>,
  pub listing_to:   Option<NaiveDate>,
  pub created_from: Option<NaiveDate>,
  pub created_to:   Option<NaiveDate>,
}

impl FilterParams {
  pub fn to_filter(&self) -> Result<CaseFilter, ApiError> {
    Ok(CaseFilter {
      case_statuses: list(&self.case_status)?,
      marketplaces:  list(&self.marketplace)?,
      workstreams:   list(&self.workstream)?,
      priorities:    list(&self.priority)?,
      sub_statuses:  list(&self.sub_status)?,
      seller_types:  list(&self.seller_type)?,
      listing_start: range(self.listing_from, self.listing_to),
      created:       range(self.created_from, self.created_to),
    })
  }
}

fn list<T: Vocabulary>(raw: &Option<String>) -> Result<Vec<T>, ApiError> {
  let Some(raw) = raw else {
    return Ok(vec![]);
  };
  raw
    .split(',')
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(|s| vocab::parse::<T>(s).map_err(ApiError::from))
    .collect()
}

fn range(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Option<DateRange> {
  if from.is_none() && to.is_none() {
    return None;
  }
  let earliest = NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or_default();
  let latest = NaiveDate::from_ymd_opt(9999, 12, 31).unwrap_or_default();
  Some(DateRange::new(from.unwrap_or(earliest), to.unwrap_or(latest)))
}

#[cfg(test)]
mod tests {
  use casedesk_core::vocab::{CaseStatus, Marketplace};

  use super::*;

  #[test]
  fn comma_lists_parse_case_insensitively() {
    let params = FilterParams {
      case_status: Some("wip, ON-HOLD".into()),
      marketplace: Some("EU,".into()),
      ..FilterParams::default()
    };
    let filter = params.to_filter().unwrap();
    assert_eq!(filter.case_statuses, vec![CaseStatus::Wip, CaseStatus::OnHold]);
    assert_eq!(filter.marketplaces, vec![Marketplace::Eu]);
    assert!(filter.workstreams.is_empty());
  }

  #[test]
  fn unknown_value_is_bad_request() {
    let params = FilterParams {
      priority: Some("Urgent".into()),
      ..FilterParams::default()
    };
    assert!(matches!(params.to_filter(), Err(ApiError::BadRequest(_))));
  }

  #[test]
  fn half_open_ranges() {
    let from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let params = FilterParams {
      created_from: Some(from),
      ..FilterParams::default()
    };
    let filter = params.to_filter().unwrap();
    let created = filter.created.unwrap();
    assert_eq!(created.from, from);
    assert!(created.contains(NaiveDate::from_ymd_opt(2100, 1, 1).unwrap()));
    assert!(filter.listing_start.is_none());
  }
}
