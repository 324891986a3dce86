//! Translation of [`CaseFilter`] into a SQL `WHERE` clause.
//!
//! Column names come from a fixed list; only values are bound as parameters.

use casedesk_core::{
  store::{CaseFilter, DateRange},
  vocab::Vocabulary,
};
use rusqlite::types::Value;

use crate::encode::encode_date;

/// A `WHERE …` fragment (empty when unconstrained) plus its positional
/// parameters.
#[derive(Debug, Default)]
pub struct WhereClause {
  pub sql:    String,
  pub params: Vec<Value>,
}

impl WhereClause {
  pub fn build(filter: &CaseFilter) -> Self {
    let mut conds: Vec<String> = vec![];
    let mut params: Vec<Value> = vec![];

    push_in(&mut conds, &mut params, "case_status", &filter.case_statuses);
    push_in(&mut conds, &mut params, "marketplace", &filter.marketplaces);
    push_in(&mut conds, &mut params, "workstream", &filter.workstreams);
    push_in(&mut conds, &mut params, "priority", &filter.priorities);
    push_in(&mut conds, &mut params, "last_sub_status", &filter.sub_statuses);
    push_in(&mut conds, &mut params, "seller_type", &filter.seller_types);

    if let Some(range) = filter.listing_start {
      push_between(&mut conds, &mut params, "listing_start_date", range);
    }
    if let Some(range) = filter.created {
      push_between(&mut conds, &mut params, "substr(created_at, 1, 10)", range);
    }

    let sql = if conds.is_empty() {
      String::new()
    } else {
      format!("WHERE {}", conds.join(" AND "))
    };

    Self { sql, params }
  }
}

fn push_in<T: Vocabulary>(
  conds: &mut Vec<String>,
  params: &mut Vec<Value>,
  column: &str,
  values: &[T],
) {
  if values.is_empty() {
    return;
  }
  let placeholders = vec!["?"; values.len()].join(", ");
  conds.push(format!("{column} IN ({placeholders})"));
  params.extend(values.iter().map(|v| Value::Text(v.as_str().to_owned())));
}

fn push_between(
  conds: &mut Vec<String>,
  params: &mut Vec<Value>,
  expr: &str,
  range: DateRange,
) {
  conds.push(format!("{expr} BETWEEN ? AND ?"));
  params.push(Value::Text(encode_date(range.from)));
  params.push(Value::Text(encode_date(range.to)));
}

#[cfg(test)]
mod tests {
  use casedesk_core::vocab::{CaseStatus, Marketplace};
  use chrono::NaiveDate;

  use super::*;

  #[test]
  fn empty_filter_has_no_where() {
    let clause = WhereClause::build(&CaseFilter::default());
    assert!(clause.sql.is_empty());
    assert!(clause.params.is_empty());
  }

  #[test]
  fn sets_and_ranges_are_joined_with_and() {
    let filter = CaseFilter {
      case_statuses: vec![CaseStatus::Wip, CaseStatus::OnHold],
      marketplaces: vec![Marketplace::Eu],
      created: Some(DateRange::new(
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
      )),
      ..CaseFilter::default()
    };
    let clause = WhereClause::build(&filter);

    assert_eq!(
      clause.sql,
      "WHERE case_status IN (?, ?) AND marketplace IN (?) \
       AND substr(created_at, 1, 10) BETWEEN ? AND ?"
    );
    assert_eq!(clause.params, vec![
      Value::Text("WIP".into()),
      Value::Text("ON-HOLD".into()),
      Value::Text("EU".into()),
      Value::Text("2024-01-01".into()),
      Value::Text("2024-01-31".into()),
    ]);
  }
}
