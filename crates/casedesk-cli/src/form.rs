//! State of the New Case form, independent of rendering.

use anyhow::{Context, Result};
use casedesk_core::{
  case::NewCase,
  vocab::{
    CaseSource, Complexity, Marketplace, Priority, SellerType, Vocabulary,
    Workstream,
  },
};
use chrono::NaiveDate;

// ─── Vocabulary cycling ───────────────────────────────────────────────────────

/// Step through `T`'s values, wrapping at either end.
pub fn cycle<T: Vocabulary + PartialEq>(value: T, forward: bool) -> T {
  let all = T::all();
  let n = all.len();
  let i = all.iter().position(|v| *v == value).unwrap_or(0);
  if forward {
    all[(i + 1) % n]
  } else {
    all[(i + n - 1) % n]
  }
}

/// Step a filter through `None`, then each value of `T`, then back to `None`.
pub fn cycle_filter<T: Vocabulary + PartialEq>(value: Option<T>) -> Option<T> {
  let all = T::all();
  match value {
    None => all.first().copied(),
    Some(v) => {
      let i = all.iter().position(|x| *x == v)?;
      all.get(i + 1).copied()
    }
  }
}

// ─── Fields ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
  SellerName,
  SellerId,
  CaseReference,
  IssueType,
  ApiArea,
  IntegrationType,
  SpecialistName,
  Marketplace,
  CaseSource,
  Workstream,
  Complexity,
  Priority,
  SellerType,
  ListingStart,
  Notes,
  Submit,
}

impl FormField {
  pub const ALL: &'static [Self] = &[
    Self::SellerName,
    Self::SellerId,
    Self::CaseReference,
    Self::IssueType,
    Self::ApiArea,
    Self::IntegrationType,
    Self::SpecialistName,
    Self::Marketplace,
    Self::CaseSource,
    Self::Workstream,
    Self::Complexity,
    Self::Priority,
    Self::SellerType,
    Self::ListingStart,
    Self::Notes,
    Self::Submit,
  ];

  pub fn label(self) -> &'static str {
    match self {
      Self::SellerName => "Seller name *",
      Self::SellerId => "Seller ID",
      Self::CaseReference => "Case reference",
      Self::IssueType => "Issue type *",
      Self::ApiArea => "API area",
      Self::IntegrationType => "Integration",
      Self::SpecialistName => "Specialist",
      Self::Marketplace => "Marketplace",
      Self::CaseSource => "Case source",
      Self::Workstream => "Workstream",
      Self::Complexity => "Complexity",
      Self::Priority => "Priority",
      Self::SellerType => "Seller type",
      Self::ListingStart => "Listing start",
      Self::Notes => "Notes",
      Self::Submit => "[ Create case ]",
    }
  }

  /// Enum fields are cycled with ←/→ instead of typed.
  pub fn is_choice(self) -> bool {
    matches!(
      self,
      Self::Marketplace
        | Self::CaseSource
        | Self::Workstream
        | Self::Complexity
        | Self::Priority
        | Self::SellerType
    )
  }
}

// ─── Form ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct CaseForm {
  pub cursor:           usize,
  pub seller_name:      String,
  pub seller_id:        String,
  pub case_reference:   String,
  pub issue_type:       String,
  pub api_area:         String,
  pub integration_type: String,
  pub specialist_name:  String,
  /// `YYYY-MM-DD`; empty means today.
  pub listing_start:    String,
  pub notes:            String,
  pub marketplace:      Marketplace,
  pub case_source:      CaseSource,
  pub workstream:       Workstream,
  pub complexity:       Complexity,
  pub priority:         Priority,
  pub seller_type:      SellerType,
}

impl CaseForm {
  pub fn current(&self) -> FormField {
    FormField::ALL[self.cursor.min(FormField::ALL.len() - 1)]
  }

  pub fn next(&mut self) {
    self.cursor = (self.cursor + 1) % FormField::ALL.len();
  }

  pub fn prev(&mut self) {
    let n = FormField::ALL.len();
    self.cursor = (self.cursor + n - 1) % n;
  }

  fn text_mut(&mut self, field: FormField) -> Option<&mut String> {
    Some(match field {
      FormField::SellerName => &mut self.seller_name,
      FormField::SellerId => &mut self.seller_id,
      FormField::CaseReference => &mut self.case_reference,
      FormField::IssueType => &mut self.issue_type,
      FormField::ApiArea => &mut self.api_area,
      FormField::IntegrationType => &mut self.integration_type,
      FormField::SpecialistName => &mut self.specialist_name,
      FormField::ListingStart => &mut self.listing_start,
      FormField::Notes => &mut self.notes,
      _ => return None,
    })
  }

  /// Display value for `field`.
  pub fn value(&self, field: FormField) -> String {
    match field {
      FormField::SellerName => self.seller_name.clone(),
      FormField::SellerId => self.seller_id.clone(),
      FormField::CaseReference => self.case_reference.clone(),
      FormField::IssueType => self.issue_type.clone(),
      FormField::ApiArea => self.api_area.clone(),
      FormField::IntegrationType => self.integration_type.clone(),
      FormField::SpecialistName => self.specialist_name.clone(),
      FormField::ListingStart => self.listing_start.clone(),
      FormField::Notes => self.notes.clone(),
      FormField::Marketplace => self.marketplace.to_string(),
      FormField::CaseSource => self.case_source.to_string(),
      FormField::Workstream => self.workstream.to_string(),
      FormField::Complexity => self.complexity.to_string(),
      FormField::Priority => self.priority.to_string(),
      FormField::SellerType => self.seller_type.to_string(),
      FormField::Submit => String::new(),
    }
  }

  pub fn push_char(&mut self, c: char) {
    if let Some(text) = self.text_mut(self.current()) {
      text.push(c);
    }
  }

  pub fn backspace(&mut self) {
    if let Some(text) = self.text_mut(self.current()) {
      text.pop();
    }
  }

  /// Cycle the enum field under the cursor. No-op on text fields.
  pub fn cycle_current(&mut self, forward: bool) {
    match self.current() {
      FormField::Marketplace => self.marketplace = cycle(self.marketplace, forward),
      FormField::CaseSource => self.case_source = cycle(self.case_source, forward),
      FormField::Workstream => self.workstream = cycle(self.workstream, forward),
      FormField::Complexity => self.complexity = cycle(self.complexity, forward),
      FormField::Priority => self.priority = cycle(self.priority, forward),
      FormField::SellerType => self.seller_type = cycle(self.seller_type, forward),
      _ => {}
    }
  }

  /// Build and validate the create request.
  pub fn to_new_case(&self) -> Result<NewCase> {
    fn text(s: &str) -> Option<String> {
      let s = s.trim();
      (!s.is_empty()).then(|| s.to_owned())
    }

    let seller_id = text(&self.seller_id)
      .map(|s| s.parse::<i64>())
      .transpose()
      .context("seller ID must be a whole number")?;
    let listing_start_date = text(&self.listing_start)
      .map(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d"))
      .transpose()
      .context("listing start must be YYYY-MM-DD")?;

    let input = NewCase {
      case_reference: text(&self.case_reference),
      seller_id,
      seller_name: text(&self.seller_name),
      specialist_name: text(&self.specialist_name),
      marketplace: Some(self.marketplace),
      case_source: Some(self.case_source),
      workstream: Some(self.workstream),
      listing_start_date,
      issue_type: text(&self.issue_type),
      complexity: Some(self.complexity),
      priority: Some(self.priority),
      api_area: text(&self.api_area),
      integration_type: text(&self.integration_type),
      seller_type: Some(self.seller_type),
      notes: text(&self.notes),
      ..NewCase::default()
    };
    input.validate()?;
    Ok(input)
  }
}

#[cfg(test)]
mod tests {
  use casedesk_core::vocab::CaseStatus;

  use super::*;

  fn goto(form: &mut CaseForm, field: FormField) {
    form.cursor = FormField::ALL.iter().position(|f| *f == field).unwrap();
  }

  #[test]
  fn cycle_wraps_both_ways() {
    assert_eq!(cycle(Priority::High, true), Priority::Low);
    assert_eq!(cycle(Priority::Low, false), Priority::High);
    assert_eq!(cycle(Priority::Low, true), Priority::Medium);
  }

  #[test]
  fn filter_cycle_returns_to_all() {
    let mut value = None;
    let mut seen = Vec::new();
    for _ in 0..=CaseStatus::ALL.len() {
      value = cycle_filter::<CaseStatus>(value);
      seen.push(value);
    }
    assert_eq!(seen.first(), Some(&Some(CaseStatus::Submitted)));
    assert_eq!(seen.last(), Some(&None));
  }

  #[test]
  fn typing_only_affects_text_fields() {
    let mut form = CaseForm::default();
    form.push_char('A');
    assert_eq!(form.seller_name, "A");

    goto(&mut form, FormField::Priority);
    form.push_char('x');
    form.cycle_current(true);
    assert_eq!(form.priority, Priority::High);
    assert_eq!(form.value(FormField::Priority), "High");
  }

  #[test]
  fn cursor_wraps_around() {
    let mut form = CaseForm::default();
    form.prev();
    assert_eq!(form.current(), FormField::Submit);
    form.next();
    assert_eq!(form.current(), FormField::SellerName);
  }

  #[test]
  fn submit_requires_seller_and_issue() {
    let mut form = CaseForm::default();
    form.seller_name = "Acme".into();
    let err = form.to_new_case().unwrap_err();
    assert!(err.to_string().contains("issue_type"));

    form.issue_type = "Order sync".into();
    let input = form.to_new_case().unwrap();
    assert_eq!(input.seller_name.as_deref(), Some("Acme"));
    assert_eq!(input.marketplace, Some(Marketplace::Eu));
    assert_eq!(input.seller_id, None);
  }

  #[test]
  fn bad_seller_id_and_date_are_reported() {
    let mut form = CaseForm {
      seller_name: "Acme".into(),
      issue_type: "Auth".into(),
      seller_id: "12a".into(),
      ..CaseForm::default()
    };
    assert!(form.to_new_case().is_err());

    form.seller_id = "12345".into();
    form.listing_start = "15/01/2024".into();
    assert!(form.to_new_case().is_err());

    form.listing_start = "2024-01-15".into();
    let input = form.to_new_case().unwrap();
    assert_eq!(input.seller_id, Some(12345));
    assert_eq!(
      input.listing_start_date,
      NaiveDate::from_ymd_opt(2024, 1, 15)
    );
  }
}
