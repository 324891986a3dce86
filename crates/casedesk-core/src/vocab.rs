//! Constrained vocabularies.
//!
//! Every categorical case field is a closed enumeration with one canonical
//! wire string. The same string is stored in SQLite, sent over JSON, listed in
//! model prompts and shown in the UI, so there is exactly one table per
//! vocabulary and it lives here.

use std::fmt;

// ─── Vocabulary trait ────────────────────────────────────────────────────────

/// A closed set of values with canonical string forms.
pub trait Vocabulary: Copy + fmt::Display + 'static {
  /// Human-readable name of the field, used in error messages.
  const KIND: &'static str;

  /// Every value, in canonical order.
  fn all() -> &'static [Self];

  /// The canonical string for this value.
  fn as_str(self) -> &'static str;
}

/// Comma-separated listing of every canonical value, e.g. for prompts.
pub fn listing<T: Vocabulary>() -> String {
  T::all()
    .iter()
    .map(|v| v.as_str())
    .collect::<Vec<_>>()
    .join(", ")
}

/// Parse `raw` against `T`: exact canonical match first, then ASCII
/// case-insensitive.
pub fn parse<T: Vocabulary>(raw: &str) -> crate::Result<T> {
  let raw = raw.trim();
  T::all()
    .iter()
    .copied()
    .find(|v| v.as_str() == raw)
    .or_else(|| {
      T::all()
        .iter()
        .copied()
        .find(|v| v.as_str().eq_ignore_ascii_case(raw))
    })
    .ok_or_else(|| crate::Error::UnknownValue {
      kind:  T::KIND,
      value: raw.to_owned(),
    })
}

macro_rules! vocabulary {
  (
    $(#[$meta:meta])*
    pub enum $name:ident as $kind:literal {
      $( $(#[$vmeta:meta])* $variant:ident => $text:literal, )+
    }
  ) => {
    $(#[$meta])*
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub enum $name {
      $( $(#[$vmeta])* $variant, )+
    }

    impl $name {
      pub const ALL: &'static [Self] = &[ $( Self::$variant, )+ ];

      pub fn as_str(self) -> &'static str {
        match self {
          $( Self::$variant => $text, )+
        }
      }
    }

    impl Vocabulary for $name {
      const KIND: &'static str = $kind;

      fn all() -> &'static [Self] { Self::ALL }

      fn as_str(self) -> &'static str { $name::as_str(self) }
    }

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
      }
    }

    impl std::str::FromStr for $name {
      type Err = crate::Error;

      fn from_str(s: &str) -> crate::Result<Self> { parse(s) }
    }

    impl serde::Serialize for $name {
      fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
      ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
      }
    }

    impl<'de> serde::Deserialize<'de> for $name {
      fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
      ) -> std::result::Result<Self, D::Error> {
        let raw = <String as serde::Deserialize>::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
      }
    }
  };
}

// ─── Case vocabularies ───────────────────────────────────────────────────────

vocabulary! {
  /// Regional marketplace the seller lists on.
  pub enum Marketplace as "marketplace" {
    Eu5 => "EU5",
    Eu => "EU",
    ThreePx => "3PX",
    Mena => "MENA",
    Au => "AU",
    Sg => "SG",
    Na => "NA",
    Jp => "JP",
    Za => "ZA",
  }
}

vocabulary! {
  /// Intake system the case arrived from.
  pub enum CaseSource as "case source" {
    Astro => "ASTRO",
    Winston => "WINSTON",
  }
}

vocabulary! {
  /// Coarse case state. Always derived from the latest [`SubStatus`]; see
  /// [`crate::status`].
  pub enum CaseStatus as "case status" {
    Submitted => "SUBMITTED",
    AwaitingInformation => "AWAITING INFORMATION",
    Cancelled => "CANCELLED",
    OnHold => "ON-HOLD",
    Wip => "WIP",
    Completed => "COMPLETED",
  }
}

vocabulary! {
  /// Internal initiative a case belongs to.
  pub enum Workstream as "workstream" {
    Paid => "PAID",
    SmartConnectEu => "STRATEGIC_PRODUCT_SMART_CONNECT_EU",
    Dsr => "DSR",
    SmartConnectMena => "STRATEGIC_PRODUCT_SMART_CONNECT_MENA",
    LuxuryDeveloperNa => "STRATEGIC_DEVELOPER_LUXURY_NA",
    MigrationMump => "MIGRATION_M@UMP",
    StrategicDsr => "STRATEGIC_DSR",
    LuxuryDeveloperEu => "STRATEGIC_DEVELOPER_LUXURY_EU",
    F3 => "F3",
    LuxuryStore => "LUXURY STORE",
    SmartConnectAu => "STRATEGIC_PRODUCT_SMART_CONNECT_AU",
    B2b => "B2B",
    ProductMfg => "STRATEGIC_PRODUCT_MFG",
    BrandAgency => "BRAND_AGENCY",
    Dsr3pd => "DSR_3PD",
    SmartConnectAesAu => "STRATEGIC_PRODUCT_SMART_CONNECT_AES_AU",
  }
}

vocabulary! {
  pub enum Complexity as "complexity" {
    Easy => "Easy",
    Medium => "Medium",
    Hard => "Hard",
  }
}

vocabulary! {
  pub enum Priority as "priority" {
    Low => "Low",
    Medium => "Medium",
    High => "High",
  }
}

vocabulary! {
  /// Whether the seller is onboarding for the first time.
  pub enum SellerType as "seller type" {
    New => "NEW",
    Existing => "EXISTING",
  }
}

vocabulary! {
  /// Fine-grained workflow marker recorded on every update.
  pub enum SubStatus as "sub-status" {
    IntStart => "INT_START",
    IntWip => "INT_WIP",
    OnHold => "ON_HOLD",
    PmaDraft => "PMA_DRAF",
    Mac => "MAC",
    PaaDraft => "PAA_DRAF",
    Aac => "AAC",
    Pma => "PMA",
    Paa => "PAA",
    Assigned => "ASSIGNED",
    KoSent => "KO_SENT",
    PmaFollowUp1 => "PMA_FUP_1",
    PmaFollowUp2 => "PMA_FUP_2",
    PmaFollowUp3 => "PMA_FUP_3",
    Pac => "PAC",
    Cancelled => "CANCELLED",
    CaseCreated => "Case_Created",
    Pmca => "PMCA",
    Note => "Note",
    PmaFollowUp4 => "PMA_FUP_4",
    Support => "SUPPORT",
    Handover => "HANDOVER",
  }
}

// ─── Chat vocabularies ───────────────────────────────────────────────────────

vocabulary! {
  /// What a chat message is asking for.
  pub enum Intent as "intent" {
    Create => "create",
    Update => "update",
    Query => "query",
    Analytics => "analytics",
    Unknown => "unknown",
  }
}

vocabulary! {
  /// Cost/quality tier of the hosted model.
  pub enum ModelTier as "model tier" {
    Fast => "fast",
    Balanced => "balanced",
    Smart => "smart",
    Premium => "premium",
  }
}

impl ModelTier {
  /// Model identifier sent to the completion endpoint.
  pub fn model_id(self) -> &'static str {
    match self {
      Self::Fast => "anthropic/claude-3-haiku",
      Self::Balanced => "openai/gpt-3.5-turbo",
      Self::Smart => "anthropic/claude-3-sonnet",
      Self::Premium => "openai/gpt-4-turbo",
    }
  }
}

// ─── Defaults ────────────────────────────────────────────────────────────────

impl Default for Marketplace {
  fn default() -> Self { Self::Eu }
}

impl Default for CaseSource {
  fn default() -> Self { Self::Astro }
}

impl Default for Workstream {
  fn default() -> Self { Self::Dsr }
}

impl Default for Complexity {
  fn default() -> Self { Self::Medium }
}

impl Default for Priority {
  fn default() -> Self { Self::Medium }
}

impl Default for SellerType {
  fn default() -> Self { Self::Existing }
}

impl Default for ModelTier {
  fn default() -> Self { Self::Balanced }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn canonical_strings_parse_back() {
    assert_eq!("3PX".parse::<Marketplace>().unwrap(), Marketplace::ThreePx);
    assert_eq!(
      "MIGRATION_M@UMP".parse::<Workstream>().unwrap(),
      Workstream::MigrationMump
    );
    assert_eq!(
      "AWAITING INFORMATION".parse::<CaseStatus>().unwrap(),
      CaseStatus::AwaitingInformation
    );
    assert_eq!(
      "Case_Created".parse::<SubStatus>().unwrap(),
      SubStatus::CaseCreated
    );
  }

  #[test]
  fn parse_falls_back_to_case_insensitive() {
    assert_eq!("high".parse::<Priority>().unwrap(), Priority::High);
    assert_eq!(" eu ".parse::<Marketplace>().unwrap(), Marketplace::Eu);
    assert_eq!("int_wip".parse::<SubStatus>().unwrap(), SubStatus::IntWip);
  }

  #[test]
  fn unknown_value_names_the_field() {
    let err = "MARS".parse::<Marketplace>().unwrap_err();
    assert_eq!(err.to_string(), "unknown marketplace value: \"MARS\"");
  }

  #[test]
  fn vocabulary_sizes() {
    assert_eq!(Marketplace::ALL.len(), 9);
    assert_eq!(Workstream::ALL.len(), 16);
    assert_eq!(SubStatus::ALL.len(), 22);
    assert_eq!(CaseStatus::ALL.len(), 6);
  }

  #[test]
  fn serde_uses_canonical_strings() {
    let json = serde_json::to_string(&CaseStatus::OnHold).unwrap();
    assert_eq!(json, "\"ON-HOLD\"");
    let back: CaseStatus = serde_json::from_str(&json).unwrap();
    assert_eq!(back, CaseStatus::OnHold);
    assert!(serde_json::from_str::<Priority>("\"Urgent\"").is_err());
  }

  #[test]
  fn listing_joins_in_order() {
    assert_eq!(listing::<Priority>(), "Low, Medium, High");
  }
}
