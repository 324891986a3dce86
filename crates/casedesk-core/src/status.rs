//! Derivation of the coarse [`CaseStatus`] from the latest [`SubStatus`].
//!
//! The mapping is a pure lookup: it does not depend on the previous status or
//! on the order of updates. Sub-statuses without an explicit entry fall back
//! to [`CaseStatus::Wip`].

use crate::vocab::{CaseStatus, SubStatus};

/// Status assigned to any sub-status without an explicit mapping.
pub const FALLBACK_STATUS: CaseStatus = CaseStatus::Wip;

impl SubStatus {
  /// The case status implied by this sub-status.
  pub fn case_status(self) -> CaseStatus {
    match self {
      Self::CaseCreated => CaseStatus::Submitted,
      Self::IntStart | Self::IntWip => CaseStatus::Wip,
      Self::OnHold => CaseStatus::OnHold,
      Self::Cancelled => CaseStatus::Cancelled,
      Self::Handover => CaseStatus::Completed,
      Self::Support | Self::Note => CaseStatus::Wip,
      _ => FALLBACK_STATUS,
    }
  }
}

/// Derive a case status from a raw sub-status string. Unrecognised strings
/// map to [`FALLBACK_STATUS`].
pub fn derive_status(sub_status: &str) -> CaseStatus {
  sub_status
    .parse::<SubStatus>()
    .map(SubStatus::case_status)
    .unwrap_or(FALLBACK_STATUS)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn explicit_mappings() {
    assert_eq!(derive_status("Case_Created"), CaseStatus::Submitted);
    assert_eq!(derive_status("INT_START"), CaseStatus::Wip);
    assert_eq!(derive_status("INT_WIP"), CaseStatus::Wip);
    assert_eq!(derive_status("ON_HOLD"), CaseStatus::OnHold);
    assert_eq!(derive_status("CANCELLED"), CaseStatus::Cancelled);
    assert_eq!(derive_status("HANDOVER"), CaseStatus::Completed);
    assert_eq!(derive_status("SUPPORT"), CaseStatus::Wip);
    assert_eq!(derive_status("Note"), CaseStatus::Wip);
  }

  #[test]
  fn unmapped_and_unknown_fall_back_to_wip() {
    assert_eq!(derive_status("PMA_FUP_2"), CaseStatus::Wip);
    assert_eq!(derive_status("KO_SENT"), CaseStatus::Wip);
    assert_eq!(derive_status("SOMETHING_ELSE"), CaseStatus::Wip);
    assert_eq!(derive_status(""), CaseStatus::Wip);
  }

  #[test]
  fn awaiting_information_is_never_derived() {
    assert!(
      SubStatus::ALL
        .iter()
        .all(|s| s.case_status() != CaseStatus::AwaitingInformation)
    );
  }
}
