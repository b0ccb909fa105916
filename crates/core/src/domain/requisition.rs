use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

pub const DEFAULT_APPROVER: &str = "System Approver";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequisitionId(pub i64);

impl fmt::Display for RequisitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle states. Only `PendingApproval -> Approved` is reachable; the
/// remaining two are accepted from storage but never produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequisitionStatus {
    #[serde(rename = "Pending Approval")]
    PendingApproval,
    Approved,
    Rejected,
    Fulfilled,
}

impl RequisitionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingApproval => "Pending Approval",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::Fulfilled => "Fulfilled",
        }
    }
}

impl fmt::Display for RequisitionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequisitionStatus {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Pending Approval" => Ok(Self::PendingApproval),
            "Approved" => Ok(Self::Approved),
            "Rejected" => Ok(Self::Rejected),
            "Fulfilled" => Ok(Self::Fulfilled),
            other => Err(DomainError::UnknownStatus(other.to_string())),
        }
    }
}

/// Creation input as submitted by a client. Every field is optional at this
/// stage so that an incomplete submission is reported as missing fields rather
/// than as a malformed body.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct RequisitionDraft {
    pub item_name: Option<String>,
    pub quantity: Option<i64>,
    pub justification: Option<String>,
    pub requester_name: Option<String>,
}

impl RequisitionDraft {
    /// A quantity of zero counts as missing; the sign is not checked.
    pub fn validate(self, created_at: DateTime<Utc>) -> Result<NewRequisition, DomainError> {
        let item_name = non_empty(self.item_name)?;
        let quantity = self.quantity.filter(|quantity| *quantity != 0);
        let quantity = quantity.ok_or(DomainError::MissingRequiredFields)?;
        let justification = non_empty(self.justification)?;
        let requester_name = non_empty(self.requester_name)?;

        Ok(NewRequisition { item_name, quantity, justification, requester_name, created_at })
    }
}

fn non_empty(value: Option<String>) -> Result<String, DomainError> {
    value.filter(|value| !value.is_empty()).ok_or(DomainError::MissingRequiredFields)
}

/// A validated requisition that has not been assigned an identifier yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewRequisition {
    pub item_name: String,
    pub quantity: i64,
    pub justification: String,
    pub requester_name: String,
    pub created_at: DateTime<Utc>,
}

impl NewRequisition {
    pub fn into_requisition(self, id: RequisitionId) -> Requisition {
        Requisition {
            id,
            item_name: self.item_name,
            quantity: self.quantity,
            justification: self.justification,
            requester_name: self.requester_name,
            status: RequisitionStatus::PendingApproval,
            created_at: self.created_at,
            approved_by: None,
            approved_at: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requisition {
    pub id: RequisitionId,
    pub item_name: String,
    pub quantity: i64,
    pub justification: String,
    pub requester_name: String,
    pub status: RequisitionStatus,
    pub created_at: DateTime<Utc>,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
}

impl Requisition {
    pub fn is_pending(&self) -> bool {
        self.status == RequisitionStatus::PendingApproval
    }

    /// Moves a pending requisition to `Approved`, recording who approved it and
    /// when. Any other status is left untouched.
    pub fn approve(
        &mut self,
        approver: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if !self.is_pending() {
            return Err(DomainError::AlreadyDecided { status: self.status });
        }

        self.status = RequisitionStatus::Approved;
        self.approved_by = Some(approver.into());
        self.approved_at = Some(at);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{Requisition, RequisitionDraft, RequisitionId, RequisitionStatus};
    use crate::errors::DomainError;

    fn draft() -> RequisitionDraft {
        RequisitionDraft {
            item_name: Some("Laptop".to_string()),
            quantity: Some(2),
            justification: Some("New hire".to_string()),
            requester_name: Some("Alice".to_string()),
        }
    }

    fn pending() -> Requisition {
        draft().validate(Utc::now()).expect("valid draft").into_requisition(RequisitionId(1))
    }

    #[test]
    fn complete_draft_becomes_pending_requisition() {
        let requisition = pending();

        assert_eq!(requisition.status, RequisitionStatus::PendingApproval);
        assert_eq!(requisition.item_name, "Laptop");
        assert_eq!(requisition.quantity, 2);
        assert!(requisition.approved_by.is_none());
        assert!(requisition.approved_at.is_none());
    }

    #[test]
    fn draft_with_missing_or_empty_fields_is_rejected() {
        let cases = [
            RequisitionDraft { item_name: None, ..draft() },
            RequisitionDraft { item_name: Some(String::new()), ..draft() },
            RequisitionDraft { quantity: None, ..draft() },
            RequisitionDraft { quantity: Some(0), ..draft() },
            RequisitionDraft { justification: Some(String::new()), ..draft() },
            RequisitionDraft { requester_name: None, ..draft() },
            RequisitionDraft::default(),
        ];

        for case in cases {
            let error = case.clone().validate(Utc::now()).expect_err("incomplete draft");
            assert_eq!(error, DomainError::MissingRequiredFields, "case: {case:?}");
        }
    }

    #[test]
    fn negative_quantity_is_accepted() {
        let new = RequisitionDraft { quantity: Some(-3), ..draft() }
            .validate(Utc::now())
            .expect("sign is not checked");
        assert_eq!(new.quantity, -3);
    }

    #[test]
    fn approving_pending_sets_approver_and_timestamp_together() {
        let mut requisition = pending();
        let at = Utc::now();

        requisition.approve("Bob", at).expect("pending -> approved");

        assert_eq!(requisition.status, RequisitionStatus::Approved);
        assert_eq!(requisition.approved_by.as_deref(), Some("Bob"));
        assert_eq!(requisition.approved_at, Some(at));
    }

    #[test]
    fn approving_twice_reports_current_status_and_keeps_record() {
        let mut requisition = pending();
        requisition.approve("Bob", Utc::now()).expect("first approval");
        let snapshot = requisition.clone();

        let error = requisition.approve("Carol", Utc::now()).expect_err("second approval");

        assert_eq!(error.to_string(), "Requisition is already Approved");
        assert_eq!(requisition, snapshot);
    }

    #[test]
    fn unreachable_states_still_block_approval() {
        for status in [RequisitionStatus::Rejected, RequisitionStatus::Fulfilled] {
            let mut requisition = Requisition { status, ..pending() };
            let error = requisition.approve("Bob", Utc::now()).expect_err("not pending");
            assert_eq!(error, DomainError::AlreadyDecided { status });
            assert!(requisition.approved_by.is_none());
        }
    }

    #[test]
    fn status_uses_display_strings_on_the_wire() {
        let json = serde_json::to_string(&RequisitionStatus::PendingApproval).expect("serialize");
        assert_eq!(json, "\"Pending Approval\"");
        assert_eq!("Fulfilled".parse::<RequisitionStatus>(), Ok(RequisitionStatus::Fulfilled));
        assert!("pending".parse::<RequisitionStatus>().is_err());
    }

    #[test]
    fn record_json_carries_nulls_until_approved() {
        let value = serde_json::to_value(pending()).expect("serialize");

        assert_eq!(value["id"], 1);
        assert_eq!(value["status"], "Pending Approval");
        assert!(value["approved_by"].is_null());
        assert!(value["approved_at"].is_null());
        assert!(value["created_at"].is_string());
    }
}
