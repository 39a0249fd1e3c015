use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString};
use utoipa::ToSchema;

use crate::error::HrError;
use crate::model::check_text;

pub const REASON_MAX: usize = 500;
pub const COMMENTS_MAX: usize = 500;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    AsRefStr,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LeaveType {
    Sick,
    Vacation,
    Personal,
    Unpaid,
    Maternity,
    Paternity,
}

impl LeaveType {
    pub fn as_str(&self) -> &str {
        self.as_ref()
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    AsRefStr,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

/// Lifecycle actions a caller can take on an existing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveAction {
    Edit,
    Cancel,
    Decide { approved: bool },
}

impl LeaveAction {
    fn verb(&self) -> &'static str {
        match self {
            LeaveAction::Edit => "update",
            LeaveAction::Cancel => "cancel",
            LeaveAction::Decide { .. } => "approve",
        }
    }

    fn participle(&self) -> &'static str {
        match self {
            LeaveAction::Edit => "updated",
            LeaveAction::Cancel => "cancelled",
            LeaveAction::Decide { .. } => "approved",
        }
    }
}

impl LeaveStatus {
    pub fn as_str(&self) -> &str {
        self.as_ref()
    }

    /// Pending and approved requests occupy their dates; the rest do not.
    pub fn holds_dates(self) -> bool {
        match self {
            LeaveStatus::Pending | LeaveStatus::Approved => true,
            LeaveStatus::Rejected | LeaveStatus::Cancelled => false,
        }
    }

    /// Status after `action`, or `InvalidState` when the request is no
    /// longer pending. Every non-pending status is terminal.
    pub fn apply(self, action: LeaveAction) -> Result<LeaveStatus, HrError> {
        match (self, action) {
            (LeaveStatus::Pending, LeaveAction::Edit) => Ok(LeaveStatus::Pending),
            (LeaveStatus::Pending, LeaveAction::Cancel) => Ok(LeaveStatus::Cancelled),
            (LeaveStatus::Pending, LeaveAction::Decide { approved: true }) => {
                Ok(LeaveStatus::Approved)
            }
            (LeaveStatus::Pending, LeaveAction::Decide { approved: false }) => {
                Ok(LeaveStatus::Rejected)
            }
            (LeaveStatus::Approved | LeaveStatus::Rejected | LeaveStatus::Cancelled, action) => {
                Err(HrError::InvalidState(format!(
                    "Cannot {} leave request with status '{}'. Only pending requests can be {}.",
                    action.verb(),
                    self.as_str(),
                    action.participle()
                )))
            }
        }
    }
}

/// Closed interval of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, HrError> {
        if end < start {
            return Err(HrError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Shared endpoints count as overlap.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        !(self.end < other.start || self.start > other.end)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "employee_id": 3,
    "leave_type": "vacation",
    "start_date": "2024-12-20",
    "end_date": "2024-12-31",
    "reason": "Year-end vacation",
    "status": "pending",
    "approved_by": null,
    "approval_comments": null,
    "created_at": "2024-12-01"
}))]
pub struct LeaveRequest {
    pub id: u64,
    pub employee_id: u64,
    pub leave_type: LeaveType,
    #[schema(example = "2024-12-20", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2024-12-31", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    pub reason: String,
    pub status: LeaveStatus,
    pub approved_by: Option<u64>,
    pub approval_comments: Option<String>,
    #[schema(example = "2024-12-01", format = "date", value_type = String)]
    pub created_at: NaiveDate,
}

impl LeaveRequest {
    pub fn range(&self) -> DateRange {
        DateRange {
            start: self.start_date,
            end: self.end_date,
        }
    }

    pub fn apply(&mut self, changes: &LeaveChanges) {
        if let Some(leave_type) = changes.leave_type {
            self.leave_type = leave_type;
        }
        if let Some(start_date) = changes.start_date {
            self.start_date = start_date;
        }
        if let Some(end_date) = changes.end_date {
            self.end_date = end_date;
        }
        if let Some(reason) = &changes.reason {
            self.reason = reason.clone();
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
        if let Some(approved_by) = changes.approved_by {
            self.approved_by = Some(approved_by);
        }
        if let Some(comments) = &changes.approval_comments {
            self.approval_comments = Some(comments.clone());
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = 3)]
    pub employee_id: u64,
    #[schema(example = "vacation")]
    pub leave_type: LeaveType,
    #[schema(example = "2024-12-20", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2024-12-31", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "Year-end vacation")]
    pub reason: String,
}

impl CreateLeave {
    pub fn validate(&self) -> Result<(), HrError> {
        check_text("reason", &self.reason, REASON_MAX)
    }
}

/// Caller-editable fields of a pending request.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateLeave {
    pub leave_type: Option<LeaveType>,
    #[schema(example = "2024-12-21", format = "date", value_type = String)]
    pub start_date: Option<NaiveDate>,
    #[schema(example = "2024-12-30", format = "date", value_type = String)]
    pub end_date: Option<NaiveDate>,
    pub reason: Option<String>,
}

impl UpdateLeave {
    pub fn validate(&self) -> Result<(), HrError> {
        if let Some(reason) = &self.reason {
            check_text("reason", reason, REASON_MAX)?;
        }
        Ok(())
    }
}

impl From<UpdateLeave> for LeaveChanges {
    fn from(u: UpdateLeave) -> Self {
        LeaveChanges {
            leave_type: u.leave_type,
            start_date: u.start_date,
            end_date: u.end_date,
            reason: u.reason,
            ..LeaveChanges::default()
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LeaveDecision {
    /// True to approve, false to reject
    pub approved: bool,
    /// Approver employee ID
    #[schema(example = 2)]
    pub approved_by: u64,
    pub comments: Option<String>,
}

impl LeaveDecision {
    pub fn validate(&self) -> Result<(), HrError> {
        if let Some(comments) = &self.comments {
            if comments.chars().count() > COMMENTS_MAX {
                return Err(HrError::Validation(format!(
                    "comments must be at most {COMMENTS_MAX} characters"
                )));
            }
        }
        Ok(())
    }
}

/// Field-level change set written by the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeaveChanges {
    pub leave_type: Option<LeaveType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub reason: Option<String>,
    pub status: Option<LeaveStatus>,
    pub approved_by: Option<u64>,
    pub approval_comments: Option<String>,
}

impl LeaveChanges {
    pub fn is_empty(&self) -> bool {
        *self == LeaveChanges::default()
    }
}

/// Insert payload; id is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewLeaveRequest {
    pub employee_id: u64,
    pub leave_type: LeaveType,
    pub range: DateRange,
    pub reason: String,
    pub created_at: NaiveDate,
}

#[derive(Debug, Clone, Default)]
pub struct LeaveFilter {
    pub employee_id: Option<u64>,
    pub status: Option<LeaveStatus>,
    pub leave_type: Option<LeaveType>,
}

impl LeaveFilter {
    pub fn for_employee(employee_id: u64) -> Self {
        Self {
            employee_id: Some(employee_id),
            ..Self::default()
        }
    }

    pub fn matches(&self, leave: &LeaveRequest) -> bool {
        self.employee_id.is_none_or(|id| leave.employee_id == id)
            && self.status.is_none_or(|s| leave.status == s)
            && self.leave_type.is_none_or(|t| leave.leave_type == t)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct LeaveTypeCounts {
    pub sick: u64,
    pub vacation: u64,
    pub personal: u64,
    pub unpaid: u64,
    pub maternity: u64,
    pub paternity: u64,
}

impl LeaveTypeCounts {
    fn record(&mut self, leave_type: LeaveType) {
        let slot = match leave_type {
            LeaveType::Sick => &mut self.sick,
            LeaveType::Vacation => &mut self.vacation,
            LeaveType::Personal => &mut self.personal,
            LeaveType::Unpaid => &mut self.unpaid,
            LeaveType::Maternity => &mut self.maternity,
            LeaveType::Paternity => &mut self.paternity,
        };
        *slot += 1;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct LeaveSummary {
    pub employee_id: u64,
    pub total_requests: u64,
    pub pending: u64,
    pub approved: u64,
    pub rejected: u64,
    pub cancelled: u64,
    pub by_type: LeaveTypeCounts,
}

impl LeaveSummary {
    pub fn tally(employee_id: u64, leaves: &[LeaveRequest]) -> Self {
        let mut summary = LeaveSummary {
            employee_id,
            total_requests: 0,
            pending: 0,
            approved: 0,
            rejected: 0,
            cancelled: 0,
            by_type: LeaveTypeCounts::default(),
        };

        for leave in leaves {
            summary.total_requests += 1;
            let slot = match leave.status {
                LeaveStatus::Pending => &mut summary.pending,
                LeaveStatus::Approved => &mut summary.approved,
                LeaveStatus::Rejected => &mut summary.rejected,
                LeaveStatus::Cancelled => &mut summary.cancelled,
            };
            *slot += 1;
            summary.by_type.record(leave.leave_type);
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).expect("valid date")
    }

    fn range(a: (u32, u32), b: (u32, u32)) -> DateRange {
        DateRange::new(day(a.0, a.1), day(b.0, b.1)).expect("ordered range")
    }

    #[test]
    fn shared_endpoint_overlaps() {
        let first = range((1, 1), (1, 5));
        let second = range((1, 5), (1, 10));
        assert!(first.overlaps(&second));
        assert!(second.overlaps(&first));
    }

    #[test]
    fn adjacent_ranges_do_not_overlap() {
        let first = range((1, 1), (1, 4));
        let second = range((1, 5), (1, 10));
        assert!(!first.overlaps(&second));
        assert!(!second.overlaps(&first));
    }

    #[test]
    fn containment_overlaps() {
        let outer = range((3, 1), (3, 31));
        let inner = range((3, 10), (3, 12));
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn single_day_range_is_valid() {
        let r = DateRange::new(day(6, 1), day(6, 1)).expect("one day");
        assert!(r.overlaps(&r));
    }

    #[test]
    fn reversed_range_is_rejected() {
        let err = DateRange::new(day(2, 10), day(2, 1)).unwrap_err();
        assert!(matches!(err, HrError::InvalidRange { .. }));
    }

    #[test]
    fn pending_allows_every_action() {
        let p = LeaveStatus::Pending;
        assert_eq!(p.apply(LeaveAction::Edit).unwrap(), LeaveStatus::Pending);
        assert_eq!(p.apply(LeaveAction::Cancel).unwrap(), LeaveStatus::Cancelled);
        assert_eq!(
            p.apply(LeaveAction::Decide { approved: true }).unwrap(),
            LeaveStatus::Approved
        );
        assert_eq!(
            p.apply(LeaveAction::Decide { approved: false }).unwrap(),
            LeaveStatus::Rejected
        );
    }

    #[test]
    fn terminal_statuses_reject_every_action() {
        let actions = [
            LeaveAction::Edit,
            LeaveAction::Cancel,
            LeaveAction::Decide { approved: true },
            LeaveAction::Decide { approved: false },
        ];
        for status in LeaveStatus::iter().filter(|s| *s != LeaveStatus::Pending) {
            for action in actions {
                let err = status.apply(action).unwrap_err();
                assert!(matches!(err, HrError::InvalidState(_)), "{status:?} {action:?}");
            }
        }
    }

    #[test]
    fn only_pending_and_approved_hold_dates() {
        let holding: Vec<_> = LeaveStatus::iter().filter(|s| s.holds_dates()).collect();
        assert_eq!(holding, vec![LeaveStatus::Pending, LeaveStatus::Approved]);
    }

    #[test]
    fn string_forms_round_trip_through_strum() {
        assert_eq!(LeaveType::Maternity.as_str(), "maternity");
        assert_eq!(LeaveType::from_str("paternity").unwrap(), LeaveType::Paternity);
        assert_eq!(LeaveStatus::from_str("cancelled").unwrap(), LeaveStatus::Cancelled);
        assert!(LeaveStatus::from_str("archived").is_err());
    }

    #[test]
    fn summary_counts_every_status_and_type() {
        let base = LeaveRequest {
            id: 0,
            employee_id: 9,
            leave_type: LeaveType::Sick,
            start_date: day(1, 1),
            end_date: day(1, 2),
            reason: "flu".into(),
            status: LeaveStatus::Pending,
            approved_by: None,
            approval_comments: None,
            created_at: day(1, 1),
        };
        let leaves = vec![
            base.clone(),
            LeaveRequest {
                id: 1,
                status: LeaveStatus::Approved,
                leave_type: LeaveType::Vacation,
                ..base.clone()
            },
            LeaveRequest {
                id: 2,
                status: LeaveStatus::Cancelled,
                leave_type: LeaveType::Vacation,
                ..base.clone()
            },
        ];

        let summary = LeaveSummary::tally(9, &leaves);
        assert_eq!(summary.total_requests, 3);
        assert_eq!(summary.pending, 1);
        assert_eq!(summary.approved, 1);
        assert_eq!(summary.rejected, 0);
        assert_eq!(summary.cancelled, 1);
        assert_eq!(summary.by_type.sick, 1);
        assert_eq!(summary.by_type.vacation, 2);
        assert_eq!(summary, LeaveSummary::tally(9, &leaves));
    }
}
