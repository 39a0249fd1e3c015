//! Leave ledger: the request lifecycle and the overlap rule.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{info, instrument};

use crate::error::HrError;
use crate::model::Page;
use crate::model::leave_request::{
    CreateLeave, DateRange, LeaveAction, LeaveChanges, LeaveDecision, LeaveFilter, LeaveRequest,
    LeaveSummary, NewLeaveRequest, UpdateLeave,
};
use crate::store::{Store, StoreTx};

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[derive(Clone)]
pub struct LeaveLedger {
    store: Arc<dyn Store>,
    clock: fn() -> NaiveDate,
}

/// First request in `existing` that still holds its dates and intersects
/// `range`.
pub fn first_conflict<'a>(
    existing: &'a [LeaveRequest],
    range: &DateRange,
) -> Option<&'a LeaveRequest> {
    existing
        .iter()
        .find(|leave| leave.status.holds_dates() && leave.range().overlaps(range))
}

async fn load_leave(tx: &mut dyn StoreTx, id: u64) -> Result<LeaveRequest, HrError> {
    tx.find_leave(id)
        .await?
        .ok_or_else(|| HrError::not_found("Leave request", id))
}

impl LeaveLedger {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            clock: today,
        }
    }

    /// Overrides the source of creation dates.
    pub fn with_clock(mut self, clock: fn() -> NaiveDate) -> Self {
        self.clock = clock;
        self
    }

    pub async fn get(&self, id: u64) -> Result<LeaveRequest, HrError> {
        let mut tx = self.store.begin().await?;
        let leave = load_leave(&mut *tx, id).await?;
        Ok(leave)
    }

    pub async fn list(&self, filter: LeaveFilter, page: Page) -> Result<Vec<LeaveRequest>, HrError> {
        page.validate()?;
        let mut tx = self.store.begin().await?;
        let leaves = tx.list_leaves(&filter, page).await?;
        Ok(leaves)
    }

    #[instrument(skip(self, request), fields(employee_id = request.employee_id))]
    pub async fn create(&self, request: CreateLeave) -> Result<LeaveRequest, HrError> {
        request.validate()?;
        let mut tx = self.store.begin().await?;

        // held until commit so concurrent creates for this employee serialize
        if tx.lock_employee(request.employee_id).await?.is_none() {
            return Err(HrError::not_found("Employee", request.employee_id));
        }

        let range = DateRange::new(request.start_date, request.end_date)?;

        let existing = tx
            .list_leaves(&LeaveFilter::for_employee(request.employee_id), Page::ALL)
            .await?;
        if let Some(conflict) = first_conflict(&existing, &range) {
            return Err(HrError::Conflict(format!(
                "Leave request overlaps with existing leave request (ID: {})",
                conflict.id
            )));
        }

        let new = NewLeaveRequest {
            employee_id: request.employee_id,
            leave_type: request.leave_type,
            range,
            reason: request.reason,
            created_at: (self.clock)(),
        };
        let id = tx.insert_leave(&new).await?;
        let created = load_leave(&mut *tx, id).await?;
        tx.commit().await?;

        info!(leave_id = id, "Leave request created");
        Ok(created)
    }

    /// Edits a pending request. Only the date order is re-checked; the new
    /// dates are not compared against the employee's other requests.
    #[instrument(skip(self, update))]
    pub async fn update(&self, id: u64, update: UpdateLeave) -> Result<LeaveRequest, HrError> {
        update.validate()?;
        let mut tx = self.store.begin().await?;

        let current = load_leave(&mut *tx, id).await?;
        current.status.apply(LeaveAction::Edit)?;
        DateRange::new(
            update.start_date.unwrap_or(current.start_date),
            update.end_date.unwrap_or(current.end_date),
        )?;

        let changes = LeaveChanges::from(update);
        if !changes.is_empty() {
            tx.update_leave(id, &changes).await?;
        }
        let updated = load_leave(&mut *tx, id).await?;
        tx.commit().await?;

        info!("Leave request updated");
        Ok(updated)
    }

    /// Soft-deletes a pending request by marking it cancelled.
    #[instrument(skip(self))]
    pub async fn cancel(&self, id: u64) -> Result<(), HrError> {
        let mut tx = self.store.begin().await?;

        let current = load_leave(&mut *tx, id).await?;
        let status = current.status.apply(LeaveAction::Cancel)?;
        tx.update_leave(
            id,
            &LeaveChanges {
                status: Some(status),
                ..LeaveChanges::default()
            },
        )
        .await?;
        tx.commit().await?;

        info!("Leave request cancelled");
        Ok(())
    }

    #[instrument(skip(self, decision), fields(approved = decision.approved, approver = decision.approved_by))]
    pub async fn approve(&self, id: u64, decision: LeaveDecision) -> Result<LeaveRequest, HrError> {
        decision.validate()?;
        let mut tx = self.store.begin().await?;

        let current = load_leave(&mut *tx, id).await?;
        let status = current.status.apply(LeaveAction::Decide {
            approved: decision.approved,
        })?;
        if tx.find_employee(decision.approved_by).await?.is_none() {
            return Err(HrError::not_found("Employee", decision.approved_by));
        }

        tx.update_leave(
            id,
            &LeaveChanges {
                status: Some(status),
                approved_by: Some(decision.approved_by),
                approval_comments: decision.comments,
                ..LeaveChanges::default()
            },
        )
        .await?;
        let decided = load_leave(&mut *tx, id).await?;
        tx.commit().await?;

        info!(status = decided.status.as_str(), "Leave request decided");
        Ok(decided)
    }

    pub async fn summarize(&self, employee_id: u64) -> Result<LeaveSummary, HrError> {
        let mut tx = self.store.begin().await?;

        if tx.find_employee(employee_id).await?.is_none() {
            return Err(HrError::not_found("Employee", employee_id));
        }
        let leaves = tx
            .list_leaves(&LeaveFilter::for_employee(employee_id), Page::ALL)
            .await?;

        Ok(LeaveSummary::tally(employee_id, &leaves))
    }
}
