//! The promotion engine.
//!
//! A promotion moves an employee to a new title and salary as of an effective
//! date, optionally into a new department and optionally into that
//! department's management. The engine checks everything first and only then
//! writes, so a rejected request never touches the store:
//!
//! 1. shape of the request ([`PromotionRequest::validate`]);
//! 2. the employee and department exist;
//! 3. the effective date is strictly after the start of the latest salary,
//!    title and membership rows.
//!
//! The writes close the open rows of each affected stream on the day before
//! the effective date and open new rows starting on it. Atomicity is the
//! caller's job: [`promote`] runs against a [`HistoryTx`] and the store commits
//! or rolls that transaction back as a whole.
//!
//! Management history is deliberately not subject to the date check in step
//! 3; only salary, title and membership are.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
  Error, Result,
  employee::DeptNo,
  history::{
    HistoryRecord, ManagementRecord, MembershipRecord, SENTINEL_END,
    SalaryRecord, Stream, TitleRecord,
  },
  store::HistoryTx,
};

// ─── Request ─────────────────────────────────────────────────────────────────

/// A promotion as submitted by a caller.
///
/// Every field is optional at the type level so that a missing value is
/// reported as a validation failure naming the field, not as a decode error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionRequest {
  pub emp_no:    Option<i64>,
  pub new_title: Option<String>,
  pub from_date: Option<NaiveDate>,
  pub salary:    Option<i64>,
  pub dept_no:   Option<String>,
  /// Whether the promotion also grants management of `dept_no`.
  #[serde(default)]
  pub manager:   bool,
}

/// A request that passed [`PromotionRequest::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidPromotion {
  pub emp_no:         i64,
  pub title:          String,
  pub effective_date: NaiveDate,
  /// The `to_date` given to every row this promotion closes.
  pub close_date:     NaiveDate,
  pub salary:         i64,
  pub dept_no:        DeptNo,
  pub manager:        bool,
}

impl PromotionRequest {
  pub fn validate(&self) -> Result<ValidPromotion> {
    let emp_no = self.emp_no.ok_or_else(|| missing("empNo"))?;
    if emp_no <= 0 {
      return Err(Error::Validation(format!(
        "empNo must be positive, got {emp_no}"
      )));
    }

    let title = self
      .new_title
      .as_deref()
      .map(str::trim)
      .filter(|t| !t.is_empty())
      .ok_or_else(|| Error::Validation("newTitle must not be blank".into()))?
      .to_owned();

    let effective_date = self.from_date.ok_or_else(|| missing("fromDate"))?;
    if effective_date >= SENTINEL_END {
      return Err(Error::Validation(format!(
        "fromDate must be before {SENTINEL_END}"
      )));
    }
    let close_date = effective_date.pred_opt().ok_or_else(|| {
      Error::Validation(format!("fromDate {effective_date} is out of range"))
    })?;

    let salary = self.salary.ok_or_else(|| missing("salary"))?;
    if salary <= 0 {
      return Err(Error::Validation(format!(
        "salary must be positive, got {salary}"
      )));
    }

    let dept_no = self.dept_no.as_deref().ok_or_else(|| missing("deptNo"))?;
    let dept_no = DeptNo::parse(dept_no)?;

    Ok(ValidPromotion {
      emp_no,
      title,
      effective_date,
      close_date,
      salary,
      dept_no,
      manager: self.manager,
    })
  }
}

fn missing(field: &str) -> Error {
  Error::Validation(format!("{field} is required"))
}

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// What a successful promotion changed beyond title and salary, which always
/// change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionOutcome {
  pub emp_no:             i64,
  pub effective_date:     NaiveDate,
  pub department_changed: bool,
  /// `true` only when a new management row was opened.
  pub manager_assigned:   bool,
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// Apply `request` to the history held by `tx`.
///
/// On error the transaction may hold partial writes; the caller must roll it
/// back.
pub fn promote<T>(tx: &mut T, request: &PromotionRequest) -> Result<PromotionOutcome>
where
  T: HistoryTx + ?Sized,
{
  let promotion = request.validate()?;

  if tx.find_employee(promotion.emp_no)?.is_none() {
    return Err(Error::EmployeeNotFound(promotion.emp_no));
  }
  if tx.find_department(&promotion.dept_no)?.is_none() {
    return Err(Error::DepartmentNotFound(promotion.dept_no));
  }
  for stream in [Stream::Salary, Stream::Title, Stream::Membership] {
    ensure_after_latest(tx, stream, &promotion)?;
  }

  update_title(tx, &promotion)?;
  update_salary(tx, &promotion)?;
  let department_changed = reassign_department(tx, &promotion)?;
  let manager_assigned = if promotion.manager {
    reassign_manager(tx, &promotion)?
  } else {
    false
  };

  Ok(PromotionOutcome {
    emp_no: promotion.emp_no,
    effective_date: promotion.effective_date,
    department_changed,
    manager_assigned,
  })
}

fn ensure_after_latest<T>(
  tx: &mut T,
  stream: Stream,
  promotion: &ValidPromotion,
) -> Result<()>
where
  T: HistoryTx + ?Sized,
{
  let Some(latest) = tx.find_most_recent(stream, promotion.emp_no)? else {
    return Ok(());
  };
  if latest.from_date() >= promotion.effective_date {
    return Err(Error::Conflict {
      stream,
      effective: promotion.effective_date,
      blocking: latest.from_date(),
    });
  }
  Ok(())
}

/// End every row in `open` on the promotion's close date.
fn close_all<T>(
  tx: &mut T,
  open: &[HistoryRecord],
  promotion: &ValidPromotion,
) -> Result<()>
where
  T: HistoryTx + ?Sized,
{
  for record in open {
    tx.close_record(&record.key(), promotion.close_date)?;
  }
  if let Some(first) = open.first() {
    debug!(
      emp_no = promotion.emp_no,
      stream = %first.stream(),
      closed = open.len(),
      to_date = %promotion.close_date,
      "closed open records"
    );
  }
  Ok(())
}

fn update_title<T>(tx: &mut T, promotion: &ValidPromotion) -> Result<()>
where
  T: HistoryTx + ?Sized,
{
  let open = tx.find_open(Stream::Title, promotion.emp_no)?;
  close_all(tx, &open, promotion)?;
  tx.insert_record(&HistoryRecord::Title(TitleRecord {
    emp_no:    promotion.emp_no,
    title:     promotion.title.clone(),
    from_date: promotion.effective_date,
    to_date:   SENTINEL_END,
  }))
}

fn update_salary<T>(tx: &mut T, promotion: &ValidPromotion) -> Result<()>
where
  T: HistoryTx + ?Sized,
{
  let open = tx.find_open(Stream::Salary, promotion.emp_no)?;
  close_all(tx, &open, promotion)?;
  tx.insert_record(&HistoryRecord::Salary(SalaryRecord {
    emp_no:    promotion.emp_no,
    salary:    promotion.salary,
    from_date: promotion.effective_date,
    to_date:   SENTINEL_END,
  }))
}

/// Returns whether the employee moved to a different department.
fn reassign_department<T>(tx: &mut T, promotion: &ValidPromotion) -> Result<bool>
where
  T: HistoryTx + ?Sized,
{
  let open = tx.find_open(Stream::Membership, promotion.emp_no)?;
  let changed = match open.first().and_then(HistoryRecord::dept_no) {
    Some(current) => *current != promotion.dept_no,
    None => true,
  };
  if !changed {
    debug!(emp_no = promotion.emp_no, dept_no = %promotion.dept_no, "department unchanged");
    return Ok(false);
  }

  close_all(tx, &open, promotion)?;
  tx.insert_record(&HistoryRecord::Membership(MembershipRecord {
    emp_no:    promotion.emp_no,
    dept_no:   promotion.dept_no.clone(),
    from_date: promotion.effective_date,
    to_date:   SENTINEL_END,
  }))?;
  Ok(true)
}

/// Returns whether a new management row was opened. Already managing the
/// target department is a no-op.
fn reassign_manager<T>(tx: &mut T, promotion: &ValidPromotion) -> Result<bool>
where
  T: HistoryTx + ?Sized,
{
  let open = tx.find_open(Stream::Management, promotion.emp_no)?;
  if open
    .iter()
    .any(|r| r.dept_no() == Some(&promotion.dept_no))
  {
    debug!(emp_no = promotion.emp_no, dept_no = %promotion.dept_no, "already managing department");
    return Ok(false);
  }

  close_all(tx, &open, promotion)?;
  tx.insert_record(&HistoryRecord::Management(ManagementRecord {
    emp_no:    promotion.emp_no,
    dept_no:   promotion.dept_no.clone(),
    from_date: promotion.effective_date,
    to_date:   SENTINEL_END,
  }))?;
  Ok(true)
}
