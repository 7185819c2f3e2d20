//! The store boundary: [`HistoryTx`] for the promotion engine and [`HrStore`]
//! for everything above it.
//!
//! Backends (e.g. `hr-store-sqlite`) implement both. The REST layer depends on
//! [`HrStore`] only; the engine depends on [`HistoryTx`] only, which keeps it
//! testable against an in-memory history.

use std::future::Future;

use chrono::NaiveDate;

use crate::{
  Result,
  employee::{Department, DeptNo, Employee, EmployeeProfile, EmployeeSummary},
  history::{HistoryRecord, RecordKey, Stream},
  promotion::{PromotionOutcome, PromotionRequest},
};

/// Number of rows per page returned by [`HrStore::list_by_department`].
pub const PAGE_SIZE: u32 = 20;

// ─── Unit of work ────────────────────────────────────────────────────────────

/// One open transaction against the temporal history store.
///
/// Every method runs inside the same transaction; the owner of the value
/// decides whether to commit or roll back once the engine returns. Storage
/// failures surface as [`crate::Error::Storage`].
pub trait HistoryTx {
  fn find_employee(&mut self, emp_no: i64) -> Result<Option<Employee>>;

  fn find_department(&mut self, dept_no: &DeptNo) -> Result<Option<Department>>;

  /// All rows of `stream` for `emp_no` whose `to_date` is the sentinel.
  fn find_open(
    &mut self,
    stream: Stream,
    emp_no: i64,
  ) -> Result<Vec<HistoryRecord>>;

  /// The row of `stream` for `emp_no` with the latest `from_date`.
  fn find_most_recent(
    &mut self,
    stream: Stream,
    emp_no: i64,
  ) -> Result<Option<HistoryRecord>>;

  /// Set the `to_date` of the row identified by `key`.
  fn close_record(&mut self, key: &RecordKey, to_date: NaiveDate) -> Result<()>;

  fn insert_record(&mut self, record: &HistoryRecord) -> Result<()>;
}

impl<T: HistoryTx + ?Sized> HistoryTx for &mut T {
  fn find_employee(&mut self, emp_no: i64) -> Result<Option<Employee>> {
    (**self).find_employee(emp_no)
  }

  fn find_department(&mut self, dept_no: &DeptNo) -> Result<Option<Department>> {
    (**self).find_department(dept_no)
  }

  fn find_open(
    &mut self,
    stream: Stream,
    emp_no: i64,
  ) -> Result<Vec<HistoryRecord>> {
    (**self).find_open(stream, emp_no)
  }

  fn find_most_recent(
    &mut self,
    stream: Stream,
    emp_no: i64,
  ) -> Result<Option<HistoryRecord>> {
    (**self).find_most_recent(stream, emp_no)
  }

  fn close_record(&mut self, key: &RecordKey, to_date: NaiveDate) -> Result<()> {
    (**self).close_record(key, to_date)
  }

  fn insert_record(&mut self, record: &HistoryRecord) -> Result<()> {
    (**self).insert_record(record)
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over an HR records backend.
///
/// Employees and departments are loaded once and only looked up afterwards.
/// History rows are written by [`HrStore::promote`] or by the initial data
/// load through [`HrStore::record_history`].
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait HrStore: Send + Sync {
  /// Backend error. Converting it into [`crate::Error`] must preserve the
  /// domain variants (validation, not found, conflict) produced by the engine.
  type Error: std::error::Error + Send + Sync + Into<crate::Error> + 'static;

  // ── Initial load ──────────────────────────────────────────────────────

  fn add_department(
    &self,
    department: Department,
  ) -> impl Future<Output = Result<Department, Self::Error>> + Send + '_;

  fn add_employee(
    &self,
    employee: Employee,
  ) -> impl Future<Output = Result<Employee, Self::Error>> + Send + '_;

  /// Insert a raw history row as-is, without any of the promotion checks.
  fn record_history(
    &self,
    record: HistoryRecord,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  fn get_employee(
    &self,
    emp_no: i64,
  ) -> impl Future<Output = Result<Option<Employee>, Self::Error>> + Send + '_;

  /// The employee with all four history streams. `None` if absent.
  fn get_employee_profile(
    &self,
    emp_no: i64,
  ) -> impl Future<Output = Result<Option<EmployeeProfile>, Self::Error>>
  + Send
  + '_;

  fn list_departments(
    &self,
  ) -> impl Future<Output = Result<Vec<Department>, Self::Error>> + Send + '_;

  /// Employees with any membership row in `dept_no`, ordered by `emp_no`.
  /// `page` is 1-based; each page holds at most [`PAGE_SIZE`] rows.
  fn list_by_department<'a>(
    &'a self,
    dept_no: &'a DeptNo,
    page: u32,
  ) -> impl Future<Output = Result<Vec<EmployeeSummary>, Self::Error>> + Send + 'a;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Run the promotion engine for `request` inside a single transaction.
  /// Nothing is persisted unless the whole promotion succeeds.
  fn promote(
    &self,
    request: PromotionRequest,
  ) -> impl Future<Output = Result<PromotionOutcome, Self::Error>> + Send + '_;
}
