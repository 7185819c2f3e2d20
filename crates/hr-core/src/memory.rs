//! In-memory [`HistoryTx`] used to exercise the engine without a database.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::{
  Error, Result,
  employee::{Department, DeptNo, Employee},
  history::{HistoryRecord, RecordKey, Stream},
  store::HistoryTx,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryHistory {
  pub employees:   BTreeMap<i64, Employee>,
  pub departments: BTreeMap<DeptNo, Department>,
  pub records:     Vec<HistoryRecord>,
}

impl MemoryHistory {
  /// Run `f` against a staged copy and keep its writes only on success.
  pub fn transact<R>(
    &mut self,
    f: impl FnOnce(&mut Self) -> Result<R>,
  ) -> Result<R> {
    let mut staged = self.clone();
    let out = f(&mut staged)?;
    *self = staged;
    Ok(out)
  }

  /// Rows of one stream for one employee, ordered by `from_date`.
  pub fn stream(&self, stream: Stream, emp_no: i64) -> Vec<&HistoryRecord> {
    let mut rows: Vec<_> = self
      .records
      .iter()
      .filter(|r| r.stream() == stream && r.emp_no() == emp_no)
      .collect();
    rows.sort_by_key(|r| r.from_date());
    rows
  }
}

impl HistoryTx for MemoryHistory {
  fn find_employee(&mut self, emp_no: i64) -> Result<Option<Employee>> {
    Ok(self.employees.get(&emp_no).cloned())
  }

  fn find_department(&mut self, dept_no: &DeptNo) -> Result<Option<Department>> {
    Ok(self.departments.get(dept_no).cloned())
  }

  fn find_open(
    &mut self,
    stream: Stream,
    emp_no: i64,
  ) -> Result<Vec<HistoryRecord>> {
    Ok(
      self
        .stream(stream, emp_no)
        .into_iter()
        .filter(|r| r.is_open())
        .cloned()
        .collect(),
    )
  }

  fn find_most_recent(
    &mut self,
    stream: Stream,
    emp_no: i64,
  ) -> Result<Option<HistoryRecord>> {
    Ok(self.stream(stream, emp_no).last().map(|r| (*r).clone()))
  }

  fn close_record(&mut self, key: &RecordKey, to_date: NaiveDate) -> Result<()> {
    let record = self
      .records
      .iter_mut()
      .find(|r| r.key() == *key)
      .ok_or_else(|| Error::Storage(format!("no record for {key:?}").into()))?;
    record.close(to_date);
    Ok(())
  }

  fn insert_record(&mut self, record: &HistoryRecord) -> Result<()> {
    let key = record.key();
    if self.records.iter().any(|r| r.key() == key) {
      return Err(Error::Storage(format!("duplicate key {key:?}").into()));
    }
    self.records.push(record.clone());
    Ok(())
  }
}

/// Delegates to `inner` but fails the first insert into `stream`.
pub struct FailingInsert<T> {
  pub inner:  T,
  pub stream: Stream,
}

impl<T: HistoryTx> HistoryTx for FailingInsert<T> {
  fn find_employee(&mut self, emp_no: i64) -> Result<Option<Employee>> {
    self.inner.find_employee(emp_no)
  }

  fn find_department(&mut self, dept_no: &DeptNo) -> Result<Option<Department>> {
    self.inner.find_department(dept_no)
  }

  fn find_open(
    &mut self,
    stream: Stream,
    emp_no: i64,
  ) -> Result<Vec<HistoryRecord>> {
    self.inner.find_open(stream, emp_no)
  }

  fn find_most_recent(
    &mut self,
    stream: Stream,
    emp_no: i64,
  ) -> Result<Option<HistoryRecord>> {
    self.inner.find_most_recent(stream, emp_no)
  }

  fn close_record(&mut self, key: &RecordKey, to_date: NaiveDate) -> Result<()> {
    self.inner.close_record(key, to_date)
  }

  fn insert_record(&mut self, record: &HistoryRecord) -> Result<()> {
    if record.stream() == self.stream {
      return Err(Error::Storage("injected insert failure".into()));
    }
    self.inner.insert_record(record)
  }
}
