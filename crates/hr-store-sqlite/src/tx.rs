//! [`HistoryTx`] over an open SQLite transaction.

use chrono::NaiveDate;
use hr_core::{
  employee::{Department, DeptNo, Employee},
  history::{HistoryRecord, RecordKey, SENTINEL_END, Stream},
  store::HistoryTx,
};
use rusqlite::{OptionalExtension as _, TransactionBehavior, params_from_iter};
use tracing::warn;

use crate::{
  Error,
  encode::{
    RawDepartment, RawEmployee, RawRecord, encode_date, encode_key,
    encode_value, table, value_column,
  },
};

/// Run `f` inside an `IMMEDIATE` transaction on `conn`.
///
/// Commits when `f` succeeds and rolls back when it fails. The outer result
/// carries failures of the transaction itself; the inner one is `f`'s. A
/// failed rollback is logged and `f`'s error is still returned.
pub(crate) fn in_transaction<R>(
  conn: &mut rusqlite::Connection,
  f: impl FnOnce(&mut SqliteTx<'_>) -> hr_core::Result<R>,
) -> rusqlite::Result<hr_core::Result<R>> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  let outcome = f(&mut SqliteTx::new(&tx));
  match outcome {
    Ok(value) => {
      tx.commit()?;
      Ok(Ok(value))
    }
    Err(e) => {
      if let Err(rollback) = tx.rollback() {
        warn!(error = %rollback, cause = %e, "rollback failed");
      }
      Ok(Err(e))
    }
  }
}

/// Borrowed connection inside a transaction; each call is one statement.
pub(crate) struct SqliteTx<'c> {
  conn: &'c rusqlite::Connection,
}

impl<'c> SqliteTx<'c> {
  pub(crate) fn new(conn: &'c rusqlite::Connection) -> Self { Self { conn } }

  fn query_records(
    &self,
    stream: Stream,
    filter: &str,
    emp_no: i64,
  ) -> hr_core::Result<Vec<HistoryRecord>> {
    let sql = format!("{} WHERE emp_no = ?1 {filter}", RawRecord::select_sql(stream));
    let raws = self
      .conn
      .prepare_cached(&sql)
      .and_then(|mut stmt| {
        let rows = stmt
          .query_map(rusqlite::params![emp_no], |row| RawRecord::from_row(stream, row))?
          .collect::<rusqlite::Result<Vec<_>>>();
        rows
      })
      .map_err(hr_core::Error::storage)?;

    raws
      .into_iter()
      .map(|raw| raw.into_record().map_err(hr_core::Error::from))
      .collect()
  }
}

impl HistoryTx for SqliteTx<'_> {
  fn find_employee(&mut self, emp_no: i64) -> hr_core::Result<Option<Employee>> {
    let sql = format!("{} WHERE emp_no = ?1", RawEmployee::SELECT);
    let raw = self
      .conn
      .query_row(&sql, rusqlite::params![emp_no], RawEmployee::from_row)
      .optional()
      .map_err(hr_core::Error::storage)?;
    Ok(raw.map(RawEmployee::into_employee).transpose()?)
  }

  fn find_department(
    &mut self,
    dept_no: &DeptNo,
  ) -> hr_core::Result<Option<Department>> {
    let raw = self
      .conn
      .query_row(
        "SELECT dept_no, dept_name FROM departments WHERE dept_no = ?1",
        rusqlite::params![dept_no.as_str()],
        |row| {
          Ok(RawDepartment {
            dept_no:   row.get(0)?,
            dept_name: row.get(1)?,
          })
        },
      )
      .optional()
      .map_err(hr_core::Error::storage)?;
    Ok(raw.map(RawDepartment::into_department).transpose()?)
  }

  fn find_open(
    &mut self,
    stream: Stream,
    emp_no: i64,
  ) -> hr_core::Result<Vec<HistoryRecord>> {
    let filter = format!(
      "AND to_date = '{}' ORDER BY from_date",
      encode_date(SENTINEL_END)
    );
    self.query_records(stream, &filter, emp_no)
  }

  fn find_most_recent(
    &mut self,
    stream: Stream,
    emp_no: i64,
  ) -> hr_core::Result<Option<HistoryRecord>> {
    let mut rows =
      self.query_records(stream, "ORDER BY from_date DESC LIMIT 1", emp_no)?;
    Ok(rows.pop())
  }

  fn close_record(&mut self, key: &RecordKey, to_date: NaiveDate) -> hr_core::Result<()> {
    let (filter, key_params) = encode_key(key);
    let sql = format!("UPDATE {} SET to_date = ?1 WHERE {filter}", table(key.stream()));
    let params = std::iter::once(rusqlite::types::Value::Text(encode_date(to_date)))
      .chain(key_params);

    let updated = self
      .conn
      .execute(&sql, params_from_iter(params))
      .map_err(hr_core::Error::storage)?;
    if updated == 0 {
      return Err(Error::RowNotFound(format!("{key:?}")).into());
    }
    Ok(())
  }

  fn insert_record(&mut self, record: &HistoryRecord) -> hr_core::Result<()> {
    let stream = record.stream();
    let sql = format!(
      "INSERT INTO {} (emp_no, {}, from_date, to_date) VALUES (?1, ?2, ?3, ?4)",
      table(stream),
      value_column(stream),
    );
    self
      .conn
      .execute(
        &sql,
        rusqlite::params![
          record.emp_no(),
          encode_value(record),
          encode_date(record.from_date()),
          encode_date(record.to_date()),
        ],
      )
      .map_err(hr_core::Error::storage)?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn failed_rollback_keeps_the_original_error() {
    let mut conn = rusqlite::Connection::open_in_memory().unwrap();
    let result = in_transaction(&mut conn, |tx| -> hr_core::Result<()> {
      // End the transaction early so the rollback has nothing to undo.
      tx.conn.execute_batch("ROLLBACK").map_err(hr_core::Error::storage)?;
      Err(hr_core::Error::EmployeeNotFound(7))
    })
    .unwrap();
    assert!(
      matches!(result, Err(hr_core::Error::EmployeeNotFound(7))),
      "{result:?}"
    );
  }
}
