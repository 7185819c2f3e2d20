//! [`SqliteStore`] — the SQLite implementation of [`HrStore`].

use std::path::Path;

use hr_core::{
  employee::{Department, DeptNo, Employee, EmployeeProfile, EmployeeSummary},
  history::{HistoryRecord, Stream},
  promotion::{self, PromotionOutcome, PromotionRequest},
  store::{HistoryTx, HrStore, PAGE_SIZE},
};
use rusqlite::OptionalExtension as _;
use tracing::{info, warn};

use crate::{
  Error, Result,
  encode::{RawDepartment, RawEmployee, RawRecord, RawSummary, encode_date},
  schema::SCHEMA,
  tx::{SqliteTx, in_transaction},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An HR records store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All calls are
/// serialised on the connection's thread, and every promotion runs in its own
/// transaction.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Close the underlying connection, flushing any pending work.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }
}

/// Every row of `stream` for `emp_no`, oldest first.
fn load_stream(
  conn: &rusqlite::Connection,
  stream: Stream,
  emp_no: i64,
) -> rusqlite::Result<Vec<RawRecord>> {
  let sql = format!(
    "{} WHERE emp_no = ?1 ORDER BY from_date",
    RawRecord::select_sql(stream)
  );
  let mut stmt = conn.prepare(&sql)?;
  let rows = stmt
    .query_map(rusqlite::params![emp_no], |row| RawRecord::from_row(stream, row))?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

fn collect_stream<T>(
  raws: Vec<RawRecord>,
  pick: impl Fn(HistoryRecord) -> Option<T>,
) -> Result<Vec<T>> {
  let mut out = Vec::with_capacity(raws.len());
  for raw in raws {
    let stream = raw.stream;
    let record = raw.into_record()?;
    out.push(pick(record).ok_or(Error::Decode {
      column: "stream",
      value:  stream.to_string(),
    })?);
  }
  Ok(out)
}

// ─── HrStore impl ────────────────────────────────────────────────────────────

impl HrStore for SqliteStore {
  type Error = Error;

  // ── Initial load ──────────────────────────────────────────────────────────

  async fn add_department(&self, department: Department) -> Result<Department> {
    let dept_no   = department.dept_no.to_string();
    let dept_name = department.dept_name.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO departments (dept_no, dept_name) VALUES (?1, ?2)",
          rusqlite::params![dept_no, dept_name],
        )?;
        Ok(())
      })
      .await?;

    Ok(department)
  }

  async fn add_employee(&self, employee: Employee) -> Result<Employee> {
    let emp_no     = employee.emp_no;
    let birth_date = encode_date(employee.birth_date);
    let first_name = employee.first_name.clone();
    let last_name  = employee.last_name.clone();
    let gender     = employee.gender.as_str();
    let hire_date  = encode_date(employee.hire_date);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO employees (
             emp_no, birth_date, first_name, last_name, gender, hire_date
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![emp_no, birth_date, first_name, last_name, gender, hire_date],
        )?;
        Ok(())
      })
      .await?;

    Ok(employee)
  }

  async fn record_history(&self, record: HistoryRecord) -> Result<()> {
    self
      .conn
      .call(move |conn| Ok(in_transaction(conn, |tx| tx.insert_record(&record))?))
      .await??;
    Ok(())
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get_employee(&self, emp_no: i64) -> Result<Option<Employee>> {
    let raw: Option<RawEmployee> = self
      .conn
      .call(move |conn| {
        let sql = format!("{} WHERE emp_no = ?1", RawEmployee::SELECT);
        Ok(
          conn
            .query_row(&sql, rusqlite::params![emp_no], RawEmployee::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawEmployee::into_employee).transpose()
  }

  async fn get_employee_profile(&self, emp_no: i64) -> Result<Option<EmployeeProfile>> {
    // One read transaction so the streams are mutually consistent.
    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let sql = format!("{} WHERE emp_no = ?1", RawEmployee::SELECT);
        let Some(employee) = tx
          .query_row(&sql, rusqlite::params![emp_no], RawEmployee::from_row)
          .optional()?
        else {
          return Ok(None);
        };
        let streams = [
          load_stream(&tx, Stream::Title, emp_no)?,
          load_stream(&tx, Stream::Salary, emp_no)?,
          load_stream(&tx, Stream::Membership, emp_no)?,
          load_stream(&tx, Stream::Management, emp_no)?,
        ];
        tx.commit()?;
        Ok(Some((employee, streams)))
      })
      .await?;

    let Some((employee, [titles, salaries, departments, managed])) = raw else {
      return Ok(None);
    };

    Ok(Some(EmployeeProfile {
      employee:            employee.into_employee()?,
      titles:              collect_stream(titles, |r| match r {
        HistoryRecord::Title(t) => Some(t),
        _ => None,
      })?,
      salaries:            collect_stream(salaries, |r| match r {
        HistoryRecord::Salary(s) => Some(s),
        _ => None,
      })?,
      departments:         collect_stream(departments, |r| match r {
        HistoryRecord::Membership(m) => Some(m),
        _ => None,
      })?,
      managed_departments: collect_stream(managed, |r| match r {
        HistoryRecord::Management(m) => Some(m),
        _ => None,
      })?,
    }))
  }

  async fn list_departments(&self) -> Result<Vec<Department>> {
    let raws: Vec<RawDepartment> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT dept_no, dept_name FROM departments ORDER BY dept_no")?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawDepartment {
              dept_no:   row.get(0)?,
              dept_name: row.get(1)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDepartment::into_department).collect()
  }

  async fn list_by_department(
    &self,
    dept_no: &DeptNo,
    page:    u32,
  ) -> Result<Vec<EmployeeSummary>> {
    if page == 0 {
      return Err(hr_core::Error::Validation("page must be at least 1".into()).into());
    }
    let dept_no_str = dept_no.to_string();
    let limit_val   = i64::from(PAGE_SIZE);
    let offset_val  = i64::from(page - 1) * limit_val;

    let raws: Vec<RawSummary> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT DISTINCT e.emp_no, e.first_name, e.last_name, e.hire_date
           FROM dept_emp de
           JOIN employees e ON e.emp_no = de.emp_no
           WHERE de.dept_no = ?1
           ORDER BY e.emp_no ASC
           LIMIT ?2 OFFSET ?3",
        )?;
        let rows = stmt
          .query_map(
            rusqlite::params![dept_no_str, limit_val, offset_val],
            |row| {
              Ok(RawSummary {
                emp_no:     row.get(0)?,
                first_name: row.get(1)?,
                last_name:  row.get(2)?,
                hire_date:  row.get(3)?,
              })
            },
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSummary::into_summary).collect()
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn promote(&self, request: PromotionRequest) -> Result<PromotionOutcome> {
    let emp_no = request.emp_no;
    let outcome = self
      .conn
      .call(move |conn| {
        Ok(in_transaction(conn, |tx: &mut SqliteTx<'_>| {
          promotion::promote(tx, &request)
        })?)
      })
      .await?;

    match outcome {
      Ok(outcome) => {
        info!(
          emp_no = outcome.emp_no,
          effective_date = %outcome.effective_date,
          department_changed = outcome.department_changed,
          manager_assigned = outcome.manager_assigned,
          "promotion committed"
        );
        Ok(outcome)
      }
      Err(e) => {
        warn!(emp_no = ?emp_no, error = %e, "promotion rolled back");
        Err(e.into())
      }
    }
  }
}
