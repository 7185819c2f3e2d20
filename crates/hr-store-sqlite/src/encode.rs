//! Encoding and decoding helpers between `hr-core` domain types and the plain
//! representations stored in SQLite columns.
//!
//! Dates are stored as `YYYY-MM-DD` text so that string comparison matches
//! date order. Department codes are stored lowercase.

use chrono::NaiveDate;
use hr_core::{
  employee::{Department, DeptNo, Employee, EmployeeSummary},
  history::{
    HistoryRecord, ManagementRecord, MembershipRecord, RecordKey, SalaryRecord,
    Stream, TitleRecord,
  },
};
use rusqlite::types::Value;

use crate::{Error, Result};

// ─── NaiveDate ───────────────────────────────────────────────────────────────

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

fn decode_dept_no(s: &str) -> Result<DeptNo> {
  DeptNo::parse(s).map_err(|_| Error::Decode {
    column: "dept_no",
    value:  s.to_owned(),
  })
}

// ─── Streams ─────────────────────────────────────────────────────────────────

/// Table holding `stream`.
pub fn table(stream: Stream) -> &'static str {
  match stream {
    Stream::Title => "titles",
    Stream::Salary => "salaries",
    Stream::Membership => "dept_emp",
    Stream::Management => "dept_manager",
  }
}

/// The column that carries the stream's payload next to the dates.
pub fn value_column(stream: Stream) -> &'static str {
  match stream {
    Stream::Title => "title",
    Stream::Salary => "salary",
    Stream::Membership | Stream::Management => "dept_no",
  }
}

/// The payload column value of `record`.
pub fn encode_value(record: &HistoryRecord) -> Value {
  match record {
    HistoryRecord::Title(r) => Value::Text(r.title.clone()),
    HistoryRecord::Salary(r) => Value::Integer(r.salary),
    HistoryRecord::Membership(r) => Value::Text(r.dept_no.to_string()),
    HistoryRecord::Management(r) => Value::Text(r.dept_no.to_string()),
  }
}

/// `WHERE` clause (parameters from `?2`) and its parameters identifying the
/// row addressed by `key`. `?1` is left for the caller.
pub fn encode_key(key: &RecordKey) -> (&'static str, Vec<Value>) {
  match key {
    RecordKey::Title { emp_no, title, from_date } => (
      "emp_no = ?2 AND title = ?3 AND from_date = ?4",
      vec![
        Value::Integer(*emp_no),
        Value::Text(title.clone()),
        Value::Text(encode_date(*from_date)),
      ],
    ),
    RecordKey::Salary { emp_no, from_date } => (
      "emp_no = ?2 AND from_date = ?3",
      vec![Value::Integer(*emp_no), Value::Text(encode_date(*from_date))],
    ),
    RecordKey::Membership { emp_no, dept_no, from_date }
    | RecordKey::Management { emp_no, dept_no, from_date } => (
      "emp_no = ?2 AND dept_no = ?3 AND from_date = ?4",
      vec![
        Value::Integer(*emp_no),
        Value::Text(dept_no.to_string()),
        Value::Text(encode_date(*from_date)),
      ],
    ),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read from any history table.
pub struct RawRecord {
  pub stream:    Stream,
  pub emp_no:    i64,
  pub value:     Value,
  pub from_date: String,
  pub to_date:   String,
}

impl RawRecord {
  /// Column order expected by [`RawRecord::from_row`].
  pub fn select_sql(stream: Stream) -> String {
    format!(
      "SELECT emp_no, {}, from_date, to_date FROM {}",
      value_column(stream),
      table(stream)
    )
  }

  pub fn from_row(stream: Stream, row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      stream,
      emp_no: row.get(0)?,
      value: row.get(1)?,
      from_date: row.get(2)?,
      to_date: row.get(3)?,
    })
  }

  pub fn into_record(self) -> Result<HistoryRecord> {
    let emp_no = self.emp_no;
    let from_date = decode_date(&self.from_date)?;
    let to_date = decode_date(&self.to_date)?;
    let column = value_column(self.stream);

    let record = match (self.stream, self.value) {
      (Stream::Title, Value::Text(title)) => {
        HistoryRecord::Title(TitleRecord { emp_no, title, from_date, to_date })
      }
      (Stream::Salary, Value::Integer(salary)) => {
        HistoryRecord::Salary(SalaryRecord { emp_no, salary, from_date, to_date })
      }
      (Stream::Membership, Value::Text(code)) => {
        HistoryRecord::Membership(MembershipRecord {
          emp_no,
          dept_no: decode_dept_no(&code)?,
          from_date,
          to_date,
        })
      }
      (Stream::Management, Value::Text(code)) => {
        HistoryRecord::Management(ManagementRecord {
          emp_no,
          dept_no: decode_dept_no(&code)?,
          from_date,
          to_date,
        })
      }
      (_, other) => {
        return Err(Error::Decode { column, value: format!("{other:?}") });
      }
    };
    Ok(record)
  }
}

/// Raw values read from an `employees` row.
pub struct RawEmployee {
  pub emp_no:     i64,
  pub birth_date: String,
  pub first_name: String,
  pub last_name:  String,
  pub gender:     String,
  pub hire_date:  String,
}

impl RawEmployee {
  pub const SELECT: &'static str = "SELECT emp_no, birth_date, first_name, \
                                    last_name, gender, hire_date FROM employees";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      emp_no:     row.get(0)?,
      birth_date: row.get(1)?,
      first_name: row.get(2)?,
      last_name:  row.get(3)?,
      gender:     row.get(4)?,
      hire_date:  row.get(5)?,
    })
  }

  pub fn into_employee(self) -> Result<Employee> {
    Ok(Employee {
      emp_no:     self.emp_no,
      birth_date: decode_date(&self.birth_date)?,
      first_name: self.first_name,
      last_name:  self.last_name,
      gender:     self.gender.parse().map_err(|_| Error::Decode {
        column: "gender",
        value:  self.gender.clone(),
      })?,
      hire_date:  decode_date(&self.hire_date)?,
    })
  }
}

/// Raw values read from a `departments` row.
pub struct RawDepartment {
  pub dept_no:   String,
  pub dept_name: String,
}

impl RawDepartment {
  pub fn into_department(self) -> Result<Department> {
    Ok(Department {
      dept_no:   decode_dept_no(&self.dept_no)?,
      dept_name: self.dept_name,
    })
  }
}

/// Raw values of one row of the per-department listing.
pub struct RawSummary {
  pub emp_no:     i64,
  pub first_name: String,
  pub last_name:  String,
  pub hire_date:  String,
}

impl RawSummary {
  pub fn into_summary(self) -> Result<EmployeeSummary> {
    Ok(EmployeeSummary {
      emp_no:     self.emp_no,
      first_name: self.first_name,
      last_name:  self.last_name,
      hire_date:  decode_date(&self.hire_date)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn dates_round_trip_through_text() {
    let d = NaiveDate::from_ymd_opt(2023, 5, 31).unwrap();
    assert_eq!(encode_date(d), "2023-05-31");
    assert_eq!(decode_date("2023-05-31").unwrap(), d);
    assert!(matches!(decode_date("31/05/2023"), Err(Error::DateParse(_))));
  }

  #[test]
  fn mismatched_payload_type_is_a_decode_error() {
    let raw = RawRecord {
      stream:    Stream::Salary,
      emp_no:    1,
      value:     Value::Text("lots".into()),
      from_date: "2020-01-01".into(),
      to_date:   "9999-01-01".into(),
    };
    assert!(matches!(
      raw.into_record(),
      Err(Error::Decode { column: "salary", .. })
    ));
  }
}
