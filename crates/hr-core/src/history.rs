//! Temporal history streams.
//!
//! Every employee owns four independent streams (title, salary, department
//! membership, department management). A stream is a sequence of
//! non-overlapping `[from_date, to_date]` intervals; the currently effective
//! row is the one whose `to_date` is [`SENTINEL_END`]. Rows are never deleted:
//! ending a record means moving its `to_date` to the day before its successor
//! starts.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::employee::DeptNo;

/// The far-future `to_date` that marks a row as open.
pub const SENTINEL_END: NaiveDate = match NaiveDate::from_ymd_opt(9999, 1, 1) {
  Some(date) => date,
  None => panic!("sentinel date out of range"),
};

// ─── Streams ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stream {
  Title,
  Salary,
  Membership,
  Management,
}

impl Stream {
  pub const ALL: [Stream; 4] =
    [Self::Title, Self::Salary, Self::Membership, Self::Management];
}

impl fmt::Display for Stream {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Title => "title",
      Self::Salary => "salary",
      Self::Membership => "department membership",
      Self::Management => "department management",
    })
  }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// A row of the `titles` stream. Unique on `(emp_no, title, from_date)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleRecord {
  pub emp_no:    i64,
  pub title:     String,
  pub from_date: NaiveDate,
  pub to_date:   NaiveDate,
}

/// A row of the `salaries` stream. Unique on `(emp_no, from_date)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryRecord {
  pub emp_no:    i64,
  pub salary:    i64,
  pub from_date: NaiveDate,
  pub to_date:   NaiveDate,
}

/// Membership of an employee in a department (`dept_emp`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipRecord {
  pub emp_no:    i64,
  pub dept_no:   DeptNo,
  pub from_date: NaiveDate,
  pub to_date:   NaiveDate,
}

/// Management of a department by an employee (`dept_manager`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagementRecord {
  pub emp_no:    i64,
  pub dept_no:   DeptNo,
  pub from_date: NaiveDate,
  pub to_date:   NaiveDate,
}

/// A row from any of the four streams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stream", rename_all = "snake_case")]
pub enum HistoryRecord {
  Title(TitleRecord),
  Salary(SalaryRecord),
  Membership(MembershipRecord),
  Management(ManagementRecord),
}

/// Structural identity of a history row, used to address it when closing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordKey {
  Title {
    emp_no:    i64,
    title:     String,
    from_date: NaiveDate,
  },
  Salary {
    emp_no:    i64,
    from_date: NaiveDate,
  },
  Membership {
    emp_no:    i64,
    dept_no:   DeptNo,
    from_date: NaiveDate,
  },
  Management {
    emp_no:    i64,
    dept_no:   DeptNo,
    from_date: NaiveDate,
  },
}

impl HistoryRecord {
  pub fn stream(&self) -> Stream {
    match self {
      Self::Title(_) => Stream::Title,
      Self::Salary(_) => Stream::Salary,
      Self::Membership(_) => Stream::Membership,
      Self::Management(_) => Stream::Management,
    }
  }

  pub fn emp_no(&self) -> i64 {
    match self {
      Self::Title(r) => r.emp_no,
      Self::Salary(r) => r.emp_no,
      Self::Membership(r) => r.emp_no,
      Self::Management(r) => r.emp_no,
    }
  }

  pub fn from_date(&self) -> NaiveDate {
    match self {
      Self::Title(r) => r.from_date,
      Self::Salary(r) => r.from_date,
      Self::Membership(r) => r.from_date,
      Self::Management(r) => r.from_date,
    }
  }

  pub fn to_date(&self) -> NaiveDate {
    match self {
      Self::Title(r) => r.to_date,
      Self::Salary(r) => r.to_date,
      Self::Membership(r) => r.to_date,
      Self::Management(r) => r.to_date,
    }
  }

  /// The department a membership or management row refers to.
  pub fn dept_no(&self) -> Option<&DeptNo> {
    match self {
      Self::Membership(r) => Some(&r.dept_no),
      Self::Management(r) => Some(&r.dept_no),
      Self::Title(_) | Self::Salary(_) => None,
    }
  }

  pub fn is_open(&self) -> bool { self.to_date() == SENTINEL_END }

  /// Move the end of this row to `to_date`.
  pub fn close(&mut self, to_date: NaiveDate) {
    match self {
      Self::Title(r) => r.to_date = to_date,
      Self::Salary(r) => r.to_date = to_date,
      Self::Membership(r) => r.to_date = to_date,
      Self::Management(r) => r.to_date = to_date,
    }
  }

  pub fn key(&self) -> RecordKey {
    match self {
      Self::Title(r) => RecordKey::Title {
        emp_no:    r.emp_no,
        title:     r.title.clone(),
        from_date: r.from_date,
      },
      Self::Salary(r) => RecordKey::Salary {
        emp_no:    r.emp_no,
        from_date: r.from_date,
      },
      Self::Membership(r) => RecordKey::Membership {
        emp_no:    r.emp_no,
        dept_no:   r.dept_no.clone(),
        from_date: r.from_date,
      },
      Self::Management(r) => RecordKey::Management {
        emp_no:    r.emp_no,
        dept_no:   r.dept_no.clone(),
        from_date: r.from_date,
      },
    }
  }
}

impl RecordKey {
  pub fn stream(&self) -> Stream {
    match self {
      Self::Title { .. } => Stream::Title,
      Self::Salary { .. } => Stream::Salary,
      Self::Membership { .. } => Stream::Membership,
      Self::Management { .. } => Stream::Management,
    }
  }
}
