//! Employees and departments. These are the pre-existing entities that
//! history rows hang off.
//!
//! Neither type holds references to its history. The streams are looked up
//! from the store by `emp_no` and bundled into an [`EmployeeProfile`] on read.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  history::{ManagementRecord, MembershipRecord, SalaryRecord, TitleRecord},
};

// ─── Department code ─────────────────────────────────────────────────────────

/// A department code such as `d001`.
///
/// Always stored in lowercase; [`DeptNo::parse`] accepts either case, so two
/// codes compare equal regardless of how the caller spelled them.
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct DeptNo(String);

impl DeptNo {
  /// Parse a code of the form `[dD]` followed by exactly three ASCII digits.
  pub fn parse(raw: &str) -> Result<Self> {
    let code = raw.trim();
    let mut chars = code.chars();
    let valid = matches!(chars.next(), Some('d' | 'D'))
      && code.len() == 4
      && chars.all(|c| c.is_ascii_digit());

    if !valid {
      return Err(Error::Validation(format!(
        "department code {raw:?} must look like d001"
      )));
    }
    Ok(Self(code.to_ascii_lowercase()))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for DeptNo {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl FromStr for DeptNo {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> { Self::parse(s) }
}

impl TryFrom<String> for DeptNo {
  type Error = Error;

  fn try_from(value: String) -> Result<Self> { Self::parse(&value) }
}

impl From<DeptNo> for String {
  fn from(value: DeptNo) -> Self { value.0 }
}

// ─── Department ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
  pub dept_no:   DeptNo,
  pub dept_name: String,
}

// ─── Employee ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
  M,
  F,
}

impl Gender {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::M => "M",
      Self::F => "F",
    }
  }
}

impl FromStr for Gender {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "M" => Ok(Self::M),
      "F" => Ok(Self::F),
      other => Err(Error::Validation(format!("unknown gender: {other:?}"))),
    }
  }
}

/// Stable employee attributes. Everything that changes over time lives in
/// one of the four history streams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
  pub emp_no:     i64,
  pub birth_date: NaiveDate,
  pub first_name: String,
  pub last_name:  String,
  pub gender:     Gender,
  pub hire_date:  NaiveDate,
}

// ─── Read models ─────────────────────────────────────────────────────────────

/// One row of the paged per-department listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeSummary {
  pub emp_no:     i64,
  pub first_name: String,
  pub last_name:  String,
  pub hire_date:  NaiveDate,
}

impl From<&Employee> for EmployeeSummary {
  fn from(e: &Employee) -> Self {
    Self {
      emp_no:     e.emp_no,
      first_name: e.first_name.clone(),
      last_name:  e.last_name.clone(),
      hire_date:  e.hire_date,
    }
  }
}

/// An employee together with every history stream, each ordered by
/// `from_date` ascending. Never stored; assembled on read.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeProfile {
  #[serde(flatten)]
  pub employee:            Employee,
  pub titles:              Vec<TitleRecord>,
  pub salaries:            Vec<SalaryRecord>,
  pub departments:         Vec<MembershipRecord>,
  pub managed_departments: Vec<ManagementRecord>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn dept_no_normalizes_case_and_whitespace() {
    assert_eq!(DeptNo::parse("D004").unwrap().as_str(), "d004");
    assert_eq!(DeptNo::parse(" d010 ").unwrap().as_str(), "d010");
  }

  #[test]
  fn dept_no_rejects_malformed_codes() {
    for raw in ["", "d01", "d0001", "x001", "dabc", "d0a1", "d١٢٣"] {
      assert!(
        matches!(DeptNo::parse(raw), Err(Error::Validation(_))),
        "{raw:?} should be rejected"
      );
    }
  }

  #[test]
  fn dept_no_deserializes_through_parse() {
    let d: DeptNo = serde_json::from_str("\"D002\"").unwrap();
    assert_eq!(d.as_str(), "d002");
    assert!(serde_json::from_str::<DeptNo>("\"sales\"").is_err());
  }
}
