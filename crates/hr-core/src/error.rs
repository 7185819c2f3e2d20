//! Error types for `hr-core`.

use chrono::NaiveDate;
use thiserror::Error;

use crate::{employee::DeptNo, history::Stream};

#[derive(Debug, Error)]
pub enum Error {
  /// The request is malformed: a field is missing, blank, out of range or
  /// does not match its expected shape.
  #[error("invalid request: {0}")]
  Validation(String),

  #[error("employee not found: {0}")]
  EmployeeNotFound(i64),

  #[error("department not found: {0}")]
  DepartmentNotFound(DeptNo),

  /// The effective date does not fall strictly after the start of the most
  /// recent record in `stream`.
  #[error(
    "{stream} history conflict: effective date {effective} must be after \
     the latest record starting {blocking}"
  )]
  Conflict {
    stream:    Stream,
    effective: NaiveDate,
    blocking:  NaiveDate,
  },

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Coarse classification of an [`Error`], used by callers that translate
/// failures into protocol responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  Validation,
  NotFound,
  Conflict,
  Storage,
}

impl Error {
  pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Storage(Box::new(err))
  }

  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::Validation(_) => ErrorKind::Validation,
      Self::EmployeeNotFound(_) | Self::DepartmentNotFound(_) => {
        ErrorKind::NotFound
      }
      Self::Conflict { .. } => ErrorKind::Conflict,
      Self::Storage(_) => ErrorKind::Storage,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
