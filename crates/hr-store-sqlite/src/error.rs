//! Error type for `hr-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] hr_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date parse error: {0}")]
  DateParse(String),

  /// A column held a value that does not decode into the domain type.
  #[error("invalid {column} value: {value}")]
  Decode {
    column: &'static str,
    value:  String,
  },

  /// An UPDATE addressed a history row that does not exist.
  #[error("no history row matches {0}")]
  RowNotFound(String),
}

impl From<Error> for hr_core::Error {
  fn from(err: Error) -> Self {
    match err {
      Error::Core(e) => e,
      other => hr_core::Error::storage(other),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
