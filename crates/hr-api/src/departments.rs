//! Handler for `GET /departments`.

use std::sync::Arc;

use axum::{Json, extract::State};
use hr_core::{employee::Department, store::HrStore};

use crate::error::ApiError;

/// `GET /departments` — every department, ordered by code.
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Department>>, ApiError>
where
  S: HrStore,
{
  let departments = store.list_departments().await.map_err(ApiError::store)?;
  Ok(Json(departments))
}
