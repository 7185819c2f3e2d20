//! Handlers for `/employees` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/employees/:emp_no` | Employee with full history; 404 if not found |
//! | `GET`  | `/employees/by-department` | `?deptNo=d001[&page=1]`; 20 rows per page |
//! | `POST` | `/employees/promote` | Body: [`PromotionRequest`]; 400 / 404 / 409 on failure |

use std::sync::Arc;

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, PathRejection, QueryRejection},
  },
};
use hr_core::{
  employee::{DeptNo, EmployeeProfile, EmployeeSummary},
  promotion::{PromotionOutcome, PromotionRequest},
  store::HrStore,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /employees/:emp_no`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  path: Result<Path<i64>, PathRejection>,
) -> Result<Json<EmployeeProfile>, ApiError>
where
  S: HrStore,
{
  let Path(emp_no) = path.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  let profile = store
    .get_employee_profile(emp_no)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("employee {emp_no} not found")))?;
  Ok(Json(profile))
}

// ─── By department ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ByDepartmentParams {
  /// Required department code; either case is accepted.
  pub dept_no: Option<String>,
  /// 1-based page number. Defaults to 1.
  pub page:    Option<u32>,
}

/// `GET /employees/by-department?deptNo=<code>[&page=<n>]`
pub async fn by_department<S>(
  State(store): State<Arc<S>>,
  query: Result<Query<ByDepartmentParams>, QueryRejection>,
) -> Result<Json<Vec<EmployeeSummary>>, ApiError>
where
  S: HrStore,
{
  let Query(params) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  let raw = params
    .dept_no
    .ok_or_else(|| ApiError::BadRequest("deptNo is required".into()))?;
  let dept_no = DeptNo::parse(&raw)?;

  let employees = store
    .list_by_department(&dept_no, params.page.unwrap_or(1))
    .await
    .map_err(ApiError::store)?;
  Ok(Json(employees))
}

// ─── Promote ──────────────────────────────────────────────────────────────────

/// Body returned by a successful promotion.
#[derive(Debug, Serialize)]
pub struct PromotionResponse {
  pub message: String,
  #[serde(flatten)]
  pub outcome: PromotionOutcome,
}

/// `POST /employees/promote` with a [`PromotionRequest`] body.
///
/// A body that is not valid JSON for the request shape is reported as 400,
/// like any other malformed input.
pub async fn promote<S>(
  State(store): State<Arc<S>>,
  body: Result<Json<PromotionRequest>, JsonRejection>,
) -> Result<Json<PromotionResponse>, ApiError>
where
  S: HrStore,
{
  let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

  let outcome = store.promote(request).await.map_err(ApiError::store)?;
  Ok(Json(PromotionResponse {
    message: format!("Promotion successful for empNo {}", outcome.emp_no),
    outcome,
  }))
}
