//! Router tests against an in-memory SQLite store.

use std::sync::Arc;

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
};
use chrono::NaiveDate;
use hr_core::{
  employee::{Department, DeptNo, Employee, Gender},
  history::{HistoryRecord, MembershipRecord, SENTINEL_END, SalaryRecord, TitleRecord},
  store::HrStore,
};
use hr_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::api_router;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn make_store() -> Arc<SqliteStore> {
  let store = SqliteStore::open_in_memory().await.unwrap();
  for (code, name) in [("d001", "Marketing"), ("d002", "Finance")] {
    store
      .add_department(Department {
        dept_no:   DeptNo::parse(code).unwrap(),
        dept_name: name.into(),
      })
      .await
      .unwrap();
  }
  store
    .add_employee(Employee {
      emp_no:     10001,
      birth_date: date(1953, 9, 2),
      first_name: "Georgi".into(),
      last_name:  "Facello".into(),
      gender:     Gender::M,
      hire_date:  date(1986, 6, 26),
    })
    .await
    .unwrap();
  for record in [
    HistoryRecord::Title(TitleRecord {
      emp_no:    10001,
      title:     "Engineer".into(),
      from_date: date(2020, 1, 1),
      to_date:   SENTINEL_END,
    }),
    HistoryRecord::Salary(SalaryRecord {
      emp_no:    10001,
      salary:    50000,
      from_date: date(2020, 1, 1),
      to_date:   SENTINEL_END,
    }),
    HistoryRecord::Membership(MembershipRecord {
      emp_no:    10001,
      dept_no:   DeptNo::parse("d001").unwrap(),
      from_date: date(2020, 1, 1),
      to_date:   SENTINEL_END,
    }),
  ] {
    store.record_history(record).await.unwrap();
  }
  Arc::new(store)
}

async fn send(
  store:  Arc<SqliteStore>,
  method: &str,
  uri:    &str,
  body:   Option<String>,
) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  if body.is_some() {
    builder = builder.header(header::CONTENT_TYPE, "application/json");
  }
  let req = builder.body(Body::from(body.unwrap_or_default())).unwrap();
  let resp = api_router(store).oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let json = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
  };
  (status, json)
}

fn promotion_body(from: &str, dept: &str, manager: bool) -> Option<String> {
  Some(
    json!({
      "empNo": 10001,
      "newTitle": "Senior Engineer",
      "fromDate": from,
      "salary": 70000,
      "deptNo": dept,
      "manager": manager,
    })
    .to_string(),
  )
}

// ── Reads ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn get_employee_returns_profile_with_history() {
  let store = make_store().await;
  let (status, body) = send(store, "GET", "/employees/10001", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["empNo"], 10001);
  assert_eq!(body["firstName"], "Georgi");
  assert_eq!(body["hireDate"], "1986-06-26");
  assert_eq!(body["titles"][0]["title"], "Engineer");
  assert_eq!(body["departments"][0]["deptNo"], "d001");
  assert_eq!(body["departments"][0]["toDate"], "9999-01-01");
}

#[tokio::test]
async fn get_missing_employee_returns_404_with_error_body() {
  let store = make_store().await;
  let (status, body) = send(store, "GET", "/employees/42", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["error"].as_str().unwrap().contains("42"));
}

#[tokio::test]
async fn by_department_accepts_uppercase_code() {
  let store = make_store().await;
  let (status, body) =
    send(store, "GET", "/employees/by-department?deptNo=D001&page=1", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body.as_array().unwrap().len(), 1);
  assert_eq!(body[0]["empNo"], 10001);
  assert_eq!(body[0]["lastName"], "Facello");
}

#[tokio::test]
async fn by_department_rejects_bad_input() {
  let store = make_store().await;
  let (status, _) = send(store.clone(), "GET", "/employees/by-department", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  let (status, _) =
    send(store.clone(), "GET", "/employees/by-department?deptNo=sales", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  let (status, _) =
    send(store, "GET", "/employees/by-department?deptNo=d001&page=0", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_path_and_query_return_json_errors() {
  let store = make_store().await;
  let (status, body) = send(store.clone(), "GET", "/employees/abc", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("abc"));

  let (status, body) =
    send(store, "GET", "/employees/by-department?deptNo=d001&page=x", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string());
}

#[tokio::test]
async fn departments_are_listed() {
  let store = make_store().await;
  let (status, body) = send(store, "GET", "/departments", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!([
    { "deptNo": "d001", "deptName": "Marketing" },
    { "deptNo": "d002", "deptName": "Finance" },
  ]));
}

// ── Promote ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn promote_succeeds_and_reports_employee() {
  let store = make_store().await;
  let (status, body) = send(
    store.clone(),
    "POST",
    "/employees/promote",
    promotion_body("2023-06-01", "d002", true),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["message"], "Promotion successful for empNo 10001");
  assert_eq!(body["empNo"], 10001);
  assert_eq!(body["departmentChanged"], true);
  assert_eq!(body["managerAssigned"], true);

  let (_, profile) = send(store, "GET", "/employees/10001", None).await;
  assert_eq!(profile["titles"].as_array().unwrap().len(), 2);
  assert_eq!(profile["managedDepartments"][0]["deptNo"], "d002");
}

#[tokio::test]
async fn promote_with_stale_date_returns_409() {
  let store = make_store().await;
  let (status, body) = send(
    store,
    "POST",
    "/employees/promote",
    promotion_body("2020-01-01", "d001", false),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert!(body["error"].as_str().unwrap().contains("2020-01-01"));
}

#[tokio::test]
async fn promote_unknown_department_returns_404() {
  let store = make_store().await;
  let (status, _) = send(
    store,
    "POST",
    "/employees/promote",
    promotion_body("2023-06-01", "d777", false),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn promote_with_invalid_fields_returns_400() {
  let store = make_store().await;
  let (status, body) = send(
    store.clone(),
    "POST",
    "/employees/promote",
    Some(json!({ "empNo": 10001, "newTitle": "Lead" }).to_string()),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("fromDate"));

  let (status, body) = send(
    store,
    "POST",
    "/employees/promote",
    Some("{\"empNo\": \"ten\"}".into()),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string());
}
