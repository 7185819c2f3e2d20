//! JSON REST API for the HR records service.
//!
//! Exposes an axum [`Router`] backed by any [`hr_core::store::HrStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", hr_api::api_router(store.clone()))
//! ```

pub mod departments;
pub mod employees;
pub mod error;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use hr_core::store::HrStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: HrStore + 'static,
{
  Router::new()
    // Employees
    .route("/employees/by-department", get(employees::by_department::<S>))
    .route("/employees/promote", post(employees::promote::<S>))
    .route("/employees/{emp_no}", get(employees::get_one::<S>))
    // Departments
    .route("/departments", get(departments::list::<S>))
    .with_state(store)
}

#[cfg(test)]
mod tests;
