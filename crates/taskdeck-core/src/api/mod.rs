//! REST API clients for the to-do service.
//!
//! - `AuthClient`: login, signup, logout, profile
//! - `TaskClient`: list and create tasks
//!
//! Both share an `ApiClient` (HTTP pool plus in-flight guard) and a
//! `CredentialStore`. Authenticated calls send `Authorization: Bearer <token>`.

pub mod auth;
pub mod client;
pub mod error;
pub mod in_flight;
pub mod tasks;

pub use auth::AuthClient;
pub use client::ApiClient;
pub use error::{ApiError, ApiResult};
pub use in_flight::Operation;
pub use tasks::TaskClient;
