//! Core library for taskdeck.
//!
//! Client side of a to-do service: log in, keep the bearer token in a
//! persistent credential store, make authenticated task requests, log out.
//!
//! - `api`: `AuthClient` and `TaskClient` over a shared `ApiClient`
//! - `store`: `CredentialStore` on file, keychain or in-memory backends
//! - `cache`: last fetched task list for offline display
//! - `workspace`: `Workspace`, the owner of the session lifecycle
//! - `config`: `Config` loaded from `~/.config/taskdeck/config.json`

pub mod api;
pub mod cache;
pub mod config;
pub mod models;
pub mod store;
pub mod utils;
pub mod workspace;

pub use api::{ApiClient, ApiError, ApiResult, AuthClient, Operation, TaskClient};
pub use cache::TaskCache;
pub use config::{Config, CredentialBackend};
pub use models::{Profile, Session, SignupConfirmation, Task, TaskList, User};
pub use store::{CredentialStore, FileStore, KeyValueStore, KeyringStore, MemoryStore};
pub use workspace::{SessionState, Workspace};
