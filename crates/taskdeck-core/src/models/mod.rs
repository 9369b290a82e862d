//! Data models for the to-do service.
//!
//! - `Session`, `User`: the authenticated identity and bearer token
//! - `Profile`, `SignupConfirmation`: auth endpoint payloads
//! - `Task`, `NewTask`, `TaskList`: to-do items and the in-memory list

pub mod session;
pub mod task;

pub(crate) use session::{LoginRequest, LoginResponse, SignupRequest};
pub use session::{Profile, Session, SignupConfirmation, User};
pub use task::{NewTask, Task, TaskList};
