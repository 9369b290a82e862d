//! Per-operation guard against duplicate submissions.
//!
//! A double-tapped "log in" or "add task" would otherwise send two identical
//! requests and race on the credential store or the task list. The registry
//! admits at most one request of each [`Operation`] at a time.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::debug;

use super::{ApiError, ApiResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Login,
    Signup,
    Logout,
    FetchProfile,
    FetchTasks,
    CreateTask,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Login => "login",
            Operation::Signup => "signup",
            Operation::Logout => "logout",
            Operation::FetchProfile => "fetch-profile",
            Operation::FetchTasks => "fetch-tasks",
            Operation::CreateTask => "create-task",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Shared set of operations currently on the wire.
/// Clone is cheap and clones share the same set.
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    active: Arc<Mutex<HashSet<Operation>>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the slot for `op`, failing if one is already held.
    pub fn begin(&self, op: Operation) -> ApiResult<InFlightGuard> {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        if !active.insert(op) {
            debug!(operation = %op, "Rejected duplicate in-flight request");
            return Err(ApiError::RequestInFlight(op));
        }
        Ok(InFlightGuard {
            active: Arc::clone(&self.active),
            op,
        })
    }

    pub fn is_active(&self, op: Operation) -> bool {
        self.active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&op)
    }
}

/// Releases its operation slot on drop, including when the owning future is
/// dropped before completion.
#[derive(Debug)]
pub struct InFlightGuard {
    active: Arc<Mutex<HashSet<Operation>>>,
    op: Operation,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.op);
    }
}
