//! Session lifecycle and task list ownership.
//!
//! `Workspace` is the one place that creates a session on login and destroys
//! it on logout. Front ends hold a `Workspace` instead of reading tokens out
//! of storage themselves.
//!
//! ```text
//! LoggedOut --login ok--> LoggedIn --logout (any outcome)--> LoggedOut
//! ```

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError, ApiResult, AuthClient, TaskClient};
use crate::cache::TaskCache;
use crate::models::{Profile, Session, SignupConfirmation, Task, TaskList};
use crate::store::CredentialStore;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    LoggedOut,
    LoggedIn(Session),
}

pub struct Workspace {
    auth: AuthClient,
    tasks: TaskClient,
    store: CredentialStore,
    cache: Option<TaskCache>,
    state: SessionState,
    task_list: TaskList,
    cache_age: Option<String>,
}

impl Workspace {
    pub fn new(api: ApiClient, store: CredentialStore) -> Self {
        Self {
            auth: AuthClient::new(api.clone(), store.clone()),
            tasks: TaskClient::new(api, store.clone()),
            store,
            cache: None,
            state: SessionState::LoggedOut,
            task_list: TaskList::new(),
            cache_age: None,
        }
    }

    /// Keep fetched tasks on disk for offline display
    pub fn with_cache(mut self, cache: TaskCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.state {
            SessionState::LoggedIn(session) => Some(session),
            SessionState::LoggedOut => None,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self.state, SessionState::LoggedIn(_))
    }

    pub fn tasks(&self) -> &[Task] {
        self.task_list.as_slice()
    }

    pub fn task_list(&self) -> &TaskList {
        &self.task_list
    }

    /// Age of the task list when it came from the cache rather than the server
    pub fn cache_age(&self) -> Option<&str> {
        self.cache_age.as_deref()
    }

    /// Rebuild the session persisted by a previous run.
    ///
    /// Returns `true` when a stored token was found. The token key is
    /// authoritative; the session blob only contributes the user.
    pub fn restore(&mut self) -> Result<bool> {
        let Some(token) = self.store.get()? else {
            self.state = SessionState::LoggedOut;
            return Ok(false);
        };
        let user = self.store.session()?.and_then(|s| s.user);
        self.state = SessionState::LoggedIn(Session {
            access_token: token,
            user,
        });

        if let Some(cache) = &self.cache {
            match cache.load_tasks() {
                Ok(Some(cached)) => {
                    self.cache_age = Some(cached.age_display());
                    self.task_list.replace(cached.data);
                }
                Ok(None) => {}
                Err(e) => warn!(error = %e, "Ignoring unreadable task cache"),
            }
        }
        debug!(tasks = self.task_list.len(), "Restored session");
        Ok(true)
    }

    /// Log in and persist the session.
    ///
    /// If the session blob cannot be written the new token is removed again
    /// and the workspace ends up logged out, so no request goes out with a
    /// token paired with another user's blob.
    pub async fn login(&mut self, email: &str, password: &str) -> ApiResult<Session> {
        let session = self.auth.login(email, password).await?;
        if let Err(e) = self.store.set_session(&session) {
            warn!(error = %e, "Failed to persist session, rolling back login");
            if let Err(clear_err) = self.store.clear() {
                warn!(error = %clear_err, "Failed to roll back stored token");
            }
            self.state = SessionState::LoggedOut;
            self.task_list.clear();
            self.cache_age = None;
            self.clear_cache();
            return Err(e.into());
        }

        self.task_list.clear();
        self.cache_age = None;
        self.clear_cache();

        self.state = SessionState::LoggedIn(session.clone());
        Ok(session)
    }

    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> ApiResult<SignupConfirmation> {
        self.auth
            .signup(email, password, first_name, last_name)
            .await
    }

    /// End the session. Local state is dropped even when the server call
    /// fails; that failure is still returned.
    pub async fn logout(&mut self) -> ApiResult<()> {
        let result = self.auth.logout().await;
        if let Err(ApiError::RequestInFlight(_)) = result {
            return result;
        }

        self.state = SessionState::LoggedOut;
        self.task_list.clear();
        self.cache_age = None;
        self.clear_cache();
        info!("Session ended");
        result
    }

    pub async fn profile(&self) -> ApiResult<Profile> {
        self.auth.fetch_profile().await
    }

    /// Replace the local list with the server's
    pub async fn refresh_tasks(&mut self) -> ApiResult<&[Task]> {
        let token = self
            .session()
            .map(|s| s.access_token.clone())
            .ok_or(ApiError::MissingToken)?;
        let tasks = self.tasks.fetch_tasks(&token).await?;

        self.task_list.replace(tasks);
        self.cache_age = None;
        self.persist_tasks();
        Ok(self.task_list.as_slice())
    }

    /// Create a task on the server and append it to the local list
    pub async fn add_task(&mut self, title: &str, description: &str) -> ApiResult<Task> {
        let task = self.tasks.create_task(title, description).await?;
        self.task_list.push(task.clone());
        self.persist_tasks();
        Ok(task)
    }

    /// Local-only edit; not sent to the server
    pub fn rename_task_local(&mut self, id: i64, title: &str) -> bool {
        let found = self.task_list.rename(id, title);
        if found {
            self.persist_tasks();
        }
        found
    }

    /// Local-only edit; not sent to the server
    pub fn toggle_task_local(&mut self, id: i64) -> bool {
        let found = self.task_list.toggle(id);
        if found {
            self.persist_tasks();
        }
        found
    }

    /// Local-only removal; not sent to the server
    pub fn remove_task_local(&mut self, id: i64) -> bool {
        let found = self.task_list.remove(id);
        if found {
            self.persist_tasks();
        }
        found
    }

    fn persist_tasks(&self) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.save_tasks(self.task_list.as_slice()) {
                warn!(error = %e, "Failed to cache tasks");
            }
        }
    }

    fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.clear() {
                warn!(error = %e, "Failed to clear task cache");
            }
        }
    }
}
