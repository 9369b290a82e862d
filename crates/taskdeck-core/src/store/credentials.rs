use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use super::{KeyValueStore, MemoryStore};
use crate::models::Session;

/// Key holding the bearer token
pub const TOKEN_KEY: &str = "access_token";

/// Key holding the serialized session blob
pub const SESSION_KEY: &str = "userData";

/// Holds at most one access token and one session blob.
/// Clone is cheap and clones share the backend.
#[derive(Clone)]
pub struct CredentialStore {
    backend: Arc<dyn KeyValueStore>,
}

impl CredentialStore {
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    pub fn from_arc(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Store backed by process memory only
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    pub fn set(&self, token: &str) -> Result<()> {
        self.backend
            .set(TOKEN_KEY, token)
            .context("Failed to persist access token")
    }

    pub fn get(&self) -> Result<Option<String>> {
        let token = self
            .backend
            .get(TOKEN_KEY)
            .context("Failed to read access token")?;
        Ok(token.filter(|t| !t.is_empty()))
    }

    pub fn has_token(&self) -> bool {
        matches!(self.get(), Ok(Some(_)))
    }

    /// Remove both the token and the session blob
    pub fn clear(&self) -> Result<()> {
        let token = self.backend.remove(TOKEN_KEY);
        let session = self.backend.remove(SESSION_KEY);
        token.context("Failed to remove access token")?;
        session.context("Failed to remove session data")?;
        debug!("Credential store cleared");
        Ok(())
    }

    pub fn set_session(&self, session: &Session) -> Result<()> {
        let blob = serde_json::to_string(session)?;
        self.backend
            .set(SESSION_KEY, &blob)
            .context("Failed to persist session data")
    }

    /// Read the session blob. An unreadable blob is treated as absent.
    pub fn session(&self) -> Result<Option<Session>> {
        let Some(blob) = self
            .backend
            .get(SESSION_KEY)
            .context("Failed to read session data")?
        else {
            return Ok(None);
        };
        match serde_json::from_str(&blob) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable session data");
                Ok(None)
            }
        }
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore").finish_non_exhaustive()
    }
}
