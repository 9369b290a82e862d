//! Local persistence for session credentials.
//!
//! - `KeyValueStore`: the backend contract, with `FileStore`, `KeyringStore`
//!   and `MemoryStore` implementations
//! - `CredentialStore`: the one-token, one-session-blob view used by the
//!   API clients

pub mod credentials;
pub mod file;
pub mod keychain;
pub mod kv;

pub use credentials::{CredentialStore, SESSION_KEY, TOKEN_KEY};
pub use file::FileStore;
pub use keychain::KeyringStore;
pub use kv::{KeyValueStore, MemoryStore};
