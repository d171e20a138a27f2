//! Authenticated sessions: the in-memory model, the on-disk cache and the manager
//! that chooses between them and the authenticator.

mod manager;
mod model;
pub mod store;

pub use manager::SessionManager;
pub use model::{AuthSession, Cookie};
pub use store::{CachedSessionRecord, CredentialStore, discover_cache_path};
