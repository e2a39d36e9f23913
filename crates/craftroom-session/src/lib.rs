//! Connection sessions and player storage for Craftroom.
//!
//! # Key types
//!
//! - [`SessionManager`] — live connections and the room each is in
//! - [`PlayerStore`] — storage collaborator (profiles, scores, ranking)
//! - [`MemoryStore`] — in-process [`PlayerStore`]

mod error;
mod manager;
mod session;
mod store;

pub use error::SessionError;
pub use manager::SessionManager;
pub use session::{Session, SessionState};
pub use store::{MemoryStore, PlayerProfile, PlayerStore};
