//! Wire protocol for Craftroom.
//!
//! - **Messages** ([`ClientMessage`], [`ServerMessage`]) — every event a
//!   client can send and every update the server pushes back.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those messages become
//!   frame bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! ```text
//! Transport (frames) → Protocol (ClientMessage) → Room (Action)
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod codec;
mod error;
mod messages;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use messages::{ClientMessage, RankingEntry, Recipient, ServerMessage, TargetSpec};

// The identifiers travel on the wire, so the protocol re-exports them.
pub use craftroom_world::{MonsterId, PlayerId, RoomId};
