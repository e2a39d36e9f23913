//! Session manager: which connections are live and where they are.

use std::collections::HashMap;
use std::time::Instant;

use craftroom_protocol::{PlayerId, RoomId};

use crate::{Session, SessionError, SessionState};

/// Tracks every live connection.
///
/// The room registry is the authority on room membership; sessions mirror
/// it for the gateway so it can log and clean up without asking a room.
#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: HashMap<PlayerId, Session>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new connection in the lobby.
    pub fn create(&mut self, player_id: PlayerId) -> Result<&Session, SessionError> {
        if self.sessions.contains_key(&player_id) {
            return Err(SessionError::AlreadyConnected(player_id));
        }
        let session = self.sessions.entry(player_id).or_insert(Session {
            player_id,
            state: SessionState::Lobby,
            connected_at: Instant::now(),
        });
        tracing::info!(%player_id, "session created");
        Ok(session)
    }

    /// Records that the player joined `room_id` as `username`.
    pub fn enter_room(
        &mut self,
        player_id: PlayerId,
        room_id: RoomId,
        username: String,
    ) -> Result<(), SessionError> {
        let session = self
            .sessions
            .get_mut(&player_id)
            .ok_or(SessionError::NotFound(player_id))?;
        session.state = SessionState::InRoom { room_id, username };
        Ok(())
    }

    /// Moves the player back to the lobby, returning the room they left.
    pub fn leave_room(&mut self, player_id: PlayerId) -> Result<Option<RoomId>, SessionError> {
        let session = self
            .sessions
            .get_mut(&player_id)
            .ok_or(SessionError::NotFound(player_id))?;
        match std::mem::replace(&mut session.state, SessionState::Lobby) {
            SessionState::InRoom { room_id, .. } => Ok(Some(room_id)),
            SessionState::Lobby => Ok(None),
        }
    }

    /// Drops the session entirely.
    pub fn disconnect(&mut self, player_id: PlayerId) -> Result<Session, SessionError> {
        let session = self
            .sessions
            .remove(&player_id)
            .ok_or(SessionError::NotFound(player_id))?;
        tracing::info!(
            %player_id,
            connected_secs = session.connected_at.elapsed().as_secs(),
            "session closed"
        );
        Ok(session)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(id: u64) -> PlayerId {
        PlayerId(id)
    }

    #[test]
    fn test_create_starts_in_lobby() {
        let mut mgr = SessionManager::new();
        let session = mgr.create(pid(1)).expect("should succeed");
        assert_eq!(session.state, SessionState::Lobby);
        assert_eq!(session.room_id(), None);
        assert_eq!(mgr.len(), 1);
    }

    #[test]
    fn test_create_twice_rejected() {
        let mut mgr = SessionManager::new();
        mgr.create(pid(1)).unwrap();
        assert!(matches!(
            mgr.create(pid(1)),
            Err(SessionError::AlreadyConnected(p)) if p == pid(1)
        ));
    }

    #[test]
    fn test_enter_and_leave_room() {
        let mut mgr = SessionManager::new();
        mgr.create(pid(1)).unwrap();
        mgr.create(pid(2)).unwrap();
        let lobby = RoomId::from("lobby");

        mgr.enter_room(pid(1), lobby.clone(), "ann".into()).unwrap();

        assert_eq!(mgr.leave_room(pid(1)).unwrap(), Some(lobby.clone()));
        assert_eq!(mgr.leave_room(pid(1)).unwrap(), None);
        assert_eq!(mgr.leave_room(pid(2)).unwrap(), None);
    }

    #[test]
    fn test_unknown_player_errors() {
        let mut mgr = SessionManager::new();
        assert!(matches!(
            mgr.enter_room(pid(9), RoomId::from("x"), "x".into()),
            Err(SessionError::NotFound(_))
        ));
        assert!(matches!(mgr.disconnect(pid(9)), Err(SessionError::NotFound(_))));
    }

    #[test]
    fn test_disconnect_removes_session() {
        let mut mgr = SessionManager::new();
        mgr.create(pid(1)).unwrap();
        let session = mgr.disconnect(pid(1)).unwrap();
        assert_eq!(session.player_id, pid(1));
        assert!(mgr.is_empty());
    }
}
