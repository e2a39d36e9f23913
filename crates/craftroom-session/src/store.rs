//! Player profiles and the leaderboard.
//!
//! The game only needs three things from storage, captured by
//! [`PlayerStore`]. [`MemoryStore`] keeps everything in process; a
//! database-backed store implements the same trait.

use std::collections::HashMap;

use craftroom_protocol::RankingEntry;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::SessionError;

/// Persistent per-username record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    pub username: String,
    /// Monsters defeated across all sessions.
    pub total_score: u64,
    pub games_played: u32,
}

impl PlayerProfile {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            total_score: 0,
            games_played: 0,
        }
    }
}

/// Storage collaborator used by the gateway.
///
/// Never called from inside a room actor and never while a registry lock
/// is held. Futures must be `Send` because they run inside spawned
/// connection tasks.
pub trait PlayerStore: Send + Sync + 'static {
    /// Fetches a profile, creating an empty one for a new username.
    fn load_player(
        &self,
        username: &str,
    ) -> impl std::future::Future<Output = Result<PlayerProfile, SessionError>> + Send;

    /// Adds a finished session's score and counts the game. Returns the
    /// updated profile.
    fn save_score(
        &self,
        username: &str,
        score: u64,
    ) -> impl std::future::Future<Output = Result<PlayerProfile, SessionError>> + Send;

    /// Highest total scores first, ties by username.
    fn top_players(
        &self,
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Vec<RankingEntry>, SessionError>> + Send;
}

/// In-process store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    profiles: Mutex<HashMap<String, PlayerProfile>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PlayerStore for MemoryStore {
    async fn load_player(&self, username: &str) -> Result<PlayerProfile, SessionError> {
        let mut profiles = self.profiles.lock().await;
        let profile = profiles
            .entry(username.to_owned())
            .or_insert_with(|| PlayerProfile::new(username));
        Ok(profile.clone())
    }

    async fn save_score(&self, username: &str, score: u64) -> Result<PlayerProfile, SessionError> {
        let mut profiles = self.profiles.lock().await;
        let profile = profiles
            .entry(username.to_owned())
            .or_insert_with(|| PlayerProfile::new(username));
        profile.total_score += score;
        profile.games_played += 1;
        tracing::debug!(username, score, total = profile.total_score, "score saved");
        Ok(profile.clone())
    }

    async fn top_players(&self, limit: usize) -> Result<Vec<RankingEntry>, SessionError> {
        let profiles = self.profiles.lock().await;
        let mut ranked: Vec<&PlayerProfile> = profiles.values().collect();
        ranked.sort_by(|a, b| {
            b.total_score
                .cmp(&a.total_score)
                .then_with(|| a.username.cmp(&b.username))
        });
        Ok(ranked
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(i, profile)| RankingEntry {
                rank: i + 1,
                username: profile.username.clone(),
                score: profile.total_score,
                games_played: profile.games_played,
            })
            .collect())
    }
}
