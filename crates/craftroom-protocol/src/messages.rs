//! Client and server messages.
//!
//! Every frame is `{"event": "<kebab-case name>", "data": {...}}` with
//! camelCase fields. Events without a payload omit `data`.

use craftroom_world::{
    Cell, Direction, GameMap, Inventory, ItemKind, Loadout, Monster, MonsterId, Phase,
    Player, PlayerId, Position, RoomId, RoomSnapshot, Target,
};
use serde::{Deserialize, Serialize};

/// Who should receive an outbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Every player in the room.
    All,
    /// One player.
    Player(PlayerId),
}

/// A mine or place target as clients send it: either explicit
/// coordinates or a direction from the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TargetSpec {
    Cell { x: i32, y: i32 },
    Toward { direction: Direction },
}

impl From<TargetSpec> for Target {
    fn from(spec: TargetSpec) -> Self {
        match spec {
            TargetSpec::Cell { x, y } => Target::At(Position::new(x, y)),
            TargetSpec::Toward { direction } => Target::Toward(direction),
        }
    }
}

// ---------------------------------------------------------------------------
// Client → server
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ClientMessage {
    CreateRoom {
        room_id: RoomId,
    },
    JoinRoom {
        room_id: RoomId,
        #[serde(default)]
        username: Option<String>,
    },
    LeaveRoom,
    RequestMap,
    MovePlayer {
        direction: Direction,
    },
    MineBlock {
        #[serde(flatten)]
        target: TargetSpec,
        #[serde(default)]
        tool_type: Option<String>,
    },
    PlaceBlock {
        #[serde(flatten)]
        target: TargetSpec,
        block_type: String,
    },
    TradeItem {
        item_name: String,
    },
    EquipArmor {
        item_name: String,
        slot_type: String,
    },
    UnequipArmor {
        slot_type: String,
    },
    AttackMonster {
        monster_id: MonsterId,
    },
    ChangeHotbarSlot {
        slot: u8,
    },
    RestartGame,
    RequestRanking {
        #[serde(default)]
        limit: Option<usize>,
    },
}

// ---------------------------------------------------------------------------
// Server → client
// ---------------------------------------------------------------------------

/// One row of the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    pub rank: usize,
    pub username: String,
    pub score: u64,
    pub games_played: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ServerMessage {
    RoomCreated {
        room: RoomSnapshot,
    },
    RoomError {
        message: String,
    },
    PlayerJoined {
        player: Player,
        room: RoomSnapshot,
    },
    MapData {
        map: GameMap,
        players: Vec<Player>,
        monsters: Vec<Monster>,
        phase: Phase,
    },
    PlayerMoved {
        player_id: PlayerId,
        position: Position,
        direction: Direction,
    },
    BlockUpdated {
        x: i32,
        y: i32,
        block: Cell,
        player_id: PlayerId,
        new_inventory: Inventory,
    },
    MiningError {
        message: String,
    },
    PlacementError {
        message: String,
    },
    TradeSuccess {
        new_inventory: Inventory,
        acquired: ItemKind,
    },
    TradeError {
        message: String,
    },
    PlayerUpdated {
        player_id: PlayerId,
        updated: Loadout,
    },
    PlayerHotbarChanged {
        player_id: PlayerId,
        selected_slot: u8,
    },
    ActionError {
        message: String,
    },
    MonstersUpdated {
        monsters: Vec<Monster>,
    },
    PlayerRestarted {
        player: Player,
    },
    PhaseChanged {
        phase: Phase,
    },
    MonsterAttacking {
        monster_id: MonsterId,
        player_id: PlayerId,
    },
    PlayerDamaged {
        player_id: PlayerId,
        new_health: u32,
    },
    PlayerDied {
        player_id: PlayerId,
    },
    PlayerLeft {
        player_id: PlayerId,
        username: String,
    },
    Ranking {
        entries: Vec<RankingEntry>,
    },
    RoomClosed {
        reason: String,
    },
    InvalidMessage {
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn parse(value: serde_json::Value) -> ClientMessage {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_unit_events_need_no_data() {
        assert_eq!(parse(json!({"event": "restart-game"})), ClientMessage::RestartGame);
        assert_eq!(parse(json!({"event": "leave-room"})), ClientMessage::LeaveRoom);
    }

    #[test]
    fn test_join_room_username_optional() {
        assert_eq!(
            parse(json!({"event": "join-room", "data": {"roomId": "lobby"}})),
            ClientMessage::JoinRoom {
                room_id: RoomId::from("lobby"),
                username: None
            }
        );
        assert_eq!(
            parse(json!({"event": "join-room", "data": {"roomId": "lobby", "username": "ann"}})),
            ClientMessage::JoinRoom {
                room_id: RoomId::from("lobby"),
                username: Some("ann".into())
            }
        );
    }

    #[test]
    fn test_mine_block_by_coordinates() {
        let msg = parse(json!({
            "event": "mine-block",
            "data": {"x": 10, "y": 12, "toolType": "iron_pickaxe"}
        }));
        assert_eq!(
            msg,
            ClientMessage::MineBlock {
                target: TargetSpec::Cell { x: 10, y: 12 },
                tool_type: Some("iron_pickaxe".into())
            }
        );
    }

    #[test]
    fn test_place_block_by_direction() {
        let msg = parse(json!({
            "event": "place-block",
            "data": {"direction": "left", "blockType": "stone"}
        }));
        assert_eq!(
            msg,
            ClientMessage::PlaceBlock {
                target: TargetSpec::Toward {
                    direction: Direction::Left
                },
                block_type: "stone".into()
            }
        );
    }

    #[test]
    fn test_unknown_event_rejected() {
        let result: Result<ClientMessage, _> =
            serde_json::from_value(json!({"event": "fly", "data": {}}));
        assert!(result.is_err());
    }

    #[test]
    fn test_server_event_shapes() {
        let moved = serde_json::to_value(ServerMessage::PlayerMoved {
            player_id: PlayerId(4),
            position: Position::new(25, 24),
            direction: Direction::Up,
        })
        .unwrap();
        assert_eq!(
            moved,
            json!({
                "event": "player-moved",
                "data": {"playerId": 4, "position": {"x": 25, "y": 24}, "direction": "up"}
            })
        );

        let damaged = serde_json::to_value(ServerMessage::PlayerDamaged {
            player_id: PlayerId(1),
            new_health: 18,
        })
        .unwrap();
        assert_eq!(damaged["event"], "player-damaged");
        assert_eq!(damaged["data"]["newHealth"], 18);
    }

    #[test]
    fn test_target_spec_converts() {
        assert_eq!(
            Target::from(TargetSpec::Cell { x: 1, y: 2 }),
            Target::At(Position::new(1, 2))
        );
        assert_eq!(
            Target::from(TargetSpec::Toward {
                direction: Direction::Down
            }),
            Target::Toward(Direction::Down)
        );
    }
}
