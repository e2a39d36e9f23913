//! In-room player actions.

use craftroom_protocol::{ClientMessage, MonsterId};
use craftroom_world::{Direction, Target};

/// A request a room member sends to the room's actor.
///
/// Names of items, tools and slots stay as strings here; the actor parses
/// them so an unknown name is reported back like any other rejection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    RequestMap,
    Move(Direction),
    Mine {
        target: Target,
        tool: Option<String>,
    },
    Place {
        target: Target,
        block: String,
    },
    Trade {
        item: String,
    },
    Equip {
        item: String,
        slot: String,
    },
    Unequip {
        slot: String,
    },
    Attack(MonsterId),
    SelectSlot(u8),
    Restart,
}

/// Gateway-level messages (room lifecycle, ranking) are handed back
/// unchanged as the error.
impl TryFrom<ClientMessage> for Action {
    type Error = ClientMessage;

    fn try_from(msg: ClientMessage) -> Result<Self, Self::Error> {
        let action = match msg {
            ClientMessage::RequestMap => Action::RequestMap,
            ClientMessage::MovePlayer { direction } => Action::Move(direction),
            ClientMessage::MineBlock { target, tool_type } => Action::Mine {
                target: target.into(),
                tool: tool_type,
            },
            ClientMessage::PlaceBlock { target, block_type } => Action::Place {
                target: target.into(),
                block: block_type,
            },
            ClientMessage::TradeItem { item_name } => Action::Trade { item: item_name },
            ClientMessage::EquipArmor {
                item_name,
                slot_type,
            } => Action::Equip {
                item: item_name,
                slot: slot_type,
            },
            ClientMessage::UnequipArmor { slot_type } => Action::Unequip { slot: slot_type },
            ClientMessage::AttackMonster { monster_id } => Action::Attack(monster_id),
            ClientMessage::ChangeHotbarSlot { slot } => Action::SelectSlot(slot),
            ClientMessage::RestartGame => Action::Restart,
            other => return Err(other),
        };
        Ok(action)
    }
}

#[cfg(test)]
mod tests {
    use craftroom_protocol::{RoomId, TargetSpec};
    use craftroom_world::Position;

    use super::*;

    #[test]
    fn test_mine_with_explicit_cell() {
        let msg = ClientMessage::MineBlock {
            target: TargetSpec::Cell { x: 3, y: 4 },
            tool_type: Some("stone_pickaxe".into()),
        };
        assert_eq!(
            Action::try_from(msg),
            Ok(Action::Mine {
                target: Target::At(Position::new(3, 4)),
                tool: Some("stone_pickaxe".into()),
            })
        );
    }

    #[test]
    fn test_room_lifecycle_is_not_an_action() {
        let msg = ClientMessage::CreateRoom {
            room_id: RoomId::from("r"),
        };
        assert_eq!(Action::try_from(msg.clone()), Err(msg));
        assert_eq!(
            Action::try_from(ClientMessage::LeaveRoom),
            Err(ClientMessage::LeaveRoom)
        );
    }
}
