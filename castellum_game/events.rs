use serde::{Deserialize, Serialize};
use uuid::Uuid;

use castellum_types::{army::UnitKind, common::ResourceType};

use crate::battle::BattleResult;

/// Notifications produced by ticks and battles, for the real-time layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum GameEvent {
    ResourceUpdated {
        village_id: u32,
        resource: ResourceType,
        amount: u32,
        is_full: bool,
    },
    BuildingCompleted {
        village_id: u32,
        resource: ResourceType,
        level: u8,
    },
    TroopsTrained {
        village_id: u32,
        unit: UnitKind,
        quantity: u32,
    },
    BattleReportReceived {
        village_id: u32,
        player_id: Uuid,
        report_id: Uuid,
        report: Box<BattleResult>,
    },
}

impl GameEvent {
    pub fn name(&self) -> &'static str {
        match self {
            GameEvent::ResourceUpdated { .. } => "resourceUpdated",
            GameEvent::BuildingCompleted { .. } => "buildingCompleted",
            GameEvent::TroopsTrained { .. } => "troopsTrained",
            GameEvent::BattleReportReceived { .. } => "battleReportReceived",
        }
    }

    pub fn village_id(&self) -> u32 {
        match self {
            GameEvent::ResourceUpdated { village_id, .. }
            | GameEvent::BuildingCompleted { village_id, .. }
            | GameEvent::TroopsTrained { village_id, .. }
            | GameEvent::BattleReportReceived { village_id, .. } => *village_id,
        }
    }
}
