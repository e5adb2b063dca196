use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use castellum_game::models::troops::TroopCounts;
use castellum_types::{battle::AttackType, common::ResourceAmounts};

/// Credits production up to `tick_at` and completes due constructions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameTickTask {
    pub tick_at: DateTime<Utc>,
}

impl GameTickTask {
    pub const TASK_TYPE: &'static str = "GameTick";
}

/// Delivers units trained by `tick_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingQueueTask {
    pub tick_at: DateTime<Utc>,
}

impl TrainingQueueTask {
    pub const TASK_TYPE: &'static str = "ProcessTrainingQueue";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackTask {
    pub attacker_village_id: u32,
    pub attacker_player_id: Uuid,
    pub target_village_id: u32,
    pub troops: TroopCounts,
    pub attack_type: AttackType,
    /// When the army reaches the target. Retries run later, the battle does not.
    pub arrives_at: DateTime<Utc>,
}

impl AttackTask {
    pub const TASK_TYPE: &'static str = "Attack";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmyReturnTask {
    pub troops: TroopCounts,
    pub loot: ResourceAmounts,
    pub destination_village_id: u32,
    pub from_village_id: u32,
}

impl ArmyReturnTask {
    pub const TASK_TYPE: &'static str = "ArmyReturn";
}
