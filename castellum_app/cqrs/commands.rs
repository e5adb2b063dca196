use uuid::Uuid;

use castellum_game::models::troops::TroopCounts;
use castellum_types::{army::UnitKind, battle::AttackType, common::ResourceType};

use crate::cqrs::Command;

/// Queues `quantity` units in the village barracks.
#[derive(Debug, Clone)]
pub struct TrainUnits {
    pub player_id: Uuid,
    pub village_id: u32,
    pub unit: UnitKind,
    pub quantity: u32,
}

impl Command for TrainUnits {
    fn locked_villages(&self) -> Vec<u32> {
        vec![self.village_id]
    }
}

#[derive(Debug, Clone)]
pub struct UpgradeResourceField {
    pub player_id: Uuid,
    pub village_id: u32,
    pub resource: ResourceType,
}

impl Command for UpgradeResourceField {
    fn locked_villages(&self) -> Vec<u32> {
        vec![self.village_id]
    }
}

#[derive(Debug, Clone)]
pub struct AttackVillage {
    pub player_id: Uuid,
    pub village_id: u32,
    pub target_village_id: u32,
    pub troops: TroopCounts,
    pub attack_type: AttackType,
}

impl Command for AttackVillage {
    fn locked_villages(&self) -> Vec<u32> {
        vec![self.village_id]
    }
}
