use uuid::Uuid;

use castellum_game::{
    battle::BattleReport,
    models::{player::PlayerStats, village::Village},
};

use crate::cqrs::Query;

pub struct GetVillage {
    pub village_id: u32,
}

impl Query for GetVillage {
    type Output = Village;
}

/// Aggregated statistics of a player across their villages.
pub struct GetPlayerStats {
    pub player_id: Uuid,
}

impl Query for GetPlayerStats {
    type Output = PlayerStats;
}

/// Latest battle reports of a village, as attacker or defender.
pub struct GetBattleReports {
    pub village_id: u32,
    pub limit: usize,
}

impl Query for GetBattleReports {
    type Output = Vec<BattleReport>;
}
