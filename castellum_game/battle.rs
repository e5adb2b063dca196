use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use castellum_types::{
    battle::{AttackType, BattleSeverity, BattleStatus},
    common::{ResourceAmounts, ResourceType},
    errors::GameError,
};

use crate::models::{troops::TroopCounts, village::VillageResources};

/// Defense every village has, even without a garrison.
pub const BASE_VILLAGE_DEFENSE: f64 = 10.0;

/// Outcome of a battle, as stored in reports and sent to both players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleResult {
    pub status: BattleStatus,
    pub attacker_losses: u32,
    pub defender_losses: u32,
    pub loot: ResourceAmounts,
    pub attacker_points: u32,
    pub defender_points: u32,
    #[serde(default)]
    pub battle_type: Option<AttackType>,
    /// Seconds.
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub attacker_troops: Option<TroopCounts>,
    #[serde(default)]
    pub defender_troops: Option<TroopCounts>,
}

impl BattleResult {
    pub fn is_victory(&self) -> bool {
        self.status == BattleStatus::Victory
    }

    pub fn is_defeat(&self) -> bool {
        self.status == BattleStatus::Defeat
    }

    pub fn is_draw(&self) -> bool {
        self.status == BattleStatus::Draw
    }

    pub fn total_losses(&self) -> u64 {
        self.attacker_losses as u64 + self.defender_losses as u64
    }

    /// Loot per unit lost. Without losses: 1.0 with loot, 0.0 without.
    pub fn efficiency(&self) -> f64 {
        let losses = self.total_losses();
        if losses == 0 {
            return if self.loot.is_empty() { 0.0 } else { 1.0 };
        }
        self.loot.total() as f64 / losses as f64
    }

    pub fn severity(&self) -> BattleSeverity {
        BattleSeverity::from_losses(self.total_losses())
    }

    pub fn duration_in_minutes(&self) -> Option<f64> {
        self.duration
            .filter(|secs| *secs > 0)
            .map(|secs| secs as f64 / 60.0)
    }

    /// Losses per minute of fighting.
    pub fn intensity(&self) -> Option<f64> {
        self.duration_in_minutes()
            .map(|minutes| self.total_losses() as f64 / minutes)
    }

    /// Share of the attacking army lost, in `[0, 1]`.
    pub fn attacker_loss_rate(&self) -> f64 {
        loss_rate(self.attacker_losses, self.attacker_troops.as_ref())
    }

    /// Share of the defending army lost, in `[0, 1]`.
    pub fn defender_loss_rate(&self) -> f64 {
        loss_rate(self.defender_losses, self.defender_troops.as_ref())
    }
}

fn loss_rate(losses: u32, troops: Option<&TroopCounts>) -> f64 {
    match troops.map(TroopCounts::total) {
        Some(total) if total > 0 => (losses as f64 / total as f64).min(1.0),
        _ => 0.0,
    }
}

#[derive(Debug, Clone)]
pub struct BattleInput {
    pub attacker: TroopCounts,
    pub defender: TroopCounts,
    /// Storage of the defending village, bounding the loot.
    pub village: VillageResources,
    pub attack_type: AttackType,
    pub duration: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BattleOutcome {
    pub result: BattleResult,
    pub attacker_survivors: TroopCounts,
    pub defender_survivors: TroopCounts,
}

/// A resolved battle, kept for both sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleReport {
    pub id: Uuid,
    pub attacker_village_id: u32,
    pub defender_village_id: u32,
    pub attacker_player_id: Uuid,
    pub defender_player_id: Uuid,
    pub result: BattleResult,
    pub created_at: DateTime<Utc>,
}

impl BattleReport {
    pub fn new(
        attacker_village_id: u32,
        defender_village_id: u32,
        attacker_player_id: Uuid,
        defender_player_id: Uuid,
        result: BattleResult,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            attacker_village_id,
            defender_village_id,
            attacker_player_id,
            defender_player_id,
            result,
            created_at: Utc::now(),
        }
    }

    pub fn involves_village(&self, village_id: u32) -> bool {
        self.attacker_village_id == village_id || self.defender_village_id == village_id
    }
}

/// Deterministic single-shot battle resolution.
pub struct CombatResolver;

impl CombatResolver {
    pub fn resolve(input: &BattleInput) -> Result<BattleOutcome, GameError> {
        if input.attacker.is_empty() {
            return Err(GameError::NoUnitsSelected);
        }

        // ====================================================================
        // STEP 1: attack and defense points
        // ====================================================================
        let (attacker_infantry_points, attacker_cavalry_points) = input.attacker.attack_points();
        let total_attack_power = (attacker_infantry_points + attacker_cavalry_points) as f64;

        let (defender_infantry_points, defender_cavalry_points) = input.defender.defense_points();
        let weighted_defense = if total_attack_power > 0.0 {
            let infantry_ratio = attacker_infantry_points as f64 / total_attack_power;
            let cavalry_ratio = attacker_cavalry_points as f64 / total_attack_power;
            defender_infantry_points as f64 * infantry_ratio
                + defender_cavalry_points as f64 * cavalry_ratio
        } else {
            defender_infantry_points as f64
        };
        let total_defense_power = weighted_defense + BASE_VILLAGE_DEFENSE;

        // ====================================================================
        // STEP 2: winner and casualties
        // ====================================================================
        let units_involved = input.attacker.total() + input.defender.total();
        let m_factor = calculate_m_factor(units_involved);

        let (status, attacker_loss_fraction, defender_loss_fraction) =
            if total_attack_power >= total_defense_power {
                let (winner, loser) = calculate_loss_fractions(
                    input.attack_type,
                    total_attack_power,
                    total_defense_power,
                    m_factor,
                );
                let status = if total_attack_power > total_defense_power {
                    BattleStatus::Victory
                } else {
                    BattleStatus::Draw
                };
                (status, winner, loser)
            } else {
                let (winner, loser) = calculate_loss_fractions(
                    input.attack_type,
                    total_defense_power,
                    total_attack_power,
                    m_factor,
                );
                (BattleStatus::Defeat, loser, winner)
            };

        let (attacker_survivors, attacker_casualties) =
            input.attacker.apply_losses(attacker_loss_fraction);
        let (defender_survivors, defender_casualties) =
            input.defender.apply_losses(defender_loss_fraction);

        // ====================================================================
        // STEP 3: loot and points
        // ====================================================================
        let loot = calculate_loot(
            &input.village.amounts(),
            attacker_survivors.carry_capacity(),
        );

        let result = BattleResult {
            status,
            attacker_losses: saturate(attacker_casualties.total()),
            defender_losses: saturate(defender_casualties.total()),
            loot,
            attacker_points: saturate(defender_casualties.battle_points()),
            defender_points: saturate(attacker_casualties.battle_points()),
            battle_type: Some(input.attack_type),
            duration: input.duration,
            attacker_troops: Some(input.attacker),
            defender_troops: Some(input.defender),
        };

        Ok(BattleOutcome {
            result,
            attacker_survivors,
            defender_survivors,
        })
    }
}

fn saturate(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

// Massive battles factor (Mfactor)
fn calculate_m_factor(units_involved: u64) -> f64 {
    if units_involved >= 1000 {
        (2.0 * (1.8592 - (units_involved as f64).powf(0.015))).clamp(1.2578, 1.5)
    } else {
        1.5
    }
}

// Returns (winner losses, loser losses) as fractions of each army.
fn calculate_loss_fractions(
    attack_type: AttackType,
    winner: f64,
    loser: f64,
    m_factor: f64,
) -> (f64, f64) {
    let loss_factor = (loser / winner).powf(m_factor);

    match attack_type {
        AttackType::Raid => (
            loss_factor / (1.0 + loss_factor),
            1.0 / (1.0 + loss_factor),
        ),
        AttackType::Normal => (loss_factor, 1.0),
    }
}

// Spreads carry capacity over the stock proportionally, never more than available.
fn calculate_loot(available: &ResourceAmounts, carry_capacity: u64) -> ResourceAmounts {
    let total = available.total();
    if total == 0 || carry_capacity == 0 {
        return ResourceAmounts::zero();
    }
    if carry_capacity >= total {
        return *available;
    }

    ResourceType::ALL
        .into_iter()
        .fold(ResourceAmounts::zero(), |loot, resource| {
            let share = available.get(resource) as u64 * carry_capacity / total;
            loot.with(resource, share as u32)
        })
}
