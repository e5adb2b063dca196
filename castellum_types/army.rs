use std::fmt;

use serde::{Deserialize, Serialize};

use crate::common::ResourceAmounts;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Spearmen,
    Swordsmen,
    Archers,
    Cavalry,
    MountedArchers,
    Catapults,
    Rams,
    Spies,
    Settlers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitCategory {
    Infantry,
    Cavalry,
    Siege,
    Support,
}

impl UnitCategory {
    pub const ALL: [UnitCategory; 4] = [
        UnitCategory::Infantry,
        UnitCategory::Cavalry,
        UnitCategory::Siege,
        UnitCategory::Support,
    ];
}

/// Coarse classification of an army by its composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArmyType {
    InfantryHeavy,
    CavalryHeavy,
    SiegeFocused,
    SupportHeavy,
    Balanced,
}

impl ArmyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArmyType::InfantryHeavy => "infantry-heavy",
            ArmyType::CavalryHeavy => "cavalry-heavy",
            ArmyType::SiegeFocused => "siege-focused",
            ArmyType::SupportHeavy => "support-heavy",
            ArmyType::Balanced => "balanced",
        }
    }
}

impl fmt::Display for ArmyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static combat and economy data of a unit kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitStats {
    pub attack: u32,
    pub defense_infantry: u32,
    pub defense_cavalry: u32,
    /// Fields per hour.
    pub speed: u8,
    /// Resources a single unit can carry home.
    pub capacity: u32,
    pub upkeep: u32,
    pub cost: ResourceAmounts,
    /// Training time in seconds, at server speed 1.
    pub training_time: u32,
    /// Weight used when turning casualties into battle points.
    pub battle_points: u32,
}

// attack, def. infantry, def. cavalry, speed, capacity, upkeep, cost, time, points
static UNIT_STATS: [UnitStats; 9] = [
    unit(10, 35, 60, 7, 40, 1, ResourceAmounts::new(95, 75, 40, 40), 1040, 1),
    unit(65, 35, 20, 6, 45, 1, ResourceAmounts::new(140, 150, 185, 60), 1440, 1),
    unit(35, 25, 30, 6, 30, 1, ResourceAmounts::new(110, 90, 80, 40), 1200, 2),
    unit(120, 65, 50, 14, 100, 3, ResourceAmounts::new(550, 440, 320, 100), 2200, 3),
    unit(90, 40, 60, 15, 80, 3, ResourceAmounts::new(420, 380, 300, 120), 2100, 2),
    unit(75, 10, 0, 3, 0, 6, ResourceAmounts::new(950, 1350, 600, 90), 9000, 5),
    unit(60, 30, 75, 4, 0, 3, ResourceAmounts::new(900, 360, 500, 70), 4600, 5),
    unit(0, 20, 10, 16, 0, 2, ResourceAmounts::new(170, 150, 20, 40), 1120, 1),
    unit(0, 0, 0, 5, 0, 1, ResourceAmounts::new(5800, 5300, 7200, 5500), 26900, 1),
];

#[allow(clippy::too_many_arguments)]
const fn unit(
    attack: u32,
    defense_infantry: u32,
    defense_cavalry: u32,
    speed: u8,
    capacity: u32,
    upkeep: u32,
    cost: ResourceAmounts,
    training_time: u32,
    battle_points: u32,
) -> UnitStats {
    UnitStats {
        attack,
        defense_infantry,
        defense_cavalry,
        speed,
        capacity,
        upkeep,
        cost,
        training_time,
        battle_points,
    }
}

impl UnitKind {
    pub const ALL: [UnitKind; 9] = [
        UnitKind::Spearmen,
        UnitKind::Swordsmen,
        UnitKind::Archers,
        UnitKind::Cavalry,
        UnitKind::MountedArchers,
        UnitKind::Catapults,
        UnitKind::Rams,
        UnitKind::Spies,
        UnitKind::Settlers,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn key(&self) -> &'static str {
        match self {
            UnitKind::Spearmen => "spearmen",
            UnitKind::Swordsmen => "swordsmen",
            UnitKind::Archers => "archers",
            UnitKind::Cavalry => "cavalry",
            UnitKind::MountedArchers => "mounted_archers",
            UnitKind::Catapults => "catapults",
            UnitKind::Rams => "rams",
            UnitKind::Spies => "spies",
            UnitKind::Settlers => "settlers",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        UnitKind::ALL.into_iter().find(|k| k.key() == key)
    }

    pub fn category(&self) -> UnitCategory {
        match self {
            UnitKind::Spearmen | UnitKind::Swordsmen | UnitKind::Archers => UnitCategory::Infantry,
            UnitKind::Cavalry | UnitKind::MountedArchers => UnitCategory::Cavalry,
            UnitKind::Catapults | UnitKind::Rams => UnitCategory::Siege,
            UnitKind::Spies | UnitKind::Settlers => UnitCategory::Support,
        }
    }

    /// Whether the unit attacks with cavalry points rather than infantry points.
    pub fn is_mounted(&self) -> bool {
        self.category() == UnitCategory::Cavalry
    }

    /// Settlers travel with armies but never fight.
    pub fn is_combatant(&self) -> bool {
        !matches!(self, UnitKind::Settlers)
    }

    pub fn stats(&self) -> &'static UnitStats {
        &UNIT_STATS[self.index()]
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
