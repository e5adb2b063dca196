use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use castellum_types::{
    army::{ArmyType, UnitCategory, UnitKind},
    common::Clamped,
    errors::GameError,
};

/// Immutable counts of the nine unit kinds of a village or an army on the move.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct TroopCounts {
    spearmen: u32,
    swordsmen: u32,
    archers: u32,
    cavalry: u32,
    mounted_archers: u32,
    catapults: u32,
    rams: u32,
    spies: u32,
    settlers: u32,
}

/// Share of each unit category in an army, in percent with two decimals.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    pub infantry: f64,
    pub cavalry: f64,
    pub siege: f64,
    pub support: f64,
}

impl Composition {
    pub fn get(&self, category: UnitCategory) -> f64 {
        match category {
            UnitCategory::Infantry => self.infantry,
            UnitCategory::Cavalry => self.cavalry,
            UnitCategory::Siege => self.siege,
            UnitCategory::Support => self.support,
        }
    }

    pub fn total(&self) -> f64 {
        self.infantry + self.cavalry + self.siege + self.support
    }
}

impl TroopCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds counts from an array in [`UnitKind::ALL`] order.
    pub fn from_array(counts: [u32; 9]) -> Self {
        let [
            spearmen,
            swordsmen,
            archers,
            cavalry,
            mounted_archers,
            catapults,
            rams,
            spies,
            settlers,
        ] = counts;
        Self {
            spearmen,
            swordsmen,
            archers,
            cavalry,
            mounted_archers,
            catapults,
            rams,
            spies,
            settlers,
        }
    }

    pub fn to_array(&self) -> [u32; 9] {
        [
            self.spearmen,
            self.swordsmen,
            self.archers,
            self.cavalry,
            self.mounted_archers,
            self.catapults,
            self.rams,
            self.spies,
            self.settlers,
        ]
    }

    /// Parses a loosely typed unit map, as received from storage or user input.
    /// Missing kinds count as zero; unknown kinds and negative counts are rejected.
    pub fn from_map(map: &BTreeMap<String, i64>) -> Result<Self, GameError> {
        let mut counts = [0u32; 9];
        for (key, &value) in map {
            let kind = UnitKind::from_key(key)
                .ok_or_else(|| GameError::InvalidInput(format!("unknown unit kind '{key}'")))?;
            counts[kind.index()] = u32::try_from(value).map_err(|_| {
                GameError::InvalidInput(format!("invalid count {value} for '{key}'"))
            })?;
        }
        Ok(Self::from_array(counts))
    }

    pub fn to_map(&self) -> BTreeMap<String, i64> {
        UnitKind::ALL
            .iter()
            .map(|kind| (kind.key().to_string(), self.get(*kind) as i64))
            .collect()
    }

    pub fn get(&self, kind: UnitKind) -> u32 {
        self.to_array()[kind.index()]
    }

    /// Returns a copy with one unit kind replaced.
    pub fn with(&self, kind: UnitKind, count: u32) -> Self {
        let mut counts = self.to_array();
        counts[kind.index()] = count;
        Self::from_array(counts)
    }

    pub fn add(&self, other: &TroopCounts) -> Self {
        self.zip_with(other, u32::saturating_add)
    }

    /// Componentwise subtraction, floored at zero.
    pub fn subtract(&self, other: &TroopCounts) -> Self {
        self.zip_with(other, u32::saturating_sub)
    }

    pub fn subtract_checked(&self, other: &TroopCounts) -> Clamped<Self> {
        Clamped {
            value: self.subtract(other),
            was_clamped: !self.contains(other),
        }
    }

    /// True when every unit kind of `other` is available here.
    pub fn contains(&self, other: &TroopCounts) -> bool {
        self.to_array()
            .iter()
            .zip(other.to_array())
            .all(|(have, need)| *have >= need)
    }

    pub fn total(&self) -> u64 {
        self.to_array().iter().map(|c| *c as u64).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn count_by_category(&self, category: UnitCategory) -> u64 {
        self.iter()
            .filter(|(kind, _)| kind.category() == category)
            .map(|(_, count)| count as u64)
            .sum()
    }

    pub fn infantry(&self) -> u64 {
        self.count_by_category(UnitCategory::Infantry)
    }

    pub fn cavalry(&self) -> u64 {
        self.count_by_category(UnitCategory::Cavalry)
    }

    pub fn siege(&self) -> u64 {
        self.count_by_category(UnitCategory::Siege)
    }

    pub fn support(&self) -> u64 {
        self.count_by_category(UnitCategory::Support)
    }

    pub fn composition(&self) -> Composition {
        let total = self.total();
        if total == 0 {
            return Composition::default();
        }

        let percent = |count: u64| ((count as f64 * 100.0 / total as f64) * 100.0).round() / 100.0;
        Composition {
            infantry: percent(self.infantry()),
            cavalry: percent(self.cavalry()),
            siege: percent(self.siege()),
            support: percent(self.support()),
        }
    }

    /// Classifies the army. The first matching threshold wins, in this order:
    /// infantry >= 60%, cavalry >= 60%, siege >= 30%, support >= 20%.
    pub fn army_type(&self) -> ArmyType {
        let total = self.total();
        if total == 0 {
            return ArmyType::Balanced;
        }

        let at_least = |count: u64, percent: u64| count * 100 >= percent * total;

        if at_least(self.infantry(), 60) {
            ArmyType::InfantryHeavy
        } else if at_least(self.cavalry(), 60) {
            ArmyType::CavalryHeavy
        } else if at_least(self.siege(), 30) {
            ArmyType::SiegeFocused
        } else if at_least(self.support(), 20) {
            ArmyType::SupportHeavy
        } else {
            ArmyType::Balanced
        }
    }

    /// Speed of the slowest unit present, 0 for an empty army.
    pub fn speed(&self) -> u8 {
        self.iter()
            .filter(|(_, count)| *count > 0)
            .map(|(kind, _)| kind.stats().speed)
            .min()
            .unwrap_or(0)
    }

    pub fn carry_capacity(&self) -> u64 {
        self.weighted_sum(|kind| kind.stats().capacity)
    }

    pub fn upkeep(&self) -> u64 {
        self.weighted_sum(|kind| kind.stats().upkeep)
    }

    /// Points awarded to whoever kills these units.
    pub fn battle_points(&self) -> u64 {
        self.weighted_sum(|kind| kind.stats().battle_points)
    }

    /// Attack points split between infantry and cavalry.
    pub fn attack_points(&self) -> (u64, u64) {
        let mut infantry_points: u64 = 0;
        let mut cavalry_points: u64 = 0;

        for (kind, count) in self.iter() {
            if !kind.is_combatant() {
                continue;
            }

            let points = kind.stats().attack as u64 * count as u64;
            if kind.is_mounted() {
                cavalry_points += points;
            } else {
                infantry_points += points;
            }
        }
        (infantry_points, cavalry_points)
    }

    /// Defense points against infantry and against cavalry.
    pub fn defense_points(&self) -> (u64, u64) {
        let infantry_points = self.weighted_sum(|kind| kind.stats().defense_infantry);
        let cavalry_points = self.weighted_sum(|kind| kind.stats().defense_cavalry);
        (infantry_points, cavalry_points)
    }

    /// Splits the army by a loss fraction in `[0, 1]`, returning `(survivors, casualties)`.
    pub fn apply_losses(&self, fraction: f64) -> (TroopCounts, TroopCounts) {
        let fraction = fraction.clamp(0.0, 1.0);
        let mut casualties = [0u32; 9];

        for (kind, count) in self.iter() {
            casualties[kind.index()] = ((count as f64 * fraction).round() as u32).min(count);
        }

        let casualties = TroopCounts::from_array(casualties);
        (self.subtract(&casualties), casualties)
    }

    pub fn iter(&self) -> impl Iterator<Item = (UnitKind, u32)> {
        UnitKind::ALL.into_iter().zip(self.to_array())
    }

    fn weighted_sum(&self, weight: impl Fn(UnitKind) -> u32) -> u64 {
        self.iter()
            .map(|(kind, count)| weight(kind) as u64 * count as u64)
            .sum()
    }

    fn zip_with(&self, other: &TroopCounts, f: impl Fn(u32, u32) -> u32) -> Self {
        let mut counts = self.to_array();
        for (count, theirs) in counts.iter_mut().zip(other.to_array()) {
            *count = f(*count, theirs);
        }
        Self::from_array(counts)
    }
}
