use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttackType {
    Raid,   // Raid
    Normal, // Attack / Siege / Conquer
}

/// Outcome of a battle, seen from the attacker.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BattleStatus {
    Victory,
    Defeat,
    Draw,
}

/// Buckets of total battle losses.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BattleSeverity {
    Minimal,
    Minor,
    Moderate,
    Significant,
    Major,
    Devastating,
}

impl BattleSeverity {
    // inclusive lower bounds, highest first
    const THRESHOLDS: [(u64, BattleSeverity); 5] = [
        (10_000, BattleSeverity::Devastating),
        (5_000, BattleSeverity::Major),
        (1_000, BattleSeverity::Significant),
        (100, BattleSeverity::Moderate),
        (10, BattleSeverity::Minor),
    ];

    pub fn from_losses(total_losses: u64) -> Self {
        Self::THRESHOLDS
            .iter()
            .find(|(bound, _)| total_losses >= *bound)
            .map(|(_, severity)| *severity)
            .unwrap_or(BattleSeverity::Minimal)
    }
}

impl fmt::Display for BattleSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BattleSeverity::Minimal => "minimal",
            BattleSeverity::Minor => "minor",
            BattleSeverity::Moderate => "moderate",
            BattleSeverity::Significant => "significant",
            BattleSeverity::Major => "major",
            BattleSeverity::Devastating => "devastating",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_bounds_are_inclusive() {
        assert_eq!(BattleSeverity::from_losses(0), BattleSeverity::Minimal);
        assert_eq!(BattleSeverity::from_losses(9), BattleSeverity::Minimal);
        assert_eq!(BattleSeverity::from_losses(10), BattleSeverity::Minor);
        assert_eq!(BattleSeverity::from_losses(99), BattleSeverity::Minor);
        assert_eq!(BattleSeverity::from_losses(100), BattleSeverity::Moderate);
        assert_eq!(BattleSeverity::from_losses(1_000), BattleSeverity::Significant);
        assert_eq!(BattleSeverity::from_losses(4_999), BattleSeverity::Significant);
        assert_eq!(BattleSeverity::from_losses(5_000), BattleSeverity::Major);
        assert_eq!(BattleSeverity::from_losses(10_000), BattleSeverity::Devastating);
        assert_eq!(BattleSeverity::from_losses(u64::MAX), BattleSeverity::Devastating);
    }
}
