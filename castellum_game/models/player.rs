use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::village::Village;

pub const ACTIVE_WINDOW_DAYS: i64 = 7;
pub const ONLINE_WINDOW_MINUTES: i64 = 15;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: Uuid,
    pub username: String,
    /// Battle points earned attacking.
    pub attack_points: u64,
    /// Battle points earned defending.
    pub defense_points: u64,
    pub last_seen_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Player {
    pub fn new(username: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            attack_points: 0,
            defense_points: 0,
            last_seen_at: now,
            created_at: now,
        }
    }

    pub fn add_attack_points(&mut self, points: u64) {
        self.attack_points = self.attack_points.saturating_add(points);
    }

    pub fn add_defense_points(&mut self, points: u64) {
        self.defense_points = self.defense_points.saturating_add(points);
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_seen_at = self.last_seen_at.max(now);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingCategory {
    Novice,
    Established,
    Veteran,
    Elite,
    Legend,
}

impl RankingCategory {
    // inclusive lower bounds, highest first
    const THRESHOLDS: [(u64, RankingCategory); 4] = [
        (100_000, RankingCategory::Legend),
        (50_000, RankingCategory::Elite),
        (10_000, RankingCategory::Veteran),
        (1_000, RankingCategory::Established),
    ];

    pub fn from_points(points: u64) -> Self {
        Self::THRESHOLDS
            .iter()
            .find(|(bound, _)| points >= *bound)
            .map(|(_, category)| *category)
            .unwrap_or(RankingCategory::Novice)
    }
}

impl fmt::Display for RankingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RankingCategory::Novice => "novice",
            RankingCategory::Established => "established",
            RankingCategory::Veteran => "veteran",
            RankingCategory::Elite => "elite",
            RankingCategory::Legend => "legend",
        };
        f.write_str(name)
    }
}

/// Read-only statistics of a player. Ranking and ratios are derived on read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub points: u64,
    pub population: u64,
    pub villages_count: u32,
    pub attack_points: u64,
    pub defense_points: u64,
    pub is_active: bool,
    pub is_online: bool,
}

impl PlayerStats {
    pub fn with_stats(
        points: u64,
        population: u64,
        villages_count: u32,
        attack_points: u64,
        defense_points: u64,
        is_active: bool,
        is_online: bool,
    ) -> Self {
        Self {
            points,
            population,
            villages_count,
            attack_points,
            defense_points,
            is_active,
            is_online,
        }
    }

    /// Aggregates a player's villages. Points are the total population plus
    /// the battle points earned attacking and defending.
    pub fn from_player(player: &Player, villages: &[Village], now: DateTime<Utc>) -> Self {
        let population: u64 = villages
            .iter()
            .filter(|v| v.player_id == player.id)
            .map(|v| v.population as u64)
            .sum();
        let villages_count = villages.iter().filter(|v| v.player_id == player.id).count() as u32;
        let since_seen = now - player.last_seen_at;

        Self {
            points: population + player.attack_points + player.defense_points,
            population,
            villages_count,
            attack_points: player.attack_points,
            defense_points: player.defense_points,
            is_active: since_seen <= Duration::days(ACTIVE_WINDOW_DAYS),
            is_online: since_seen <= Duration::minutes(ONLINE_WINDOW_MINUTES),
        }
    }

    pub fn ranking_category(&self) -> RankingCategory {
        RankingCategory::from_points(self.points)
    }

    pub fn military_ratio(&self) -> f64 {
        if self.points == 0 {
            return 0.0;
        }
        (self.attack_points + self.defense_points) as f64 / self.points as f64
    }

    /// Points per village, rounded to two decimals.
    pub fn efficiency_score(&self) -> f64 {
        if self.villages_count == 0 {
            return 0.0;
        }
        let score = self.points as f64 / self.villages_count as f64;
        (score * 100.0).round() / 100.0
    }

    pub fn average_village_population(&self) -> f64 {
        if self.villages_count == 0 {
            return 0.0;
        }
        self.population as f64 / self.villages_count as f64
    }
}
