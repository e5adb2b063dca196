use chrono::{DateTime, Utc};
use rand::Rng;
use uuid::Uuid;

use castellum_types::{army::UnitKind, common::ResourceAmounts, map::Coordinates};

use crate::models::{player::Player, troops::TroopCounts, village::Village};

#[derive(Default, Clone)]
pub struct PlayerFactoryOptions<'a> {
    pub id: Option<Uuid>,
    pub username: Option<&'a str>,
    pub last_seen_at: Option<DateTime<Utc>>,
}

#[derive(Default, Clone)]
pub struct VillageFactoryOptions {
    pub id: Option<u32>,
    pub name: Option<String>,
    pub player: Option<Player>,
    pub position: Option<Coordinates>,
    pub amounts: Option<ResourceAmounts>,
    pub production: Option<ResourceAmounts>,
    pub capacity: Option<ResourceAmounts>,
    pub troops: Option<TroopCounts>,
    pub population: Option<u32>,
    pub server_speed: Option<u8>,
    pub last_tick_at: Option<DateTime<Utc>>,
}

pub fn player_factory(options: PlayerFactoryOptions) -> Player {
    let default_username: String = format!("player_{}", rand::thread_rng().r#gen::<u32>());
    let now = Utc::now();

    Player {
        id: options.id.unwrap_or_else(Uuid::new_v4),
        username: options.username.map_or(default_username, |s| s.to_string()),
        attack_points: 0,
        defense_points: 0,
        last_seen_at: options.last_seen_at.unwrap_or(now),
        created_at: now,
    }
}

pub fn village_factory(options: VillageFactoryOptions) -> Village {
    let mut rng = rand::thread_rng();
    let player = options
        .player
        .unwrap_or_else(|| player_factory(Default::default()));
    let position = options
        .position
        .unwrap_or_else(|| Coordinates::new(rng.gen_range(-100..=100), rng.gen_range(-100..=100)));

    let mut village = Village::new(
        options.id.unwrap_or_else(|| rng.gen_range(1..1_000_000)),
        player.id,
        options.name.unwrap_or("Factory Village".to_string()),
        position,
        options.server_speed.unwrap_or(1),
        options.last_tick_at.unwrap_or_else(Utc::now),
    );

    if let Some(amounts) = options.amounts {
        village.resources = village.resources.with_amounts(amounts);
    }
    if let Some(production) = options.production {
        village.resources = village.resources.with_production(production);
    }
    if let Some(capacity) = options.capacity {
        village.resources = village.resources.with_capacity(capacity);
    }
    if let Some(troops) = options.troops {
        village.troops = troops;
    }
    if let Some(population) = options.population {
        village.population = population;
    }

    village
}

/// Builds troop counts from `(kind, count)` pairs.
pub fn troops_factory(units: &[(UnitKind, u32)]) -> TroopCounts {
    units
        .iter()
        .fold(TroopCounts::new(), |troops, (kind, count)| troops.with(*kind, *count))
}
