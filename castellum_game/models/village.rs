use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use castellum_types::{
    army::UnitKind,
    common::{ResourceAmounts, ResourceType},
    errors::GameError,
    map::Coordinates,
};

use crate::production::{ProductionEngine, ProductionOutcome};

use super::troops::TroopCounts;

pub const MAX_FIELD_LEVEL: u8 = 20;
pub const DEFAULT_FIELD_LEVEL: u8 = 1;
pub const BASE_POPULATION: u32 = 2;
pub const STARTING_CAPACITY: u32 = 800;
pub const STARTING_STOCK: u32 = 750;

/// Data of a resource field at a given level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldLevelData {
    /// Cost to upgrade *to* this level.
    pub cost: ResourceAmounts,
    /// Population added when this level completes.
    pub population: u32,
    /// Hourly production at server speed 1.
    pub production: u32,
    /// Construction time in seconds at server speed 1.
    pub time: u32,
}

const fn level(
    wood: u32,
    clay: u32,
    iron: u32,
    crop: u32,
    population: u32,
    production: u32,
    time: u32,
) -> FieldLevelData {
    FieldLevelData {
        cost: ResourceAmounts::new(wood, clay, iron, crop),
        population,
        production,
        time,
    }
}

// ==================== RESOURCE FIELDS STATIC DATA ====================

static FIELD_LEVELS: [FieldLevelData; 21] = [
    level(0, 0, 0, 0, 0, 2, 0),
    level(40, 100, 50, 60, 2, 5, 260),
    level(65, 165, 85, 100, 1, 9, 620),
    level(110, 280, 140, 165, 1, 15, 1190),
    level(185, 465, 235, 280, 1, 22, 2100),
    level(310, 780, 390, 465, 1, 33, 3560),
    level(520, 1300, 650, 780, 2, 50, 5890),
    level(870, 2170, 1085, 1300, 2, 70, 9620),
    level(1450, 3625, 1810, 2175, 2, 100, 15590),
    level(2420, 6050, 3025, 3630, 2, 145, 25150),
    level(4040, 10105, 5050, 6060, 2, 200, 40440),
    level(6750, 16870, 8435, 10125, 2, 280, 64900),
    level(11270, 28175, 14090, 16905, 2, 375, 104050),
    level(18820, 47055, 23525, 28230, 2, 495, 166680),
    level(31430, 78580, 39290, 47150, 2, 635, 266880),
    level(52490, 131230, 65615, 78740, 2, 800, 427210),
    level(87660, 219155, 109575, 131490, 3, 1000, 683730),
    level(146395, 365985, 182995, 219590, 3, 1300, 1094170),
    level(244480, 611195, 305600, 366715, 3, 1600, 1750880),
    level(408280, 1020695, 510350, 612420, 3, 2000, 2801600),
    level(681825, 1704565, 852280, 1022740, 3, 2450, 4482770),
];

/// Static data of a resource field level, `None` above [`MAX_FIELD_LEVEL`].
pub fn field_level_data(level: u8) -> Option<&'static FieldLevelData> {
    FIELD_LEVELS.get(level as usize)
}

/// Hourly production of a single field at `level`, scaled by server speed.
pub fn field_production(level: u8, server_speed: u8) -> u32 {
    let level = level.min(MAX_FIELD_LEVEL);
    FIELD_LEVELS[level as usize].production * server_speed.max(1) as u32
}

/// Storage state of a village: current amounts, hourly production, capacity and field levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VillageResources {
    amounts: ResourceAmounts,
    production: ResourceAmounts,
    capacity: ResourceAmounts,
    #[serde(default = "default_levels", deserialize_with = "deserialize_levels")]
    levels: BTreeMap<ResourceType, u8>,
}

fn default_levels() -> BTreeMap<ResourceType, u8> {
    fill_levels(BTreeMap::new())
}

fn fill_levels(mut levels: BTreeMap<ResourceType, u8>) -> BTreeMap<ResourceType, u8> {
    for resource in ResourceType::ALL {
        levels.entry(resource).or_insert(DEFAULT_FIELD_LEVEL);
    }
    levels
}

fn deserialize_levels<'de, D>(deserializer: D) -> Result<BTreeMap<ResourceType, u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let stored = BTreeMap::<ResourceType, u8>::deserialize(deserializer)?;
    Ok(fill_levels(stored))
}

/// Snapshot of a single resource, as shown to players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceStatus {
    pub resource: ResourceType,
    pub amount: u32,
    pub capacity: u32,
    pub is_full: bool,
}

impl VillageResources {
    pub fn new(
        amounts: ResourceAmounts,
        production: ResourceAmounts,
        capacity: ResourceAmounts,
    ) -> Self {
        Self {
            amounts,
            production,
            capacity,
            levels: default_levels(),
        }
    }

    pub fn amounts(&self) -> ResourceAmounts {
        self.amounts
    }

    /// Hourly production.
    pub fn production(&self) -> ResourceAmounts {
        self.production
    }

    pub fn capacity(&self) -> ResourceAmounts {
        self.capacity
    }

    pub fn level(&self, resource: ResourceType) -> u8 {
        self.levels
            .get(&resource)
            .copied()
            .unwrap_or(DEFAULT_FIELD_LEVEL)
    }

    pub fn levels(&self) -> &BTreeMap<ResourceType, u8> {
        &self.levels
    }

    /// Stored total over capacity total, in percent.
    pub fn utilization(&self) -> f64 {
        let capacity = self.capacity.total();
        if capacity == 0 {
            return 0.0;
        }
        self.amounts.total() as f64 / capacity as f64 * 100.0
    }

    pub fn is_nearly_full(&self) -> bool {
        self.utilization() >= 90.0
    }

    pub fn is_full(&self, resource: ResourceType) -> bool {
        self.amounts.get(resource) >= self.capacity.get(resource)
    }

    pub fn status(&self, resource: ResourceType) -> ResourceStatus {
        ResourceStatus {
            resource,
            amount: self.amounts.get(resource),
            capacity: self.capacity.get(resource),
            is_full: self.is_full(resource),
        }
    }

    /// Seconds until `resource` hits capacity at the current rate.
    pub fn seconds_until_full(&self, resource: ResourceType) -> Option<u64> {
        let rate = self.production.get(resource) as u64;
        if rate == 0 || self.is_full(resource) {
            return None;
        }

        let missing = (self.capacity.get(resource) - self.amounts.get(resource)) as u64;
        Some((missing * 3600).div_ceil(rate))
    }

    pub fn with_amounts(&self, amounts: ResourceAmounts) -> Self {
        Self {
            amounts,
            ..self.clone()
        }
    }

    pub fn with_production(&self, production: ResourceAmounts) -> Self {
        Self {
            production,
            ..self.clone()
        }
    }

    pub fn with_capacity(&self, capacity: ResourceAmounts) -> Self {
        Self {
            capacity,
            ..self.clone()
        }
    }

    pub fn with_level(&self, resource: ResourceType, level: u8) -> Self {
        let mut levels = self.levels.clone();
        levels.insert(resource, level);
        Self {
            levels,
            ..self.clone()
        }
    }
}

/// Units being trained. Orders of a village run back to back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingOrder {
    pub unit: UnitKind,
    pub quantity: u32,
    pub trained: u32,
    pub time_per_unit_secs: u32,
    pub started_at: DateTime<Utc>,
}

impl TrainingOrder {
    /// Units finished by `time`, already delivered ones included.
    pub fn completed_by(&self, time: DateTime<Utc>) -> u32 {
        let elapsed = (time - self.started_at).num_seconds();
        if elapsed <= 0 {
            return 0;
        }
        let done = elapsed as u64 / self.time_per_unit_secs.max(1) as u64;
        done.min(self.quantity as u64) as u32
    }

    pub fn finishes_at(&self) -> DateTime<Utc> {
        self.started_at
            + Duration::seconds(self.time_per_unit_secs as i64 * self.quantity as i64)
    }

    pub fn is_done(&self) -> bool {
        self.trained >= self.quantity
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructionOrder {
    pub resource: ResourceType,
    pub target_level: u8,
    pub completes_at: DateTime<Utc>,
}

/// What [`Village::catch_up`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatchUp {
    pub completed: Vec<ConstructionOrder>,
    /// Production that did not fit in storage.
    pub wasted: ResourceAmounts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Village {
    pub id: u32,
    pub player_id: Uuid,
    pub name: String,
    pub position: Coordinates,
    pub resources: VillageResources,
    pub troops: TroopCounts,
    pub population: u32,
    pub training_queue: Vec<TrainingOrder>,
    pub construction_queue: Vec<ConstructionOrder>,
    /// Production has been credited up to this instant.
    pub last_tick_at: DateTime<Utc>,
    /// When each resource's current production rate took effect.
    #[serde(default)]
    pub production_anchors: BTreeMap<ResourceType, DateTime<Utc>>,
}

impl Village {
    /// A fresh village: every field at level 1, starting stock and empty queues.
    pub fn new(
        id: u32,
        player_id: Uuid,
        name: String,
        position: Coordinates,
        server_speed: u8,
        now: DateTime<Utc>,
    ) -> Self {
        let production = ResourceAmounts::uniform(field_production(DEFAULT_FIELD_LEVEL, server_speed));
        let resources = VillageResources::new(
            ResourceAmounts::uniform(STARTING_STOCK),
            production,
            ResourceAmounts::uniform(STARTING_CAPACITY),
        );
        let population = BASE_POPULATION
            + FIELD_LEVELS[DEFAULT_FIELD_LEVEL as usize].population * ResourceType::ALL.len() as u32;

        Self {
            id,
            player_id,
            name,
            position,
            resources,
            troops: TroopCounts::default(),
            population,
            training_queue: vec![],
            construction_queue: vec![],
            last_tick_at: now,
            production_anchors: ResourceType::ALL.into_iter().map(|r| (r, now)).collect(),
        }
    }

    /// When `resource`'s current rate took effect. Unknown anchors start at `last_tick_at`.
    pub fn production_anchor(&self, resource: ResourceType) -> DateTime<Utc> {
        self.production_anchors
            .get(&resource)
            .copied()
            .unwrap_or(self.last_tick_at)
    }

    /// Credits production from `last_tick_at` up to `to`.
    pub fn advance_to(&mut self, to: DateTime<Utc>) -> Result<ProductionOutcome, GameError> {
        let from = self.last_tick_at;
        let outcome = ProductionEngine::advance_windows(&self.resources, |resource| {
            let anchor = self.production_anchor(resource);
            ((from - anchor).num_seconds(), (to - anchor).num_seconds())
        })?;

        for resource in ResourceType::ALL {
            let anchor = self.production_anchor(resource);
            self.production_anchors.insert(resource, anchor);
        }
        self.resources = outcome.resources.clone();
        self.last_tick_at = to;
        Ok(outcome)
    }

    /// Pays for `quantity` units and queues them after any order already running.
    pub fn enqueue_training(
        &mut self,
        unit: UnitKind,
        quantity: u32,
        now: DateTime<Utc>,
        server_speed: u8,
    ) -> Result<TrainingOrder, GameError> {
        if quantity == 0 {
            return Err(GameError::NoUnitsSelected);
        }

        let stats = unit.stats();
        let cost = stats.cost.multiply(quantity as f64);
        if !self.resources.amounts().can_afford(&cost) {
            return Err(GameError::NotEnoughResources);
        }

        let started_at = self
            .training_queue
            .iter()
            .map(TrainingOrder::finishes_at)
            .max()
            .map_or(now, |end| end.max(now));

        let order = TrainingOrder {
            unit,
            quantity,
            trained: 0,
            time_per_unit_secs: (stats.training_time / server_speed.max(1) as u32).max(1),
            started_at,
        };

        self.spend(&cost);
        self.training_queue.push(order.clone());
        Ok(order)
    }

    /// Moves finished units into the garrison and drops finished orders.
    /// Returns the units delivered by this call.
    pub fn process_training(&mut self, now: DateTime<Utc>) -> Vec<(UnitKind, u32)> {
        let mut delivered = vec![];

        for order in self.training_queue.iter_mut() {
            let completed = order.completed_by(now);
            if completed <= order.trained {
                continue;
            }

            let new_units = completed - order.trained;
            order.trained = completed;

            let current = self.troops.get(order.unit);
            self.troops = self
                .troops
                .with(order.unit, current.saturating_add(new_units));
            delivered.push((order.unit, new_units));
        }

        self.training_queue.retain(|order| !order.is_done());
        delivered
    }

    /// Pays for the next level of a resource field and starts building it.
    pub fn enqueue_field_upgrade(
        &mut self,
        resource: ResourceType,
        now: DateTime<Utc>,
        server_speed: u8,
    ) -> Result<ConstructionOrder, GameError> {
        if !self.construction_queue.is_empty() {
            return Err(GameError::ConstructionQueueFull);
        }

        let current = self.resources.level(resource);
        if current >= MAX_FIELD_LEVEL {
            return Err(GameError::FieldMaxLevelReached(resource));
        }

        let target_level = current + 1;
        let data = field_level_data(target_level).ok_or(GameError::FieldMaxLevelReached(resource))?;
        if !self.resources.amounts().can_afford(&data.cost) {
            return Err(GameError::NotEnoughResources);
        }

        let build_time = (data.time / server_speed.max(1) as u32).max(1);
        let order = ConstructionOrder {
            resource,
            target_level,
            completes_at: now + Duration::seconds(build_time as i64),
        };

        self.spend(&data.cost);
        self.construction_queue.push(order.clone());
        Ok(order)
    }

    /// Applies every construction due by `now`, returning the completed orders.
    /// Production must already be credited up to `now`: new rates start from there.
    pub fn complete_constructions(
        &mut self,
        now: DateTime<Utc>,
        server_speed: u8,
    ) -> Vec<ConstructionOrder> {
        let (done, pending): (Vec<_>, Vec<_>) = self
            .construction_queue
            .drain(..)
            .partition(|order| order.completes_at <= now);
        self.construction_queue = pending;

        let switched_at = self.last_tick_at.max(now);
        for order in &done {
            let production = self.resources.production().with(
                order.resource,
                field_production(order.target_level, server_speed),
            );
            self.resources = self
                .resources
                .with_level(order.resource, order.target_level)
                .with_production(production);
            self.production_anchors.insert(order.resource, switched_at);

            if let Some(data) = field_level_data(order.target_level) {
                self.population += data.population;
            }
        }

        if !done.is_empty() {
            self.last_tick_at = switched_at;
        }
        done
    }

    /// Brings the village up to `to`. Production is credited window by window,
    /// each due construction switching the rates at its completion time.
    /// A `to` at or before `last_tick_at` changes nothing.
    pub fn catch_up(
        &mut self,
        to: DateTime<Utc>,
        server_speed: u8,
    ) -> Result<CatchUp, GameError> {
        let mut caught_up = CatchUp::default();
        if to <= self.last_tick_at {
            return Ok(caught_up);
        }

        let mut due: Vec<DateTime<Utc>> = self
            .construction_queue
            .iter()
            .map(|order| order.completes_at)
            .filter(|completes_at| *completes_at <= to)
            .collect();
        due.sort();

        for completes_at in due {
            if completes_at > self.last_tick_at {
                let outcome = self.advance_to(completes_at)?;
                caught_up.wasted = caught_up.wasted.add(&outcome.wasted);
            }
            let at = completes_at.max(self.last_tick_at);
            caught_up
                .completed
                .extend(self.complete_constructions(at, server_speed));
        }

        let outcome = self.advance_to(to)?;
        caught_up.wasted = caught_up.wasted.add(&outcome.wasted);
        Ok(caught_up)
    }

    /// Removes `troops` from the garrison so they can march.
    pub fn deploy_troops(&mut self, troops: &TroopCounts) -> Result<(), GameError> {
        if troops.is_empty() {
            return Err(GameError::NoUnitsSelected);
        }
        if !self.troops.contains(troops) {
            return Err(GameError::NotEnoughUnits);
        }

        self.troops = self.troops.subtract(troops);
        Ok(())
    }

    pub fn receive_troops(&mut self, troops: &TroopCounts) {
        self.troops = self.troops.add(troops);
    }

    /// Stores incoming resources up to capacity and returns what did not fit.
    pub fn store_resources(&mut self, incoming: &ResourceAmounts) -> ResourceAmounts {
        let capacity = self.resources.capacity();
        let raw = self.resources.amounts().add(incoming);
        let stored = raw.min(&capacity);

        self.resources = self.resources.with_amounts(stored);
        raw.subtract(&stored)
    }

    /// Removes resources, e.g. looted ones. Never goes below zero.
    pub fn remove_resources(&mut self, outgoing: &ResourceAmounts) {
        let remaining = self.resources.amounts().subtract(outgoing);
        self.resources = self.resources.with_amounts(remaining);
    }

    fn spend(&mut self, cost: &ResourceAmounts) {
        self.remove_resources(cost);
    }
}
