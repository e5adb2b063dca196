use thiserror::Error;

use crate::common::ResourceType;

/// Errors for domain logic (game rules).
#[derive(Debug, Error)]
pub enum GameError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Informational: production overflowed storage and was clamped.
    #[error("Storage for {resource} is full, {wasted} units were lost")]
    CapacityExceeded { resource: ResourceType, wasted: u32 },

    #[error("Not enough resources")]
    NotEnoughResources,

    #[error("Not enough units available to deploy")]
    NotEnoughUnits,

    #[error("No units selected to deploy")]
    NoUnitsSelected,

    #[error("{0} field has already reached max level")]
    FieldMaxLevelReached(ResourceType),

    #[error("Construction queue is full")]
    ConstructionQueueFull,

    #[error("A village cannot attack itself")]
    SameVillageAttack,
}
