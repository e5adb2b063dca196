use castellum_types::{
    common::{ResourceAmounts, ResourceType},
    errors::GameError,
};

use crate::models::village::VillageResources;

/// Result of advancing a village's storage over time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductionOutcome {
    pub resources: VillageResources,
    /// Gross production over the window, before clamping.
    pub produced: ResourceAmounts,
    /// What did not fit in storage.
    pub wasted: ResourceAmounts,
}

impl ProductionOutcome {
    pub fn capacity_exceeded(&self) -> bool {
        !self.wasted.is_empty()
    }

    /// One informational `CapacityExceeded` per clamped resource.
    pub fn capacity_warnings(&self) -> Vec<GameError> {
        ResourceType::ALL
            .into_iter()
            .filter(|r| self.wasted.get(*r) > 0)
            .map(|resource| GameError::CapacityExceeded {
                resource,
                wasted: self.wasted.get(resource),
            })
            .collect()
    }
}

/// Advances storage by hourly production, clamped to capacity.
///
/// The engine is stateless: calling it twice for the same window credits
/// production twice, so callers track which windows were already applied.
pub struct ProductionEngine;

impl ProductionEngine {
    /// Applies `elapsed_secs` of production. Zero or negative durations leave
    /// the resources untouched.
    pub fn apply(resources: &VillageResources, elapsed_secs: i64) -> ProductionOutcome {
        if elapsed_secs <= 0 {
            return ProductionOutcome {
                resources: resources.clone(),
                produced: ResourceAmounts::zero(),
                wasted: ResourceAmounts::zero(),
            };
        }

        let produced = resources
            .production()
            .multiply(elapsed_secs as f64 / 3600.0);
        Self::settle(resources, produced)
    }

    /// Credits the production of the window `[from_secs, to_secs]`, both measured
    /// from the moment the current rates took effect. Only whole units are
    /// credited, and consecutive windows add up to exactly one window spanning them.
    pub fn advance_between(
        resources: &VillageResources,
        from_secs: i64,
        to_secs: i64,
    ) -> Result<ProductionOutcome, GameError> {
        Self::advance_windows(resources, |_| (from_secs, to_secs))
    }

    /// Like [`ProductionEngine::advance_between`], with a window per resource,
    /// for resources whose rates took effect at different moments.
    pub fn advance_windows<F>(
        resources: &VillageResources,
        window: F,
    ) -> Result<ProductionOutcome, GameError>
    where
        F: Fn(ResourceType) -> (i64, i64),
    {
        let production = resources.production();
        let mut produced = ResourceAmounts::zero();
        for resource in ResourceType::ALL {
            let (from_secs, to_secs) = window(resource);
            if from_secs < 0 || to_secs < from_secs {
                return Err(GameError::InvalidInput(format!(
                    "invalid production window: {from_secs}s..{to_secs}s"
                )));
            }

            let rate = production.get(resource) as i64;
            let units = rate * to_secs / 3600 - rate * from_secs / 3600;
            produced = produced.with(resource, u32::try_from(units).unwrap_or(u32::MAX));
        }

        Ok(Self::settle(resources, produced))
    }

    /// Like [`ProductionEngine::apply`], but rejects negative durations.
    pub fn advance(
        resources: &VillageResources,
        elapsed_secs: i64,
    ) -> Result<ProductionOutcome, GameError> {
        if elapsed_secs < 0 {
            return Err(GameError::InvalidInput(format!(
                "negative production window: {elapsed_secs}s"
            )));
        }
        Ok(Self::apply(resources, elapsed_secs))
    }

    fn settle(resources: &VillageResources, produced: ResourceAmounts) -> ProductionOutcome {
        let raw = resources.amounts().add(&produced);
        let stored = raw.min(&resources.capacity());

        ProductionOutcome {
            resources: resources.with_amounts(stored),
            produced,
            wasted: raw.subtract(&stored),
        }
    }
}
