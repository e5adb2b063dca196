use std::fmt;

use serde::{Deserialize, Serialize};

/// The four fungible resources stored by a village.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Wood,
    Clay,
    Iron,
    Crop,
}

impl ResourceType {
    /// Canonical order, also used to break ties.
    pub const ALL: [ResourceType; 4] = [
        ResourceType::Wood,
        ResourceType::Clay,
        ResourceType::Iron,
        ResourceType::Crop,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Wood => "wood",
            ResourceType::Clay => "clay",
            ResourceType::Iron => "iron",
            ResourceType::Crop => "crop",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value produced by a clamping operation, together with whether the clamp kicked in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clamped<T> {
    pub value: T,
    pub was_clamped: bool,
}

impl<T> Clamped<T> {
    pub fn into_inner(self) -> T {
        self.value
    }
}

/// Immutable amounts of wood, clay, iron and crop.
///
/// Every operation returns a new value. Subtraction floors each field at zero
/// instead of failing: use [`ResourceAmounts::can_afford`] before spending, or
/// [`ResourceAmounts::subtract_checked`] to find out whether a spend was short.
#[derive(Debug, Default, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceAmounts {
    wood: u32,
    clay: u32,
    iron: u32,
    crop: u32,
}

impl ResourceAmounts {
    pub const fn new(wood: u32, clay: u32, iron: u32, crop: u32) -> Self {
        Self {
            wood,
            clay,
            iron,
            crop,
        }
    }

    pub const fn zero() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Same amount for every resource.
    pub const fn uniform(amount: u32) -> Self {
        Self::new(amount, amount, amount, amount)
    }

    pub fn wood(&self) -> u32 {
        self.wood
    }

    pub fn clay(&self) -> u32 {
        self.clay
    }

    pub fn iron(&self) -> u32 {
        self.iron
    }

    pub fn crop(&self) -> u32 {
        self.crop
    }

    pub fn get(&self, resource: ResourceType) -> u32 {
        match resource {
            ResourceType::Wood => self.wood,
            ResourceType::Clay => self.clay,
            ResourceType::Iron => self.iron,
            ResourceType::Crop => self.crop,
        }
    }

    /// Returns a copy with one resource replaced.
    pub fn with(&self, resource: ResourceType, amount: u32) -> Self {
        let mut next = *self;
        match resource {
            ResourceType::Wood => next.wood = amount,
            ResourceType::Clay => next.clay = amount,
            ResourceType::Iron => next.iron = amount,
            ResourceType::Crop => next.crop = amount,
        }
        next
    }

    pub fn total(&self) -> u64 {
        self.wood as u64 + self.clay as u64 + self.iron as u64 + self.crop as u64
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn add(&self, other: &ResourceAmounts) -> Self {
        self.zip_with(other, |a, b| a.saturating_add(b))
    }

    /// Componentwise subtraction, floored at zero.
    pub fn subtract(&self, other: &ResourceAmounts) -> Self {
        self.zip_with(other, |a, b| a.saturating_sub(b))
    }

    /// Like [`ResourceAmounts::subtract`], but reports whether any field was floored.
    pub fn subtract_checked(&self, other: &ResourceAmounts) -> Clamped<Self> {
        Clamped {
            value: self.subtract(other),
            was_clamped: !self.can_afford(other),
        }
    }

    /// What is missing from `self` to cover `required`.
    pub fn shortfall(&self, required: &ResourceAmounts) -> Self {
        required.subtract(self)
    }

    pub fn can_afford(&self, required: &ResourceAmounts) -> bool {
        ResourceType::ALL
            .iter()
            .all(|r| self.get(*r) >= required.get(*r))
    }

    /// Scales every field by `factor`, rounding to the nearest integer.
    pub fn multiply(&self, factor: f64) -> Self {
        let scale = |v: u32| (v as f64 * factor).round().max(0.0) as u32;
        Self::new(
            scale(self.wood),
            scale(self.clay),
            scale(self.iron),
            scale(self.crop),
        )
    }

    pub fn min(&self, other: &ResourceAmounts) -> Self {
        self.zip_with(other, u32::min)
    }

    pub fn most_abundant(&self) -> ResourceType {
        self.pick(|candidate, best| candidate > best)
    }

    pub fn least_abundant(&self) -> ResourceType {
        self.pick(|candidate, best| candidate < best)
    }

    fn pick(&self, better: impl Fn(u32, u32) -> bool) -> ResourceType {
        let mut best = ResourceType::Wood;
        for resource in ResourceType::ALL.into_iter().skip(1) {
            if better(self.get(resource), self.get(best)) {
                best = resource;
            }
        }
        best
    }

    fn zip_with(&self, other: &ResourceAmounts, f: impl Fn(u32, u32) -> u32) -> Self {
        Self::new(
            f(self.wood, other.wood),
            f(self.clay, other.clay),
            f(self.iron, other.iron),
            f(self.crop, other.crop),
        )
    }
}

impl core::ops::Mul<f64> for ResourceAmounts {
    type Output = ResourceAmounts;

    fn mul(self, rhs: f64) -> Self::Output {
        self.multiply(rhs)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_resource_amounts_total() {
        let r = ResourceAmounts::new(100, 200, 300, 400);
        assert_eq!(r.total(), 1000);
        assert!(ResourceAmounts::zero().is_empty());
    }

    #[test]
    fn test_subtract_clamps_at_zero() {
        let a = ResourceAmounts::new(100, 50, 0, 0);
        let b = ResourceAmounts::new(150, 10, 0, 0);

        assert_eq!(a.subtract(&b), ResourceAmounts::new(0, 40, 0, 0));
    }

    #[test]
    fn test_subtract_checked_reports_clamping() {
        let a = ResourceAmounts::new(100, 50, 10, 10);

        let exact = a.subtract_checked(&ResourceAmounts::new(100, 0, 5, 0));
        assert!(!exact.was_clamped);
        assert_eq!(exact.value, ResourceAmounts::new(0, 50, 5, 10));

        let short = a.subtract_checked(&ResourceAmounts::new(0, 60, 0, 0));
        assert!(short.was_clamped);
        assert_eq!(short.into_inner(), ResourceAmounts::new(100, 0, 10, 10));
    }

    #[test]
    fn test_can_afford_and_shortfall() {
        let stock = ResourceAmounts::new(100, 100, 100, 100);
        assert!(stock.can_afford(&ResourceAmounts::new(100, 0, 50, 100)));
        assert!(!stock.can_afford(&ResourceAmounts::new(101, 0, 0, 0)));

        let missing = stock.shortfall(&ResourceAmounts::new(150, 20, 0, 130));
        assert_eq!(missing, ResourceAmounts::new(50, 0, 0, 30));
    }

    #[test]
    fn test_multiply_rounds_each_field() {
        let r = ResourceAmounts::new(10, 15, 3, 0);
        assert_eq!(r.multiply(0.5), ResourceAmounts::new(5, 8, 2, 0));
        assert_eq!(r * 2.0, ResourceAmounts::new(20, 30, 6, 0));
        assert_eq!(r.multiply(-1.0), ResourceAmounts::zero());
    }

    #[test]
    fn test_most_and_least_abundant_ties_follow_canonical_order() {
        let r = ResourceAmounts::new(10, 30, 30, 10);
        assert_eq!(r.most_abundant(), ResourceType::Clay);
        assert_eq!(r.least_abundant(), ResourceType::Wood);

        let flat = ResourceAmounts::uniform(7);
        assert_eq!(flat.most_abundant(), ResourceType::Wood);
        assert_eq!(flat.least_abundant(), ResourceType::Wood);

        let r = ResourceAmounts::new(5, 4, 9, 1);
        assert_eq!(r.most_abundant(), ResourceType::Iron);
        assert_eq!(r.least_abundant(), ResourceType::Crop);
    }

    #[test]
    fn test_with_returns_new_value() {
        let r = ResourceAmounts::zero();
        let updated = r.with(ResourceType::Iron, 42);
        assert_eq!(r.iron(), 0);
        assert_eq!(updated.iron(), 42);
        assert_eq!(updated.get(ResourceType::Iron), 42);
    }

    #[test]
    fn test_serialized_keys() {
        let r = ResourceAmounts::new(1, 2, 3, 4);
        let value = serde_json::to_value(r).unwrap();
        assert_eq!(value, json!({"wood": 1, "clay": 2, "iron": 3, "crop": 4}));

        let partial: ResourceAmounts = serde_json::from_value(json!({"iron": 9})).unwrap();
        assert_eq!(partial, ResourceAmounts::new(0, 0, 9, 0));
        assert_eq!(ResourceType::Crop.to_string(), "crop");
    }

    fn amounts() -> impl Strategy<Value = ResourceAmounts> {
        (0u32..1_000_000, 0u32..1_000_000, 0u32..1_000_000, 0u32..1_000_000)
            .prop_map(|(w, c, i, cr)| ResourceAmounts::new(w, c, i, cr))
    }

    proptest! {
        #[test]
        fn prop_add_then_subtract_is_identity(a in amounts(), b in amounts()) {
            prop_assert_eq!(a.add(&b).subtract(&b), a);
        }

        #[test]
        fn prop_subtract_never_underflows(a in amounts(), b in amounts()) {
            let r = a.subtract(&b);
            for resource in ResourceType::ALL {
                prop_assert!(r.get(resource) <= a.get(resource));
            }
            prop_assert_eq!(a.subtract_checked(&b).was_clamped, !a.can_afford(&b));
        }
    }
}
