//! Food demand and the tiered draw-down from stores.
//!
//! Settlers eat plain food first, then raw meat, then cured meat. Cured meat
//! is worth `cured_meat_value` food points per unit, so a shortfall of `x`
//! points costs `x / cured_meat_value` cured meat.
//!
//! Starvation depends on one number only: the food-equivalent total
//! `food + meat + cured_meat * cured_meat_value`.

use rust_decimal::Decimal;
use serde::Deserialize;

use kindling_ledger::{Quantity, ResourceStore, quantity};
use kindling_types::{ResourceKind, Season};

use crate::error::SettlementError;

/// Food demand tuning.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FoodConfig {
    /// Food points each settler eats per tick.
    pub per_settler: Quantity,
    /// Demand multiplier in winter.
    pub winter_multiplier: Quantity,
    /// Demand multiplier while the bonfire is out.
    pub cold_multiplier: Quantity,
    /// Food points per unit of cured meat.
    pub cured_meat_value: Quantity,
}

impl Default for FoodConfig {
    fn default() -> Self {
        Self {
            per_settler: Decimal::new(1, 2),
            winter_multiplier: Decimal::new(15, 1),
            cold_multiplier: Decimal::new(125, 2),
            cured_meat_value: Decimal::new(5, 0),
        }
    }
}

impl FoodConfig {
    /// Check that demand is non-negative and cured meat has value.
    ///
    /// # Errors
    ///
    /// Returns [`SettlementError::InvalidConfig`] on a negative rate or a
    /// non-positive cured-meat value.
    pub fn validate(&self) -> Result<(), SettlementError> {
        if self.per_settler < Decimal::ZERO
            || self.winter_multiplier < Decimal::ZERO
            || self.cold_multiplier < Decimal::ZERO
        {
            return Err(SettlementError::invalid("food rates must not be negative"));
        }
        if self.cured_meat_value <= Decimal::ZERO {
            return Err(SettlementError::invalid("food.cured_meat_value must be positive"));
        }
        Ok(())
    }
}

/// Total food points held across food, meat, and cured meat.
pub fn food_equivalent(store: &ResourceStore, config: &FoodConfig) -> Quantity {
    store
        .amount(ResourceKind::Food)
        .saturating_add(store.amount(ResourceKind::Meat))
        .saturating_add(
            store
                .amount(ResourceKind::CuredMeat)
                .saturating_mul(config.cured_meat_value),
        )
}

/// Food points the settlement needs this tick.
pub fn food_demand(settlers: u32, season: Season, bonfire_lit: bool, config: &FoodConfig) -> Quantity {
    let winter = if season == Season::Winter {
        config.winter_multiplier
    } else {
        Decimal::ONE
    };
    let cold = if bonfire_lit {
        Decimal::ONE
    } else {
        config.cold_multiplier
    };
    quantity::scale(quantity::from_count(settlers), &[config.per_settler, winter, cold])
}

/// What one meal did to the stores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MealReport {
    /// Food points demanded.
    pub demand: Quantity,
    /// Plain food eaten.
    pub food: Quantity,
    /// Raw meat eaten.
    pub meat: Quantity,
    /// Cured meat eaten (units, not points).
    pub cured_meat: Quantity,
    /// Food points that could not be covered.
    pub shortfall: Quantity,
}

impl MealReport {
    /// Whether everyone ate their fill.
    pub fn satisfied(&self) -> bool {
        self.shortfall.is_zero()
    }
}

/// Feed the settlement, drawing food, then meat, then cured meat.
pub fn consume_food(store: &mut ResourceStore, demand: Quantity, config: &FoodConfig) -> MealReport {
    let demand = quantity::non_negative(demand);
    let food = store.remove(ResourceKind::Food, demand);
    let mut remaining = demand.saturating_sub(food);

    let meat = store.remove(ResourceKind::Meat, remaining);
    remaining = remaining.saturating_sub(meat);

    let cured_needed = quantity::ratio(remaining, config.cured_meat_value);
    let cured_meat = store.remove(ResourceKind::CuredMeat, cured_needed);
    remaining = remaining.saturating_sub(cured_meat.saturating_mul(config.cured_meat_value));

    MealReport {
        demand,
        food,
        meat,
        cured_meat,
        shortfall: quantity::non_negative(remaining),
    }
}

/// Starvation sets in when demand was non-zero and nothing edible is left.
pub fn is_starving(store: &ResourceStore, demand: Quantity, config: &FoodConfig) -> bool {
    demand > Decimal::ZERO && food_equivalent(store, config).is_zero()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use rust_decimal_macros::dec;

    fn store(food: Decimal, meat: Decimal, cured: Decimal) -> ResourceStore {
        let mut store = ResourceStore::new(&BTreeMap::new());
        store.add(ResourceKind::Food, food);
        store.add(ResourceKind::Meat, meat);
        store.add(ResourceKind::CuredMeat, cured);
        store
    }

    #[test]
    fn demand_scales_with_winter_and_cold() {
        let config = FoodConfig::default();
        assert_eq!(food_demand(10, Season::Summer, true, &config), dec!(0.10));
        assert_eq!(food_demand(10, Season::Winter, true, &config), dec!(0.150));
        assert_eq!(food_demand(10, Season::Winter, false, &config), dec!(0.18750));
    }

    #[test]
    fn draws_food_then_meat_then_cured() {
        let config = FoodConfig::default();
        let mut stores = store(dec!(0.3), dec!(0.2), dec!(1));
        let meal = consume_food(&mut stores, dec!(1), &config);
        assert_eq!(meal.food, dec!(0.3));
        assert_eq!(meal.meat, dec!(0.2));
        assert_eq!(meal.cured_meat, dec!(0.1));
        assert!(meal.satisfied());
        assert_eq!(stores.amount(ResourceKind::CuredMeat), dec!(0.9));
    }

    #[test]
    fn shortfall_is_reported() {
        let config = FoodConfig::default();
        let mut stores = store(dec!(0.1), Decimal::ZERO, Decimal::ZERO);
        let meal = consume_food(&mut stores, dec!(0.4), &config);
        assert_eq!(meal.shortfall, dec!(0.3));
        assert!(is_starving(&stores, dec!(0.4), &config));
    }

    #[test]
    fn any_food_equivalent_prevents_starvation() {
        let config = FoodConfig::default();
        let stores = store(Decimal::ZERO, Decimal::ZERO, dec!(0.001));
        assert_eq!(food_equivalent(&stores, &config), dec!(0.005));
        assert!(!is_starving(&stores, dec!(1), &config));
        let empty = store(Decimal::ZERO, Decimal::ZERO, Decimal::ZERO);
        assert!(!is_starving(&empty, Decimal::ZERO, &config));
    }
}
