//! Kingdom-era economy: taxes, happiness, and production efficiency.
//!
//! # Tax
//!
//! `income = tax_base * rate * (1 + building bonus)`, where `tax_base` sums
//! each class head count times its contribution weight. With no tax bonus
//! the income is exactly `tax_base * rate`.
//!
//! # Happiness
//!
//! A target is computed each tick from the tax rate, diet variety, class
//! balance, housing, buildings, and temporary modifiers, then clamped to
//! `[0, 100]`. Current happiness moves `smoothing` of the gap toward it per
//! tick (a first-order low-pass filter), and its tier sets the efficiency
//! multiplier for class production.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kindling_ledger::{Quantity, ResourceStore, quantity};
use kindling_types::{HappinessTier, ResourceKind, SocialClass};

use crate::error::SettlementError;
use crate::workforce::Workforce;

/// Tax and happiness tuning.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Gold owed per peasant per tick at a 100 % rate.
    pub peasant_weight: Quantity,
    /// Gold owed per artisan per tick at a 100 % rate.
    pub artisan_weight: Quantity,
    /// Gold owed per merchant per tick at a 100 % rate.
    pub merchant_weight: Quantity,
    /// Gold owed per noble per tick at a 100 % rate.
    pub noble_weight: Quantity,
    /// Lowest tax rate.
    pub min_tax_rate: Quantity,
    /// Highest tax rate.
    pub max_tax_rate: Quantity,
    /// Increment the tax rate snaps to.
    pub tax_rate_step: Quantity,
    /// Rate when the kingdom is founded.
    pub default_tax_rate: Quantity,
    /// Happiness when the kingdom is founded.
    pub starting_happiness: Quantity,
    /// Fraction of the gap to target closed per tick.
    pub smoothing: Quantity,
    /// Ideal share of peasants.
    pub ideal_peasant_share: Quantity,
    /// Ideal share of artisans.
    pub ideal_artisan_share: Quantity,
    /// Ideal share of merchants.
    pub ideal_merchant_share: Quantity,
    /// Ideal share of nobles.
    pub ideal_noble_share: Quantity,
    /// Gold cost of a festival.
    pub festival_gold: Quantity,
    /// Food cost of a festival.
    pub festival_food: Quantity,
    /// Happiness added while a festival lasts.
    pub festival_happiness: Quantity,
    /// Ticks a festival lasts.
    pub festival_duration_ticks: u64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            peasant_weight: Decimal::new(1, 2),
            artisan_weight: Decimal::new(2, 2),
            merchant_weight: Decimal::new(4, 2),
            noble_weight: Decimal::new(6, 2),
            min_tax_rate: Decimal::ZERO,
            max_tax_rate: Decimal::new(5, 1),
            tax_rate_step: Decimal::new(5, 2),
            default_tax_rate: Decimal::new(1, 1),
            starting_happiness: Decimal::new(50, 0),
            smoothing: Decimal::new(5, 2),
            ideal_peasant_share: Decimal::new(50, 2),
            ideal_artisan_share: Decimal::new(25, 2),
            ideal_merchant_share: Decimal::new(15, 2),
            ideal_noble_share: Decimal::new(10, 2),
            festival_gold: Decimal::new(50, 0),
            festival_food: Decimal::new(50, 0),
            festival_happiness: Decimal::new(15, 0),
            festival_duration_ticks: 600,
        }
    }
}

impl EconomyConfig {
    /// Check the tax band and filter constants.
    ///
    /// # Errors
    ///
    /// Returns [`SettlementError::InvalidConfig`] for an inverted tax band,
    /// a non-positive step, a default rate outside the band, or smoothing
    /// outside `(0, 1]`.
    pub fn validate(&self) -> Result<(), SettlementError> {
        if self.min_tax_rate < Decimal::ZERO || self.min_tax_rate > self.max_tax_rate {
            return Err(SettlementError::invalid(
                "economy tax band must satisfy 0 <= min_tax_rate <= max_tax_rate",
            ));
        }
        if self.tax_rate_step <= Decimal::ZERO {
            return Err(SettlementError::invalid("economy.tax_rate_step must be positive"));
        }
        if self.default_tax_rate < self.min_tax_rate || self.default_tax_rate > self.max_tax_rate {
            return Err(SettlementError::invalid(
                "economy.default_tax_rate must lie within the tax band",
            ));
        }
        if self.smoothing <= Decimal::ZERO || self.smoothing > Decimal::ONE {
            return Err(SettlementError::invalid("economy.smoothing must lie in (0, 1]"));
        }
        Ok(())
    }

    /// Tax contribution weight of a class.
    pub const fn weight(&self, class: SocialClass) -> Quantity {
        match class {
            SocialClass::Peasant => self.peasant_weight,
            SocialClass::Artisan => self.artisan_weight,
            SocialClass::Merchant => self.merchant_weight,
            SocialClass::Noble => self.noble_weight,
        }
    }

    /// Ideal share of the class population for a class.
    pub const fn ideal_share(&self, class: SocialClass) -> Quantity {
        match class {
            SocialClass::Peasant => self.ideal_peasant_share,
            SocialClass::Artisan => self.ideal_artisan_share,
            SocialClass::Merchant => self.ideal_merchant_share,
            SocialClass::Noble => self.ideal_noble_share,
        }
    }

    /// Clamp a requested rate into the band and snap it to the nearest step.
    pub fn snap_tax_rate(&self, requested: Quantity) -> Quantity {
        let clamped = requested.max(self.min_tax_rate).min(self.max_tax_rate);
        let steps = quantity::ratio(clamped.saturating_sub(self.min_tax_rate), self.tax_rate_step).round();
        let snapped = self
            .min_tax_rate
            .saturating_add(steps.saturating_mul(self.tax_rate_step));
        snapped.min(self.max_tax_rate).normalize()
    }
}

// ---------------------------------------------------------------------------
// Pure formulas
// ---------------------------------------------------------------------------

/// Weighted sum of class head counts.
pub fn tax_base(workforce: &Workforce, config: &EconomyConfig) -> Quantity {
    SocialClass::ALL
        .iter()
        .map(|&class| {
            quantity::from_count(workforce.class_count(class)).saturating_mul(config.weight(class))
        })
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Discretize a happiness value.
pub fn tier_for(happiness: Quantity) -> HappinessTier {
    if happiness < Decimal::new(20, 0) {
        HappinessTier::Rebellious
    } else if happiness < Decimal::new(40, 0) {
        HappinessTier::Unhappy
    } else if happiness < Decimal::new(60, 0) {
        HappinessTier::Content
    } else if happiness < Decimal::new(80, 0) {
        HappinessTier::Happy
    } else {
        HappinessTier::Ecstatic
    }
}

/// Production efficiency of a tier.
pub const fn efficiency_for(tier: HappinessTier) -> Quantity {
    match tier {
        HappinessTier::Rebellious => Decimal::ZERO,
        HappinessTier::Unhappy => Decimal::from_parts(75, 0, 0, false, 2),
        HappinessTier::Content => Decimal::ONE,
        HappinessTier::Happy => Decimal::from_parts(11, 0, 0, false, 1),
        HappinessTier::Ecstatic => Decimal::from_parts(125, 0, 0, false, 2),
    }
}

/// Inputs to the happiness target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HappinessInputs {
    /// Current tax rate.
    pub tax_rate: Quantity,
    /// Distinct food kinds in stock.
    pub diet_variety: u32,
    /// Living settlers.
    pub settlers: u32,
    /// Population cap.
    pub max_population: u32,
    /// Happiness granted by buildings.
    pub building_bonus: Quantity,
    /// Happiness granted by active temporary effects.
    pub temporary_bonus: Quantity,
}

/// Sum of `|share - ideal share|` over the classes. Zero with no classes.
pub fn class_imbalance(workforce: &Workforce, config: &EconomyConfig) -> Quantity {
    let total = quantity::from_count(workforce.in_classes());
    if total.is_zero() {
        return Decimal::ZERO;
    }
    SocialClass::ALL
        .iter()
        .map(|&class| {
            let share = quantity::ratio(quantity::from_count(workforce.class_count(class)), total);
            share.saturating_sub(config.ideal_share(class)).abs()
        })
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Compute the happiness target, clamped to `[0, 100]`.
pub fn target_happiness(inputs: &HappinessInputs, workforce: &Workforce, config: &EconomyConfig) -> Quantity {
    let base = Decimal::new(50, 0);
    let tax = inputs.tax_rate.saturating_mul(Decimal::ONE_HUNDRED);
    let diet = quantity::from_count(inputs.diet_variety).saturating_mul(Decimal::new(5, 0));
    let imbalance = class_imbalance(workforce, config).saturating_mul(Decimal::new(50, 0));

    let housing = if inputs.settlers >= inputs.max_population {
        Decimal::new(-10, 0)
    } else {
        let slack = quantity::ratio(
            quantity::from_count(inputs.max_population.saturating_sub(inputs.settlers)),
            quantity::from_count(inputs.max_population),
        );
        if slack >= Decimal::new(1, 1) {
            Decimal::new(5, 0)
        } else {
            Decimal::ZERO
        }
    };

    base.saturating_sub(tax)
        .saturating_add(diet)
        .saturating_sub(imbalance)
        .saturating_add(housing)
        .saturating_add(inputs.building_bonus)
        .saturating_add(inputs.temporary_bonus)
        .max(Decimal::ZERO)
        .min(Decimal::ONE_HUNDRED)
}

// ---------------------------------------------------------------------------
// Economy state
// ---------------------------------------------------------------------------

/// Live kingdom economy figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Economy {
    /// Current happiness in `[0, 100]`.
    happiness: Quantity,
    /// Last computed target.
    target_happiness: Quantity,
    /// Current tax rate.
    tax_rate: Quantity,
    /// Gold collected on the last tick.
    last_tax_income: Quantity,
}

impl Economy {
    /// A freshly founded kingdom.
    pub fn new(config: &EconomyConfig) -> Self {
        Self {
            happiness: config.starting_happiness,
            target_happiness: config.starting_happiness,
            tax_rate: config.snap_tax_rate(config.default_tax_rate),
            last_tax_income: Decimal::ZERO,
        }
    }

    /// Current happiness.
    pub const fn happiness(&self) -> Quantity {
        self.happiness
    }

    /// Last computed target.
    pub const fn target_happiness(&self) -> Quantity {
        self.target_happiness
    }

    /// Current tax rate.
    pub const fn tax_rate(&self) -> Quantity {
        self.tax_rate
    }

    /// Gold collected on the last tick.
    pub const fn last_tax_income(&self) -> Quantity {
        self.last_tax_income
    }

    /// Current happiness tier.
    pub fn tier(&self) -> HappinessTier {
        tier_for(self.happiness)
    }

    /// Current production efficiency.
    pub fn efficiency(&self) -> Quantity {
        efficiency_for(self.tier())
    }

    /// Set the tax rate, clamped and snapped to the configured step.
    /// Returns the rate actually applied.
    pub fn set_tax_rate(&mut self, requested: Quantity, config: &EconomyConfig) -> Quantity {
        self.tax_rate = config.snap_tax_rate(requested);
        self.tax_rate
    }

    /// Collect one tick of taxes into the gold store.
    ///
    /// Returns the income owed, which is recorded even if the treasury is
    /// full.
    pub fn collect_tax(
        &mut self,
        workforce: &Workforce,
        tax_bonus: Quantity,
        store: &mut ResourceStore,
        config: &EconomyConfig,
    ) -> Quantity {
        let base = tax_base(workforce, config).saturating_mul(self.tax_rate);
        let income = if tax_bonus.is_zero() {
            base
        } else {
            base.saturating_mul(Decimal::ONE.saturating_add(tax_bonus))
        };
        store.add(ResourceKind::Gold, income);
        self.last_tax_income = income;
        income
    }

    /// Move happiness toward `target` by the smoothing fraction.
    pub fn converge(&mut self, target: Quantity, config: &EconomyConfig) {
        let target = target.max(Decimal::ZERO).min(Decimal::ONE_HUNDRED);
        self.target_happiness = target;
        let step = target.saturating_sub(self.happiness).saturating_mul(config.smoothing);
        self.happiness = self
            .happiness
            .saturating_add(step)
            .max(Decimal::ZERO)
            .min(Decimal::ONE_HUNDRED);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use rust_decimal_macros::dec;

    fn kingdom(peasants: u32, artisans: u32, merchants: u32, nobles: u32) -> Workforce {
        let total = peasants + artisans + merchants + nobles;
        let mut workforce = Workforce::new();
        workforce.assign_class(SocialClass::Peasant, peasants, total);
        workforce.assign_class(SocialClass::Artisan, artisans, total);
        workforce.assign_class(SocialClass::Merchant, merchants, total);
        workforce.assign_class(SocialClass::Noble, nobles, total);
        workforce
    }

    fn inputs() -> HappinessInputs {
        HappinessInputs {
            tax_rate: dec!(0.1),
            diet_variety: 2,
            settlers: 20,
            max_population: 30,
            building_bonus: Decimal::ZERO,
            temporary_bonus: Decimal::ZERO,
        }
    }

    #[test]
    fn tax_income_is_base_times_rate_exactly() {
        let config = EconomyConfig::default();
        let workforce = kingdom(10, 5, 3, 2);
        let mut economy = Economy::new(&config);
        let mut store = ResourceStore::new(&BTreeMap::new());
        let base = tax_base(&workforce, &config);
        assert_eq!(base, dec!(0.44));
        let income = economy.collect_tax(&workforce, Decimal::ZERO, &mut store, &config);
        assert_eq!(income, base * economy.tax_rate());
        assert_eq!(income, dec!(0.044));
        assert_eq!(store.amount(ResourceKind::Gold), dec!(0.044));
        assert_eq!(economy.last_tax_income(), dec!(0.044));
    }

    #[test]
    fn markets_raise_income() {
        let config = EconomyConfig::default();
        let workforce = kingdom(10, 0, 0, 0);
        let mut economy = Economy::new(&config);
        let mut store = ResourceStore::new(&BTreeMap::new());
        let income = economy.collect_tax(&workforce, dec!(0.2), &mut store, &config);
        assert_eq!(income, dec!(0.012));
    }

    #[test]
    fn tax_rate_snaps_and_clamps() {
        let config = EconomyConfig::default();
        let mut economy = Economy::new(&config);
        assert_eq!(economy.tax_rate(), dec!(0.1));
        assert_eq!(economy.set_tax_rate(dec!(0.23), &config), dec!(0.25));
        assert_eq!(economy.set_tax_rate(dec!(0.22), &config), dec!(0.2));
        assert_eq!(economy.set_tax_rate(dec!(0.9), &config), dec!(0.5));
        assert_eq!(economy.set_tax_rate(dec!(-1), &config), Decimal::ZERO);
    }

    #[test]
    fn tiers_and_efficiency() {
        assert_eq!(tier_for(dec!(0)), HappinessTier::Rebellious);
        assert_eq!(tier_for(dec!(19.99)), HappinessTier::Rebellious);
        assert_eq!(tier_for(dec!(20)), HappinessTier::Unhappy);
        assert_eq!(tier_for(dec!(59.9)), HappinessTier::Content);
        assert_eq!(tier_for(dec!(60)), HappinessTier::Happy);
        assert_eq!(tier_for(dec!(100)), HappinessTier::Ecstatic);
        assert_eq!(efficiency_for(HappinessTier::Rebellious), Decimal::ZERO);
        assert!(efficiency_for(HappinessTier::Ecstatic) > Decimal::ONE);
    }

    #[test]
    fn ideal_mix_has_no_imbalance() {
        let config = EconomyConfig::default();
        assert_eq!(class_imbalance(&kingdom(10, 5, 3, 2), &config), Decimal::ZERO);
        assert_eq!(class_imbalance(&Workforce::new(), &config), Decimal::ZERO);
        assert_eq!(class_imbalance(&kingdom(4, 0, 0, 0), &config), dec!(1.0));
    }

    #[test]
    fn target_combines_factors() {
        let config = EconomyConfig::default();
        let workforce = kingdom(10, 5, 3, 2);
        // 50 - 10 + 10 - 0 + 5 (slack) = 55
        assert_eq!(target_happiness(&inputs(), &workforce, &config), dec!(55));

        let crowded = HappinessInputs {
            settlers: 30,
            ..inputs()
        };
        assert_eq!(target_happiness(&crowded, &workforce, &config), dec!(40));

        let partying = HappinessInputs {
            temporary_bonus: dec!(100),
            ..inputs()
        };
        assert_eq!(target_happiness(&partying, &workforce, &config), dec!(100));
    }

    #[test]
    fn happiness_converges_gradually() {
        let config = EconomyConfig::default();
        let mut economy = Economy::new(&config);
        economy.converge(dec!(100), &config);
        assert_eq!(economy.happiness(), dec!(52.5));
        for _ in 0..500 {
            economy.converge(dec!(100), &config);
        }
        assert!(economy.happiness() > dec!(99.9));
        assert!(economy.happiness() <= dec!(100));
    }

    #[test]
    fn economy_serializes_quantities_as_strings() {
        let economy = Economy::new(&EconomyConfig::default());
        let json = serde_json::to_value(&economy).unwrap();
        assert!(json["tax_rate"].is_string());
        assert!(json["happiness"].is_string());
        let back: Economy = serde_json::from_value(json).unwrap();
        assert_eq!(back, economy);
    }
}
