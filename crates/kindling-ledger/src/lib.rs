//! Decimal ledger and resource store for the Kindling simulation.
//!
//! Every stored quantity in the settlement flows through this crate.
//! Quantities are [`rust_decimal::Decimal`] values, so long-run
//! accumulation is exact to 28 significant digits, and every mutation of
//! the [`ResourceStore`] clamps into `[0, cap]` rather than failing.
//!
//! # Modules
//!
//! - [`quantity`] -- [`Quantity`] alias and saturating helpers (powers,
//!   percentages, head-count flooring).
//! - [`store`] -- [`ResourceStore`], [`StorageCap`], and [`CostMap`].
//!
//! # Usage
//!
//! ```
//! use std::collections::BTreeMap;
//!
//! use kindling_ledger::{CostMap, ResourceStore, StorageCap};
//! use kindling_types::ResourceKind;
//! use rust_decimal::Decimal;
//!
//! let caps = BTreeMap::from([(ResourceKind::Wood, StorageCap::Limited(Decimal::new(50, 0)))]);
//! let mut store = ResourceStore::new(&caps);
//!
//! // Overflow above the cap is discarded.
//! store.add(ResourceKind::Wood, Decimal::new(80, 0));
//! assert_eq!(store.amount(ResourceKind::Wood), Decimal::new(50, 0));
//!
//! // Purchases either fully succeed or leave the store untouched.
//! let price = CostMap::from([(ResourceKind::Wood, Decimal::new(60, 0))]);
//! assert!(!store.try_spend(&price));
//! ```

pub mod quantity;
pub mod store;

// Re-export primary types at crate root.
pub use quantity::Quantity;
pub use store::{CostMap, ResourceStore, StorageCap};
