//! Fee schedule types shared by the repository and the engine

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Opaque identifier of a vehicle category, as assigned by the fee service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub u64);

impl Display for CategoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CategoryId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(CategoryId)
            .map_err(|_| anyhow::anyhow!("Invalid category id: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VehicleCategory {
    pub id: CategoryId,
    pub label: String,
}

/// A percentage fee clamped into `[min, max]` after it is applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundedFee {
    /// Fractional multiplier, e.g. `0.05` for 5%.
    pub rate: f64,
    pub min: f64,
    pub max: f64,
}

impl Default for BoundedFee {
    fn default() -> Self {
        Self {
            rate: 0.0,
            min: 0.0,
            max: f64::INFINITY,
        }
    }
}

/// One row of the price-bracket table. `upper_bound` is inclusive and may be
/// `f64::INFINITY` for the catch-all row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BracketFee {
    pub upper_bound: f64,
    pub fee: f64,
}

/// The category-dependent part of a schedule. Always replaced as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CategoryFees {
    pub buyer_fee: BoundedFee,
    /// Fractional multiplier applied to the base price without clamping.
    pub seller_rate: f64,
}

/// The category-independent part of a schedule, loaded once at startup.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Baseline {
    pub brackets: Vec<BracketFee>,
    pub storage_fee: f64,
    pub categories: Vec<VehicleCategory>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FeeSchedule {
    pub category: CategoryFees,
    pub brackets: Vec<BracketFee>,
    pub storage_fee: f64,
}

impl FeeSchedule {
    pub fn new(baseline: &Baseline, category: CategoryFees) -> Self {
        Self {
            category,
            brackets: baseline.brackets.clone(),
            storage_fee: baseline.storage_fee,
        }
    }

    /// True if brackets ascend and end with an unbounded catch-all.
    pub fn has_well_formed_brackets(&self) -> bool {
        let ascending = self
            .brackets
            .windows(2)
            .all(|pair| pair[0].upper_bound <= pair[1].upper_bound);
        let catch_all_last = self
            .brackets
            .last()
            .is_some_and(|b| b.upper_bound == f64::INFINITY);
        let single_catch_all = self
            .brackets
            .iter()
            .filter(|b| b.upper_bound == f64::INFINITY)
            .count()
            == 1;

        ascending && catch_all_last && single_catch_all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bracket(upper_bound: f64, fee: f64) -> BracketFee {
        BracketFee { upper_bound, fee }
    }

    #[test]
    fn test_category_id_parse() {
        assert_eq!("42".parse::<CategoryId>().unwrap(), CategoryId(42));
        assert_eq!(" 7 ".parse::<CategoryId>().unwrap(), CategoryId(7));
        assert!("Luxury".parse::<CategoryId>().is_err());
        assert_eq!(CategoryId(3).to_string(), "3");
    }

    #[test]
    fn test_default_schedule_is_zeroed() {
        let schedule = FeeSchedule::default();
        assert_eq!(schedule.category.buyer_fee.rate, 0.0);
        assert_eq!(schedule.category.buyer_fee.min, 0.0);
        assert_eq!(schedule.category.seller_rate, 0.0);
        assert!(schedule.brackets.is_empty());
        assert_eq!(schedule.storage_fee, 0.0);
    }

    #[test]
    fn test_bracket_shape_checks() {
        let mut schedule = FeeSchedule {
            brackets: vec![bracket(500.0, 5.0), bracket(f64::INFINITY, 20.0)],
            ..Default::default()
        };
        assert!(schedule.has_well_formed_brackets());

        schedule.brackets = vec![bracket(500.0, 5.0), bracket(1000.0, 10.0)];
        assert!(!schedule.has_well_formed_brackets());

        schedule.brackets = vec![bracket(1000.0, 10.0), bracket(500.0, 5.0)];
        assert!(!schedule.has_well_formed_brackets());

        schedule.brackets = vec![bracket(f64::INFINITY, 5.0), bracket(f64::INFINITY, 9.0)];
        assert!(!schedule.has_well_formed_brackets());
    }
}
