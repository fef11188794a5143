//! Loads fee data from a [`FeeSource`] and normalizes it into schedule parts.
//!
//! Failures stop here: they are logged and reported as `None` so callers keep
//! whatever schedule they already had.

use crate::core::cache::Cache;
use crate::core::schedule::{
    Baseline, BoundedFee, BracketFee, CategoryFees, CategoryId, FeeSchedule, VehicleCategory,
};
use crate::core::source::{AssociationFeeRecord, BuyerSellerFeeRecord, CarTypeRecord, FeeSource};
use anyhow::{Context, Result};
use std::sync::{Arc, RwLock};
use tracing::{debug, error, info, warn};

const BUYER_FEE_TYPE: &str = "Basic buyer fee";
const SELLER_FEE_TYPE: &str = "Seller's special fee";

pub struct FeeRepository {
    source: Arc<dyn FeeSource>,
    categories: RwLock<Vec<VehicleCategory>>,
    category_cache: Option<Cache<CategoryId, CategoryFees>>,
}

impl FeeRepository {
    pub fn new(source: Arc<dyn FeeSource>, cache_category_fees: bool) -> Self {
        Self {
            source,
            categories: RwLock::new(Vec::new()),
            category_cache: cache_category_fees.then(|| Cache::new("category_fees")),
        }
    }

    /// Categories recorded by the last successful [`Self::load_baseline`].
    pub fn categories(&self) -> Vec<VehicleCategory> {
        self.categories
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub async fn load_baseline(&self) -> Option<Baseline> {
        match self.fetch_baseline().await {
            Ok(baseline) => {
                info!(
                    brackets = baseline.brackets.len(),
                    categories = baseline.categories.len(),
                    "Loaded baseline fee schedule"
                );
                *self.categories.write().unwrap_or_else(|e| e.into_inner()) =
                    baseline.categories.clone();
                Some(baseline)
            }
            Err(e) => {
                error!(error = ?e, "Failed to load baseline fee schedule");
                None
            }
        }
    }

    /// Fetches the fees of `category`. Returns `None` when nothing is selected,
    /// the category is unknown, or the fetch fails.
    pub async fn load_category_fees(&self, category: Option<CategoryId>) -> Option<CategoryFees> {
        let Some(id) = category else {
            debug!("No category selected, skipping category fee load");
            return None;
        };

        let known = self
            .categories
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .any(|c| c.id == id);
        if !known {
            warn!(category = %id, "Unknown vehicle category, skipping category fee load");
            return None;
        }

        if let Some(cache) = &self.category_cache
            && let Some(cached) = cache.get(&id).await
        {
            return Some(cached);
        }

        match self.fetch_category_fees(id).await {
            Ok(fees) => {
                debug!(category = %id, ?fees, "Loaded category fees");
                if let Some(cache) = &self.category_cache {
                    cache.put(id, fees).await;
                }
                Some(fees)
            }
            Err(e) => {
                error!(category = %id, error = ?e, "Failed to load category fees");
                None
            }
        }
    }

    async fn fetch_baseline(&self) -> Result<Baseline> {
        let (storage, association, car_types) = futures::try_join!(
            async {
                self.source
                    .storage_fee()
                    .await
                    .context("Failed to fetch storage fee")
            },
            async {
                self.source
                    .association_fees()
                    .await
                    .context("Failed to fetch association fees")
            },
            async {
                self.source
                    .car_types()
                    .await
                    .context("Failed to fetch vehicle categories")
            },
        )?;

        let baseline = Baseline {
            brackets: normalize_brackets(&association),
            storage_fee: storage.fee_amount,
            categories: normalize_categories(car_types),
        };

        let probe = FeeSchedule::new(&baseline, CategoryFees::default());
        if !probe.has_well_formed_brackets() {
            warn!(
                brackets = ?baseline.brackets,
                "Association fee brackets are unsorted or lack a catch-all"
            );
        }

        Ok(baseline)
    }

    async fn fetch_category_fees(&self, id: CategoryId) -> Result<CategoryFees> {
        let records = self
            .source
            .buyer_seller_fees(id)
            .await
            .with_context(|| format!("Failed to fetch buyer/seller fees for category {id}"))?;
        Ok(normalize_category_fees(&records))
    }
}

/// Maps the upstream "no upper bound" sentinel to `f64::INFINITY`. Order is
/// kept as received.
pub fn normalize_brackets(records: &[AssociationFeeRecord]) -> Vec<BracketFee> {
    records
        .iter()
        .map(|r| BracketFee {
            upper_bound: r.price_range_end.unwrap_or(f64::INFINITY),
            fee: r.fee_amount,
        })
        .collect()
}

/// Converts whole-number percentages into fractional rates. Fee types that
/// are missing stay at zero.
pub fn normalize_category_fees(records: &[BuyerSellerFeeRecord]) -> CategoryFees {
    let mut fees = CategoryFees::default();

    for record in records {
        match record.fee_type.as_str() {
            BUYER_FEE_TYPE => {
                fees.buyer_fee = BoundedFee {
                    rate: record.percentage / 100.0,
                    min: record.min_value.unwrap_or(0.0),
                    max: record.max_value.unwrap_or(f64::INFINITY),
                };
            }
            SELLER_FEE_TYPE => fees.seller_rate = record.percentage / 100.0,
            other => warn!(fee_type = other, "Ignoring unknown fee type"),
        }
    }

    fees
}

fn normalize_categories(records: Vec<CarTypeRecord>) -> Vec<VehicleCategory> {
    records
        .into_iter()
        .map(|r| VehicleCategory {
            id: CategoryId(r.id),
            label: r.type_name,
        })
        .collect()
}
