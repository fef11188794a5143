//! Fee service abstractions and the raw records it returns

use crate::core::schedule::CategoryId;
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct StorageFeeRecord {
    pub fee_amount: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssociationFeeRecord {
    /// `None` means the bracket has no upper bound.
    #[serde(default)]
    pub price_range_end: Option<f64>,
    pub fee_amount: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerSellerFeeRecord {
    pub fee_type: String,
    /// Whole-number percentage, e.g. `5` for 5%.
    pub percentage: f64,
    #[serde(default, rename = "min_value")]
    pub min_value: Option<f64>,
    #[serde(default, rename = "max_value")]
    pub max_value: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarTypeRecord {
    pub id: u64,
    pub type_name: String,
}

#[async_trait]
pub trait FeeSource: Send + Sync {
    async fn storage_fee(&self) -> Result<StorageFeeRecord>;
    async fn association_fees(&self) -> Result<Vec<AssociationFeeRecord>>;
    async fn buyer_seller_fees(&self, category: CategoryId) -> Result<Vec<BuyerSellerFeeRecord>>;
    async fn car_types(&self) -> Result<Vec<CarTypeRecord>>;
}
