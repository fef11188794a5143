//! Fee composition: turns a base price and a schedule into line items.
//!
//! Everything here is pure. The presentation layer calls [`compute`] again
//! whenever the price or the schedule changes.

use crate::core::schedule::FeeSchedule;
use serde::Serialize;
use std::fmt::Display;

/// Fee components in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FeeKind {
    BuyerFee,
    SellerFee,
    AssociationFee,
    StorageFee,
}

impl FeeKind {
    pub fn label(&self) -> &'static str {
        match self {
            FeeKind::BuyerFee => "Basic buyer fee",
            FeeKind::SellerFee => "Seller's special fee",
            FeeKind::AssociationFee => "Association fee",
            FeeKind::StorageFee => "Storage fee",
        }
    }
}

impl Display for FeeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeeLineItem {
    pub kind: FeeKind,
    pub amount: f64,
}

impl FeeLineItem {
    pub fn name(&self) -> &'static str {
        self.kind.label()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeeBreakdown {
    pub base_price: f64,
    pub items: Vec<FeeLineItem>,
    pub total: f64,
}

/// Coerces user text into a base price. Anything that is not a finite
/// positive number becomes 0.
pub fn parse_base_price(input: &str) -> f64 {
    input
        .trim()
        .parse::<f64>()
        .map(sanitize_price)
        .unwrap_or(0.0)
}

fn sanitize_price(price: f64) -> f64 {
    if price.is_finite() && price > 0.0 {
        price
    } else {
        0.0
    }
}

/// Computes the fee breakdown for `base_price` under `schedule`.
pub fn compute(base_price: f64, schedule: &FeeSchedule) -> FeeBreakdown {
    let price = sanitize_price(base_price);

    let items = vec![
        FeeLineItem {
            kind: FeeKind::BuyerFee,
            amount: buyer_fee(price, schedule),
        },
        FeeLineItem {
            kind: FeeKind::SellerFee,
            amount: schedule.category.seller_rate * price,
        },
        FeeLineItem {
            kind: FeeKind::AssociationFee,
            amount: bracket_fee(price, schedule),
        },
        FeeLineItem {
            kind: FeeKind::StorageFee,
            amount: schedule.storage_fee,
        },
    ];

    let total = price + items.iter().map(|item| item.amount).sum::<f64>();

    FeeBreakdown {
        base_price: price,
        items,
        total,
    }
}

// Floor first, ceiling last: with min > max the ceiling wins.
fn buyer_fee(price: f64, schedule: &FeeSchedule) -> f64 {
    let fee = &schedule.category.buyer_fee;
    (fee.rate * price).max(fee.min).min(fee.max)
}

fn bracket_fee(price: f64, schedule: &FeeSchedule) -> f64 {
    schedule
        .brackets
        .iter()
        .find(|bracket| bracket.upper_bound >= price)
        .map_or(0.0, |bracket| bracket.fee)
}
