//! Calculator state owned by the presentation layer.
//!
//! The session holds the two writable inputs (base price and selected
//! category) plus the current schedule snapshot. Derived values are computed
//! on every read; nothing is memoized.

use crate::core::engine::{self, FeeBreakdown};
use crate::core::repository::FeeRepository;
use crate::core::schedule::{Baseline, CategoryId, FeeSchedule, VehicleCategory};
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

#[derive(Debug, Default)]
struct SessionState {
    base_price: f64,
    selected: Option<CategoryId>,
    baseline: Baseline,
    schedule: FeeSchedule,
}

pub struct FeeSession {
    repository: FeeRepository,
    state: RwLock<SessionState>,
    generation: AtomicU64,
}

impl FeeSession {
    pub fn new(repository: FeeRepository) -> Self {
        Self {
            repository,
            state: RwLock::new(SessionState::default()),
            generation: AtomicU64::new(0),
        }
    }

    /// Loads the category-independent fees and the category list. On failure
    /// the session keeps its zeroed schedule.
    pub async fn initialize(&self) {
        let Some(baseline) = self.repository.load_baseline().await else {
            return;
        };

        let mut state = self.write_state();
        let category = state.schedule.category;
        state.schedule = FeeSchedule::new(&baseline, category);
        state.baseline = baseline;
    }

    pub fn set_base_price(&self, input: &str) {
        let price = engine::parse_base_price(input);
        debug!(input, price, "Base price updated");
        self.write_state().base_price = price;
    }

    pub fn base_price(&self) -> f64 {
        self.read_state().base_price
    }

    /// Selects `category` and loads its fees. Returns `true` if the loaded
    /// fees were installed, `false` if the load was a no-op, failed, or was
    /// overtaken by a newer selection.
    pub async fn select_category(&self, category: Option<CategoryId>) -> bool {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.write_state().selected = category;

        let Some(fees) = self.repository.load_category_fees(category).await else {
            return false;
        };

        let mut state = self.write_state();
        if self.generation.load(Ordering::SeqCst) != ticket {
            debug!(?category, ticket, "Discarding stale category fees");
            return false;
        }
        state.schedule.category = fees;
        true
    }

    pub fn selected_category(&self) -> Option<VehicleCategory> {
        let state = self.read_state();
        let id = state.selected?;
        state.baseline.categories.iter().find(|c| c.id == id).cloned()
    }

    pub fn categories(&self) -> Vec<VehicleCategory> {
        self.read_state().baseline.categories.clone()
    }

    /// Looks a category up by numeric id or by case-insensitive label.
    pub fn find_category(&self, query: &str) -> Option<VehicleCategory> {
        let query = query.trim();
        let by_id = query.parse::<CategoryId>().ok();
        self.read_state()
            .baseline
            .categories
            .iter()
            .find(|c| Some(c.id) == by_id || c.label.eq_ignore_ascii_case(query))
            .cloned()
    }

    pub fn schedule(&self) -> FeeSchedule {
        self.read_state().schedule.clone()
    }

    pub fn breakdown(&self) -> FeeBreakdown {
        let state = self.read_state();
        engine::compute(state.base_price, &state.schedule)
    }

    pub fn total(&self) -> f64 {
        self.breakdown().total
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::repository::tests::{MockFeeSource, buyer_record, seller_record};
    use crate::core::source::{
        AssociationFeeRecord, BuyerSellerFeeRecord, CarTypeRecord, FeeSource, StorageFeeRecord,
    };
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::Arc;
    use tokio::sync::Notify;

    async fn ready_session() -> FeeSession {
        let repo = FeeRepository::new(Arc::new(MockFeeSource::standard()), true);
        let session = FeeSession::new(repo);
        session.initialize().await;
        session
    }

    fn amounts(session: &FeeSession) -> Vec<f64> {
        session.breakdown().items.iter().map(|i| i.amount).collect()
    }

    #[tokio::test]
    async fn test_reference_scenarios() {
        let session = ready_session().await;
        assert!(session.select_category(Some(CategoryId(1))).await);

        session.set_base_price("1000");
        assert_eq!(amounts(&session), vec![100.0, 20.0, 10.0, 50.0]);
        assert_eq!(session.total(), 1180.0);

        session.set_base_price("2000");
        assert_eq!(amounts(&session), vec![100.0, 40.0, 20.0, 50.0]);
        assert_eq!(session.total(), 2210.0);

        session.set_base_price("");
        assert_eq!(amounts(&session), vec![100.0, 0.0, 10.0, 50.0]);
        assert_eq!(session.total(), 160.0);
    }

    #[tokio::test]
    async fn test_unselected_category_uses_zero_rates() {
        let session = ready_session().await;
        session.set_base_price("1000");
        assert!(session.selected_category().is_none());
        assert_eq!(amounts(&session), vec![0.0, 0.0, 10.0, 50.0]);
        assert_eq!(session.total(), 1060.0);
    }

    #[tokio::test]
    async fn test_failed_baseline_leaves_base_price_only() {
        let source = MockFeeSource {
            fail_baseline: true,
            ..MockFeeSource::standard()
        };
        let session = FeeSession::new(FeeRepository::new(Arc::new(source), true));
        session.initialize().await;

        assert!(session.categories().is_empty());
        assert!(!session.select_category(Some(CategoryId(1))).await);

        session.set_base_price("1500");
        assert_eq!(session.total(), 1500.0);
    }

    #[tokio::test]
    async fn test_failed_category_load_keeps_previous_fees() {
        let session = ready_session().await;
        assert!(session.select_category(Some(CategoryId(2))).await);
        let before = session.schedule();

        // Unknown id is a no-op that leaves the schedule intact
        assert!(!session.select_category(Some(CategoryId(42))).await);
        assert_eq!(session.schedule(), before);

        assert!(!session.select_category(None).await);
        assert_eq!(session.schedule(), before);
        assert!(session.selected_category().is_none());
    }

    #[tokio::test]
    async fn test_find_category() {
        let session = ready_session().await;
        assert_eq!(session.find_category("2").unwrap().label, "Luxury");
        assert_eq!(session.find_category("common").unwrap().id, CategoryId(1));
        assert_eq!(session.find_category(" LUXURY ").unwrap().id, CategoryId(2));
        assert!(session.find_category("Truck").is_none());
    }

    #[tokio::test]
    async fn test_selected_category_is_reported() {
        let session = ready_session().await;
        session.select_category(Some(CategoryId(2))).await;
        assert_eq!(session.selected_category().unwrap().label, "Luxury");
    }

    /// Holds category 1 responses until released so they resolve late.
    struct GatedFeeSource {
        inner: MockFeeSource,
        gate: Notify,
    }

    #[async_trait]
    impl FeeSource for GatedFeeSource {
        async fn storage_fee(&self) -> Result<StorageFeeRecord> {
            self.inner.storage_fee().await
        }

        async fn association_fees(&self) -> Result<Vec<AssociationFeeRecord>> {
            self.inner.association_fees().await
        }

        async fn buyer_seller_fees(&self, category: CategoryId) -> Result<Vec<BuyerSellerFeeRecord>> {
            if category == CategoryId(1) {
                self.gate.notified().await;
            }
            self.inner.buyer_seller_fees(category).await
        }

        async fn car_types(&self) -> Result<Vec<CarTypeRecord>> {
            self.inner.car_types().await
        }
    }

    #[tokio::test]
    async fn test_latest_selection_wins_over_late_response() {
        let source = Arc::new(GatedFeeSource {
            inner: MockFeeSource::standard(),
            gate: Notify::new(),
        });
        let session = FeeSession::new(FeeRepository::new(source.clone(), false));
        session.initialize().await;

        let (first, second) = tokio::join!(session.select_category(Some(CategoryId(1))), async {
            let applied = session.select_category(Some(CategoryId(2))).await;
            source.gate.notify_one();
            applied
        });

        assert!(!first, "stale response must be discarded");
        assert!(second);
        assert_eq!(session.selected_category().unwrap().id, CategoryId(2));

        let expected = crate::core::repository::normalize_category_fees(&[
            buyer_record(10.0, Some(25.0), Some(200.0)),
            seller_record(4.0),
        ]);
        assert_eq!(session.schedule().category, expected);
    }
}
