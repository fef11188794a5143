//! Fee schedules, the composition engine, and the state around them

pub mod cache;
pub mod config;
pub mod engine;
pub mod log;
pub mod repository;
pub mod schedule;
pub mod session;
pub mod source;

// Re-export main types for cleaner imports
pub use engine::{FeeBreakdown, FeeKind, FeeLineItem, compute, parse_base_price};
pub use repository::FeeRepository;
pub use schedule::{BoundedFee, BracketFee, CategoryFees, CategoryId, FeeSchedule, VehicleCategory};
pub use session::FeeSession;
pub use source::FeeSource;
