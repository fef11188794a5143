pub mod calculate;
pub mod categories;
pub mod interactive;
pub mod setup;
pub mod ui;
