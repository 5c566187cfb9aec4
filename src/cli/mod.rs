pub mod breakdown;
pub mod serve;
pub mod setup;
pub mod ui;
