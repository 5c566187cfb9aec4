pub mod rest;

pub use rest::{ApiState, BreakdownResponse, SourcesInfo, create_router, resolve_country};
