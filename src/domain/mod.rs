//! Domain aggregates exposed by the channel manager service layer.

pub mod block;
pub mod property_group;
pub mod rate_plan;
pub mod types;
pub mod unit;
