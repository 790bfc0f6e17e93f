//! Database models, configuration and request extractors.

pub mod auth;
pub mod block;
pub mod config;
pub mod rate_plan;
pub mod unit;
