//! DTO modules that bridge services with templates and APIs.

pub mod admin;
pub mod public;
pub mod sync;
