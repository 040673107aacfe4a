//! # API Shared
//!
//! Shared request/response definitions for Folio APIs.
//!
//! Contains:
//! - Wire types (`types` module) with serde and OpenAPI schema derives
//! - Shared services like `HealthService`
//!
//! Used by `api-rest` and its tests.

pub mod health;
pub mod types;

pub use health::HealthService;
pub use types::*;
