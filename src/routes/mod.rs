//! Router Module Index
//!
//! Organizes the application's routing into groups that are mounted independently by
//! `create_router`. Every method router carries a 405 fallback, so an unsupported method on
//! any known path answers with the standard envelope.

/// Unauthenticated operational routes: health check and service banner.
pub mod public;

/// Administrator resource routes under `/api/v1/admin`.
pub mod admin;

/// Development/test-only routes under `/test`. Never mounted in production.
pub mod testing;
