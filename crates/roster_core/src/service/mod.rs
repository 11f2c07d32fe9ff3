//! Core use-case services.
//!
//! # Responsibility
//! - Wire repositories together so cross-entity checks use injected lookups.
//! - Keep callers decoupled from identity-map and SQL details.

pub mod roster_service;
