//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define per-entity data access contracts.
//! - Keep SQL details and identity-map bookkeeping out of services.
//!
//! # Invariants
//! - Write paths validate field shape and foreign keys before any SQL runs.
//! - Each repository hands out at most one live `Shared<T>` per primary key.
//! - Read paths reject invalid persisted rows instead of masking them.

pub mod department_repo;
pub mod employee_repo;
pub mod error;
pub mod identity_map;
pub mod lookup;
pub mod review_repo;

pub use error::{RepoError, RepoResult};
pub use identity_map::{share, IdentityMap, Shared};
pub use lookup::{DepartmentLookup, EmployeeLookup};
