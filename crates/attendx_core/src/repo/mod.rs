//! Repository layer: one contract plus SQLite implementation per collection.
//!
//! # Responsibility
//! - Keep SQL details inside the persistence boundary.
//! - Enforce cascade and upsert rules at the access layer instead of relying
//!   on storage constraints.
//!
//! # Invariants
//! - Lookups that miss return `None`; updates that miss return `false`.
//! - Multi-statement writes run inside one `IMMEDIATE` transaction.
//! - Foreign-key-like columns are stored as given, without existence checks.

pub mod attendance_repo;
pub mod center_repo;
pub mod error;
pub mod settings_repo;
pub mod student_repo;
pub(crate) mod support;
