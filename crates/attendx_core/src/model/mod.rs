//! Domain model for the attendance store.
//!
//! # Responsibility
//! - Define the four persisted entities and their insert/patch shapes.
//! - Fix the JSON field naming shared by snapshots (`camelCase`).
//!
//! # Invariants
//! - Every persisted entity except settings is identified by a store-assigned
//!   integer id that is never reused.

pub mod attendance;
pub mod center;
pub mod settings;
pub mod student;
