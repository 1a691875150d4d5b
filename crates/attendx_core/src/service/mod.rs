//! Read models and aggregations built on top of the store.
//!
//! # Responsibility
//! - Compute tallies and rates.
//! - Assemble dashboard, attendance sheet and report views.
//!
//! Services borrow an `AttendanceStore`; they hold no state of their own
//! beyond in-memory drafts.

pub mod dashboard_service;
pub mod report_service;
pub mod sheet_service;
pub mod stats;
