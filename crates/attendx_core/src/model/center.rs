//! Center domain model.
//!
//! # Responsibility
//! - Define the teaching location record that owns students.
//! - Provide insert and partial-update shapes used by the store.
//!
//! # Invariants
//! - `id` is assigned by the store and never changes.
//! - `created_at` is set once at insert time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned center identifier.
pub type CenterId = i64;

/// Palette offered when creating a center. Any other color string is accepted.
pub const CENTER_COLORS: [&str; 10] = [
    "#6366f1", // indigo
    "#8b5cf6", // violet
    "#ec4899", // pink
    "#f43f5e", // rose
    "#f97316", // orange
    "#eab308", // yellow
    "#22c55e", // green
    "#14b8a6", // teal
    "#06b6d4", // cyan
    "#3b82f6", // blue
];

/// A physical or logical teaching location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Center {
    pub id: CenterId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied by the caller when adding a center.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCenter {
    pub name: String,
    pub address: Option<String>,
    pub color: String,
}

impl NewCenter {
    /// Creates an insert request without an address.
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: None,
            color: color.into(),
        }
    }

    /// Sets the optional street address.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }
}

/// Partial update for a center. `None` leaves a field unchanged.
///
/// `address` is doubly optional: `Some(None)` clears the stored address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CenterPatch {
    pub name: Option<String>,
    pub address: Option<Option<String>>,
    pub color: Option<String>,
}

impl CenterPatch {
    /// Merges the specified fields into `center`.
    pub fn apply_to(&self, center: &mut Center) {
        if let Some(name) = &self.name {
            center.name.clone_from(name);
        }
        if let Some(address) = &self.address {
            center.address.clone_from(address);
        }
        if let Some(color) = &self.color {
            center.color.clone_from(color);
        }
    }
}
