//! Student domain model.
//!
//! # Invariants
//! - A student belongs to exactly one center through `center_id`.
//! - `center_id` is not checked against existing centers.

use crate::model::center::CenterId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned student identifier.
pub type StudentId = i64;

/// Enrollment state. Inactive students stay listed but are skipped by
/// attendance sheets and the active-student count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudentStatus {
    Active,
    Inactive,
}

impl StudentStatus {
    /// Stable storage/wire value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    /// Parses a storage/wire value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }
}

/// A person enrolled at one center.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub center_id: CenterId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub status: StudentStatus,
    pub created_at: DateTime<Utc>,
}

impl Student {
    pub fn is_active(&self) -> bool {
        self.status == StudentStatus::Active
    }
}

/// Fields supplied by the caller when enrolling a student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub name: String,
    pub center_id: CenterId,
    pub phone: Option<String>,
    pub parent_phone: Option<String>,
    pub notes: Option<String>,
    pub status: StudentStatus,
}

impl NewStudent {
    /// Creates an active student with no contact details.
    pub fn new(name: impl Into<String>, center_id: CenterId) -> Self {
        Self {
            name: name.into(),
            center_id,
            phone: None,
            parent_phone: None,
            notes: None,
            status: StudentStatus::Active,
        }
    }

    pub fn with_status(mut self, status: StudentStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_parent_phone(mut self, parent_phone: impl Into<String>) -> Self {
        self.parent_phone = Some(parent_phone.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Partial update for a student. `None` leaves a field unchanged; the
/// doubly-optional contact fields accept `Some(None)` to clear a value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentPatch {
    pub name: Option<String>,
    pub center_id: Option<CenterId>,
    pub phone: Option<Option<String>>,
    pub parent_phone: Option<Option<String>>,
    pub notes: Option<Option<String>>,
    pub status: Option<StudentStatus>,
}

impl StudentPatch {
    /// Merges the specified fields into `student`.
    pub fn apply_to(&self, student: &mut Student) {
        if let Some(name) = &self.name {
            student.name.clone_from(name);
        }
        if let Some(center_id) = self.center_id {
            student.center_id = center_id;
        }
        if let Some(phone) = &self.phone {
            student.phone.clone_from(phone);
        }
        if let Some(parent_phone) = &self.parent_phone {
            student.parent_phone.clone_from(parent_phone);
        }
        if let Some(notes) = &self.notes {
            student.notes.clone_from(notes);
        }
        if let Some(status) = self.status {
            student.status = status;
        }
    }
}
