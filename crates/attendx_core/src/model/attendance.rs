//! Attendance record domain model.
//!
//! # Responsibility
//! - Define one status entry for one student on one calendar date.
//! - Define the status vocabulary and its display colors.
//!
//! # Invariants
//! - At most one record exists per `(student_id, date)`; writers upsert.
//! - `center_id` is the student's center at the time the record was created
//!   and is not rewritten when the student later moves.
//! - `date` carries no time component.

use crate::model::center::CenterId;
use crate::model::student::StudentId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned attendance record identifier.
pub type RecordId = i64;

/// Attendance outcome for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Excused,
}

impl AttendanceStatus {
    /// Every status in display order.
    pub const ALL: [Self; 4] = [Self::Present, Self::Absent, Self::Late, Self::Excused];

    /// Stable storage/wire value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
            Self::Late => "late",
            Self::Excused => "excused",
        }
    }

    /// Parses a storage/wire value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "present" => Some(Self::Present),
            "absent" => Some(Self::Absent),
            "late" => Some(Self::Late),
            "excused" => Some(Self::Excused),
            _ => None,
        }
    }

    /// Whether the session counts toward the attendance rate numerator.
    pub fn counts_as_attended(self) -> bool {
        matches!(self, Self::Present | Self::Late)
    }

    /// Hex color used by status badges.
    pub fn color(self) -> &'static str {
        match self {
            Self::Present => "#22c55e",
            Self::Absent => "#ef4444",
            Self::Late => "#f59e0b",
            Self::Excused => "#3b82f6",
        }
    }
}

/// One persisted attendance entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: RecordId,
    pub student_id: StudentId,
    pub center_id: CenterId,
    /// Serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One upsert request, as issued by the attendance sheet's save action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkAttendance {
    pub student_id: StudentId,
    pub center_id: CenterId,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
}

impl MarkAttendance {
    pub fn new(
        student_id: StudentId,
        center_id: CenterId,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> Self {
        Self {
            student_id,
            center_id,
            date,
            status,
            notes: None,
        }
    }
}
