//! Attendance sheet: the per-center, per-day roster used to take attendance.
//!
//! # Responsibility
//! - Pair each active student of a center with the status already stored for
//!   the day.
//! - Hold unsaved edits in memory until `SheetService::save` writes them.
//!
//! # Invariants
//! - Editing an `AttendanceSheet` never touches storage.
//! - Saving writes only entries that carry a status; unmarked students get no
//!   record.

use crate::model::attendance::{AttendanceStatus, MarkAttendance};
use crate::model::center::CenterId;
use crate::model::student::{Student, StudentId};
use crate::repo::error::RepoResult;
use crate::store::AttendanceStore;
use chrono::NaiveDate;
use std::collections::HashMap;

/// One roster line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetEntry {
    pub student: Student,
    /// `None` while the student is unmarked.
    pub status: Option<AttendanceStatus>,
}

/// Live tally of a sheet, including unmarked students.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SheetSummary {
    pub present: usize,
    pub absent: usize,
    pub late: usize,
    pub excused: usize,
    pub unmarked: usize,
}

/// Draft attendance for one center on one date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceSheet {
    pub center_id: CenterId,
    pub date: NaiveDate,
    pub entries: Vec<SheetEntry>,
    dirty: bool,
}

impl AttendanceSheet {
    /// Whether the sheet has edits not yet saved.
    pub fn has_changes(&self) -> bool {
        self.dirty
    }

    /// Sets one student's status. Returns `false` when the student is not on
    /// the sheet.
    pub fn set_status(&mut self, student_id: StudentId, status: AttendanceStatus) -> bool {
        let Some(entry) = self
            .entries
            .iter_mut()
            .find(|entry| entry.student.id == student_id)
        else {
            return false;
        };
        entry.status = Some(status);
        self.dirty = true;
        true
    }

    /// Sets every student on the sheet to `status`.
    pub fn mark_all(&mut self, status: AttendanceStatus) {
        for entry in &mut self.entries {
            entry.status = Some(status);
        }
        self.dirty = true;
    }

    pub fn summary(&self) -> SheetSummary {
        let mut summary = SheetSummary::default();
        for entry in &self.entries {
            match entry.status {
                Some(AttendanceStatus::Present) => summary.present += 1,
                Some(AttendanceStatus::Absent) => summary.absent += 1,
                Some(AttendanceStatus::Late) => summary.late += 1,
                Some(AttendanceStatus::Excused) => summary.excused += 1,
                None => summary.unmarked += 1,
            }
        }
        summary
    }

    /// Upserts implied by the sheet, one per marked student.
    pub fn marks(&self) -> Vec<MarkAttendance> {
        self.entries
            .iter()
            .filter_map(|entry| {
                entry.status.map(|status| {
                    MarkAttendance::new(entry.student.id, self.center_id, self.date, status)
                })
            })
            .collect()
    }
}

/// Loads and saves attendance sheets.
pub struct SheetService<'store> {
    store: &'store AttendanceStore,
}

impl<'store> SheetService<'store> {
    pub fn new(store: &'store AttendanceStore) -> Self {
        Self { store }
    }

    /// Builds the sheet for `center_id` on `date` from stored records.
    pub fn load(&self, center_id: CenterId, date: NaiveDate) -> RepoResult<AttendanceSheet> {
        let students = self.store.get_active_students_by_center(center_id)?;
        let recorded: HashMap<StudentId, AttendanceStatus> = self
            .store
            .get_attendance_by_date(center_id, date)?
            .into_iter()
            .map(|record| (record.student_id, record.status))
            .collect();

        let entries = students
            .into_iter()
            .map(|student| {
                let status = recorded.get(&student.id).copied();
                SheetEntry { student, status }
            })
            .collect();

        Ok(AttendanceSheet {
            center_id,
            date,
            entries,
            dirty: false,
        })
    }

    /// Writes every marked entry in one transaction and clears the dirty flag.
    /// Returns the number of records written.
    pub fn save(&self, sheet: &mut AttendanceSheet) -> RepoResult<usize> {
        let written = self.store.bulk_mark_attendance(&sheet.marks())?;
        sheet.dirty = false;
        Ok(written)
    }
}
