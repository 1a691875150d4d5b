//! Dashboard summary for one day.

use crate::model::center::Center;
use crate::repo::error::RepoResult;
use crate::store::AttendanceStore;
use chrono::NaiveDate;

/// A center together with its active enrollment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CenterOverview {
    pub center: Center,
    pub active_students: u64,
}

/// Headline figures for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSummary {
    pub total_students: u64,
    pub total_centers: u64,
    /// Present plus late.
    pub present_today: u64,
    pub absent_today: u64,
    pub attendance_rate: u32,
    /// Newest center first.
    pub centers: Vec<CenterOverview>,
}

pub struct DashboardService<'store> {
    store: &'store AttendanceStore,
}

impl<'store> DashboardService<'store> {
    pub fn new(store: &'store AttendanceStore) -> Self {
        Self { store }
    }

    /// Summarizes the store as of `today`.
    pub fn summary(&self, today: NaiveDate) -> RepoResult<DashboardSummary> {
        let stats = self.store.get_today_attendance_stats(today)?;

        let centers = self
            .store
            .get_all_centers()?
            .into_iter()
            .map(|center| {
                let active_students = self.store.get_active_student_count_by_center(center.id)?;
                Ok(CenterOverview {
                    center,
                    active_students,
                })
            })
            .collect::<RepoResult<Vec<_>>>()?;

        Ok(DashboardSummary {
            total_students: self.store.get_student_count()?,
            total_centers: self.store.get_center_count()?,
            present_today: stats.attended(),
            absent_today: stats.absent,
            attendance_rate: stats.rate(),
            centers,
        })
    }
}
