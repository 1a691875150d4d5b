//! Attendance tallies and rate arithmetic.
//!
//! # Invariants
//! - `total` always equals the number of tallied records.
//! - Rates are whole percentages rounded half up; an empty tally rates `0`.

use crate::model::attendance::AttendanceStatus;
use serde::{Deserialize, Serialize};

/// Per-status counts over a set of attendance records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceStats {
    pub present: u64,
    pub absent: u64,
    pub late: u64,
    pub excused: u64,
    pub total: u64,
}

impl AttendanceStats {
    /// Tallies a sequence of statuses.
    pub fn from_statuses<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = AttendanceStatus>,
    {
        let mut stats = Self::default();
        for status in statuses {
            stats.record(status);
        }
        stats
    }

    /// Adds one record to the tally.
    pub fn record(&mut self, status: AttendanceStatus) {
        match status {
            AttendanceStatus::Present => self.present += 1,
            AttendanceStatus::Absent => self.absent += 1,
            AttendanceStatus::Late => self.late += 1,
            AttendanceStatus::Excused => self.excused += 1,
        }
        self.total += 1;
    }

    /// Records tallied under `status`.
    pub fn count(&self, status: AttendanceStatus) -> u64 {
        match status {
            AttendanceStatus::Present => self.present,
            AttendanceStatus::Absent => self.absent,
            AttendanceStatus::Late => self.late,
            AttendanceStatus::Excused => self.excused,
        }
    }

    /// Sessions that count toward the rate (present or late).
    pub fn attended(&self) -> u64 {
        AttendanceStatus::ALL
            .into_iter()
            .filter(|status| status.counts_as_attended())
            .map(|status| self.count(status))
            .sum()
    }

    /// Attendance rate in whole percent.
    pub fn rate(&self) -> u32 {
        rate_percent(self.attended(), self.total)
    }
}

/// `round(100 * numerator / total)` with ties rounded up; `0` when `total == 0`.
pub fn rate_percent(numerator: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    let rounded = (200 * numerator + total) / (2 * total);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

/// Rounded mean of whole-percent rates; `0` for an empty input.
pub fn mean_rate<I>(rates: I) -> u32
where
    I: IntoIterator<Item = u32>,
{
    let (sum, count) = rates
        .into_iter()
        .fold((0_u64, 0_u64), |(sum, count), rate| {
            (sum + u64::from(rate), count + 1)
        });
    if count == 0 {
        return 0;
    }
    let rounded = (2 * sum + count) / (2 * count);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::{mean_rate, rate_percent, AttendanceStats};
    use crate::model::attendance::AttendanceStatus::{Absent, Excused, Late, Present};

    #[test]
    fn empty_tally_rates_zero() {
        assert_eq!(AttendanceStats::default().rate(), 0);
        assert_eq!(rate_percent(0, 0), 0);
    }

    #[test]
    fn late_counts_toward_rate_and_excused_does_not() {
        let stats = AttendanceStats::from_statuses([Present, Present, Late, Absent]);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.rate(), 75);

        let stats = AttendanceStats::from_statuses([Present, Excused]);
        assert_eq!(stats.rate(), 50);
    }

    #[test]
    fn rates_round_half_up() {
        assert_eq!(rate_percent(1, 3), 33);
        assert_eq!(rate_percent(2, 3), 67);
        assert_eq!(rate_percent(1, 8), 13);
        assert_eq!(rate_percent(1, 200), 1);
        assert_eq!(rate_percent(3, 3), 100);
    }

    #[test]
    fn mean_rate_rounds_and_handles_empty_input() {
        assert_eq!(mean_rate([]), 0);
        assert_eq!(mean_rate([75, 50]), 63);
        assert_eq!(mean_rate([100, 0, 0]), 33);
    }

    #[test]
    fn attended_follows_status_rule() {
        let stats = AttendanceStats::from_statuses([Present, Late, Late, Absent, Excused]);
        assert_eq!(stats.count(Late), 2);
        assert_eq!(stats.count(Excused), 1);
        assert_eq!(stats.attended(), 3);
        assert_eq!(stats.rate(), 60);
    }
}
