// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Nightly off-peak window calculation

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Timelike};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::debug;

use crate::error::{WindowError, WindowResult};
use crate::interval::{FixedWindow, Interval, resolve_local};

/// Default off-peak start (local time)
pub const DEFAULT_WINDOW_START: NaiveTime = match NaiveTime::from_hms_opt(23, 30, 0) {
    Some(t) => t,
    None => panic!("invalid default window start"),
};

/// Default off-peak end (local time, next day)
pub const DEFAULT_WINDOW_END: NaiveTime = match NaiveTime::from_hms_opt(5, 30, 0) {
    Some(t) => t,
    None => panic!("invalid default window end"),
};

/// From this local hour on, the charge day is today rather than yesterday
pub const DEFAULT_ROLLOVER_HOUR: u32 = 17;

/// Shape of the nightly off-peak window.
///
/// The window starts on the charge day and ends on the following day, so
/// `window_end` lies before `window_start` on the clock. The rollover hour
/// sits between the two: at or after the end of last night's window and no
/// later than the start of tonight's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OffPeakSchedule {
    window_start: NaiveTime,
    window_end: NaiveTime,
    rollover_hour: u32,
}

impl Default for OffPeakSchedule {
    fn default() -> Self {
        Self {
            window_start: DEFAULT_WINDOW_START,
            window_end: DEFAULT_WINDOW_END,
            rollover_hour: DEFAULT_ROLLOVER_HOUR,
        }
    }
}

impl OffPeakSchedule {
    pub fn new(
        window_start: NaiveTime,
        window_end: NaiveTime,
        rollover_hour: u32,
    ) -> WindowResult<Self> {
        let invalid = |reason: String| Err(WindowError::InvalidSchedule { reason });

        let Some(rollover) = NaiveTime::from_hms_opt(rollover_hour, 0, 0) else {
            return invalid(format!("rollover hour {rollover_hour} is not between 0 and 23"));
        };
        if window_end >= window_start {
            return invalid(format!(
                "window {window_start} -> {window_end} does not cross midnight"
            ));
        }
        if rollover < window_end {
            return invalid(format!(
                "rollover at {rollover} falls before the window ends at {window_end}"
            ));
        }
        if rollover > window_start {
            return invalid(format!(
                "rollover at {rollover} falls after the window starts at {window_start}"
            ));
        }

        Ok(Self {
            window_start,
            window_end,
            rollover_hour,
        })
    }

    /// Local start time on the charge day
    pub fn window_start(&self) -> NaiveTime {
        self.window_start
    }

    /// Local end time on the day after the charge day
    pub fn window_end(&self) -> NaiveTime {
        self.window_end
    }

    pub fn rollover_hour(&self) -> u32 {
        self.rollover_hour
    }

    /// Calendar day the current run's off-peak window is anchored to.
    ///
    /// Before the rollover hour the window that started last night is still
    /// the relevant one, so the anchor is yesterday.
    pub fn charge_day(&self, now: DateTime<Tz>) -> NaiveDate {
        let today = now.date_naive();
        if now.hour() >= self.rollover_hour {
            today
        } else {
            today.checked_sub_days(Days::new(1)).unwrap_or(today)
        }
    }

    /// Fixed off-peak window for the charge day of `now`, in `now`'s zone
    pub fn fixed_window(&self, now: DateTime<Tz>) -> FixedWindow {
        let zone = now.timezone();
        let anchor = self.charge_day(now);
        let next_day = anchor.checked_add_days(Days::new(1)).unwrap_or(anchor);

        // End falls on the next day at an earlier clock time, so it stays
        // after start across any DST shift
        let start = resolve_local(zone, anchor.and_time(self.window_start));
        let end = resolve_local(zone, next_day.and_time(self.window_end));

        let window = FixedWindow::from_interval(Interval::from_ordered(start, end));

        debug!("Charge day {} -> fixed window {}", anchor, window);
        window
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Europe::London;

    fn london(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Tz> {
        London.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_evening_anchors_today() {
        let window = OffPeakSchedule::default().fixed_window(london(2025, 1, 15, 20, 0));
        assert_eq!(window.start(), london(2025, 1, 15, 23, 30));
        assert_eq!(window.end(), london(2025, 1, 16, 5, 30));
    }

    #[test]
    fn test_morning_anchors_yesterday() {
        let window = OffPeakSchedule::default().fixed_window(london(2025, 1, 15, 3, 0));
        assert_eq!(window.start(), london(2025, 1, 14, 23, 30));
        assert_eq!(window.end(), london(2025, 1, 15, 5, 30));
    }

    #[test]
    fn test_rollover_boundary() {
        let schedule = OffPeakSchedule::default();
        let before = schedule.charge_day(london(2025, 1, 15, 16, 59));
        let at = schedule.charge_day(london(2025, 1, 15, 17, 0));

        assert_eq!(before, NaiveDate::from_ymd_opt(2025, 1, 14).unwrap());
        assert_eq!(at, NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
    }

    #[test]
    fn test_month_boundary() {
        let window = OffPeakSchedule::default().fixed_window(london(2025, 3, 1, 9, 0));
        assert_eq!(window.start(), london(2025, 2, 28, 23, 30));
        assert_eq!(window.end(), london(2025, 3, 1, 5, 30));
    }

    #[test]
    fn test_window_spanning_dst_change_is_shorter() {
        // Clocks go forward at 01:00 on 2025-03-30
        let window = OffPeakSchedule::default().fixed_window(london(2025, 3, 29, 22, 0));
        assert_eq!(window.interval().duration(), chrono::Duration::hours(5));
    }

    #[test]
    fn test_follows_zone_of_now() {
        let now = chrono_tz::UTC.with_ymd_and_hms(2025, 7, 1, 18, 0, 0).unwrap();
        let window = OffPeakSchedule::default().fixed_window(now);
        assert_eq!(window.timezone(), chrono_tz::UTC);
        assert_eq!(
            window.start(),
            chrono_tz::UTC.with_ymd_and_hms(2025, 7, 1, 23, 30, 0).unwrap()
        );
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_custom_schedule() {
        let schedule = OffPeakSchedule::new(hm(22, 0), hm(7, 0), 12).unwrap();

        let evening = schedule.fixed_window(london(2025, 1, 15, 13, 0));
        assert_eq!(evening.start(), london(2025, 1, 15, 22, 0));
        assert_eq!(evening.end(), london(2025, 1, 16, 7, 0));
        assert_eq!(evening.interval().duration(), chrono::Duration::hours(9));

        let morning = schedule.fixed_window(london(2025, 1, 16, 6, 0));
        assert_eq!(morning, evening);
    }

    #[test]
    fn test_rollover_at_window_bounds_is_accepted() {
        assert!(OffPeakSchedule::new(hm(17, 0), hm(5, 30), 17).is_ok());
        assert!(OffPeakSchedule::new(hm(23, 30), hm(5, 0), 5).is_ok());
    }

    #[test]
    fn test_schedule_within_one_day_is_rejected() {
        let result = OffPeakSchedule::new(hm(0, 30), hm(4, 30), 12);
        assert!(matches!(result, Err(WindowError::InvalidSchedule { .. })));

        let result = OffPeakSchedule::new(hm(16, 0), hm(20, 0), 17);
        assert!(matches!(result, Err(WindowError::InvalidSchedule { .. })));
    }

    #[test]
    fn test_empty_window_is_rejected() {
        let result = OffPeakSchedule::new(hm(23, 30), hm(23, 30), 17);
        assert!(matches!(result, Err(WindowError::InvalidSchedule { .. })));
    }

    #[test]
    fn test_window_starting_before_rollover_is_rejected() {
        let result = OffPeakSchedule::new(hm(16, 0), hm(5, 30), 17);
        assert!(matches!(result, Err(WindowError::InvalidSchedule { .. })));
    }

    #[test]
    fn test_window_ending_after_rollover_is_rejected() {
        let result = OffPeakSchedule::new(hm(23, 30), hm(8, 0), 7);
        assert!(matches!(result, Err(WindowError::InvalidSchedule { .. })));
    }

    #[test]
    fn test_rollover_hour_out_of_range_is_rejected() {
        let result = OffPeakSchedule::new(hm(23, 30), hm(5, 30), 24);
        assert!(matches!(result, Err(WindowError::InvalidSchedule { .. })));
    }

    #[test]
    fn test_default_schedule_passes_validation() {
        let default = OffPeakSchedule::default();
        let checked = OffPeakSchedule::new(
            default.window_start(),
            default.window_end(),
            default.rollover_hour(),
        );
        assert_eq!(checked, Ok(default));
    }
}
