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

//! End-to-end planning scenarios
//!
//! All times are January in Europe/London, where local time equals UTC.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use chrono_tz::Europe::London;
use chrono_tz::Tz;
use fluxion_offpeak::{
    FixedWindow, Interval, OffPeakSchedule, RawDispatch, WindowError, WindowSource,
    plan_dispatches, sanitize,
};

fn local(d: u32, h: u32, m: u32) -> DateTime<Tz> {
    London.with_ymd_and_hms(2025, 1, d, h, m, 0).unwrap()
}

fn utc(d: u32, h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, d, h, m, 0).unwrap()
}

fn raw(start: &str, end: &str) -> RawDispatch {
    RawDispatch::new(start, end)
}

fn spans(plan: &fluxion_offpeak::DispatchPlan) -> Vec<(DateTime<Tz>, DateTime<Tz>)> {
    plan.windows.iter().map(|w| (w.start(), w.end())).collect()
}

fn plan(raw: &[RawDispatch], now: DateTime<Utc>) -> fluxion_offpeak::DispatchPlan {
    plan_dispatches(raw, London, &OffPeakSchedule::default(), now).unwrap()
}

#[test]
fn test_no_dispatches_in_the_evening() {
    let plan = plan(&[], utc(15, 20, 0));

    assert_eq!(spans(&plan), vec![(local(15, 23, 30), local(16, 5, 30))]);
    assert_eq!(plan.next_run_start, local(15, 23, 30));
    assert_eq!(plan.next_run_end, local(16, 5, 30));
}

#[test]
fn test_dispatch_before_fixed_window_stays_separate() {
    let plan = plan(
        &[raw("2025-01-15 22:00:00+0000", "2025-01-15 23:00:00+0000")],
        utc(15, 18, 0),
    );

    assert_eq!(
        spans(&plan),
        vec![
            (local(15, 22, 0), local(15, 23, 0)),
            (local(15, 23, 30), local(16, 5, 30)),
        ]
    );
    assert_eq!(plan.next_run_start, local(15, 22, 0));
}

#[test]
fn test_dispatch_straddling_fixed_start_merges() {
    let plan = plan(
        &[raw("2025-01-15 23:00:00+0000", "2025-01-16 00:30:00+0000")],
        utc(15, 18, 0),
    );

    assert_eq!(spans(&plan), vec![(local(15, 23, 0), local(16, 5, 30))]);
}

#[test]
fn test_dispatch_covering_fixed_window_replaces_it() {
    let plan = plan(
        &[raw("2025-01-15 22:00:00+0000", "2025-01-16 06:00:00+0000")],
        utc(15, 18, 0),
    );

    assert_eq!(spans(&plan), vec![(local(15, 22, 0), local(16, 6, 0))]);
}

#[test]
fn test_everything_elapsed_falls_back_to_fixed_window() {
    let plan = plan(
        &[raw("2025-01-16 08:00:00+0000", "2025-01-16 09:00:00+0000")],
        utc(16, 12, 0),
    );

    assert_eq!(spans(&plan), vec![(local(15, 23, 30), local(16, 5, 30))]);
}

#[test]
fn test_next_run_is_earliest_window() {
    // Yesterday's fixed window is over; tonight's slot comes from the supplier
    let plan = plan(
        &[
            raw("2025-01-15 23:30:00+0000", "2025-01-16 05:30:00+0000"),
            raw("2025-01-15 10:00:00+0000", "2025-01-15 11:00:00+0000"),
        ],
        utc(15, 9, 0),
    );

    assert_eq!(plan.next_run_start, local(15, 10, 0));
    assert_eq!(plan.next_run_end, local(15, 11, 0));
    assert_eq!(
        spans(&plan),
        vec![
            (local(15, 10, 0), local(15, 11, 0)),
            (local(15, 23, 30), local(16, 5, 30)),
        ]
    );
}

#[test]
fn test_currently_running_window_is_not_truncated() {
    let plan = plan(
        &[raw("2025-01-15 18:00:00+0000", "2025-01-15 20:00:00+0000")],
        utc(15, 19, 0),
    );

    assert_eq!(plan.next_run_start, local(15, 18, 0));
    assert!(plan.is_active_at(local(15, 19, 0)));
}

#[test]
fn test_dispatch_from_fixed_start_past_fixed_end_is_kept_whole() {
    let plan = plan(
        &[raw("2025-01-15 23:30:00+0000", "2025-01-16 07:00:00+0000")],
        utc(15, 18, 0),
    );

    assert_eq!(spans(&plan), vec![(local(15, 23, 30), local(16, 7, 0))]);
}

#[test]
fn test_dispatch_equal_to_fixed_window() {
    let plan = plan(
        &[raw("2025-01-15 23:30:00+0000", "2025-01-16 05:30:00+0000")],
        utc(15, 18, 0),
    );

    assert_eq!(spans(&plan), vec![(local(15, 23, 30), local(16, 5, 30))]);
}

#[test]
fn test_chain_through_fixed_window() {
    let plan = plan(
        &[
            raw("2025-01-16 05:30:00+0000", "2025-01-16 06:00:00+0000"),
            raw("2025-01-15 23:00:00+0000", "2025-01-15 23:30:00+0000"),
            raw("2025-01-16 06:00:00+0000", "2025-01-16 06:30:00+0000"),
        ],
        utc(15, 18, 0),
    );

    assert_eq!(spans(&plan), vec![(local(15, 23, 0), local(16, 6, 30))]);
}

#[test]
fn test_summer_offsets_are_converted() {
    let now = Utc.with_ymd_and_hms(2025, 6, 15, 17, 0, 0).unwrap();
    // 21:30 UTC is 22:30 BST, 22:30 UTC is the fixed window start
    let plan = plan_dispatches(
        &[raw("2025-06-15 21:30:00+0000", "2025-06-15 22:30:00+0000")],
        London,
        &OffPeakSchedule::default(),
        now,
    )
    .unwrap();

    assert_eq!(plan.windows.len(), 1);
    assert_eq!(
        plan.next_run_start,
        London.with_ymd_and_hms(2025, 6, 15, 22, 30, 0).unwrap()
    );
    assert_eq!(
        plan.next_run_end,
        London.with_ymd_and_hms(2025, 6, 16, 5, 30, 0).unwrap()
    );
}

#[test]
fn test_reversed_dispatch_aborts_run() {
    let result = plan_dispatches(
        &[raw("2025-01-15 23:00:00+0000", "2025-01-15 22:00:00+0000")],
        London,
        &OffPeakSchedule::default(),
        utc(15, 18, 0),
    );

    assert!(matches!(result, Err(WindowError::InvalidInterval { .. })));
}

#[test]
fn test_plan_serializes_with_camel_case_keys() {
    let plan = plan(&[], utc(15, 20, 0));
    let value = serde_json::to_value(&plan).unwrap();

    assert!(value["nextRunStart"].as_str().unwrap().starts_with("2025-01-15T23:30:00"));
    assert!(value["nextRunEnd"].as_str().unwrap().starts_with("2025-01-16T05:30:00"));
    assert!(value["computedAt"].as_str().unwrap().starts_with("2025-01-15T20:00:00"));
    assert_eq!(value["windows"].as_array().unwrap().len(), 1);
    assert!(value["windows"][0]["start"].is_string());
}

struct StaticSource(Vec<RawDispatch>);

#[async_trait]
impl WindowSource for StaticSource {
    async fn dispatch_windows(&self, _device_id: &str) -> Result<Vec<RawDispatch>> {
        Ok(self.0.clone())
    }

    fn name(&self) -> &str {
        "static"
    }
}

#[tokio::test]
async fn test_plan_from_window_source() {
    let source = StaticSource(vec![raw(
        "2025-01-15 22:00:00+0000",
        "2025-01-15 23:00:00+0000",
    )]);

    let dispatches = source.dispatch_windows("device-1").await.unwrap();
    let plan = plan(&dispatches, utc(15, 18, 0));

    assert_eq!(plan.windows.len(), 2);
}

// ============= Invariants over many dispatch layouts =============

const BOUNDARIES: [(u32, u32, u32); 9] = [
    (15, 21, 0),
    (15, 22, 0),
    (15, 23, 0),
    (15, 23, 30),
    (16, 0, 30),
    (16, 3, 0),
    (16, 5, 30),
    (16, 6, 0),
    (16, 7, 0),
];

fn candidate_intervals() -> Vec<Interval> {
    let points: Vec<DateTime<Tz>> = BOUNDARIES
        .iter()
        .map(|&(d, h, m)| local(d, h, m))
        .collect();

    let mut intervals = Vec::new();
    for (i, start) in points.iter().enumerate() {
        for end in &points[i + 1..] {
            intervals.push(Interval::new(*start, *end).unwrap());
        }
    }
    intervals
}

fn fixed() -> FixedWindow {
    FixedWindow::new(local(15, 23, 30), local(16, 5, 30)).unwrap()
}

fn layouts() -> Vec<Vec<Interval>> {
    let candidates = candidate_intervals();
    let mut layouts = vec![vec![]];
    for a in &candidates {
        layouts.push(vec![*a]);
        for b in &candidates {
            layouts.push(vec![*a, *b]);
        }
    }
    layouts
}

fn nows() -> [DateTime<Tz>; 4] {
    [
        local(15, 18, 0),
        local(15, 23, 45),
        local(16, 4, 0),
        local(16, 6, 30),
    ]
}

#[test]
fn test_output_is_sorted_disjoint_and_non_empty() {
    for raw in layouts() {
        for now in nows() {
            let set = sanitize(&raw, &fixed(), now);
            assert!(!set.is_empty());
            for pair in set.as_slice().windows(2) {
                assert!(
                    pair[0].end() < pair[1].start(),
                    "windows {} and {} touch for input {:?}",
                    pair[0],
                    pair[1],
                    raw
                );
            }
        }
    }
}

#[test]
fn test_coverage_is_preserved() {
    let step = Duration::minutes(15);

    for raw in layouts() {
        for now in nows() {
            let set = sanitize(&raw, &fixed(), now);
            let fell_back = set.as_slice() == [fixed().interval()]
                && fixed().interval().has_elapsed(now);
            if fell_back {
                continue;
            }

            let mut instant = local(15, 20, 0);
            while instant < local(16, 8, 0) {
                let expected =
                    fixed().interval().contains(instant) || raw.iter().any(|r| r.contains(instant));
                let actual = set.iter().any(|w| w.contains(instant));

                if instant >= now {
                    assert_eq!(
                        expected, actual,
                        "coverage differs at {instant} for input {raw:?} at {now}"
                    );
                } else {
                    assert!(!actual || expected, "invented coverage at {instant}");
                }
                instant += step;
            }
        }
    }
}
