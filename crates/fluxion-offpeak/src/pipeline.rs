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

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::{debug, info};

use crate::error::WindowResult;
use crate::fixed_window::OffPeakSchedule;
use crate::sanitizer::sanitize;
use crate::selector::{DispatchPlan, select};
use crate::source::RawDispatch;
use crate::timezone::normalize_all;

/// Plan the upcoming off-peak windows for one device.
///
/// `now` is read once by the caller and used for the fixed window, the
/// elapsed-window cut and the plan timestamp alike. Any malformed dispatch
/// aborts the run; no partial plan is returned.
pub fn plan_dispatches(
    raw: &[RawDispatch],
    zone: Tz,
    schedule: &OffPeakSchedule,
    now: DateTime<Utc>,
) -> WindowResult<DispatchPlan> {
    let now = now.with_timezone(&zone);
    let fixed = schedule.fixed_window(now);

    let dispatches = normalize_all(raw, zone)?;
    debug!("Normalized {} dispatch(es) into {}", dispatches.len(), zone);

    let windows = sanitize(&dispatches, &fixed, now);
    let plan = select(windows, now);

    info!(
        "Next run {} -> {} ({} window(s))",
        plan.next_run_start,
        plan.next_run_end,
        plan.windows.len()
    );
    Ok(plan)
}
