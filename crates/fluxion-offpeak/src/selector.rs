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

use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;

use crate::interval::{Interval, WorkingSet};

/// Final answer of one planning run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchPlan {
    /// Start of the earliest upcoming (or currently running) window
    pub next_run_start: DateTime<Tz>,

    /// End of that window
    pub next_run_end: DateTime<Tz>,

    /// All sanitized windows, earliest first
    pub windows: WorkingSet,

    /// Instant the run was computed for
    pub computed_at: DateTime<Tz>,
}

impl DispatchPlan {
    pub fn next_run(&self) -> Interval {
        *self.windows.first()
    }

    /// Whether charging is permitted at `instant` by any window of the plan
    pub fn is_active_at(&self, instant: DateTime<Tz>) -> bool {
        self.windows.iter().any(|w| w.contains(instant))
    }
}

/// Package the sanitized windows, taking the earliest as the next run
pub fn select(windows: WorkingSet, computed_at: DateTime<Tz>) -> DispatchPlan {
    let next = *windows.first();
    DispatchPlan {
        next_run_start: next.start(),
        next_run_end: next.end(),
        windows,
        computed_at,
    }
}
