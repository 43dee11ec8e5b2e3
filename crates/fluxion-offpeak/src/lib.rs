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

//! FluxION Off-Peak - charge window planning for smart-tariff chargers
//!
//! Merges the fixed nightly off-peak window with the supplier's planned
//! dispatch windows into a clean, sorted list of upcoming charge windows.

pub mod error;
pub mod fixed_window;
pub mod interval;
pub mod pipeline;
pub mod sanitizer;
pub mod selector;
pub mod source;
pub mod timezone;

pub use error::{WindowError, WindowResult};
pub use fixed_window::OffPeakSchedule;
pub use interval::{FixedWindow, Interval, WorkingSet};
pub use pipeline::plan_dispatches;
pub use sanitizer::sanitize;
pub use selector::{DispatchPlan, select};
pub use source::{RawDispatch, WindowSource};
pub use timezone::{normalize, parse_instant};
