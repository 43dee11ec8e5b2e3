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

//! Error types for off-peak window planning

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WindowError {
    /// A dispatch timestamp could not be read as a timezone-aware instant
    #[error("invalid timestamp '{value}': {reason}")]
    InvalidTimestamp { value: String, reason: String },

    /// An interval whose start lies after its end
    #[error("invalid interval: start {start} is after end {end}")]
    InvalidInterval { start: String, end: String },

    /// An off-peak schedule that cannot describe a nightly window
    #[error("invalid off-peak schedule: {reason}")]
    InvalidSchedule { reason: String },
}

pub type WindowResult<T> = std::result::Result<T, WindowError>;
