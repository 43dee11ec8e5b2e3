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

//! Octopus Energy Kraken GraphQL client
//!
//! Obtains session tokens, lists account devices and fetches the planned
//! smart-charge dispatches that feed the off-peak planner.

pub mod client;
pub mod errors;
pub mod source;
pub mod types;

pub use client::{DEFAULT_API_URL, KrakenClient};
pub use errors::{KrakenError, KrakenResult};
pub use source::KrakenDispatchSource;
pub use types::Device;
