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

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A dispatch window exactly as delivered by the supplier.
///
/// Timestamps stay as strings until [`crate::timezone::normalize`] parses
/// them. Accepts both the current API field names (`start`, `end`, `type`)
/// and the legacy planned-dispatch ones (`startDt`, `endDt`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDispatch {
    #[serde(alias = "startDt")]
    pub start: String,

    #[serde(alias = "endDt")]
    pub end: String,

    /// Dispatch type reported by the supplier (e.g. "SMART", "BOOST")
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl RawDispatch {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            kind: None,
        }
    }
}

/// Anything that can supply the raw dispatch windows for a device
#[async_trait]
pub trait WindowSource: Send + Sync {
    /// Fetch the planned dispatch windows for `device_id`.
    ///
    /// An empty list is a valid answer: the fixed window still applies.
    async fn dispatch_windows(&self, device_id: &str) -> Result<Vec<RawDispatch>>;

    /// Short human-readable name for logs
    fn name(&self) -> &str;
}
