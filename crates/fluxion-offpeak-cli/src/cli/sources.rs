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

use anyhow::{Context, Result};
use async_trait::async_trait;
use fluxion_offpeak::{RawDispatch, WindowSource};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::debug;

/// Accepted layouts of a dispatch file
#[derive(Deserialize)]
#[serde(untagged)]
enum DispatchFile {
    List(Vec<RawDispatch>),
    Response {
        #[serde(rename = "flexPlannedDispatches")]
        flex_planned_dispatches: Vec<RawDispatch>,
    },
}

/// [`WindowSource`] reading dispatches from a local JSON file.
///
/// The device id is ignored; the file is the plan of one device.
#[derive(Debug)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl WindowSource for JsonFileSource {
    async fn dispatch_windows(&self, _device_id: &str) -> Result<Vec<RawDispatch>> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read dispatch file {}", self.path.display()))?;

        let file: DispatchFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse dispatch file {}", self.path.display()))?;

        let dispatches = match file {
            DispatchFile::List(list) => list,
            DispatchFile::Response {
                flex_planned_dispatches,
            } => flex_planned_dispatches,
        };
        debug!(
            "Read {} dispatch(es) from {}",
            dispatches.len(),
            self.path.display()
        );
        Ok(dispatches)
    }

    fn name(&self) -> &str {
        "json-file"
    }
}
