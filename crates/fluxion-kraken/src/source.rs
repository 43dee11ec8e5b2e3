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

use crate::client::KrakenClient;

/// [`WindowSource`] backed by the Kraken `flexPlannedDispatches` query
#[derive(Debug)]
pub struct KrakenDispatchSource {
    client: KrakenClient,
}

impl KrakenDispatchSource {
    /// Wrap an authenticated client
    pub fn new(client: KrakenClient) -> Self {
        Self { client }
    }

    /// Authenticate with the API key and wrap the resulting client
    pub async fn connect(client: KrakenClient, api_key: &str) -> Result<Self> {
        let client = client
            .authenticate(api_key)
            .await
            .context("Failed to obtain Kraken session token")?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl WindowSource for KrakenDispatchSource {
    async fn dispatch_windows(&self, device_id: &str) -> Result<Vec<RawDispatch>> {
        self.client
            .flex_planned_dispatches(device_id)
            .await
            .with_context(|| format!("Failed to fetch planned dispatches for {device_id}"))
    }

    fn name(&self) -> &str {
        "kraken"
    }
}
