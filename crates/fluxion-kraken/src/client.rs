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

use crate::errors::{KrakenError, KrakenResult};
use crate::types::{
    Device, DevicesData, FlexDispatchData, GraphQlResponse, TokenData, joined_messages,
};
use fluxion_offpeak::RawDispatch;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Public Kraken GraphQL endpoint of Octopus Energy
pub const DEFAULT_API_URL: &str = "https://api.octopus.energy/v1/graphql/";

const OBTAIN_TOKEN_MUTATION: &str = r"
mutation krakenTokenAuthentication($apiKey: String!) {
  obtainKrakenToken(input: {APIKey: $apiKey}) {
    token
  }
}";

const FLEX_PLANNED_DISPATCHES_QUERY: &str = r"
query FlexPlannedDispatches($deviceId: String!) {
  flexPlannedDispatches(deviceId: $deviceId) {
    start
    end
    type
  }
}";

const DEVICES_QUERY: &str = r"
query Devices($accountNumber: String!) {
  devices(accountNumber: $accountNumber) {
    id
    name
    deviceType
    provider
    integrationDeviceId
    propertyId
  }
}";

/// Octopus Energy Kraken GraphQL client
#[derive(Clone)]
pub struct KrakenClient {
    api_url: String,
    token: Option<String>,
    client: Client,
    max_retries: u32,
    retry_delay: Duration,
}

impl std::fmt::Debug for KrakenClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KrakenClient")
            .field("api_url", &self.api_url)
            .field("authenticated", &self.token.is_some())
            .field("max_retries", &self.max_retries)
            .field("retry_delay", &self.retry_delay)
            .finish_non_exhaustive()
    }
}

impl KrakenClient {
    /// Create a new client for the given GraphQL endpoint
    pub fn new(api_url: impl Into<String>) -> KrakenResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| KrakenError::ConfigError(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_url: api_url.into(),
            token: None,
            client,
            max_retries: 3,
            retry_delay: Duration::from_millis(500),
        })
    }

    /// Create a client from an optional configured endpoint.
    /// Falls back to `OCTOPUS_API_URL`, then to the public endpoint.
    pub fn from_config(api_url: Option<String>) -> KrakenResult<Self> {
        let api_url = api_url
            .or_else(|| std::env::var("OCTOPUS_API_URL").ok())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        info!("Initializing Kraken client: {}", api_url);
        Self::new(api_url)
    }

    /// Use an already obtained session token
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Exchange the API key for a session token and keep it for later queries
    pub async fn authenticate(self, api_key: &str) -> KrakenResult<Self> {
        let token = self.obtain_token(api_key).await?;
        Ok(self.with_token(token))
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Obtain a Kraken session token for an account API key
    pub async fn obtain_token(&self, api_key: &str) -> KrakenResult<String> {
        info!("🔑 [KRAKEN AUTH] Obtaining session token");

        let data: TokenData = self
            .execute(
                "krakenTokenAuthentication",
                OBTAIN_TOKEN_MUTATION,
                json!({ "apiKey": api_key }),
                None,
            )
            .await?;

        let token = data
            .obtain_kraken_token
            .map(|payload| payload.token)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| KrakenError::InvalidResponse("No token in response".to_string()))?;

        debug!(
            "✅ [KRAKEN AUTH] Session token obtained (ends with ...{})",
            token.get(token.len().saturating_sub(6)..).unwrap_or_default()
        );
        Ok(token)
    }

    /// Planned smart-charge dispatches of one device
    pub async fn flex_planned_dispatches(&self, device_id: &str) -> KrakenResult<Vec<RawDispatch>> {
        info!("🔍 [KRAKEN QUERY] Planned dispatches for device {}", device_id);
        let token = self.token.as_deref().ok_or(KrakenError::MissingToken)?;

        let data: FlexDispatchData = self
            .execute(
                "FlexPlannedDispatches",
                FLEX_PLANNED_DISPATCHES_QUERY,
                json!({ "deviceId": device_id }),
                Some(token),
            )
            .await?;

        let dispatches = data.flex_planned_dispatches.unwrap_or_default();
        info!(
            "✅ [KRAKEN RESULT] {} planned dispatch(es) for {}",
            dispatches.len(),
            device_id
        );
        Ok(dispatches)
    }

    /// Smart devices registered to an account
    pub async fn account_devices(&self, account_number: &str) -> KrakenResult<Vec<Device>> {
        info!("🔍 [KRAKEN QUERY] Devices for account {}", account_number);
        let token = self.token.as_deref().ok_or(KrakenError::MissingToken)?;

        let data: DevicesData = self
            .execute(
                "Devices",
                DEVICES_QUERY,
                json!({ "accountNumber": account_number }),
                Some(token),
            )
            .await?;

        let devices = data.devices.unwrap_or_default();
        info!("✅ [KRAKEN RESULT] {} device(s) found", devices.len());
        Ok(devices)
    }

    /// Post one GraphQL operation and unwrap its `data` member.
    ///
    /// The session token goes into `Authorization` as is, without a scheme.
    async fn execute<T: DeserializeOwned>(
        &self,
        operation_name: &str,
        query: &str,
        variables: Value,
        token: Option<&str>,
    ) -> KrakenResult<T> {
        let body = json!({
            "query": query,
            "variables": variables,
            "operationName": operation_name,
        });
        debug!("   URL: {}", self.api_url);

        let response = self
            .retry_request(|| async {
                let mut request = self.client.post(&self.api_url).json(&body);
                if let Some(token) = token {
                    request = request.header(AUTHORIZATION, token);
                }
                request.send().await
            })
            .await?;

        match response.status() {
            StatusCode::OK => {
                let text = response.text().await?;
                let envelope: GraphQlResponse<T> = serde_json::from_str(&text)?;

                if let Some(messages) = joined_messages(envelope.errors.as_deref()) {
                    error!("❌ [KRAKEN ERROR] {}: {}", operation_name, messages);
                    return Err(KrakenError::GraphQl {
                        operation: operation_name.to_string(),
                        messages,
                    });
                }

                envelope.data.ok_or_else(|| {
                    KrakenError::InvalidResponse(format!("No data returned for {operation_name}"))
                })
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                error!("❌ [KRAKEN ERROR] Authentication failed for {}", operation_name);
                Err(KrakenError::AuthenticationFailed)
            }
            status => {
                let error_text = response.text().await.unwrap_or_default();
                error!("❌ [KRAKEN ERROR] Status {}: {}", status, error_text);
                Err(KrakenError::ApiError {
                    status: status.as_u16(),
                    message: error_text,
                })
            }
        }
    }

    /// Retry a request with exponential backoff
    async fn retry_request<F, Fut>(&self, mut request_fn: F) -> KrakenResult<reqwest::Response>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
    {
        let mut attempts = 0;
        let mut delay = self.retry_delay;

        loop {
            attempts += 1;
            match request_fn().await {
                Ok(response) => return Ok(response),
                Err(e) if attempts >= self.max_retries => {
                    error!("Request failed after {} attempts: {}", attempts, e);
                    return Err(KrakenError::HttpError(e));
                }
                Err(e) => {
                    warn!(
                        "Request failed (attempt {}/{}): {}. Retrying in {:?}",
                        attempts, self.max_retries, e, delay
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
            }
        }
    }

    /// Set custom retry configuration
    #[must_use]
    pub fn with_retry_config(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_delay = retry_delay;
        self
    }
}
