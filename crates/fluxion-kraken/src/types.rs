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

//! GraphQL envelopes and payload types of the Kraken API

use fluxion_offpeak::RawDispatch;
use serde::{Deserialize, Serialize};

/// Standard GraphQL response envelope
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,

    #[serde(default)]
    pub errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlError {
    #[serde(default = "default_error_message")]
    pub message: String,
}

fn default_error_message() -> String {
    "Unknown error".to_string()
}

/// Join all error messages of a response, or `None` when there are none
pub(crate) fn joined_messages(errors: Option<&[GraphQlError]>) -> Option<String> {
    let errors = errors.filter(|e| !e.is_empty())?;
    Some(
        errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join(", "),
    )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TokenData {
    pub obtain_kraken_token: Option<TokenPayload>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenPayload {
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FlexDispatchData {
    #[serde(default)]
    pub flex_planned_dispatches: Option<Vec<RawDispatch>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DevicesData {
    #[serde(default)]
    pub devices: Option<Vec<Device>>,
}

/// A smart device registered to an account (EV charger, car, heat pump, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub integration_device_id: Option<String>,
    #[serde(default)]
    pub property_id: Option<String>,
}
