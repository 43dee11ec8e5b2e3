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

use thiserror::Error;

/// Kraken GraphQL API error types
#[derive(Error, Debug)]
pub enum KrakenError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Kraken API returned error status {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("GraphQL error during {operation}: {messages}")]
    GraphQl { operation: String, messages: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("No session token, call authenticate() first")]
    MissingToken,

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type KrakenResult<T> = Result<T, KrakenError>;
