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

mod cli;
mod config;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use fluxion_kraken::{KrakenClient, KrakenDispatchSource};
use fluxion_offpeak::{DispatchPlan, WindowSource, plan_dispatches};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{
    Cli, Commands, DevicesArgs, JsonFileSource, JsonFormatter, NextRunArgs, OutputArgs, PlanArgs,
    TableFormatter,
};
use config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    init_tracing(&config.system.log_level)?;
    match &config.source {
        Some(path) => info!("✅ Loaded configuration from {}", path.display()),
        None => info!("No configuration file found, using defaults with environment overrides"),
    }

    match cli.command {
        Commands::NextRun(args) => next_run_command(&config, args).await,
        Commands::Devices(args) => devices_command(&config, args).await,
        Commands::Plan(args) => plan_command(&config, args).await,
    }
}

/// Diagnostics go to stderr so stdout carries only results
fn init_tracing(log_level: &str) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install tracing subscriber")
}

async fn next_run_command(config: &AppConfig, args: NextRunArgs) -> Result<()> {
    let device_id = match args.device_id {
        Some(id) => id,
        None => config.device_id()?.to_string(),
    };
    let client = KrakenClient::from_config(config.system.api_url.clone())?;
    let source = KrakenDispatchSource::connect(client, config.api_key()?).await?;

    let plan = plan_from_source(&source, &device_id, config, &args.output).await?;
    println!("{}", JsonFormatter::format_plan(&plan, args.output.compact)?);
    Ok(())
}

async fn devices_command(config: &AppConfig, args: DevicesArgs) -> Result<()> {
    let account_number = match args.account {
        Some(account) => account,
        None => config.account_number()?.to_string(),
    };
    let client = KrakenClient::from_config(config.system.api_url.clone())?
        .authenticate(config.api_key()?)
        .await
        .context("Failed to obtain Kraken session token")?;

    let devices = client
        .account_devices(&account_number)
        .await
        .with_context(|| format!("Failed to fetch devices for account {account_number}"))?;

    println!("{}", TableFormatter::format_devices(&devices));
    Ok(())
}

async fn plan_command(config: &AppConfig, args: PlanArgs) -> Result<()> {
    let source = JsonFileSource::new(&args.from_json);
    let device_id = config.account.device_id.as_deref().unwrap_or("local");

    let plan = plan_from_source(&source, device_id, config, &args.output).await?;
    eprintln!("{}", TableFormatter::format_plan(&plan));
    println!("{}", JsonFormatter::format_plan(&plan, args.output.compact)?);
    Ok(())
}

/// Fetch the raw windows, then plan them against a single `now`
async fn plan_from_source(
    source: &dyn WindowSource,
    device_id: &str,
    config: &AppConfig,
    output: &OutputArgs,
) -> Result<DispatchPlan> {
    let zone = config.timezone()?;
    let schedule = config.schedule()?;

    let raw = source.dispatch_windows(device_id).await?;
    info!(
        "Fetched {} dispatch(es) for {} from {}",
        raw.len(),
        device_id,
        source.name()
    );

    let now = output.now.unwrap_or_else(Utc::now);
    plan_dispatches(&raw, zone, &schedule, now).context("Failed to plan charge windows")
}
