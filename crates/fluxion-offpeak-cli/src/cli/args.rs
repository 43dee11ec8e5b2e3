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

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fluxion-offpeak")]
#[command(version)]
#[command(about = "Plan smart-tariff EV charge windows around the nightly off-peak window")]
#[command(
    long_about = "Merges the fixed nightly off-peak window with the planned dispatches of an\n\
    Intelligent Octopus smart device and reports the next charge window.\n\
    \nThe plan is written to stdout as JSON; diagnostics go to stderr.\n\
    \nExamples:\n  \
    fluxion-offpeak next-run                           # Plan using config.toml\n  \
    fluxion-offpeak devices                            # Find your device id\n  \
    fluxion-offpeak plan --from-json dispatches.json   # Offline planning"
)]
pub struct Cli {
    /// Path to the TOML configuration file (defaults to ./config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch planned dispatches and print the next charge window
    #[command(
        long_about = "Authenticate with the Kraken API, fetch the planned dispatches of the\n\
        configured device and print the sanitized plan.\n\
        \nExamples:\n  \
        fluxion-offpeak next-run\n  \
        fluxion-offpeak next-run --device-id 00000000-0000-0000-0000-000000000001\n  \
        fluxion-offpeak next-run --now 2025-01-15T20:00:00Z --compact"
    )]
    NextRun(NextRunArgs),

    /// List the smart devices registered to the account
    Devices(DevicesArgs),

    /// Plan from a local JSON file of dispatches, without network access
    #[command(
        long_about = "Run the planner on dispatches stored in a JSON file.\n\
        \nThe file holds either an array of {start, end} objects or the\n\
        `flexPlannedDispatches` response object of the API.\n\
        \nExamples:\n  \
        fluxion-offpeak plan --from-json dispatches.json\n  \
        fluxion-offpeak plan --from-json dispatches.json --now 2025-01-15T18:00:00Z"
    )]
    Plan(PlanArgs),
}

#[derive(Args)]
pub struct NextRunArgs {
    /// Device to plan for (overrides account.device_id)
    #[arg(long)]
    pub device_id: Option<String>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args)]
pub struct DevicesArgs {
    /// Account number (overrides account.account_number)
    #[arg(long)]
    pub account: Option<String>,
}

#[derive(Args)]
pub struct PlanArgs {
    /// JSON file with the dispatch windows
    #[arg(long)]
    pub from_json: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Default)]
pub struct OutputArgs {
    /// Plan as if the current time were this instant
    #[arg(long, value_parser = parse_now)]
    pub now: Option<DateTime<Utc>>,

    /// Print single-line JSON instead of pretty-printed output
    #[arg(long)]
    pub compact: bool,
}

fn parse_now(value: &str) -> Result<DateTime<Utc>, String> {
    fluxion_offpeak::parse_instant(value)
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_next_run() {
        let cli = Cli::parse_from([
            "fluxion-offpeak",
            "next-run",
            "--device-id",
            "dev-1",
            "--now",
            "2025-01-15T20:00:00Z",
            "--compact",
        ]);

        match cli.command {
            Commands::NextRun(args) => {
                assert_eq!(args.device_id.as_deref(), Some("dev-1"));
                assert_eq!(
                    args.output.now,
                    Some(Utc.with_ymd_and_hms(2025, 1, 15, 20, 0, 0).unwrap())
                );
                assert!(args.output.compact);
            }
            _ => panic!("expected next-run"),
        }
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli = Cli::parse_from([
            "fluxion-offpeak",
            "plan",
            "--from-json",
            "dispatches.json",
            "--config",
            "custom.toml",
        ]);

        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        assert!(matches!(cli.command, Commands::Plan(_)));
    }

    #[test]
    fn test_now_accepts_offset_format() {
        let now = parse_now("2025-06-15 18:00:00+0100").unwrap();
        assert_eq!(now, Utc.with_ymd_and_hms(2025, 6, 15, 17, 0, 0).unwrap());
    }

    #[test]
    fn test_now_rejects_naive_time() {
        assert!(parse_now("2025-06-15 18:00:00").is_err());
    }
}
