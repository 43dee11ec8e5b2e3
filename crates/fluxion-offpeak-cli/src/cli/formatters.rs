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
use chrono::Duration;
use comfy_table::{Attribute, Cell, Color, Table, presets::UTF8_FULL};
use fluxion_kraken::Device;
use fluxion_offpeak::DispatchPlan;

const TABLE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M %Z";

/// Formatter for pretty terminal tables
#[derive(Debug)]
pub struct TableFormatter;

/// Formatter for machine-readable JSON
#[derive(Debug)]
pub struct JsonFormatter;

impl TableFormatter {
    /// Format the devices of an account
    pub fn format_devices(devices: &[Device]) -> String {
        if devices.is_empty() {
            return "No devices found for this account.".to_string();
        }

        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec![
            Cell::new("Device ID").add_attribute(Attribute::Bold),
            Cell::new("Name").add_attribute(Attribute::Bold),
            Cell::new("Type").add_attribute(Attribute::Bold),
            Cell::new("Provider").add_attribute(Attribute::Bold),
            Cell::new("Integration\nDevice ID").add_attribute(Attribute::Bold),
            Cell::new("Property ID").add_attribute(Attribute::Bold),
        ]);

        for device in devices {
            table.add_row(vec![
                Cell::new(&device.id).fg(Color::Green),
                Cell::new(or_dash(device.name.as_deref())),
                Cell::new(or_dash(device.device_type.as_deref())),
                Cell::new(or_dash(device.provider.as_deref())),
                Cell::new(or_dash(device.integration_device_id.as_deref())),
                Cell::new(or_dash(device.property_id.as_deref())),
            ]);
        }

        format!("Found {} device(s):\n{table}", devices.len())
    }

    /// Format the windows of a plan, marking the next run
    pub fn format_plan(plan: &DispatchPlan) -> String {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec![
            Cell::new("Start").add_attribute(Attribute::Bold),
            Cell::new("End").add_attribute(Attribute::Bold),
            Cell::new("Duration").add_attribute(Attribute::Bold),
        ]);

        for (idx, window) in plan.windows.iter().enumerate() {
            let row = vec![
                Cell::new(window.start().format(TABLE_TIME_FORMAT)),
                Cell::new(window.end().format(TABLE_TIME_FORMAT)),
                Cell::new(format_duration(window.duration())),
            ];
            if idx == 0 {
                table.add_row(
                    row.into_iter()
                        .map(|c| c.fg(Color::Green).add_attribute(Attribute::Bold)),
                );
            } else {
                table.add_row(row);
            }
        }

        table.add_row(vec![
            Cell::new("Total").add_attribute(Attribute::Bold),
            Cell::new(""),
            Cell::new(format_duration(plan.windows.total_duration())).add_attribute(Attribute::Bold),
        ]);

        table.to_string()
    }
}

impl JsonFormatter {
    /// Serialize a plan, pretty-printed unless `compact`
    pub fn format_plan(plan: &DispatchPlan, compact: bool) -> Result<String> {
        let json = if compact {
            serde_json::to_string(plan)
        } else {
            serde_json::to_string_pretty(plan)
        };
        json.context("Failed to serialize plan")
    }
}

fn format_duration(duration: Duration) -> String {
    format!(
        "{}h {:02}m",
        duration.num_hours(),
        duration.num_minutes() % 60
    )
}

fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}
