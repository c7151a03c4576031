//! # hallbridge-cli: Operator Tooling
//!
//! Provides the `hallbridge` command-line interface for work that does not
//! need a running server.
//!
//! ## Subcommands
//!
//! - `hallbridge plan`: Print the rooms a building or floor-range
//!   provisioning request would create, without writing anything.
//! - `hallbridge stats`: Compute an occupancy report from a JSON export
//!   of rooms.
//!
//! ```bash
//! hallbridge plan building --floors 8 --rooms-per-floor 10 --beds 4
//! hallbridge plan range --floor 2 --start 1 --end 20 --format json
//! hallbridge stats rooms.json --floor 3 --status partial
//! ```

pub mod plan;
pub mod stats;

use clap::ValueEnum;
use serde::Serialize;

/// Output encoding for command results.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

/// Serialize a command result in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    let text = match format {
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
        OutputFormat::Json => {
            let mut s = serde_json::to_string_pretty(value)?;
            s.push('\n');
            s
        }
    };
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn render_json_is_pretty_and_newline_terminated() {
        let out = render(&json!({"rooms": 2}), OutputFormat::Json).unwrap();
        assert_eq!(out, "{\n  \"rooms\": 2\n}\n");
    }

    #[test]
    fn render_yaml() {
        let out = render(&json!({"rooms": 2}), OutputFormat::Yaml).unwrap();
        assert_eq!(out.trim(), "rooms: 2");
    }
}
