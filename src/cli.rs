// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! The flags are the only configuration input: there is deliberately no
//! configuration file. `into_config()` turns the parsed flags into the
//! validated [`Config`] the supervision core consumes.

use std::time::Duration;

use clap::Parser;

use crate::config::Config;

/// Command-line arguments for `minit`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "minit",
    version,
    about = "Minimal init: reap zombies, run pre/main/post commands in sequence, forward signals.",
    long_about = None
)]
pub struct CliArgs {
    /// Pre-start command, run before the main command. Skipped when unset.
    #[arg(long, value_name = "CMD")]
    pub pre: Option<String>,

    /// The supervised main command. Split on whitespace only; arguments
    /// containing spaces cannot be expressed.
    #[arg(long, value_name = "CMD")]
    pub main: Option<String>,

    /// Post-stop command, run after the main command exits. Skipped when unset.
    #[arg(long, value_name = "CMD")]
    pub post: Option<String>,

    /// Wait this long before forwarding SIGTERM to the main command,
    /// e.g. `500ms`, `10s`, `1m`. A bare number means seconds.
    #[arg(long, value_name = "DUR", default_value = "0s", value_parser = parse_grace)]
    pub term_timeout: Duration,

    /// Environment variable NAME=VALUE for the supervised commands
    /// (can be used multiple times).
    #[arg(long = "env", value_name = "NAME=VALUE", value_parser = parse_env_pair)]
    pub env: Vec<(String, String)>,
}

impl CliArgs {
    /// Build the immutable `Config` consumed by the core. Empty command
    /// strings count as unset, matching the flag defaults; a missing main
    /// command is the one fatal configuration error.
    pub fn into_config(self) -> anyhow::Result<Config> {
        let cfg = Config {
            pre_start: self.pre.filter(|s| !s.trim().is_empty()),
            main: self.main.unwrap_or_default(),
            post_stop: self.post.filter(|s| !s.trim().is_empty()),
            grace: self.term_timeout,
            env: self.env,
        };
        cfg.validate()?;
        Ok(cfg)
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

/// Parse a duration like `"250ms"`, `"2s"`, `"1m"`, `"2h"`; a bare
/// integer means seconds.
fn parse_grace(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .unwrap_or(s.len());
    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{num_part}': {e}"))?;

    match unit_part.trim() {
        "" | "s" => Ok(Duration::from_secs(value)),
        "ms" => Ok(Duration::from_millis(value)),
        "m" => Ok(Duration::from_secs(value * 60)),
        "h" => Ok(Duration::from_secs(value * 60 * 60)),
        unit => Err(format!(
            "unsupported duration unit '{unit}'; expected ms, s, m, or h"
        )),
    }
}

/// Split a `NAME=VALUE` assignment; the name must be non-empty, the value
/// may be empty.
fn parse_env_pair(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.is_empty() => {
            Ok((name.to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got '{s}'")),
    }
}
