use std::time::Duration;

use anyhow::{bail, Result};

/// Immutable supervision configuration.
///
/// Built once from the command-line flags, validated, and then passed by
/// reference into the core; no component reads process-wide mutable state.
#[derive(Debug, Clone)]
pub struct Config {
    /// Command run before the main command. `None` skips the phase.
    pub pre_start: Option<String>,
    /// The supervised main command. Must be non-empty.
    pub main: String,
    /// Command run after the main command exits. `None` skips the phase.
    pub post_stop: Option<String>,
    /// Delay between receiving SIGTERM and forwarding it to the child's
    /// process group. Zero forwards immediately.
    pub grace: Duration,
    /// Extra NAME=VALUE pairs appended to the supervisor's own environment
    /// for each spawned command, in flag order. Duplicates are allowed;
    /// a later pair wins because it is applied last.
    pub env: Vec<(String, String)>,
}

impl Config {
    /*
        @@@
        @validate();
        . The only fatal configuration error: a missing main command.
        . Checked before the reaper starts, so no child is ever spawned
          for an invalid configuration.
    */
    pub fn validate(&self) -> Result<()> {
        if self.main.trim().is_empty() {
            bail!("no main command defined");
        }
        Ok(())
    }
}
