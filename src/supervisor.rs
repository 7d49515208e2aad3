use std::fmt;
use std::sync::atomic::AtomicI32;
use std::sync::Arc;

use tracing::{error, info};

use crate::config::Config;
use crate::reaper::{self, Foreground};
use crate::runner;

/// The three sequential command phases, logged by name on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    PreStart,
    Main,
    PostStop,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::PreStart => write!(f, "pre-start"),
            Phase::Main => write!(f, "main"),
            Phase::PostStop => write!(f, "post-stop"),
        }
    }
}

/*
    @@@
    @supervise();
    . Starts the zombie reaper, then runs pre-start, main and post-stop
      strictly in sequence, never concurrently.
    . A pre-start failure skips main and post-stop and quits with code 1.
    . A main failure is recorded as code 1 but post-stop still runs.
    . A post-stop failure overrides whatever code main produced.
    . Stops the reaper and blocks on its acknowledgment before returning;
      the returned code is the process exit code, decided nowhere else.
*/
pub async fn supervise(cfg: &Config) -> i32 {
    let foreground: Foreground = Arc::new(AtomicI32::new(0));
    let reaper = reaper::spawn(foreground.clone());

    if let Some(pre) = &cfg.pre_start {
        if !run_phase(Phase::PreStart, pre, cfg, &foreground).await {
            reaper.shutdown().await;
            return 1;
        }
    } else {
        info!(phase = %Phase::PreStart, "no command defined, skip");
    }

    let mut code = 0;
    if !run_phase(Phase::Main, &cfg.main, cfg, &foreground).await {
        code = 1;
    }

    if let Some(post) = &cfg.post_stop {
        if !run_phase(Phase::PostStop, post, cfg, &foreground).await {
            code = 1;
        }
    } else {
        info!(phase = %Phase::PostStop, "no command defined, skip");
    }

    reaper.shutdown().await;
    code
}

async fn run_phase(
    phase: Phase,
    command: &str,
    cfg: &Config,
    foreground: &Foreground,
) -> bool {
    info!(phase = %phase, command = %command, "command launched");
    match runner::run(command, cfg, foreground).await {
        Ok(()) => {
            info!(phase = %phase, "command exited");
            true
        }
        Err(err) => {
            error!(phase = %phase, "command failed: {err:#}");
            false
        }
    }
}
