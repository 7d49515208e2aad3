use std::process::Stdio;
use std::sync::atomic::Ordering;

use anyhow::{bail, Context, Result};
use signal_hook_tokio::Signals;
use tokio::process::Command;

use crate::config::Config;
use crate::reaper::Foreground;
use crate::signals::{self, ProcessGroup};

/*
    @@@
    @run();
    . Splits the command line on whitespace only (no quoting or escaping;
      arguments containing spaces cannot be expressed).
    . Spawns the command with inherited stdout/stderr, null stdin, the
      supervisor's environment plus the configured extras, and its own
      process group (pgid == its pid) so signals can be broadcast to it
      and its descendants without touching the supervisor.
    . Intercepts incoming signals for the duration of the call and relays
      them to that process group, releasing the interception on return
      regardless of outcome.
    . Returns once the command exits: Ok on exit code 0, otherwise an
      error carrying the spawn failure or the exit status.
*/
pub async fn run(command: &str, cfg: &Config, foreground: &Foreground) -> Result<()> {
    let (program, args) = match split_command(command) {
        Some(parts) => parts,
        None => bail!("empty command line"),
    };

    // Subscribe before spawning so nothing sent in between is lost;
    // pending signals buffer in the stream until the relay task drains it.
    let sigs = Signals::new(signals::FORWARDED_SIGNALS)
        .context("registering signal handlers")?;
    let handle = sigs.handle();

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        // Extras layer over the inherited environment; the platform's
        // override order applies when a name collides.
        .envs(cfg.env.iter().map(|(name, value)| (name, value)))
        .process_group(0);

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(err) => {
            handle.close();
            return Err(err).with_context(|| format!("spawning `{program}`"));
        }
    };

    let pid = match child.id() {
        Some(id) => id as i32,
        None => {
            // Never observed in practice right after spawn; the reaper
            // collects the child since it is not in the foreground slot.
            handle.close();
            bail!("child of `{program}` exited before its pid could be read");
        }
    };
    foreground.store(pid, Ordering::SeqCst);

    let forwarder = tokio::spawn(signals::relay(
        sigs,
        ProcessGroup::new(pid),
        cfg.grace,
    ));

    let status = child.wait().await;
    foreground.store(0, Ordering::SeqCst);

    // Stop intercepting before any other command starts; closing the
    // handle ends the stream, and the relay task finishes any delivery
    // already in flight before exiting.
    handle.close();
    let _ = forwarder.await;

    let status = status.with_context(|| format!("waiting for `{program}`"))?;
    if status.success() {
        Ok(())
    } else {
        bail!("{status}");
    }
}

/// Whitespace is the sole delimiter; the first field is the program.
fn split_command(line: &str) -> Option<(&str, Vec<&str>)> {
    let mut parts = line.split_whitespace();
    let program = parts.next()?;
    Some((program, parts.collect()))
}
