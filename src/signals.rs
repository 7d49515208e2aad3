use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{Stream, StreamExt};
use nix::libc::c_int;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use signal_hook::consts::signal::*;
use tracing::{info, warn};

/// Signals relayed to the supervised process group while a command runs.
///
/// Every asynchronous, process-directed signal is here. SIGCHLD is left to
/// the zombie reaper, and fault signals aimed at the supervisor itself
/// (ILL, FPE, SEGV, BUS, ABRT, TRAP, SYS) keep their default dispositions,
/// as do the unhookable KILL and STOP.
pub const FORWARDED_SIGNALS: &[c_int] = &[
    SIGHUP, SIGINT, SIGQUIT, SIGUSR1, SIGUSR2, SIGPIPE, SIGALRM, SIGTERM,
    SIGTSTP, SIGTTIN, SIGTTOU, SIGURG, SIGXCPU, SIGXFSZ, SIGVTALRM, SIGPROF,
    SIGWINCH, SIGIO, SIGCONT,
];

/// Where forwarded signals end up. The production target is a process
/// group; tests substitute a recorder.
#[async_trait]
pub trait SignalTarget: Send + Sync {
    async fn deliver(&self, sig: Signal);
}

/// Broadcasts each signal to an entire process group, so the supervised
/// command's own descendants receive it too.
pub struct ProcessGroup {
    pgid: i32,
}

impl ProcessGroup {
    pub fn new(pgid: i32) -> Self {
        Self { pgid }
    }
}

#[async_trait]
impl SignalTarget for ProcessGroup {
    async fn deliver(&self, sig: Signal) {
        // Negative pid addresses the whole group. A vanished group is not
        // an error worth dying over; log it and move on.
        if let Err(err) = kill(Pid::from_raw(-self.pgid), sig) {
            warn!(pgid = self.pgid, signal = %sig, error = %err, "failed to forward signal");
        }
    }
}

/*
    @@@
    @relay();
    . Reads raw signal numbers off the stream until it is closed.
    . Holds SIGTERM for the configured grace period before delivery, giving
      the supervised process a window to shut down on its own first.
    . Delivers every signal exactly once, in arrival order; the grace sleep
      blocks this loop, so later signals queue behind it.
*/
pub async fn relay<S, T>(mut signals: S, target: T, grace: Duration)
where
    S: Stream<Item = c_int> + Unpin,
    T: SignalTarget,
{
    while let Some(raw) = signals.next().await {
        let sig = match Signal::try_from(raw) {
            Ok(sig) => sig,
            Err(err) => {
                warn!(raw, error = %err, "received unknown signal number, dropping");
                continue;
            }
        };

        if sig == Signal::SIGTERM && !grace.is_zero() {
            info!(grace = ?grace, "received SIGTERM, holding it for the grace period");
            tokio::time::sleep(grace).await;
        }

        target.deliver(sig).await;
    }
}
