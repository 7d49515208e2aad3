use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use nix::errno::Errno;
use nix::sys::wait::{waitid, waitpid, Id, WaitPidFlag, WaitStatus};
use tokio::sync::{oneshot, watch};
use tokio::time::{sleep, Duration};
use tracing::{info, warn};

// Shared slot holding the pid of the command currently awaited by the
// runner. Zero when no command is in flight.
pub type Foreground = Arc<AtomicI32>;

const REAP_INTERVAL: Duration = Duration::from_secs(1);

/// Handle held by the orchestrator. Dropping it without calling
/// `shutdown()` leaves the loop running, so the orchestrator must drain
/// before deciding the final exit code.
pub struct ReaperHandle {
    stop: watch::Sender<bool>,
    done: oneshot::Receiver<()>,
}

impl ReaperHandle {
    /// Raise the stop flag and block until the loop acknowledges. The
    /// acknowledgment is sent exactly once, after the loop's final
    /// iteration completes.
    pub async fn shutdown(self) {
        let _ = self.stop.send(true);
        let _ = self.done.await;
    }
}

/*
    @@@
    @spawn();
    . Starts the background reap loop for the lifetime of the whole
      supervised session, across all command phases.
    . `foreground` names the child the runner is currently waiting on;
      the loop never consumes that child's exit status.
    . Returns the handle used to stop the loop and await its acknowledgment.
*/
pub fn spawn(foreground: Foreground) -> ReaperHandle {
    let (stop_tx, mut stop_rx) = watch::channel(false);
    let (done_tx, done_rx) = oneshot::channel();

    tokio::spawn(async move {
        loop {
            drain(&foreground);

            // Check before pausing, and observe the flag during the pause.
            if *stop_rx.borrow() {
                break;
            }
            tokio::select! {
                _ = stop_rx.changed() => break,
                _ = sleep(REAP_INTERVAL) => {}
            }
        }
        let _ = done_tx.send(());
    });

    ReaperHandle {
        stop: stop_tx,
        done: done_rx,
    }
}

/*
    @@@
    @drain();
    . Non-blocking sweep over every child that has already exited, so all
      currently-reapable zombies go in one pass without sleeping between.
    . Peeks with WNOWAIT first: the runner's direct child is left in place
      so its exit status is collected by the runner's wait, not lost here.
*/
fn drain(foreground: &AtomicI32) {
    loop {
        let peeked = waitid(
            Id::All,
            WaitPidFlag::WEXITED | WaitPidFlag::WNOHANG | WaitPidFlag::WNOWAIT,
        );

        let pid = match peeked {
            Ok(WaitStatus::Exited(pid, _)) | Ok(WaitStatus::Signaled(pid, _, _)) => pid,
            // StillAlive: children exist but none is reapable right now
            Ok(_) => break,
            Err(Errno::ECHILD) => break,
            Err(err) => {
                warn!(error = %err, "waitid failed");
                break;
            }
        };

        if pid.as_raw() == foreground.load(Ordering::SeqCst) {
            // The runner's own wait takes precedence for its direct child.
            break;
        }

        match waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::Exited(pid, code)) => {
                info!(pid = pid.as_raw(), exit_code = code, "reaped orphaned child");
            }
            Ok(WaitStatus::Signaled(pid, sig, _)) => {
                info!(pid = pid.as_raw(), signal = ?sig, "reaped orphaned child killed by signal");
            }
            Ok(_) => {}
            Err(Errno::ECHILD) => break,
            Err(err) => {
                warn!(pid = pid.as_raw(), error = %err, "waitpid failed");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn shutdown_is_acknowledged() {
        let handle = spawn(Arc::new(AtomicI32::new(0)));
        tokio::time::timeout(Duration::from_secs(5), handle.shutdown())
            .await
            .expect("reaper did not acknowledge stop");
    }

    #[test]
    fn drain_with_no_children_returns() {
        // ECHILD path: nothing to reap, nothing to block on.
        drain(&AtomicI32::new(0));
    }
}
