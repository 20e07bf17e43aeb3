//! Shutdown coordination between the download and conversion stages.
//!
//! ```text
//! Downloading --close()--> Draining --finish()--> Done
//! ```
//!
//! `close` consumes the coordinator and `finish` consumes the [`Draining`]
//! token, so each transition can happen at most once.

use std::time::{Duration, Instant};

use super::staging::StagingSender;

/// Owns the last staging sender held outside a download task.
#[derive(Debug)]
pub struct ShutdownCoordinator {
    sender: StagingSender,
}

impl ShutdownCoordinator {
    pub fn new(sender: StagingSender) -> Self {
        Self { sender }
    }

    /// A sender for the dispatcher to hand out to download tasks.
    pub fn producer(&self) -> StagingSender {
        self.sender.clone()
    }

    /// Drop the coordinator's sender and enter `Draining`.
    ///
    /// Call only after every download task has been joined. The channel is
    /// closed once all producer clones are gone, which is then immediate.
    pub fn close(self) -> Draining {
        drop(self.sender);
        tracing::debug!("All downloads finished, staging channel closed");
        Draining {
            since: Instant::now(),
        }
    }
}

/// Token for the `Draining` phase: the channel is closed and workers are
/// consuming what is left.
#[derive(Debug)]
pub struct Draining {
    since: Instant,
}

impl Draining {
    /// Enter `Done`. Call after the worker pool has been joined.
    ///
    /// Returns how long the workers kept converting after the last download.
    pub fn finish(self) -> Duration {
        let drained = self.since.elapsed();
        tracing::debug!("All conversion workers exited {:?} after close", drained);
        drained
    }
}
