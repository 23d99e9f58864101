//! Warm-sync state of one cluster.

use crate::error::{Error, Result};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::sync::watch;
use tracing::{error, info, warn};

const SYNCING: u8 = 0;
const SYNCED: u8 = 1;

/// One-shot transition from "syncing" to "synced", with an optional
/// terminal error and a completion signal every waiter observes.
#[derive(Debug)]
pub struct SyncState {
    wait: bool,
    state: AtomicU8,
    error: OnceLock<Arc<Error>>,
    done: watch::Sender<bool>,
}

impl SyncState {
    /// `wait = false` makes [`SyncState::wait`] return immediately.
    pub fn new(wait: bool) -> Self {
        let (done, _) = watch::channel(false);
        Self {
            wait,
            state: AtomicU8::new(SYNCING),
            error: OnceLock::new(),
            done,
        }
    }

    pub fn is_synced(&self) -> bool {
        self.state.load(Ordering::Acquire) == SYNCED
    }

    /// Record the warm-sync outcome and release every waiter.
    ///
    /// Only the first call succeeds. Later calls leave the state untouched
    /// and return [`Error::InvariantViolation`].
    pub fn finish(&self, result: Result<()>) -> Result<()> {
        if !self.finish_if_pending(result) {
            error!("cache sync state transitioned twice");
            return Err(Error::InvariantViolation(
                "cache sync state transitioned twice".to_string(),
            ));
        }
        Ok(())
    }

    /// Like [`SyncState::finish`], but a sync that already finished is left
    /// alone without complaint. Returns whether this call made the transition.
    pub fn finish_if_pending(&self, result: Result<()>) -> bool {
        if self
            .state
            .compare_exchange(SYNCING, SYNCED, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        if let Err(err) = result {
            let _ = self.error.set(Arc::new(err));
        }
        self.done.send_replace(true);
        true
    }

    /// Wait for warm-sync to finish and return its outcome.
    ///
    /// Callers bound the wait with `tokio::time::timeout` or by dropping the
    /// future; the sync task itself is unaffected.
    pub async fn wait(&self) -> Result<()> {
        if !self.wait {
            return Ok(());
        }
        if *self.done.borrow() {
            return self.outcome();
        }

        warn!("cache sync not finished, waiting");
        let mut rx = self.done.subscribe();
        let closed = rx.wait_for(|done| *done).await.is_err();
        if closed {
            return Err(Error::InvariantViolation(
                "cache sync signal dropped".to_string(),
            ));
        }
        info!("cache sync finished");
        self.outcome()
    }

    fn outcome(&self) -> Result<()> {
        match self.error.get() {
            Some(err) => Err(Error::SyncFailed(err.clone())),
            None => Ok(()),
        }
    }
}
