use std::thread;

use crossbeam_channel::{Receiver, TryRecvError};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::data::model::NormalizedObject;
use crate::data::{DateRange, FeedSource, FetchError};

pub type FeedResult = Result<Vec<NormalizedObject>, FetchError>;

/// One in-flight fetch. Dropping the handle cancels the request; a result
/// that lands after that is discarded by the worker.
pub struct FetchHandle {
    rx: Receiver<FeedResult>,
    cancel: CancellationToken,
}

impl FetchHandle {
    pub fn try_recv(&self) -> Result<FeedResult, TryRecvError> {
        self.rx.try_recv()
    }

    pub fn recv_timeout(
        &self,
        timeout: std::time::Duration,
    ) -> Result<FeedResult, crossbeam_channel::RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl Drop for FetchHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Run one fetch on a dedicated thread with its own current-thread runtime.
/// Exactly one result is sent unless the fetch is cancelled first.
pub fn spawn_fetch(source: FeedSource, range: DateRange) -> FetchHandle {
    let (tx, rx) = crossbeam_channel::bounded(1);
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    thread::spawn(move || {
        let rt = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(err) => {
                let _ = tx.send(Err(FetchError::Worker(err.to_string())));
                return;
            }
        };

        let result = rt.block_on(async {
            tokio::select! {
                _ = token.cancelled() => Err(FetchError::Cancelled),
                res = source.fetch(range) => res,
            }
        });

        if token.is_cancelled() {
            debug!(start = %range.start, end = %range.end, "discarding cancelled fetch");
            return;
        }
        if tx.send(result).is_err() {
            debug!("fetch receiver dropped, discarding result");
        }
    });

    FetchHandle { rx, cancel }
}
