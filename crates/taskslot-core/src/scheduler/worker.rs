//! Provider calls on a dedicated thread.
//!
//! The provider is moved onto its own thread so a lookup can be abandoned
//! once its bound passes. Requests are numbered; a reply that arrives after
//! its caller gave up is dropped when the next lookup reads the channel.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration as StdDuration, Instant};

use chrono::Duration;

use crate::error::ProviderError;
use crate::provider::{AvailabilityProvider, Slot};

enum Request {
    FindSlot { id: u64, duration: Duration },
    Commit(Slot),
}

struct Reply {
    id: u64,
    result: Result<Option<Slot>, ProviderError>,
}

/// Handle to the thread that owns the provider.
///
/// Dropping the handle closes the request channel; the thread exits once
/// its current call returns.
pub(crate) struct ProviderWorker {
    name: String,
    requests: Sender<Request>,
    replies: Receiver<Reply>,
    next_id: u64,
}

impl ProviderWorker {
    pub(crate) fn spawn<P>(mut provider: P) -> Self
    where
        P: AvailabilityProvider + Send + 'static,
    {
        let name = provider.name().to_string();
        let (requests, request_rx) = mpsc::channel::<Request>();
        let (reply_tx, replies) = mpsc::channel();

        thread::spawn(move || {
            for request in request_rx {
                match request {
                    Request::FindSlot { id, duration } => {
                        let result = provider.find_slot(duration);
                        if reply_tx.send(Reply { id, result }).is_err() {
                            break;
                        }
                    }
                    Request::Commit(slot) => provider.commit(&slot),
                }
            }
        });

        Self {
            name,
            requests,
            replies,
            next_id: 0,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Ask for a slot, waiting at most `limit` when one is given.
    pub(crate) fn find_slot(
        &mut self,
        duration: Duration,
        limit: Option<StdDuration>,
    ) -> Result<Option<Slot>, ProviderError> {
        self.next_id += 1;
        let id = self.next_id;
        self.requests
            .send(Request::FindSlot { id, duration })
            .map_err(|_| self.stopped())?;

        let deadline = limit.map(|limit| (limit, Instant::now() + limit));
        loop {
            let reply = match deadline {
                Some((limit, deadline)) => {
                    let left = deadline.saturating_duration_since(Instant::now());
                    match self.replies.recv_timeout(left) {
                        Ok(reply) => reply,
                        Err(RecvTimeoutError::Timeout) => {
                            return Err(ProviderError::timed_out(limit))
                        }
                        Err(RecvTimeoutError::Disconnected) => return Err(self.stopped()),
                    }
                }
                None => self.replies.recv().map_err(|_| self.stopped())?,
            };
            if reply.id == id {
                return reply.result;
            }
            tracing::debug!(request = reply.id, "dropping late provider reply");
        }
    }

    /// Queue a commit. It reaches the provider before any later lookup.
    pub(crate) fn commit(&self, slot: Slot) {
        if self.requests.send(Request::Commit(slot)).is_err() {
            tracing::warn!(provider = %self.name, "provider thread gone, commit dropped");
        }
    }

    fn stopped(&self) -> ProviderError {
        ProviderError::Unavailable(format!("provider '{}' stopped responding", self.name))
    }
}
