use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use super::{LoadError, LoadState, Outcome, RemoteSource, check_unique_ids};
use crate::core::item::Item;
use crate::core::list::ListStore;
use crate::message::{Message, Settlement};

/// Identity of one load attempt. Minted fresh by every `start_load`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttemptId(u64);

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct Attempt {
    id: AttemptId,
    cancel: CancellationToken,
}

/// Owns the single in-flight load attempt and the load state.
///
/// Attempts run on the tokio runtime and report back through the widget's
/// event queue as [`Message::LoadSettled`]. A settlement only takes effect if
/// its attempt is still the current one; anything else is dropped.
pub struct FetchCoordinator<S> {
    source: Arc<S>,
    events: UnboundedSender<Message>,
    timeout: Option<Duration>,
    state: LoadState,
    current: Option<Attempt>,
    minted: u64,
    last_loaded: Option<NaiveDateTime>,
}

impl<S: RemoteSource> FetchCoordinator<S> {
    pub fn new(
        source: Arc<S>,
        events: UnboundedSender<Message>,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            source,
            events,
            timeout,
            state: LoadState::Idle,
            current: None,
            minted: 0,
            last_loaded: None,
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn last_loaded(&self) -> Option<NaiveDateTime> {
        self.last_loaded
    }

    /// The attempt whose settlement would currently be applied, if any.
    pub fn in_flight(&self) -> Option<AttemptId> {
        self.current.as_ref().map(|attempt| attempt.id)
    }

    /// Supersedes any outstanding attempt and starts a new one.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_load(&mut self) -> AttemptId {
        if let Some(previous) = self.current.take() {
            log::debug!("Load attempt {} superseded", previous.id);
            previous.cancel.cancel();
        }

        self.minted += 1;
        let id = AttemptId(self.minted);
        let cancel = CancellationToken::new();
        self.current = Some(Attempt {
            id,
            cancel: cancel.clone(),
        });
        self.state = LoadState::Loading;
        log::info!("Starting load attempt {}", id);

        let source = Arc::clone(&self.source);
        let events = self.events.clone();
        let timeout = self.timeout;
        tokio::spawn(async move {
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => Outcome::Cancelled,
                result = fetch(source.as_ref(), timeout) => match result {
                    Ok(items) => Outcome::Loaded(items),
                    Err(e) => Outcome::Failed(e),
                },
            };
            // A closed queue means the widget is gone; nothing left to notify.
            let _ = events.send(Message::LoadSettled(Settlement { attempt: id, outcome }));
        });

        id
    }

    /// Applies a settlement if its attempt is still current.
    ///
    /// Returns true when shared state was touched.
    pub fn settle(&mut self, settlement: Settlement, list: &mut ListStore) -> bool {
        let Settlement { attempt, outcome } = settlement;
        if self.in_flight() != Some(attempt) {
            log::debug!("Discarding settlement of stale load attempt {}", attempt);
            return false;
        }
        self.current = None;

        match outcome {
            Outcome::Loaded(items) => {
                log::info!("Load attempt {} returned {} items", attempt, items.len());
                self.state = LoadState::Loaded;
                self.last_loaded = Some(chrono::Local::now().naive_local());
                list.replace_all(items);
                true
            }
            Outcome::Failed(e) => {
                log::warn!("Load attempt {} failed: {}", attempt, e);
                self.state = LoadState::Failed(e.to_string());
                true
            }
            Outcome::Cancelled => {
                log::debug!("Load attempt {} observed cancellation", attempt);
                false
            }
        }
    }

    /// Cancels the outstanding attempt, if any, without touching load state.
    pub fn cancel(&mut self) {
        if let Some(attempt) = self.current.take() {
            log::debug!("Cancelling load attempt {}", attempt.id);
            attempt.cancel.cancel();
        }
    }
}

impl<S> Drop for FetchCoordinator<S> {
    fn drop(&mut self) {
        if let Some(attempt) = self.current.take() {
            attempt.cancel.cancel();
        }
    }
}

async fn fetch<S: RemoteSource>(
    source: &S,
    timeout: Option<Duration>,
) -> Result<Vec<Item>, LoadError> {
    let items = match timeout {
        Some(limit) => tokio::time::timeout(limit, source.load_items())
            .await
            .map_err(|_| LoadError::TimedOut(limit))??,
        None => source.load_items().await?,
    };
    check_unique_ids(&items)?;
    Ok(items)
}
