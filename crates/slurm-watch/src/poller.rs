//! Generic poller.
//!
//! A [`Poller`] turns a [`ResourceAdapter`] into a stream of change events.
//! Every call to [`Poller::watch`] spawns one task that owns a fresh
//! [`StateTable`] and is the only sender on the returned channel.
//!
//! Lifecycle: `Created -> Polling -> Terminated`. The task stops when the
//! cancellation token fires, when the receiver is dropped, or when
//! `max_events` have been emitted. A dropped receiver is noticed while
//! waiting for the next tick, so an idle watch stops too. Dropping the
//! task's sender is what closes the channel, so it is closed exactly once
//! on every exit path.

use crate::adapter::{EventOf, ResourceAdapter};
use crate::differ::{Diff, DiffPolicy, diff};
use crate::error::WatchError;
use crate::options::WatchOptions;
use crate::state::StateTable;
use chrono::Utc;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};

/// Default interval between two polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default floor for any requested poll interval
pub const DEFAULT_MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Default event channel capacity
pub const DEFAULT_BUFFER_SIZE: usize = 100;

/// Periodic snapshot poller for one resource kind.
///
/// # Backpressure
///
/// The event channel is bounded. When the consumer stops draining it, the
/// poller blocks on send and the next poll is delayed until there is room.
/// Slow consumers therefore slow down polling; events are never dropped and
/// memory does not grow without bound.
pub struct Poller<A> {
    adapter: Arc<A>,
    poll_interval: Duration,
    min_poll_interval: Duration,
    buffer_size: usize,
}

impl<A> Clone for Poller<A> {
    fn clone(&self) -> Self {
        Self {
            adapter: Arc::clone(&self.adapter),
            poll_interval: self.poll_interval,
            min_poll_interval: self.min_poll_interval,
            buffer_size: self.buffer_size,
        }
    }
}

impl<A: fmt::Debug> fmt::Debug for Poller<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Poller")
            .field("adapter", &self.adapter)
            .field("poll_interval", &self.poll_interval)
            .field("min_poll_interval", &self.min_poll_interval)
            .field("buffer_size", &self.buffer_size)
            .finish()
    }
}

impl<A: ResourceAdapter> Poller<A> {
    /// Create a poller with default interval, floor and buffer size
    pub fn new(adapter: A) -> Self {
        Self {
            adapter: Arc::new(adapter),
            poll_interval: DEFAULT_POLL_INTERVAL,
            min_poll_interval: DEFAULT_MIN_POLL_INTERVAL,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    /// Set the interval between polls
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the floor applied to the poller's and each watch's interval
    #[must_use]
    pub fn with_min_poll_interval(mut self, floor: Duration) -> Self {
        self.min_poll_interval = floor;
        self
    }

    /// Set the event channel capacity
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Adapter shared by every watch of this poller
    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Interval a watch with these options will actually use
    pub fn effective_interval(&self, options: &WatchOptions<A::Filter>) -> Duration {
        options
            .poll_interval
            .unwrap_or(self.poll_interval)
            .max(self.min_poll_interval)
    }

    /// Start watching.
    ///
    /// Validates the options, spawns the polling task and returns the
    /// receiving end of its channel immediately. Must be called from within
    /// a Tokio runtime. The watch runs until `token` is cancelled, the
    /// receiver is dropped, or `max_events` is reached.
    pub fn watch(
        &self,
        token: CancellationToken,
        options: WatchOptions<A::Filter>,
    ) -> Result<mpsc::Receiver<EventOf<A>>, WatchError> {
        if self.buffer_size == 0 {
            return Err(WatchError::InvalidConfig("buffer size must be greater than zero".to_string()));
        }
        if options.max_events == Some(0) {
            return Err(WatchError::InvalidFilter("max_events must be greater than zero".to_string()));
        }
        let interval = self.effective_interval(&options);
        if interval.is_zero() {
            return Err(WatchError::InvalidFilter("poll interval must be greater than zero".to_string()));
        }
        self.adapter.validate(&options.filter)?;

        let (tx, rx) = mpsc::channel(self.buffer_size);
        let kind = self.adapter.kind();
        info!(%kind, ?interval, filter = ?options.filter, "Starting watch");

        let poll_loop = PollLoop {
            adapter: Arc::clone(&self.adapter),
            options,
            table: StateTable::new(),
            seeded: false,
            emitted: 0,
            tx,
            token,
        };
        tokio::spawn(poll_loop.run(interval).instrument(info_span!("poller", %kind)));

        Ok(rx)
    }
}

enum PassOutcome {
    Continue,
    Stop,
}

/// State owned by one running watch task
struct PollLoop<A: ResourceAdapter> {
    adapter: Arc<A>,
    options: WatchOptions<A::Filter>,
    table: StateTable<A::Id>,
    // Set after the first successful snapshot; failed passes don't count as the initial poll
    seeded: bool,
    emitted: usize,
    tx: mpsc::Sender<EventOf<A>>,
    token: CancellationToken,
}

impl<A: ResourceAdapter> PollLoop<A> {
    async fn run(mut self, interval: Duration) {
        // The first tick completes immediately, giving the initial pass.
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                () = self.token.cancelled() => {
                    debug!("Watch cancelled");
                    break;
                }
                () = self.tx.closed() => {
                    debug!("Event receiver dropped");
                    break;
                }
                _ = ticker.tick() => {}
            }

            if let PassOutcome::Stop = self.poll_once().await {
                break;
            }
        }

        info!(emitted = self.emitted, tracked = self.table.len(), "Watch stopped");
    }

    async fn poll_once(&mut self) -> PassOutcome {
        let fetched = tokio::select! {
            biased;
            () = self.token.cancelled() => return PassOutcome::Stop,
            () = self.tx.closed() => return PassOutcome::Stop,
            result = self.adapter.fetch_snapshot(&self.options.filter) => result,
        };

        let snapshot = match fetched {
            Ok(snapshot) => snapshot,
            Err(e) => {
                // A failed list must not look like every resource vanished.
                warn!(error = %e, "Snapshot failed, skipping poll");
                return PassOutcome::Continue;
            }
        };

        let snapshot: Vec<A::Resource> = snapshot
            .into_iter()
            .filter(|r| self.adapter.matches(r, &self.options.filter))
            .collect();

        let policy = DiffPolicy {
            initial: !self.seeded,
            notify_new_on_initial: self.options.notify_new_on_initial,
            exclude_new: self.options.exclude_new,
            exclude_removed: self.options.exclude_removed,
        };
        let Diff { events, next } = diff(self.adapter.as_ref(), &self.table, snapshot, policy, Utc::now());
        debug!(
            initial = policy.initial,
            tracked = next.len(),
            events = events.len(),
            "Poll complete"
        );
        self.table = next;
        self.seeded = true;

        for event in events {
            if !self.options.emits(event.change) {
                continue;
            }
            let sent = tokio::select! {
                biased;
                () = self.token.cancelled() => return PassOutcome::Stop,
                sent = self.tx.send(event) => sent,
            };
            if sent.is_err() {
                debug!("Event receiver dropped");
                return PassOutcome::Stop;
            }
            self.emitted += 1;
            if self.options.max_events.is_some_and(|max| self.emitted >= max) {
                info!(max_events = self.emitted, "Event limit reached");
                return PassOutcome::Stop;
            }
        }

        PassOutcome::Continue
    }
}
