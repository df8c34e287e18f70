//! SSE bridge.
//!
//! Turns one `/events` subscription into a stream of [`SseFrame`]s:
//!
//! 1. parse the query (failure: one `error` frame, end)
//! 2. `connected` frame naming the stream and echoing the resolved options
//! 3. start the kind's poller (failure: one `error` frame, end)
//! 4. forward every change event as `<kind>_event` until the subscriber
//!    goes away, the connection token is cancelled, or the poller closes its
//!    channel (then `stream_closed`)
//!
//! The poller and the forwarding loop share the connection token. Dropping
//! the frame stream cancels it, which is how a client disconnect reaches the
//! poller.

use crate::error::StreamError;
use crate::frame::{EVENT_CONNECTED, EVENT_STREAM_CLOSED, SseFrame};
use crate::query::{StreamKind, StreamRequest};
use async_stream::stream;
use futures::StreamExt;
use futures::stream::BoxStream;
use serde::Serialize;
use slurm_client::SlurmClientTrait;
use slurm_watch::{
    DEFAULT_BUFFER_SIZE, DEFAULT_MIN_POLL_INTERVAL, DEFAULT_POLL_INTERVAL, EventOf, JobAdapter, NodeAdapter,
    PartitionAdapter, Poller, ResourceAdapter, WatchOptions,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{Span, debug, info, warn};

/// Bridge settings shared by every connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Default interval between polls
    pub poll_interval: Duration,
    /// Floor for any requested `poll_interval`
    pub min_poll_interval: Duration,
    /// Event channel capacity per connection
    pub buffer_size: usize,
    /// `retry` hint sent with the `connected` frame; zero sends none
    pub retry_ms: u64,
    /// Upper bound on one connection's lifetime
    pub max_stream_duration: Option<Duration>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            min_poll_interval: DEFAULT_MIN_POLL_INTERVAL,
            buffer_size: DEFAULT_BUFFER_SIZE,
            retry_ms: 0,
            max_stream_duration: None,
        }
    }
}

#[derive(Serialize)]
struct Connected<'a, F> {
    stream: StreamKind,
    status: &'static str,
    options: &'a WatchOptions<F>,
}

#[derive(Serialize)]
struct Closed {
    stream: StreamKind,
    status: &'static str,
}

enum Next<E> {
    Cancelled,
    Expired,
    Closed,
    Event(E),
}

/// Serves SSE subscriptions for jobs, nodes and partitions
#[derive(Debug, Clone)]
pub struct SseBridge {
    jobs: Poller<JobAdapter>,
    nodes: Poller<NodeAdapter>,
    partitions: Poller<PartitionAdapter>,
    config: BridgeConfig,
    shutdown: CancellationToken,
}

impl SseBridge {
    /// Create a bridge over one Slurm client.
    ///
    /// `shutdown` is the root token: every connection token is its child, so
    /// cancelling it ends all open streams.
    pub fn new(client: Arc<dyn SlurmClientTrait>, config: BridgeConfig, shutdown: CancellationToken) -> Self {
        Self {
            jobs: poller(JobAdapter::new(Arc::clone(&client)), &config),
            nodes: poller(NodeAdapter::new(Arc::clone(&client)), &config),
            partitions: poller(PartitionAdapter::new(client), &config),
            config,
            shutdown,
        }
    }

    /// Fresh token for one connection
    pub fn connection_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }

    /// Frame stream for one subscription.
    ///
    /// Log records of the stream are attached to `span`.
    pub fn frames(
        &self,
        query: &HashMap<String, String>,
        token: CancellationToken,
        span: Span,
    ) -> BoxStream<'static, SseFrame> {
        let request = match StreamRequest::from_query(query) {
            Ok(request) => request,
            Err(e) => {
                span.in_scope(|| warn!(error = %e, "Rejected stream request"));
                return futures::stream::once(async move { SseFrame::error(e) }).boxed();
            }
        };

        let link = Link {
            kind: request.kind(),
            token,
            span,
            retry_ms: self.config.retry_ms,
            max_duration: self.config.max_stream_duration,
        };
        match request {
            StreamRequest::Jobs(options) => link.forward(self.jobs.clone(), options).boxed(),
            StreamRequest::Nodes(options) => link.forward(self.nodes.clone(), options).boxed(),
            StreamRequest::Partitions(options) => link.forward(self.partitions.clone(), options).boxed(),
        }
    }
}

fn poller<A: ResourceAdapter>(adapter: A, config: &BridgeConfig) -> Poller<A> {
    Poller::new(adapter)
        .with_poll_interval(config.poll_interval)
        .with_min_poll_interval(config.min_poll_interval)
        .with_buffer_size(config.buffer_size)
}

/// Per-connection forwarding state
struct Link {
    kind: StreamKind,
    token: CancellationToken,
    span: Span,
    retry_ms: u64,
    max_duration: Option<Duration>,
}

impl Link {
    fn forward<A: ResourceAdapter>(
        self,
        poller: Poller<A>,
        options: WatchOptions<A::Filter>,
    ) -> impl futures::Stream<Item = SseFrame> + Send + 'static {
        let Link {
            kind,
            token,
            span,
            retry_ms,
            max_duration,
        } = self;

        stream! {
            // Cancels the poller once the subscriber drops this stream
            let _cancel_on_drop = token.clone().drop_guard();

            let connected = SseFrame::new(
                EVENT_CONNECTED,
                &Connected { stream: kind, status: "connected", options: &options },
            );
            yield connected.with_retry_ms(retry_ms);

            let started = span.in_scope(|| poller.watch(token.clone(), options.clone()));
            let mut events = match started {
                Ok(events) => events,
                Err(source) => {
                    let err = StreamError::Start { stream: kind, source };
                    span.in_scope(|| warn!(error = %err, "Failed to start watch"));
                    yield SseFrame::error(err);
                    return;
                }
            };
            span.in_scope(|| info!("Stream started"));

            let deadline = async move {
                match max_duration {
                    Some(limit) => tokio::time::sleep(limit).await,
                    None => std::future::pending().await,
                }
            };
            tokio::pin!(deadline);

            let event_name = kind.event_name();
            let prefix = kind.resource_kind().as_str();
            let mut seq: u64 = 0;
            loop {
                let next: Next<EventOf<A>> = tokio::select! {
                    biased;
                    () = token.cancelled() => Next::Cancelled,
                    () = &mut deadline => Next::Expired,
                    event = events.recv() => match event {
                        Some(event) => Next::Event(event),
                        None => Next::Closed,
                    },
                };

                match next {
                    Next::Event(event) => {
                        seq += 1;
                        yield SseFrame::new(event_name.as_str(), &event).with_id(format!("{}-{}", prefix, seq));
                    }
                    Next::Closed => {
                        span.in_scope(|| info!(events = seq, "Watcher closed the stream"));
                        yield SseFrame::new(EVENT_STREAM_CLOSED, &Closed { stream: kind, status: "closed" });
                        break;
                    }
                    Next::Expired => {
                        span.in_scope(|| info!(events = seq, "Maximum stream duration reached"));
                        token.cancel();
                        break;
                    }
                    Next::Cancelled => {
                        span.in_scope(|| debug!(events = seq, "Stream cancelled"));
                        break;
                    }
                }
            }
        }
    }
}
