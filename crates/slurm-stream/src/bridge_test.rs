//! Unit tests for the SSE bridge

#[cfg(test)]
mod tests {
    use crate::bridge::{BridgeConfig, SseBridge};
    use crate::frame::{EVENT_CONNECTED, EVENT_ERROR, EVENT_STREAM_CLOSED, SseFrame};
    use futures::StreamExt;
    use futures::stream::BoxStream;
    use slurm_client::{Job, MockSlurmClient, Node};
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;
    use tokio_util::sync::CancellationToken;
    use tracing::Span;

    fn job(id: i32, state: &str) -> Job {
        Job {
            job_id: Some(id),
            job_state: vec![state.to_string()],
            ..Default::default()
        }
    }

    fn bridge(mock: &MockSlurmClient, config: BridgeConfig) -> SseBridge {
        SseBridge::new(Arc::new(mock.clone()), config, CancellationToken::new())
    }

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn open(bridge: &SseBridge, pairs: &[(&str, &str)], token: &CancellationToken) -> BoxStream<'static, SseFrame> {
        bridge.frames(&query(pairs), token.clone(), Span::none())
    }

    async fn next(frames: &mut BoxStream<'static, SseFrame>) -> Option<SseFrame> {
        timeout(Duration::from_secs(30), frames.next())
            .await
            .expect("Frame stream stalled")
    }

    #[tokio::test(start_paused = true)]
    async fn test_connected_then_events() {
        let mock = MockSlurmClient::new("http://mock");
        mock.set_jobs(vec![job(1, "PENDING")]);
        let bridge = bridge(&mock, BridgeConfig::default());
        let token = CancellationToken::new();
        let mut frames = open(&bridge, &[("stream", "jobs"), ("notify_initial", "true"), ("partition", "")], &token);

        let connected = next(&mut frames).await.unwrap();
        assert!(connected.is_event(EVENT_CONNECTED));
        assert_eq!(connected.data["stream"], "jobs");
        assert_eq!(connected.data["status"], "connected");
        assert_eq!(connected.data["options"]["notify_new_on_initial"], true);
        assert_eq!(connected.retry_ms, 0);

        let first = next(&mut frames).await.unwrap();
        assert!(first.is_event("job_event"));
        assert_eq!(first.id.as_deref(), Some("job-1"));
        assert_eq!(first.data["type"], "new");
        assert_eq!(first.data["job_id"], 1);
        assert_eq!(first.data["new_state"], "PENDING");
        assert_eq!(first.data["job"]["job_id"], 1);

        mock.set_jobs(vec![job(1, "RUNNING")]);
        let second = next(&mut frames).await.unwrap();
        assert_eq!(second.id.as_deref(), Some("job-2"));
        assert_eq!(second.data["type"], "state_change");
        assert_eq!(second.data["old_state"], "PENDING");
        assert_eq!(second.data["new_state"], "RUNNING");
        assert_eq!(second.data["transition"], "start");

        token.cancel();
        assert!(next(&mut frames).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_with_empty_channel_ends_stream() {
        let mock = MockSlurmClient::new("http://mock");
        let bridge = bridge(&mock, BridgeConfig::default());
        let token = CancellationToken::new();
        let mut frames = open(&bridge, &[("stream", "nodes")], &token);
        assert!(next(&mut frames).await.unwrap().is_event(EVENT_CONNECTED));

        // Nothing to forward: the stream parks on the empty channel
        assert!(timeout(Duration::from_secs(12), frames.next()).await.is_err());

        token.cancel();
        let end = timeout(Duration::from_millis(100), frames.next())
            .await
            .expect("Cancelled stream should end promptly");
        assert!(end.is_none(), "No frame after cancellation");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_closed_when_watcher_ends() {
        let mock = MockSlurmClient::new("http://mock");
        mock.set_nodes(vec![Node {
            name: Some("n1".to_string()),
            state: vec!["IDLE".to_string()],
            ..Default::default()
        }]);
        let bridge = bridge(&mock, BridgeConfig::default());
        let token = CancellationToken::new();
        let mut frames = open(&bridge, &[("stream", "nodes"), ("notify_initial", "1"), ("max_events", "1")], &token);

        assert!(next(&mut frames).await.unwrap().is_event(EVENT_CONNECTED));
        let event = next(&mut frames).await.unwrap();
        assert!(event.is_event("node_event"));
        assert_eq!(event.data["node_name"], "n1");

        let closed = next(&mut frames).await.unwrap();
        assert!(closed.is_event(EVENT_STREAM_CLOSED));
        assert_eq!(closed.data["stream"], "nodes");
        assert_eq!(closed.data["status"], "closed");
        assert!(next(&mut frames).await.is_none());
    }

    #[tokio::test]
    async fn test_start_failure_sends_error() {
        let mock = MockSlurmClient::new("http://mock");
        let bridge = bridge(&mock, BridgeConfig::default());
        let token = CancellationToken::new();
        let mut frames = open(&bridge, &[("stream", "jobs"), ("job_ids", "12,abc")], &token);

        assert!(next(&mut frames).await.unwrap().is_event(EVENT_CONNECTED));
        let error = next(&mut frames).await.unwrap();
        assert!(error.is_event(EVENT_ERROR));
        let message = error.data["error"].as_str().unwrap();
        assert!(message.starts_with("failed to start jobs stream"), "{}", message);
        assert!(next(&mut frames).await.is_none());
        assert_eq!(mock.list_calls(), 0);
    }

    #[tokio::test]
    async fn test_bad_request_sends_single_error() {
        let mock = MockSlurmClient::new("http://mock");
        let bridge = bridge(&mock, BridgeConfig::default());
        let token = CancellationToken::new();

        for (pairs, expected) in [
            (vec![], "stream parameter required"),
            (vec![("stream", "accounts")], "unknown stream type: accounts"),
        ] {
            let mut frames = open(&bridge, &pairs, &token);
            let error = next(&mut frames).await.unwrap();
            assert!(error.is_event(EVENT_ERROR));
            assert_eq!(error.data["error"], expected);
            assert!(next(&mut frames).await.is_none());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_stream_cancels_token() {
        let mock = MockSlurmClient::new("http://mock");
        let bridge = bridge(&mock, BridgeConfig::default());
        let token = CancellationToken::new();
        let mut frames = open(&bridge, &[("stream", "partitions")], &token);
        next(&mut frames).await.unwrap();

        drop(frames);
        assert!(token.is_cancelled(), "Subscriber disconnect must stop the poller");
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_duration_ends_stream() {
        let mock = MockSlurmClient::new("http://mock");
        let config = BridgeConfig {
            max_stream_duration: Some(Duration::from_secs(20)),
            retry_ms: 2000,
            ..Default::default()
        };
        let bridge = bridge(&mock, config);
        let token = CancellationToken::new();
        let mut frames = open(&bridge, &[("stream", "jobs")], &token);

        let connected = next(&mut frames).await.unwrap();
        assert_eq!(connected.retry_ms, 2000);
        assert!(next(&mut frames).await.is_none());
        assert!(token.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_ends_connections() {
        let mock = MockSlurmClient::new("http://mock");
        let shutdown = CancellationToken::new();
        let bridge = SseBridge::new(Arc::new(mock.clone()), BridgeConfig::default(), shutdown.clone());
        let mut frames = open(&bridge, &[("stream", "jobs")], &bridge.connection_token());
        next(&mut frames).await.unwrap();

        shutdown.cancel();
        assert!(next(&mut frames).await.is_none());
    }
}
