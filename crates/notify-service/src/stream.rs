//! Stream API (spec.md §4.I) — long-lived SSE push for a single order,
//! framed as `event: order_update` / keepalive comments / an initial
//! `retry:` frame, gated by the chaos flag on every iteration.

use std::time::{Duration, Instant};

use axum::response::sse::Event;
use canteen_common::{OrderStatusEvent, redis_client::RedisHandle};
use futures::{Stream, StreamExt};
use serde_json::json;

use crate::chaos;
use crate::config::Settings;

struct StreamState {
    messages: std::pin::Pin<Box<dyn Stream<Item = redis::Msg> + Send>>,
    redis: RedisHandle,
    poll_timeout: Duration,
    keepalive_interval: Duration,
    last_keepalive: Instant,
    closed: bool,
}

pub async fn build_stream(
    redis: RedisHandle,
    order_id: String,
    settings: &Settings,
) -> anyhow::Result<impl Stream<Item = Result<Event, std::convert::Infallible>>> {
    let mut pubsub = redis.pubsub().await?;
    let channel = format!("order:{order_id}");
    pubsub.subscribe(&channel).await?;
    let messages = pubsub.into_on_message();

    let state = StreamState {
        messages: Box::pin(messages),
        redis,
        poll_timeout: Duration::from_secs(settings.poll_timeout_secs),
        keepalive_interval: Duration::from_secs(settings.keepalive_secs),
        last_keepalive: Instant::now(),
        closed: false,
    };

    let opening = futures::stream::iter(vec![
        Ok(Event::default().comment("stream-open")),
        Ok(Event::default().retry(Duration::from_millis(settings.stream_retry_ms))),
    ]);

    let body = futures::stream::unfold(state, |mut state| async move {
        loop {
            if state.closed {
                return None;
            }

            match tokio::time::timeout(state.poll_timeout, state.messages.next()).await {
                Ok(Some(msg)) => {
                    let payload: String = match msg.get_payload() {
                        Ok(payload) => payload,
                        Err(_) => continue,
                    };
                    let Ok(event) = serde_json::from_str::<OrderStatusEvent>(&payload) else {
                        continue;
                    };
                    state.closed = event.status.is_terminal();
                    return Some((Ok(Event::default().event("order_update").data(payload)), state));
                }
                Ok(None) => {
                    state.closed = true;
                    return None;
                }
                Err(_elapsed) => {
                    match chaos::is_enabled(&state.redis).await {
                        Ok(true) => {
                            state.closed = true;
                            let body = json!({ "detail": "chaos mode enabled" }).to_string();
                            return Some((Ok(Event::default().event("error").data(body)), state));
                        }
                        Ok(false) => {}
                        Err(err) => {
                            tracing::warn!(error = %err, "chaos flag check failed, assuming disabled");
                        }
                    }

                    if state.last_keepalive.elapsed() >= state.keepalive_interval {
                        state.last_keepalive = Instant::now();
                        return Some((Ok(Event::default().comment("keepalive")), state));
                    }
                }
            }
        }
    });

    Ok(opening.chain(body))
}
