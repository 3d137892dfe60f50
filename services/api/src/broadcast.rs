//! Real-time fan-out of issue events
//!
//! Events go to every WebSocket subscriber of this process and, when Redis is
//! configured, to the `civictrack:new_issue` channel. Delivery is
//! fire-and-forget: failures are logged and never reach the request that
//! produced the event.

use common::pubsub::RedisPublisher;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::models::Issue;

/// Redis channel mirrored for other processes
pub const REDIS_CHANNEL: &str = "civictrack:new_issue";

/// Events pushed to real-time subscribers
///
/// Serialized as `{"event": "new_issue", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum IssueEvent {
    NewIssue(Issue),
}

impl IssueEvent {
    pub fn name(&self) -> &'static str {
        match self {
            IssueEvent::NewIssue(_) => "new_issue",
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Broadcast sink shared by all handlers
#[derive(Clone)]
pub struct IssueBroadcaster {
    sender: broadcast::Sender<IssueEvent>,
    redis: Option<RedisPublisher>,
}

impl IssueBroadcaster {
    /// `capacity` bounds how far a slow subscriber may fall behind before it
    /// starts skipping events
    pub fn new(capacity: usize, redis: Option<RedisPublisher>) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender, redis }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<IssueEvent> {
        self.sender.subscribe()
    }

    /// Publish an event without waiting for delivery
    pub fn publish(&self, event: IssueEvent) {
        // send only fails when nobody is subscribed
        let receivers = self.sender.send(event.clone()).unwrap_or(0);
        debug!(event = event.name(), receivers, "Broadcast issue event");

        if let Some(redis) = self.redis.clone() {
            tokio::spawn(async move {
                let payload = match event.to_json() {
                    Ok(payload) => payload,
                    Err(e) => {
                        warn!("Failed to serialize {} event: {}", event.name(), e);
                        return;
                    }
                };
                if let Err(e) = redis.publish(REDIS_CHANNEL, &payload).await {
                    warn!("Failed to publish {} event to Redis: {}", event.name(), e);
                }
            });
        }
    }
}
