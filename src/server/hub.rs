use boardsync_common::{Topic, WsMessage};
use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::{debug, error};

/// Default per-topic buffer. A subscriber that falls further behind than
/// this receives `ResyncRequired` instead of the missed events.
pub const DEFAULT_TOPIC_CAPACITY: usize = 256;

/// Topic-scoped fan-out: one broadcast channel per subscribed topic.
///
/// Channels are created on first subscribe and dropped by [`release`]
/// once nobody listens. Publishing to a topic without a channel is a no-op.
///
/// [`release`]: TopicHub::release
pub struct TopicHub {
    channels: DashMap<Topic, broadcast::Sender<String>>,
    capacity: usize,
}

impl Default for TopicHub {
    fn default() -> Self {
        Self::new(DEFAULT_TOPIC_CAPACITY)
    }
}

impl TopicHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn subscribe(&self, topic: &Topic) -> broadcast::Receiver<String> {
        self.channels
            .entry(topic.clone())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Serialize and publish `msg` to every subscriber of `topic`.
    /// Returns how many receivers it reached.
    pub fn publish(&self, topic: &Topic, msg: &WsMessage) -> usize {
        let json = match serde_json::to_string(msg) {
            Ok(json) => json,
            Err(e) => {
                error!(%topic, error = %e, "failed to serialize WsMessage");
                return 0;
            }
        };
        let reached = match self.channels.get(topic) {
            Some(tx) => tx.send(json).unwrap_or(0),
            None => 0,
        };
        debug!(%topic, event = msg.event_name(), reached, "published");
        reached
    }

    pub fn subscriber_count(&self, topic: &Topic) -> usize {
        self.channels
            .get(topic)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }

    pub fn topic_count(&self) -> usize {
        self.channels.len()
    }

    /// Drop the channel for `topic` if it has no receivers left.
    pub fn release(&self, topic: &Topic) {
        self.channels
            .remove_if(topic, |_, tx| tx.receiver_count() == 0);
    }
}
