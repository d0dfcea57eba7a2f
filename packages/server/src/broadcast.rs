//! Fan-out channel for live scoreboard updates.
//!
//! A single broadcast topic: every score change publishes the full standings
//! as JSON, and every connected leaderboard socket receives it. Subscribers
//! that fall behind are lagged out by the channel and resync on the next
//! update.

use tokio::sync::broadcast;

#[derive(Clone)]
pub struct ScoreboardHub {
    tx: broadcast::Sender<String>,
}

impl ScoreboardHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }

    /// Publish standings to all subscribers. A send with no listeners is not
    /// an error.
    pub fn publish(&self, standings_json: String) {
        let _ = self.tx.send(standings_json);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ScoreboardHub {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_published_standings() {
        let hub = ScoreboardHub::new(8);
        let mut rx_a = hub.subscribe();
        let mut rx_b = hub.subscribe();

        hub.publish(r#"{"standings":[]}"#.to_string());

        assert_eq!(rx_a.recv().await.unwrap(), r#"{"standings":[]}"#);
        assert_eq!(rx_b.recv().await.unwrap(), r#"{"standings":[]}"#);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_noop() {
        let hub = ScoreboardHub::new(8);
        hub.publish("{}".to_string());
        assert_eq!(hub.subscriber_count(), 0);
    }
}
