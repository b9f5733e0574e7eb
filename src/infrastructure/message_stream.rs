// Broadcast receiver -> wire message stream
use futures::stream::Stream;
use tokio::sync::broadcast::{self, error::RecvError};

use crate::domain::telemetry::TelemetrySample;
use crate::infrastructure::wire::TelemetryMessage;

/// Yields every sample as a wire message in arrival order. A subscriber that
/// falls behind skips what it missed instead of ending the stream.
pub fn stream_from_receiver(
    mut rx: broadcast::Receiver<TelemetrySample>,
) -> impl Stream<Item = TelemetryMessage> {
    async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(sample) => yield TelemetryMessage::from(&sample),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Telemetry subscriber lagged, skipped {} samples", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::telemetry::fixtures::sample;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_stream_preserves_order_and_ends_on_close() {
        let (tx, rx) = broadcast::channel(8);
        let stream = stream_from_receiver(rx);

        tx.send(sample(1, 90.0)).unwrap();
        tx.send(sample(2, 89.0)).unwrap();
        drop(tx);

        let messages: Vec<TelemetryMessage> = stream.collect().await;
        let timestamps: Vec<i64> = messages.iter().map(|m| m.timestamp).collect();
        assert_eq!(timestamps, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_lagged_subscriber_keeps_going() {
        let (tx, rx) = broadcast::channel(2);
        let stream = stream_from_receiver(rx);

        for i in 0..5 {
            tx.send(sample(i, 50.0)).unwrap();
        }
        drop(tx);

        let messages: Vec<TelemetryMessage> = stream.collect().await;
        let timestamps: Vec<i64> = messages.iter().map(|m| m.timestamp).collect();
        assert_eq!(timestamps, vec![3, 4]);
    }
}
