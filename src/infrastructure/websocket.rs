// WebSocket transport for the stream client
use async_trait::async_trait;
use futures::{future, SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::infrastructure::stream_client::{Connector, Transport, TransportError};

#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

#[async_trait]
impl Connector for WebSocketConnector {
    async fn connect(&self, endpoint: &str) -> Result<Transport, TransportError> {
        let (socket, _response) =
            connect_async(endpoint)
                .await
                .map_err(|e| TransportError::Connect {
                    endpoint: endpoint.to_string(),
                    reason: e.to_string(),
                })?;
        let (write, mut read) = socket.split();

        let outbound = write
            .sink_map_err(|e| TransportError::Io(e.to_string()))
            .with(|text: String| future::ready(Ok::<_, TransportError>(Message::Text(text))));

        // Control frames are handled by tungstenite; the stream ends on close or after the first error.
        let inbound = async_stream::stream! {
            while let Some(frame) = read.next().await {
                match frame {
                    Ok(Message::Text(text)) => yield Ok(text),
                    Ok(Message::Binary(bytes)) => match String::from_utf8(bytes) {
                        Ok(text) => yield Ok(text),
                        Err(_) => tracing::warn!("Dropping non UTF-8 binary frame"),
                    },
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(err) => {
                        yield Err(TransportError::Io(err.to_string()));
                        break;
                    }
                }
            }
        };

        Ok(Transport {
            outbound: Box::pin(outbound),
            inbound: Box::pin(inbound),
        })
    }
}
