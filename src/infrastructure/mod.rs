// Infrastructure layer - Wire format, configuration and transports
pub mod config;
pub mod message_stream;
pub mod stream_client;
pub mod websocket;
pub mod wire;
