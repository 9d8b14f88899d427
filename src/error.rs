use thiserror::Error;

#[derive(Error, Debug)]
pub enum FleetwatchError {
    #[error("WebSocket connection error: {0}")]
    WebSocketError(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("URL parsing error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("HTTP transport error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Snapshot endpoint returned status {0}")]
    SnapshotStatus(reqwest::StatusCode),

    #[error("Frame channel closed: {0}")]
    FrameChannelClosed(String),

    #[error("Metrics server error: {0}")]
    MetricsError(String),
}
