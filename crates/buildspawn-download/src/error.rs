use thiserror::Error;

/// A single remote request failed.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FetchError {
    #[error("building '{0}' not found")]
    NotFound(String),
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },
    #[error("malformed payload: {0}")]
    Parse(String),
    #[error("transport error: {0}")]
    Transport(String),
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("a download is already running")]
    AlreadyRunning,
    #[error("failed to spawn download worker: {0}")]
    WorkerSpawn(String),
}
