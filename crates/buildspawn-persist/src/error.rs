/// Errors that can occur while reading or writing spawn data and caches.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("invalid magic bytes (expected BSPN)")]
    InvalidMagic,

    #[error("unsupported region format version {0}")]
    UnsupportedVersion(u16),

    #[error("file too small ({0} bytes, minimum {1})")]
    FileTooSmall(usize, usize),

    #[error("truncated file: expected {expected} bytes, got {actual}")]
    TruncatedFile { expected: usize, actual: usize },

    #[error("LZ4 decompression failed: {0}")]
    DecompressError(String),

    #[error("block too large: {size} bytes exceeds limit {limit}")]
    BlockTooLarge { size: usize, limit: usize },

    #[error("failed to encode chunk spawn data: {0}")]
    EncodeError(String),

    #[error("failed to decode chunk spawn data: {0}")]
    DecodeError(String),

    #[error("failed to (de)serialize JSON: {0}")]
    JsonError(String),

    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },
}

impl PersistError {
    pub(crate) fn io(path: &std::path::Path, err: std::io::Error) -> Self {
        PersistError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}
