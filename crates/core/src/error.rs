/// Result alias that carries the custom [`VisualiserError`] type.
pub type Result<T> = std::result::Result<T, VisualiserError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum VisualiserError {
    /// Free-form message, mostly surfaced by the command line front end.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// A caller supplied a value outside the accepted domain.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// Raw pixel data does not match the declared frame dimensions.
    #[error("pixel buffer for {width}x{height} frame must hold {expected} bytes, got {actual}")]
    DimensionMismatch {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },
    /// JSON (de)serialisation failed, typically while loading configuration.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// The FFT backend rejected its buffers.
    #[error("fft failure: {0}")]
    Fft(#[from] realfft::FftError),
}

impl VisualiserError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

impl From<&str> for VisualiserError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for VisualiserError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
