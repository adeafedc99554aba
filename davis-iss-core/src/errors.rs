//! Receiver error types with granular categories

use thiserror::Error;

/// Top-level error type for all receiver operations
#[derive(Debug, Error)]
pub enum ReceiverError {
    #[error("DSP processing error: {0}")]
    Dsp(#[from] DspError),

    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),

    #[error("Hop controller error: {0}")]
    Hop(#[from] HopError),

    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// DSP front-end errors. Per the drop policy in the hop controller and
/// frame slicer, most per-sample numeric edge cases are absorbed rather
/// than raised; these variants cover failures that prevent the pipeline
/// from making progress at all.
#[derive(Debug, Error)]
pub enum DspError {
    #[error("buffer underrun: requested {requested} samples, available {available}")]
    BufferUnderrun { requested: usize, available: usize },

    #[error("block size {block_size} does not evenly divide buffer length {buffer_len}")]
    MisalignedBuffer {
        block_size: usize,
        buffer_len: usize,
    },

    #[error("symbol length must be positive, got {0}")]
    InvalidSymbolLength(usize),
}

/// Frame slicing/validation errors. CRC mismatches and duplicate frames are
/// not represented here -- they are recorded as drop counts, not errors (see
/// `frame::FrameOutcome`).
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("candidate index {index} lies outside the current block (block_size={block_size})")]
    IndexOutsideBlock { index: usize, block_size: usize },

    #[error("sensor payload too short: need 8 bytes, got {0}")]
    PayloadTooShort(usize),
}

/// Hop-follow state machine errors
#[derive(Debug, Error)]
pub enum HopError {
    #[error("hop index {0} out of range (0..51)")]
    InvalidHopIndex(usize),

    #[error("tune command failed: {0}")]
    TuneFailed(String),

    #[error("hop controller channel disconnected")]
    ChannelClosed,
}

/// SDR driver errors
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("failed to open device: {0}")]
    OpenFailed(String),

    #[error("failed to set center frequency to {hz} Hz: {reason}")]
    TuneFailed { hz: u32, reason: String },

    #[error("short read: requested {requested} bytes, got {actual}")]
    ShortRead { requested: usize, actual: usize },

    #[error("stream closed")]
    StreamClosed,
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid symbol length: {0} (must be > 0)")]
    InvalidSymbolLength(usize),

    #[error("station id {0} out of range (0..8)")]
    InvalidStationId(u8),

    #[error("failed to read config file {path}: {reason}")]
    ReadFailed { path: String, reason: String },

    #[error("failed to parse TOML configuration: {0}")]
    ParseFailed(String),
}

/// Result type alias for receiver operations
pub type Result<T> = std::result::Result<T, ReceiverError>;
