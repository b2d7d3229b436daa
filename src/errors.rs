pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The bar interval must be at least one minute.
    #[error("Interval must be positive (got: {0} minutes)")]
    InvalidInterval(u32),

    /// The session close is not after the session open.
    #[error("Session close must be after session open")]
    InvalidSession,

    /// The indicator period must be at least one.
    #[error("Indicator period must be positive")]
    InvalidPeriod,

    /// The trade count range is empty or inverted.
    /// Min: {0}, Max: {1}
    #[error("Invalid trade count range: min {0}, max {1}")]
    InvalidTradeRange(usize, usize),

    /// Too few candles to place entries and keep room for every exit.
    #[error("Not enough candles: required {required}, got {got}")]
    NotEnoughCandles {
        /// Minimum number of candles for the trade options.
        required: usize,
        /// Number of candles provided.
        got: usize,
    },

    /// Every candidate entry index is already taken.
    #[error("No unused entry index left")]
    IndexSpaceExhausted,

    /// The candle at the given index does not exist.
    #[error("Candle not found at index {0}")]
    CandleNotFound(usize),

    /// The candle prices break `low <= open, close <= high`.
    #[error("Invalid candle: low must be below and high above both open and close")]
    InvalidCandle,

    /// The timestamp cannot be represented as a date.
    #[error("Timestamp out of range: {0}")]
    InvalidTimestamp(i64),

    /// A generic error message.
    #[error("{0}")]
    Msg(String),

    /// I/O error occurred.
    #[cfg(feature = "serde")]
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error occurred.
    #[cfg(feature = "serde")]
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Drawing backend error.
    #[cfg(feature = "draws")]
    #[error("Plotters error: {0}")]
    Plotters(String),
}
