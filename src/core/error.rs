use std::fmt;

/// Failures surfaced to the controllers. Everything degrades to an
/// empty or stale view plus a log line; nothing here aborts the process.
#[derive(Debug, Clone, PartialEq)]
pub enum DataError {
    /// Remote fetch rejected or failed to decode.
    Network(String),
    /// The requested chapter has no stored verses. Distinct from a
    /// network failure: the screen shows an empty state, not an error.
    CacheMiss(u16),
    /// User-supplied input rejected before any I/O.
    Validation(String),
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataError::Network(e) => write!(f, "network failure: {e}"),
            DataError::CacheMiss(n) => write!(f, "no cached verses for surah {n}"),
            DataError::Validation(e) => write!(f, "invalid input: {e}"),
        }
    }
}

impl std::error::Error for DataError {}
