use thiserror::Error;

/// Validation and contract errors exposed by `quotepulse-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter: '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },
}

/// Classification of a single failed upstream call.
///
/// Exists so retry policy can later treat categories differently without
/// the call sites re-parsing error messages. Today every kind receives the
/// same retry treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpstreamErrorKind {
    RateLimited,
    Malformed,
    Transport,
}

/// Error returned by a single upstream quote call.
///
/// `RateLimited` carries the provider's notice verbatim so it can be
/// surfaced to callers unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("{0}")]
    RateLimited(String),
    #[error("malformed upstream payload: {0}")]
    Malformed(String),
    #[error("upstream transport error: {0}")]
    Transport(String),
}

impl UpstreamError {
    pub const fn kind(&self) -> UpstreamErrorKind {
        match self {
            Self::RateLimited(_) => UpstreamErrorKind::RateLimited,
            Self::Malformed(_) => UpstreamErrorKind::Malformed,
            Self::Transport(_) => UpstreamErrorKind::Transport,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::RateLimited(message) | Self::Malformed(message) | Self::Transport(message) => {
                message
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limited_display_is_verbatim() {
        let note = "Thank you for using Alpha Vantage! Our standard API rate limit is 25 requests per day.";
        let error = UpstreamError::RateLimited(note.to_owned());
        assert_eq!(error.to_string(), note);
        assert_eq!(error.kind(), UpstreamErrorKind::RateLimited);
    }

    #[test]
    fn kinds_map_to_variants() {
        assert_eq!(
            UpstreamError::Malformed(String::from("x")).kind(),
            UpstreamErrorKind::Malformed
        );
        assert_eq!(
            UpstreamError::Transport(String::from("x")).kind(),
            UpstreamErrorKind::Transport
        );
    }
}
