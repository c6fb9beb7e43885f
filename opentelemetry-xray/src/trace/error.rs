use thiserror::Error;

/// Error returned when an `X-Amzn-Trace-Id` header value cannot be parsed.
///
/// Carries the raw text that failed validation together with the reason.
/// For [`ParseErrorReason::MissingTraceId`] the value is the whole header,
/// otherwise it is the value of the offending `Root` or `Parent` field.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
#[error("invalid X-Ray trace header {value:?}: {reason}")]
pub struct TraceHeaderParseError {
    value: String,
    reason: ParseErrorReason,
}

impl TraceHeaderParseError {
    /// Create a new error for the given raw value.
    pub fn new(value: impl Into<String>, reason: ParseErrorReason) -> Self {
        TraceHeaderParseError {
            value: value.into(),
            reason,
        }
    }

    /// The raw text that failed validation.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Why the value was rejected.
    pub fn reason(&self) -> &ParseErrorReason {
        &self.reason
    }
}

/// The reason an `X-Amzn-Trace-Id` header value was rejected.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseErrorReason {
    /// The header has no `Root` field.
    #[error("missing trace ID")]
    MissingTraceId,

    /// The `Root` value is not exactly 35 characters long.
    #[error("invalid trace ID length {0}")]
    InvalidTraceIdLength(usize),

    /// The `Root` value does not start with version `1`.
    #[error("unsupported trace ID version {0:?}")]
    UnsupportedTraceIdVersion(String),

    /// The `Root` value has no `-` at one of the expected positions.
    #[error("invalid trace ID delimiters")]
    InvalidTraceIdDelimiters,

    /// The `Parent` value is not exactly 16 characters long.
    #[error("invalid span ID length {0}")]
    InvalidSpanIdLength(usize),

    /// An ID contains a character that is not a hex digit.
    #[error("invalid hex digit")]
    InvalidHex,
}
