//! Encoding and decoding of the `X-Amzn-Trace-Id` header value.
//!
//! A header looks like
//!
//! `Root=1-5759e988-bd862e3fe1be46a994272793;Parent=53995c3f42cd8ad8;Sampled=1`
//!
//! See the [AWS X-Ray tracing header docs][xray-header] for details.
//!
//! [xray-header]: https://docs.aws.amazon.com/xray/latest/devguide/xray-concepts.html#xray-concepts-tracingheader
use super::error::{ParseErrorReason, TraceHeaderParseError};
use opentelemetry::trace::{SpanContext, SpanId, TraceFlags, TraceId, TraceState};
use std::fmt;
use std::str::FromStr;

const HEADER_ROOT_KEY: &str = "Root=";
const HEADER_PARENT_KEY: &str = "Parent=";
const HEADER_SAMPLED_KEY: &str = "Sampled=";

const SAMPLED: &str = "1";
const NOT_SAMPLED: &str = "0";

const XRAY_VERSION: u8 = b'1';
const XRAY_DELIMITER: u8 = b'-';
const XRAY_TRACE_ID_LEN: usize = 35;
const SPAN_ID_HEX_LEN: usize = 16;

/// Holds an X-Ray formatted trace ID.
///
/// The text form consists of three parts separated by hyphens, for example
/// `1-58406520-a006649127e371903a2de979`:
///
/// * the version number, always `1`,
/// * the time of the original request in Unix epoch seconds, in 8 hex digits,
/// * a 96-bit identifier for the trace, in 24 hex digits.
///
/// Parsing is strict: the text must be exactly 35 characters, with the
/// delimiters at positions 1 and 10. Hex digits are accepted in either case
/// and always written in lowercase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct XrayTraceId(TraceId);

impl XrayTraceId {
    /// The underlying OpenTelemetry trace ID.
    pub fn trace_id(&self) -> TraceId {
        self.0
    }
}

impl From<TraceId> for XrayTraceId {
    fn from(trace_id: TraceId) -> Self {
        XrayTraceId(trace_id)
    }
}

impl From<XrayTraceId> for TraceId {
    fn from(id: XrayTraceId) -> Self {
        id.0
    }
}

impl fmt::Display for XrayTraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = self.0.to_string();
        let (timestamp, random) = hex.split_at(8);
        write!(f, "1-{timestamp}-{random}")
    }
}

impl FromStr for XrayTraceId {
    type Err = TraceHeaderParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let raw = value.as_bytes();
        let fail = |reason| TraceHeaderParseError::new(value, reason);

        if raw.len() != XRAY_TRACE_ID_LEN {
            return Err(fail(ParseErrorReason::InvalidTraceIdLength(raw.len())));
        }
        if raw[0] != XRAY_VERSION {
            let version = value.chars().next().map(String::from).unwrap_or_default();
            return Err(fail(ParseErrorReason::UnsupportedTraceIdVersion(version)));
        }
        if raw[1] != XRAY_DELIMITER || raw[10] != XRAY_DELIMITER {
            return Err(fail(ParseErrorReason::InvalidTraceIdDelimiters));
        }

        // timestamp || random
        let mut bytes = [0u8; 16];
        const_hex::decode_to_slice(&raw[2..10], &mut bytes[..4])
            .and_then(|_| const_hex::decode_to_slice(&raw[11..], &mut bytes[4..]))
            .map_err(|_| fail(ParseErrorReason::InvalidHex))?;

        Ok(XrayTraceId(TraceId::from_bytes(bytes)))
    }
}

/// Serialize a span context into an `X-Amzn-Trace-Id` header value.
///
/// The output always has the three fields `Root`, `Parent` and `Sampled`, in
/// that order. Trace state is not part of the format and is dropped.
pub fn format_header(span_context: &SpanContext) -> String {
    let sampled = if span_context.is_sampled() {
        SAMPLED
    } else {
        NOT_SAMPLED
    };

    format!(
        "{}{};{}{};{}{}",
        HEADER_ROOT_KEY,
        XrayTraceId::from(span_context.trace_id()),
        HEADER_PARENT_KEY,
        span_context.span_id(),
        HEADER_SAMPLED_KEY,
        sampled,
    )
}

/// Parse an `X-Amzn-Trace-Id` header value into a remote span context.
///
/// Fields may appear in any order and unknown fields are ignored. `Root` is
/// mandatory. A missing `Parent` yields [`SpanId::INVALID`] (all zeros), and
/// only `Sampled=1` sets the sampled flag. The first invalid field fails the
/// whole parse.
pub fn parse_header(header_value: &str) -> Result<SpanContext, TraceHeaderParseError> {
    let mut trace_id = None;
    let mut span_id = SpanId::INVALID;
    let mut trace_flags = TraceFlags::default();

    for field in header_value.split(';') {
        if let Some(value) = field.strip_prefix(HEADER_ROOT_KEY) {
            trace_id = Some(value.parse::<XrayTraceId>()?.trace_id());
        } else if let Some(value) = field.strip_prefix(HEADER_PARENT_KEY) {
            span_id = parse_span_id(value)?;
        } else if let Some(value) = field.strip_prefix(HEADER_SAMPLED_KEY) {
            trace_flags = if value == SAMPLED {
                TraceFlags::SAMPLED
            } else {
                TraceFlags::default()
            };
        }
    }

    let trace_id = trace_id.ok_or_else(|| {
        TraceHeaderParseError::new(header_value, ParseErrorReason::MissingTraceId)
    })?;

    Ok(SpanContext::new(
        trace_id,
        span_id,
        trace_flags,
        true,
        TraceState::default(),
    ))
}

fn parse_span_id(value: &str) -> Result<SpanId, TraceHeaderParseError> {
    if value.len() != SPAN_ID_HEX_LEN {
        return Err(TraceHeaderParseError::new(
            value,
            ParseErrorReason::InvalidSpanIdLength(value.len()),
        ));
    }

    let mut bytes = [0u8; 8];
    const_hex::decode_to_slice(value, &mut bytes)
        .map_err(|_| TraceHeaderParseError::new(value, ParseErrorReason::InvalidHex))?;

    Ok(SpanId::from_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const TRACE_ID_BYTES: [u8; 16] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16];
    const SPAN_ID_BYTES: [u8; 8] = [1, 2, 3, 4, 5, 6, 7, 8];

    fn remote_context(trace_id: &str, span_id: &str, flags: TraceFlags) -> SpanContext {
        SpanContext::new(
            TraceId::from_hex(trace_id).unwrap(),
            SpanId::from_hex(span_id).unwrap(),
            flags,
            true,
            TraceState::default(),
        )
    }

    #[test]
    fn format_not_sampled() {
        let span_context = SpanContext::new(
            TraceId::from_bytes(TRACE_ID_BYTES),
            SpanId::from_bytes(SPAN_ID_BYTES),
            TraceFlags::default(),
            false,
            TraceState::default(),
        );

        assert_eq!(
            format_header(&span_context),
            "Root=1-01020304-05060708090a0b0c0d0e0f10;Parent=0102030405060708;Sampled=0"
        );
    }

    #[test]
    fn format_sampled() {
        let span_context = SpanContext::new(
            TraceId::from_bytes(TRACE_ID_BYTES),
            SpanId::from_bytes(SPAN_ID_BYTES),
            TraceFlags::SAMPLED,
            false,
            TraceState::default(),
        );

        assert_eq!(
            format_header(&span_context),
            "Root=1-01020304-05060708090a0b0c0d0e0f10;Parent=0102030405060708;Sampled=1"
        );
    }

    #[rustfmt::skip]
    fn parse_data() -> Vec<(&'static str, SpanContext)> {
        vec![
            ("Root=1-5759e988-bd862e3fe1be46a994272793;Sampled=0", remote_context("5759e988bd862e3fe1be46a994272793", "0000000000000000", TraceFlags::default())),
            ("Root=1-5759e988-bd862e3fe1be46a994272793;Sampled=1", remote_context("5759e988bd862e3fe1be46a994272793", "0000000000000000", TraceFlags::SAMPLED)),
            ("Root=1-5759e988-bd862e3fe1be46a994272793;Parent=53995c3f42cd8ad8;Sampled=0", remote_context("5759e988bd862e3fe1be46a994272793", "53995c3f42cd8ad8", TraceFlags::default())),
            ("Root=1-5759e988-bd862e3fe1be46a994272793;Parent=53995c3f42cd8ad8;Sampled=1", remote_context("5759e988bd862e3fe1be46a994272793", "53995c3f42cd8ad8", TraceFlags::SAMPLED)),
            ("Root=1-5759e988-bd862e3fe1be46a994272793;Parent=53995c3f42cd8ad8", remote_context("5759e988bd862e3fe1be46a994272793", "53995c3f42cd8ad8", TraceFlags::default())),
            ("Root=1-5759e988-bd862e3fe1be46a994272793;Parent=53995c3f42cd8ad8;Sampled=?", remote_context("5759e988bd862e3fe1be46a994272793", "53995c3f42cd8ad8", TraceFlags::default())),
            ("Sampled=1;Parent=53995c3f42cd8ad8;Root=1-5759e988-bd862e3fe1be46a994272793", remote_context("5759e988bd862e3fe1be46a994272793", "53995c3f42cd8ad8", TraceFlags::SAMPLED)),
            ("Root=1-5759e988-bd862e3fe1be46a994272793;Self=1-58406520-bf42676c05e20ba4a90e448e;Parent=53995c3f42cd8ad8;Sampled=1;Lineage=a87bd80c:1", remote_context("5759e988bd862e3fe1be46a994272793", "53995c3f42cd8ad8", TraceFlags::SAMPLED)),
            ("Root=1-5759E988-BD862E3FE1BE46A994272793;Parent=53995C3F42CD8AD8;Sampled=1", remote_context("5759e988bd862e3fe1be46a994272793", "53995c3f42cd8ad8", TraceFlags::SAMPLED)),
            ("Root=1-5759e988-bd862e3fe1be46a994272793;;Sampled=1;", remote_context("5759e988bd862e3fe1be46a994272793", "0000000000000000", TraceFlags::SAMPLED)),
        ]
    }

    #[test]
    fn parse_valid_headers() {
        for (header, expected) in parse_data() {
            assert_eq!(parse_header(header), Ok(expected), "{header}");
        }
    }

    #[test]
    fn parse_yields_canonical_text() {
        let span_context =
            parse_header("Root=1-5759e988-bd862e3fe1be46a994272793;Sampled=0").unwrap();

        assert_eq!(
            span_context.trace_id().to_string(),
            "5759e988bd862e3fe1be46a994272793"
        );
        assert_eq!(span_context.span_id().to_string(), "0000000000000000");
        assert_eq!(span_context.trace_flags(), TraceFlags::default());
        assert!(span_context.is_remote());
        assert_eq!(span_context.trace_state().header(), "");
    }

    #[rstest]
    #[case("Root=1-123-456;Sampled=1", "1-123-456", ParseErrorReason::InvalidTraceIdLength(9))]
    #[case("Root=;Sampled=1", "", ParseErrorReason::InvalidTraceIdLength(0))]
    #[case("Parent=53995c3f42cd8ad8;Sampled=1", "Parent=53995c3f42cd8ad8;Sampled=1", ParseErrorReason::MissingTraceId)]
    #[case("", "", ParseErrorReason::MissingTraceId)]
    #[case("root=1-5759e988-bd862e3fe1be46a994272793", "root=1-5759e988-bd862e3fe1be46a994272793", ParseErrorReason::MissingTraceId)]
    #[case("Root=2-5759e988-bd862e3fe1be46a994272793;Sampled=1", "2-5759e988-bd862e3fe1be46a994272793", ParseErrorReason::UnsupportedTraceIdVersion("2".to_string()))]
    #[case("Root=1_5759e988*bd862e3fe1be46a994272793;Sampled=1", "1_5759e988*bd862e3fe1be46a994272793", ParseErrorReason::InvalidTraceIdDelimiters)]
    #[case("Root=1-5759e988-bd862e3fe1be46a99427279z", "1-5759e988-bd862e3fe1be46a99427279z", ParseErrorReason::InvalidHex)]
    #[case("Root=1-5759e98g-bd862e3fe1be46a994272793", "1-5759e98g-bd862e3fe1be46a994272793", ParseErrorReason::InvalidHex)]
    #[case("Root=1-5759e988-bd862e3fe1be46a994272793;Parent=short;Sampled=1", "short", ParseErrorReason::InvalidSpanIdLength(5))]
    #[case("Root=1-5759e988-bd862e3fe1be46a994272793;Parent=53995c3f42cd8ad8aa", "53995c3f42cd8ad8aa", ParseErrorReason::InvalidSpanIdLength(18))]
    #[case("Root=1-5759e988-bd862e3fe1be46a994272793;Parent=53995c3f42cd8adx", "53995c3f42cd8adx", ParseErrorReason::InvalidHex)]
    #[case("Parent=short;Root=1-5759e988-bd862e3fe1be46a994272793", "short", ParseErrorReason::InvalidSpanIdLength(5))]
    fn parse_rejects_invalid_headers(
        #[case] header: &'static str,
        #[case] value: &'static str,
        #[case] reason: ParseErrorReason,
    ) {
        assert_eq!(
            parse_header(header),
            Err(TraceHeaderParseError::new(value, reason))
        );
    }

    #[test]
    fn parse_keeps_last_duplicate_field() {
        let span_context = parse_header(
            "Root=1-5759e988-bd862e3fe1be46a994272793;Sampled=1;Sampled=0;Parent=53995c3f42cd8ad8;Parent=0000000000000001",
        )
        .unwrap();

        assert_eq!(span_context.span_id(), SpanId::from(1u64));
        assert!(!span_context.is_sampled());
    }

    #[test]
    fn round_trip() {
        for flags in [TraceFlags::default(), TraceFlags::SAMPLED] {
            let span_context = SpanContext::new(
                TraceId::from_hex("5759e988bd862e3fe1be46a994272793").unwrap(),
                SpanId::from_hex("53995c3f42cd8ad8").unwrap(),
                flags,
                true,
                TraceState::default(),
            );

            assert_eq!(parse_header(&format_header(&span_context)), Ok(span_context));
        }
    }

    #[test]
    fn xray_trace_id_text_form() {
        let trace_id = TraceId::from_hex("58406520a006649127e371903a2de979").unwrap();
        let xray_trace_id = XrayTraceId::from(trace_id);

        assert_eq!(xray_trace_id.to_string(), "1-58406520-a006649127e371903a2de979");
        assert_eq!(
            "1-58406520-a006649127e371903a2de979".parse::<XrayTraceId>(),
            Ok(xray_trace_id)
        );
        assert_eq!(TraceId::from(xray_trace_id), trace_id);
    }
}
