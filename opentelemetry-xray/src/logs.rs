//! Log correlation with X-Ray formatted IDs.
use crate::trace::XrayTraceId;
use opentelemetry::{trace::TraceContextExt, Context};
use std::borrow::Cow;

const DEFAULT_TRACE_ID_KEY: &str = "trace-id";
const DEFAULT_SPAN_ID_KEY: &str = "span-id";

/// Provides the trace and span ID of a [`Context`] as log metadata.
///
/// The trace ID uses the X-Ray text form (`1-58406520-a006649127e371903a2de979`) so log
/// lines can be matched against traces in the X-Ray console. Nothing is returned when the
/// context carries no valid span.
///
/// ## Example
///
/// ```
/// use opentelemetry_xray::logs::XrayLogMetadata;
///
/// let metadata = XrayLogMetadata::new().with_trace_id_key("xray_trace_id");
/// for (key, value) in metadata.current() {
///     println!("{key}={value}");
/// }
/// ```
#[derive(Clone, Debug)]
pub struct XrayLogMetadata {
    trace_id_key: Cow<'static, str>,
    span_id_key: Cow<'static, str>,
}

impl Default for XrayLogMetadata {
    fn default() -> Self {
        XrayLogMetadata {
            trace_id_key: Cow::Borrowed(DEFAULT_TRACE_ID_KEY),
            span_id_key: Cow::Borrowed(DEFAULT_SPAN_ID_KEY),
        }
    }
}

impl XrayLogMetadata {
    /// Create a provider using the `trace-id` and `span-id` keys.
    pub fn new() -> Self {
        XrayLogMetadata::default()
    }

    /// Set the key of the trace ID entry.
    pub fn with_trace_id_key(mut self, key: impl Into<Cow<'static, str>>) -> Self {
        self.trace_id_key = key.into();
        self
    }

    /// Set the key of the span ID entry.
    pub fn with_span_id_key(mut self, key: impl Into<Cow<'static, str>>) -> Self {
        self.span_id_key = key.into();
        self
    }

    /// Metadata for the span active in `cx`.
    pub fn metadata(&self, cx: &Context) -> Vec<(Cow<'static, str>, String)> {
        let span = cx.span();
        let span_context = span.span_context();
        if !span_context.is_valid() {
            return Vec::new();
        }

        vec![
            (
                self.trace_id_key.clone(),
                XrayTraceId::from(span_context.trace_id()).to_string(),
            ),
            (self.span_id_key.clone(), span_context.span_id().to_string()),
        ]
    }

    /// Metadata for the span active in the current context.
    pub fn current(&self) -> Vec<(Cow<'static, str>, String)> {
        Context::map_current(|cx| self.metadata(cx))
    }
}
