use super::error::TraceHeaderParseError;
use super::header::{format_header, parse_header};
use opentelemetry::{
    otel_debug,
    propagation::{text_map_propagator::FieldIter, Extractor, Injector, TextMapPropagator},
    trace::{SpanContext, TraceContextExt, TraceId},
    Context,
};
use std::sync::OnceLock;

pub(crate) const AWS_XRAY_TRACE_HEADER: &str = "X-Amzn-Trace-Id";

static AWS_XRAY_HEADER_FIELD: OnceLock<[String; 1]> = OnceLock::new();

fn xray_header_field() -> &'static [String; 1] {
    AWS_XRAY_HEADER_FIELD.get_or_init(|| [AWS_XRAY_TRACE_HEADER.to_ascii_lowercase()])
}

/// Extracts and injects `SpanContext`s into `Extractor`s or `Injector`s using AWS X-Ray header format.
///
/// Extracts and injects values to/from the `X-Amzn-Trace-Id` header, converting between
/// OpenTelemetry [SpanContext][otel-spec] and the [X-Ray trace header][xray-header]:
///
/// `X-Amzn-Trace-Id: Root=1-5759e988-bd862e3fe1be46a994272793;Parent=53995c3f42cd8ad8;Sampled=1`
///
/// Injection always writes the `Root`, `Parent` and `Sampled` fields. Extraction is strict:
/// a malformed header is rejected as a whole with a [`TraceHeaderParseError`] rather than
/// partially applied.
///
/// ## Example
///
/// ```
/// use opentelemetry::global;
/// use opentelemetry_xray::trace::XrayPropagator;
///
/// global::set_text_map_propagator(XrayPropagator::default());
/// ```
///
/// [otel-spec]: https://github.com/open-telemetry/opentelemetry-specification/blob/master/specification/trace/api.md#SpanContext
/// [xray-header]: https://docs.aws.amazon.com/xray/latest/devguide/xray-concepts.html#xray-concepts-tracingheader
#[derive(Clone, Debug, Default)]
pub struct XrayPropagator {
    _private: (),
}

impl XrayPropagator {
    /// Creates a new `XrayPropagator`.
    pub fn new() -> Self {
        XrayPropagator::default()
    }

    /// Write `span_context` into the `X-Amzn-Trace-Id` entry of `injector`.
    pub fn inject_span_context(&self, span_context: &SpanContext, injector: &mut dyn Injector) {
        injector.set(AWS_XRAY_TRACE_HEADER, format_header(span_context));
    }

    /// Read a remote span context from the `X-Amzn-Trace-Id` entry of `extractor`.
    ///
    /// Returns `Ok(None)` if the carrier has no such entry.
    pub fn extract_span_context(
        &self,
        extractor: &dyn Extractor,
    ) -> Result<Option<SpanContext>, TraceHeaderParseError> {
        extractor
            .get(AWS_XRAY_TRACE_HEADER)
            .map(|header_value| parse_header(header_value.trim()))
            .transpose()
    }
}

impl TextMapPropagator for XrayPropagator {
    fn inject_context(&self, cx: &Context, injector: &mut dyn Injector) {
        let span = cx.span();
        let span_context = span.span_context();
        // A zero span ID is still injected, it is what extraction yields without `Parent`.
        if span_context.trace_id() != TraceId::INVALID {
            self.inject_span_context(span_context, injector);
        }
    }

    fn extract_with_context(&self, cx: &Context, extractor: &dyn Extractor) -> Context {
        match self.extract_span_context(extractor) {
            Ok(Some(span_context)) => cx.with_remote_span_context(span_context),
            Ok(None) => cx.clone(),
            Err(err) => {
                otel_debug!(
                    name: "XrayPropagator.ExtractFailed",
                    error = err.to_string()
                );
                cx.clone()
            }
        }
    }

    fn fields(&self) -> FieldIter<'_> {
        FieldIter::new(xray_header_field())
    }
}
