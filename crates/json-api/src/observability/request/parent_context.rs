//! Continue a caller's trace from W3C `traceparent` headers.

use opentelemetry::{
    Context, global,
    propagation::{Extractor, TextMapPropagator},
    trace::TraceContextExt as _,
};
use salvo::http::{HeaderMap, HeaderName};
use tracing::{Span, warn};
use tracing_opentelemetry::OpenTelemetrySpanExt as _;

use super::super::settings;

/// Parent `span` on the caller's trace when propagation is enabled and the
/// headers carry a valid context.
pub(super) fn adopt_parent(span: &Span, headers: &HeaderMap) {
    if !settings::otel_parent_propagation_enabled() {
        return;
    }

    let Some(parent) = global::get_text_map_propagator(|propagator| extract(propagator, headers))
    else {
        return;
    };

    if let Err(source) = span.set_parent(parent) {
        warn!("failed to set parent context on request span: {source}");
    }
}

fn extract(propagator: &dyn TextMapPropagator, headers: &HeaderMap) -> Option<Context> {
    // Fresh base context: absent headers must not inherit the in-process span.
    let context = propagator.extract_with_context(&Context::new(), &HeaderExtractor(headers));

    context.span().span_context().is_valid().then_some(context)
}

struct HeaderExtractor<'a>(&'a HeaderMap);

impl Extractor for HeaderExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|value| value.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(HeaderName::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use opentelemetry_sdk::propagation::TraceContextPropagator;
    use salvo::http::header::HeaderValue;

    use super::*;

    #[test]
    fn valid_traceparent_yields_context() {
        let mut headers = HeaderMap::new();

        headers.insert(
            "traceparent",
            HeaderValue::from_static("00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01"),
        );

        let context = extract(&TraceContextPropagator::new(), &headers);

        assert!(context.is_some());
    }

    #[test]
    fn missing_traceparent_yields_nothing() {
        let context = extract(&TraceContextPropagator::new(), &HeaderMap::new());

        assert!(context.is_none());
    }
}
