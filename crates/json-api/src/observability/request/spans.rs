//! Span naming for admin API requests.
//!
//! Booking, agreement and invoice routes carry record UUIDs in the path; these
//! collapse to `{uuid}` so span names and metric routes stay low-cardinality.

use uuid::Uuid;

const UUID_PLACEHOLDER: &str = "{uuid}";

#[derive(Debug, Clone)]
pub(super) struct RequestSpanName {
    pub(super) otel_path: String,
    pub(super) otel_span_name: String,
}

pub(super) fn request_span_name(method: &str, path: &str) -> RequestSpanName {
    let otel_path = route_template(path);

    RequestSpanName {
        otel_span_name: format!("{method} {otel_path}"),
        otel_path,
    }
}

fn route_template(path: &str) -> String {
    let segments: Vec<&str> = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            if Uuid::parse_str(segment).is_ok() {
                UUID_PLACEHOLDER
            } else {
                segment
            }
        })
        .collect();

    format!("/{}", segments.join("/"))
}
