//! Request ID resolution and response header helpers.

use salvo::{
    http::{StatusCode, header::HeaderValue},
    prelude::Response,
};
use tracing::warn;
use uuid::Uuid;

pub(super) const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_REQUEST_ID_LEN: usize = 128;

/// Keep a caller supplied id when it is short, visible ASCII; mint a v7 UUID
/// otherwise.
pub(super) fn resolve_request_id(header_value: Option<String>) -> String {
    header_value
        .map(|value| value.trim().to_string())
        .filter(|value| {
            !value.is_empty()
                && value.len() <= MAX_REQUEST_ID_LEN
                && value.bytes().all(|byte| byte.is_ascii_graphic())
        })
        .unwrap_or_else(|| Uuid::now_v7().to_string())
}

pub(super) fn set_request_id_header(res: &mut Response, request_id: &str) {
    match HeaderValue::from_str(request_id) {
        Ok(value) => {
            res.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        Err(source) => {
            warn!(request_id, "request id is not a valid header value: {source}");
        }
    }
}

/// Salvo leaves the status unset for plain successful writes.
pub(super) fn response_status(res: &Response) -> StatusCode {
    res.status_code.unwrap_or(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_request_id_is_kept() {
        assert_eq!(
            resolve_request_id(Some(" desk-42 ".to_string())),
            "desk-42".to_string()
        );
    }

    #[test]
    fn unusable_request_ids_are_replaced() {
        for header in [None, Some(String::new()), Some("has space".to_string()), Some("x".repeat(200))] {
            let resolved = resolve_request_id(header.clone());

            assert!(Uuid::parse_str(&resolved).is_ok(), "{header:?} -> {resolved}");
        }
    }
}
