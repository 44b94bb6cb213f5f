//! HTTP response building module

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

/// Body of every unmatched request
pub const NOT_FOUND_BODY: &str = "Not found";

const TEXT_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Build a short text response
///
/// HEAD responses keep the `Content-Length` of the full body but carry no bytes.
pub fn build_text_response(
    status: StatusCode,
    content: impl Into<Bytes>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content = content.into();
    let content_length = content.len();
    let body = if is_head { Bytes::new() } else { content };

    Response::builder()
        .status(status)
        .header("Content-Type", TEXT_CONTENT_TYPE)
        .header("Content-Length", content_length)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(status, &e);
            let mut fallback = Response::new(Full::new(Bytes::new()));
            *fallback.status_mut() = status;
            fallback
        })
}

/// Build 404 Not Found response
pub fn build_404_response(is_head: bool) -> Response<Full<Bytes>> {
    build_text_response(StatusCode::NOT_FOUND, NOT_FOUND_BODY, is_head)
}

fn log_build_error(status: StatusCode, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_string(resp: Response<Full<Bytes>>) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_404_response() {
        let resp = build_404_response(false);
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(resp.headers()["content-length"], "9");
        assert_eq!(body_string(resp).await, "Not found");
    }

    #[tokio::test]
    async fn test_head_keeps_length_drops_body() {
        let resp = build_text_response(StatusCode::OK, "hello", true);
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["content-length"], "5");
        assert_eq!(resp.headers()["content-type"], TEXT_CONTENT_TYPE);
        assert_eq!(body_string(resp).await, "");
    }
}
