use std::time::Instant;

use axum::{
    body::{Body, HttpBody},
    extract::Request,
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::BodyExt;
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

use crate::error::{ServerError, BODY_VALIDATION_ERROR};

pub static X_TRACE_ID: &str = "x-trace-id";

/// JSON bodies whose exact length is known and at most this size are buffered
/// and logged at debug level. Anything else streams through unread.
const MAX_LOGGED_BODY: u64 = 1024;

/// Tag every request with a trace ID and log request / response summaries.
///
/// A valid UUID in the incoming `x-trace-id` header is reused; otherwise a new
/// one is generated. The ID is echoed back on the response.
pub async fn trace_middleware(req: Request<Body>, next: Next) -> Response {
    let start_time = Instant::now();

    let trace_id = req
        .headers()
        .get(X_TRACE_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);

    let span = info_span!(
        "http_request",
        trace_id = %trace_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    async move {
        info!("→ request started");
        let header_value = HeaderValue::from_str(&trace_id.to_string()).ok();

        let (parts, body) = req.into_parts();
        let mut response = match log_body("request", &parts.headers, body).await {
            Ok(body) => {
                let mut req = Request::from_parts(parts, body);
                if let Some(v) = &header_value {
                    req.headers_mut().insert(X_TRACE_ID, v.clone());
                }
                let response = next.run(req).await;

                let (parts, body) = response.into_parts();
                match log_body("response", &parts.headers, body).await {
                    Ok(body) => Response::from_parts(parts, body),
                    Err(e) => {
                        ServerError::Internal(format!("failed to read response body: {e}"))
                            .into_response()
                    }
                }
            }
            Err(e) => ServerError::validation(
                BODY_VALIDATION_ERROR,
                format!("failed to read request body: {e}"),
            )
            .into_response(),
        };
        if let Some(v) = header_value {
            response.headers_mut().insert(X_TRACE_ID, v);
        }

        info!(
            status = response.status().as_u16(),
            latency_ms = start_time.elapsed().as_millis(),
            "← response finished"
        );
        response
    }
    .instrument(span)
    .await
}

/// Log a small JSON body and hand back an equivalent one.
///
/// Only bodies with a known length of at most [`MAX_LOGGED_BODY`] bytes are
/// read; others are returned untouched so size limits downstream still apply
/// before anything is held in memory.
async fn log_body(direction: &str, headers: &HeaderMap, body: Body) -> Result<Body, axum::Error> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let size = body.size_hint().exact();

    let loggable = content_type.contains("application/json")
        && size.is_some_and(|n| n <= MAX_LOGGED_BODY);
    if !loggable {
        match size {
            Some(0) => {}
            Some(n) => debug!("{} body: [skipped: type={}, size={}]", direction, content_type, n),
            None => debug!("{} body: [skipped: type={}, streamed]", direction, content_type),
        }
        return Ok(body);
    }

    let bytes = body.collect().await?.to_bytes();
    match std::str::from_utf8(&bytes) {
        Ok(text) => debug!("{} body: {}", direction, text),
        Err(_) => debug!("{} body: [skipped: not utf-8, size={}]", direction, bytes.len()),
    }
    Ok(Body::from(bytes))
}

#[cfg(test)]
mod test {
    use super::*;
    use axum::body::Bytes;
    use http_body_util::{Full, Limited};
    use tracing_test::traced_test;

    fn json_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    #[tokio::test]
    #[traced_test]
    async fn small_json_bodies_are_logged_and_preserved() {
        let body = Body::from(r#"{"title":"Write docs"}"#);
        let out = log_body("request", &json_headers(), body).await.unwrap();
        let bytes = out.collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], br#"{"title":"Write docs"}"#);
        assert!(logs_contain("Write docs"));
    }

    #[tokio::test]
    #[traced_test]
    async fn oversized_bodies_stream_through_unread() {
        let payload = vec![b'x'; 4 * MAX_LOGGED_BODY as usize];
        let out = log_body("request", &json_headers(), Body::from(payload.clone()))
            .await
            .unwrap();
        assert!(logs_contain("skipped"));
        assert!(!logs_contain("xxxx"));
        assert_eq!(out.size_hint().exact(), Some(payload.len() as u64));
        assert_eq!(out.collect().await.unwrap().to_bytes(), Bytes::from(payload));
    }

    #[tokio::test]
    async fn read_failures_are_reported() {
        // Claims four bytes but yields a longer frame, so reading it fails.
        let failing = Limited::new(Full::new(Bytes::from_static(br#"{"title":"x"}"#)), 4);
        let result = log_body("request", &json_headers(), Body::new(failing)).await;
        assert!(result.is_err());
    }
}
