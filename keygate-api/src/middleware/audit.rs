/// Activity audit middleware
///
/// Logs two events per request on the dedicated `audit` target: one before
/// the handler (method, path, query string, authenticated user when present,
/// and the JSON request body with configured sensitive fields masked) and
/// one after it (the response status). Subscribers can route the `audit`
/// target to separate storage via the standard env-filter syntax.
///
/// Auditing never fails or delays the request: unreadable, oversized, or
/// non-JSON bodies are logged without a payload and the body reaches the
/// handler untouched.

use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use keygate_shared::auth::middleware::AuthContext;
use serde_json::Value;
use tracing::info;

use crate::app::AppState;

/// Bodies larger than this are not captured for audit.
const MAX_AUDIT_BODY_BYTES: usize = 64 * 1024;

/// Logs the request and its outcome on the `audit` target, masking
/// sensitive fields.
pub async fn audit(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let (parts, body) = req.into_parts();

    let method = parts.method.clone();
    let path = parts.uri.path().to_string();
    let query = parts.uri.query().unwrap_or("").to_string();
    let user_id = parts
        .extensions
        .get::<AuthContext>()
        .map(|ctx| ctx.user_id.to_string());

    // Capture only bodies whose declared length fits the cap. Oversized or
    // length-less bodies pass through unread so the handler still gets them.
    let declared_len = parts
        .headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());

    let (payload, body) = match declared_len {
        Some(len) if len <= MAX_AUDIT_BODY_BYTES => {
            match axum::body::to_bytes(body, MAX_AUDIT_BODY_BYTES).await {
                Ok(bytes) => {
                    let payload = masked_payload(&bytes, &state.config.audit.masked_fields);
                    (payload, Body::from(bytes))
                }
                // The body stream itself errored; nothing left to forward.
                Err(_) => ("-".to_string(), Body::empty()),
            }
        }
        _ => ("-".to_string(), body),
    };

    info!(
        target: "audit",
        method = %method,
        path = %path,
        query = %query,
        user_id = user_id.as_deref().unwrap_or("-"),
        payload = %payload,
        "request"
    );

    let req = Request::from_parts(parts, body);
    let response = next.run(req).await;

    info!(
        target: "audit",
        method = %method,
        path = %path,
        user_id = user_id.as_deref().unwrap_or("-"),
        status = response.status().as_u16(),
        "response"
    );

    response
}

/// Renders the body for the audit log with masked field values.
///
/// Non-JSON and empty bodies render as "-"; masking recurses into nested
/// objects and arrays so credentials inside wrapper objects are covered too.
fn masked_payload(bytes: &Bytes, masked_fields: &[String]) -> String {
    if bytes.is_empty() {
        return "-".to_string();
    }

    match serde_json::from_slice::<Value>(bytes) {
        Ok(mut value) => {
            mask_fields(&mut value, masked_fields);
            value.to_string()
        }
        Err(_) => "-".to_string(),
    }
}

fn mask_fields(value: &mut Value, masked_fields: &[String]) {
    match value {
        Value::Object(map) => {
            for (key, entry) in map.iter_mut() {
                if masked_fields.iter().any(|f| f == key) {
                    *entry = Value::String("***".to_string());
                } else {
                    mask_fields(entry, masked_fields);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                mask_fields(item, masked_fields);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware::from_fn_with_state, routing::post, Router};
    use sqlx::PgPool;
    use tower::ServiceExt;

    fn audited_echo_app() -> Router {
        let state = AppState::new(
            PgPool::connect_lazy("postgresql://localhost/audit_test").unwrap(),
            crate::config::tests::test_config(),
        );

        Router::new()
            .route(
                "/echo",
                post(|body: Bytes| async move { body.len().to_string() }),
            )
            .layer(from_fn_with_state(state, audit))
    }

    fn echo_request(body: Vec<u8>) -> axum::http::Request<Body> {
        axum::http::Request::builder()
            .method("POST")
            .uri("/echo")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::CONTENT_LENGTH, body.len())
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_oversized_body_reaches_handler_intact() {
        let app = audited_echo_app();
        let len = MAX_AUDIT_BODY_BYTES + 6 * 1024;

        let response = app.oneshot(echo_request(vec![b'a'; len])).await.unwrap();

        assert_eq!(body_string(response).await, len.to_string());
    }

    #[tokio::test]
    async fn test_capturable_body_reaches_handler_intact() {
        let app = audited_echo_app();
        let body = br#"{"password":"hunter2"}"#.to_vec();
        let len = body.len();

        let response = app.oneshot(echo_request(body)).await.unwrap();

        assert_eq!(body_string(response).await, len.to_string());
    }

    fn masked(json: &str) -> String {
        let fields = vec!["password".to_string(), "secret_key".to_string()];
        masked_payload(&Bytes::from(json.to_string()), &fields)
    }

    #[test]
    fn test_masks_top_level_fields() {
        let out = masked(r#"{"email":"a@b.com","password":"hunter2"}"#);
        assert!(out.contains(r#""password":"***""#));
        assert!(out.contains("a@b.com"));
    }

    #[test]
    fn test_masks_nested_fields() {
        let out = masked(r#"{"application":{"name":"x","secret_key":"s3cret"}}"#);
        assert!(out.contains(r#""secret_key":"***""#));
        assert!(!out.contains("s3cret"));
    }

    #[test]
    fn test_non_json_body_logged_without_payload() {
        assert_eq!(masked("not json"), "-");
        assert_eq!(
            masked_payload(&Bytes::new(), &["password".to_string()]),
            "-"
        );
    }
}
