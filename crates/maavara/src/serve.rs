use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    routing::post,
    Json, Router,
};
use maavara_core::prompt::{render_prompt, ExplainRequest, ExplanationKind};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};

use crate::anthropic::{Anthropic, SYSTEM_PROMPT};
use crate::prelude::{eprintln, *};

#[derive(Debug, clap::Parser)]
pub struct ServeOptions {
    /// Address to bind.
    #[clap(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on.
    #[clap(long, default_value = "8787")]
    pub port: u16,

    /// Model identifier for the completion service.
    #[clap(long, env = "MAAVARA_MODEL", default_value = "claude-sonnet-4-5-20250514")]
    pub model: String,

    /// Completion-service credential. Server-side only, never echoed.
    #[clap(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

pub struct ServeContext {
    pub client: Anthropic,
}

pub async fn run(options: ServeOptions, global: crate::Global) -> Result<()> {
    if global.verbose {
        eprintln!(
            "Starting explanation server on {}:{}...",
            options.host, options.port
        );
    }

    let addr = f!("{}:{}", options.host, options.port);

    let client = Anthropic::new(options.api_key, options.model)?;
    let context = Arc::new(ServeContext { client });
    let app_router = router(context);

    if global.verbose {
        eprintln!("Explanation endpoint: http://{addr}/api/explain");
    }

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| eyre!("Failed to bind to {}: {}", addr, e))?;

    axum::serve(listener, app_router)
        .await
        .map_err(|e| eyre!("Server error: {e}"))?;

    Ok(())
}

fn router(context: Arc<ServeContext>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route(
            "/api/explain",
            post(explain_handler)
                .options(preflight_handler)
                .fallback(method_not_allowed),
        )
        .layer(cors)
        .with_state(context)
}

async fn explain_handler(
    State(context): State<Arc<ServeContext>>,
    Json(request): Json<ExplainRequest>,
) -> (StatusCode, Json<Value>) {
    if request.kind == ExplanationKind::Unknown {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "unknown explanation type" })),
        );
    }

    let prompt = render_prompt(&request);

    match context
        .client
        .complete(SYSTEM_PROMPT, &prompt.user_text, prompt.max_tokens)
        .await
    {
        Ok(text) => (StatusCode::OK, Json(json!({ "text": text }))),
        Err(err) => {
            eprintln!("AI request failed: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "AI request failed" })),
            )
        }
    }
}

// CORS preflights are answered by the layer; this covers bare OPTIONS.
async fn preflight_handler() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed() -> (StatusCode, Json<Value>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "POST only" })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::response::Response;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    // No credential configured, so no request ever leaves the process.
    fn test_router() -> Router {
        let client = Anthropic::new(None, "test-model".to_string()).unwrap();
        router(Arc::new(ServeContext { client }))
    }

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_options_returns_ok_with_empty_body() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/explain")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_preflight_carries_cors_headers() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/explain")
                    .header(header::ORIGIN, "https://example.com")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
        let methods = response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_METHODS)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(methods.contains("POST"));
        assert!(methods.contains("OPTIONS"));
    }

    #[tokio::test]
    async fn test_get_returns_405_post_only() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .method(Method::GET)
                    .uri("/api/explain")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body_json(response).await, json!({ "error": "POST only" }));
    }

    #[tokio::test]
    async fn test_unknown_type_is_rejected() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/explain")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"type":"write_my_drasha"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "unknown explanation type" })
        );
    }

    #[tokio::test]
    async fn test_failed_outbound_call_returns_500() {
        // The test client has no credential, so the adapter fails before
        // any network traffic and the handler maps it to the generic 500.
        let response = test_router()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/explain")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        r#"{"type":"weekly_summary","parasha":"Noach"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "AI request failed" })
        );
    }

    #[tokio::test]
    async fn test_post_response_carries_cors_headers() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/explain")
                    .header(header::ORIGIN, "https://example.com")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"type":"unheard_of"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
    }
}
