use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ParseError;

pub const PARSE_MEAL_PATH: &str = "/api/parse-meal";

/// Error payload returned for every failed parse request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,    // machine-oriented reason, e.g. "no_foods_found"
    pub message: String,  // human-readable, shown inline by the UI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,  // upstream diagnostic text
}

impl From<&ParseError> for ErrorBody {
    fn from(err: &ParseError) -> Self {
        Self {
            error: err.reason().to_string(),
            message: err.to_string(),
            details: err.details().map(str::to_string),
        }
    }
}

/// Pull the utterance out of a `{"input": "..."}` request body.
pub fn utterance_from_body(body: &str) -> Result<String, ParseError> {
    let payload: Value = serde_json::from_str(body)
        .map_err(|e| ParseError::InvalidInput(format!("request body is not JSON: {}", e)))?;

    match payload.get("input") {
        Some(Value::String(input)) => Ok(input.clone()),
        Some(_) => Err(ParseError::InvalidInput("input must be a string".to_string())),
        None => Err(ParseError::InvalidInput("missing input field".to_string())),
    }
}

// Axum integration
#[cfg(feature = "server")]
pub mod server {
    use super::*;
    use axum::{
        extract::State,
        http::StatusCode,
        response::{IntoResponse, Response},
        routing::{get, post},
        Json, Router,
    };
    use std::sync::Arc;
    use tower_http::cors::CorsLayer;

    use crate::handlers::MealParser;

    pub struct AppState {
        pub meal_parser: Arc<MealParser>,
    }

    pub fn create_router(meal_parser: Arc<MealParser>) -> Router {
        let state = Arc::new(AppState { meal_parser });

        Router::new()
            .route("/", get(root_handler))
            .route(PARSE_MEAL_PATH, post(parse_meal_handler))
            .route("/health", get(health_check))
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    async fn parse_meal_handler(State(state): State<Arc<AppState>>, body: String) -> Response {
        log::info!("🔔 Parse request received ({} bytes)", body.len());
        log::debug!("📦 Raw body: {}", body);

        let result = match utterance_from_body(&body) {
            Ok(utterance) => state.meal_parser.parse(&utterance).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(items) => {
                log::info!("✅ Returning {} food items", items.len());
                (StatusCode::OK, Json(items)).into_response()
            }
            Err(e) => error_response(&e),
        }
    }

    fn error_response(err: &ParseError) -> Response {
        if err.is_caller_error() {
            log::warn!("⚠️ Parse request rejected: {}", err);
        } else {
            log::error!("❌ Parse request failed ({}): {}", err.reason(), err);
        }

        let status = StatusCode::from_u16(err.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorBody::from(err))).into_response()
    }

    async fn root_handler() -> &'static str {
        "Meal Parser - POST {\"input\": \"...\"} to /api/parse-meal"
    }

    async fn health_check() -> &'static str {
        "OK"
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::handlers::meal_parser::tests::MockBackend;
        use crate::models::FoodItem;
        use axum::body::Body;
        use axum::http::Request;
        use tower::ServiceExt;

        fn app(backend: Arc<MockBackend>) -> Router {
            create_router(Arc::new(MealParser::new(backend)))
        }

        async fn post_body(router: Router, body: &str) -> (StatusCode, Vec<u8>) {
            let request = Request::builder()
                .method("POST")
                .uri(PARSE_MEAL_PATH)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap();

            let response = router.oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
            (status, bytes.to_vec())
        }

        #[tokio::test]
        async fn test_parse_meal_success() {
            let backend = MockBackend::replying(
                r#"```json
[{"name":"2 scrambled eggs","estimated_calories":180,"estimated_protein":12,"assumed_weight_g":100,"notes":"large eggs with butter"}]
```"#,
            );
            let (status, body) = post_body(app(backend), r#"{"input": "2 scrambled eggs"}"#).await;

            assert_eq!(status, StatusCode::OK);
            let items: Vec<FoodItem> = serde_json::from_slice(&body).unwrap();
            assert_eq!(items.len(), 1);
            assert_eq!(items[0].name, "2 scrambled eggs");
            assert_eq!(items[0].estimated_calories, 180.0);
        }

        #[tokio::test]
        async fn test_invalid_bodies_are_bad_requests() {
            for body in ["not json", r#"{"text": "eggs"}"#, r#"{"input": 42}"#, r#"{"input": "  "}"#] {
                let backend = MockBackend::replying("[]");
                let (status, bytes) = post_body(app(backend.clone()), body).await;

                assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);
                let error: ErrorBody = serde_json::from_slice(&bytes).unwrap();
                assert_eq!(error.error, "invalid_input");
                assert_eq!(backend.call_count(), 0);
            }
        }

        #[tokio::test]
        async fn test_no_foods_found() {
            let (status, bytes) = post_body(app(MockBackend::replying("[]")), r#"{"input": "hello"}"#).await;

            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
            let error: ErrorBody = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(error.error, "no_foods_found");
            assert_eq!(error.details, None);
        }

        #[tokio::test]
        async fn test_upstream_error_carries_details() {
            let backend = MockBackend::failing(crate::services::BackendError::Status {
                status: 503,
                body: "overloaded".to_string(),
            });
            let (status, bytes) = post_body(app(backend), r#"{"input": "toast"}"#).await;

            assert_eq!(status, StatusCode::BAD_GATEWAY);
            let error: ErrorBody = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(error.error, "upstream_error");
            assert_eq!(error.details.as_deref(), Some("overloaded"));
        }

        #[tokio::test]
        async fn test_missing_credential_is_server_error() {
            let backend = MockBackend::failing(crate::services::BackendError::MissingCredential);
            let (status, bytes) = post_body(app(backend), r#"{"input": "toast"}"#).await;

            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            let error: ErrorBody = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(error.error, "missing_credential");
        }

        #[tokio::test]
        async fn test_health_check() {
            let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
            let response = app(MockBackend::replying("[]")).oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utterance_from_body() {
        assert_eq!(
            utterance_from_body(r#"{"input": "a bowl of ramen"}"#).unwrap(),
            "a bowl of ramen"
        );
        assert!(matches!(utterance_from_body("{}"), Err(ParseError::InvalidInput(_))));
        assert!(matches!(utterance_from_body(r#"{"input": null}"#), Err(ParseError::InvalidInput(_))));
        assert!(matches!(utterance_from_body("["), Err(ParseError::InvalidInput(_))));
    }

    #[test]
    fn test_error_body_shape() {
        let body = ErrorBody::from(&ParseError::Upstream {
            status: Some(500),
            details: "server exploded".to_string(),
        });
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["error"], "upstream_error");
        assert_eq!(json["details"], "server exploded");

        let json = serde_json::to_value(ErrorBody::from(&ParseError::ExtractionFailure)).unwrap();
        assert_eq!(json["error"], "unparseable_reply");
        assert!(json.get("details").is_none());
    }
}
