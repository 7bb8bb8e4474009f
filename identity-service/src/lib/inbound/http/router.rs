use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::http::StatusCode;
use axum::routing::delete;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::create_user::create_user;
use super::handlers::delete_user::delete_user;
use super::handlers::issue_token::issue_token;
use super::handlers::refresh_token::refresh_token;
use crate::domain::credential::ports::AuthFlowPort;

#[derive(Clone)]
pub struct AppState {
    pub auth_flow: Arc<dyn AuthFlowPort>,
}

pub fn create_router(auth_flow: Arc<dyn AuthFlowPort>) -> Router {
    let state = AppState { auth_flow };

    let user_routes = Router::new()
        .route("/users", post(create_user))
        .route("/users/me", delete(delete_user));

    let token_routes = Router::new()
        .route("/auth", post(issue_token))
        .route("/auth/refresh", post(refresh_token));

    // Headers are left out of the span: they carry bearer tokens
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .route("/health", get(|| async { StatusCode::OK }))
        .nest("/key-stone", user_routes.merge(token_routes))
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use auth::JwtHandler;
    use auth::PasswordHasher;
    use axum::http::header;
    use http_body_util::BodyExt;
    use serde_json::json;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::domain::credential::service::AuthFlow;
    use crate::outbound::clock::SystemClock;
    use crate::outbound::repositories::InMemoryCredentialRepository;
    use crate::outbound::security::Argon2CredentialHasher;

    fn router() -> Router {
        let auth_flow = AuthFlow::new(
            Arc::new(InMemoryCredentialRepository::new()),
            Arc::new(Argon2CredentialHasher::new(
                PasswordHasher::with_params(1024, 1, 1).unwrap(),
                2,
            )),
            Arc::new(JwtHandler::new("key-stone", b"public_secret_at_least_32_bytes_long")),
            Arc::new(JwtHandler::new("key-stone", b"private_secret_at_least_32_bytes_lon")),
            Arc::new(SystemClock),
        );

        create_router(Arc::new(auth_flow))
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response<Body>) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_create_then_issue() {
        let router = router();
        let user = json!({ "user": { "username": "alice", "password": "s3cr3t" } });

        let response = router
            .clone()
            .oneshot(json_request("POST", "/key-stone/users", user.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = router
            .oneshot(json_request("POST", "/key-stone/auth", user))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["status_code"], 200);
        assert_eq!(body["data"]["token_type"], "Bearer");
        assert_eq!(body["data"]["expires_in"], 900);
        assert!(body["data"]["access_token"].is_string());
        assert!(body["data"]["refresh_token"].is_string());
    }

    #[tokio::test]
    async fn test_create_invalid_username() {
        let response = router()
            .oneshot(json_request(
                "POST",
                "/key-stone/users",
                json!({ "user": { "username": "../etc", "password": "s3cr3t" } }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_delete_without_authorization() {
        let response = router()
            .oneshot(
                Request::delete("/key-stone/users/me")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["data"]["message"], "Unauthorized");
    }
}
