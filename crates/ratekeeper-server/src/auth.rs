// ABOUTME: Bearer token guard applied to the routes that require a logged-in admin.
// ABOUTME: Verifies the Authorization header and exposes the token claims to handlers as an extension.

use axum::body::Body;
use axum::http::header::AUTHORIZATION;
use axum::http::{Request, Response};
use axum::response::IntoResponse;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

use crate::error::ApiError;
use crate::token::{Claims, TokenService};

/// A tower Layer that rejects requests lacking a valid bearer token.
#[derive(Clone)]
pub struct AuthLayer {
    tokens: Arc<TokenService>,
}

impl AuthLayer {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            tokens: Arc::clone(&self.tokens),
        }
    }
}

/// The middleware service produced by [`AuthLayer`].
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    tokens: Arc<TokenService>,
}

impl<S> Service<Request<Body>> for AuthMiddleware<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let verified = bearer_token(&req)
            .ok_or(ApiError::Unauthorized)
            .and_then(|token| self.tokens.verify_token(token).map_err(ApiError::from));

        match verified {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
                // The clone may not be ready; keep the one poll_ready was called on.
                let clone = self.inner.clone();
                let mut inner = std::mem::replace(&mut self.inner, clone);
                Box::pin(async move { inner.call(req).await })
            }
            Err(err) => Box::pin(async move { Ok(err.into_response()) }),
        }
    }
}

/// Extract `<token>` from `Authorization: Bearer <token>`.
fn bearer_token<B>(req: &Request<B>) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Claims of the authenticated caller, available to handlers behind the guard.
pub type AuthClaims = axum::Extension<Claims>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::get;
    use http::Request;
    use std::time::Duration;
    use tower::ServiceExt;
    use ulid::Ulid;

    fn tokens() -> Arc<TokenService> {
        Arc::new(TokenService::new("test-secret", Some(Duration::from_secs(3600))))
    }

    fn test_router(tokens: Arc<TokenService>) -> Router {
        Router::new()
            .route(
                "/rate/admin",
                get(|axum::Extension(claims): AuthClaims| async move {
                    claims.user_id.to_string()
                }),
            )
            .route_layer(AuthLayer::new(tokens))
            .route("/health", get(|| async { "ok" }))
    }

    #[tokio::test]
    async fn auth_middleware_rejects_without_token() {
        let app = test_router(tokens());

        let resp = app
            .oneshot(Request::get("/rate/admin").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "Unauthorized");
    }

    #[tokio::test]
    async fn auth_middleware_allows_with_valid_token() {
        let tokens = tokens();
        let user_id = Ulid::new();
        let token = tokens.issue_token(user_id).unwrap();
        let app = test_router(tokens);

        let resp = app
            .oneshot(
                Request::get("/rate/admin")
                    .header("authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body, user_id.to_string());
    }

    #[tokio::test]
    async fn auth_middleware_rejects_foreign_token() {
        let foreign = TokenService::new("someone-else", Some(Duration::from_secs(3600)))
            .issue_token(Ulid::new())
            .unwrap();
        let app = test_router(tokens());

        let resp = app
            .oneshot(
                Request::get("/rate/admin")
                    .header("authorization", format!("Bearer {}", foreign))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn auth_middleware_rejects_non_bearer_scheme() {
        let tokens = tokens();
        let token = tokens.issue_token(Ulid::new()).unwrap();
        let app = test_router(tokens);

        let resp = app
            .oneshot(
                Request::get("/rate/admin")
                    .header("authorization", format!("Basic {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn auth_middleware_leaves_unguarded_routes_alone() {
        let app = test_router(tokens());

        let resp = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
    }
}
