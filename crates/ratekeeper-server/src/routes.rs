// ABOUTME: Route definitions for the ratekeeper HTTP API and static landing page.
// ABOUTME: Applies the bearer guard to admin routes, and to record mutations when configured.

use axum::Router;
use axum::routing::{MethodRouter, delete, get, get_service, post, put};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::api::{admin, datas, users};
use crate::app_state::SharedState;
use crate::auth::AuthLayer;

/// Build the complete Axum router with all routes and shared state.
pub fn create_router(state: SharedState) -> Router {
    let guard = AuthLayer::new(state.tokens.clone());
    let write_guard = state.config.protect_writes.then(|| guard.clone());
    let writes = |route: MethodRouter<SharedState>| match &write_guard {
        Some(layer) => route.route_layer(layer.clone()),
        None => route,
    };

    let static_dir = state.config.static_dir.clone();

    Router::new()
        .route("/health", get(health))
        .route("/rate/registers", post(users::register))
        .route("/rate/login", post(users::login))
        .route(
            "/rate/datas",
            get(datas::get_data).merge(writes(post(datas::create_data))),
        )
        .route("/rate/datas/{id}", writes(put(datas::update_data)))
        .route(
            "/rate/datas/{id}/items/{item_id}",
            writes(delete(datas::delete_item)),
        )
        .route(
            "/rate/users/check",
            get(users::check_users).route_layer(guard.clone()),
        )
        .route(
            "/rate/admin",
            get(admin::get_admin_data).route_layer(guard),
        )
        .route("/", get_service(ServeFile::new(static_dir.join("index.html"))))
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler. Returns 200 OK with a simple JSON body.
async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_state::AppState;
    use crate::config::ServerConfig;
    use axum::body::Body;
    use axum::http::StatusCode;
    use http::Request;
    use ratekeeper_core::Credentials;
    use ratekeeper_store::Database;
    use std::sync::Arc;
    use tower::ServiceExt;

    const SECRET: &str = "route-test-secret";

    fn test_config() -> ServerConfig {
        let mut config = ServerConfig::new(SECRET);
        config.hash_cost = 4;
        config
    }

    fn test_state_with(config: ServerConfig) -> SharedState {
        let db = Database::open_in_memory().unwrap();
        Arc::new(AppState::new(&db, config))
    }

    fn test_state() -> SharedState {
        test_state_with(test_config())
    }

    async fn send(
        state: &SharedState,
        req: Request<Body>,
    ) -> (StatusCode, serde_json::Value) {
        let resp = create_router(Arc::clone(state)).oneshot(req).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap()
    }

    fn get_with_token(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::get(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn record_body() -> serde_json::Value {
        serde_json::json!({
            "thRate": 800,
            "mmRate": 780,
            "versionCode": 4,
            "title": "Update available",
            "message": "Please update",
            "link": "https://example.com/app",
            "items": [
                { "thbBill": "50฿", "mmkBill": "5000Ks" },
                { "thbBill": "100฿", "mmkBill": "10000Ks" }
            ]
        })
    }

    async fn login_token(state: &SharedState, username: &str, password: &str) -> String {
        state
            .users
            .register(&Credentials::new(username, password))
            .unwrap();
        let (status, json) = send(
            state,
            json_request(
                "POST",
                "/rate/login",
                serde_json::json!({ "username": username, "password": password }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        json["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let (status, json) = send(
            &test_state(),
            Request::get("/health").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(status, 200);
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn register_twice_fails_the_second_time() {
        let state = test_state();
        let body = serde_json::json!({ "username": "alice", "password": "pw" });

        let (status, json) = send(&state, json_request("POST", "/rate/registers", body.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "User registered successfully!");

        let (status, json) = send(&state, json_request("POST", "/rate/registers", body)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Internal Server Error");
    }

    #[tokio::test]
    async fn register_without_password_is_a_server_error() {
        let state = test_state();
        let (status, _) = send(
            &state,
            json_request("POST", "/rate/registers", serde_json::json!({ "username": "bob" })),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(state.users.count_users().unwrap(), 0);
    }

    #[tokio::test]
    async fn login_returns_verifiable_token() {
        let state = test_state();
        let token = login_token(&state, "admin", "pw").await;

        let claims = state.tokens.verify_token(&token).unwrap();
        let admin = state.users.find_by_username("admin").unwrap().unwrap();
        assert_eq!(claims.user_id, admin.user_id);
    }

    #[tokio::test]
    async fn login_with_bad_credentials_is_401() {
        let state = test_state();
        state
            .users
            .register(&Credentials::new("admin", "right"))
            .unwrap();

        for (username, password) in [("admin", "wrong"), ("ghost", "right")] {
            let (status, json) = send(
                &state,
                json_request(
                    "POST",
                    "/rate/login",
                    serde_json::json!({ "username": username, "password": password }),
                ),
            )
            .await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(json["message"], "Invalid credentials");
        }
    }

    #[tokio::test]
    async fn get_datas_creates_default_once() {
        let state = test_state();

        let (status, first) = send(&state, get_with_token("/rate/datas", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["thRate"], 785.0);
        assert_eq!(first["mmRate"], 760.0);
        assert_eq!(first["versionCode"], 1);

        let (_, second) = send(&state, get_with_token("/rate/datas", None)).await;
        assert_eq!(first["_id"], second["_id"]);
    }

    #[tokio::test]
    async fn post_datas_then_conflict() {
        let state = test_state();

        let (status, json) = send(&state, json_request("POST", "/rate/datas", record_body())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "Data saved successfully!");
        assert_eq!(json["data"]["versionCode"], 4);

        let (status, _) = send(&state, json_request("POST", "/rate/datas", record_body())).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn post_datas_missing_field_is_a_server_error() {
        let state = test_state();
        let mut body = record_body();
        body.as_object_mut().unwrap().remove("title");

        let (status, _) = send(&state, json_request("POST", "/rate/datas", body)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(state.records.find_first().unwrap().is_none());
    }

    #[tokio::test]
    async fn put_datas_updates_named_fields() {
        let state = test_state();
        let current = state.records.find_current().unwrap();

        let (status, json) = send(
            &state,
            json_request(
                "PUT",
                &format!("/rate/datas/{}", current.record_id),
                serde_json::json!({ "thRate": 801, "title": "Fresh rates" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "Data updated successfully!");
        assert_eq!(json["data"]["thRate"], 801.0);
        assert_eq!(json["data"]["title"], "Fresh rates");
        assert_eq!(json["data"]["mmRate"], 760.0);
    }

    #[tokio::test]
    async fn put_unknown_id_is_404_and_creates_nothing() {
        let state = test_state();

        for id in [ulid::Ulid::new().to_string(), "not-an-id".to_string()] {
            let (status, json) = send(
                &state,
                json_request(
                    "PUT",
                    &format!("/rate/datas/{}", id),
                    serde_json::json!({ "thRate": 1 }),
                ),
            )
            .await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(json["message"], "Data not found");
        }
        assert!(state.records.find_first().unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_item_removes_only_target() {
        let state = test_state();
        let (_, created) = send(&state, json_request("POST", "/rate/datas", record_body())).await;
        let record_id = created["data"]["_id"].as_str().unwrap().to_string();
        let target = created["data"]["items"][0]["_id"].as_str().unwrap().to_string();
        let survivor = created["data"]["items"][1].clone();

        let (status, json) = send(
            &state,
            Request::delete(format!("/rate/datas/{}/items/{}", record_id, target))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "Item deleted successfully!");

        let (_, fetched) = send(&state, get_with_token("/rate/datas", None)).await;
        assert_eq!(fetched["items"], serde_json::json!([survivor]));
    }

    #[tokio::test]
    async fn delete_item_on_unknown_record_is_404() {
        let state = test_state();
        let (status, _) = send(
            &state,
            Request::delete(format!(
                "/rate/datas/{}/items/{}",
                ulid::Ulid::new(),
                ulid::Ulid::new()
            ))
            .body(Body::empty())
            .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_malformed_item_id_leaves_record_unchanged() {
        let state = test_state();
        let current = state.records.find_current().unwrap();

        let (status, json) = send(
            &state,
            Request::delete(format!("/rate/datas/{}/items/not-an-id", current.record_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "Item deleted successfully!");
        assert_eq!(json["data"]["_id"], current.record_id.to_string());
        assert_eq!(json["data"]["items"].as_array().unwrap().len(), 2);
        assert_eq!(state.records.find_first().unwrap().unwrap(), current);
    }

    #[tokio::test]
    async fn delete_malformed_item_id_on_unknown_record_is_404() {
        let state = test_state();
        state.records.find_current().unwrap();

        let (status, json) = send(
            &state,
            Request::delete(format!("/rate/datas/{}/items/not-an-id", ulid::Ulid::new()))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["message"], "Data not found");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn login_hashing_does_not_stall_other_requests() {
        let mut config = test_config();
        config.hash_cost = 10;
        let state = test_state_with(config);
        state
            .users
            .register(&Credentials::new("admin", "pw"))
            .unwrap();

        let login = tokio::spawn({
            let state = Arc::clone(&state);
            async move {
                send(
                    &state,
                    json_request(
                        "POST",
                        "/rate/login",
                        serde_json::json!({ "username": "admin", "password": "pw" }),
                    ),
                )
                .await
            }
        });
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }

        let (status, _) = send(&state, Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert!(
            !login.is_finished(),
            "health should be served while the password hash is still being checked"
        );

        let (status, json) = login.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert!(json["token"].is_string());
    }

    #[tokio::test]
    async fn admin_requires_valid_token() {
        let state = test_state();

        let (status, _) = send(&state, get_with_token("/rate/admin", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let foreign = crate::token::TokenService::new("other-secret", None)
            .issue_token(ulid::Ulid::new())
            .unwrap();
        let (status, _) = send(&state, get_with_token("/rate/admin", Some(&foreign))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn admin_returns_current_record_or_404() {
        let state = test_state();
        let token = login_token(&state, "admin", "pw").await;

        let (status, json) = send(&state, get_with_token("/rate/admin", Some(&token))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["message"], "Data not found");

        let current = state.records.find_current().unwrap();
        let (status, json) = send(&state, get_with_token("/rate/admin", Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["_id"], current.record_id.to_string());
    }

    #[tokio::test]
    async fn users_check_requires_token_and_reports_existence() {
        let state = test_state();

        let (status, _) = send(&state, get_with_token("/rate/users/check", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let token = login_token(&state, "admin", "pw").await;
        let (status, json) = send(&state, get_with_token("/rate/users/check", Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "Users exist");
    }

    #[tokio::test]
    async fn users_check_with_no_users_is_404() {
        let state = test_state();
        let token = state.tokens.issue_token(ulid::Ulid::new()).unwrap();

        let (status, json) = send(&state, get_with_token("/rate/users/check", Some(&token))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["message"], "No users found");
    }

    #[tokio::test]
    async fn writes_are_open_by_default() {
        let state = test_state();
        let (status, _) = send(&state, json_request("POST", "/rate/datas", record_body())).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn protect_writes_guards_mutations_but_not_reads() {
        let mut config = test_config();
        config.protect_writes = true;
        let state = test_state_with(config);

        let (status, _) = send(&state, json_request("POST", "/rate/datas", record_body())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&state, get_with_token("/rate/datas", None)).await;
        assert_eq!(status, StatusCode::OK);

        let current = state.records.find_current().unwrap();
        let (status, _) = send(
            &state,
            json_request(
                "PUT",
                &format!("/rate/datas/{}", current.record_id),
                serde_json::json!({ "thRate": 1 }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(
            &state,
            Request::delete(format!(
                "/rate/datas/{}/items/{}",
                current.record_id, current.items[0].item_id
            ))
            .body(Body::empty())
            .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(state.records.find_first().unwrap().unwrap().items.len(), 2);

        let token = login_token(&state, "admin", "pw").await;
        let req = Request::put(format!("/rate/datas/{}", current.record_id))
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {}", token))
            .body(Body::from(r#"{"thRate": 1}"#))
            .unwrap();
        let (status, json) = send(&state, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["thRate"], 1.0);

        let req = Request::delete(format!(
            "/rate/datas/{}/items/{}",
            current.record_id, current.items[0].item_id
        ))
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
        let (status, json) = send(&state, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["items"].as_array().unwrap().len(), 1);
    }
}
