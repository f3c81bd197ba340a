/*
 * Responsibility
 * - tracing / panic hook 初期化
 * - Config読み込み → 依存生成 (PgPool, TokenCodec, BearerGate) → Router 組み立て
 * - Middleware の適用 (CORS / request id / trace / limits)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::repos::user_repo::PgUserRepo;
use crate::services::auth::TokenCodec;
use crate::state::AppState;
use crate::{api, middleware};

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,user_auth_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // stderr can be hidden depending on how the process is launched
        tracing::error!(?info, "panic");

        // development: crash the whole process so it gets noticed
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(?config, "starting API in {:?} mode on {}", config.app_env, config.addr);

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to DATABASE_URL")?;

    Ok(AppState::new(
        Arc::new(PgUserRepo::new(pool)),
        Arc::new(build_token_codec(config)?),
        config.bcrypt_cost,
    ))
}

fn build_token_codec(config: &Config) -> Result<TokenCodec> {
    let ttl = chrono::TimeDelta::try_minutes(config.access_token_ttl_minutes)
        .context("ACCESS_TOKEN_TTL_MINUTES out of range")?;

    Ok(TokenCodec::new(
        &config.secret_key,
        ttl,
        config.access_token_leeway_seconds,
    ))
}

fn build_router(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .nest("/api/v1", api::v1::routes(&state))
        .with_state(state);

    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router, config)
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, StatusCode, header};
    use chrono::{Duration, Utc};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::config::MAX_ACCESS_TOKEN_TTL_MINUTES;
    use crate::repos::memory::MemoryUserRepo;
    use crate::repos::user_repo::Role;
    use crate::services::password::{TEST_BCRYPT_COST, hash_password};

    struct TestApp {
        router: Router,
        users: Arc<MemoryUserRepo>,
        tokens: Arc<TokenCodec>,
    }

    fn test_config() -> Config {
        Config::from_lookup(|key| match key {
            "DATABASE_URL" => Some("postgres://unused".to_string()),
            "SECRET_KEY" => Some("e2e-secret".to_string()),
            "BCRYPT_COST" => Some(TEST_BCRYPT_COST.to_string()),
            _ => None,
        })
        .unwrap()
    }

    fn test_app() -> TestApp {
        let config = test_config();
        let users = Arc::new(MemoryUserRepo::new());
        let tokens = Arc::new(build_token_codec(&config).unwrap());
        let state = AppState::new(users.clone(), tokens.clone(), config.bcrypt_cost);

        TestApp {
            router: build_router(state, &config),
            users,
            tokens,
        }
    }

    impl TestApp {
        async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
            let res = self.router.clone().oneshot(req).await.unwrap();
            let status = res.status();
            let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
            let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            (status, body)
        }

        async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
            let req = Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap();
            self.send(req).await
        }

        async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
            let mut req = Request::builder().method(Method::GET).uri(uri);
            if let Some(token) = token {
                req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
            }
            self.send(req.body(Body::empty()).unwrap()).await
        }

        async fn register(&self, email: &str) -> String {
            let (status, body) = self
                .post_json(
                    "/api/v1/register",
                    json!({
                        "email": email,
                        "password": "hunter22",
                        "first_name": "Jane",
                        "last_name": "Doe",
                    }),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED, "{body}");
            body["token"].as_str().unwrap().to_string()
        }

        async fn seed_admin(&self, email: &str, password: &str) {
            let hash = hash_password(password.to_string(), TEST_BCRYPT_COST)
                .await
                .unwrap();
            self.users.seed(1000, email, &hash, Role::Admin).await;
        }
    }

    fn message(body: &Value) -> &str {
        body["error"]["message"].as_str().unwrap_or_default()
    }

    #[tokio::test]
    async fn health_is_public_and_gets_a_request_id() {
        let app = test_app();
        let req = Request::builder()
            .uri("/api/v1/health")
            .body(Body::empty())
            .unwrap();
        let res = app.router.clone().oneshot(req).await.unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn registered_user_can_read_own_profile() {
        let app = test_app();
        let token = app.register("jane@example.com").await;

        let (status, body) = app.get("/api/v1/users/me", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "jane@example.com");
        assert_eq!(body["role"], "user");
        assert!(body.get("password").is_none());
    }

    #[tokio::test]
    async fn admin_route_allows_admin_and_forbids_user() {
        let app = test_app();
        let user_token = app.register("jane@example.com").await;

        let (status, body) = app.get("/api/v1/users", Some(&user_token)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(message(&body), "Forbidden");

        app.seed_admin("root@example.com", "rootpass").await;
        let (status, body) = app
            .post_json(
                "/api/v1/login",
                json!({ "email": "root@example.com", "password": "rootpass" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let admin_token = body["token"].as_str().unwrap().to_string();

        let (status, body) = app.get("/api/v1/users", Some(&admin_token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn bad_credentials_are_401_with_specific_messages() {
        let app = test_app();
        let token = app.register("jane@example.com").await;
        let user_id = app.tokens.decode(&token).unwrap().sub;

        let expired = app
            .tokens
            .encode_at(user_id, Utc::now() - Duration::minutes(240))
            .unwrap();
        let (status, body) = app.get("/api/v1/users", Some(&expired)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(message(&body), "That token is Expired");

        let (status, body) = app.get("/api/v1/users", Some("garbled.token.value")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(message(&body), "That token is Invalid");

        let (status, body) = app.get("/api/v1/users", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(message(&body), "Not authenticated");
    }

    #[tokio::test]
    async fn token_for_deleted_or_unknown_user_is_rejected() {
        let app = test_app();
        let orphan = app.tokens.encode(4242).unwrap();

        let (status, body) = app.get("/api/v1/users/me", Some(&orphan)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(message(&body), "That token is Invalid");
    }

    #[tokio::test]
    async fn register_and_login_failures() {
        let app = test_app();
        app.register("jane@example.com").await;

        let (status, body) = app
            .post_json(
                "/api/v1/register",
                json!({
                    "email": "jane@example.com",
                    "password": "other",
                    "first_name": "Jane",
                    "last_name": "Doe",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(message(&body), "User with this email already exists");

        let (status, body) = app
            .post_json(
                "/api/v1/login",
                json!({ "email": "jane@example.com", "password": "nope" }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message(&body), "Wrong email or password");

        let (status, _) = app
            .post_json(
                "/api/v1/register",
                json!({
                    "email": "no-at-sign",
                    "password": "pw",
                    "first_name": "A",
                    "last_name": "B",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn longest_allowed_ttl_still_mints_tokens() {
        let config = Config::from_lookup(|key| match key {
            "DATABASE_URL" => Some("postgres://unused".to_string()),
            "SECRET_KEY" => Some("e2e-secret".to_string()),
            "ACCESS_TOKEN_TTL_MINUTES" => Some(MAX_ACCESS_TOKEN_TTL_MINUTES.to_string()),
            _ => None,
        })
        .unwrap();

        let codec = build_token_codec(&config).unwrap();
        let token = codec.encode(1).unwrap();
        assert_eq!(codec.decode(&token).unwrap().sub, 1);
    }

    #[tokio::test]
    async fn unknown_path_is_404_not_401() {
        let app = test_app();
        let (status, _) = app.get("/api/v1/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
