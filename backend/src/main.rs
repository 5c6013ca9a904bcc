use std::net::SocketAddr;
use std::time::Duration;
use axum::http::{HeaderValue, Method, Request, Response, StatusCode};
use axum::http::header::HeaderName;
use axum::{middleware, Router, extract::State};
use axum::routing::{post, get, delete};
use axum::response::IntoResponse;
use axum::body::Body;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, error};
use redis::Client as RedisClient;
use shared::rate_limit::{RateLimitType, get_rate_limit_key, API_MAX_REQUESTS, API_WINDOW, RateLimitCheck};

use crate::auth::middleware::require_auth;
use crate::services::{
    campaign_service,
    marketplace_service,
    pool_service,
    quiz_service,
    spin_service,
    user_service,
    verification_service,
};

mod auth;
mod services;
mod models;
mod error;
mod logging;

#[derive(Clone)]
pub struct AppState {
    pool: PgPool,
    redis: RedisClient,
}

pub async fn health_check() -> impl IntoResponse {
    Response::builder().status(200).body(Body::from("OK")).unwrap()
}

async fn api_rate_limit_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: middleware::Next,
) -> Result<Response<Body>, StatusCode> {
    let user_id = request
        .extensions()
        .get::<auth::middleware::UserId>()
        .map(|id| id.0.to_string())
        .unwrap_or_else(|| "anonymous".to_string());

    let rate_limit_key = get_rate_limit_key(RateLimitType::Api, &user_id);

    if let Ok(mut conn) = state.redis.get_async_connection().await {
        let attempts: Option<u32> = redis::cmd("GET")
            .arg(&rate_limit_key)
            .query_async(&mut conn)
            .await
            .unwrap_or(None);

        let check = RateLimitCheck::new(attempts.unwrap_or(0), RateLimitType::Api);

        if check.is_locked {
            return Err(StatusCode::TOO_MANY_REQUESTS);
        }

        let current_attempts = attempts.unwrap_or(0) + 1;
        if current_attempts <= API_MAX_REQUESTS {
            let _: () = redis::cmd("SETEX")
                .arg(&rate_limit_key)
                .arg(API_WINDOW.as_secs())
                .arg(current_attempts)
                .query_async(&mut conn)
                .await
                .unwrap_or(());
        }
    }

    Ok(next.run(request).await)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::setup();
    dotenvy::from_path(".env").ok();

    let state = AppState {
        pool: PgPool::connect_with(
            std::env::var("DATABASE_URL")
                .expect("DATABASE_URL must be set")
                .parse::<sqlx::postgres::PgConnectOptions>()?
                .to_owned()
        )
        .await
        .expect("Failed to create pool"),
        redis: RedisClient::open(std::env::var("REDIS_URL")
            .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()))
            .expect("Failed to connect to Redis"),
    };

    sqlx::migrate!().run(&state.pool).await?;

    // Hourly sweep so exhausted campaigns stop appearing as joinable.
    let pool_clone = state.pool.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(3600));
        loop {
            interval.tick().await;
            match campaign_service::close_exhausted_campaigns(&pool_clone).await {
                Ok(0) => {}
                Ok(closed) => info!("Closed {} exhausted campaigns", closed),
                Err(e) => error!("Error closing exhausted campaigns: {:?}", e),
            }
        }
    });

    let protected_routes = Router::new()
        .route("/api/me", get(user_service::get_me))
        .route("/api/leaderboard", get(user_service::get_leaderboard))
        .route("/api/campaigns", get(campaign_service::get_campaigns).post(campaign_service::create_campaign))
        .route("/api/campaigns/:id/participate", post(campaign_service::participate_in_campaign))
        .route("/api/campaigns/:id/complete", post(campaign_service::complete_campaign_view))
        .route("/api/campaigns/:id/quiz", get(quiz_service::get_campaign_quiz))
        .route("/api/quizzes/:id/submit", post(quiz_service::submit_quiz_answers))
        .route("/api/marketplace/listings", get(marketplace_service::get_listings).post(marketplace_service::create_listing))
        .route("/api/marketplace/listings/:id/buy", post(marketplace_service::buy_listing))
        .route("/api/marketplace/listings/:id", delete(marketplace_service::cancel_listing))
        .route("/api/convert", post(marketplace_service::convert_tiv_to_usd))
        .route("/api/pools", get(pool_service::get_pools))
        .route("/api/pools/:id/join", post(pool_service::join_pool))
        .route("/api/verification", post(verification_service::submit_verification))
        .route("/api/verification/:id/approve", post(verification_service::admin_approve_verification))
        .layer(middleware::from_fn_with_state(state.clone(), api_rate_limit_middleware))
        .layer(middleware::from_fn(require_auth));

    let cors = CorsLayer::new()
        .allow_origin(vec![
            "http://127.0.0.1:8080".parse::<HeaderValue>().unwrap(),
            "http://127.0.0.1:3000".parse::<HeaderValue>().unwrap(),
            "https://tivrewards.app".parse::<HeaderValue>().unwrap()
        ])
        .allow_methods(vec![Method::GET, Method::POST, Method::PUT, Method::OPTIONS, Method::DELETE])
        .allow_headers(vec![
            HeaderName::from_static("content-type"),
            HeaderName::from_static("authorization"),
            HeaderName::from_static("x-requested-with")
        ])
        .allow_credentials(true);

    let app = Router::new()
        .route("/api/health_check", get(health_check))
        .merge(protected_routes)
        .nest("/api/spin", spin_service::create_router())
        .layer(cors)
        .with_state(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    info!("listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
