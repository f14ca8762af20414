pub mod extract;
pub mod state;

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::handlers::{health, protected, public};
use crate::middleware::jwt_auth_middleware;

pub use state::AppState;

/// Base path every resource route is mounted under.
pub const API_PREFIX: &str = "/api/v1";

pub fn router(state: AppState, config: &AppConfig) -> Router {
    let cors = if config.security.enable_cors {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    };

    Router::new()
        .route("/health", get(health::health))
        .nest(API_PREFIX, public_routes().merge(protected_routes(state.clone())))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.api.request_timeout_secs,
        )))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/users/signup", post(public::signup))
        .route("/users/login", post(public::login))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{accounts, categories, transactions, users};

    Router::new()
        .route("/users", get(users::list))
        .route(
            "/users/:id",
            get(users::show).put(users::update).delete(users::delete),
        )
        .route("/accounts", get(accounts::list).post(accounts::create))
        .route(
            "/accounts/:id",
            get(accounts::show)
                .put(accounts::update)
                .post(accounts::update)
                .delete(accounts::delete),
        )
        .route("/accounts/:id/balance", patch(accounts::adjust_balance))
        .route("/categories", get(categories::list).post(categories::create))
        .route(
            "/categories/:id",
            get(categories::show)
                .put(categories::update)
                .delete(categories::delete),
        )
        .route(
            "/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route(
            "/transactions/:id",
            get(transactions::show)
                .put(transactions::update)
                .delete(transactions::delete),
        )
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

/// Binds the configured port and serves until Ctrl-C.
pub async fn serve(state: AppState, config: &AppConfig) -> anyhow::Result<()> {
    let app = router(state, config);

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Finance API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
