//! Ticketdesk Web Server
//!
//! Axum-based REST API and the WebSocket notification channel.

pub mod auth;
pub mod channel;
pub mod error;
pub mod rate_limit;
pub mod routes;
pub mod state;
pub mod websocket;

use axum::{
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use channel::{Delivery, Session, SessionId, SessionRegistry};
pub use error::{ApiError, ApiResult};
pub use state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Auth
        .route("/auth/signup", post(routes::auth::signup))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/logout", post(routes::auth::logout))
        // Complaints
        .route(
            "/complaints",
            get(routes::complaints::list_complaints)
                .post(routes::complaints::create_complaint)
                .put(routes::complaints::update_complaint)
                .delete(routes::complaints::delete_complaint),
        )
        .route("/complaints/{id}", put(routes::complaints::edit_complaint))
        .route(
            "/complaints/{id}/comments",
            get(routes::comments::list_comments).post(routes::comments::add_comment),
        )
        // Admin
        .route("/admin/complaints", get(routes::admin::list_complaints))
        .route("/admin/complaints/{id}", put(routes::admin::update_status))
        .route("/users", get(routes::users::list_users))
        // Notification channel
        .route("/socketio", get(websocket::ws_handler));

    Router::new()
        .route("/health", get(routes::health::health))
        .nest("/api", api_routes)
        .route("/internal/notify", post(routes::internal::notify))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serve on an already bound listener until ctrl-c.
pub async fn serve(listener: TcpListener, state: AppState) -> anyhow::Result<()> {
    let app = create_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Run the web server.
pub async fn run_server(state: AppState, addr: &str) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Web server listening on http://{}", listener.local_addr()?);
    serve(listener, state).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down web server");
}
