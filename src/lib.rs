pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod queries;
pub mod services;
pub mod state;
pub mod store;
pub mod validation;
pub mod workers;

pub use config::Config;
pub use database::{DbConn, DbPool};
pub use error::{Error, Result};
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

/// Upper bound for request bodies. Larger than the image limit so an oversized
/// image is reported as a validation error rather than cut off by the transport.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Load configuration from environment variables
pub fn load_config() -> std::result::Result<Config, Box<dyn std::error::Error>> {
    Ok(Config::load()?)
}

/// Builds the HTTP router: public login and health, everything else behind
/// the bearer token gate, and stored images served under `/uploads`.
pub fn build_router(state: AppState, cors_origin: &str) -> Result<Router> {
    let origin = cors_origin.parse::<HeaderValue>().map_err(|e| {
        Error::Config(::config::ConfigError::Message(format!(
            "Invalid CORS origin {:?}: {}",
            cors_origin, e
        )))
    })?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION, ACCEPT])
        .allow_credentials(true);

    let auth_gate = from_fn_with_state(state.clone(), middleware::auth_middleware);

    let auth_routes = Router::new()
        .route("/me", get(handlers::auth::me))
        .route("/change-password", put(handlers::auth::change_password))
        .route_layer(auth_gate.clone())
        .route("/login", post(handlers::auth::login));

    let customer_routes = Router::new()
        .route(
            "/",
            get(handlers::customers::list_customers).post(handlers::customers::create_customer),
        )
        .route("/export", get(handlers::customers::export_customers))
        .route(
            "/{id}",
            get(handlers::customers::get_customer)
                .put(handlers::customers::update_customer)
                .delete(handlers::customers::delete_customer),
        )
        .route_layer(auth_gate)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES));

    let uploads = ServeDir::new(state.uploads.base_path());

    Ok(Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/customers", customer_routes)
        .route("/health", get(handlers::health::health_check))
        .nest_service("/uploads", uploads)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}
