use axum::http::Method;
use axum::{response::IntoResponse, routing::get, Json, Router};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::database::sqlite::SqliteDatabase;
use crate::errors::{AppError, Result};
use crate::utils::middleware::{rate_limiter_middleware, request_id_middleware, RateLimiter};

pub mod routes;
pub mod types;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::list_products_by_category,
        routes::list_products_by_subcategory,
        routes::list_subcategories,
        routes::list_categories,
        routes::create_category,
        routes::reparent_category,
        routes::create_shop,
        routes::get_shop,
        routes::create_product,
        routes::get_product,
        routes::delete_product,
        routes::create_user,
        routes::get_profile,
        routes::list_interactions,
        routes::record_interaction,
        routes::recommendations,
    ),
    components(
        schemas(
            types::ErrorResponse,
            types::ReparentRequest,
            crate::models::product::ProductView,
            crate::models::product::NewProduct,
            crate::models::category::ProductCategory,
            crate::models::category::NewCategory,
            crate::models::category::CategoryStatus,
            crate::models::shop::Shop,
            crate::models::shop::NewShop,
            crate::models::user::CreateUserRequest,
            crate::models::user::UserResponse,
            crate::models::user::UserProfile,
            crate::models::user::Gender,
            crate::models::interaction::NewInteraction,
            crate::models::interaction::UserProductInteraction,
            crate::models::interaction::InteractionType,
        )
    ),
    tags(
        (name = "Category", description = "Category tree and category-scoped product listings"),
        (name = "Shop", description = "Shops that own products and categories"),
        (name = "Product", description = "Product records"),
        (name = "User", description = "User profiles and interaction history"),
        (name = "Recommendation", description = "Interaction-based product recommendations")
    )
)]
pub struct ApiDoc;

/// Shared handles passed to every handler; services are built per request.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<SqliteDatabase>,
    pub config: Arc<AppConfig>,
    pub limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(db: Arc<SqliteDatabase>, config: AppConfig) -> Self {
        let limiter = Arc::new(RateLimiter::per_second(config.rate_limit_per_sec));
        Self {
            db,
            config: Arc::new(config),
            limiter,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let openapi = ApiDoc::openapi();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .merge(routes::category_router())
        .merge(routes::catalog_router())
        .merge(routes::user_router())
        .route("/openapi.json", get(openapi_json))
        .merge(SwaggerUi::new("/docs").url("/docs/openapi.json", openapi.clone()))
        .merge(Redoc::with_url("/redoc", openapi))
        .layer(axum::middleware::from_fn_with_state(
            state.limiter.clone(),
            rate_limiter_middleware,
        ))
        .layer(cors)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// Opens the database named in `config` and serves until the listener fails.
pub async fn start_http_server(config: AppConfig) -> Result<()> {
    let db = Arc::new(SqliteDatabase::new(&config.database_path).await?);
    let addr = config.bind_address();
    let app = build_router(AppState::new(db, config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::ConfigError(format!("Failed to bind {}: {}", addr, e)))?;

    info!(action = "server_started", address = %addr, docs = "/docs");
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .map_err(|e| AppError::InternalError(format!("Server error: {}", e)))
}

async fn health_check() -> impl IntoResponse {
    "OK"
}

async fn openapi_json() -> Json<Value> {
    Json(serde_json::to_value(ApiDoc::openapi()).unwrap_or(Value::Null))
}
