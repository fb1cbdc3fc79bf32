use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use tracing::info;

use super::types::*;
use super::AppState;
use crate::errors::{AppError, Result};
use crate::models::category::{CategoryRef, NewCategory, ProductCategory};
use crate::models::interaction::{NewInteraction, UserProductInteraction};
use crate::models::product::{NewProduct, ProductView};
use crate::models::shop::{NewShop, Shop};
use crate::models::user::{CreateUserRequest, UserProfile, UserResponse};
use crate::services::catalog_service::CatalogService;
use crate::services::category_service::CategoryService;
use crate::services::recommendation_service::{PeerInteractionStrategy, RecommendationService};
use crate::services::user_service::UserService;
use std::sync::Arc;

// Category lookups

#[utoipa::path(
    get,
    path = "/categories/{category}/products",
    params(("category" = String, Path, description = "Category id or exact name")),
    responses(
        (status = 200, body = [ProductView], description = "Products in the category"),
        (status = 404, body = ErrorResponse, description = "Category not found.")
    ),
    tag = "Category"
)]
pub async fn list_products_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Vec<ProductView>>> {
    let service = CategoryService::new(state.db.clone());
    let products = service.list_products_by_category(&CategoryRef::parse(&category)).await?;
    Ok(Json(products))
}

#[utoipa::path(
    get,
    path = "/categories/{category}/subcategories/{subcategory}/products",
    params(
        ("category" = String, Path, description = "Parent category id or exact name"),
        ("subcategory" = String, Path, description = "Subcategory name under the parent"),
        OrderingQuery
    ),
    responses(
        (status = 200, body = [ProductView], description = "Products in the subcategory, ordered when requested"),
        (status = 400, body = ErrorResponse, description = "Unsupported ordering"),
        (status = 404, body = ErrorResponse, description = "Category or subcategory not found")
    ),
    tag = "Category"
)]
pub async fn list_products_by_subcategory(
    State(state): State<AppState>,
    Path((category, subcategory)): Path<(String, String)>,
    Query(query): Query<OrderingQuery>,
) -> Result<Json<Vec<ProductView>>> {
    let service = CategoryService::new(state.db.clone());
    let products = service
        .list_products_by_subcategory(&CategoryRef::parse(&category), &subcategory, query.ordering.as_deref())
        .await?;
    Ok(Json(products))
}

#[utoipa::path(
    get,
    path = "/categories/{category}/subcategories",
    params(("category" = String, Path, description = "Parent category id or exact name")),
    responses(
        (status = 200, body = [ProductCategory], description = "Direct children of the category"),
        (status = 404, body = ErrorResponse, description = "Category not found.")
    ),
    tag = "Category"
)]
pub async fn list_subcategories(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Vec<ProductCategory>>> {
    let service = CategoryService::new(state.db.clone());
    Ok(Json(service.list_subcategories(&CategoryRef::parse(&category)).await?))
}

#[utoipa::path(
    get,
    path = "/categories",
    responses((status = 200, body = [ProductCategory], description = "All categories")),
    tag = "Category"
)]
pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<ProductCategory>>> {
    let service = CatalogService::new(state.db.clone());
    Ok(Json(service.list_categories().await?))
}

#[utoipa::path(
    post,
    path = "/categories",
    request_body = NewCategory,
    responses(
        (status = 201, body = ProductCategory),
        (status = 400, body = ErrorResponse, description = "Invalid body, name or missing parent")
    ),
    tag = "Category"
)]
pub async fn create_category(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NewCategory>, JsonRejection>,
) -> Result<(StatusCode, Json<ProductCategory>)> {
    let Json(req) = payload?;
    let service = CatalogService::new(state.db.clone());
    let category = service.create_category(req).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

#[utoipa::path(
    patch,
    path = "/categories/{category}/parent",
    params(("category" = String, Path, description = "Category id or exact name")),
    request_body = ReparentRequest,
    responses(
        (status = 200, body = ProductCategory),
        (status = 400, body = ErrorResponse, description = "Move would create a cycle or parent is missing"),
        (status = 404, body = ErrorResponse, description = "Category not found.")
    ),
    tag = "Category"
)]
pub async fn reparent_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
    payload: std::result::Result<Json<ReparentRequest>, JsonRejection>,
) -> Result<Json<ProductCategory>> {
    let Json(req) = payload?;
    let service = CatalogService::new(state.db.clone());
    let moved = service
        .reparent_category(&CategoryRef::parse(&category), req.parent_category)
        .await?;
    Ok(Json(moved))
}

// Shops and products

#[utoipa::path(
    post,
    path = "/shops",
    request_body = NewShop,
    responses((status = 201, body = Shop), (status = 400, body = ErrorResponse)),
    tag = "Shop"
)]
pub async fn create_shop(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NewShop>, JsonRejection>,
) -> Result<(StatusCode, Json<Shop>)> {
    let Json(req) = payload?;
    let service = CatalogService::new(state.db.clone());
    Ok((StatusCode::CREATED, Json(service.create_shop(req).await?)))
}

#[utoipa::path(
    get,
    path = "/shops/{shop_id}",
    params(("shop_id" = i64, Path, description = "Shop id")),
    responses((status = 200, body = Shop), (status = 404, body = ErrorResponse)),
    tag = "Shop"
)]
pub async fn get_shop(State(state): State<AppState>, Path(shop_id): Path<String>) -> Result<Json<Shop>> {
    let shop_id = parse_id(&shop_id, AppError::ShopNotFound)?;
    let service = CatalogService::new(state.db.clone());
    Ok(Json(service.get_shop(shop_id).await?))
}

#[utoipa::path(
    post,
    path = "/products",
    request_body = NewProduct,
    responses(
        (status = 201, body = ProductView),
        (status = 400, body = ErrorResponse, description = "Invariant violated"),
        (status = 404, body = ErrorResponse, description = "Shop or category not found")
    ),
    tag = "Product"
)]
pub async fn create_product(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NewProduct>, JsonRejection>,
) -> Result<(StatusCode, Json<ProductView>)> {
    let Json(req) = payload?;
    let service = CatalogService::new(state.db.clone());
    Ok((StatusCode::CREATED, Json(service.create_product(req).await?)))
}

#[utoipa::path(
    get,
    path = "/products/{product_id}",
    params(("product_id" = i64, Path, description = "Product id")),
    responses((status = 200, body = ProductView), (status = 404, body = ErrorResponse)),
    tag = "Product"
)]
pub async fn get_product(State(state): State<AppState>, Path(product_id): Path<String>) -> Result<Json<ProductView>> {
    let product_id = parse_id(&product_id, AppError::ProductNotFound)?;
    let service = CatalogService::new(state.db.clone());
    Ok(Json(service.get_product(product_id).await?))
}

#[utoipa::path(
    delete,
    path = "/products/{product_id}",
    params(("product_id" = i64, Path, description = "Product id")),
    responses((status = 204, description = "Deleted"), (status = 404, body = ErrorResponse)),
    tag = "Product"
)]
pub async fn delete_product(State(state): State<AppState>, Path(product_id): Path<String>) -> Result<StatusCode> {
    let product_id = parse_id(&product_id, AppError::ProductNotFound)?;
    let service = CatalogService::new(state.db.clone());
    service.delete_product(product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Users, interactions, recommendations

#[utoipa::path(
    post,
    path = "/users",
    request_body = CreateUserRequest,
    responses((status = 201, body = UserResponse), (status = 400, body = ErrorResponse)),
    tag = "User"
)]
pub async fn create_user(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    let Json(req) = payload?;
    let service = UserService::new(state.db.clone());
    let user = service.create_user(req).await?;
    info!(action = "register_success", user_id = user.id);
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    get,
    path = "/users/{user_id}/profile",
    params(("user_id" = i64, Path, description = "User id")),
    responses((status = 200, body = UserProfile), (status = 404, body = ErrorResponse)),
    tag = "User"
)]
pub async fn get_profile(State(state): State<AppState>, Path(user_id): Path<String>) -> Result<Json<UserProfile>> {
    let user_id = parse_id(&user_id, AppError::UserNotFound)?;
    let service = UserService::new(state.db.clone());
    Ok(Json(service.get_profile(user_id).await?))
}

#[utoipa::path(
    get,
    path = "/users/{user_id}/interactions",
    params(("user_id" = i64, Path, description = "User id")),
    responses(
        (status = 200, body = [UserProductInteraction], description = "Interaction history, newest first"),
        (status = 404, body = ErrorResponse)
    ),
    tag = "User"
)]
pub async fn list_interactions(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<UserProductInteraction>>> {
    let user_id = parse_id(&user_id, AppError::UserNotFound)?;
    let service = UserService::new(state.db.clone());
    Ok(Json(service.list_interactions(user_id).await?))
}

#[utoipa::path(
    post,
    path = "/interactions",
    request_body = NewInteraction,
    responses(
        (status = 201, body = UserProductInteraction),
        (status = 404, body = ErrorResponse, description = "User or product not found")
    ),
    tag = "User"
)]
pub async fn record_interaction(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NewInteraction>, JsonRejection>,
) -> Result<(StatusCode, Json<UserProductInteraction>)> {
    let Json(req) = payload?;
    let service = UserService::new(state.db.clone());
    Ok((StatusCode::CREATED, Json(service.record_interaction(req).await?)))
}

#[utoipa::path(
    get,
    path = "/recommendations/{user_id}",
    params(("user_id" = i64, Path, description = "User id"), RecommendationQuery),
    responses(
        (status = 200, body = [ProductView], description = "Recommended products, best first"),
        (status = 404, body = ErrorResponse, description = "User not found.")
    ),
    tag = "Recommendation"
)]
pub async fn recommendations(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    query: std::result::Result<Query<RecommendationQuery>, QueryRejection>,
) -> Result<Json<Vec<ProductView>>> {
    let user_id = parse_id(&user_id, AppError::UserNotFound)?;
    let Query(query) = query?;
    let service = RecommendationService::new(
        state.db.clone(),
        Arc::new(PeerInteractionStrategy),
        state.config.recommendation_limit,
    );
    Ok(Json(service.recommend_for_user(user_id, query.limit).await?))
}

/// A path id that is not an integer cannot name a row, so it is a 404 like any
/// other unknown id.
fn parse_id(raw: &str, not_found: AppError) -> Result<i64> {
    raw.parse().map_err(|_| not_found)
}

pub fn category_router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/:category/products", get(list_products_by_category))
        .route("/categories/:category/subcategories", get(list_subcategories))
        .route(
            "/categories/:category/subcategories/:subcategory/products",
            get(list_products_by_subcategory),
        )
        .route("/categories/:category/parent", patch(reparent_category))
}

pub fn catalog_router() -> Router<AppState> {
    Router::new()
        .route("/shops", post(create_shop))
        .route("/shops/:shop_id", get(get_shop))
        .route("/products", post(create_product))
        .route("/products/:product_id", get(get_product).delete(delete_product))
}

pub fn user_router() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user))
        .route("/users/:user_id/profile", get(get_profile))
        .route("/users/:user_id/interactions", get(list_interactions))
        .route("/interactions", post(record_interaction))
        .route("/recommendations/:user_id", get(recommendations))
}
