use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Body of every error response, e.g. `{"message":"Category not found."}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderingQuery {
    /// One of `price`, `-price`, `name`, `-name`.
    pub ordering: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecommendationQuery {
    /// Number of products to return (1..=50).
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReparentRequest {
    /// New parent id, or `null` to make the category a root.
    pub parent_category: Option<i64>,
}
