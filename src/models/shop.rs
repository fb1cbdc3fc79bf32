use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const MIN_RATING: f64 = 0.0;
pub const MAX_RATING: f64 = 5.0;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Shop {
    pub id: i64,
    pub name: String,
    pub policy_confirmation: bool,
    pub reviewed: bool,
    pub rating: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewShop {
    pub name: String,
    #[serde(default)]
    pub policy_confirmation: bool,
    #[serde(default)]
    pub reviewed: bool,
    #[serde(default)]
    pub rating: f64,
}
