use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum InteractionType {
    Viewed,
    Wishlisted,
    AddedToCart,
    Purchased,
}

impl InteractionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionType::Viewed => "viewed",
            InteractionType::Wishlisted => "wishlisted",
            InteractionType::AddedToCart => "added_to_cart",
            InteractionType::Purchased => "purchased",
        }
    }

    /// Signal strength used when ranking recommendations.
    pub fn weight(&self) -> u64 {
        match self {
            InteractionType::Viewed => 1,
            InteractionType::Wishlisted => 2,
            InteractionType::AddedToCart => 3,
            InteractionType::Purchased => 4,
        }
    }
}

impl fmt::Display for InteractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InteractionType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "viewed" => Ok(InteractionType::Viewed),
            "wishlisted" => Ok(InteractionType::Wishlisted),
            "added_to_cart" => Ok(InteractionType::AddedToCart),
            "purchased" => Ok(InteractionType::Purchased),
            other => Err(AppError::ValidationError(format!("Unknown interaction type '{}'", other))),
        }
    }
}

/// Immutable event row: once recorded it is never updated.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserProductInteraction {
    pub id: i64,
    pub user: i64,
    pub product: i64,
    pub interaction_type: InteractionType,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NewInteraction {
    pub user_id: i64,
    pub product_id: i64,
    pub interaction_type: InteractionType,
}
