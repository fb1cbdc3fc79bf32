use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub shop: i64,
    pub name: String,
    pub description: String,
    pub quantity: i64,
    pub category: i64,
    pub image_id: Option<i64>,
    pub price: f64,
    pub discount_price: f64,
    pub tax: f64,
    pub is_published: bool,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Serialized product payload returned by every listing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductView {
    pub id: i64,
    pub shop: i64,
    pub name: String,
    pub description: String,
    pub quantity: i64,
    pub category: i64,
    pub image_id: Option<i64>,
    pub price: f64,
    pub discount_price: f64,
    pub tax: f64,
    pub is_published: bool,
    pub currency: String,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        ProductView {
            id: product.id,
            shop: product.shop,
            name: product.name,
            description: product.description,
            quantity: product.quantity,
            category: product.category,
            image_id: product.image_id,
            price: product.price,
            discount_price: product.discount_price,
            tax: product.tax,
            is_published: product.is_published,
            currency: product.currency,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewProduct {
    pub shop: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub quantity: i64,
    pub category: i64,
    #[serde(default)]
    pub image_id: Option<i64>,
    pub price: f64,
    pub discount_price: f64,
    #[serde(default)]
    pub tax: f64,
    #[serde(default)]
    pub is_published: bool,
    pub currency: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderingField {
    Price,
    Name,
}

/// Accepted values of the `ordering` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductOrdering {
    pub field: OrderingField,
    pub descending: bool,
}

impl ProductOrdering {
    pub const ACCEPTED: [&'static str; 4] = ["price", "-price", "name", "-name"];

    pub fn sql(&self) -> &'static str {
        match (self.field, self.descending) {
            (OrderingField::Price, false) => "price ASC, id ASC",
            (OrderingField::Price, true) => "price DESC, id ASC",
            (OrderingField::Name, false) => "name ASC, id ASC",
            (OrderingField::Name, true) => "name DESC, id ASC",
        }
    }
}

impl FromStr for ProductOrdering {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (descending, field) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let field = match field {
            "price" => OrderingField::Price,
            "name" => OrderingField::Name,
            _ => {
                return Err(AppError::ValidationError(format!(
                    "Invalid ordering '{}'. Expected one of: {}.",
                    s,
                    Self::ACCEPTED.join(", ")
                )))
            }
        };
        Ok(ProductOrdering { field, descending })
    }
}

impl fmt::Display for ProductOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.field {
            OrderingField::Price => "price",
            OrderingField::Name => "name",
        };
        if self.descending {
            write!(f, "-{}", name)
        } else {
            f.write_str(name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_accepts_known_fields() {
        let price: ProductOrdering = "price".parse().unwrap();
        assert_eq!(price, ProductOrdering { field: OrderingField::Price, descending: false });
        assert_eq!(price.sql(), "price ASC, id ASC");

        let name_desc: ProductOrdering = "-name".parse().unwrap();
        assert!(name_desc.descending);
        assert_eq!(name_desc.to_string(), "-name");
    }

    #[test]
    fn ordering_rejects_unknown_fields() {
        let err = "quantity".parse::<ProductOrdering>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid ordering 'quantity'. Expected one of: price, -price, name, -name."
        );
        assert!("".parse::<ProductOrdering>().is_err());
        assert!("--price".parse::<ProductOrdering>().is_err());
    }
}
