use crate::errors::{AppError, Result};
use crate::models::product::NewProduct;
use crate::models::shop::{NewShop, MAX_RATING, MIN_RATING};
use once_cell::sync::Lazy;
use regex::Regex;

static USERNAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("valid username regex"));
static CURRENCY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z]{2,10}$").expect("valid currency regex"));

pub const MAX_NAME_LEN: usize = 255;
pub const MAX_AGE: i64 = 150;

pub struct Validator;

impl Validator {
    pub fn validate_username(username: &str) -> Result<()> {
        if username.len() < 3 {
            return Err(AppError::ValidationError("Username must be at least 3 characters long".to_string()));
        }

        if username.len() > 30 {
            return Err(AppError::ValidationError("Username must be less than 30 characters".to_string()));
        }

        if !USERNAME_RE.is_match(username) {
            return Err(AppError::ValidationError("Username can only contain letters, numbers, underscores, and hyphens".to_string()));
        }

        Ok(())
    }

    pub fn validate_password(password: &str) -> Result<()> {
        if password.len() < 8 {
            return Err(AppError::ValidationError("Password must be at least 8 characters long".to_string()));
        }

        if password.len() > 128 {
            return Err(AppError::ValidationError("Password must be less than 128 characters".to_string()));
        }

        let has_letter = password.chars().any(|c| c.is_alphabetic());
        let has_digit = password.chars().any(|c| c.is_numeric());

        if !has_letter || !has_digit {
            return Err(AppError::ValidationError("Password must contain at least one letter and one digit".to_string()));
        }

        Ok(())
    }

    pub fn validate_age(age: Option<i64>) -> Result<()> {
        match age {
            Some(a) if !(0..=MAX_AGE).contains(&a) => {
                Err(AppError::ValidationError(format!("Age must be between 0 and {}", MAX_AGE)))
            }
            _ => Ok(()),
        }
    }

    pub fn validate_name(kind: &str, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::ValidationError(format!("{} name must not be empty", kind)));
        }
        if name.len() > MAX_NAME_LEN {
            return Err(AppError::ValidationError(format!("{} name must be at most {} characters", kind, MAX_NAME_LEN)));
        }
        Ok(())
    }

    pub fn validate_shop(shop: &NewShop) -> Result<()> {
        Self::validate_name("Shop", &shop.name)?;
        if !shop.rating.is_finite() || shop.rating < MIN_RATING || shop.rating > MAX_RATING {
            return Err(AppError::ValidationError(format!(
                "Rating must be between {} and {}",
                MIN_RATING, MAX_RATING
            )));
        }
        Ok(())
    }

    /// Catalog invariants: non-negative stock and amounts, discount never above price.
    pub fn validate_product(product: &NewProduct) -> Result<()> {
        Self::validate_name("Product", &product.name)?;

        if product.quantity < 0 {
            return Err(AppError::ValidationError("Quantity must not be negative".to_string()));
        }

        for (field, value) in [
            ("price", product.price),
            ("discount_price", product.discount_price),
            ("tax", product.tax),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(AppError::ValidationError(format!("{} must be a non-negative number", field)));
            }
        }

        if product.discount_price > product.price {
            return Err(AppError::ValidationError("discount_price must not exceed price".to_string()));
        }

        if !CURRENCY_RE.is_match(product.currency.trim()) {
            return Err(AppError::ValidationError("Currency must be 2 to 10 letters".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> NewProduct {
        NewProduct {
            shop: 1,
            name: "Sample Product 1".into(),
            description: "Sample Description 1".into(),
            quantity: 10,
            category: 1,
            image_id: Some(1),
            price: 100.0,
            discount_price: 90.0,
            tax: 10.0,
            is_published: true,
            currency: "USD".into(),
        }
    }

    #[test]
    fn accepts_a_well_formed_product() {
        assert!(Validator::validate_product(&product()).is_ok());
        let naira = NewProduct { currency: "Naira".into(), ..product() };
        assert!(Validator::validate_product(&naira).is_ok());
    }

    #[test]
    fn rejects_discount_above_price() {
        let p = NewProduct { discount_price: 120.0, ..product() };
        assert!(matches!(Validator::validate_product(&p), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn rejects_negative_quantity_and_amounts() {
        assert!(Validator::validate_product(&NewProduct { quantity: -1, ..product() }).is_err());
        assert!(Validator::validate_product(&NewProduct { tax: -0.5, ..product() }).is_err());
        assert!(Validator::validate_product(&NewProduct { price: f64::NAN, ..product() }).is_err());
    }

    #[test]
    fn shop_rating_is_bounded() {
        let ok = NewShop { name: "Sample Shop".into(), policy_confirmation: true, reviewed: true, rating: 4.5 };
        assert!(Validator::validate_shop(&ok).is_ok());
        let too_high = NewShop { rating: 5.5, ..ok.clone() };
        assert!(Validator::validate_shop(&too_high).is_err());
        let blank = NewShop { name: "   ".into(), ..ok };
        assert!(Validator::validate_shop(&blank).is_err());
    }

    #[test]
    fn username_and_password_rules() {
        assert!(Validator::validate_username("user1").is_ok());
        assert!(Validator::validate_username("ab").is_err());
        assert!(Validator::validate_username("bad name").is_err());
        assert!(Validator::validate_password("password1").is_ok());
        assert!(Validator::validate_password("password").is_err());
        assert!(Validator::validate_password("short1").is_err());
    }

    #[test]
    fn age_must_be_plausible() {
        assert!(Validator::validate_age(None).is_ok());
        assert!(Validator::validate_age(Some(25)).is_ok());
        assert!(Validator::validate_age(Some(-1)).is_err());
        assert!(Validator::validate_age(Some(200)).is_err());
    }
}
