use crate::database::sqlite::SqliteDatabase;
use crate::errors::{AppError, Result};
use crate::models::category::{CategoryRef, NewCategory, ProductCategory};
use crate::models::product::{NewProduct, ProductView};
use crate::models::shop::{NewShop, Shop};
use crate::services::category_service::CategoryService;
use crate::utils::validation::Validator;
use std::sync::Arc;
use tracing::info;

/// Inserts, updates and deletes for shops, categories and products.
pub struct CatalogService {
    db: Arc<SqliteDatabase>,
}

impl CatalogService {
    pub fn new(db: Arc<SqliteDatabase>) -> Self {
        Self { db }
    }

    pub async fn create_shop(&self, shop: NewShop) -> Result<Shop> {
        let shop = NewShop { name: shop.name.trim().to_string(), ..shop };
        Validator::validate_shop(&shop)?;

        let created = self.db.create_shop(&shop).await?;
        info!(action = "shop_created", shop_id = created.id, name = %created.name);
        Ok(created)
    }

    pub async fn get_shop(&self, shop_id: i64) -> Result<Shop> {
        self.db.get_shop_by_id(shop_id).await?.ok_or(AppError::ShopNotFound)
    }

    pub async fn list_categories(&self) -> Result<Vec<ProductCategory>> {
        self.db.list_categories().await
    }

    pub async fn create_category(&self, category: NewCategory) -> Result<ProductCategory> {
        let category = NewCategory { name: category.name.trim().to_string(), ..category };
        Validator::validate_name("Category", &category.name)?;

        if let Some(parent_id) = category.parent_category {
            if self.db.get_category_by_id(parent_id).await?.is_none() {
                return Err(AppError::ValidationError(format!("Parent category {} does not exist", parent_id)));
            }
        }
        if let Some(shop_id) = category.shop {
            self.get_shop(shop_id).await?;
        }

        let created = self.db.create_category(&category).await?;
        info!(
            action = "category_created",
            category_id = created.id,
            parent_category = ?created.parent_category,
            status = %created.status
        );
        Ok(created)
    }

    pub async fn reparent_category(&self, category_ref: &CategoryRef, parent_category: Option<i64>) -> Result<ProductCategory> {
        let category = CategoryService::new(self.db.clone()).resolve_category(category_ref).await?;

        let moved = self.db.reparent_category(category.id, parent_category).await?;
        info!(action = "category_reparented", category_id = moved.id, parent_category = ?moved.parent_category);
        Ok(moved)
    }

    pub async fn create_product(&self, product: NewProduct) -> Result<ProductView> {
        let product = NewProduct {
            name: product.name.trim().to_string(),
            currency: product.currency.trim().to_string(),
            ..product
        };
        Validator::validate_product(&product)?;

        self.get_shop(product.shop).await?;
        if self.db.get_category_by_id(product.category).await?.is_none() {
            return Err(AppError::CategoryNotFound);
        }

        let created = self.db.create_product(&product).await?;
        info!(action = "product_created", product_id = created.id, category_id = created.category, shop_id = created.shop);
        Ok(created.into())
    }

    pub async fn get_product(&self, product_id: i64) -> Result<ProductView> {
        self.db
            .get_product_by_id(product_id)
            .await?
            .map(ProductView::from)
            .ok_or(AppError::ProductNotFound)
    }

    pub async fn delete_product(&self, product_id: i64) -> Result<()> {
        if !self.db.delete_product(product_id).await? {
            return Err(AppError::ProductNotFound);
        }
        info!(action = "product_deleted", product_id = product_id);
        Ok(())
    }
}
