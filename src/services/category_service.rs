use crate::database::sqlite::SqliteDatabase;
use crate::errors::{AppError, Result};
use crate::models::category::{CategoryRef, ProductCategory};
use crate::models::product::{ProductOrdering, ProductView};
use std::sync::Arc;
use tracing::info;

/// Category-scoped product lookups. Read only.
pub struct CategoryService {
    db: Arc<SqliteDatabase>,
}

impl CategoryService {
    pub fn new(db: Arc<SqliteDatabase>) -> Self {
        Self { db }
    }

    pub async fn resolve_category(&self, category_ref: &CategoryRef) -> Result<ProductCategory> {
        let found = match category_ref {
            CategoryRef::Id(id) => match self.db.get_category_by_id(*id).await? {
                Some(category) => Some(category),
                None => self.db.get_category_by_name(&id.to_string()).await?,
            },
            CategoryRef::Name(name) => self.db.get_category_by_name(name).await?,
        };
        found.ok_or(AppError::CategoryNotFound)
    }

    pub async fn list_products_by_category(&self, category_ref: &CategoryRef) -> Result<Vec<ProductView>> {
        let category = self.resolve_category(category_ref).await?;
        let products = self.db.list_products_by_category(category.id, None).await?;

        info!(action = "list_products_by_category", category_id = category.id, count = products.len());
        Ok(products.into_iter().map(ProductView::from).collect())
    }

    /// `ordering` is parsed before any lookup so a bad value is always a 400.
    pub async fn list_products_by_subcategory(
        &self,
        category_ref: &CategoryRef,
        subcategory_name: &str,
        ordering: Option<&str>,
    ) -> Result<Vec<ProductView>> {
        let ordering = ordering
            .map(str::parse::<ProductOrdering>)
            .transpose()?;

        let parent = self.resolve_category(category_ref).await?;
        let subcategory = self
            .db
            .find_child_category(parent.id, subcategory_name)
            .await?
            .ok_or(AppError::SubcategoryNotFound)?;

        let products = self.db.list_products_by_category(subcategory.id, ordering).await?;

        info!(
            action = "list_products_by_subcategory",
            category_id = parent.id,
            subcategory_id = subcategory.id,
            ordering = ?ordering,
            count = products.len()
        );
        Ok(products.into_iter().map(ProductView::from).collect())
    }

    pub async fn list_subcategories(&self, category_ref: &CategoryRef) -> Result<Vec<ProductCategory>> {
        let parent = self.resolve_category(category_ref).await?;
        self.db.list_child_categories(parent.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::category::{CategoryStatus, NewCategory};
    use crate::models::product::NewProduct;
    use crate::models::shop::NewShop;

    struct Fixture {
        service: CategoryService,
        digital: ProductCategory,
    }

    async fn fixture() -> Fixture {
        let db = Arc::new(SqliteDatabase::in_memory().await.unwrap());
        let shop = db
            .create_shop(&NewShop { name: "Sample Shop".into(), policy_confirmation: true, reviewed: true, rating: 3.5 })
            .await
            .unwrap();
        let digital = db
            .create_category(&NewCategory {
                name: "digital services".into(),
                status: CategoryStatus::Approved,
                parent_category: None,
                shop: None,
            })
            .await
            .unwrap();
        let ebook = db
            .create_category(&NewCategory {
                name: "ebook".into(),
                status: CategoryStatus::Approved,
                parent_category: Some(digital.id),
                shop: Some(shop.id),
            })
            .await
            .unwrap();
        db.create_category(&NewCategory {
            name: "mobile_app".into(),
            status: CategoryStatus::Approved,
            parent_category: Some(digital.id),
            shop: Some(shop.id),
        })
        .await
        .unwrap();

        for (name, price, discount, quantity) in [
            ("Product_2", 1300.0, 110.0, 15),
            ("Product_1", 1000.0, 100.0, 10),
            ("Product_3", 1000.0, 90.0, 3),
        ] {
            db.create_product(&NewProduct {
                shop: shop.id,
                name: name.into(),
                description: format!("{} description", name),
                quantity,
                category: ebook.id,
                image_id: None,
                price,
                discount_price: discount,
                tax: 50.0,
                is_published: true,
                currency: "Naira".into(),
            })
            .await
            .unwrap();
        }

        Fixture { service: CategoryService::new(db), digital }
    }

    #[tokio::test]
    async fn ordering_by_price_is_non_decreasing_with_id_tiebreak() {
        let f = fixture().await;
        let products = f
            .service
            .list_products_by_subcategory(&CategoryRef::Id(f.digital.id), "ebook", Some("price"))
            .await
            .unwrap();

        let prices: Vec<f64> = products.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![1000.0, 1000.0, 1300.0]);
        assert!(products[0].id < products[1].id);
    }

    #[tokio::test]
    async fn ordering_by_name_and_descending_forms() {
        let f = fixture().await;
        let parent = CategoryRef::Name("digital services".into());

        let asc = f.service.list_products_by_subcategory(&parent, "ebook", Some("name")).await.unwrap();
        let names: Vec<&str> = asc.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Product_1", "Product_2", "Product_3"]);

        let desc = f.service.list_products_by_subcategory(&parent, "ebook", Some("-price")).await.unwrap();
        assert_eq!(desc[0].price, 1300.0);
    }

    #[tokio::test]
    async fn empty_and_missing_subcategories() {
        let f = fixture().await;
        let parent = CategoryRef::Id(f.digital.id);

        let empty = f.service.list_products_by_subcategory(&parent, "mobile_app", None).await.unwrap();
        assert!(empty.is_empty());

        let missing = f
            .service
            .list_products_by_subcategory(&parent, "Non existent subcategory", None)
            .await
            .unwrap_err();
        assert!(matches!(missing, AppError::SubcategoryNotFound));

        let bad_parent = f
            .service
            .list_products_by_subcategory(&CategoryRef::Name("nope".into()), "ebook", None)
            .await
            .unwrap_err();
        assert!(matches!(bad_parent, AppError::CategoryNotFound));
    }

    #[tokio::test]
    async fn duplicate_subcategory_names_still_list() {
        let f = fixture().await;
        f.service
            .db
            .create_category(&NewCategory {
                name: "ebook".into(),
                status: CategoryStatus::Approved,
                parent_category: Some(f.digital.id),
                shop: None,
            })
            .await
            .unwrap();

        let products = f
            .service
            .list_products_by_subcategory(&CategoryRef::Id(f.digital.id), "ebook", Some("price"))
            .await
            .unwrap();
        assert_eq!(products.len(), 3);
    }

    #[tokio::test]
    async fn all_digit_name_falls_back_to_name_lookup() {
        let f = fixture().await;
        let year = f
            .service
            .db
            .create_category(&NewCategory {
                name: "2024".into(),
                status: CategoryStatus::Approved,
                parent_category: None,
                shop: None,
            })
            .await
            .unwrap();

        let by_name = f.service.resolve_category(&CategoryRef::parse("2024")).await.unwrap();
        assert_eq!(by_name.id, year.id);

        // An existing id still wins over a name.
        let by_id = f.service.resolve_category(&CategoryRef::parse(&f.digital.id.to_string())).await.unwrap();
        assert_eq!(by_id.id, f.digital.id);

        let missing = f.service.resolve_category(&CategoryRef::parse("31337")).await.unwrap_err();
        assert!(matches!(missing, AppError::CategoryNotFound));
    }

    #[tokio::test]
    async fn invalid_ordering_fails_before_lookup() {
        let f = fixture().await;
        let err = f
            .service
            .list_products_by_subcategory(&CategoryRef::Name("nope".into()), "ebook", Some("rating"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn parent_category_products_exclude_subcategory_products() {
        let f = fixture().await;
        let products = f.service.list_products_by_category(&CategoryRef::Id(f.digital.id)).await.unwrap();
        assert!(products.is_empty());

        let children = f.service.list_subcategories(&CategoryRef::Id(f.digital.id)).await.unwrap();
        let names: Vec<&str> = children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["ebook", "mobile_app"]);
    }
}
