use crate::errors::{AppError, Result};
use crate::models::category::{CategoryTree, NewCategory, ProductCategory};
use crate::models::interaction::{InteractionType, UserProductInteraction};
use crate::models::product::{NewProduct, Product, ProductOrdering};
use crate::models::shop::{NewShop, Shop};
use crate::models::user::{Gender, User, UserProfile};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use std::str::FromStr;
use tracing::info;

#[derive(Debug)]
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl SqliteDatabase {
    pub async fn new(database_path: &str) -> Result<Self> {
        // Ensure the directory exists
        if let Some(parent) = Path::new(database_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| AppError::DatabaseError(format!("Failed to create database directory: {}", e)))?;
            }
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", database_path))
            .map_err(|e| AppError::DatabaseError(format!("Invalid database path: {}", e)))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to connect to database: {}", e)))?;

        let db = Self { pool };
        db.create_tables().await?;

        info!(action = "database_connected", path = %database_path);
        Ok(db)
    }

    /// Private in-memory database; a single pinned connection keeps it alive.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| AppError::DatabaseError(format!("Invalid database url: {}", e)))?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to open in-memory database: {}", e)))?;

        let db = Self { pool };
        db.create_tables().await?;
        Ok(db)
    }

    async fn create_tables(&self) -> Result<()> {
        let query = r#"
            CREATE TABLE IF NOT EXISTS shops (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                policy_confirmation BOOLEAN NOT NULL DEFAULT FALSE,
                reviewed BOOLEAN NOT NULL DEFAULT FALSE,
                rating REAL NOT NULL DEFAULT 0 CHECK (rating >= 0 AND rating <= 5),
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS product_categories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending', -- 'approved', 'pending', 'rejected'
                parent_category_id INTEGER,
                shop_id INTEGER,
                created_at TEXT NOT NULL,
                FOREIGN KEY (parent_category_id) REFERENCES product_categories (id),
                FOREIGN KEY (shop_id) REFERENCES shops (id) ON DELETE SET NULL
            );

            CREATE TABLE IF NOT EXISTS products (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                shop_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                quantity INTEGER NOT NULL CHECK (quantity >= 0),
                category_id INTEGER NOT NULL,
                image_id INTEGER,
                price REAL NOT NULL CHECK (price >= 0),
                discount_price REAL NOT NULL CHECK (discount_price >= 0 AND discount_price <= price),
                tax REAL NOT NULL DEFAULT 0 CHECK (tax >= 0),
                is_published BOOLEAN NOT NULL DEFAULT FALSE,
                currency TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (shop_id) REFERENCES shops (id) ON DELETE CASCADE,
                FOREIGN KEY (category_id) REFERENCES product_categories (id)
            );

            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS user_profiles (
                user_id INTEGER PRIMARY KEY,
                age INTEGER,
                gender TEXT, -- 'male', 'female', 'other'
                FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS user_product_interactions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                product_id INTEGER NOT NULL,
                interaction_type TEXT NOT NULL, -- 'viewed', 'wishlisted', 'added_to_cart', 'purchased'
                created_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE,
                FOREIGN KEY (product_id) REFERENCES products (id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_categories_name ON product_categories(name);
            CREATE INDEX IF NOT EXISTS idx_categories_parent ON product_categories(parent_category_id);
            CREATE INDEX IF NOT EXISTS idx_products_category ON products(category_id);
            CREATE INDEX IF NOT EXISTS idx_products_shop ON products(shop_id);
            CREATE INDEX IF NOT EXISTS idx_interactions_user ON user_product_interactions(user_id);
            CREATE INDEX IF NOT EXISTS idx_interactions_product ON user_product_interactions(product_id);
        "#;

        sqlx::query(query)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to create tables: {}", e)))?;

        info!(action = "database_schema_ready");
        Ok(())
    }

    // Shops

    pub async fn create_shop(&self, shop: &NewShop) -> Result<Shop> {
        let query = r#"
            INSERT INTO shops (name, policy_confirmation, reviewed, rating, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
        "#;

        let result = sqlx::query(query)
            .bind(&shop.name)
            .bind(shop.policy_confirmation)
            .bind(shop.reviewed)
            .bind(shop.rating)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to create shop: {}", e)))?;

        self.get_shop_by_id(result.last_insert_rowid())
            .await?
            .ok_or(AppError::ShopNotFound)
    }

    pub async fn get_shop_by_id(&self, shop_id: i64) -> Result<Option<Shop>> {
        let query = "SELECT id, name, policy_confirmation, reviewed, rating, created_at FROM shops WHERE id = ?1";
        let row = sqlx::query(query)
            .bind(shop_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to fetch shop: {}", e)))?;

        row.map(|row| {
            Ok(Shop {
                id: row.get("id"),
                name: row.get("name"),
                policy_confirmation: row.get("policy_confirmation"),
                reviewed: row.get("reviewed"),
                rating: row.get("rating"),
                created_at: parse_timestamp(&row.get::<String, _>("created_at"), "created_at")?,
            })
        })
        .transpose()
    }

    // Categories

    pub async fn create_category(&self, category: &NewCategory) -> Result<ProductCategory> {
        let query = r#"
            INSERT INTO product_categories (name, status, parent_category_id, shop_id, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
        "#;

        let result = sqlx::query(query)
            .bind(&category.name)
            .bind(category.status.as_str())
            .bind(category.parent_category)
            .bind(category.shop)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(map_category_write_error)?;

        self.get_category_by_id(result.last_insert_rowid())
            .await?
            .ok_or(AppError::CategoryNotFound)
    }

    pub async fn get_category_by_id(&self, category_id: i64) -> Result<Option<ProductCategory>> {
        let query = r#"
            SELECT id, name, status, parent_category_id, shop_id, created_at
            FROM product_categories
            WHERE id = ?1
        "#;
        let row = sqlx::query(query)
            .bind(category_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to fetch category: {}", e)))?;

        row.as_ref().map(category_from_row).transpose()
    }

    /// Names are not unique; the oldest match wins.
    pub async fn get_category_by_name(&self, name: &str) -> Result<Option<ProductCategory>> {
        let query = r#"
            SELECT id, name, status, parent_category_id, shop_id, created_at
            FROM product_categories
            WHERE name = ?1
            ORDER BY id ASC
            LIMIT 1
        "#;
        let row = sqlx::query(query)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to fetch category by name: {}", e)))?;

        row.as_ref().map(category_from_row).transpose()
    }

    /// Siblings may share a name; the oldest one is returned.
    pub async fn find_child_category(&self, parent_id: i64, name: &str) -> Result<Option<ProductCategory>> {
        let query = r#"
            SELECT id, name, status, parent_category_id, shop_id, created_at
            FROM product_categories
            WHERE parent_category_id = ?1 AND name = ?2
            ORDER BY id ASC
            LIMIT 1
        "#;
        let row = sqlx::query(query)
            .bind(parent_id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to fetch subcategory: {}", e)))?;

        row.as_ref().map(category_from_row).transpose()
    }

    pub async fn list_child_categories(&self, parent_id: i64) -> Result<Vec<ProductCategory>> {
        let query = r#"
            SELECT id, name, status, parent_category_id, shop_id, created_at
            FROM product_categories
            WHERE parent_category_id = ?1
            ORDER BY id ASC
        "#;
        let rows = sqlx::query(query)
            .bind(parent_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to fetch subcategories: {}", e)))?;

        rows.iter().map(category_from_row).collect()
    }

    pub async fn list_categories(&self) -> Result<Vec<ProductCategory>> {
        let query = r#"
            SELECT id, name, status, parent_category_id, shop_id, created_at
            FROM product_categories
            ORDER BY id ASC
        "#;
        let rows = sqlx::query(query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to fetch categories: {}", e)))?;

        rows.iter().map(category_from_row).collect()
    }

    /// Moves a category under a new parent (or to the root) after checking
    /// the whole tree inside the same transaction.
    pub async fn reparent_category(&self, category_id: i64, new_parent: Option<i64>) -> Result<ProductCategory> {
        let mut tx = self.pool.begin().await?;

        let select = r#"
            SELECT id, name, status, parent_category_id, shop_id, created_at
            FROM product_categories
            ORDER BY id ASC
        "#;
        let rows = sqlx::query(select)
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to load category tree: {}", e)))?;
        let categories = rows.iter().map(category_from_row).collect::<Result<Vec<_>>>()?;
        let tree = CategoryTree::build(&categories)?;

        if !tree.contains(category_id) {
            return Err(AppError::CategoryNotFound);
        }
        if let Some(parent_id) = new_parent {
            if !tree.contains(parent_id) {
                return Err(AppError::ValidationError(format!("Parent category {} does not exist", parent_id)));
            }
            if tree.would_create_cycle(category_id, parent_id) {
                return Err(AppError::ValidationError(format!(
                    "Category {} cannot be moved under its own descendant {}",
                    category_id, parent_id
                )));
            }
        }

        sqlx::query("UPDATE product_categories SET parent_category_id = ?1 WHERE id = ?2")
            .bind(new_parent)
            .bind(category_id)
            .execute(&mut *tx)
            .await
            .map_err(map_category_write_error)?;

        tx.commit().await?;

        self.get_category_by_id(category_id)
            .await?
            .ok_or(AppError::CategoryNotFound)
    }

    // Products

    pub async fn create_product(&self, product: &NewProduct) -> Result<Product> {
        let query = r#"
            INSERT INTO products (shop_id, name, description, quantity, category_id, image_id, price, discount_price, tax, is_published, currency, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
        "#;

        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(query)
            .bind(product.shop)
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.quantity)
            .bind(product.category)
            .bind(product.image_id)
            .bind(product.price)
            .bind(product.discount_price)
            .bind(product.tax)
            .bind(product.is_published)
            .bind(&product.currency)
            .bind(&now)
            .bind(&now)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if e.to_string().contains("CHECK constraint failed") {
                    AppError::ValidationError("Product fields violate catalog constraints".to_string())
                } else {
                    AppError::DatabaseError(format!("Failed to create product: {}", e))
                }
            })?;

        self.get_product_by_id(result.last_insert_rowid())
            .await?
            .ok_or(AppError::ProductNotFound)
    }

    pub async fn get_product_by_id(&self, product_id: i64) -> Result<Option<Product>> {
        let query = r#"
            SELECT id, shop_id, name, description, quantity, category_id, image_id, price, discount_price, tax, is_published, currency, created_at, updated_at
            FROM products
            WHERE id = ?1
        "#;
        let row = sqlx::query(query)
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to fetch product: {}", e)))?;

        row.as_ref().map(product_from_row).transpose()
    }

    pub async fn list_products_by_category(
        &self,
        category_id: i64,
        ordering: Option<ProductOrdering>,
    ) -> Result<Vec<Product>> {
        let order_clause = ordering.map(|o| o.sql()).unwrap_or("id ASC");
        let query = format!(
            r#"
            SELECT id, shop_id, name, description, quantity, category_id, image_id, price, discount_price, tax, is_published, currency, created_at, updated_at
            FROM products
            WHERE category_id = ?1
            ORDER BY {}
            "#,
            order_clause
        );

        let rows = sqlx::query(&query)
            .bind(category_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to fetch products by category: {}", e)))?;

        rows.iter().map(product_from_row).collect()
    }

    pub async fn list_published_product_ids(&self) -> Result<Vec<i64>> {
        let rows = sqlx::query("SELECT id FROM products WHERE is_published = TRUE ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to fetch catalog: {}", e)))?;

        Ok(rows.iter().map(|row| row.get("id")).collect())
    }

    /// Rows for `product_ids` in one round trip; missing ids are skipped and
    /// the result is in id order.
    pub async fn list_products_by_ids(&self, product_ids: &[i64]) -> Result<Vec<Product>> {
        if product_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; product_ids.len()].join(", ");
        let query = format!(
            r#"
            SELECT id, shop_id, name, description, quantity, category_id, image_id, price, discount_price, tax, is_published, currency, created_at, updated_at
            FROM products
            WHERE id IN ({})
            ORDER BY id ASC
            "#,
            placeholders
        );

        let mut statement = sqlx::query(&query);
        for id in product_ids {
            statement = statement.bind(*id);
        }
        let rows = statement
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to fetch products by id: {}", e)))?;

        rows.iter().map(product_from_row).collect()
    }

    pub async fn delete_product(&self, product_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(product_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete product: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    // Users

    pub async fn create_user_with_profile(
        &self,
        username: &str,
        password_hash: &str,
        age: Option<i64>,
        gender: Option<Gender>,
    ) -> Result<(User, UserProfile)> {
        let mut tx = self.pool.begin().await?;
        let created_at = Utc::now();

        let result = sqlx::query("INSERT INTO users (username, password_hash, created_at) VALUES (?1, ?2, ?3)")
            .bind(username)
            .bind(password_hash)
            .bind(created_at.to_rfc3339())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if e.to_string().contains("UNIQUE constraint failed") {
                    AppError::ValidationError("Username already exists".to_string())
                } else {
                    AppError::DatabaseError(format!("Failed to create user: {}", e))
                }
            })?;
        let user_id = result.last_insert_rowid();

        sqlx::query("INSERT INTO user_profiles (user_id, age, gender) VALUES (?1, ?2, ?3)")
            .bind(user_id)
            .bind(age)
            .bind(gender.map(|g| g.as_str()))
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to create user profile: {}", e)))?;

        tx.commit().await?;

        info!(action = "user_created", user_id = user_id, username = %username);
        Ok((
            User {
                id: user_id,
                username: username.to_string(),
                password_hash: password_hash.to_string(),
                created_at,
            },
            UserProfile { user: user_id, age, gender },
        ))
    }

    pub async fn get_user_by_id(&self, user_id: i64) -> Result<Option<User>> {
        let row = sqlx::query("SELECT id, username, password_hash, created_at FROM users WHERE id = ?1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to fetch user: {}", e)))?;

        row.map(|row| {
            Ok(User {
                id: row.get("id"),
                username: row.get("username"),
                password_hash: row.get("password_hash"),
                created_at: parse_timestamp(&row.get::<String, _>("created_at"), "created_at")?,
            })
        })
        .transpose()
    }

    pub async fn get_user_profile(&self, user_id: i64) -> Result<Option<UserProfile>> {
        let row = sqlx::query("SELECT user_id, age, gender FROM user_profiles WHERE user_id = ?1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to fetch user profile: {}", e)))?;

        Ok(row.map(|row| UserProfile {
            user: row.get("user_id"),
            age: row.get("age"),
            gender: row.get::<Option<String>, _>("gender").map(|g| Gender::from_db(&g)),
        }))
    }

    // Interactions

    pub async fn record_interaction(
        &self,
        user_id: i64,
        product_id: i64,
        interaction_type: InteractionType,
    ) -> Result<UserProductInteraction> {
        let created_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO user_product_interactions (user_id, product_id, interaction_type, created_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(interaction_type.as_str())
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to record interaction: {}", e)))?;

        Ok(UserProductInteraction {
            id: result.last_insert_rowid(),
            user: user_id,
            product: product_id,
            interaction_type,
            created_at,
        })
    }

    pub async fn list_user_interactions(&self, user_id: i64) -> Result<Vec<UserProductInteraction>> {
        let query = r#"
            SELECT id, user_id, product_id, interaction_type, created_at
            FROM user_product_interactions
            WHERE user_id = ?1
            ORDER BY created_at DESC, id DESC
        "#;
        let rows = sqlx::query(query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to fetch interactions: {}", e)))?;

        rows.iter().map(interaction_from_row).collect()
    }

    pub async fn list_all_interactions(&self) -> Result<Vec<UserProductInteraction>> {
        let query = r#"
            SELECT id, user_id, product_id, interaction_type, created_at
            FROM user_product_interactions
            ORDER BY id ASC
        "#;
        let rows = sqlx::query(query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to fetch interactions: {}", e)))?;

        rows.iter().map(interaction_from_row).collect()
    }
}

fn parse_timestamp(raw: &str, column: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::DatabaseError(format!("Invalid {} date: {}", column, e)))
}

fn map_category_write_error(e: sqlx::Error) -> AppError {
    let message = e.to_string();
    if message.contains("FOREIGN KEY constraint failed") {
        AppError::ValidationError("Referenced parent category or shop does not exist".to_string())
    } else {
        AppError::DatabaseError(format!("Failed to write category: {}", message))
    }
}

fn category_from_row(row: &SqliteRow) -> Result<ProductCategory> {
    Ok(ProductCategory {
        id: row.get("id"),
        name: row.get("name"),
        status: row.get::<String, _>("status").parse()?,
        parent_category: row.get("parent_category_id"),
        shop: row.get("shop_id"),
        created_at: parse_timestamp(&row.get::<String, _>("created_at"), "created_at")?,
    })
}

fn product_from_row(row: &SqliteRow) -> Result<Product> {
    Ok(Product {
        id: row.get("id"),
        shop: row.get("shop_id"),
        name: row.get("name"),
        description: row.get("description"),
        quantity: row.get("quantity"),
        category: row.get("category_id"),
        image_id: row.get("image_id"),
        price: row.get("price"),
        discount_price: row.get("discount_price"),
        tax: row.get("tax"),
        is_published: row.get("is_published"),
        currency: row.get("currency"),
        created_at: parse_timestamp(&row.get::<String, _>("created_at"), "created_at")?,
        updated_at: parse_timestamp(&row.get::<String, _>("updated_at"), "updated_at")?,
    })
}

fn interaction_from_row(row: &SqliteRow) -> Result<UserProductInteraction> {
    Ok(UserProductInteraction {
        id: row.get("id"),
        user: row.get("user_id"),
        product: row.get("product_id"),
        interaction_type: row.get::<String, _>("interaction_type").parse()?,
        created_at: parse_timestamp(&row.get::<String, _>("created_at"), "created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::category::CategoryStatus;

    async fn seeded() -> (SqliteDatabase, Shop, ProductCategory) {
        let db = SqliteDatabase::in_memory().await.unwrap();
        let shop = db
            .create_shop(&NewShop { name: "Sample Shop".into(), policy_confirmation: true, reviewed: true, rating: 4.5 })
            .await
            .unwrap();
        let category = db
            .create_category(&NewCategory {
                name: "Sample Category 1".into(),
                status: CategoryStatus::Approved,
                parent_category: None,
                shop: None,
            })
            .await
            .unwrap();
        (db, shop, category)
    }

    fn new_product(shop: i64, category: i64, name: &str, price: f64, discount_price: f64) -> NewProduct {
        NewProduct {
            shop,
            name: name.into(),
            description: format!("{} description", name),
            quantity: 10,
            category,
            image_id: None,
            price,
            discount_price,
            tax: 1.0,
            is_published: true,
            currency: "USD".into(),
        }
    }

    #[tokio::test]
    async fn products_are_filtered_by_category_and_ordered() {
        let (db, shop, category) = seeded().await;
        db.create_product(&new_product(shop.id, category.id, "Sample Product 1", 100.0, 90.0)).await.unwrap();
        db.create_product(&new_product(shop.id, category.id, "Sample Product 2", 50.0, 45.0)).await.unwrap();

        let by_price = db
            .list_products_by_category(category.id, Some("price".parse().unwrap()))
            .await
            .unwrap();
        let prices: Vec<f64> = by_price.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![50.0, 100.0]);

        let by_id = db.list_products_by_category(category.id, None).await.unwrap();
        assert_eq!(by_id[0].name, "Sample Product 1");
    }

    #[tokio::test]
    async fn products_by_ids_skip_missing_rows() {
        let (db, shop, category) = seeded().await;
        let a = db.create_product(&new_product(shop.id, category.id, "A", 10.0, 9.0)).await.unwrap();
        let b = db.create_product(&new_product(shop.id, category.id, "B", 20.0, 18.0)).await.unwrap();

        let found = db.list_products_by_ids(&[b.id, 999, a.id]).await.unwrap();
        let ids: Vec<i64> = found.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
        assert!(db.list_products_by_ids(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn check_constraints_reject_discount_above_price() {
        let (db, shop, category) = seeded().await;
        let err = db
            .create_product(&new_product(shop.id, category.id, "Broken", 10.0, 20.0))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn duplicate_sibling_names_resolve_to_the_oldest() {
        let (db, _shop, category) = seeded().await;
        let child = NewCategory {
            name: "ebook".into(),
            status: CategoryStatus::Approved,
            parent_category: Some(category.id),
            shop: None,
        };
        let first = db.create_category(&child).await.unwrap();
        let second = db.create_category(&child).await.unwrap();
        assert_ne!(first.id, second.id);

        let found = db.find_child_category(category.id, "ebook").await.unwrap().unwrap();
        assert_eq!(found.id, first.id);
    }

    #[tokio::test]
    async fn reparent_rejects_cycles_and_leaves_tree_untouched() {
        let (db, _shop, root) = seeded().await;
        let child = db
            .create_category(&NewCategory {
                name: "child".into(),
                status: CategoryStatus::Approved,
                parent_category: Some(root.id),
                shop: None,
            })
            .await
            .unwrap();

        let err = db.reparent_category(root.id, Some(child.id)).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        let root_after = db.get_category_by_id(root.id).await.unwrap().unwrap();
        assert_eq!(root_after.parent_category, None);

        let moved = db.reparent_category(child.id, None).await.unwrap();
        assert_eq!(moved.parent_category, None);
    }

    #[tokio::test]
    async fn user_and_profile_are_created_together() {
        let db = SqliteDatabase::in_memory().await.unwrap();
        let (user, profile) = db
            .create_user_with_profile("user1", "hash", Some(25), Some(Gender::Male))
            .await
            .unwrap();
        assert_eq!(profile.user, user.id);

        let stored = db.get_user_profile(user.id).await.unwrap().unwrap();
        assert_eq!(stored, profile);

        let dup = db.create_user_with_profile("user1", "hash", None, None).await.unwrap_err();
        assert!(matches!(dup, AppError::ValidationError(_)));
        assert!(db.get_user_by_id(user.id + 1).await.unwrap().is_none());
    }
}
