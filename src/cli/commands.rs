use crate::cli::CLI;
use crate::config::AppConfig;
use crate::database::sqlite::SqliteDatabase;
use crate::errors::Result;
use crate::models::category::{CategoryStatus, NewCategory};
use crate::models::interaction::{InteractionType, NewInteraction};
use crate::models::product::NewProduct;
use crate::models::shop::NewShop;
use crate::models::user::{CreateUserRequest, Gender};
use crate::services::catalog_service::CatalogService;
use crate::services::user_service::UserService;
use colored::Colorize;
use std::sync::Arc;

/// Ids of the rows written by [`seed_sample_data`].
#[derive(Debug, Clone)]
pub struct SeedSummary {
    pub shop_id: i64,
    pub populated_category_id: i64,
    pub empty_category_id: i64,
    pub digital_category_id: i64,
    pub product_ids: Vec<i64>,
    pub user_ids: Vec<i64>,
}

pub async fn handle_seed_command(config: &AppConfig) -> Result<()> {
    let db = Arc::new(SqliteDatabase::new(&config.database_path).await?);
    CLI::print_info(&format!("Seeding {}", config.database_path));

    let summary = seed_sample_data(db).await?;

    CLI::print_success("Sample data inserted");
    println!("Shop: {}", summary.shop_id.to_string().yellow());
    println!(
        "Categories: {} (2 products), {} (empty), {} (with 'ebook' subcategory)",
        summary.populated_category_id.to_string().yellow(),
        summary.empty_category_id.to_string().yellow(),
        summary.digital_category_id.to_string().yellow()
    );
    println!("Products: {:?}", summary.product_ids);
    println!("Users: {:?}", summary.user_ids);
    Ok(())
}

/// Writes the reference catalog: one shop, a category with two products,
/// an empty category, a parent with an `ebook` subcategory, and two users
/// whose interactions overlap on one product.
pub async fn seed_sample_data(db: Arc<SqliteDatabase>) -> Result<SeedSummary> {
    let catalog = CatalogService::new(db.clone());
    let users = UserService::new(db);

    let shop = catalog
        .create_shop(NewShop {
            name: "Sample Shop".to_string(),
            policy_confirmation: true,
            reviewed: true,
            rating: 4.5,
        })
        .await?;

    let populated = catalog.create_category(approved("Sample Category 1", None, None)).await?;
    let empty = catalog.create_category(approved("Sample Category 2", None, None)).await?;
    let digital = catalog.create_category(approved("digital services", None, None)).await?;
    let ebook = catalog
        .create_category(approved("ebook", Some(digital.id), Some(shop.id)))
        .await?;
    catalog
        .create_category(approved("mobile_app", Some(digital.id), Some(shop.id)))
        .await?;

    let mut product_ids = Vec::new();
    for (name, category, image_id, price, discount_price, tax, quantity, currency) in [
        ("Sample Product 1", populated.id, 1, 100.0, 90.0, 10.0, 10, "USD"),
        ("Sample Product 2", populated.id, 2, 50.0, 45.0, 5.0, 5, "USD"),
        ("Product_1", ebook.id, 3, 1000.0, 100.0, 50.0, 10, "Naira"),
        ("Product_2", ebook.id, 4, 1300.0, 110.0, 70.0, 15, "Naira"),
    ] {
        let product = catalog
            .create_product(NewProduct {
                shop: shop.id,
                name: name.to_string(),
                description: format!("{} description", name),
                quantity,
                category,
                image_id: Some(image_id),
                price,
                discount_price,
                tax,
                is_published: true,
                currency: currency.to_string(),
            })
            .await?;
        product_ids.push(product.id);
    }

    let mut user_ids = Vec::new();
    for (username, age, gender) in [("user1", 25, Gender::Male), ("user2", 30, Gender::Female)] {
        let user = users
            .create_user(CreateUserRequest {
                username: username.to_string(),
                password: format!("password{}", user_ids.len() + 1),
                age: Some(age),
                gender: Some(gender),
            })
            .await?;
        user_ids.push(user.id);
    }

    for (user, product, interaction_type) in [
        (user_ids[0], product_ids[0], InteractionType::Viewed),
        (user_ids[0], product_ids[1], InteractionType::Purchased),
        (user_ids[1], product_ids[0], InteractionType::Viewed),
        (user_ids[1], product_ids[2], InteractionType::Viewed),
    ] {
        users
            .record_interaction(NewInteraction { user_id: user, product_id: product, interaction_type })
            .await?;
    }

    Ok(SeedSummary {
        shop_id: shop.id,
        populated_category_id: populated.id,
        empty_category_id: empty.id,
        digital_category_id: digital.id,
        product_ids,
        user_ids,
    })
}

fn approved(name: &str, parent_category: Option<i64>, shop: Option<i64>) -> NewCategory {
    NewCategory {
        name: name.to_string(),
        status: CategoryStatus::Approved,
        parent_category,
        shop,
    }
}
