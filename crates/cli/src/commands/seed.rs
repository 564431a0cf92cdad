//! Catalog seeding command.
//!
//! Inserts a small sample catalog for local development. Idempotent:
//! existing slugs are left alone, so re-running after edits is safe.
//!
//! # Usage
//!
//! ```bash
//! nb-cli seed
//! ```

use rand::Rng;
use rust_decimal::Decimal;
use sqlx::PgPool;

use super::{CommandError, database_url};

const SIZES: [&str; 4] = ["S", "M", "L", "XL"];

struct SeedCategory {
    slug: &'static str,
    name: &'static str,
    description: &'static str,
}

struct SeedProduct {
    slug: &'static str,
    name: &'static str,
    category: &'static str,
    price: i64,
    sale_price: Option<i64>,
}

const CATEGORIES: [SeedCategory; 3] = [
    SeedCategory {
        slug: "tops",
        name: "Tops",
        description: "Tees, shirts and hoodies",
    },
    SeedCategory {
        slug: "bottoms",
        name: "Bottoms",
        description: "Trousers and shorts",
    },
    SeedCategory {
        slug: "interstellar",
        name: "Interstellar",
        description: "Limited drop with free delivery",
    },
];

const PRODUCTS: [SeedProduct; 5] = [
    SeedProduct {
        slug: "velvet-hoodie",
        name: "Velvet Hoodie",
        category: "tops",
        price: 549,
        sale_price: Some(449),
    },
    SeedProduct {
        slug: "midnight-tee",
        name: "Midnight Tee",
        category: "tops",
        price: 249,
        sale_price: None,
    },
    SeedProduct {
        slug: "drift-cargos",
        name: "Drift Cargos",
        category: "bottoms",
        price: 399,
        sale_price: None,
    },
    SeedProduct {
        slug: "orbit-shorts",
        name: "Orbit Shorts",
        category: "bottoms",
        price: 199,
        sale_price: Some(149),
    },
    SeedProduct {
        slug: "interstellar-jacket",
        name: "Interstellar Jacket",
        category: "interstellar",
        price: 899,
        sale_price: None,
    },
];

/// Seed the catalog with sample data.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or an insert
/// fails.
pub async fn run() -> Result<(), CommandError> {
    dotenvy::dotenv().ok();

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(&database_url()?).await?;

    for (position, category) in CATEGORIES.iter().enumerate() {
        sqlx::query(
            r"
            INSERT INTO store.categories (slug, name, description, position)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (slug) DO NOTHING
            ",
        )
        .bind(category.slug)
        .bind(category.name)
        .bind(category.description)
        .bind(i32::try_from(position).unwrap_or(0))
        .execute(&pool)
        .await?;
    }
    tracing::info!("Seeded {} categories", CATEGORIES.len());

    let mut rng = rand::rng();
    let mut created = 0;
    for product in &PRODUCTS {
        if let Some(id) = insert_product(&pool, product).await? {
            for size in SIZES {
                let available: i32 = rng.random_range(0..=25);
                sqlx::query(
                    r"
                    INSERT INTO store.product_variants (product_id, size, available)
                    VALUES ($1, $2, $3)
                    ",
                )
                .bind(id)
                .bind(size)
                .bind(available)
                .execute(&pool)
                .await?;
            }
            created += 1;
        }
    }

    tracing::info!("Seeded {created} products (existing slugs skipped)");
    Ok(())
}

/// Insert one product, returning its id, or `None` when the slug exists.
async fn insert_product(pool: &PgPool, product: &SeedProduct) -> Result<Option<i32>, CommandError> {
    // sale_price -1 means "no sale", matching the storefront's sentinel
    let sale_price = product.sale_price.map_or(Decimal::NEGATIVE_ONE, Decimal::from);

    let row: Option<(i32,)> = sqlx::query_as(
        r"
        INSERT INTO store.products
            (name, slug, categories, description_short, description_long,
             featured_image, images, price, sale_price)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (slug) DO NOTHING
        RETURNING id
        ",
    )
    .bind(product.name)
    .bind(product.slug)
    .bind(vec![product.category.to_owned()])
    .bind(format!("{} from the sample catalog.", product.name))
    .bind(format!(
        "{} is seeded for local development. Edit or delete it freely.",
        product.name
    ))
    .bind(format!("https://img.example/{}.jpg", product.slug))
    .bind(Vec::<String>::new())
    .bind(Decimal::from(product.price))
    .bind(sale_price)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|(id,)| id))
}
