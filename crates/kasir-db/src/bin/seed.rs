//! Seeds the database with a demo grocery catalog.
//!
//! Intended for development and demos; skips seeding when the catalog
//! already has products so it is safe to run repeatedly.
//!
//! ```text
//! KASIR_DATABASE_PATH=./kasir.db cargo run -p kasir-db --bin seed
//! ```

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use kasir_core::{Money, Product, UnitType};
use kasir_db::{Database, DbConfig, DbError};

struct SeedItem {
    name: &'static str,
    price: i64,
    category: &'static str,
    stock: f64,
    unit_type: UnitType,
    sku: Option<&'static str>,
}

const CATALOG: &[SeedItem] = &[
    SeedItem {
        name: "Beras Premium 5kg",
        price: 75_000,
        category: "Sembako",
        stock: 40.0,
        unit_type: UnitType::Discrete,
        sku: Some("BRS-5KG"),
    },
    SeedItem {
        name: "Minyak Goreng 1L",
        price: 18_000,
        category: "Sembako",
        stock: 60.0,
        unit_type: UnitType::Discrete,
        sku: Some("MYK-1L"),
    },
    SeedItem {
        name: "Gula Pasir 1kg",
        price: 16_000,
        category: "Sembako",
        stock: 50.0,
        unit_type: UnitType::Discrete,
        sku: Some("GLA-1KG"),
    },
    SeedItem {
        name: "Telur Ayam",
        price: 28_000,
        category: "Segar",
        stock: 25.0,
        unit_type: UnitType::Weighed,
        sku: Some("TLR-KG"),
    },
    SeedItem {
        name: "Bawang Merah",
        price: 35_000,
        category: "Segar",
        stock: 12.0,
        unit_type: UnitType::Weighed,
        sku: Some("BWM-KG"),
    },
    SeedItem {
        name: "Bawang Putih",
        price: 32_000,
        category: "Segar",
        stock: 10.0,
        unit_type: UnitType::Weighed,
        sku: Some("BWP-KG"),
    },
    SeedItem {
        name: "Cabai Rawit",
        price: 55_000,
        category: "Segar",
        stock: 6.0,
        unit_type: UnitType::Weighed,
        sku: Some("CBR-KG"),
    },
    SeedItem {
        name: "Kopi Bubuk 200g",
        price: 24_000,
        category: "Minuman",
        stock: 30.0,
        unit_type: UnitType::Discrete,
        sku: Some("KOP-200"),
    },
    SeedItem {
        name: "Teh Celup isi 25",
        price: 12_000,
        category: "Minuman",
        stock: 45.0,
        unit_type: UnitType::Discrete,
        sku: Some("TEH-25"),
    },
    SeedItem {
        name: "Sabun Mandi",
        price: 5_000,
        category: "Kebersihan",
        stock: 80.0,
        unit_type: UnitType::Discrete,
        sku: Some("SBN-001"),
    },
];

#[tokio::main]
async fn main() -> Result<(), DbError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let path =
        std::env::var("KASIR_DATABASE_PATH").unwrap_or_else(|_| "./kasir.db".to_string());

    info!(path = %path, "Seeding database");

    let db = Database::new(DbConfig::new(&path)).await?;
    let products = db.products();

    if products.count().await? > 0 {
        info!("Catalog already has products, nothing to do");
        db.close().await;
        return Ok(());
    }

    let now = Utc::now();
    for item in CATALOG {
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: item.name.to_string(),
            price: Money::from_minor(item.price),
            category: item.category.to_string(),
            stock: item.stock,
            unit_type: item.unit_type,
            image: String::new(),
            description: String::new(),
            sku: item.sku.map(str::to_string),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        products.insert(&product).await?;
        info!(name = %item.name, stock = item.stock, "Seeded product");
    }

    info!(count = CATALOG.len(), "Seeding complete");
    db.close().await;
    Ok(())
}
