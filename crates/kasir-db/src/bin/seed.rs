//! # Seed Data Generator
//!
//! Populates the database with a small warung catalogue for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./kasir_dev.db (default)
//! cargo run -p kasir-db --bin seed
//!
//! # Specify database path
//! cargo run -p kasir-db --bin seed -- --db ./data/kasir.db
//! ```
//!
//! ## Generated Data
//! - Transaction types: Penjualan, Retur, Pembelian
//! - Categories with products, each with an opening price
//! - Suppliers, linked to the products they deliver
//!
//! Seeding is skipped when the database already has categories.

use std::env;

use kasir_core::input::{NewCategory, NewProduct, NewProductSupplier, NewSupplier, NewTransactionType};
use kasir_core::Money;
use kasir_db::{Database, DbConfig};

/// (name, description, stock effect, revenue effect)
const TRANSACTION_TYPES: &[(&str, &str, bool, bool)] = &[
    ("Penjualan", "Penjualan ke pelanggan", false, true),
    ("Retur", "Barang dikembalikan pelanggan", true, false),
    ("Pembelian", "Pembelian stok dari pemasok", true, false),
];

/// Category name, then (product name, price in rupiah, stock).
const CATALOGUE: &[(&str, &[(&str, i64, i64)])] = &[
    (
        "Minuman",
        &[
            ("Kopi Susu Gula Aren", 18000, 50),
            ("Es Teh Manis", 5000, 100),
            ("Air Mineral 600ml", 4000, 120),
            ("Jus Alpukat", 15000, 30),
        ],
    ),
    (
        "Makanan",
        &[
            ("Nasi Goreng Spesial", 25000, 40),
            ("Mie Ayam Bakso", 20000, 40),
            ("Roti Bakar Cokelat", 12000, 25),
        ],
    ),
    (
        "Camilan",
        &[
            ("Keripik Singkong", 8000, 60),
            ("Pisang Goreng", 10000, 35),
            ("Tahu Crispy", 9000, 45),
        ],
    ),
];

/// (supplier name, contact person, category whose products it delivers)
const SUPPLIERS: &[(&str, &str, &str)] = &[
    ("CV Sumber Rejeki", "Budi Santoso", "Minuman"),
    ("UD Makmur Jaya", "Siti Rahayu", "Makanan"),
    ("Toko Camilan Nusantara", "Agus Prasetyo", "Camilan"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./kasir_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Kasir Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./kasir_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Kasir Seed Data Generator");
    println!("============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.categories().list().await?;
    if !existing.is_empty() {
        println!("⚠ Database already has {} categories", existing.len());
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    for (name, description, stock, revenue) in TRANSACTION_TYPES {
        db.transaction_types()
            .create(&NewTransactionType {
                name: name.to_string(),
                description: Some(description.to_string()),
                is_positive_stock_effect: Some(*stock),
                is_positive_revenue_effect: Some(*revenue),
            })
            .await?;
    }
    println!("✓ {} transaction types", TRANSACTION_TYPES.len());

    let mut products_by_category: Vec<(&str, Vec<String>)> = Vec::new();
    let mut product_count = 0;

    for (category_name, products) in CATALOGUE {
        let category = db
            .categories()
            .create(&NewCategory {
                name: category_name.to_string(),
                description: None,
            })
            .await?;

        let mut ids = Vec::with_capacity(products.len());
        for (name, price, stock) in products.iter() {
            let detail = db
                .products()
                .create(&NewProduct {
                    name: name.to_string(),
                    stock: Some(*stock),
                    category_id: category.id.clone(),
                    price: Some(Money::from_units(*price)),
                    ..Default::default()
                })
                .await?;
            ids.push(detail.product.id);
            product_count += 1;
        }
        products_by_category.push((*category_name, ids));
    }
    println!("✓ {} categories, {} priced products", CATALOGUE.len(), product_count);

    let mut links = 0;
    for (name, contact, category_name) in SUPPLIERS {
        let supplier = db
            .suppliers()
            .create(&NewSupplier {
                name: name.to_string(),
                contact_person: Some(contact.to_string()),
                ..Default::default()
            })
            .await?;

        let products = products_by_category
            .iter()
            .filter(|(category, _)| category == category_name)
            .flat_map(|(_, ids)| ids.iter());

        for product_id in products {
            if let Err(e) = db
                .product_suppliers()
                .create(
                    product_id,
                    &NewProductSupplier {
                        supplier_id: supplier.id.clone(),
                        min_order_quantity: Some(10),
                        lead_time_days: Some(2),
                        ..Default::default()
                    },
                )
                .await
            {
                eprintln!("Failed to link {} to {}: {}", name, product_id, e);
                continue;
            }
            links += 1;
        }
    }
    println!("✓ {} suppliers, {} supplier links", SUPPLIERS.len(), links);

    println!();
    println!("✓ Seed complete");
    Ok(())
}
