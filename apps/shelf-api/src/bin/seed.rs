//! # Seed Data Generator
//!
//! Populates the database with an admin account, a few tags and books for
//! development.
//!
//! ## Usage
//! ```bash
//! cargo run -p shelf-api --bin seed
//!
//! # Specify database path
//! cargo run -p shelf-api --bin seed -- --db ./data/shelf.db
//! ```
//!
//! The admin password comes from `SEED_ADMIN_PASSWORD` (default `admin`).

use std::env;

use anyhow::Context;
use chrono::{NaiveDate, Utc};

use shelf_api::auth::Credentials;
use shelf_core::validation::age_on;
use shelf_core::{Money, NewItem, NewUser, Role};
use shelf_db::{Database, DbConfig};

const ADMIN_EMAIL: &str = "admin@shelf.local";

const TAGS: &[&str] = &["Romance", "Ficção Científica", "Poesia", "Clássicos"];

/// (title, price in cents, stock, tag index)
const BOOKS: &[(&str, i64, i64, usize)] = &[
    ("Dom Casmurro", 2990, 5, 3),
    ("Memórias Póstumas de Brás Cubas", 3490, 3, 3),
    ("Iracema", 1990, 4, 0),
    ("A Hora da Estrela", 2500, 2, 0),
    ("Fundação", 4990, 6, 1),
    ("Neuromancer", 4550, 1, 1),
    ("Sentimento do Mundo", 3900, 2, 2),
    ("Ou Isto ou Aquilo", 2200, 8, 2),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = env::var("DATABASE_PATH").unwrap_or_else(|_| "./shelf.db".to_string());

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
                println!("Shelf Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./shelf.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Shelf Seed Data Generator");
    println!("=========================");
    println!("Database: {db_path}");
    println!();

    let db = Database::new(DbConfig::new(&db_path))
        .await
        .context("Failed to open database")?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    if db.users().get_by_email(ADMIN_EMAIL).await?.is_some() {
        println!("⚠ Seed data already present, skipping.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let password = env::var("SEED_ADMIN_PASSWORD").unwrap_or_else(|_| "admin".to_string());
    let birth_date = NaiveDate::from_ymd_opt(1990, 1, 15).context("invalid seed birth date")?;

    let admin = db
        .users()
        .insert(&NewUser {
            name: "Administrador".to_string(),
            email: ADMIN_EMAIL.to_string(),
            cep: None,
            cpf: None,
            birth_date,
            age: age_on(birth_date, Utc::now().date_naive()),
            password_hash: Credentials::hash(&password)?,
            role: Role::Admin,
        })
        .await?;
    println!("✓ Admin account: {ADMIN_EMAIL}");

    let mut tags = Vec::with_capacity(TAGS.len());
    for name in TAGS {
        let tag = match db.tags().insert(name).await {
            Ok(tag) => tag,
            Err(e) if e.is_unique_violation() => db
                .tags()
                .list()
                .await?
                .into_iter()
                .find(|t| t.name == *name)
                .context("tag vanished during seed")?,
            Err(e) => return Err(e.into()),
        };
        tags.push(tag);
    }
    println!("✓ {} tags", tags.len());

    for (title, cents, stock, tag_idx) in BOOKS {
        let tag = tags.get(*tag_idx).context("book refers to unknown tag")?;
        db.items()
            .insert(&NewItem {
                name: title.to_string(),
                price: Money::from_cents(*cents),
                image_url: format!("/img/{}.jpg", title.to_lowercase().replace(' ', "-")),
                stock: *stock,
                description: String::new(),
                tag_id: tag.id,
                owner_id: admin.id,
            })
            .await?;
    }
    println!("✓ {} books", BOOKS.len());

    db.close().await;
    println!();
    println!("✓ Seed complete!");

    Ok(())
}
