//! # Seed Data Generator
//!
//! Populates the database with a demo fleet and users for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default database
//! cargo run -p atlas-db --bin seed
//!
//! # Specify database path
//! cargo run -p atlas-db --bin seed -- --db ./data/atlas.db
//! ```
//!
//! ## Generated Data
//! - One car per entry in the demo fleet below, priced per day
//! - A demo renter and a demo admin (fixed IDs, handy for manual testing)

use chrono::Utc;
use std::env;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use atlas_core::{Car, Role, User};
use atlas_db::{Database, DbConfig};

/// Demo fleet: (name, model, price per day in cents).
const FLEET: &[(&str, &str, i64)] = &[
    ("Toyota Corolla", "2024 LE", 4500),
    ("Toyota RAV4", "2023 XLE", 6500),
    ("Honda Civic", "2024 Sport", 5000),
    ("Honda CR-V", "2023 EX", 6800),
    ("Ford Mustang", "2024 GT", 12000),
    ("Ford Explorer", "2023 Limited", 8500),
    ("Tesla Model 3", "2024 Long Range", 9900),
    ("Tesla Model Y", "2024 Performance", 11500),
    ("BMW 3 Series", "2023 330i", 10500),
    ("Jeep Wrangler", "2024 Rubicon", 9000),
    ("Chevrolet Tahoe", "2023 LT", 9500),
    ("Nissan Altima", "2024 SV", 4800),
];

/// Fixed IDs so manual API calls have something stable to point at.
const DEMO_RENTER_ID: &str = "00000000-0000-0000-0000-0000000000aa";
const DEMO_ADMIN_ID: &str = "00000000-0000-0000-0000-0000000000ab";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./atlas_dev.db");

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
                println!("Atlas Rent Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./atlas_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Atlas Rent Seed Data Generator");
    println!("=================================");
    println!("Database: {}", db_path);
    println!();

    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.cars().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} cars", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Seeding fleet...");

    let now = Utc::now();
    for (name, model, price) in FLEET {
        let car = Car {
            id: Uuid::new_v4().to_string(),
            name: (*name).to_string(),
            model: (*model).to_string(),
            price_per_day_cents: *price,
            available: true,
            created_at: now,
        };
        if let Err(e) = db.cars().insert(&car).await {
            eprintln!("Failed to insert {}: {}", name, e);
            continue;
        }
    }
    println!("  {} cars inserted", FLEET.len());

    println!("Seeding users...");
    let users = [
        User {
            id: DEMO_RENTER_ID.to_string(),
            name: "Demo Renter".to_string(),
            email: "renter@example.com".to_string(),
            role: Role::Renter,
            reward_points: 0,
            created_at: now,
        },
        User {
            id: DEMO_ADMIN_ID.to_string(),
            name: "Demo Admin".to_string(),
            email: "admin@example.com".to_string(),
            role: Role::Admin,
            reward_points: 0,
            created_at: now,
        },
    ];
    for user in &users {
        if db.users().get_by_id(&user.id).await?.is_some() {
            continue;
        }
        if let Err(e) = db.users().insert(user).await {
            eprintln!("Failed to insert {}: {}", user.email, e);
        }
    }
    println!("  {} users inserted", users.len());

    println!();
    println!("✓ Seed complete");
    println!("  Demo renter: {}", DEMO_RENTER_ID);
    println!("  Demo admin:  {}", DEMO_ADMIN_ID);

    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=atlas=trace` - Show trace for atlas crates only
/// - Default: INFO level
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,atlas=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
