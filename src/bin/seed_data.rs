//! Seed data script - provisions a local database for exploration
//!
//! Run with: cargo run --bin seed-data
//!
//! This creates (skipping rows that already exist):
//! - the entry door
//! - `--places-per-zone` places in every configured zone
//! - a handful of demo users, most of them with a vehicle

use clap::Parser;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};
use tracing::info;

use estaciona_api::{
    config, db,
    entities::{door, place, user, user_vehicle, vehicle},
};

#[derive(Parser)]
#[command(name = "seed-data", about = "Populate the database with demo parking data")]
struct Cli {
    /// Places created in each configured zone
    #[arg(long, default_value_t = 10)]
    places_per_zone: u32,
}

struct DemoUser {
    name: &'static str,
    tuition: &'static str,
    major: &'static str,
    access_type: &'static str,
    building: &'static str,
    vehicle: Option<(&'static str, &'static str)>,
}

const DEMO_USERS: &[DemoUser] = &[
    DemoUser {
        name: "Ana Torres",
        tuition: "A01000001",
        major: "ITC",
        access_type: "student",
        building: "Edificio A",
        vehicle: Some(("Mazda", "3")),
    },
    DemoUser {
        name: "Luis Herrera",
        tuition: "A01000002",
        major: "IMT",
        access_type: "student",
        building: "Edificio B",
        vehicle: Some(("Nissan", "Versa")),
    },
    DemoUser {
        name: "Sofía Ramírez",
        tuition: "L00000003",
        major: "Faculty",
        access_type: "staff",
        building: "Unknown",
        vehicle: Some(("Honda", "Civic")),
    },
    DemoUser {
        name: "Diego Navarro",
        tuition: "A01000004",
        major: "LAD",
        access_type: "student",
        building: "Unknown",
        vehicle: None,
    },
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config()?;
    config::init_tracing(cfg.log_level(), cfg.log_json);

    info!("=== Estaciona API Seed Data ===");

    let pool = db::establish_connection_from_app_config(&cfg).await?;
    db::run_migrations(&pool).await?;

    if door::Entity::find_by_id(cfg.entry_door_id)
        .one(&pool)
        .await?
        .is_none()
    {
        door::ActiveModel {
            door_id: Set(cfg.entry_door_id),
            requested: Set(false),
        }
        .insert(&pool)
        .await?;
        info!("Created entry door {}", cfg.entry_door_id);
    }

    for zone in &cfg.zones {
        let created = seed_places(&pool, &zone.name, cli.places_per_zone).await?;
        info!("  {}: created {} places", zone.name, created);
    }

    let created = seed_users(&pool).await?;
    info!("  Created {} users", created);

    info!("=== Seed Data Complete ===");
    info!("Try these API calls:");
    info!("  curl http://localhost:{}/data", cfg.port);
    info!(
        "  curl -X POST -H 'content-type: application/json' -d '{{\"tuition\":\"A01000001\"}}' http://localhost:{}/asignar_lugar",
        cfg.port
    );
    info!("Or explore interactively at: http://localhost:{}/swagger-ui", cfg.port);

    Ok(())
}

/// Tops `zone` up to `target` places.
async fn seed_places(pool: &DatabaseConnection, zone: &str, target: u32) -> anyhow::Result<u64> {
    let existing = place::Entity::find()
        .filter(place::Column::Zone.eq(zone))
        .count(pool)
        .await?;

    let mut created = 0;
    for _ in existing..u64::from(target) {
        place::ActiveModel {
            zone: Set(zone.to_string()),
            status: Set(true),
            taken: Set(place::TAKEN_FREE),
            user_id: Set(None),
            ..Default::default()
        }
        .insert(pool)
        .await?;
        created += 1;
    }
    Ok(created)
}

async fn seed_users(pool: &DatabaseConnection) -> anyhow::Result<usize> {
    let mut created = 0;
    for demo in DEMO_USERS {
        let exists = user::Entity::find()
            .filter(user::Column::Tuition.eq(demo.tuition))
            .one(pool)
            .await?
            .is_some();
        if exists {
            continue;
        }

        let saved = user::ActiveModel {
            name: Set(demo.name.to_string()),
            tuition: Set(demo.tuition.to_string()),
            major: Set(demo.major.to_string()),
            access_type: Set(demo.access_type.to_string()),
            password: Set("demo".to_string()),
            building: Set(demo.building.to_string()),
            ..Default::default()
        }
        .insert(pool)
        .await?;

        if let Some((brand, model)) = demo.vehicle {
            let car = vehicle::ActiveModel {
                brand: Set(Some(brand.to_string())),
                model: Set(Some(model.to_string())),
                ..Default::default()
            }
            .insert(pool)
            .await?;

            user_vehicle::ActiveModel {
                user_id: Set(saved.id),
                vehicle_id: Set(car.vehicle_id),
            }
            .insert(pool)
            .await?;
        }
        created += 1;
    }
    Ok(created)
}
