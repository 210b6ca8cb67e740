//! Demo data seeding

use colored::Colorize;
use std::collections::HashSet;

use crate::interfaces::cli::CliError;
use crate::ranking::RankingEngine;
use crate::storage::ActivityType;

/// Sample cities used for demo donations
pub const SAMPLE_CITIES: [&str; 29] = [
    "New York",
    "Los Angeles",
    "Chicago",
    "Houston",
    "Phoenix",
    "Philadelphia",
    "San Antonio",
    "San Diego",
    "Dallas",
    "San Jose",
    "Austin",
    "Jacksonville",
    "Fort Worth",
    "Columbus",
    "Charlotte",
    "San Francisco",
    "Indianapolis",
    "Seattle",
    "Denver",
    "Washington",
    "Boston",
    "El Paso",
    "Nashville",
    "Detroit",
    "Oklahoma City",
    "Portland",
    "Las Vegas",
    "Memphis",
    "Louisville",
];

const SAMPLE_DONORS: usize = 50;

/// Record `donations` random donations through the normal engine path
///
/// Each donor logs a `registration` activity the first time it is used.
pub async fn seed_demo_data(engine: &RankingEngine, donations: usize) -> Result<(), CliError> {
    let mut registered: HashSet<String> = HashSet::new();

    for _ in 0..donations {
        let city = SAMPLE_CITIES[rand::random_range(0..SAMPLE_CITIES.len())];
        let donor = format!("donor-{:03}", rand::random_range(1..=SAMPLE_DONORS));
        let amount = rand::random_range(10..=500) as f64;

        if registered.insert(donor.clone()) {
            engine
                .log_activity(&donor, city, ActivityType::Registration, None)
                .await?;
        }
        engine.record_donation(city, amount, &donor).await?;
    }

    let stats = engine.global_statistics().await?;
    println!(
        "{} Seeded {} donations ({} cities, total {:.2})",
        "✓".bold().green(),
        donations.to_string().cyan(),
        stats.total_cities,
        stats.total_donations
    );
    Ok(())
}
