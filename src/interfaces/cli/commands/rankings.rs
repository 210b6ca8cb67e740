//! Ranking commands

use colored::Colorize;

use crate::interfaces::cli::CliError;
use crate::ranking::{CityRanking, RankingEngine};

fn print_ranking_row(entry: &CityRanking, highlight: bool) {
    let line = format!(
        "  #{:<4} {:<24} {:>14.2}  donors: {:<6} avg: {:.2}",
        entry.rank, entry.city, entry.total_donations, entry.total_donors, entry.average_donation
    );
    if highlight {
        println!("{}", line.bold().green());
    } else {
        println!("{}", line);
    }
}

pub async fn record_donation(
    engine: &RankingEngine,
    city: &str,
    amount: f64,
    donor: &str,
) -> Result<(), CliError> {
    let entry = engine.record_donation(city, amount, donor).await?;
    println!(
        "{} {} {} {}",
        "✓".bold().green(),
        "Donation recorded for".green(),
        entry.city.cyan(),
        format!("(rank #{}, total {:.2})", entry.rank, entry.total_donations).dimmed()
    );
    Ok(())
}

pub async fn show_top_cities(engine: &RankingEngine, limit: usize) -> Result<(), CliError> {
    let top = engine.top_cities(limit).await?;
    if top.is_empty() {
        println!("{} No cities ranked yet", "ℹ".bold().blue());
        return Ok(());
    }

    println!("{}", format!("Top {} cities:", top.len()).bold().green());
    for entry in &top {
        print_ranking_row(entry, false);
    }
    Ok(())
}

pub async fn show_city_context(
    engine: &RankingEngine,
    city: &str,
    radius: u32,
) -> Result<(), CliError> {
    let context = engine.city_context(city, radius).await?;
    let Some(rank) = context.user_city_rank else {
        println!(
            "{} {} has no donations yet",
            "ℹ".bold().blue(),
            city.trim().cyan()
        );
        return Ok(());
    };

    println!(
        "{} {}",
        city.trim().bold().cyan(),
        format!("is ranked #{}", rank).bold()
    );
    for entry in &context.context {
        print_ranking_row(entry, entry.rank == rank);
    }
    Ok(())
}

pub async fn show_city_statistics(
    engine: &RankingEngine,
    city: &str,
    json: bool,
) -> Result<(), CliError> {
    let Some(stats) = engine.city_statistics(city).await? else {
        return Err(CliError::CommandError(format!(
            "No donations recorded for city '{}'",
            city.trim()
        )));
    };

    if json {
        let out = serde_json::to_string_pretty(&stats)
            .map_err(|e| CliError::CommandError(e.to_string()))?;
        println!("{}", out);
        return Ok(());
    }

    println!("{}", stats.city.bold().cyan());
    let rank = stats
        .rank
        .map(|r| format!("#{}", r))
        .unwrap_or_else(|| "unranked".to_string());
    println!("  rank:            {}", rank);
    println!("  total donations: {:.2}", stats.total_donations);
    println!("  donors:          {}", stats.total_donors);
    println!("  donations:       {}", stats.donation_count);
    println!("  average:         {:.2}", stats.average_donation);
    println!(
        "  last updated:    {}",
        stats.last_updated.format("%Y-%m-%d %H:%M:%S UTC")
    );

    if !stats.recent_activities.is_empty() {
        println!("{}", "  recent activity:".dimmed());
        for activity in &stats.recent_activities {
            let amount = activity
                .amount
                .map(|a| format!("{:.2}", a))
                .unwrap_or_default();
            println!(
                "    {} {:<16} {:<12} {}",
                activity.timestamp.format("%Y-%m-%d %H:%M:%S"),
                activity.activity_type.to_string(),
                activity.donor_id,
                amount
            );
        }
    }
    Ok(())
}

pub async fn show_global_statistics(engine: &RankingEngine, json: bool) -> Result<(), CliError> {
    let stats = engine.global_statistics().await?;

    if json {
        let out = serde_json::to_string_pretty(&stats)
            .map_err(|e| CliError::CommandError(e.to_string()))?;
        println!("{}", out);
        return Ok(());
    }

    println!("{}", "Global statistics".bold().green());
    println!("  cities:             {}", stats.total_cities);
    println!("  total donations:    {:.2}", stats.total_donations);
    println!("  donors:             {}", stats.total_donors);
    println!("  average per city:   {:.2}", stats.average_donation_per_city);
    Ok(())
}

pub async fn rebuild_ranking(engine: &RankingEngine) -> Result<(), CliError> {
    let count = engine.rebuild_ranking().await?;
    println!(
        "{} Ranking rebuilt for {} cities",
        "✓".bold().green(),
        count.to_string().cyan()
    );
    Ok(())
}
