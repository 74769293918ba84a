mod api;
mod cli;
mod config;
mod error;
mod handlers;
mod models;
mod parsing;
mod services;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use dotenv::dotenv;
use std::sync::Arc;

use cli::{Cli, Command};
use config::AppConfig;
use handlers::MealParser;
use models::{top_frequent_foods, DailyProgress, Goals, LogEntry, MealSummary};
use services::OpenAiService;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables before the logger reads RUST_LOG
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let config = AppConfig::from_env();

    match cli.command.unwrap_or_default() {
        Command::Serve => serve(config).await,
        Command::Parse {
            utterance,
            as_log_entries,
        } => parse_once(config, &utterance.join(" "), as_log_entries).await,
        Command::Progress {
            file,
            date,
            calorie_goal,
            protein_goal,
            top,
        } => show_progress(
            &file,
            date.unwrap_or_else(|| chrono::Utc::now().date_naive()),
            Goals {
                daily_calories_goal: calorie_goal,
                daily_protein_goal: protein_goal,
            },
            top,
        ),
    }
}

fn build_parser(config: &AppConfig) -> Arc<MealParser> {
    let backend = OpenAiService::new(
        config.api_key.clone(),
        config.model.clone(),
        config.base_url.clone(),
    );
    if !backend.has_credential() {
        log::warn!("⚠️ OPENAI_API_KEY not set, every parse request will fail with missing_credential");
    }
    log::info!("✅ Completion backend initialized with model: {}", config.model);

    Arc::new(MealParser::new(Arc::new(backend)))
}

#[cfg(feature = "server")]
async fn serve(config: AppConfig) -> Result<()> {
    log::info!("🚀 Starting Meal Parser...");

    let meal_parser = build_parser(&config);
    let app = api::server::create_router(meal_parser);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    log::info!("🌐 Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            log::info!("🛑 Shutting down...");
        })
        .await?;

    Ok(())
}

#[cfg(not(feature = "server"))]
async fn serve(_config: AppConfig) -> Result<()> {
    anyhow::bail!("built without the `server` feature; use the `parse` command instead")
}

async fn parse_once(config: AppConfig, utterance: &str, as_log_entries: bool) -> Result<()> {
    let meal_parser = build_parser(&config);
    let items = meal_parser
        .parse(utterance)
        .await
        .map_err(|e| match e.details() {
            Some(details) => anyhow::anyhow!("{} ({}): {}", e, e.reason(), details),
            None => anyhow::anyhow!("{} ({})", e, e.reason()),
        })?;

    if as_log_entries {
        let now = chrono::Utc::now();
        let entries: Vec<LogEntry> = items
            .iter()
            .map(|item| LogEntry::from_food_item(item, now))
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&items)?);
    }
    println!("\n{}", MealSummary::from_items(&items).headline());

    Ok(())
}

fn show_progress(file: &str, day: NaiveDate, goals: Goals, top: usize) -> Result<()> {
    let raw = std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file))?;
    let entries: Vec<LogEntry> =
        serde_json::from_str(&raw).with_context(|| format!("{} is not a list of food_log rows", file))?;
    log::debug!("📊 Loaded {} food_log rows from {}", entries.len(), file);

    let progress = DailyProgress::compute(&entries, &goals, day);
    println!("📅 {}", day);
    println!(
        "🔥 Calories: {:.0}/{:.0} ({:.0}%), {:.0} remaining",
        progress.total_calories, goals.daily_calories_goal, progress.calorie_progress_pct, progress.calories_remaining
    );
    println!(
        "💪 Protein: {:.0}/{:.0}g ({:.0}%), {:.0}g remaining",
        progress.total_protein, goals.daily_protein_goal, progress.protein_progress_pct, progress.protein_remaining
    );

    let frequent = top_frequent_foods(&entries, top);
    if !frequent.is_empty() {
        println!("\n⭐ Most frequent foods:");
        for food in frequent {
            println!("   {} ({}x, {:.0} kcal, {:.0}g protein total)", food.name, food.count, food.calories, food.protein);
        }
    }

    Ok(())
}
