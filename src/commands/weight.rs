//! Body-weight quick entry.

use chrono::{Local, NaiveDate};
use clap::{Args, Subcommand};

use crate::config::Config;
use crate::repo::WeightRepository;

use super::{runtime, try_auto_flush, CommandError, SyncContext};

/// Track body weight
#[derive(Debug, Args)]
pub struct WeightCommand {
    #[command(subcommand)]
    command: WeightSubcommand,
}

#[derive(Debug, Subcommand)]
enum WeightSubcommand {
    /// Record a weight (one entry per day; same-day entries are updated)
    Add {
        /// Weight in kilograms
        weight_kg: f64,
        /// Day to record, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
    /// List recorded weights
    List {
        /// Earliest day to show, YYYY-MM-DD
        #[arg(long)]
        from: Option<String>,
    },
}

impl WeightCommand {
    pub fn run(&self, config: &Config) -> Result<(), CommandError> {
        runtime()?.block_on(async {
            let ctx = SyncContext::from_config(config).await?;
            ctx.probe().await;
            let repo = WeightRepository::new(ctx.store.clone(), ctx.api.clone(), ctx.queue.clone());
            repo.refresh().await?;

            match &self.command {
                WeightSubcommand::Add { weight_kg, date } => {
                    let day = parse_day(date.as_deref())?;
                    let entry = repo.create(day, *weight_kg).await?;
                    println!("Recorded {:.1} kg on {}", entry.weight_kg, entry.day);
                    try_auto_flush(config, &ctx).await;
                }
                WeightSubcommand::List { from } => {
                    let from = from.as_deref().map(|d| parse_day(Some(d))).transpose()?;
                    let mut entries = repo.list().await;
                    entries.retain(|e| from.map_or(true, |d| e.day >= d));
                    entries.sort_by_key(|e| e.day);
                    if entries.is_empty() {
                        println!("No weights recorded.");
                    }
                    for entry in entries {
                        println!("{}  {:.1} kg", entry.day, entry.weight_kg);
                    }
                }
            }
            Ok(())
        })
    }
}

fn parse_day(date: Option<&str>) -> Result<NaiveDate, CommandError> {
    match date {
        None => Ok(Local::now().date_naive()),
        Some(raw) => raw
            .parse()
            .map_err(|_| CommandError::InvalidInput(format!("Invalid date '{}', expected YYYY-MM-DD", raw))),
    }
}
