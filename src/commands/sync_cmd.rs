//! Manual outbox flush.

use clap::Args;

use crate::config::Config;

use super::{runtime, CommandError, SyncContext};

/// Flush queued changes to the server
#[derive(Debug, Args)]
pub struct SyncCommand {}

impl SyncCommand {
    pub fn run(&self, config: &Config) -> Result<(), CommandError> {
        runtime()?.block_on(self.sync(config))
    }

    async fn sync(&self, config: &Config) -> Result<(), CommandError> {
        let ctx = SyncContext::from_config(config).await?;

        println!("Syncing with {}...", ctx.server_url);
        println!();

        if !ctx.probe().await {
            println!("✗ Server unreachable; changes stay queued.");
            return Ok(());
        }

        let Some(report) = ctx.reporter.flush_now().await? else {
            println!("A sync is already in progress.");
            return Ok(());
        };

        if report.attempted == 0 && report.skipped == 0 {
            println!("✓ Nothing to sync.");
            return Ok(());
        }

        println!("  ✓ delivered {}", report.succeeded);
        if report.skipped > 0 {
            println!("  - skipped {} (backing off)", report.skipped);
        }
        if report.remaining > 0 {
            println!("  ✗ {} still queued", report.remaining);
            let status = ctx.reporter.current().await;
            if let Some(error) = status.last_sync_error {
                println!();
                println!("Last error: {}", error);
            }
        } else {
            println!();
            println!("Sync complete.");
        }

        Ok(())
    }
}
