//! Sync status display.

use clap::Args;

use crate::config::Config;

use super::{runtime, CommandError, SyncContext};

/// Show sync configuration and queue status
#[derive(Debug, Args)]
pub struct StatusCommand {}

impl StatusCommand {
    pub fn run(&self, config: &Config) -> Result<(), CommandError> {
        runtime()?.block_on(self.status(config))
    }

    async fn status(&self, config: &Config) -> Result<(), CommandError> {
        println!("Sync Status");
        println!("===========");
        println!();

        if !config.sync.is_configured() {
            println!("Status: Not configured");
            println!();
            println!("To enable sync, run 'com register --server <url>' and add the");
            println!("printed settings to your config file, or set:");
            println!("  COM_SERVER_URL");
            println!("  COM_DEVICE_TOKEN");
            return Ok(());
        }

        let ctx = SyncContext::from_config(config).await?;
        ctx.probe().await;
        let status = ctx.reporter.refresh().await;

        println!("Server:    {}", status.server_url);
        if let Some(device_id) = status.device_id {
            println!("Device:    {}", device_id);
        }
        println!(
            "Online:    {}",
            if status.online { "✓ yes" } else { "✗ no" }
        );
        println!("Pending:   {}", status.pending);
        match status.last_sync_at {
            Some(at) => println!("Last sync: {}", at.to_rfc3339()),
            None => println!("Last sync: never"),
        }
        if let Some(error) = status.last_sync_error {
            println!("Last error: {}", error);
        }
        println!(
            "Auto-sync: {}",
            if config.sync.auto_sync {
                "enabled"
            } else {
                "disabled"
            }
        );

        Ok(())
    }
}
