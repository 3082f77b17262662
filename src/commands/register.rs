//! Device registration.

use clap::Args;
use uuid::Uuid;

use crate::config::Config;
use crate::device::DeviceIdentity;
use crate::remote::HttpApi;
use crate::store::FileStore;

use super::{runtime, CommandError};

/// Register this device with a CountOnMe server
#[derive(Debug, Args)]
pub struct RegisterCommand {
    /// Server URL (defaults to the configured server_url)
    #[arg(long)]
    server: Option<String>,
}

impl RegisterCommand {
    pub fn run(&self, config: &Config) -> Result<(), CommandError> {
        runtime()?.block_on(self.register(config))
    }

    async fn register(&self, config: &Config) -> Result<(), CommandError> {
        let server_url = self
            .server
            .clone()
            .or_else(|| config.sync.server_url.clone())
            .ok_or(CommandError::NoServer)?;

        let kv = FileStore::new(config.data_dir.value.clone());

        // Re-registering keeps the same device id so the server updates the
        // existing record instead of minting a second device.
        let device_id = DeviceIdentity::load(&kv)
            .await
            .map(|i| i.device_id)
            .unwrap_or_else(Uuid::new_v4);

        let (device_id, device_token) = HttpApi::register_device(&server_url, device_id).await?;
        DeviceIdentity::new(device_id, device_token.clone())
            .save(&kv)
            .await?;

        println!("Device registered");
        println!();
        println!("  Server: {}", server_url);
        println!("  Device: {}", device_id);
        println!();
        println!("To sync from other shells, add to your config file:");
        println!();
        println!("  sync:");
        println!("    server_url: \"{}\"", server_url);
        println!("    device_token: \"{}\"", device_token);

        Ok(())
    }
}
