//! Product catalog commands.

use clap::{Args, Subcommand};

use crate::config::Config;
use crate::repo::ProductRepository;

use super::{runtime, CommandError, SyncContext};

/// Browse the product catalog
#[derive(Debug, Args)]
pub struct ProductCommand {
    #[command(subcommand)]
    command: ProductSubcommand,
}

#[derive(Debug, Subcommand)]
enum ProductSubcommand {
    /// List known products with their nutrition
    List,
}

impl ProductCommand {
    pub fn run(&self, config: &Config) -> Result<(), CommandError> {
        runtime()?.block_on(async {
            let ctx = SyncContext::from_config(config).await?;
            ctx.probe().await;
            let repo =
                ProductRepository::new(ctx.store.clone(), ctx.api.clone(), ctx.queue.clone());

            match &self.command {
                ProductSubcommand::List => {
                    let mut products = repo.refresh().await?;
                    products.sort_by(|a, b| a.name.cmp(&b.name));
                    if products.is_empty() {
                        println!("No products yet.");
                    }
                    for p in products {
                        println!(
                            "{:<30} {:>6.0} kcal  {:>5.1}p {:>5.1}c {:>5.1}f  per {} {}",
                            p.name, p.calories, p.protein, p.carbs, p.fat, p.per_amount, p.per_unit
                        );
                    }
                }
            }
            Ok(())
        })
    }
}
