//! Basic usage of the CommandK SDK
//!
//! Credentials come from `COMMANDK_HOST` / `COMMANDK_API_TOKEN`, or from the
//! TOML file named by `COMMANDK_CONFIG_FILE`.
//!
//! ```text
//! COMMANDK_HOST=https://api.commandk.dev COMMANDK_API_TOKEN=... \
//!     cargo run --example basic_usage -- <catalog-app-id> <environment-id>
//! ```

use anyhow::{Context, Result};
use commandk_sdk::{Client, ExposeSecret, GetRenderedSecretsOpts};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let catalog_app_id = args.next().context("missing catalog app id")?;
    let environment_id = args.next().context("missing environment id")?;

    let client = Client::with_defaults()?;

    println!("=== First fetch ===");
    let secrets = client
        .get_rendered_app_secrets(&catalog_app_id, &environment_id, GetRenderedSecretsOpts::default())
        .await?;
    for secret in &secrets {
        println!(
            "{} ({:?}): {} chars",
            secret.key,
            secret.value_type,
            secret.serialized_value.expose_secret().len()
        );
    }

    println!("\n=== Second fetch (revalidated) ===");
    let again = client
        .get_rendered_app_secrets(&catalog_app_id, &environment_id, GetRenderedSecretsOpts::default())
        .await?;
    println!("{} secrets", again.len());

    let stats = client.cache_stats();
    println!(
        "\nCache: {} hits, {} misses, {} insertions ({:.1}% hit rate)",
        stats.hits(),
        stats.misses(),
        stats.insertions(),
        stats.hit_rate()
    );

    Ok(())
}
