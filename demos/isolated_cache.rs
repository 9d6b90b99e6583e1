//! Per-client response stores and explicit credentials
//!
//! Reads `COMMANDK_HOST` and `COMMANDK_API_TOKEN` through an explicit
//! provider instead of the full default chain, and gives each client its own
//! store.

use anyhow::Result;
use commandk_sdk::{
    ClientBuilder, EnvironmentVariablesProvider, GetRenderedSecretsOpts, IsolatedStoreFactory,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let catalog_app_id = std::env::var("COMMANDK_CATALOG_APP_ID")?;
    let environment_id = std::env::var("COMMANDK_ENVIRONMENT_ID")?;

    let build = || {
        ClientBuilder::new()
            .credentials_provider(EnvironmentVariablesProvider::new())
            .store_factory(IsolatedStoreFactory)
            .timeout_ms(10_000)
            .user_agent_extra("isolated-cache-demo")
            .build()
    };
    let first = build()?;
    let second = build()?;

    // Only these secrets are rendered, but the response still occupies the
    // single cache slot for this app and environment.
    let opts = GetRenderedSecretsOpts::default().secret_names(["DATABASE_URL"]);
    let filtered = first
        .get_rendered_app_secrets(&catalog_app_id, &environment_id, opts)
        .await?;
    println!("first client: {} secrets", filtered.len());

    // The second client has its own empty store, so this is a full fetch.
    let all = second
        .get_rendered_app_secrets(&catalog_app_id, &environment_id, GetRenderedSecretsOpts::default())
        .await?;
    println!("second client: {} secrets", all.len());

    println!(
        "misses: first={} second={}",
        first.cache_stats().misses(),
        second.cache_stats().misses()
    );

    Ok(())
}
