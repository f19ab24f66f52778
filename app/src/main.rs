//! Command-line demo for the todo store.
//!
//! Seeds the list (from the network, or from the bundled fixture when
//! `TODO_OFFLINE` is set), runs a few commands and prints the result.

use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use todo_store::{
    Config, Filter, HttpSeedSource, SeedSource, Sort, StaticSeedSource, TodoEnvironment,
    TodoItem, TodoStore,
};
use todo_store_core::environment::{SystemClock, UuidGenerator};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const BUNDLED_SEED: &str = include_str!("../fixtures/seed.json");
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

fn print_list(heading: &str, items: &[TodoItem]) {
    println!("\n{heading}:");
    if items.is_empty() {
        println!("  (nothing)");
    }
    for todo in items {
        let status = if todo.completed { "✓" } else { " " };
        println!("  [{status}] {:>24}  {}", todo.id, todo.title);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todo_store=info,todo_store_runtime=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("invalid configuration")?;
    tracing::info!(?config, "Configuration loaded");

    if let Some(port) = config.metrics_port {
        todo_store_runtime::metrics::install_prometheus(SocketAddr::from(([0, 0, 0, 0], port)))?;
    }

    let seed: Arc<dyn SeedSource> = if config.offline {
        Arc::new(StaticSeedSource::from_json(BUNDLED_SEED).context("bundled seed is invalid")?)
    } else {
        let source = HttpSeedSource::new(config.seed_url.clone());
        tracing::info!(url = source.url(), "Seeding from network");
        Arc::new(source)
    };

    let env = TodoEnvironment::new(Arc::new(SystemClock), Arc::new(UuidGenerator), seed);
    let store = TodoStore::new(env);

    println!("=== Todo Store ===");

    store.add("Buy milk").await?;
    store.add("Write documentation").await?;

    if let Some(mut fetch) = store.fetch_seed_if_idle().await? {
        fetch.wait().await;
    }
    match store.error().await {
        Some(error) => println!("\nSeed fetch failed: {error}"),
        None => println!("\nSeed fetch: {}", store.status().await),
    }

    print_list("All todos (newest first)", &store.visible().await);

    // Complete the most recent local todo and retitle the other
    let items = store.items().await;
    if let [first, second, ..] = items.as_slice() {
        store.toggle(first.id.clone()).await?;
        store
            .edit(second.id.clone(), "Write better documentation")
            .await?;
    }

    store.set_filter(Filter::Done).await?;
    store.set_sort(Sort::Id).await?;
    print_list("Done, by id", &store.visible().await);

    store.set_filter(Filter::Active).await?;
    print_list("Active, by id", &store.visible().await);

    let counts = store.counts().await;
    println!("\nCompleted: {}/{}", counts.done, counts.total);

    store.shutdown(SHUTDOWN_TIMEOUT).await?;
    println!("\n=== Done ===");
    Ok(())
}
