//! Pool Lifecycle Demo
//!
//! Pools a few fake connections, lets the janitor reclaim the idle ones and
//! shuts the pool down, alongside a small LRU of rendered pages.
//!
//! Run with `RUST_LOG=pool_cache=debug cargo run --example pool_lifecycle`.

use std::time::Duration;

use pool_cache::{CacheValue, Finalizer, LruCache, PoolCache, PoolConfig};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug)]
struct Connection {
    id: u32,
}

#[derive(Debug, Clone)]
struct Page(String);

impl CacheValue for Page {
    fn size(&self) -> u64 {
        self.0.len() as u64
    }
}

fn close(conn: Connection) {
    info!("Closing connection {}", conn.id);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to debug for this crate, can be overridden with RUST_LOG
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pool_cache=debug,pool_lifecycle=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = PoolConfig::new(Duration::from_millis(300), Duration::from_millis(100));
    let pool = PoolCache::with_config(config)?;
    info!(
        "Pool started: expiration={}ms, cleanup_interval={}ms",
        config.default_expiration.as_millis(),
        config.cleanup_interval.as_millis()
    );

    for id in 1..=3 {
        pool.store("primary", Connection { id }, Some(Finalizer::new(close)))?;
    }
    pool.store("replica", Connection { id: 10 }, Some(Finalizer::new(close)))?;

    if let Some(conn) = pool.fetch(&"primary") {
        info!("Reusing connection {}", conn.id);
        // Handed back, it gets a fresh expiration
        pool.store("primary", conn, Some(Finalizer::new(close)))?;
    }

    tokio::time::sleep(Duration::from_millis(500)).await;
    info!("Pooled after idle period: {}", pool.len());

    pool.store("replica", Connection { id: 11 }, Some(Finalizer::new(close)))?;
    pool.shutdown().await?;

    let pages = LruCache::new(32);
    pages.set("/".to_string(), Page("<h1>home</h1>".to_string()), 0);
    pages.set("/about".to_string(), Page("<h1>about</h1>".to_string()), 0);
    pages.get(&"/".to_string());
    pages.set("/blog".to_string(), Page("<h1>blog</h1>".to_string()), 0);
    info!("Page cache keys: {:?}", pages.keys());
    info!("Page cache stats: {}", pages.stats_json());

    Ok(())
}
