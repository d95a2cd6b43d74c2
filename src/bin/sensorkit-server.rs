//! Sensorkit HTTP server binary

use sensorkit::{
    FileGuideCache, GuideCache, GuideEngine, GuideGenerator, MemoryGuideCache, OpenAiGuideGen,
    ServerConfig,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod server {
    pub use sensorkit::server::*;
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("sensorkit=info,tower_http=info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    println!("🚀 Sensorkit Guide Server");
    println!("   Version: {}", env!("CARGO_PKG_VERSION"));
    println!();

    let config = ServerConfig::from_env()?;

    // Check for --memory-cache flag
    let use_memory_cache = std::env::args().any(|arg| arg == "--memory-cache");

    let cache: Arc<dyn GuideCache> = if use_memory_cache {
        Arc::new(MemoryGuideCache::new())
    } else {
        let file = FileGuideCache::new(&config.cache_file);
        println!("✓ Cache file: {}", file.path().display());
        Arc::new(file)
    };
    println!("✓ Cache store: {}", cache.name());

    let remote: Option<Box<dyn GuideGenerator>> = match &config.api_key {
        Some(key) => {
            println!("✓ Remote model: {} via {}", config.model, config.base_url);
            Some(Box::new(OpenAiGuideGen::new(
                key.clone(),
                config.model.clone(),
                config.base_url.clone(),
                config.request_timeout,
            )?))
        }
        None => {
            eprintln!("⚠️  OPENAI_API_KEY missing. Every guide will use the local fallback generator.");
            None
        }
    };

    let engine = GuideEngine::new(cache, remote);

    println!("✓ Guide engine initialized");
    println!("✓ Starting HTTP server on port {}...", config.port);
    println!();

    server::run_server(engine, config.port).await?;

    Ok(())
}
