//! Sensorkit - Arduino project guide service
//!
//! Turns a pick of kit sensors and output devices into a beginner project guide:
//! - Static component catalog and selection classifier
//! - Remote LLM generation with classified failure handling
//! - Deterministic local sketch + guide generator as fallback
//! - Order-independent, versioned persistent cache

pub mod types;
pub mod catalog;
pub mod selection;
pub mod cache_key;
pub mod cache_store;
pub mod sketch;
pub mod fallback;
pub mod prompt;
pub mod generators;
pub mod http_generator; // OpenAI chat completions client
pub mod error;
pub mod guide_engine;
pub mod config;
pub mod server;

pub use types::*;
pub use cache_key::CacheKey;
pub use cache_store::{CacheEntry, FileGuideCache, GuideCache, MemoryGuideCache};
pub use config::ServerConfig;
pub use error::{GuideError, RemoteFailure};
pub use fallback::build_fallback_guide;
pub use generators::{GuideGenerator, MockGuideGen, RemoteError};
pub use guide_engine::GuideEngine;
pub use http_generator::OpenAiGuideGen;
pub use selection::classify;
