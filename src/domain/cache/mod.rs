//! Cache domain - engine contract, entries and configuration

mod config;
mod engine;
mod entry;

pub use config::{EngineConfig, EngineType, MatchPolicy};
pub use engine::{CacheStats, CacheValue, Engine};
pub use entry::CacheEntry;

#[cfg(test)]
pub use engine::mock::MapEngine;
