//! Infrastructure layer - Engines, embedders and runtime plumbing

pub mod cache;
pub mod embedding;
pub mod logging;
pub mod observability;
pub mod services;
