//! Cache infrastructure - Engine implementations

mod counters;
mod exact;
mod factory;
mod lru;
mod similarity;

pub use exact::ExactEngine;
pub use factory::EngineFactory;
pub use lru::LruStore;
pub use similarity::SimilarityEngine;
