//! Services
//!
//! - `registry` - formatter and processor catalogue with ranking
//! - `cache` - LRU/TTL result cache with tags and compression
//! - `analytics` - fire-and-forget event sinks
//! - `orchestrator` - the formatting pipeline

pub mod analytics;
pub mod cache;
pub mod orchestrator;
pub mod registry;
