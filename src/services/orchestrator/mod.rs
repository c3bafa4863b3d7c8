//! Orchestration Module
//!
//! The request pipeline tying registry, cache, quality validation and
//! analytics together, plus the cache fingerprint scheme it uses.

pub mod fingerprint;
mod service;

pub use service::{
    FormatOptions, FormatRequest, OrchestrationService, DEGRADED_QUALITY, ENGINE_VERSION,
};
