//! Integration Tests Module
//!
//! End-to-end tests for the result formatting engine: formatter selection,
//! caching, quality validation, fallback, batch formatting and lifecycle.

// Shared test formatters
mod support;

// Formatter selection, fallback and degradation
mod pipeline_test;

// Result cache behaviour through the service and directly
mod cache_test;

// Quality validation scenarios
mod quality_test;

// Batch formatting, preview, analytics and lifecycle
mod service_test;
