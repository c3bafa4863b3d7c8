//! Data Models
//!
//! Engine-level models: configuration and health reporting. Result and
//! context models live in `result_formatting_core`.

pub mod config;
pub mod health;

pub use config::*;
pub use health::*;
