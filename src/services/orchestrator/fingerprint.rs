//! Request Fingerprints
//!
//! Cache keys for formatting requests. Two requests share a key iff they
//! have the same tool id, tool response, display mode, audience and locale.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use result_formatting_core::{FormatContext, ToolExecutionResult};
use sha2::{Digest, Sha256};

/// Prefix shared by every formatting cache key.
pub const KEY_PREFIX: &str = "format";

/// SHA-256 of the tool response.
///
/// `serde_json::Value` serializes object keys in sorted order, so equal
/// outputs hash equally regardless of the order fields were inserted.
pub fn output_digest(result: &ToolExecutionResult) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update([u8::from(result.success)]);
    hasher.update(serde_json::to_vec(&result.output).unwrap_or_default());
    if let Some(error) = &result.error {
        hasher.update([0u8]);
        hasher.update(error.as_bytes());
    }
    hasher.finalize().into()
}

/// Cache key `format:<tool_id>:<digest>`.
///
/// The digest covers the output digest and the presentation fields of the
/// context; each field is NUL-terminated so adjacent values cannot run
/// together.
pub fn cache_key(result: &ToolExecutionResult, ctx: &FormatContext) -> String {
    let display_mode = ctx.display_mode.to_string();
    let audience = ctx.audience.to_string();

    let mut hasher = Sha256::new();
    for part in [
        ctx.tool_id.as_bytes(),
        display_mode.as_bytes(),
        audience.as_bytes(),
        ctx.locale.as_bytes(),
    ] {
        hasher.update(part);
        hasher.update([0u8]);
    }
    hasher.update(output_digest(result));
    let digest: [u8; 32] = hasher.finalize().into();

    format!("{}:{}:{}", KEY_PREFIX, ctx.tool_id, URL_SAFE_NO_PAD.encode(digest))
}
