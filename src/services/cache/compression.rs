//! Cache Compression
//!
//! Pluggable payload compression for cached results. Entries are stored as
//! serialized JSON; when a hook is installed the bytes are compressed before
//! they are kept in memory.

use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use result_formatting_core::{CoreError, CoreResult};

/// Byte-level compression used by the result cache.
pub trait CompressionHook: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    fn compress(&self, data: &[u8]) -> CoreResult<Vec<u8>>;

    fn decompress(&self, data: &[u8]) -> CoreResult<Vec<u8>>;
}

/// Gzip compression backed by `flate2`.
#[derive(Debug, Clone, Copy)]
pub struct GzipCompression {
    level: Compression,
}

impl GzipCompression {
    /// Create a hook with an explicit level (0-9).
    pub fn with_level(level: u32) -> Self {
        Self {
            level: Compression::new(level.min(9)),
        }
    }
}

impl Default for GzipCompression {
    fn default() -> Self {
        Self {
            level: Compression::default(),
        }
    }
}

impl CompressionHook for GzipCompression {
    fn name(&self) -> &str {
        "gzip"
    }

    fn compress(&self, data: &[u8]) -> CoreResult<Vec<u8>> {
        let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2), self.level);
        encoder
            .write_all(data)
            .map_err(|e| CoreError::cache(format!("gzip compression failed: {}", e)))?;
        encoder
            .finish()
            .map_err(|e| CoreError::cache(format!("gzip compression failed: {}", e)))
    }

    fn decompress(&self, data: &[u8]) -> CoreResult<Vec<u8>> {
        let mut decoder = GzDecoder::new(data);
        let mut out = Vec::new();
        decoder
            .read_to_end(&mut out)
            .map_err(|e| CoreError::cache(format!("gzip decompression failed: {}", e)))?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gzip_shrinks_repetitive_payload() {
        let hook = GzipCompression::default();
        let data = "row,".repeat(500).into_bytes();
        let compressed = hook.compress(&data).unwrap();
        assert!(compressed.len() < data.len());
        assert_eq!(hook.decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn test_gzip_rejects_garbage() {
        let hook = GzipCompression::with_level(6);
        let err = hook.decompress(b"definitely not gzip").unwrap_err();
        assert!(matches!(err, CoreError::Cache(_)));
    }
}
