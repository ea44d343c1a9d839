//! Compression engine for stored payloads.

use respcache_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// Largest uncompressed size an lz4 payload may declare.
pub const MAX_DECOMPRESSED_SIZE: usize = 64 * 1024 * 1024;

const DEFAULT_ZSTD_LEVEL: i32 = 3;

#[derive(Debug, thiserror::Error)]
pub enum CompressionError {
    #[error("{provider} compression failed: {message}")]
    Compress {
        provider: CompressionProvider,
        message: String,
    },
    #[error("{provider} decompression failed: {message}")]
    Decompress {
        provider: CompressionProvider,
        message: String,
    },
}

/// Compression algorithm.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CompressionProvider {
    #[default]
    Zstd,
    Gzip,
    Lz4,
    None,
}

impl CompressionProvider {
    /// Stable provider identifier.
    pub fn id(&self) -> &'static str {
        match self {
            CompressionProvider::Zstd => "zstd",
            CompressionProvider::Gzip => "gzip",
            CompressionProvider::Lz4 => "lz4",
            CompressionProvider::None => "none",
        }
    }
}

impl std::fmt::Display for CompressionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Tuning parameters for an engine.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompressionParams {
    /// Compression level; provider default when unset.
    #[serde(default)]
    pub level: Option<i32>,
}

impl CompressionParams {
    pub fn with_level(level: i32) -> Self {
        Self { level: Some(level) }
    }
}

/// A validated, stateless codec.
#[derive(Debug, Clone, Copy)]
pub struct CompressionEngine {
    provider: CompressionProvider,
    level: i32,
}

impl CompressionEngine {
    /// Build an engine, rejecting parameters the provider cannot honor.
    pub fn new(provider: CompressionProvider, params: CompressionParams) -> Result<Self> {
        let level = match (provider, params.level) {
            (CompressionProvider::Zstd, None) => DEFAULT_ZSTD_LEVEL,
            (CompressionProvider::Zstd, Some(level)) if (1..=22).contains(&level) => level,
            (CompressionProvider::Gzip, None) => flate2::Compression::default().level() as i32,
            (CompressionProvider::Gzip, Some(level)) if (0..=9).contains(&level) => level,
            (CompressionProvider::Lz4 | CompressionProvider::None, None) => 0,
            (provider, Some(level)) => {
                return Err(Error::Configuration(format!(
                    "compression level {} is not supported by {}",
                    level, provider
                )));
            }
        };

        Ok(Self { provider, level })
    }

    pub fn provider(&self) -> CompressionProvider {
        self.provider
    }

    pub fn compress(&self, data: &[u8]) -> std::result::Result<Vec<u8>, CompressionError> {
        match self.provider {
            CompressionProvider::None => Ok(data.to_vec()),
            CompressionProvider::Zstd => self.compress_zstd(data),
            CompressionProvider::Gzip => self.compress_gzip(data),
            CompressionProvider::Lz4 => Ok(lz4_flex::compress_prepend_size(data)),
        }
    }

    pub fn decompress(&self, data: &[u8]) -> std::result::Result<Vec<u8>, CompressionError> {
        match self.provider {
            CompressionProvider::None => Ok(data.to_vec()),
            CompressionProvider::Zstd => self.decompress_zstd(data),
            CompressionProvider::Gzip => self.decompress_gzip(data),
            CompressionProvider::Lz4 => self.decompress_lz4(data),
        }
    }

    fn compress_error(&self, e: impl std::fmt::Display) -> CompressionError {
        CompressionError::Compress {
            provider: self.provider,
            message: e.to_string(),
        }
    }

    fn decompress_error(&self, e: impl std::fmt::Display) -> CompressionError {
        CompressionError::Decompress {
            provider: self.provider,
            message: e.to_string(),
        }
    }

    fn compress_zstd(&self, data: &[u8]) -> std::result::Result<Vec<u8>, CompressionError> {
        let mut encoder =
            zstd::Encoder::new(Vec::new(), self.level).map_err(|e| self.compress_error(e))?;
        encoder
            .write_all(data)
            .map_err(|e| self.compress_error(e))?;
        encoder.finish().map_err(|e| self.compress_error(e))
    }

    fn decompress_zstd(&self, data: &[u8]) -> std::result::Result<Vec<u8>, CompressionError> {
        let decoder = zstd::Decoder::new(data).map_err(|e| self.decompress_error(e))?;
        self.read_bounded(decoder)
    }

    fn compress_gzip(&self, data: &[u8]) -> std::result::Result<Vec<u8>, CompressionError> {
        let mut encoder = flate2::write::GzEncoder::new(
            Vec::new(),
            flate2::Compression::new(self.level as u32),
        );
        encoder
            .write_all(data)
            .map_err(|e| self.compress_error(e))?;
        encoder.finish().map_err(|e| self.compress_error(e))
    }

    fn decompress_gzip(&self, data: &[u8]) -> std::result::Result<Vec<u8>, CompressionError> {
        self.read_bounded(flate2::read::GzDecoder::new(data))
    }

    fn decompress_lz4(&self, data: &[u8]) -> std::result::Result<Vec<u8>, CompressionError> {
        // The first four bytes are the little-endian uncompressed size.
        let header: [u8; 4] = data
            .get(..4)
            .and_then(|h| h.try_into().ok())
            .ok_or_else(|| self.decompress_error("missing size prefix"))?;
        let declared = u32::from_le_bytes(header) as usize;
        if declared > MAX_DECOMPRESSED_SIZE {
            return Err(self.decompress_error(format!(
                "declared size {} exceeds limit",
                declared
            )));
        }

        lz4_flex::decompress_size_prepended(data).map_err(|e| self.decompress_error(e))
    }

    fn read_bounded(&self, reader: impl Read) -> std::result::Result<Vec<u8>, CompressionError> {
        let mut output = Vec::new();
        reader
            .take(MAX_DECOMPRESSED_SIZE as u64 + 1)
            .read_to_end(&mut output)
            .map_err(|e| self.decompress_error(e))?;
        if output.len() > MAX_DECOMPRESSED_SIZE {
            return Err(self.decompress_error("output exceeds limit"));
        }
        Ok(output)
    }
}

impl Default for CompressionEngine {
    fn default() -> Self {
        Self {
            provider: CompressionProvider::Zstd,
            level: DEFAULT_ZSTD_LEVEL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATA: &[u8] = b"Hello, World! This is a test of compression.";

    fn engine(provider: CompressionProvider) -> CompressionEngine {
        CompressionEngine::new(provider, CompressionParams::default()).unwrap()
    }

    #[test]
    fn test_zstd_roundtrip() {
        let engine = engine(CompressionProvider::Zstd);
        let compressed = engine.compress(DATA).unwrap();
        assert_eq!(engine.decompress(&compressed).unwrap(), DATA);
    }

    #[test]
    fn test_gzip_roundtrip() {
        let engine = engine(CompressionProvider::Gzip);
        let compressed = engine.compress(DATA).unwrap();
        assert_eq!(engine.decompress(&compressed).unwrap(), DATA);
    }

    #[test]
    fn test_lz4_roundtrip() {
        let engine = engine(CompressionProvider::Lz4);
        let compressed = engine.compress(DATA).unwrap();
        assert_eq!(engine.decompress(&compressed).unwrap(), DATA);
    }

    #[test]
    fn test_plain_json_fails_to_decompress() {
        let legacy = br#"{"status":200,"headers":{},"body":""}"#;
        for provider in [
            CompressionProvider::Zstd,
            CompressionProvider::Gzip,
            CompressionProvider::Lz4,
        ] {
            let err = engine(provider).decompress(legacy).unwrap_err();
            assert!(matches!(err, CompressionError::Decompress { .. }), "{}", provider);
        }
    }

    #[test]
    fn test_lz4_rejects_oversized_prefix() {
        let mut data = (u32::MAX).to_le_bytes().to_vec();
        data.extend_from_slice(b"junk");
        assert!(engine(CompressionProvider::Lz4).decompress(&data).is_err());
        assert!(engine(CompressionProvider::Lz4).decompress(b"ab").is_err());
    }

    #[test]
    fn test_invalid_levels_are_configuration_errors() {
        let cases = [
            (CompressionProvider::Zstd, 0),
            (CompressionProvider::Zstd, 23),
            (CompressionProvider::Gzip, 10),
            (CompressionProvider::Lz4, 1),
            (CompressionProvider::None, 1),
        ];
        for (provider, level) in cases {
            let result = CompressionEngine::new(provider, CompressionParams::with_level(level));
            assert!(matches!(result, Err(Error::Configuration(_))));
        }
    }

    #[test]
    fn test_custom_level_roundtrip() {
        let engine =
            CompressionEngine::new(CompressionProvider::Zstd, CompressionParams::with_level(19))
                .unwrap();
        let compressed = engine.compress(DATA).unwrap();
        assert_eq!(engine.decompress(&compressed).unwrap(), DATA);
    }

    #[test]
    fn test_provider_ids() {
        assert_eq!(CompressionProvider::default().id(), "zstd");
        let parsed: CompressionProvider = serde_json::from_str("\"lz4\"").unwrap();
        assert_eq!(parsed, CompressionProvider::Lz4);
    }
}
