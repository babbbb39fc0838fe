// zipdiff-parsers/src/zip/compression.rs
//! Compression handling for ZIP members
//!
//! Supports the methods found in everyday archives:
//! - Store (no compression)
//! - Deflate (standard ZIP)
//! - BZIP2 (method 12)
//! - LZMA (method 14)
//! - ZStd (Zstandard, method 93)
//!
//! An LZMA member starts with a 4 byte header (encoder version, then the
//! size of the properties block) followed by the usual 5 byte LZMA
//! properties. The uncompressed size is never stored in the stream.

use std::io::Read;

use crate::traits::{ParseError, ParseResult};
use super::CompressionMethod;

/// Version bytes plus the little-endian properties length
const LZMA_HEADER_LEN: usize = 4;

/// Properties byte plus dictionary size
const LZMA_PROPS_LEN: u16 = 5;

/// Handles compression and decompression for ZIP members
pub struct ZipCompression;

impl ZipCompression {
    /// Decompress data using the specified compression method
    ///
    /// `expected_size` is the uncompressed size recorded in the central
    /// directory; output is never allowed to grow past `limit`.
    pub fn decompress(
        data: &[u8],
        method: CompressionMethod,
        expected_size: usize,
        limit: usize,
    ) -> ParseResult<Vec<u8>> {
        match method {
            CompressionMethod::Store => {
                // No compression, return as-is
                Ok(data.to_vec())
            }

            CompressionMethod::Deflate => {
                let decoder = flate2::read::DeflateDecoder::new(data);
                Self::read_bounded(decoder, "DEFLATE", expected_size, limit)
            }

            CompressionMethod::Bzip2 => {
                let decoder = bzip2::read::BzDecoder::new(data);
                Self::read_bounded(decoder, "BZIP2", expected_size, limit)
            }

            CompressionMethod::Lzma => {
                Self::decompress_lzma(data, expected_size)
            }

            CompressionMethod::Zstd => {
                let decoder = zstd::stream::read::Decoder::new(data)
                    .map_err(|e| ParseError::DecompressionFailed(
                        format!("ZSTD decoder setup failed: {}", e)
                    ))?;
                Self::read_bounded(decoder, "ZSTD", expected_size, limit)
            }

            CompressionMethod::Unknown(method) => {
                Err(ParseError::UnsupportedCompression(method))
            }
        }
    }

    /// Decompress a ZIP LZMA payload
    ///
    /// Callers enforce the memory limit on `expected_size` before getting
    /// here, and decoding stops once that many bytes are produced.
    fn decompress_lzma(data: &[u8], expected_size: usize) -> ParseResult<Vec<u8>> {
        use lzma_rs::decompress::{Options, UnpackedSize};

        if data.len() < LZMA_HEADER_LEN {
            return Err(ParseError::DecompressionFailed(
                format!("LZMA header truncated ({} bytes)", data.len())
            ));
        }

        let props_len = u16::from_le_bytes([data[2], data[3]]);
        if props_len != LZMA_PROPS_LEN {
            return Err(ParseError::DecompressionFailed(
                format!("LZMA properties length {} (expected {})", props_len, LZMA_PROPS_LEN)
            ));
        }

        let options = Options {
            unpacked_size: UnpackedSize::UseProvided(Some(expected_size as u64)),
            ..Options::default()
        };

        let mut input = &data[LZMA_HEADER_LEN..];
        let mut output = Vec::with_capacity(expected_size);
        lzma_rs::lzma_decompress_with_options(&mut input, &mut output, &options)
            .map_err(|e| ParseError::DecompressionFailed(
                format!("LZMA decompression failed: {}", e)
            ))?;

        if output.len() != expected_size {
            return Err(ParseError::DecompressionFailed(
                format!(
                    "LZMA size mismatch: expected {}, got {}",
                    expected_size, output.len()
                )
            ));
        }

        Ok(output)
    }

    /// Drain a decoder, checking the result against the recorded size
    fn read_bounded<R: Read>(
        decoder: R,
        label: &str,
        expected_size: usize,
        limit: usize,
    ) -> ParseResult<Vec<u8>> {
        let mut output = Vec::with_capacity(expected_size.min(limit));

        // One byte past the limit so overruns are detectable
        decoder
            .take(limit as u64 + 1)
            .read_to_end(&mut output)
            .map_err(|e| ParseError::DecompressionFailed(
                format!("{} decompression failed: {}", label, e)
            ))?;

        if output.len() != expected_size {
            return Err(ParseError::DecompressionFailed(
                format!(
                    "{} size mismatch: expected {}, got {}",
                    label, expected_size, output.len()
                )
            ));
        }

        Ok(output)
    }

    /// Compress data using the specified method
    #[cfg(any(test, feature = "fixtures"))]
    pub fn compress(data: &[u8], method: CompressionMethod) -> ParseResult<Vec<u8>> {
        match method {
            CompressionMethod::Store => Ok(data.to_vec()),

            CompressionMethod::Deflate => {
                let encoder = flate2::write::DeflateEncoder::new(
                    Vec::new(),
                    flate2::Compression::default()
                );
                Self::encode_with(encoder, data, "DEFLATE", |e| e.finish())
            }

            CompressionMethod::Bzip2 => {
                let encoder = bzip2::write::BzEncoder::new(
                    Vec::new(),
                    bzip2::Compression::default()
                );
                Self::encode_with(encoder, data, "BZIP2", |e| e.finish())
            }

            CompressionMethod::Lzma => {
                Self::compress_lzma(data)
            }

            CompressionMethod::Zstd => {
                zstd::stream::encode_all(data, 3)
                    .map_err(|e| ParseError::DecompressionFailed(
                        format!("ZSTD compression failed: {}", e)
                    ))
            }

            CompressionMethod::Unknown(method) => {
                Err(ParseError::UnsupportedCompression(method))
            }
        }
    }

    /// Feed `data` through a streaming encoder and finish it
    #[cfg(any(test, feature = "fixtures"))]
    fn encode_with<W: std::io::Write>(
        mut encoder: W,
        data: &[u8],
        label: &str,
        finish: impl FnOnce(W) -> std::io::Result<Vec<u8>>,
    ) -> ParseResult<Vec<u8>> {
        encoder.write_all(data)
            .map_err(|e| ParseError::DecompressionFailed(
                format!("{} compression failed: {}", label, e)
            ))?;

        finish(encoder)
            .map_err(|e| ParseError::DecompressionFailed(
                format!("{} compression finalization failed: {}", label, e)
            ))
    }

    /// Compress into a ZIP LZMA payload: version 9.4 header, then the
    /// properties and the raw stream without a size field
    #[cfg(any(test, feature = "fixtures"))]
    fn compress_lzma(data: &[u8]) -> ParseResult<Vec<u8>> {
        use lzma_rs::compress::{Options, UnpackedSize};

        let options = Options {
            unpacked_size: UnpackedSize::SkipWritingToHeader,
        };

        let mut output = vec![9, 4];
        output.extend_from_slice(&LZMA_PROPS_LEN.to_le_bytes());

        let mut input = data;
        lzma_rs::lzma_compress_with_options(&mut input, &mut output, &options)
            .map_err(|e| ParseError::DecompressionFailed(
                format!("LZMA compression failed: {}", e)
            ))?;

        Ok(output)
    }

    /// Calculate CRC32 checksum
    pub fn crc32(data: &[u8]) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(data);
        hasher.finalize()
    }

    /// Verify data integrity using CRC32
    pub fn verify_crc32(data: &[u8], expected: u32) -> bool {
        Self::crc32(data) == expected
    }
}
