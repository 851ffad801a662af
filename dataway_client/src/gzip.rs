//! Request body compression.
use flate2::{Compression, write::GzEncoder};
use std::io::{self, Write};

/// Compresses `body` into a single gzip member with the default level.
pub fn compress(body: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(body.len() / 2), Compression::default());
    encoder.write_all(body)?;
    encoder.finish()
}
