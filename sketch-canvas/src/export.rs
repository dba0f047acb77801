// SPDX-License-Identifier: MIT
// PNG encode/decode and `data:` URL wrapping for captures.
// PNG keeps line edges bit-exact, which matters more to the recognizer than size.

use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use base64::{Engine as _, engine::general_purpose};
use image::{ImageFormat, RgbaImage};

/// Prefix of every payload produced by [`raster_to_data_url`].
pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Encodes an RGBA raster as PNG bytes.
pub fn encode_png(raster: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    raster
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .context("encoding raster as PNG")?;
    Ok(bytes)
}

/// Wraps already-encoded PNG bytes in a `data:` URL.
pub fn png_to_data_url(png: &[u8]) -> String {
    format!("{}{}", PNG_DATA_URL_PREFIX, general_purpose::STANDARD.encode(png))
}

/// Encodes a raster straight to a PNG `data:` URL.
pub fn raster_to_data_url(raster: &RgbaImage) -> Result<String> {
    Ok(png_to_data_url(&encode_png(raster)?))
}

/// Reads a PNG file from disk and wraps it as a `data:` URL.
///
/// The file is decoded once to make sure it really is a PNG before it is sent anywhere.
pub fn png_file_to_data_url(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    image::load_from_memory_with_format(&bytes, ImageFormat::Png)
        .with_context(|| format!("{} is not a valid PNG", path.display()))?;
    Ok(png_to_data_url(&bytes))
}

/// Decodes a PNG `data:` URL back into an RGBA raster.
pub fn decode_data_url(data_url: &str) -> Result<RgbaImage> {
    let encoded = data_url
        .strip_prefix(PNG_DATA_URL_PREFIX)
        .ok_or_else(|| anyhow!("payload is not a PNG data URL"))?;
    let bytes = general_purpose::STANDARD
        .decode(encoded)
        .context("decoding base64 payload")?;
    let image = image::load_from_memory_with_format(&bytes, ImageFormat::Png)
        .context("decoding PNG payload")?;
    Ok(image.to_rgba8())
}
