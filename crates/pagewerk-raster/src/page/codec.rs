// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Decode/encode helpers between byte buffers and `DynamicImage`.

use std::borrow::Cow;

use image::{ColorType, DynamicImage, ImageFormat};
use pagewerk_core::OutputFormat;
use pagewerk_core::error::{PagewerkError, Result};

/// JPEG quality used when a page is written as JPEG.
pub const JPEG_QUALITY: u8 = 90;

/// The `image` crate format for an output format.
pub fn image_format(format: OutputFormat) -> ImageFormat {
    match format {
        OutputFormat::Pnm => ImageFormat::Pnm,
        OutputFormat::Png => ImageFormat::Png,
        OutputFormat::Bmp => ImageFormat::Bmp,
        OutputFormat::Tiff => ImageFormat::Tiff,
        OutputFormat::Jpeg => ImageFormat::Jpeg,
    }
}

/// Decode an encoded buffer, sniffing the format from its contents.
pub fn decode(data: &[u8]) -> Result<DynamicImage> {
    if data.is_empty() {
        return Err(PagewerkError::InvalidFormat("empty buffer".into()));
    }
    image::load_from_memory(data)
        .map_err(|err| PagewerkError::InvalidFormat(format!("failed to decode image: {}", err)))
}

/// The raster in a pixel layout `format` can store, converting only when the
/// encoder lacks the current one. Channels and bit depth are kept wherever the
/// format allows.
pub fn encodable(image: &DynamicImage, format: OutputFormat) -> Cow<'_, DynamicImage> {
    let color = image.color();
    let converted: Option<DynamicImage> = match format {
        // 8-bit gray and RGB only.
        OutputFormat::Jpeg => match color {
            ColorType::L8 | ColorType::Rgb8 => None,
            ColorType::L16 | ColorType::La8 | ColorType::La16 => Some(image.to_luma8().into()),
            _ => Some(image.to_rgb8().into()),
        },
        // 8-bit only; gray alpha is supported.
        OutputFormat::Bmp => match color {
            ColorType::L8 | ColorType::La8 | ColorType::Rgb8 | ColorType::Rgba8 => None,
            ColorType::L16 => Some(image.to_luma8().into()),
            ColorType::La16 => Some(image.to_luma_alpha8().into()),
            _ if color.has_alpha() => Some(image.to_rgba8().into()),
            _ => Some(image.to_rgb8().into()),
        },
        // No gray-alpha layouts.
        OutputFormat::Tiff => match color {
            ColorType::La8 => Some(image.to_rgba8().into()),
            ColorType::La16 => Some(image.to_rgba16().into()),
            _ => None,
        },
        // Integer samples up to 16 bits.
        OutputFormat::Pnm | OutputFormat::Png => match color {
            ColorType::Rgb32F => Some(image.to_rgb16().into()),
            ColorType::Rgba32F => Some(image.to_rgba16().into()),
            _ => None,
        },
    };
    match converted {
        Some(image) => Cow::Owned(image),
        None => Cow::Borrowed(image),
    }
}

/// Encode a `DynamicImage` into the specified format, returning exactly the
/// encoded bytes.
pub fn encode(image: &DynamicImage, format: OutputFormat) -> Result<Vec<u8>> {
    let image = encodable(image, format);
    let mut buffer = Vec::new();
    match format {
        OutputFormat::Jpeg => {
            let encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY);
            image.write_with_encoder(encoder).map_err(|err| {
                PagewerkError::Encode(format!("JPEG encoding failed: {}", err))
            })?;
        }
        other => {
            let mut cursor = std::io::Cursor::new(&mut buffer);
            image
                .write_to(&mut cursor, image_format(other))
                .map_err(|err| {
                    PagewerkError::Encode(format!(
                        "{} encoding failed: {}",
                        other.extension(),
                        err
                    ))
                })?;
        }
    }
    Ok(buffer)
}
