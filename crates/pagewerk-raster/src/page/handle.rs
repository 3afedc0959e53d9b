// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page image handle — exclusive owner of a decoded raster with an
// exactly-once release.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use image::DynamicImage;
use pagewerk_core::OutputFormat;
use pagewerk_core::error::{PagewerkError, Result};
use tracing::{debug, info, instrument};

use super::codec;

/// A decoded page raster shared between threads.
///
/// The raster lives behind a per-handle lock; `None` means the handle has been
/// released. Every operation takes the lock, so operations on one handle are
/// totally ordered, and [`destroy`](Self::destroy) releases the raster exactly
/// once no matter how many threads call it.
///
/// ```ignore
/// let page = PageImage::load("scan-0001.pnm")?;
/// let png = page.encode(OutputFormat::Png)?;
/// page.destroy();
/// ```
#[derive(Debug)]
pub struct PageImage {
    raster: Mutex<Option<DynamicImage>>,
}

impl PageImage {
    // -- Construction ---------------------------------------------------------

    /// Load a page from a file path. The format is sniffed from the contents.
    ///
    /// Fails with `NotFound` when the file is missing or is not a decodable
    /// image.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|err| {
            PagewerkError::NotFound(format!("unable to read {}: {}", path.display(), err))
        })?;
        let image = codec::decode(&data).map_err(|err| {
            PagewerkError::NotFound(format!("{} is not a page image: {}", path.display(), err))
        })?;
        info!(
            width = image.width(),
            height = image.height(),
            "Page image loaded"
        );
        Ok(Self::from_dynamic(image))
    }

    /// Decode a page from encoded bytes (PNM, PNG, BMP, TIFF, JPEG, ...).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn load_from_bytes(data: &[u8]) -> Result<Self> {
        let image = codec::decode(data)?;
        debug!(
            width = image.width(),
            height = image.height(),
            "Page image decoded from bytes"
        );
        Ok(Self::from_dynamic(image))
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self {
            raster: Mutex::new(Some(image)),
        }
    }

    // -- Lifecycle ------------------------------------------------------------

    fn lock(&self) -> MutexGuard<'_, Option<DynamicImage>> {
        self.raster.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Release the raster.
    ///
    /// Idempotent: returns `true` for the one call that performed the release
    /// and `false` for every call after it.
    pub fn destroy(&self) -> bool {
        let released = self.lock().take();
        match released {
            Some(image) => {
                debug!(
                    width = image.width(),
                    height = image.height(),
                    "Page image released"
                );
                drop(image);
                true
            }
            None => false,
        }
    }

    /// Whether the raster has been released.
    pub fn is_closed(&self) -> bool {
        self.lock().is_none()
    }

    // -- Accessors ------------------------------------------------------------

    /// Run `f` against the live raster while holding the handle's lock.
    pub fn with_raster<T>(&self, f: impl FnOnce(&DynamicImage) -> T) -> Result<T> {
        let guard = self.lock();
        let image = guard.as_ref().ok_or(PagewerkError::Released)?;
        Ok(f(image))
    }

    /// Width and height in pixels.
    pub fn dimensions(&self) -> Result<(u32, u32)> {
        self.with_raster(|image| (image.width(), image.height()))
    }

    /// Clone of the current raster.
    pub fn snapshot(&self) -> Result<DynamicImage> {
        self.with_raster(DynamicImage::clone)
    }

    /// Derive a new page from this one, releasing this handle only on success.
    ///
    /// `transform` runs under the lock and returns the replacement raster, or
    /// `None` to move the current raster into the new handle unchanged. On
    /// error this handle is left exactly as it was and still owned by the
    /// caller; anything `transform` allocated has already been dropped.
    pub(crate) fn consume_with<T>(
        &self,
        transform: impl FnOnce(&DynamicImage) -> Result<(Option<DynamicImage>, T)>,
    ) -> Result<(PageImage, T)> {
        let mut guard = self.lock();
        let current = guard.as_ref().ok_or(PagewerkError::Released)?;
        let (replacement, extra) = transform(current)?;

        let original = guard.take().ok_or(PagewerkError::Released)?;
        let result = match replacement {
            Some(image) => {
                drop(original);
                image
            }
            None => original,
        };
        debug!("Page image consumed into a new handle");
        Ok((PageImage::from_dynamic(result), extra))
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the page, returning exactly the encoded bytes.
    pub fn encode(&self, format: OutputFormat) -> Result<Vec<u8>> {
        let guard = self.lock();
        let image = guard.as_ref().ok_or(PagewerkError::Released)?;
        codec::encode(image, format)
    }

    /// Write the page to a file. The format comes from the extension, falling
    /// back to PNM for unknown extensions.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let format = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(OutputFormat::from_extension)
            .unwrap_or_default();
        let bytes = self.encode(format)?;
        std::fs::write(path, &bytes)?;
        info!(bytes = bytes.len(), format = format.extension(), "Page image written");
        Ok(())
    }
}
