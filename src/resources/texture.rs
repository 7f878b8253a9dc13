//! CPU-side texture decoding.
//!
//! Images are decoded to tightly packed RGBA8 here and handed to
//! [`crate::context::GlContext`] for upload.

use std::{path::Path, sync::Arc};

use anyhow::*;
use image::{GenericImageView, ImageFormat, load_from_memory_with_format};

/// Decoded RGBA8 pixels, row-major, top row first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TextureData {
    /// Decode raw image file data.
    ///
    /// `format` is an optional file extension hint (e.g. "png"). If None, the
    /// format is guessed from the data.
    pub fn from_bytes(bytes: &[u8], format: Option<&str>) -> Result<Self> {
        let img = match format.and_then(ImageFormat::from_extension) {
            None => image::load_from_memory(bytes)?,
            Some(fmt) => load_from_memory_with_format(bytes, fmt)?,
        };
        Ok(Self::from_image(&img))
    }

    pub fn from_image(img: &image::DynamicImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.to_rgba8().into_raw(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Couldn't read texture {}", path.display()))?;
        let format = path.extension().and_then(|ext| ext.to_str());
        Self::from_bytes(&bytes, format)
            .with_context(|| format!("Couldn't decode texture {}", path.display()))
    }
}

/// Where the grid's texture comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextureSource {
    /// A file on disk.
    Path(std::path::PathBuf),
    /// Image data the host passed in with the loaded content.
    Memory(Arc<[u8]>),
}

impl TextureSource {
    pub fn load(&self) -> Result<TextureData> {
        match self {
            TextureSource::Path(path) => TextureData::load(path),
            TextureSource::Memory(bytes) => TextureData::from_bytes(bytes, None)
                .context("Couldn't decode texture passed in by the host"),
        }
    }
}

impl std::fmt::Display for TextureSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TextureSource::Path(path) => write!(f, "{}", path.display()),
            TextureSource::Memory(bytes) => write!(f, "<{} bytes of content>", bytes.len()),
        }
    }
}
