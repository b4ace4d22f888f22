//! Image header inspection

use std::io::Cursor;

use bucket_fs::ImageHandle;
use image::{ImageFormat, ImageReader};

use crate::error::{Error, Result};

/// Dimensions and detected format of a stored image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
}

/// Image metadata read through a handle.
pub trait ImageExt {
    /// Decode the image header. The format is sniffed from the bytes, not
    /// taken from the extension.
    fn info(&self) -> Result<ImageInfo>;
}

impl ImageExt for ImageHandle {
    fn info(&self) -> Result<ImageInfo> {
        let bytes = self.read()?;
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(::image::ImageError::IoError)?;
        let format = reader.format().ok_or_else(|| Error::UnknownImageFormat {
            path: self.full_path(),
        })?;
        let (width, height) = reader.into_dimensions()?;
        Ok(ImageInfo {
            width,
            height,
            format,
        })
    }
}
