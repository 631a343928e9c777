//! Decoded bitmaps.

use image::{DynamicImage, ImageReader};
use std::path::Path;

/// In-memory decoded image. Width and height always come from the pixel buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    image: DynamicImage,
}

impl Bitmap {
    /// Decode the file at `path`, guessing the format from its content rather
    /// than its extension (raw cache files keep whatever name the URL had).
    pub fn load(path: &Path) -> image::ImageResult<Self> {
        let image = ImageReader::open(path)?.with_guessed_format()?.decode()?;
        Ok(Bitmap { image })
    }

    pub fn from_memory(data: &[u8]) -> image::ImageResult<Self> {
        Ok(Bitmap {
            image: image::load_from_memory(data)?,
        })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    /// Encode to `path`; the format follows the path's extension.
    pub fn save(&self, path: &Path) -> image::ImageResult<()> {
        self.image.save(path)
    }
}

impl From<DynamicImage> for Bitmap {
    fn from(image: DynamicImage) -> Self {
        Bitmap { image }
    }
}
