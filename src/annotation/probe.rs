use std::path::Path;

use super::{IngestErr, Result};

/// Reads an image's pixel dimensions.
pub trait ImageProbe {
    /// Returns `(height, width)` of the image at `path`.
    fn dimensions(&self, path: &Path) -> Result<(u32, u32)>;
}

/// Probes dimensions from the image header through the `image` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct DecodedImageProbe;

impl ImageProbe for DecodedImageProbe {
    fn dimensions(&self, path: &Path) -> Result<(u32, u32)> {
        let (width, height) =
            image::image_dimensions(path).map_err(|source| IngestErr::ImageUnreadable {
                path: path.to_path_buf(),
                source,
            })?;

        Ok((height, width))
    }
}
