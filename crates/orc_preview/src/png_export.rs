//! PNG export: a thin service wrapping the `image` crate (spec §4.5
//! "PNG export is a thin service"). No dedicated export stage exists
//! in the core; this is invoked directly by demo/GUI callers.

use image::{ImageBuffer, Rgb};
use orc_core::preview::PreviewImage;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum PngExportError {
    #[error("image buffer dimensions ({width}x{height}) do not match rgb_data length {actual}")]
    BufferSizeMismatch { width: u32, height: u32, actual: usize },
    #[error("failed to write PNG to {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: image::ImageError,
    },
}

/// Serializes a rendered [`PreviewImage`] to a PNG file at `path`.
pub fn export_png(image: &PreviewImage, path: impl AsRef<Path>) -> Result<(), PngExportError> {
    let expected = image.width as usize * image.height as usize * 3;
    if image.rgb_data.len() != expected {
        return Err(PngExportError::BufferSizeMismatch {
            width: image.width,
            height: image.height,
            actual: image.rgb_data.len(),
        });
    }

    let buffer: ImageBuffer<Rgb<u8>, _> =
        ImageBuffer::from_raw(image.width, image.height, image.rgb_data.clone())
            .expect("size already validated above");

    let path = path.as_ref();
    buffer.save(path).map_err(|source| PngExportError::Io {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_a_buffer_with_the_wrong_length() {
        let image = PreviewImage {
            width: 4,
            height: 4,
            rgb_data: vec![0u8; 10],
            dropout_regions: Vec::new(),
        };
        let result = export_png(&image, "/tmp/does-not-matter.png");
        assert!(matches!(result, Err(PngExportError::BufferSizeMismatch { .. })));
    }

    #[test]
    fn writes_a_well_formed_image_to_a_temp_file() {
        let image = PreviewImage::blank(2, 2);
        let dir = std::env::temp_dir().join(format!("orc-preview-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("blank.png");
        export_png(&image, &path).unwrap();
        assert!(path.exists());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
