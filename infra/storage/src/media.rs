//! Decoders for the two media queries of the adapter contract.
//!
//! Both work on raw bytes so every adapter kind shares them; adapters are responsible
//! for turning a missing object into [`StorageError::FileNotFound`] before calling in.

use crate::error::StorageError;
use crate::types::{ExifData, ImageSize};
use std::io::{self, Cursor};
use std::path::Path;

/// Reads pixel dimensions from an image header (PNG, JPEG, GIF, BMP, WebP, TIFF, ...).
///
/// # Errors
/// Returns [`StorageError::UnsupportedMedia`] if the bytes are not a recognized image.
pub fn image_size(bytes: &[u8]) -> Result<ImageSize, StorageError> {
    let size = imagesize::blob_size(bytes).map_err(|e| StorageError::UnsupportedMedia {
        message: e.to_string().into(),
        context: Some("Failed to read image dimensions".into()),
    })?;

    let width = dimension(size.width)?;
    let height = dimension(size.height)?;
    Ok(ImageSize { width, height })
}

/// Reads pixel dimensions from the header of the file at `path` without loading the rest.
pub(crate) fn image_size_at(path: &Path) -> Result<ImageSize, StorageError> {
    let size = imagesize::size(path).map_err(|e| match e {
        imagesize::ImageError::IoError(err) => match err.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => {
                StorageError::not_found(path)
            },
            io::ErrorKind::UnexpectedEof | io::ErrorKind::InvalidData => {
                StorageError::UnsupportedMedia {
                    message: err.to_string().into(),
                    context: Some("Failed to read image dimensions".into()),
                }
            },
            _ => StorageError::Io {
                source: err,
                context: Some(format!("Read failed: {}", path.display()).into()),
            },
        },
        other => StorageError::UnsupportedMedia {
            message: other.to_string().into(),
            context: Some("Failed to read image dimensions".into()),
        },
    })?;

    let width = dimension(size.width)?;
    let height = dimension(size.height)?;
    Ok(ImageSize { width, height })
}

/// Extracts EXIF fields, keyed by tag name; values from the primary image win over thumbnails.
///
/// # Errors
/// Returns [`StorageError::UnsupportedMedia`] if the container is unsupported or carries no EXIF.
pub fn exif_data(bytes: &[u8]) -> Result<ExifData, StorageError> {
    let exif = exif::Reader::new().read_from_container(&mut Cursor::new(bytes)).map_err(|e| {
        StorageError::UnsupportedMedia {
            message: e.to_string().into(),
            context: Some("Failed to read EXIF metadata".into()),
        }
    })?;

    let mut data = ExifData::new();
    for field in exif.fields() {
        let key = field.tag.to_string();
        let value = field.display_value().to_string();
        if field.ifd_num == exif::In::PRIMARY {
            data.insert(key, value);
        } else {
            data.entry(key).or_insert(value);
        }
    }

    Ok(data)
}

fn dimension(value: usize) -> Result<u32, StorageError> {
    u32::try_from(value).map_err(|_| StorageError::UnsupportedMedia {
        message: format!("dimension {value} out of range").into(),
        context: None,
    })
}


#[cfg(test)]
mod tests {
    use super::fixtures::{png_header, tiff_with_make};
    use super::*;

    #[test]
    fn png_dimensions() {
        let size = image_size(&png_header(640, 480)).unwrap();
        assert_eq!(size, ImageSize { width: 640, height: 480 });
    }

    #[test]
    fn text_is_not_an_image() {
        let err = image_size(b"Some test content").unwrap_err();
        assert!(matches!(err, StorageError::UnsupportedMedia { .. }));
    }

    #[test]
    fn tiff_exif_fields_are_keyed_by_tag_name() {
        let data = exif_data(&tiff_with_make(b"Abc")).unwrap();
        let make = data.get("Make").expect("Make tag");
        assert!(make.contains("Abc"));
    }

    #[test]
    fn png_without_exif_is_unsupported() {
        let err = exif_data(&png_header(1, 1)).unwrap_err();
        assert!(matches!(err, StorageError::UnsupportedMedia { .. }));
    }
}
