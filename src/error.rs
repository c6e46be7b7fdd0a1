//! Error types for the render-matte crate.

/// Errors that can occur while extracting transparency or deriving variants.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The two inputs to difference matting have different sizes.
    #[error("dimension mismatch: white render is {white_w}x{white_h}, black render is {black_w}x{black_h}")]
    DimensionMismatch {
        /// Width of the white-composited render.
        white_w: u32,
        /// Height of the white-composited render.
        white_h: u32,
        /// Width of the black-composited render.
        black_w: u32,
        /// Height of the black-composited render.
        black_h: u32,
    },

    /// Input bytes could not be decoded as a raster image.
    #[error("failed to decode input image: {0}")]
    Decode(image::ImageError),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The output format is not supported.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// An error occurred during image processing (encode, save).
    #[error("image processing error: {0}")]
    Image(#[from] image::ImageError),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let io_err = Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(io_err.to_string().contains("gone"));

        let unsupported = Error::UnsupportedFormat("tiff".to_string());
        assert!(unsupported.to_string().contains("tiff"));

        let mismatch = Error::DimensionMismatch {
            white_w: 1920,
            white_h: 510,
            black_w: 1920,
            black_h: 512,
        };
        let msg = mismatch.to_string();
        assert!(msg.contains("1920x510"));
        assert!(msg.contains("1920x512"));
    }
}
