//! Downsizes and recompresses photos before they are stored with an item.
//!
//! A photo of any format the decoder recognises is scaled so that its
//! longest edge is at most [ImageIngestor::max_edge] pixels and re-encoded as a
//! low quality JPEG. The EXIF orientation, when present, is applied first so
//! photos taken in portrait stay upright. The result is stored inline as a data URL, so the size of
//! the encoded image bounds the size of the stored item.

use std::io::Cursor;

use base64::{Engine, engine::general_purpose::STANDARD};
use image::{
    DynamicImage, ExtendedColorType, ImageDecoder, ImageEncoder, ImageReader,
    codecs::jpeg::JpegEncoder, imageops::FilterType, metadata::Orientation,
};

use crate::Error;

/// The default longest edge, in pixels, of an ingested image.
pub const DEFAULT_MAX_EDGE: u32 = 600;

/// The default JPEG quality on a scale of 1 to 100.
pub const DEFAULT_QUALITY: u8 = 50;

const JPEG_DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";

/// Settings for turning a user supplied photo into a stored image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageIngestor {
    /// The longest edge of the output image in pixels.
    pub max_edge: u32,
    /// The JPEG encoder quality, from 1 (smallest) to 100 (best).
    pub quality: u8,
}

impl Default for ImageIngestor {
    fn default() -> Self {
        Self {
            max_edge: DEFAULT_MAX_EDGE,
            quality: DEFAULT_QUALITY,
        }
    }
}

impl ImageIngestor {
    /// Create an ingestor that limits images to `max_edge` pixels with the
    /// default quality.
    pub fn with_max_edge(max_edge: u32) -> Self {
        Self {
            max_edge: max_edge.max(1),
            ..Default::default()
        }
    }

    /// Decode `bytes`, scale the image to fit within [ImageIngestor::max_edge]
    /// and encode it as a JPEG.
    ///
    /// Images that already fit keep their size. The same input and settings
    /// always produce the same output.
    ///
    /// # Errors
    ///
    /// Returns an [Error::ImageProcessing] if `bytes` is empty, cannot be
    /// decoded, or the JPEG encoder fails.
    pub fn ingest(&self, bytes: &[u8]) -> Result<EncodedImage, Error> {
        if bytes.is_empty() {
            return Err(Error::ImageProcessing("the image is empty".to_owned()));
        }

        let decoded = decode_upright(bytes)?;

        let (width, height) =
            target_dimensions(decoded.width(), decoded.height(), self.max_edge);

        let resized = if (width, height) == (decoded.width(), decoded.height()) {
            decoded
        } else {
            decoded.resize_exact(width, height, FilterType::Triangle)
        };
        let rgb = resized.to_rgb8();

        let mut encoded = Vec::new();
        JpegEncoder::new_with_quality(&mut encoded, self.quality.clamp(1, 100))
            .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
            .map_err(|error| Error::ImageProcessing(format!("could not encode image: {error}")))?;

        tracing::debug!(
            "Ingested {} byte image as {width}x{height} JPEG of {} bytes",
            bytes.len(),
            encoded.len()
        );

        Ok(EncodedImage {
            bytes: encoded,
            width,
            height,
        })
    }

    /// Ingest an image given as a `data:<mime>;base64,<payload>` URL.
    ///
    /// # Errors
    ///
    /// Returns an [Error::ImageProcessing] if the URL is malformed or the
    /// payload cannot be ingested.
    pub fn ingest_data_url(&self, data_url: &str) -> Result<EncodedImage, Error> {
        let bytes = decode_data_url(data_url)?;
        self.ingest(&bytes)
    }
}

/// Decode `bytes` and rotate or flip the image as its EXIF orientation says.
fn decode_upright(bytes: &[u8]) -> Result<DynamicImage, Error> {
    let decode_error =
        |error: image::ImageError| Error::ImageProcessing(format!("could not decode image: {error}"));

    let mut decoder = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|error| Error::ImageProcessing(format!("could not read image: {error}")))?
        .into_decoder()
        .map_err(decode_error)?;

    let orientation = decoder.orientation().unwrap_or_else(|error| {
        tracing::debug!("Ignoring unreadable image orientation: {error}");
        Orientation::NoTransforms
    });

    let mut image = DynamicImage::from_decoder(decoder).map_err(decode_error)?;
    image.apply_orientation(orientation);

    Ok(image)
}

/// A JPEG image produced by [ImageIngestor].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    bytes: Vec<u8>,
    width: u32,
    height: u32,
}

impl EncodedImage {
    /// The encoded JPEG bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The width of the image in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// The height of the image in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The image as a `data:image/jpeg;base64,...` URL, the form in which
    /// images are stored on an item.
    pub fn to_data_url(&self) -> String {
        format!("{JPEG_DATA_URL_PREFIX}{}", STANDARD.encode(&self.bytes))
    }
}

/// Compute the size of an image scaled to fit within `max_edge`.
///
/// The longest edge becomes exactly `max_edge` and the other edge keeps the
/// aspect ratio, rounded to the nearest pixel and never less than one.
/// Dimensions that already fit are returned unchanged.
pub fn target_dimensions(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    let longest = width.max(height);

    if longest <= max_edge || longest == 0 {
        return (width, height);
    }

    let scale = |edge: u32| -> u32 {
        let scaled = (edge as f64 * max_edge as f64 / longest as f64).round() as u32;
        scaled.max(1)
    };

    if width >= height {
        (max_edge, scale(height))
    } else {
        (scale(width), max_edge)
    }
}

/// Extract the bytes from a base64 encoded data URL.
///
/// # Errors
///
/// Returns an [Error::ImageProcessing] if `data_url` is not a base64 data URL
/// or the payload is not valid base64.
pub fn decode_data_url(data_url: &str) -> Result<Vec<u8>, Error> {
    let (header, payload) = data_url
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(','))
        .ok_or_else(|| Error::ImageProcessing("not a data URL".to_owned()))?;

    if !header.ends_with(";base64") {
        return Err(Error::ImageProcessing(
            "data URL is not base64 encoded".to_owned(),
        ));
    }

    STANDARD
        .decode(payload.trim())
        .map_err(|error| Error::ImageProcessing(format!("invalid base64 payload: {error}")))
}
