//! Image carriers.
//!
//! Lossless still images only: PNG, BMP, TGA and TIFF. The image is decoded
//! to RGBA8 and only the red channel of each pixel is addressable, so at most
//! one bit per pixel changes while the other channels pass through untouched.
//! The permutation seed is `width + height`, readable from the container by
//! both sides without extra storage.

use image::{DynamicImage, ImageFormat, ImageReader, RgbaImage};
use std::io::Cursor;
use std::path::Path;

use super::{Carrier, CarrierError};

/// Container formats that keep pixel data byte-exact across a save/load cycle.
const SUPPORTED_FORMATS: [ImageFormat; 4] = [
    ImageFormat::Png,
    ImageFormat::Bmp,
    ImageFormat::Tga,
    ImageFormat::Tiff,
];

/// An image carrier: RGBA8 pixels plus the container format to re-encode into.
pub struct ImageCarrier {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
    format: ImageFormat,
}

impl ImageCarrier {
    /// Loads a carrier image from a file, detecting the container format from
    /// its content and falling back to the file extension (TGA has no magic).
    pub fn from_file(path: &Path) -> Result<Self, CarrierError> {
        let reader = ImageReader::open(path)?.with_guessed_format()?;
        let format = reader
            .format()
            .or_else(|| ImageFormat::from_path(path).ok())
            .ok_or_else(|| CarrierError::UnsupportedFormat(path.display().to_string()))?;

        let image = reader
            .decode()
            .map_err(|e| CarrierError::LoadFailed(e.to_string()))?;

        Self::from_image(image, format)
    }

    /// Loads a carrier image from encoded bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CarrierError> {
        let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
        let format = reader
            .format()
            .ok_or_else(|| CarrierError::UnsupportedFormat("unrecognized image data".into()))?;

        let image = reader
            .decode()
            .map_err(|e| CarrierError::LoadFailed(e.to_string()))?;

        Self::from_image(image, format)
    }

    /// Builds a carrier from an already decoded image.
    pub fn from_image(image: DynamicImage, format: ImageFormat) -> Result<Self, CarrierError> {
        if !SUPPORTED_FORMATS.contains(&format) {
            return Err(CarrierError::UnsupportedFormat(format!("{format:?}")));
        }

        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();

        Ok(Self {
            width,
            height,
            rgba: rgba.into_raw(),
            format,
        })
    }

    /// Image dimensions in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Container format the carrier re-encodes into.
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Raw RGBA8 samples, row-major.
    pub fn raw_samples(&self) -> &[u8] {
        &self.rgba
    }

    /// Saves the carrier in its container format.
    pub fn save(&self, path: &Path) -> Result<(), CarrierError> {
        self.to_image()
            .save_with_format(path, self.format)
            .map_err(|e| CarrierError::SaveFailed(e.to_string()))
    }

    /// Re-encodes the carrier into its container format in memory.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CarrierError> {
        let mut bytes = Vec::new();
        self.to_image()
            .write_to(&mut Cursor::new(&mut bytes), self.format)
            .map_err(|e| CarrierError::SaveFailed(e.to_string()))?;
        Ok(bytes)
    }

    fn to_image(&self) -> DynamicImage {
        let buffer = RgbaImage::from_raw(self.width, self.height, self.rgba.clone())
            .expect("pixel buffer matches dimensions");
        DynamicImage::ImageRgba8(buffer)
    }
}

impl Carrier for ImageCarrier {
    fn capacity(&self) -> usize {
        self.width as usize * self.height as usize
    }

    fn seed(&self) -> u64 {
        u64::from(self.width) + u64::from(self.height)
    }

    fn lsb(&self, idx: usize) -> u8 {
        self.rgba[idx * 4] & 1
    }

    fn mask_bit(&self, idx: usize) -> u8 {
        (self.rgba[idx * 4] >> 1) & 1
    }

    fn flip_lsb(&mut self, idx: usize) {
        self.rgba[idx * 4] ^= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stego;
    use image::{ImageBuffer, Rgb};

    fn test_image(width: u32, height: u32) -> DynamicImage {
        let buffer = ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([
                ((x * 17) % 256) as u8,
                ((y * 23) % 256) as u8,
                (((x + y) * 31) % 256) as u8,
            ])
        });
        DynamicImage::ImageRgb8(buffer)
    }

    #[test]
    fn capacity_and_seed() {
        let carrier = ImageCarrier::from_image(test_image(100, 60), ImageFormat::Png).unwrap();

        assert_eq!(carrier.capacity(), 6000);
        assert_eq!(carrier.seed(), 160);
    }

    #[test]
    fn only_the_red_channel_changes() {
        let mut carrier = ImageCarrier::from_image(test_image(100, 100), ImageFormat::Png).unwrap();
        let before = carrier.rgba.clone();

        stego::embed(&mut carrier, b"channel isolation payload").unwrap();

        for (i, (old, new)) in before.iter().zip(&carrier.rgba).enumerate() {
            if i % 4 == 0 {
                assert_eq!(old & 0xFE, new & 0xFE, "red channel bit 1..7 at {i}");
            } else {
                assert_eq!(old, new, "non-red sample at {i}");
            }
        }
    }

    #[test]
    fn png_reencode_preserves_cells() {
        let mut carrier = ImageCarrier::from_image(test_image(80, 80), ImageFormat::Png).unwrap();
        stego::embed(&mut carrier, b"png cycle").unwrap();

        let bytes = carrier.to_bytes().unwrap();
        let reloaded = ImageCarrier::from_bytes(&bytes).unwrap();

        assert_eq!(reloaded.raw_samples(), carrier.raw_samples());
        assert_eq!(reloaded.format(), ImageFormat::Png);
    }

    #[test]
    fn bmp_reencode_preserves_cells() {
        let mut carrier = ImageCarrier::from_image(test_image(64, 48), ImageFormat::Bmp).unwrap();
        stego::embed(&mut carrier, b"bmp cycle").unwrap();

        let bytes = carrier.to_bytes().unwrap();
        let reloaded = ImageCarrier::from_bytes(&bytes).unwrap();

        assert_eq!(reloaded.raw_samples(), carrier.raw_samples());
    }

    #[test]
    fn lossy_format_is_rejected() {
        let result = ImageCarrier::from_image(test_image(10, 10), ImageFormat::Jpeg);
        assert!(matches!(result, Err(CarrierError::UnsupportedFormat(_))));
    }

    #[test]
    fn save_and_reload_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("carrier.png");

        let mut carrier = ImageCarrier::from_image(test_image(50, 40), ImageFormat::Png).unwrap();
        stego::embed(&mut carrier, b"file cycle").unwrap();
        carrier.save(&path).unwrap();

        let reloaded = ImageCarrier::from_file(&path).unwrap();
        assert_eq!(reloaded.raw_samples(), carrier.raw_samples());
        assert_eq!(reloaded.dimensions(), (50, 40));
    }
}
