//! Conversion of platform frames into the delivered image representation.
//!
//! RGB frames are compressed to JPEG at the request's quality; frames the
//! platform already compressed pass through after a header check.

use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use sha2::{Digest, Sha256};

use crate::models::error::CameraError;
use crate::models::photo::{PixelFormat, RawFrame};

const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];

/// JPEG bytes plus the facts needed for photo metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPhoto {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub checksum: String,
}

/// Encode `frame` as JPEG. `quality` is on the 1..=100 scale.
pub fn encode_photo(frame: &RawFrame, quality: u8) -> Result<EncodedPhoto, CameraError> {
    if frame.width == 0 || frame.height == 0 {
        return Err(CameraError::EncodingFailed(format!(
            "invalid frame dimensions {}x{}",
            frame.width, frame.height
        )));
    }

    let data = match frame.format {
        PixelFormat::Rgb8 => encode_rgb8(frame, quality)?,
        PixelFormat::Jpeg => {
            if !frame.data.starts_with(&JPEG_SOI) {
                return Err(CameraError::EncodingFailed(
                    "frame is not a JPEG stream".into(),
                ));
            }
            frame.data.clone()
        }
    };

    let checksum = sha256_hex(&data);
    Ok(EncodedPhoto {
        data,
        width: frame.width,
        height: frame.height,
        checksum,
    })
}

fn encode_rgb8(frame: &RawFrame, quality: u8) -> Result<Vec<u8>, CameraError> {
    let expected = frame.width as usize * frame.height as usize * 3;
    if frame.data.len() != expected {
        return Err(CameraError::EncodingFailed(format!(
            "expected {} RGB bytes for {}x{}, got {}",
            expected,
            frame.width,
            frame.height,
            frame.data.len()
        )));
    }

    let mut data = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut data, quality.clamp(1, 100));
    encoder
        .encode(&frame.data, frame.width, frame.height, ExtendedColorType::Rgb8)
        .map_err(|e| CameraError::EncodingFailed(format!("JPEG encoding failed: {}", e)))?;
    Ok(data)
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    hex_encode(&digest)
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
