use crate::Result;
use serde::{Deserialize, Serialize};

/// An icon the embed may register with the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IconResource {
    pub id: String,
    pub source_url: String,
    pub pixel_ratio: f32,
}

impl IconResource {
    pub fn new(id: String, source_url: String, pixel_ratio: f32) -> Self {
        Self {
            id,
            source_url,
            pixel_ratio,
        }
    }
}

/// Decoded RGBA8 bitmap ready for the engine's icon registry
#[derive(Debug, Clone, PartialEq)]
pub struct IconImage {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f32,
    pub rgba: Vec<u8>,
}

impl IconImage {
    /// Decodes PNG, JPEG or WebP bytes
    pub fn decode(bytes: &[u8], pixel_ratio: f32) -> Result<Self> {
        let bitmap = image::load_from_memory(bytes)?.to_rgba8();
        Ok(Self {
            width: bitmap.width(),
            height: bitmap.height(),
            pixel_ratio,
            rgba: bitmap.into_raw(),
        })
    }

    /// A single transparent pixel, rendered while real icons load
    pub fn placeholder() -> Self {
        Self {
            width: 1,
            height: 1,
            pixel_ratio: 1.0,
            rgba: vec![0; 4],
        }
    }
}
