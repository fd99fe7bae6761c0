//! Animation Descriptors
//!
//! The asset-authoring format: one contiguous bitmap blob plus a table of
//! per-frame durations and offsets into it. The scheduler never reads these;
//! they exist so exported animations can be validated and previewed.
//!
//! Descriptors are usually produced by the GIF conversion tool, which writes a
//! JSON export alongside its generated header:
//!
//! ```json
//! {
//!   "name": "eye",
//!   "source": "eye.gif",
//!   "width": 16, "height": 8, "bytes_per_frame": 16,
//!   "frame_count": 1, "loop_count": 0,
//!   "frames": [
//!     { "index": 0, "duration_ms": 100, "bitmap_offset": 0, "hex": ["0x0F", "..."] }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::frame::{FrameGeometry, FrameView};

/// Errors raised while loading or validating a descriptor
#[derive(Debug, Error)]
pub enum DescriptorError {
    /// Width or height is zero
    #[error("Descriptor has empty dimensions {width}x{height}")]
    EmptyDimensions {
        /// Declared width
        width: u16,
        /// Declared height
        height: u16,
    },

    /// Frame table length disagrees with `frame_count`
    #[error("Descriptor declares {declared} frames but lists {actual}")]
    FrameCountMismatch {
        /// Declared frame count
        declared: u16,
        /// Entries in the frame table
        actual: usize,
    },

    /// `bytes_per_frame` cannot hold a full frame
    #[error("bytes_per_frame {bytes_per_frame} is smaller than the {required} bytes a frame needs")]
    FrameTooSmall {
        /// Declared bytes per frame
        bytes_per_frame: u16,
        /// Minimum for the declared geometry
        required: usize,
    },

    /// A frame points past the end of the bitmap blob
    #[error("Frame {index} at offset {offset} overruns the {available}-byte bitmap blob")]
    OffsetOutOfRange {
        /// Frame position
        index: usize,
        /// Declared bitmap offset
        offset: u32,
        /// Blob length
        available: usize,
    },

    /// A frame lasts zero milliseconds
    #[error("Frame {index} has zero duration")]
    ZeroDuration {
        /// Frame position
        index: usize,
    },

    /// A hex byte in the export could not be parsed
    #[error("Frame {index} has malformed byte {value:?}")]
    InvalidHexByte {
        /// Frame position
        index: usize,
        /// Offending text
        value: String,
    },

    /// The export is not valid JSON or is missing fields
    #[error("Invalid descriptor JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Per-frame timing and location
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameTiming {
    /// How long the frame stays up
    pub duration_ms: u16,
    /// Byte offset of the frame within the bitmap blob
    pub bitmap_offset: u32,
}

/// A complete authored animation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationDescriptor {
    /// Symbol name
    pub name: String,
    /// Width in pixels
    pub width: u16,
    /// Height in pixels
    pub height: u16,
    /// Number of frames
    pub frame_count: u16,
    /// Size of one frame in the blob
    pub bytes_per_frame: u16,
    /// GIF loop count (0 = forever)
    pub loop_count: u16,
    /// Frame table
    pub frames: Vec<FrameTiming>,
    /// Packed bitmaps for every frame
    pub bitmaps: Vec<u8>,
}

impl AnimationDescriptor {
    /// Check that the frame table and blob agree with the declared layout
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found.
    pub fn validate(&self) -> Result<(), DescriptorError> {
        if self.width == 0 || self.height == 0 {
            return Err(DescriptorError::EmptyDimensions {
                width: self.width,
                height: self.height,
            });
        }

        if self.frames.len() != usize::from(self.frame_count) {
            return Err(DescriptorError::FrameCountMismatch {
                declared: self.frame_count,
                actual: self.frames.len(),
            });
        }

        let packed = FrameGeometry::new(usize::from(self.width), usize::from(self.height));
        let required = packed.min_bytes();
        if usize::from(self.bytes_per_frame) < required {
            return Err(DescriptorError::FrameTooSmall {
                bytes_per_frame: self.bytes_per_frame,
                required,
            });
        }

        for (index, timing) in self.frames.iter().enumerate() {
            if timing.duration_ms == 0 {
                return Err(DescriptorError::ZeroDuration { index });
            }
            if self.frame_range(*timing).is_none() {
                return Err(DescriptorError::OffsetOutOfRange {
                    index,
                    offset: timing.bitmap_offset,
                    available: self.bitmaps.len(),
                });
            }
        }

        Ok(())
    }

    /// Bitmap of frame `index`, `None` when out of range
    #[must_use]
    pub fn frame(&self, index: usize) -> Option<FrameView<'_>> {
        let timing = self.frames.get(index)?;
        let range = self.frame_range(*timing)?;
        Some(FrameView::new(&self.bitmaps[range]))
    }

    /// Pixel layout of every frame
    ///
    /// Frames sized for byte-aligned rows are read that way; anything smaller
    /// is read as tightly packed.
    #[must_use]
    pub fn geometry(&self) -> FrameGeometry {
        let width = usize::from(self.width);
        let height = usize::from(self.height);
        let padded = FrameGeometry::byte_aligned_rows(width, height);
        if usize::from(self.bytes_per_frame) >= padded.min_bytes() {
            padded
        } else {
            FrameGeometry::new(width, height)
        }
    }

    /// Time to play every frame once
    #[must_use]
    pub fn total_duration_ms(&self) -> u64 {
        self.frames.iter().map(|f| u64::from(f.duration_ms)).sum()
    }

    /// Parse and validate a JSON export from the GIF conversion tool
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError::Json`] for malformed JSON,
    /// [`DescriptorError::InvalidHexByte`] for unparseable bytes, or any
    /// [`validate`](Self::validate) failure.
    pub fn from_export_json(json: &str) -> Result<Self, DescriptorError> {
        let export: ExportJson = serde_json::from_str(json)?;

        let mut bitmaps = Vec::new();
        let mut frames = Vec::with_capacity(export.frames.len());
        for (index, frame) in export.frames.iter().enumerate() {
            let start = bitmaps.len();
            for value in &frame.hex {
                let Some(byte) = parse_hex_byte(value) else {
                    return Err(DescriptorError::InvalidHexByte {
                        index,
                        value: value.clone(),
                    });
                };
                bitmaps.push(byte);
            }
            // Offsets are recomputed from the concatenated blob when absent
            let bitmap_offset = frame
                .bitmap_offset
                .unwrap_or_else(|| u32::try_from(start).unwrap_or(u32::MAX));
            frames.push(FrameTiming {
                duration_ms: frame.duration_ms,
                bitmap_offset,
            });
        }

        let listed = u16::try_from(frames.len()).unwrap_or(u16::MAX);
        let descriptor = Self {
            frame_count: export.frame_count.unwrap_or(listed),
            name: export.name,
            width: export.width,
            height: export.height,
            bytes_per_frame: export.bytes_per_frame,
            loop_count: export.loop_count,
            frames,
            bitmaps,
        };

        descriptor.validate()?;
        tracing::debug!(
            name = %descriptor.name,
            source = ?export.source,
            frames = descriptor.frames.len(),
            "Loaded animation descriptor"
        );
        Ok(descriptor)
    }

    fn frame_range(&self, timing: FrameTiming) -> Option<std::ops::Range<usize>> {
        let start = usize::try_from(timing.bitmap_offset).ok()?;
        let end = start.checked_add(usize::from(self.bytes_per_frame))?;
        (end <= self.bitmaps.len()).then_some(start..end)
    }
}

#[derive(Debug, Deserialize)]
struct ExportJson {
    name: String,
    #[serde(default)]
    source: Option<String>,
    width: u16,
    height: u16,
    bytes_per_frame: u16,
    #[serde(default)]
    frame_count: Option<u16>,
    #[serde(default)]
    loop_count: u16,
    frames: Vec<ExportFrame>,
}

#[derive(Debug, Deserialize)]
struct ExportFrame {
    duration_ms: u16,
    #[serde(default)]
    bitmap_offset: Option<u32>,
    hex: Vec<String>,
}

fn parse_hex_byte(value: &str) -> Option<u8> {
    let trimmed = value.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    u8::from_str_radix(digits, 16).ok()
}
