//! ASCII rendering of packed frames
//!
//! Turns an opaque [`FrameView`] into text using the packing convention from
//! [`crate::frame`]: bit `y * row_bits + x`, most-significant bit first.

use std::io::{self, Write};

use crate::frame::{FrameGeometry, FrameView};

/// Character for a set pixel
pub const PIXEL_ON: char = '#';

/// Character for a clear pixel
pub const PIXEL_OFF: char = '.';

/// Whether the pixel at `(x, y)` is set
///
/// Pixels beyond the end of the frame data read as clear.
#[must_use]
pub fn pixel(frame: FrameView<'_>, geometry: FrameGeometry, x: usize, y: usize) -> bool {
    let bit = geometry.bit_index(x, y);
    frame
        .data()
        .get(bit / 8)
        .is_some_and(|byte| byte & (0x80 >> (bit % 8)) != 0)
}

fn row_text(frame: FrameView<'_>, geometry: FrameGeometry, y: usize) -> String {
    (0..geometry.width)
        .map(|x| {
            if pixel(frame, geometry, x, y) {
                PIXEL_ON
            } else {
                PIXEL_OFF
            }
        })
        .collect()
}

/// Write one text row per pixel row, then a blank line
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn write_ascii<W: Write>(
    frame: FrameView<'_>,
    geometry: FrameGeometry,
    out: &mut W,
) -> io::Result<()> {
    for y in 0..geometry.height {
        writeln!(out, "{}", row_text(frame, geometry, y))?;
    }
    writeln!(out)
}

/// Render a frame to a string (same layout as [`write_ascii`])
#[must_use]
pub fn render_ascii(frame: FrameView<'_>, geometry: FrameGeometry) -> String {
    let mut text = String::with_capacity((geometry.width + 1) * geometry.height + 1);
    for y in 0..geometry.height {
        text.push_str(&row_text(frame, geometry, y));
        text.push('\n');
    }
    text.push('\n');
    text
}
