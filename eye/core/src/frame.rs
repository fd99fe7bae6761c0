//! Frame Handles and Built-in Bitmaps
//!
//! A frame is an opaque run of packed 1-bit pixels. The scheduler never looks
//! inside one; it only hands out [`FrameView`]s that a rendering surface turns
//! into pixels (see [`crate::render`]).
//!
//! Bitmaps are packed most-significant-bit first, row-major, with no row
//! padding: pixel `(x, y)` lives in bit `y * width + x`. Imported assets may
//! pad rows to a byte boundary instead (see [`FrameGeometry::row_bits`]).

/// Borrowed handle to a packed frame bitmap
///
/// Equality compares the pixel bytes. Use [`FrameView::same_bitmap`] when you
/// need handle identity (same address and length).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameView<'a> {
    data: &'a [u8],
}

impl<'a> FrameView<'a> {
    /// Wrap a packed bitmap
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Raw packed bytes
    #[must_use]
    pub const fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Length in bytes
    #[must_use]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the frame carries no pixel data
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether both handles point at the same bitmap
    #[must_use]
    pub fn same_bitmap(&self, other: &FrameView<'_>) -> bool {
        std::ptr::eq(self.data.as_ptr(), other.data.as_ptr()) && self.data.len() == other.data.len()
    }
}

/// Pixel dimensions of a frame
///
/// `row_bits` is the distance in bits between the starts of two rows. It
/// equals `width` for tightly packed bitmaps and is rounded up to a whole byte
/// for row-padded ones such as those written by the GIF export tool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameGeometry {
    /// Width in pixels
    pub width: usize,
    /// Height in pixels
    pub height: usize,
    /// Row stride in bits (at least `width`)
    pub row_bits: usize,
}

impl FrameGeometry {
    /// Tightly packed geometry
    #[must_use]
    pub const fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            row_bits: width,
        }
    }

    /// Geometry whose rows each start on a byte boundary
    #[must_use]
    pub const fn byte_aligned_rows(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            row_bits: width.div_ceil(8) * 8,
        }
    }

    /// Number of visible pixels
    #[must_use]
    pub const fn bit_count(&self) -> usize {
        self.width * self.height
    }

    /// Bit position of pixel `(x, y)`
    #[must_use]
    pub const fn bit_index(&self, x: usize, y: usize) -> usize {
        y * self.row_bits + x
    }

    /// Smallest byte length that holds every row
    #[must_use]
    pub const fn min_bytes(&self) -> usize {
        (self.row_bits * self.height).div_ceil(8)
    }
}

/// Width of the built-in eye bitmaps
pub const FRAME_WIDTH: usize = 16;

/// Height of the built-in eye bitmaps
pub const FRAME_HEIGHT: usize = 8;

/// Byte length of one built-in bitmap
pub const FRAME_BYTES: usize = FRAME_WIDTH * FRAME_HEIGHT / 8;

/// Geometry shared by every built-in bitmap
pub const FRAME_GEOMETRY: FrameGeometry = FrameGeometry::new(FRAME_WIDTH, FRAME_HEIGHT);

/// Pack `#`/`.` row patterns into an MSB-first bitmap
///
/// Evaluated at compile time for the built-in frames, so a malformed pattern
/// is a build error rather than a runtime one.
///
/// # Panics
///
/// Panics if a row is not exactly [`FRAME_WIDTH`] characters or contains a
/// character other than `#` or `.`.
#[must_use]
pub const fn pack_rows(rows: [&str; FRAME_HEIGHT]) -> [u8; FRAME_BYTES] {
    let mut out = [0u8; FRAME_BYTES];
    let mut y = 0;
    while y < FRAME_HEIGHT {
        let row = rows[y].as_bytes();
        assert!(row.len() == FRAME_WIDTH, "sprite row has the wrong width");
        let mut x = 0;
        while x < FRAME_WIDTH {
            match row[x] {
                b'#' => {
                    let bit = y * FRAME_WIDTH + x;
                    out[bit / 8] |= 0x80 >> (bit % 8);
                }
                b'.' => {}
                _ => panic!("sprite rows may only contain '#' and '.'"),
            }
            x += 1;
        }
        y += 1;
    }
    out
}

// ============================================================================
// Built-in Bitmaps
// ============================================================================

/// Eye fully open, pupil centred
pub static IDLE_OPEN: [u8; FRAME_BYTES] = pack_rows([
    "....########....",
    "..##........##..",
    ".#....####....#.",
    "#....######....#",
    "#....######....#",
    ".#....####....#.",
    "..##........##..",
    "....########....",
]);

/// Eye open with a contracted pupil
pub static IDLE_FOCUS: [u8; FRAME_BYTES] = pack_rows([
    "....########....",
    "..##........##..",
    ".#............#.",
    "#......##......#",
    "#......##......#",
    ".#............#.",
    "..##........##..",
    "....########....",
]);

/// Lid half down
pub static BLINK_HALF: [u8; FRAME_BYTES] = pack_rows([
    "................",
    "................",
    "....########....",
    ".###........###.",
    "#....######....#",
    ".#....####....#.",
    "..##........##..",
    "....########....",
]);

/// Lid closed
pub static BLINK_CLOSED: [u8; FRAME_BYTES] = pack_rows([
    "................",
    "................",
    "................",
    "................",
    "################",
    ".##..........##.",
    "................",
    "................",
]);

/// Pupil pushed to the left edge
pub static LOOK_LEFT: [u8; FRAME_BYTES] = pack_rows([
    "....########....",
    "..##........##..",
    ".#.####.......#.",
    "#.######.......#",
    "#.######.......#",
    ".#.####.......#.",
    "..##........##..",
    "....########....",
]);

/// Pupil pushed to the right edge
pub static LOOK_RIGHT: [u8; FRAME_BYTES] = pack_rows([
    "....########....",
    "..##........##..",
    ".#.......####.#.",
    "#.......######.#",
    "#.......######.#",
    ".#.......####.#.",
    "..##........##..",
    "....########....",
]);
