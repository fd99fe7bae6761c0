//! Animation Catalog
//!
//! The fixed, process-wide set of eye animations. Built from static data at
//! compile time and never mutated, so any number of animators can read it
//! without synchronisation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AnimatorError, Result};
use crate::frame::{
    FrameView, BLINK_CLOSED, BLINK_HALF, IDLE_FOCUS, IDLE_OPEN, LOOK_LEFT, LOOK_RIGHT,
};

/// Identifier of a built-in animation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationId {
    /// Resting gaze, looping
    Idle,
    /// One-shot blink
    Blink,
    /// Gaze held to the left, looping
    LookLeft,
    /// Gaze held to the right, looping
    LookRight,
}

impl AnimationId {
    /// Every id, in catalog order
    pub const ALL: [AnimationId; 4] = [Self::Idle, Self::Blink, Self::LookLeft, Self::LookRight];

    /// Number of ids in the closed set
    pub const COUNT: usize = Self::ALL.len();

    /// Position of this id in the catalog
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Idle => 0,
            Self::Blink => 1,
            Self::LookLeft => 2,
            Self::LookRight => 3,
        }
    }

    /// Id at a catalog position, `None` when out of range
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Canonical `snake_case` name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Blink => "blink",
            Self::LookLeft => "look_left",
            Self::LookRight => "look_right",
        }
    }
}

impl fmt::Display for AnimationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for AnimationId {
    type Error = AnimatorError;

    fn try_from(raw: u8) -> Result<Self> {
        Self::from_index(usize::from(raw)).ok_or(AnimatorError::InvalidAnimationId { raw })
    }
}

impl FromStr for AnimationId {
    type Err = AnimatorError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "idle" => Ok(Self::Idle),
            "blink" => Ok(Self::Blink),
            "look_left" | "lookleft" => Ok(Self::LookLeft),
            "look_right" | "lookright" => Ok(Self::LookRight),
            _ => Err(AnimatorError::UnknownAnimation {
                name: s.to_string(),
            }),
        }
    }
}

/// Immutable frame sequence with uniform timing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnimationDefinition {
    /// Frames in display order (never empty)
    pub frames: &'static [FrameView<'static>],
    /// How long each frame stays up, in milliseconds (never zero)
    pub frame_duration_ms: u16,
    /// Repeat forever (`true`) or hand control back when done (`false`)
    pub looping: bool,
}

impl AnimationDefinition {
    /// Number of frames
    #[must_use]
    pub const fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Time to play every frame once
    #[must_use]
    pub fn total_duration_ms(&self) -> u64 {
        u64::from(self.frame_duration_ms) * self.frames.len() as u64
    }

    /// Frame at `index`, `None` when out of range
    #[must_use]
    pub fn frame(&self, index: usize) -> Option<FrameView<'static>> {
        self.frames.get(index).copied()
    }
}

static IDLE_FRAMES: [FrameView<'static>; 2] =
    [FrameView::new(&IDLE_OPEN), FrameView::new(&IDLE_FOCUS)];

static BLINK_FRAMES: [FrameView<'static>; 5] = [
    FrameView::new(&IDLE_OPEN),
    FrameView::new(&BLINK_HALF),
    FrameView::new(&BLINK_CLOSED),
    FrameView::new(&BLINK_HALF),
    FrameView::new(&IDLE_OPEN),
];

static LOOK_LEFT_FRAMES: [FrameView<'static>; 2] =
    [FrameView::new(&LOOK_LEFT), FrameView::new(&IDLE_FOCUS)];

static LOOK_RIGHT_FRAMES: [FrameView<'static>; 2] =
    [FrameView::new(&LOOK_RIGHT), FrameView::new(&IDLE_FOCUS)];

static BUILTIN: AnimationCatalog = AnimationCatalog {
    definitions: [
        AnimationDefinition {
            frames: &IDLE_FRAMES,
            frame_duration_ms: 140,
            looping: true,
        },
        AnimationDefinition {
            frames: &BLINK_FRAMES,
            frame_duration_ms: 45,
            looping: false,
        },
        AnimationDefinition {
            frames: &LOOK_LEFT_FRAMES,
            frame_duration_ms: 120,
            looping: true,
        },
        AnimationDefinition {
            frames: &LOOK_RIGHT_FRAMES,
            frame_duration_ms: 120,
            looping: true,
        },
    ],
};

/// Read-only lookup from [`AnimationId`] to [`AnimationDefinition`]
#[derive(Debug)]
pub struct AnimationCatalog {
    definitions: [AnimationDefinition; AnimationId::COUNT],
}

impl AnimationCatalog {
    /// The built-in catalog
    #[must_use]
    pub fn builtin() -> &'static AnimationCatalog {
        &BUILTIN
    }

    /// Definition for a valid id
    #[must_use]
    pub fn get(&self, id: AnimationId) -> &AnimationDefinition {
        &self.definitions[id.index()]
    }

    /// Definition at a raw catalog position, `None` when out of range
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<&AnimationDefinition> {
        self.definitions.get(index)
    }

    /// Every `(id, definition)` pair in catalog order
    pub fn iter(&self) -> impl Iterator<Item = (AnimationId, &AnimationDefinition)> {
        AnimationId::ALL
            .into_iter()
            .map(move |id| (id, self.get(id)))
    }
}
