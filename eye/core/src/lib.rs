//! Roboteye Core - Headless Animation Scheduling for a Bitmap Eye
//!
//! This crate decides which frame a small monochrome "eye" display should show
//! at any moment. It knows nothing about the display itself: callers feed it
//! elapsed time and gaze input, and it hands back borrowed frame bitmaps for a
//! rendering surface to draw.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Control Loop (caller)                    │
//! │   set_horizontal_bias / set_blinking / trigger / tick(Δms)   │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │
//! ┌──────────────────────────────┼───────────────────────────────┐
//! │                        ROBOTEYE CORE                         │
//! │  ┌───────────────────────────┴────────────────────────────┐  │
//! │  │                     EyeAnimator                        │  │
//! │  │   baseline selection · override arbitration · timing   │  │
//! │  └───────────────────────────┬────────────────────────────┘  │
//! │                              │ reads                         │
//! │  ┌───────────────────────────┴────────────────────────────┐  │
//! │  │           AnimationCatalog (static, shared)            │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │ FrameView
//!                     ┌──────────┴──────────┐
//!                     │  Rendering surface  │
//!                     │ (OLED, ASCII, ...)  │
//!                     └─────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`EyeAnimator`]: per-eye scheduler, one instance per display
//! - [`AnimationCatalog`]: read-only table of built-in animations
//! - [`AnimationId`]: closed set of animation identifiers
//! - [`FrameView`]: borrowed handle to a packed 1-bit bitmap
//! - [`EyeConfig`]: settings loaded from file, environment and CLI
//! - [`AnimationDescriptor`]: authored animation asset with its bitmap blob
//!
//! # Quick Start
//!
//! ```
//! use roboteye_core::{AnimationId, EyeAnimator};
//!
//! let mut eye = EyeAnimator::with_default(AnimationId::Idle);
//! eye.set_blinking(true, 900);
//! eye.set_movement_enabled(true);
//! eye.set_horizontal_bias(-0.8);
//!
//! let out = eye.tick(40);
//! assert_eq!(out.animation, AnimationId::LookLeft);
//! assert_eq!(out.frame_index, 0);
//! ```
//!
//! # Design Principles
//!
//! 1. **Caller owns time**: the core never reads a clock or sleeps
//! 2. **Best-effort inputs**: configuration calls clamp or substitute bad
//!    values instead of failing
//! 3. **Surface agnostic**: frames leave the core as opaque bytes

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod animator;
pub mod catalog;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod frame;
pub mod render;
pub mod sequence;

// Re-export main types at crate root
pub use animator::{
    desired_baseline, AnimatorSnapshot, EyeAnimator, OverrideKind, PlaybackMode, TickOutput,
    DEFAULT_BLINK_INTERVAL_MS, LOOK_THRESHOLD,
};
pub use catalog::{AnimationCatalog, AnimationDefinition, AnimationId};
pub use config::{
    default_config_path, load_config, load_config_from_path, load_config_with_env, ConfigError,
    ConfigOverrides, ConfigSource, EyeConfig,
};
pub use descriptor::{AnimationDescriptor, DescriptorError, FrameTiming};
pub use error::{AnimatorError, Result};
pub use frame::{FrameGeometry, FrameView, FRAME_GEOMETRY};
pub use render::{render_ascii, write_ascii};
pub use sequence::{default_phases, run_sequence, sequence_animator, Phase, SequenceStep};
