//! Error types for the eye animation core

use thiserror::Error;

/// Errors raised when resolving animation identifiers
///
/// Scheduler configuration calls never fail (bad values are clamped or
/// substituted); only the boundaries that turn raw input into an
/// [`AnimationId`](crate::AnimationId) report errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnimatorError {
    /// Numeric id outside the closed animation set
    #[error("Invalid animation id: {raw}")]
    InvalidAnimationId {
        /// The rejected raw value
        raw: u8,
    },

    /// Name that matches no animation
    #[error("Unknown animation: {name}")]
    UnknownAnimation {
        /// The rejected name
        name: String,
    },
}

/// Result alias for identifier resolution
pub type Result<T> = std::result::Result<T, AnimatorError>;
