//! Eye Animator
//!
//! The per-eye scheduler. Each call to [`EyeAnimator::tick`] advances time by a
//! caller-supplied delta and returns the frame that should be on screen.
//!
//! # Arbitration
//!
//! Two kinds of animation compete for the eye:
//!
//! - **Baseline**: a looping animation picked from the movement toggle and the
//!   horizontal bias (`Idle`, `LookLeft` or `LookRight`). A bias change switches the
//!   baseline on the next tick.
//! - **Override**: a one-shot animation (the blink) that always runs to its
//!   last frame, then hands control back to whichever baseline is current
//!   *at that moment*.
//!
//! ```text
//!  Baseline-Idle ◄──bias──► Baseline-LookLeft / Baseline-LookRight
//!        │                              │
//!        └──── trigger(one-shot) ───────┘
//!                      │
//!                      ▼
//!        Override-Blink / Override-Other ── frames exhausted ──► current baseline
//! ```
//!
//! Frame advancement is exact for any delta: a single huge tick lands on the
//! same frame and sub-frame remainder as many small ticks summing to it.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::catalog::{AnimationCatalog, AnimationDefinition, AnimationId};
use crate::frame::FrameView;

/// Blink interval substituted for a requested interval of zero
pub const DEFAULT_BLINK_INTERVAL_MS: u32 = 1000;

/// Bias at or beyond which the eye looks sideways
pub const LOOK_THRESHOLD: f32 = 0.35;

/// Which kind of one-shot animation holds the eye
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideKind {
    /// The autonomous or manual blink
    Blink,
    /// Any other one-shot
    Other,
}

/// Whether the baseline or an override is playing
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackMode {
    /// No override active; `current` may still differ from the baseline after
    /// an explicit trigger of a looping animation
    #[default]
    Baseline,
    /// A one-shot animation is running and has not yet completed
    Override(OverrideKind),
}

impl PlaybackMode {
    /// Whether a one-shot animation is running
    #[must_use]
    pub fn is_override(self) -> bool {
        matches!(self, Self::Override(_))
    }
}

/// Frame selected by a tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickOutput {
    /// Animation the frame belongs to
    pub animation: AnimationId,
    /// Index of the frame within that animation
    pub frame_index: usize,
    /// The frame to display
    pub frame: FrameView<'static>,
}

/// Serializable view of an animator's state
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimatorSnapshot {
    /// Animation currently advancing (`None` before initialization)
    pub current: Option<AnimationId>,
    /// Animation control returns to after an override
    pub baseline: Option<AnimationId>,
    /// Baseline or override
    pub mode: PlaybackMode,
    /// Frame index within `current`
    pub frame_index: usize,
    /// Time accrued toward the next frame
    pub frame_elapsed_ms: u64,
    /// Autonomous blink countdown
    pub blink_timer_ms: u64,
    /// Autonomous blink period
    pub blink_interval_ms: u32,
    /// Autonomous blinking toggle
    pub blinking_enabled: bool,
    /// Bias-driven gaze toggle
    pub movement_enabled: bool,
    /// Horizontal gaze input in `[-1, 1]`
    pub horizontal_bias: f32,
    /// Next tick reports the fresh frame without advancing
    pub pending_start: bool,
}

/// Baseline animation for a movement toggle and bias
///
/// Bias strictly inside `(-0.35, 0.35)` is a dead zone that maps to Idle; the
/// boundaries belong to the look animations.
#[must_use]
pub fn desired_baseline(movement_enabled: bool, bias: f32) -> AnimationId {
    if !movement_enabled {
        AnimationId::Idle
    } else if bias <= -LOOK_THRESHOLD {
        AnimationId::LookLeft
    } else if bias >= LOOK_THRESHOLD {
        AnimationId::LookRight
    } else {
        AnimationId::Idle
    }
}

/// Per-eye animation scheduler
///
/// Owned by a single control loop; run one instance per eye. All instances
/// share the read-only [`AnimationCatalog`].
#[derive(Clone, Debug)]
pub struct EyeAnimator {
    catalog: &'static AnimationCatalog,
    current: Option<AnimationId>,
    baseline: Option<AnimationId>,
    frame_index: usize,
    frame_elapsed_ms: u64,
    blink_timer_ms: u64,
    blink_interval_ms: u32,
    blinking_enabled: bool,
    movement_enabled: bool,
    mode: PlaybackMode,
    horizontal_bias: f32,
    pending_start: bool,
}

impl EyeAnimator {
    /// Create an animator that has not been initialized yet
    ///
    /// Ticking it is safe: the first tick falls back to the Idle baseline.
    #[must_use]
    pub fn new() -> Self {
        Self {
            catalog: AnimationCatalog::builtin(),
            current: None,
            baseline: None,
            frame_index: 0,
            frame_elapsed_ms: 0,
            blink_timer_ms: 0,
            blink_interval_ms: DEFAULT_BLINK_INTERVAL_MS,
            blinking_enabled: false,
            movement_enabled: false,
            mode: PlaybackMode::Baseline,
            horizontal_bias: 0.0,
            pending_start: false,
        }
    }

    /// Create and initialize with a default animation
    #[must_use]
    pub fn with_default(default_animation: AnimationId) -> Self {
        let mut animator = Self::new();
        animator.initialize(default_animation);
        animator
    }

    /// Reset every counter and toggle and make `default_animation` both the
    /// baseline and the current animation
    pub fn initialize(&mut self, default_animation: AnimationId) {
        *self = Self::new();
        self.baseline = Some(default_animation);
        self.current = Some(default_animation);
        self.pending_start = true;
        debug!(animation = %default_animation, "Animator initialized");
    }

    /// Turn autonomous blinking on or off
    ///
    /// An `interval_ms` of 0 means [`DEFAULT_BLINK_INTERVAL_MS`]. A countdown
    /// already past the new interval is clamped to it. Disabling resets the
    /// countdown and demotes an in-flight blink to a generic override; the
    /// blink itself keeps playing until its last frame.
    pub fn set_blinking(&mut self, enabled: bool, interval_ms: u32) {
        self.blinking_enabled = enabled;
        if enabled {
            self.blink_interval_ms = if interval_ms == 0 {
                DEFAULT_BLINK_INTERVAL_MS
            } else {
                interval_ms
            };
            self.blink_timer_ms = self.blink_timer_ms.min(u64::from(self.blink_interval_ms));
        } else {
            self.blink_timer_ms = 0;
            if self.mode == PlaybackMode::Override(OverrideKind::Blink) {
                self.mode = PlaybackMode::Override(OverrideKind::Other);
            }
        }
    }

    /// Store the horizontal gaze input, clamped to `[-1, 1]`
    ///
    /// Takes effect on the next tick. NaN is ignored.
    pub fn set_horizontal_bias(&mut self, bias: f32) {
        if bias.is_nan() {
            return;
        }
        self.horizontal_bias = bias.clamp(-1.0, 1.0);
    }

    /// Let the bias drive the baseline, or pin it to Idle
    ///
    /// Disabling also recentres the bias.
    pub fn set_movement_enabled(&mut self, enabled: bool) {
        self.movement_enabled = enabled;
        if !enabled {
            self.horizontal_bias = 0.0;
        }
    }

    /// Switch to `id` immediately
    ///
    /// A looping animation also becomes the new baseline. A one-shot becomes
    /// an override and restarts the blink countdown.
    pub fn trigger(&mut self, id: AnimationId) {
        let looping = self.catalog.get(id).looping;
        self.current = Some(id);
        self.frame_index = 0;
        self.frame_elapsed_ms = 0;
        self.pending_start = true;
        self.mode = match (looping, id) {
            (true, _) => PlaybackMode::Baseline,
            (false, AnimationId::Blink) => PlaybackMode::Override(OverrideKind::Blink),
            (false, _) => PlaybackMode::Override(OverrideKind::Other),
        };

        if looping {
            self.baseline = Some(id);
        } else {
            self.blink_timer_ms = 0;
        }
        debug!(animation = %id, looping, "Animation triggered");
    }

    /// Advance time by `delta_ms` and return the frame to display
    pub fn tick(&mut self, delta_ms: u32) -> TickOutput {
        let delta = u64::from(delta_ms);

        // Baseline follows the inputs; an override is never preempted
        let desired = desired_baseline(self.movement_enabled, self.horizontal_bias);
        if self.baseline != Some(desired) {
            let baseline_was_active = !self.mode.is_override() && self.current == self.baseline;
            debug!(
                from = ?self.baseline,
                to = %desired,
                switch_now = baseline_was_active,
                "Baseline changed"
            );
            self.baseline = Some(desired);
            if baseline_was_active {
                self.reset_to_baseline(desired, true);
            }
        }

        if self.current.is_none() {
            self.reset_to_baseline(desired, true);
        }

        let mut started = std::mem::take(&mut self.pending_start);

        if self.blinking_enabled && self.blink_interval_ms > 0 {
            match self.mode {
                PlaybackMode::Baseline => {
                    if self.blink_timer_ms + delta >= u64::from(self.blink_interval_ms) {
                        debug!(interval_ms = self.blink_interval_ms, "Autonomous blink");
                        self.trigger(AnimationId::Blink);
                        self.blink_timer_ms = 0;
                        self.pending_start = false;
                        started = true;
                    } else {
                        self.blink_timer_ms += delta;
                    }
                }
                PlaybackMode::Override(OverrideKind::Blink) => self.blink_timer_ms = 0,
                PlaybackMode::Override(OverrideKind::Other) => {}
            }
        }

        if !started {
            self.frame_elapsed_ms += delta;
            self.advance_frames();
        }

        self.output()
    }

    /// Consume whole frame durations from `frame_elapsed_ms`
    ///
    /// Looping animations wrap arithmetically; a one-shot that runs out of
    /// frames hands the leftover time to the baseline and keeps going.
    #[allow(clippy::cast_possible_truncation)]
    fn advance_frames(&mut self) {
        loop {
            let def = self.current_definition();
            let duration = u64::from(def.frame_duration_ms);
            if duration == 0 || self.frame_elapsed_ms < duration {
                break;
            }

            let frame_count = def.frame_count() as u64;
            let steps = self.frame_elapsed_ms / duration;

            if def.looping {
                self.frame_elapsed_ms %= duration;
                self.frame_index = ((self.frame_index as u64 + steps) % frame_count) as usize;
                trace!(frame_index = self.frame_index, "Frame advanced");
                break;
            }

            let remaining = frame_count - self.frame_index as u64;
            if steps < remaining {
                self.frame_elapsed_ms -= steps * duration;
                self.frame_index += steps as usize;
                trace!(frame_index = self.frame_index, "Frame advanced");
                break;
            }

            self.frame_elapsed_ms -= remaining * duration;
            self.complete_override();
        }
    }

    fn complete_override(&mut self) {
        let finished = self.current;
        self.mode = PlaybackMode::Baseline;
        let baseline = self.baseline.unwrap_or(AnimationId::Idle);
        self.reset_to_baseline(baseline, false);
        debug!(
            finished = ?finished,
            baseline = %baseline,
            carried_ms = self.frame_elapsed_ms,
            "Override completed"
        );
    }

    fn reset_to_baseline(&mut self, baseline: AnimationId, reset_elapsed: bool) {
        self.baseline = Some(baseline);
        self.current = Some(baseline);
        self.frame_index = 0;
        if reset_elapsed {
            self.frame_elapsed_ms = 0;
        }
        self.pending_start = true;
    }

    fn current_id(&self) -> AnimationId {
        self.current.or(self.baseline).unwrap_or(AnimationId::Idle)
    }

    fn current_definition(&self) -> &'static AnimationDefinition {
        self.catalog.get(self.current_id())
    }

    fn output(&self) -> TickOutput {
        let animation = self.current_id();
        let def = self.catalog.get(animation);
        let frame_index = self.frame_index.min(def.frame_count().saturating_sub(1));
        TickOutput {
            animation,
            frame_index,
            frame: def.frames[frame_index],
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Animation currently advancing, `None` before initialization
    #[must_use]
    pub fn current(&self) -> Option<AnimationId> {
        self.current
    }

    /// Animation control returns to after an override
    #[must_use]
    pub fn baseline(&self) -> Option<AnimationId> {
        self.baseline
    }

    /// Baseline or override
    #[must_use]
    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    /// Whether a one-shot animation is running
    #[must_use]
    pub fn override_active(&self) -> bool {
        self.mode.is_override()
    }

    /// Whether the running override is a blink
    #[must_use]
    pub fn blink_in_progress(&self) -> bool {
        self.mode == PlaybackMode::Override(OverrideKind::Blink)
    }

    /// Frame index within the current animation
    #[must_use]
    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    /// Time accrued toward the next frame
    #[must_use]
    pub fn frame_elapsed_ms(&self) -> u64 {
        self.frame_elapsed_ms
    }

    /// Autonomous blink countdown
    #[must_use]
    pub fn blink_timer_ms(&self) -> u64 {
        self.blink_timer_ms
    }

    /// Autonomous blink period
    #[must_use]
    pub fn blink_interval_ms(&self) -> u32 {
        self.blink_interval_ms
    }

    /// Whether autonomous blinking is on
    #[must_use]
    pub fn blinking_enabled(&self) -> bool {
        self.blinking_enabled
    }

    /// Whether the bias drives the baseline
    #[must_use]
    pub fn movement_enabled(&self) -> bool {
        self.movement_enabled
    }

    /// Stored horizontal gaze input
    #[must_use]
    pub fn horizontal_bias(&self) -> f32 {
        self.horizontal_bias
    }

    /// Whether the next tick reports a freshly selected frame without advancing
    #[must_use]
    pub fn pending_start(&self) -> bool {
        self.pending_start
    }

    /// Capture the full state
    #[must_use]
    pub fn snapshot(&self) -> AnimatorSnapshot {
        AnimatorSnapshot {
            current: self.current,
            baseline: self.baseline,
            mode: self.mode,
            frame_index: self.frame_index,
            frame_elapsed_ms: self.frame_elapsed_ms,
            blink_timer_ms: self.blink_timer_ms,
            blink_interval_ms: self.blink_interval_ms,
            blinking_enabled: self.blinking_enabled,
            movement_enabled: self.movement_enabled,
            horizontal_bias: self.horizontal_bias,
            pending_start: self.pending_start,
        }
    }
}

impl Default for EyeAnimator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idle_animator() -> EyeAnimator {
        EyeAnimator::with_default(AnimationId::Idle)
    }

    #[test]
    fn test_initialize_state() {
        let animator = idle_animator();
        assert_eq!(animator.current(), Some(AnimationId::Idle));
        assert_eq!(animator.baseline(), Some(AnimationId::Idle));
        assert_eq!(animator.frame_index(), 0);
        assert_eq!(animator.frame_elapsed_ms(), 0);
        assert!(animator.pending_start());
        assert!(!animator.blinking_enabled());
        assert!(!animator.movement_enabled());
        assert_eq!(animator.mode(), PlaybackMode::Baseline);
    }

    #[test]
    fn test_initialize_resets_previous_state() {
        let mut animator = idle_animator();
        animator.set_blinking(true, 300);
        animator.set_movement_enabled(true);
        animator.set_horizontal_bias(0.9);
        animator.trigger(AnimationId::Blink);

        animator.initialize(AnimationId::LookLeft);

        assert_eq!(animator.current(), Some(AnimationId::LookLeft));
        assert_eq!(animator.mode(), PlaybackMode::Baseline);
        assert!(!animator.blinking_enabled());
        assert!(animator.horizontal_bias().abs() < f32::EPSILON);
    }

    #[test]
    fn test_first_tick_does_not_advance() {
        let mut animator = idle_animator();
        let out = animator.tick(500);
        assert_eq!(out.animation, AnimationId::Idle);
        assert_eq!(out.frame_index, 0);
        assert_eq!(animator.frame_elapsed_ms(), 0);
        assert!(!animator.pending_start());
    }

    #[test]
    fn test_uninitialized_tick_falls_back_to_idle() {
        let mut animator = EyeAnimator::new();
        assert_eq!(animator.current(), None);

        let out = animator.tick(16);

        assert_eq!(out.animation, AnimationId::Idle);
        assert_eq!(out.frame_index, 0);
        assert_eq!(animator.current(), Some(AnimationId::Idle));
        assert_eq!(animator.baseline(), Some(AnimationId::Idle));
    }

    #[test]
    fn test_blink_interval_zero_uses_default() {
        let mut animator = idle_animator();
        animator.set_blinking(true, 0);
        assert_eq!(animator.blink_interval_ms(), DEFAULT_BLINK_INTERVAL_MS);
    }

    #[test]
    fn test_shorter_interval_clamps_countdown() {
        let mut animator = idle_animator();
        animator.set_blinking(true, 5000);
        animator.tick(0);
        for _ in 0..30 {
            animator.tick(100);
        }
        assert_eq!(animator.blink_timer_ms(), 3000);

        animator.set_blinking(true, 1200);
        assert_eq!(animator.blink_timer_ms(), 1200);
    }

    #[test]
    fn test_disable_blinking_resets_countdown() {
        let mut animator = idle_animator();
        animator.set_blinking(true, 900);
        animator.tick(0);
        animator.tick(400);
        assert_eq!(animator.blink_timer_ms(), 400);

        animator.set_blinking(false, 900);
        assert_eq!(animator.blink_timer_ms(), 0);
        animator.tick(2000);
        assert_eq!(animator.current(), Some(AnimationId::Idle));
    }

    #[test]
    fn test_bias_is_clamped() {
        let mut animator = idle_animator();
        animator.set_horizontal_bias(7.5);
        assert!((animator.horizontal_bias() - 1.0).abs() < f32::EPSILON);
        animator.set_horizontal_bias(-3.0);
        assert!((animator.horizontal_bias() + 1.0).abs() < f32::EPSILON);
        animator.set_horizontal_bias(f32::NAN);
        assert!((animator.horizontal_bias() + 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_set_bias_does_not_switch_until_tick() {
        let mut animator = idle_animator();
        animator.set_movement_enabled(true);
        animator.set_horizontal_bias(-0.9);
        assert_eq!(animator.current(), Some(AnimationId::Idle));

        animator.tick(0);
        assert_eq!(animator.current(), Some(AnimationId::LookLeft));
    }

    #[test]
    fn test_disabling_movement_recentres_bias() {
        let mut animator = idle_animator();
        animator.set_movement_enabled(true);
        animator.set_horizontal_bias(0.8);
        animator.set_movement_enabled(false);
        assert!(animator.horizontal_bias().abs() < f32::EPSILON);

        animator.set_movement_enabled(true);
        animator.tick(0);
        assert_eq!(animator.baseline(), Some(AnimationId::Idle));
    }

    #[test]
    fn test_trigger_one_shot_keeps_baseline() {
        let mut animator = idle_animator();
        animator.set_blinking(true, 900);
        animator.tick(0);
        animator.tick(300);
        assert_eq!(animator.blink_timer_ms(), 300);

        animator.trigger(AnimationId::Blink);

        assert_eq!(animator.current(), Some(AnimationId::Blink));
        assert_eq!(animator.baseline(), Some(AnimationId::Idle));
        assert_eq!(animator.mode(), PlaybackMode::Override(OverrideKind::Blink));
        assert_eq!(animator.blink_timer_ms(), 0);
        assert!(animator.pending_start());
    }

    #[test]
    fn test_trigger_looping_sets_baseline() {
        let mut animator = idle_animator();
        animator.trigger(AnimationId::LookRight);
        assert_eq!(animator.current(), Some(AnimationId::LookRight));
        assert_eq!(animator.baseline(), Some(AnimationId::LookRight));
        assert!(!animator.override_active());
    }

    #[test]
    fn test_desired_baseline_dead_zone() {
        assert_eq!(desired_baseline(true, -0.34), AnimationId::Idle);
        assert_eq!(desired_baseline(true, 0.34), AnimationId::Idle);
        assert_eq!(desired_baseline(true, -0.35), AnimationId::LookLeft);
        assert_eq!(desired_baseline(true, 0.35), AnimationId::LookRight);
        assert_eq!(desired_baseline(false, -1.0), AnimationId::Idle);
        assert_eq!(desired_baseline(false, 1.0), AnimationId::Idle);
    }

    #[test]
    fn test_mode_flags_are_consistent() {
        let mut animator = idle_animator();
        animator.trigger(AnimationId::Blink);
        assert!(animator.override_active());
        assert!(animator.blink_in_progress());

        animator.set_blinking(false, 0);
        assert!(animator.override_active());
        assert!(!animator.blink_in_progress());
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut animator = idle_animator();
        animator.trigger(AnimationId::Blink);
        let json = serde_json::to_value(animator.snapshot()).unwrap();
        assert_eq!(json["current"], "blink");
        assert_eq!(json["mode"]["override"], "blink");
    }
}
