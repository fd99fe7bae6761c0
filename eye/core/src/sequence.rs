//! Scripted Test Sequence
//!
//! A fixed walk through the scheduler's main behaviours: idle, a look to each
//! side and back, then a manual blink. Used by the preview binary and as a
//! regression fixture.

use serde::{Deserialize, Serialize};

use crate::animator::{AnimatorSnapshot, EyeAnimator, TickOutput};
use crate::catalog::AnimationId;

/// Tick period used by the scripted sequence
pub const SEQUENCE_STEP_MS: u32 = 40;

/// Blink interval used by the scripted sequence
pub const SEQUENCE_BLINK_INTERVAL_MS: u32 = 900;

/// One leg of a scripted sequence
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    /// Name shown in dumps
    pub label: String,
    /// Bias applied before the first tick
    pub bias: f32,
    /// Number of ticks
    pub steps: u32,
    /// Animation triggered after the bias is applied
    #[serde(default)]
    pub trigger: Option<AnimationId>,
}

impl Phase {
    /// Phase that only sets a bias
    #[must_use]
    pub fn new(label: impl Into<String>, bias: f32, steps: u32) -> Self {
        Self {
            label: label.into(),
            bias,
            steps,
            trigger: None,
        }
    }

    /// Also trigger `id` when the phase starts
    #[must_use]
    pub fn with_trigger(mut self, id: AnimationId) -> Self {
        self.trigger = Some(id);
        self
    }
}

/// The standard five-phase walk
#[must_use]
pub fn default_phases() -> Vec<Phase> {
    vec![
        Phase::new("Idle", 0.0, 5),
        Phase::new("LookLeft", -0.8, 6),
        Phase::new("Idle", 0.0, 4),
        Phase::new("LookRight", 0.8, 6),
        Phase::new("ManualBlink", 0.0, 5).with_trigger(AnimationId::Blink),
    ]
}

/// Animator set up the way the scripted sequence expects
#[must_use]
pub fn sequence_animator() -> EyeAnimator {
    let mut animator = EyeAnimator::with_default(AnimationId::Idle);
    animator.set_blinking(true, SEQUENCE_BLINK_INTERVAL_MS);
    animator.set_movement_enabled(true);
    animator
}

/// Record of a single tick within a sequence
#[derive(Clone, Debug, PartialEq)]
pub struct SequenceStep {
    /// Label of the phase the tick belongs to
    pub phase: String,
    /// Zero-based tick number within the phase
    pub step: u32,
    /// Frame the tick selected
    pub output: TickOutput,
    /// State right after the tick
    pub snapshot: AnimatorSnapshot,
}

/// Drive `animator` through `phases`, ticking `step_ms` each step
pub fn run_sequence(
    animator: &mut EyeAnimator,
    phases: &[Phase],
    step_ms: u32,
) -> Vec<SequenceStep> {
    let total: usize = phases.iter().map(|p| p.steps as usize).sum();
    let mut steps = Vec::with_capacity(total);

    for phase in phases {
        animator.set_horizontal_bias(phase.bias);
        if let Some(id) = phase.trigger {
            animator.trigger(id);
        }
        tracing::debug!(
            phase = %phase.label,
            bias = phase.bias,
            steps = phase.steps,
            "Phase started"
        );

        for step in 0..phase.steps {
            let output = animator.tick(step_ms);
            steps.push(SequenceStep {
                phase: phase.label.clone(),
                step,
                output,
                snapshot: animator.snapshot(),
            });
        }
    }

    steps
}
