//! Node markers of the default host frame loop.
//!
//! The default loop mirrors the layout of a typical engine frame: seven
//! top-level stages, each holding the host's own subsystems. The injector
//! splices its dispatch leaves into these stages; nothing here knows about
//! the injector.
//!
//! ```text
//! PlayerLoopRoot
//!     Initialization
//!     EarlyUpdate
//!     FixedUpdate        (fixed-step)
//!     PreUpdate
//!     Update
//!     PreLateUpdate
//!     PostLateUpdate
//! ```

use crate::node::{LoopSystem, PipelineNode};

/// Root of the default loop.
pub struct PlayerLoopRoot;
impl LoopSystem for PlayerLoopRoot {}

// ─────────────────────────────────────────────────────────────────────────────
// Top-level stages
// ─────────────────────────────────────────────────────────────────────────────

/// First stage of every frame. Time and profiler bookkeeping.
pub struct Initialization;
impl LoopSystem for Initialization {}

/// Input polling and platform events.
pub struct EarlyUpdate;
impl LoopSystem for EarlyUpdate {}

/// Fixed-timestep simulation. Runs zero or more times per frame.
pub struct FixedUpdate;
impl LoopSystem for FixedUpdate {}

/// Work that must land before gameplay scripts run.
pub struct PreUpdate;
impl LoopSystem for PreUpdate {}

/// Gameplay scripts.
pub struct Update;
impl LoopSystem for Update {}

/// Late scripts, animation and constraints.
pub struct PreLateUpdate;
impl LoopSystem for PreLateUpdate {}

/// Rendering and end-of-frame presentation.
pub struct PostLateUpdate;
impl LoopSystem for PostLateUpdate {}

// ─────────────────────────────────────────────────────────────────────────────
// Host subsystems
// ─────────────────────────────────────────────────────────────────────────────

/// Advances the frame clock.
pub struct UpdateTime;
impl LoopSystem for UpdateTime {}

/// Opens the per-frame profiler sample.
pub struct ProfilerStartFrame;
impl LoopSystem for ProfilerStartFrame {}

/// Polls input devices.
pub struct PollInput;
impl LoopSystem for PollInput {}

/// Dispatches platform window messages.
pub struct PumpPlatformEvents;
impl LoopSystem for PumpPlatformEvents {}

/// Steps the physics world.
pub struct PhysicsStep;
impl LoopSystem for PhysicsStep {}

/// Runs fixed-step scripts.
pub struct ScriptRunFixedUpdate;
impl LoopSystem for ScriptRunFixedUpdate {}

/// Syncs transforms written outside the simulation.
pub struct SyncTransforms;
impl LoopSystem for SyncTransforms {}

/// Runs per-frame scripts.
pub struct ScriptRunUpdate;
impl LoopSystem for ScriptRunUpdate {}

/// Resumes coroutines waiting for the next frame.
pub struct ScriptRunDelayedTasks;
impl LoopSystem for ScriptRunDelayedTasks {}

/// Runs late scripts.
pub struct ScriptRunLateUpdate;
impl LoopSystem for ScriptRunLateUpdate {}

/// Evaluates animation.
pub struct UpdateAnimation;
impl LoopSystem for UpdateAnimation {}

/// Submits the frame to the renderer.
pub struct RenderFrame;
impl LoopSystem for RenderFrame {}

/// Presents the back buffer.
pub struct PresentFrame;
impl LoopSystem for PresentFrame {}

/// Closes the per-frame profiler sample.
pub struct ProfilerEndFrame;
impl LoopSystem for ProfilerEndFrame {}

/// Builds the default host loop tree.
///
/// Stages carry only no-op subsystems; a host that wants real work attaches
/// update functions to its own tree instead.
#[must_use]
pub fn default_tree() -> PipelineNode {
    PipelineNode::new::<PlayerLoopRoot>()
        .child(
            PipelineNode::new::<Initialization>()
                .leaf::<UpdateTime>()
                .leaf::<ProfilerStartFrame>(),
        )
        .child(
            PipelineNode::new::<EarlyUpdate>()
                .leaf::<PollInput>()
                .leaf::<PumpPlatformEvents>(),
        )
        .child(
            PipelineNode::new::<FixedUpdate>()
                .leaf::<PhysicsStep>()
                .leaf::<ScriptRunFixedUpdate>()
                .fixed_step(),
        )
        .child(PipelineNode::new::<PreUpdate>().leaf::<SyncTransforms>())
        .child(
            PipelineNode::new::<Update>()
                .leaf::<ScriptRunUpdate>()
                .leaf::<ScriptRunDelayedTasks>(),
        )
        .child(
            PipelineNode::new::<PreLateUpdate>()
                .leaf::<ScriptRunLateUpdate>()
                .leaf::<UpdateAnimation>(),
        )
        .child(
            PipelineNode::new::<PostLateUpdate>()
                .leaf::<RenderFrame>()
                .leaf::<PresentFrame>()
                .leaf::<ProfilerEndFrame>(),
        )
}
