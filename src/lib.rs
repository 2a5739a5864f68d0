// VR player spatial interaction.
//
// The pieces a frame driver wires together to let a player point, warp,
// grab and throw:
//
// - `teleport`: aim-trace state machine (straight ray or projectile
//   arc), ground validation, instant or timed relocation.
// - `grab`: near and remote object acquisition, rigid hold with hand
//   kinematics, throw on release.
// - `crosshair`: distance-invariant aim reticle.
// - `physics`: rapier-backed world implementing the service traits the
//   controllers consume.
//
// All of it is single-threaded and frame-driven: the embedding loop
// calls `VrPlayer::update` once per tick with fresh input and the
// shared physics world.

pub mod crosshair;
pub mod grab;
pub mod input_context;
pub mod logging;
pub mod physics;
pub mod player;
pub mod teleport;
pub mod time;
pub mod vr_config;

#[cfg(test)]
pub(crate) mod testing;

pub use crosshair::{Crosshair, CrosshairConfig, CrosshairSystem};
pub use grab::{GrabConfig, GrabSystem, HandTracking};
pub use input_context::{AimPose, Hand, InputContext};
pub use logging::{LogConfig, init_logging};
pub use physics::{
    ObjectHandle, PhysicsWorld, PlayerBody, Pose, RayHit, RigidObjects, SpatialQuery,
    SurfaceFlags, SweepHit,
};
pub use player::VrPlayer;
pub use teleport::{
    TargetMarker, TeleportConfig, TeleportState, TeleportSystem, TraceMode, TraceParams,
    Trajectory,
};
pub use time::Time;
pub use vr_config::{ConfigError, Handedness, VrConfig};
