// Teleport movement.
//
// Holding the aim input traces a path every tick (straight segment or
// projectile arc), arms a destination marker when the path lands on a
// ground surface, and on release relocates the player either instantly
// or through a timed warp.

pub mod teleport_system;
pub mod trajectory;

pub use teleport_system::{TargetMarker, TeleportConfig, TeleportState, TeleportSystem};
pub use trajectory::{TraceMode, TraceParams, Trajectory};
