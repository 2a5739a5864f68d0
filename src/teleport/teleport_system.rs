use cgmath::{Vector3, VectorSpace, vec3};
use serde::{Deserialize, Serialize};

use crate::input_context::AimPose;
use crate::physics::{PlayerBody, RigidObjects, SpatialQuery, SurfaceFlags};
use crate::teleport_log;
use crate::time::Time;

use super::trajectory::{TraceMode, TraceParams, Trajectory};

/// Configuration for the teleport system.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TeleportConfig {
    /// Straight segment or projectile arc while aiming.
    pub mode: TraceMode,
    pub straight_range: f32,
    pub launch_power: f32,
    pub gravity: f32,
    pub sim_step: f32,
    pub max_samples: usize,
    /// When enabled, confirmation runs the timed warp instead of an
    /// instant relocation.
    pub warp_enabled: bool,
    pub warp_duration: f32,
    /// Cadence of the warp interpolation task.
    pub warp_interval: f32,
    /// Surface categories accepted as a destination.
    pub ground_surfaces: SurfaceFlags,
}

impl Default for TeleportConfig {
    fn default() -> Self {
        TeleportConfig {
            mode: TraceMode::Curved,
            straight_range: 1000.0,
            launch_power: 1500.0,
            gravity: 5000.0,
            sim_step: 0.02,
            max_samples: 40,
            warp_enabled: true,
            warp_duration: 0.2,
            warp_interval: 0.01,
            ground_surfaces: SurfaceFlags::GROUND,
        }
    }
}

impl TeleportConfig {
    fn trace_params(&self) -> TraceParams {
        TraceParams {
            straight_range: self.straight_range,
            launch_power: self.launch_power,
            gravity: self.gravity,
            sim_step: self.sim_step,
            max_samples: self.max_samples,
        }
    }
}

/// Gating states of the teleport interaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TeleportState {
    /// Aim input not held, no relocation pending.
    Idle,
    /// Aim input held, no trace classified yet.
    Aiming,
    /// Last trace ended on an accepted ground surface.
    ArmedValid,
    /// Last trace found no destination; marker hidden.
    ArmedInvalid,
    /// Timed relocation in flight.
    Warping,
}

/// Destination indicator state. Visible exactly while the last trace
/// ended with a ground hit and an unobstructed path.
#[derive(Clone, Copy, Debug)]
pub struct TargetMarker {
    pub visible: bool,
    pub position: Vector3<f32>,
}

impl Default for TargetMarker {
    fn default() -> Self {
        TargetMarker {
            visible: false,
            position: vec3(0.0, 0.0, 0.0),
        }
    }
}

/// Timed smooth relocation toward an armed destination, sub-stepped at a
/// fixed interval off the frame clock.
#[derive(Clone, Copy, Debug)]
struct WarpTask {
    destination: Vector3<f32>,
    duration: f32,
    interval: f32,
    elapsed: f32,
    accumulator: f32,
}

impl WarpTask {
    fn new(destination: Vector3<f32>, duration: f32, interval: f32) -> Self {
        WarpTask {
            destination,
            duration,
            interval,
            elapsed: 0.0,
            accumulator: 0.0,
        }
    }

    /// Advance by a frame's worth of time. Returns true once the
    /// destination has been reached; the caller snaps and finalizes.
    fn tick<W: PlayerBody>(&mut self, dt: f32, world: &mut W) -> bool {
        self.accumulator += dt;
        let interval = if self.interval > 0.0 {
            self.interval
        } else {
            dt.max(f32::EPSILON)
        };
        while self.accumulator >= interval {
            self.accumulator -= interval;
            self.elapsed += interval;
            // guard against f32 accumulation drift at the boundary
            if self.elapsed >= self.duration - 1e-6 {
                return true;
            }
            let alpha = (self.elapsed / self.duration).min(1.0);
            let position = world.player_position().lerp(self.destination, alpha);
            world.set_player_position(position);
        }
        false
    }
}

/// State machine gating the teleport trace, destination marker and final
/// relocation.
pub struct TeleportSystem {
    config: TeleportConfig,
    state: TeleportState,
    destination: Option<Vector3<f32>>,
    trajectory: Option<Trajectory>,
    marker: TargetMarker,
    warp: Option<WarpTask>,
}

impl TeleportSystem {
    pub fn new(config: TeleportConfig) -> Self {
        TeleportSystem {
            config,
            state: TeleportState::Idle,
            destination: None,
            trajectory: None,
            marker: TargetMarker::default(),
            warp: None,
        }
    }

    pub fn with_default_config() -> Self {
        Self::new(TeleportConfig::default())
    }

    pub fn state(&self) -> TeleportState {
        self.state
    }

    /// The path polyline of the most recent trace, for rendering.
    pub fn trajectory(&self) -> Option<&Trajectory> {
        self.trajectory.as_ref()
    }

    pub fn marker(&self) -> &TargetMarker {
        &self.marker
    }

    pub fn config(&self) -> &TeleportConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: TeleportConfig) {
        self.config = config;
    }

    /// Aim-input press: begin tracing. A warp still in flight is
    /// cancelled first, leaving the player wherever it got to.
    pub fn start<W: PlayerBody>(&mut self, world: &mut W) {
        if self.warp.take().is_some() {
            world.set_player_collision_enabled(true);
            teleport_log!(debug, "warp cancelled by new aim");
        }
        self.state = TeleportState::Aiming;
        self.destination = None;
        self.trajectory = None;
        self.marker = TargetMarker::default();
    }

    /// Per-tick update: trace while aiming, interpolate while warping.
    pub fn update<W: SpatialQuery + RigidObjects + PlayerBody>(
        &mut self,
        time: &Time,
        aim: &AimPose,
        world: &mut W,
    ) {
        match self.state {
            TeleportState::Aiming | TeleportState::ArmedValid | TeleportState::ArmedInvalid => {
                self.update_trace(aim, world);
            }
            TeleportState::Warping => {
                self.update_warp(time.elapsed.as_secs_f32(), world);
            }
            TeleportState::Idle => {}
        }
    }

    /// Aim-input release: relocate if armed, otherwise reset silently.
    pub fn finish<W: PlayerBody>(&mut self, world: &mut W) {
        if self.state == TeleportState::Warping {
            return;
        }
        let armed = self.state == TeleportState::ArmedValid;
        let destination = self.destination.take();
        self.trajectory = None;
        self.marker = TargetMarker::default();

        match destination {
            Some(destination) if armed => {
                let target =
                    destination + vec3(0.0, world.player_collision_half_height(), 0.0);
                if self.config.warp_enabled && self.config.warp_duration > 0.0 {
                    world.set_player_collision_enabled(false);
                    self.warp = Some(WarpTask::new(
                        target,
                        self.config.warp_duration,
                        self.config.warp_interval,
                    ));
                    self.state = TeleportState::Warping;
                    teleport_log!(debug, "warp started toward {target:?}");
                } else {
                    world.set_player_position(target);
                    self.state = TeleportState::Idle;
                    teleport_log!(debug, "relocated to {target:?}");
                }
            }
            _ => {
                // no valid destination: silently refused
                self.state = TeleportState::Idle;
            }
        }
    }

    fn update_trace<W: SpatialQuery + RigidObjects>(&mut self, aim: &AimPose, world: &W) {
        let trajectory = Trajectory::trace(
            self.config.mode,
            aim.position,
            aim.forward,
            &self.config.trace_params(),
            world,
        );

        let grounded = trajectory.hit.as_ref().filter(|hit| {
            world
                .surface_flags(hit.object)
                .intersects(self.config.ground_surfaces)
        });
        match grounded {
            Some(hit) => {
                self.destination = Some(hit.point);
                self.marker = TargetMarker {
                    visible: true,
                    position: hit.point,
                };
                self.state = TeleportState::ArmedValid;
            }
            None => {
                self.destination = None;
                self.marker = TargetMarker::default();
                self.state = TeleportState::ArmedInvalid;
            }
        }
        self.trajectory = Some(trajectory);
    }

    fn update_warp<W: PlayerBody>(&mut self, dt: f32, world: &mut W) {
        let Some(mut task) = self.warp.take() else {
            self.state = TeleportState::Idle;
            return;
        };
        if task.tick(dt, world) {
            // single exit: snap and re-enable collision exactly once
            world.set_player_position(task.destination);
            world.set_player_collision_enabled(true);
            self.state = TeleportState::Idle;
            teleport_log!(debug, "warp arrived at {:?}", task.destination);
        } else {
            self.warp = Some(task);
        }
    }
}
