use cgmath::{MetricSpace, Quaternion, Rotation, Vector3, Zero};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::grab_log;
use crate::input_context::AimPose;
use crate::physics::{ObjectHandle, Pose, RigidObjects, SpatialQuery};
use crate::time::Time;

use super::remote_pull::{PullStatus, RemotePullTask};

/// Configuration for near and remote grabbing.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GrabConfig {
    /// Radius of the near-grab overlap sphere around the hand.
    pub grab_radius: f32,
    /// Multiplier on the release impulse.
    pub throw_power: f32,
    /// Multiplier on the release angular velocity.
    pub torque_scale: f32,
    /// When enabled, grabs go through the remote sweep-and-pull path.
    pub remote_grab: bool,
    pub remote_distance: f32,
    pub remote_radius: f32,
    /// Lerp rate of the pull toward the hand, per second.
    pub pull_speed: f32,
    /// Cadence of the pull task.
    pub pull_interval: f32,
    /// Remaining distance under which the pull snaps to its target.
    pub snap_threshold: f32,
    /// How far in front of the hand a pulled object comes to rest.
    pub hold_offset: f32,
}

impl Default for GrabConfig {
    fn default() -> Self {
        GrabConfig {
            grab_radius: 100.0,
            throw_power: 1000.0,
            torque_scale: 1.0,
            remote_grab: false,
            remote_distance: 2000.0,
            remote_radius: 20.0,
            pull_speed: 10.0,
            pull_interval: 0.02,
            snap_threshold: 10.0,
            hold_offset: 100.0,
        }
    }
}

/// One-tick hand kinematics sampled while an object is held.
///
/// `throw_direction` and `delta_rotation` are the displacement and
/// relative rotation of the most recent tick only; release speed
/// reflects the final tick's motion, never an average.
#[derive(Clone, Copy, Debug)]
pub struct HandTracking {
    prev_position: Vector3<f32>,
    prev_rotation: Quaternion<f32>,
    pub throw_direction: Vector3<f32>,
    pub delta_rotation: Quaternion<f32>,
}

impl HandTracking {
    fn new(hand: &Pose) -> Self {
        HandTracking {
            prev_position: hand.position,
            prev_rotation: hand.rotation,
            throw_direction: Vector3::zero(),
            delta_rotation: Quaternion::from_sv(1.0, Vector3::zero()),
        }
    }

    fn update(&mut self, hand: &Pose) {
        self.throw_direction = hand.position - self.prev_position;
        self.delta_rotation = hand.rotation * self.prev_rotation.invert();
        self.prev_position = hand.position;
        self.prev_rotation = hand.rotation;
    }
}

/// Near- and remote-range object manipulation.
///
/// At most one object is held at a time; the held reference is mutated
/// only through this type's own methods.
pub struct GrabSystem {
    config: GrabConfig,
    held: Option<ObjectHandle>,
    attach: Option<Pose>,
    tracking: Option<HandTracking>,
    pull: Option<RemotePullTask>,
}

impl GrabSystem {
    pub fn new(config: GrabConfig) -> Self {
        GrabSystem {
            config,
            held: None,
            attach: None,
            tracking: None,
            pull: None,
        }
    }

    pub fn with_default_config() -> Self {
        Self::new(GrabConfig::default())
    }

    pub fn held(&self) -> Option<ObjectHandle> {
        self.held
    }

    pub fn is_pulling(&self) -> bool {
        self.pull.is_some()
    }

    pub fn config(&self) -> &GrabConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: GrabConfig) {
        self.config = config;
    }

    /// Grab-input press. Remote mode delegates to the sweep-and-pull
    /// path; otherwise the nearest physics-enabled object overlapping the
    /// hand sphere is attached. Holding something already is a no-op.
    pub fn try_grab<W: SpatialQuery + RigidObjects>(
        &mut self,
        hand: &Pose,
        aim: &AimPose,
        world: &mut W,
        exclude: &[ObjectHandle],
    ) {
        if self.held.is_some() {
            return;
        }
        if self.config.remote_grab {
            self.remote_grab(aim, world, exclude);
            return;
        }

        let center = hand.position;
        let mut nearest: Option<(OrderedFloat<f32>, ObjectHandle)> = None;
        for candidate in world.sphere_overlap(center, self.config.grab_radius, exclude) {
            if !world.is_simulating_physics(candidate) {
                continue;
            }
            let Some(pose) = world.object_pose(candidate) else {
                continue;
            };
            let distance = OrderedFloat(pose.position.distance(center));
            // strict comparison keeps the first-encountered object on ties
            let closer = match nearest {
                None => true,
                Some((best, _)) => distance < best,
            };
            if closer {
                nearest = Some((distance, candidate));
            }
        }

        if let Some((_, object)) = nearest {
            self.attach_to_hand(object, hand, world);
            grab_log!(debug, "grabbed nearby object {object:?}");
        }
    }

    /// Per-tick update while interacting: pumps a live pull task, then
    /// carries the held object with the hand and samples kinematics.
    pub fn update<W: RigidObjects>(&mut self, time: &Time, hand: &Pose, world: &mut W) {
        let dt = time.elapsed.as_secs_f32();

        if let Some(mut task) = self.pull.take() {
            match task.tick(dt, self.held, hand, world) {
                PullStatus::Pulling => {
                    self.pull = Some(task);
                    return;
                }
                PullStatus::Arrived => {
                    // pull landed: finalize the attachment at the hand
                    if let Some(pose) = world.object_pose(task.object()) {
                        self.attach = Some(hand.inverse_transform(&pose));
                    }
                    self.tracking = Some(HandTracking::new(hand));
                    grab_log!(debug, "remote pull arrived for {:?}", task.object());
                }
                PullStatus::Cancelled => {
                    if self.held == Some(task.object()) {
                        // the body vanished mid-pull; nothing left to hold
                        self.held = None;
                        self.attach = None;
                        self.tracking = None;
                    }
                    return;
                }
            }
        }

        let Some(object) = self.held else {
            return;
        };
        if world.object_pose(object).is_none() {
            // held object despawned under us
            self.held = None;
            self.attach = None;
            self.tracking = None;
            return;
        }
        if let Some(attach) = &self.attach {
            world.set_object_pose(object, hand.transform(attach));
        }
        if let Some(tracking) = self.tracking.as_mut() {
            tracking.update(hand);
        }
    }

    /// Grab-input release: restore physics and throw. Nothing held is a
    /// no-op. A pull task still in flight notices the cleared reference
    /// on its next scheduled tick and cancels itself.
    pub fn try_ungrab<W: RigidObjects>(&mut self, dt: f32, world: &mut W) {
        let Some(object) = self.held.take() else {
            return;
        };
        self.attach = None;
        let tracking = self.tracking.take();

        world.set_simulating_physics(object, true);
        world.set_collision_enabled(object, true);

        if let Some(tracking) = tracking {
            let impulse =
                tracking.throw_direction * self.config.throw_power * world.mass(object);
            world.apply_impulse(object, impulse);
            let angular =
                angular_velocity(tracking.delta_rotation, dt) * self.config.torque_scale;
            world.set_angular_velocity(object, angular);
        }
        grab_log!(debug, "released object {object:?}");
    }

    fn remote_grab<W: SpatialQuery + RigidObjects>(
        &mut self,
        aim: &AimPose,
        world: &mut W,
        exclude: &[ObjectHandle],
    ) {
        let end = aim.position + aim.forward * self.config.remote_distance;
        let Some(hit) =
            world.sphere_sweep(aim.position, end, self.config.remote_radius, exclude)
        else {
            return;
        };
        if !world.is_simulating_physics(hit.object) {
            return;
        }

        world.set_simulating_physics(hit.object, false);
        world.set_collision_enabled(hit.object, false);
        self.held = Some(hit.object);
        self.pull = Some(RemotePullTask::new(hit.object, &self.config));
        grab_log!(debug, "remote grab started for {:?}", hit.object);
    }

    fn attach_to_hand<W: RigidObjects>(
        &mut self,
        object: ObjectHandle,
        hand: &Pose,
        world: &mut W,
    ) {
        world.set_simulating_physics(object, false);
        world.set_collision_enabled(object, false);
        if let Some(pose) = world.object_pose(object) {
            // hand-local offset keeps the world transform at attach time
            self.attach = Some(hand.inverse_transform(&pose));
        }
        self.tracking = Some(HandTracking::new(hand));
        self.held = Some(object);
    }
}

/// Angular velocity from a one-tick rotation delta: `(angle / dt) * axis`.
///
/// `dt <= 0` and near-identity deltas both yield zero rather than a
/// division blowup.
fn angular_velocity(delta: Quaternion<f32>, dt: f32) -> Vector3<f32> {
    if dt <= 0.0 {
        return Vector3::zero();
    }
    // take the short arc of the double cover
    let delta = if delta.s < 0.0 { -delta } else { delta };
    let s = delta.s.clamp(-1.0, 1.0);
    let sin_half = (1.0 - s * s).sqrt();
    if sin_half <= 1e-6 {
        return Vector3::zero();
    }
    let angle = 2.0 * s.acos();
    let axis = delta.v / sin_half;
    axis * (angle / dt)
}
