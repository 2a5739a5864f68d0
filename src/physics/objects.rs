use cgmath::{One, Quaternion, Rotation, Vector3, vec3};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Handle identifying a physics-backed object in the world.
///
/// Rapier's rigid-body handle is used directly, the same way the game
/// layer keys its physics bookkeeping by `RigidBodyHandle`.
pub type ObjectHandle = rapier3d::prelude::RigidBodyHandle;

bitflags::bitflags! {
    /// Surface categories assigned to world geometry and props.
    ///
    /// A teleport destination is accepted only when the terminal hit's
    /// flags intersect the configured ground set.
    pub struct SurfaceFlags: u32 {
        const GROUND = 1 << 0;
        const WALL = 1 << 1;
        const PROP = 1 << 2;
    }
}

impl Serialize for SurfaceFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.bits())
    }
}

impl<'de> Deserialize<'de> for SurfaceFlags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u32::deserialize(deserializer).map(SurfaceFlags::from_bits_truncate)
    }
}

/// Position + orientation pair, the transform unit shared by hands and
/// tracked objects.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
}

impl Pose {
    pub fn new(position: Vector3<f32>, rotation: Quaternion<f32>) -> Self {
        Self { position, rotation }
    }

    /// Forward direction: the rotation applied to -Z.
    pub fn forward(&self) -> Vector3<f32> {
        self.rotation * vec3(0.0, 0.0, -1.0)
    }

    /// Map a pose expressed in this pose's local space into world space.
    pub fn transform(&self, local: &Pose) -> Pose {
        Pose {
            position: self.position + self.rotation * local.position,
            rotation: self.rotation * local.rotation,
        }
    }

    /// Express a world-space pose in this pose's local space.
    ///
    /// `a.transform(&a.inverse_transform(&b)) == b` up to float error, which
    /// is what keeps an attached object's world transform fixed at the
    /// moment of attachment.
    pub fn inverse_transform(&self, world: &Pose) -> Pose {
        let inverse = self.rotation.invert();
        Pose {
            position: inverse * (world.position - self.position),
            rotation: inverse * world.rotation,
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: vec3(0.0, 0.0, 0.0),
            rotation: Quaternion::one(),
        }
    }
}

/// Capability surface of grabbable physics objects.
///
/// Everything the manipulation layer may do to an object it does through
/// this trait; object kinds and their bodies stay inside the physics
/// backend. Lookups on a despawned handle answer conservatively
/// (`object_pose` returns `None`, mutations are no-ops) so callers can
/// tolerate objects vanishing mid-interaction.
pub trait RigidObjects {
    fn is_simulating_physics(&self, object: ObjectHandle) -> bool;
    fn set_simulating_physics(&mut self, object: ObjectHandle, enabled: bool);
    fn set_collision_enabled(&mut self, object: ObjectHandle, enabled: bool);
    /// Apply an instantaneous linear impulse at the center of mass.
    fn apply_impulse(&mut self, object: ObjectHandle, impulse: Vector3<f32>);
    fn set_angular_velocity(&mut self, object: ObjectHandle, velocity: Vector3<f32>);
    fn mass(&self, object: ObjectHandle) -> f32;
    fn object_pose(&self, object: ObjectHandle) -> Option<Pose>;
    fn set_object_pose(&mut self, object: ObjectHandle, pose: Pose);
    fn surface_flags(&self, object: ObjectHandle) -> SurfaceFlags;
}

/// The player's own body as seen by the interaction layer.
pub trait PlayerBody {
    fn player_position(&self) -> Vector3<f32>;
    fn set_player_position(&mut self, position: Vector3<f32>);
    fn set_player_collision_enabled(&mut self, enabled: bool);
    /// Half the height of the player's collision capsule; relocations land
    /// the capsule center this far above the destination surface.
    fn player_collision_half_height(&self) -> f32;
}
