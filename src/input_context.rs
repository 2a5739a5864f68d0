// Per-tick input snapshot.
//
// The engine-side driver samples tracked poses and analog button values
// once per frame and hands them over as plain data; nothing here touches
// device bindings.

use cgmath::{InnerSpace, One, Quaternion, Vector3, vec3};
use serde::{Deserialize, Serialize};

use crate::physics::Pose;
use crate::vr_config::Handedness;

/// Origin and direction of an aim trace.
///
/// `forward` is normalized at construction, which is what lets the
/// simulation layers assume a unit direction.
#[derive(Clone, Copy, Debug)]
pub struct AimPose {
    pub position: Vector3<f32>,
    pub forward: Vector3<f32>,
}

impl AimPose {
    pub fn new(position: Vector3<f32>, forward: Vector3<f32>) -> Self {
        let forward = if forward.magnitude2() > f32::EPSILON {
            forward.normalize()
        } else {
            vec3(0.0, 0.0, -1.0)
        };
        AimPose { position, forward }
    }

    pub fn from_pose(pose: &Pose) -> Self {
        Self::new(pose.position, pose.forward())
    }
}

/// One tracked controller: pose plus analog inputs.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Hand {
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    /// Trigger pull, 0.0..=1.0. Drives teleport aiming.
    pub trigger_value: f32,
    /// Grip squeeze, 0.0..=1.0. Drives grabbing.
    pub grip_value: f32,
}

impl Hand {
    pub fn pose(&self) -> Pose {
        Pose::new(self.position, self.rotation)
    }
}

impl Default for Hand {
    fn default() -> Self {
        Hand {
            position: vec3(0.0, 0.0, 0.0),
            rotation: Quaternion::one(),
            trigger_value: 0.0,
            grip_value: 0.0,
        }
    }
}

/// Everything the interaction layer reads in one tick.
#[derive(Clone, Copy, Debug, Default)]
pub struct InputContext {
    /// The manipulating hand; grabbed objects attach here.
    pub hand: Hand,
    /// The pointing pose; teleport, crosshair and remote sweeps
    /// originate here.
    pub aim: Hand,
    /// Viewer eye pose, used to billboard the crosshair.
    pub head: Pose,
}

impl InputContext {
    /// Build a context from both tracked controllers, using the
    /// configured dominant hand for interaction and aiming.
    pub fn from_hands(left: Hand, right: Hand, head: Pose, handedness: Handedness) -> Self {
        let dominant = match handedness {
            Handedness::Left => left,
            Handedness::Right => right,
        };
        InputContext {
            hand: dominant,
            aim: dominant,
            head,
        }
    }
}
