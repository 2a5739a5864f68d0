use cgmath::{MetricSpace, VectorSpace};

use crate::physics::{ObjectHandle, Pose, RigidObjects};

use super::grab_system::GrabConfig;

/// Outcome of one frame of pulling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PullStatus {
    /// Still converging toward the hand.
    Pulling,
    /// Snapped to the target pose; the grab can be finalized.
    Arrived,
    /// The held reference was cleared or the body vanished; the task
    /// performed no further movement.
    Cancelled,
}

/// Timed task dragging a remotely grabbed object toward the hand.
///
/// The task owns only its own numbers plus the object handle; the held
/// reference and hand pose are passed in each tick so releasing the
/// object mid-flight is observed on the next scheduled step.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RemotePullTask {
    object: ObjectHandle,
    hold_offset: f32,
    pull_speed: f32,
    snap_threshold: f32,
    interval: f32,
    accumulator: f32,
}

impl RemotePullTask {
    pub(crate) fn new(object: ObjectHandle, config: &GrabConfig) -> Self {
        RemotePullTask {
            object,
            hold_offset: config.hold_offset,
            pull_speed: config.pull_speed,
            snap_threshold: config.snap_threshold,
            interval: config.pull_interval,
            accumulator: 0.0,
        }
    }

    pub(crate) fn object(&self) -> ObjectHandle {
        self.object
    }

    pub(crate) fn tick<W: RigidObjects>(
        &mut self,
        dt: f32,
        held: Option<ObjectHandle>,
        hand: &Pose,
        world: &mut W,
    ) -> PullStatus {
        self.accumulator += dt;
        let interval = if self.interval > 0.0 {
            self.interval
        } else {
            dt.max(f32::EPSILON)
        };
        while self.accumulator >= interval {
            self.accumulator -= interval;

            if held != Some(self.object) {
                return PullStatus::Cancelled;
            }
            let Some(pose) = world.object_pose(self.object) else {
                return PullStatus::Cancelled;
            };

            let target = hand.position + hand.forward() * self.hold_offset;
            let alpha = (self.pull_speed * interval).min(1.0);
            let position = pose.position.lerp(target, alpha);
            if position.distance(target) < self.snap_threshold {
                world.set_object_pose(
                    self.object,
                    Pose {
                        position: target,
                        rotation: pose.rotation,
                    },
                );
                return PullStatus::Arrived;
            }
            world.set_object_pose(
                self.object,
                Pose {
                    position,
                    rotation: pose.rotation,
                },
            );
        }
        PullStatus::Pulling
    }
}
