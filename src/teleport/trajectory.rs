use cgmath::Vector3;
use serde::{Deserialize, Serialize};

use crate::physics::{RayHit, SpatialQuery};

/// Which kind of path the teleport aim traces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceMode {
    /// Straight segment out to the configured range.
    Straight,
    /// Projectile arc under constant gravity.
    Curved,
}

/// Numeric inputs for a trace. All values are configuration, never
/// derived at runtime.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceParams {
    /// Length of the straight-mode segment.
    pub straight_range: f32,
    /// Initial speed of the curved-mode projectile.
    pub launch_power: f32,
    /// Downward acceleration magnitude applied to the vertical component.
    pub gravity: f32,
    /// Fixed integration step in seconds.
    pub sim_step: f32,
    /// Total sample cap for curved mode, including the origin.
    pub max_samples: usize,
}

impl Default for TraceParams {
    fn default() -> Self {
        Self {
            straight_range: 1000.0,
            launch_power: 1500.0,
            gravity: 5000.0,
            sim_step: 0.02,
            max_samples: 40,
        }
    }
}

/// Polyline produced by a single aim trace, rebuilt every tick while the
/// teleport aim is held.
///
/// `points` always starts at the origin and holds at least two entries;
/// `hit` is the obstruction that terminated the path, if any. The final
/// point coincides with `hit.point` when an obstruction was found.
#[derive(Clone, Debug)]
pub struct Trajectory {
    pub points: Vec<Vector3<f32>>,
    pub hit: Option<RayHit>,
}

impl Trajectory {
    /// Trace a path from `origin` along `forward`.
    ///
    /// `forward` must be normalized; aim poses guarantee this at
    /// construction.
    pub fn trace<W: SpatialQuery>(
        mode: TraceMode,
        origin: Vector3<f32>,
        forward: Vector3<f32>,
        params: &TraceParams,
        world: &W,
    ) -> Self {
        match mode {
            TraceMode::Straight => Self::trace_straight(origin, forward, params, world),
            TraceMode::Curved => Self::trace_curved(origin, forward, params, world),
        }
    }

    fn trace_straight<W: SpatialQuery>(
        origin: Vector3<f32>,
        forward: Vector3<f32>,
        params: &TraceParams,
        world: &W,
    ) -> Self {
        let end = origin + forward * params.straight_range;
        match world.ray_cast(origin, end) {
            Some(hit) => Trajectory {
                points: vec![origin, hit.point],
                hit: Some(hit),
            },
            None => Trajectory {
                points: vec![origin, end],
                hit: None,
            },
        }
    }

    fn trace_curved<W: SpatialQuery>(
        origin: Vector3<f32>,
        forward: Vector3<f32>,
        params: &TraceParams,
        world: &W,
    ) -> Self {
        let mut points = Vec::with_capacity(params.max_samples.max(2));
        let mut velocity = forward * params.launch_power;
        let mut position = origin;
        let mut hit = None;

        points.push(origin);
        while points.len() < params.max_samples.max(2) {
            let last = position;
            // v += g*dt, applied to the vertical component; p += v*dt
            velocity.y -= params.gravity * params.sim_step;
            position += velocity * params.sim_step;

            if let Some(obstruction) = world.ray_cast(last, position) {
                points.push(obstruction.point);
                hit = Some(obstruction);
                break;
            }
            points.push(position);
        }

        Trajectory { points, hit }
    }

    /// The terminal sample of the path.
    pub fn end_point(&self) -> Vector3<f32> {
        *self.points.last().expect("a trajectory is never empty")
    }
}
