use cgmath::Vector3;

use super::objects::ObjectHandle;

/// A ray obstruction: where the ray stopped, what it stopped on, and how
/// far along the ray that happened.
#[derive(Clone, Copy, Debug)]
pub struct RayHit {
    pub point: Vector3<f32>,
    pub object: ObjectHandle,
    pub distance: f32,
}

/// A swept-sphere obstruction. `point` is the sphere center at impact.
#[derive(Clone, Copy, Debug)]
pub struct SweepHit {
    pub point: Vector3<f32>,
    pub object: ObjectHandle,
}

/// Thin query contract over the physics world.
///
/// Implementations always exclude the player's own body; the `exclude`
/// lists carry additional per-call exclusions such as the tracked hand
/// bodies.
pub trait SpatialQuery {
    /// First obstruction along the segment `from..to`, if any.
    fn ray_cast(&self, from: Vector3<f32>, to: Vector3<f32>) -> Option<RayHit>;

    /// All objects whose collision volume intersects the sphere.
    fn sphere_overlap(
        &self,
        center: Vector3<f32>,
        radius: f32,
        exclude: &[ObjectHandle],
    ) -> Vec<ObjectHandle>;

    /// Sweep a sphere along `from..to`, returning the first obstruction.
    fn sphere_sweep(
        &self,
        from: Vector3<f32>,
        to: Vector3<f32>,
        radius: f32,
        exclude: &[ObjectHandle],
    ) -> Option<SweepHit>;
}
