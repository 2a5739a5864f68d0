// Deterministic in-memory world for unit tests: spheres plus an optional
// ground plane, with recorded mutations so tests can assert on applied
// impulses and collision toggles.

use cgmath::{InnerSpace, One, Quaternion, Vector3, Zero, vec3};

use crate::physics::{
    ObjectHandle, PlayerBody, Pose, RayHit, RigidObjects, SpatialQuery, SurfaceFlags, SweepHit,
};

pub(crate) struct MockObject {
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub radius: f32,
    pub flags: SurfaceFlags,
    pub simulating: bool,
    pub collision: bool,
    pub mass: f32,
    pub alive: bool,
    pub impulses: Vec<Vector3<f32>>,
    pub angular_velocities: Vec<Vector3<f32>>,
}

pub(crate) struct MockWorld {
    objects: Vec<(ObjectHandle, MockObject)>,
    ground: Option<(f32, ObjectHandle)>,
    next_id: u32,
    pub player_position: Vector3<f32>,
    pub player_half_height: f32,
    pub player_collision_enabled: bool,
    /// Every `set_player_collision_enabled` call, in order.
    pub collision_enable_events: Vec<bool>,
}

impl MockWorld {
    pub fn new() -> Self {
        MockWorld {
            objects: Vec::new(),
            ground: None,
            next_id: 0,
            player_position: Vector3::zero(),
            player_half_height: 90.0,
            player_collision_enabled: true,
            collision_enable_events: Vec::new(),
        }
    }

    fn mint_handle(&mut self) -> ObjectHandle {
        let handle = ObjectHandle::from_raw_parts(self.next_id, 0);
        self.next_id += 1;
        handle
    }

    pub fn add_sphere(
        &mut self,
        position: Vector3<f32>,
        radius: f32,
        flags: SurfaceFlags,
        simulating: bool,
    ) -> ObjectHandle {
        let handle = self.mint_handle();
        self.objects.push((
            handle,
            MockObject {
                position,
                rotation: Quaternion::one(),
                radius,
                flags,
                simulating,
                collision: true,
                mass: 1.0,
                alive: true,
                impulses: Vec::new(),
                angular_velocities: Vec::new(),
            },
        ));
        handle
    }

    /// Infinite horizontal plane at height `y`, flagged as ground.
    pub fn add_ground_plane(&mut self, y: f32) -> ObjectHandle {
        let handle = self.mint_handle();
        self.objects.push((
            handle,
            MockObject {
                position: vec3(0.0, y, 0.0),
                rotation: Quaternion::one(),
                radius: 0.0,
                flags: SurfaceFlags::GROUND,
                simulating: false,
                collision: true,
                mass: 0.0,
                alive: true,
                impulses: Vec::new(),
                angular_velocities: Vec::new(),
            },
        ));
        self.ground = Some((y, handle));
        handle
    }

    pub fn object(&self, handle: ObjectHandle) -> &MockObject {
        &self
            .objects
            .iter()
            .find(|(h, _)| *h == handle)
            .expect("unknown mock object")
            .1
    }

    pub fn object_mut(&mut self, handle: ObjectHandle) -> &mut MockObject {
        &mut self
            .objects
            .iter_mut()
            .find(|(h, _)| *h == handle)
            .expect("unknown mock object")
            .1
    }

    fn get(&self, handle: ObjectHandle) -> Option<&MockObject> {
        self.objects
            .iter()
            .find(|(h, _)| *h == handle)
            .map(|(_, object)| object)
            .filter(|object| object.alive)
    }

    fn get_mut(&mut self, handle: ObjectHandle) -> Option<&mut MockObject> {
        self.objects
            .iter_mut()
            .find(|(h, _)| *h == handle)
            .map(|(_, object)| object)
            .filter(|object| object.alive)
    }
}

/// Smallest positive `t` at which `from + dir * t` touches the sphere,
/// within `max_t`; `dir` must be a unit vector.
fn ray_sphere(
    from: Vector3<f32>,
    dir: Vector3<f32>,
    max_t: f32,
    center: Vector3<f32>,
    radius: f32,
) -> Option<f32> {
    let m = from - center;
    let b = m.dot(dir);
    let c = m.dot(m) - radius * radius;
    if c > 0.0 && b > 0.0 {
        return None;
    }
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let t = (-b - discriminant.sqrt()).max(0.0);
    (t <= max_t).then_some(t)
}

impl SpatialQuery for MockWorld {
    fn ray_cast(&self, from: Vector3<f32>, to: Vector3<f32>) -> Option<RayHit> {
        let delta = to - from;
        let length = delta.magnitude();
        if length <= f32::EPSILON {
            return None;
        }
        let dir = delta / length;

        let mut best: Option<RayHit> = None;
        for (handle, object) in &self.objects {
            if !object.alive || !object.collision || object.radius <= 0.0 {
                continue;
            }
            if let Some(t) = ray_sphere(from, dir, length, object.position, object.radius) {
                if best.as_ref().is_none_or(|hit| t < hit.distance) {
                    best = Some(RayHit {
                        point: from + dir * t,
                        object: *handle,
                        distance: t,
                    });
                }
            }
        }
        if let Some((y, handle)) = self.ground {
            if dir.y.abs() > f32::EPSILON {
                let t = (y - from.y) / dir.y;
                if t >= 0.0
                    && t <= length
                    && best.as_ref().is_none_or(|hit| t < hit.distance)
                {
                    best = Some(RayHit {
                        point: from + dir * t,
                        object: handle,
                        distance: t,
                    });
                }
            }
        }
        best
    }

    fn sphere_overlap(
        &self,
        center: Vector3<f32>,
        radius: f32,
        exclude: &[ObjectHandle],
    ) -> Vec<ObjectHandle> {
        self.objects
            .iter()
            .filter(|(handle, object)| {
                object.alive
                    && object.collision
                    && object.radius > 0.0
                    && !exclude.contains(handle)
                    && (object.position - center).magnitude() <= radius + object.radius
            })
            .map(|(handle, _)| *handle)
            .collect()
    }

    fn sphere_sweep(
        &self,
        from: Vector3<f32>,
        to: Vector3<f32>,
        radius: f32,
        exclude: &[ObjectHandle],
    ) -> Option<SweepHit> {
        let delta = to - from;
        let length = delta.magnitude();
        if length <= f32::EPSILON {
            return None;
        }
        let dir = delta / length;

        let mut best: Option<(f32, SweepHit)> = None;
        for (handle, object) in &self.objects {
            if !object.alive
                || !object.collision
                || object.radius <= 0.0
                || exclude.contains(handle)
            {
                continue;
            }
            let inflated = object.radius + radius;
            if let Some(t) = ray_sphere(from, dir, length, object.position, inflated) {
                if best.as_ref().is_none_or(|(best_t, _)| t < *best_t) {
                    best = Some((
                        t,
                        SweepHit {
                            point: from + dir * t,
                            object: *handle,
                        },
                    ));
                }
            }
        }
        best.map(|(_, hit)| hit)
    }
}

impl RigidObjects for MockWorld {
    fn is_simulating_physics(&self, object: ObjectHandle) -> bool {
        self.get(object).is_some_and(|o| o.simulating)
    }

    fn set_simulating_physics(&mut self, object: ObjectHandle, enabled: bool) {
        if let Some(o) = self.get_mut(object) {
            o.simulating = enabled;
        }
    }

    fn set_collision_enabled(&mut self, object: ObjectHandle, enabled: bool) {
        if let Some(o) = self.get_mut(object) {
            o.collision = enabled;
        }
    }

    fn apply_impulse(&mut self, object: ObjectHandle, impulse: Vector3<f32>) {
        if let Some(o) = self.get_mut(object) {
            o.impulses.push(impulse);
        }
    }

    fn set_angular_velocity(&mut self, object: ObjectHandle, velocity: Vector3<f32>) {
        if let Some(o) = self.get_mut(object) {
            o.angular_velocities.push(velocity);
        }
    }

    fn mass(&self, object: ObjectHandle) -> f32 {
        self.get(object).map_or(0.0, |o| o.mass)
    }

    fn object_pose(&self, object: ObjectHandle) -> Option<Pose> {
        self.get(object).map(|o| Pose::new(o.position, o.rotation))
    }

    fn set_object_pose(&mut self, object: ObjectHandle, pose: Pose) {
        if let Some(o) = self.get_mut(object) {
            o.position = pose.position;
            o.rotation = pose.rotation;
        }
    }

    fn surface_flags(&self, object: ObjectHandle) -> SurfaceFlags {
        self.get(object).map_or(SurfaceFlags::empty(), |o| o.flags)
    }
}

impl PlayerBody for MockWorld {
    fn player_position(&self) -> Vector3<f32> {
        self.player_position
    }

    fn set_player_position(&mut self, position: Vector3<f32>) {
        self.player_position = position;
    }

    fn set_player_collision_enabled(&mut self, enabled: bool) {
        self.player_collision_enabled = enabled;
        self.collision_enable_events.push(enabled);
    }

    fn player_collision_half_height(&self) -> f32 {
        self.player_half_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_hits_nearest_sphere_first() {
        let mut world = MockWorld::new();
        let far = world.add_sphere(vec3(0.0, 0.0, -200.0), 10.0, SurfaceFlags::PROP, true);
        let near = world.add_sphere(vec3(0.0, 0.0, -100.0), 10.0, SurfaceFlags::PROP, true);

        let hit = world
            .ray_cast(vec3(0.0, 0.0, 0.0), vec3(0.0, 0.0, -300.0))
            .unwrap();
        assert_eq!(hit.object, near);
        assert!((hit.distance - 90.0).abs() < 1e-3);

        world.object_mut(near).collision = false;
        let hit = world
            .ray_cast(vec3(0.0, 0.0, 0.0), vec3(0.0, 0.0, -300.0))
            .unwrap();
        assert_eq!(hit.object, far);
    }

    #[test]
    fn test_ground_plane_intersection() {
        let mut world = MockWorld::new();
        let ground = world.add_ground_plane(10.0);

        let hit = world
            .ray_cast(vec3(0.0, 100.0, 0.0), vec3(0.0, -100.0, 0.0))
            .unwrap();
        assert_eq!(hit.object, ground);
        assert_eq!(hit.point.y, 10.0);
    }

    #[test]
    fn test_overlap_respects_exclusions() {
        let mut world = MockWorld::new();
        let a = world.add_sphere(vec3(0.0, 0.0, 10.0), 5.0, SurfaceFlags::PROP, true);
        let b = world.add_sphere(vec3(0.0, 0.0, -10.0), 5.0, SurfaceFlags::PROP, true);

        let all = world.sphere_overlap(Vector3::zero(), 50.0, &[]);
        assert_eq!(all, vec![a, b]);
        let filtered = world.sphere_overlap(Vector3::zero(), 50.0, &[a]);
        assert_eq!(filtered, vec![b]);
    }
}
