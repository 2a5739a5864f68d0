// Physics backing for the interaction layer.
//
// `PhysicsWorld` owns the rapier sets and pipelines and implements the
// three service traits the controllers consume: `SpatialQuery` (ray,
// overlap and sweep tests), `RigidObjects` (the capability surface of
// grabbable objects) and `PlayerBody` (the player capsule). Surface
// categories ride along in collider user data.

pub mod objects;
pub mod spatial_query;
pub mod util;

use cgmath::{Vector3, Zero};
use rapier3d::parry::query::ShapeCastOptions;
use rapier3d::prelude::*;

pub use objects::{ObjectHandle, PlayerBody, Pose, RigidObjects, SurfaceFlags};
pub use spatial_query::{RayHit, SpatialQuery, SweepHit};

use crate::physics_log;

/// Downward gravity for the live simulation, in world units (cm/s²).
const WORLD_GRAVITY: f32 = -980.0;

struct PlayerHandles {
    body: RigidBodyHandle,
    collider: ColliderHandle,
    half_height: f32,
}

pub struct PhysicsWorld {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: BroadPhaseMultiSap,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    player: Option<PlayerHandles>,
}

impl PhysicsWorld {
    pub fn new() -> Self {
        Self {
            gravity: vector![0.0, WORLD_GRAVITY, 0.0],
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: BroadPhaseMultiSap::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            player: None,
        }
    }

    /// Advance the simulation by `dt` seconds and refresh the query
    /// acceleration structure.
    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    /// Refresh spatial queries without stepping the simulation. Needed
    /// after spawning or manually repositioning bodies.
    pub fn update_queries(&mut self) {
        self.query_pipeline.update(&self.bodies, &self.colliders);
    }

    /// Spawn the player as a kinematic capsule. Replaces any previous
    /// player body.
    pub fn spawn_player(&mut self, position: Vector3<f32>, half_height: f32, radius: f32) {
        if let Some(previous) = self.player.take() {
            self.bodies.remove(
                previous.body,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            );
        }
        let body = RigidBodyBuilder::kinematic_position_based()
            .translation(util::vec_to_nvec(position))
            .build();
        let body = self.bodies.insert(body);
        let collider = ColliderBuilder::capsule_y((half_height - radius).max(0.01), radius).build();
        let collider = self
            .colliders
            .insert_with_parent(collider, body, &mut self.bodies);
        self.player = Some(PlayerHandles {
            body,
            collider,
            half_height,
        });
        physics_log!(debug, "player capsule spawned at {position:?}");
    }

    /// Spawn an immovable cuboid (floors, walls).
    pub fn spawn_fixed(
        &mut self,
        position: Vector3<f32>,
        half_extents: Vector3<f32>,
        flags: SurfaceFlags,
    ) -> ObjectHandle {
        let body = RigidBodyBuilder::fixed()
            .translation(util::vec_to_nvec(position))
            .build();
        let handle = self.bodies.insert(body);
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .user_data(flags.bits() as u128)
            .build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);
        handle
    }

    /// Spawn a dynamic cuboid prop.
    pub fn spawn_dynamic(
        &mut self,
        position: Vector3<f32>,
        half_extents: Vector3<f32>,
        flags: SurfaceFlags,
    ) -> ObjectHandle {
        let body = RigidBodyBuilder::dynamic()
            .translation(util::vec_to_nvec(position))
            .build();
        let handle = self.bodies.insert(body);
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .user_data(flags.bits() as u128)
            .build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);
        handle
    }

    fn base_filter(&self) -> QueryFilter<'_> {
        let mut filter = QueryFilter::default();
        if let Some(player) = &self.player {
            filter = filter.exclude_rigid_body(player.body);
        }
        filter
    }

    fn collider_body(&self, collider: ColliderHandle) -> Option<RigidBodyHandle> {
        self.colliders.get(collider).and_then(|c| c.parent())
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SpatialQuery for PhysicsWorld {
    fn ray_cast(&self, from: Vector3<f32>, to: Vector3<f32>) -> Option<RayHit> {
        let delta = to - from;
        let length = cgmath::InnerSpace::magnitude(delta);
        if length <= f32::EPSILON {
            return None;
        }
        let ray = Ray::new(util::vec_to_npoint(from), util::vec_to_nvec(delta / length));
        let (collider, toi) = self.query_pipeline.cast_ray(
            &self.bodies,
            &self.colliders,
            &ray,
            length,
            true,
            self.base_filter(),
        )?;
        let object = self.collider_body(collider)?;
        Some(RayHit {
            point: util::npoint_to_cgvec(ray.point_at(toi)),
            object,
            distance: toi,
        })
    }

    fn sphere_overlap(
        &self,
        center: Vector3<f32>,
        radius: f32,
        exclude: &[ObjectHandle],
    ) -> Vec<ObjectHandle> {
        let shape = Ball::new(radius);
        let position = Isometry::translation(center.x, center.y, center.z);
        let mut overlapped = Vec::new();
        self.query_pipeline.intersections_with_shape(
            &self.bodies,
            &self.colliders,
            &position,
            &shape,
            self.base_filter(),
            |collider| {
                if let Some(body) = self.collider_body(collider) {
                    if !exclude.contains(&body) && !overlapped.contains(&body) {
                        overlapped.push(body);
                    }
                }
                true
            },
        );
        overlapped
    }

    fn sphere_sweep(
        &self,
        from: Vector3<f32>,
        to: Vector3<f32>,
        radius: f32,
        exclude: &[ObjectHandle],
    ) -> Option<SweepHit> {
        let delta = to - from;
        if cgmath::InnerSpace::magnitude2(delta) <= f32::EPSILON {
            return None;
        }
        let shape = Ball::new(radius);
        let position = Isometry::translation(from.x, from.y, from.z);
        let velocity = util::vec_to_nvec(delta);
        let options = ShapeCastOptions {
            max_time_of_impact: 1.0,
            target_distance: 0.0,
            stop_at_penetration: true,
            compute_impact_geometry_on_penetration: true,
        };
        let allow = |_handle: ColliderHandle, collider: &Collider| -> bool {
            collider
                .parent()
                .map_or(true, |body| !exclude.contains(&body))
        };
        let filter = self.base_filter().predicate(&allow);
        let (collider, hit) = self.query_pipeline.cast_shape(
            &self.bodies,
            &self.colliders,
            &position,
            &velocity,
            &shape,
            options,
            filter,
        )?;
        let object = self.collider_body(collider)?;
        Some(SweepHit {
            point: from + delta * hit.time_of_impact,
            object,
        })
    }
}

impl RigidObjects for PhysicsWorld {
    fn is_simulating_physics(&self, object: ObjectHandle) -> bool {
        self.bodies.get(object).is_some_and(|body| body.is_dynamic())
    }

    fn set_simulating_physics(&mut self, object: ObjectHandle, enabled: bool) {
        if let Some(body) = self.bodies.get_mut(object) {
            let body_type = if enabled {
                RigidBodyType::Dynamic
            } else {
                RigidBodyType::KinematicPositionBased
            };
            body.set_body_type(body_type, true);
        }
    }

    fn set_collision_enabled(&mut self, object: ObjectHandle, enabled: bool) {
        let handles: Vec<ColliderHandle> = self
            .bodies
            .get(object)
            .map(|body| body.colliders().to_vec())
            .unwrap_or_default();
        for handle in handles {
            if let Some(collider) = self.colliders.get_mut(handle) {
                collider.set_enabled(enabled);
            }
        }
    }

    fn apply_impulse(&mut self, object: ObjectHandle, impulse: Vector3<f32>) {
        if let Some(body) = self.bodies.get_mut(object) {
            body.apply_impulse(util::vec_to_nvec(impulse), true);
        }
    }

    fn set_angular_velocity(&mut self, object: ObjectHandle, velocity: Vector3<f32>) {
        if let Some(body) = self.bodies.get_mut(object) {
            body.set_angvel(util::vec_to_nvec(velocity), true);
        }
    }

    fn mass(&self, object: ObjectHandle) -> f32 {
        self.bodies.get(object).map_or(0.0, |body| body.mass())
    }

    fn object_pose(&self, object: ObjectHandle) -> Option<Pose> {
        let body = self.bodies.get(object)?;
        Some(Pose::new(
            util::nvec_to_cgmath(*body.translation()),
            util::nquat_to_quat(*body.rotation()),
        ))
    }

    fn set_object_pose(&mut self, object: ObjectHandle, pose: Pose) {
        if let Some(body) = self.bodies.get_mut(object) {
            body.set_translation(util::vec_to_nvec(pose.position), true);
            body.set_rotation(util::quat_to_nquat(pose.rotation), true);
        }
    }

    fn surface_flags(&self, object: ObjectHandle) -> SurfaceFlags {
        self.bodies
            .get(object)
            .and_then(|body| body.colliders().first())
            .and_then(|handle| self.colliders.get(*handle))
            .map_or(SurfaceFlags::empty(), |collider| {
                SurfaceFlags::from_bits_truncate(collider.user_data as u32)
            })
    }
}

impl PlayerBody for PhysicsWorld {
    fn player_position(&self) -> Vector3<f32> {
        self.player
            .as_ref()
            .and_then(|player| self.bodies.get(player.body))
            .map_or(Vector3::zero(), |body| {
                util::nvec_to_cgmath(*body.translation())
            })
    }

    fn set_player_position(&mut self, position: Vector3<f32>) {
        if let Some(player) = &self.player {
            if let Some(body) = self.bodies.get_mut(player.body) {
                body.set_translation(util::vec_to_nvec(position), true);
            }
        }
    }

    fn set_player_collision_enabled(&mut self, enabled: bool) {
        if let Some(player) = &self.player {
            if let Some(collider) = self.colliders.get_mut(player.collider) {
                collider.set_enabled(enabled);
            }
        }
    }

    fn player_collision_half_height(&self) -> f32 {
        self.player.as_ref().map_or(0.0, |player| player.half_height)
    }
}
