// Aim reticle.
//
// Every tick the crosshair is re-projected along the aim ray: placed at
// the first obstruction (or at max range), scaled with distance so its
// apparent size stays constant, and billboarded toward the viewer.

use cgmath::{InnerSpace, Matrix3, One, Quaternion, Vector3, vec3};
use serde::{Deserialize, Serialize};

use crate::input_context::AimPose;
use crate::physics::SpatialQuery;

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CrosshairConfig {
    /// Maximum reach of the aim ray.
    pub max_distance: f32,
}

impl Default for CrosshairConfig {
    fn default() -> Self {
        CrosshairConfig {
            max_distance: 10000.0,
        }
    }
}

/// World transform of the reticle marker.
#[derive(Clone, Copy, Debug)]
pub struct Crosshair {
    pub position: Vector3<f32>,
    pub scale: f32,
    pub rotation: Quaternion<f32>,
}

impl Default for Crosshair {
    fn default() -> Self {
        Crosshair {
            position: vec3(0.0, 0.0, 0.0),
            scale: 1.0,
            rotation: Quaternion::one(),
        }
    }
}

pub struct CrosshairSystem {
    config: CrosshairConfig,
    crosshair: Crosshair,
}

impl CrosshairSystem {
    pub fn new(config: CrosshairConfig) -> Self {
        CrosshairSystem {
            config,
            crosshair: Crosshair::default(),
        }
    }

    pub fn with_default_config() -> Self {
        Self::new(CrosshairConfig::default())
    }

    pub fn crosshair(&self) -> &Crosshair {
        &self.crosshair
    }

    pub fn update<W: SpatialQuery>(&mut self, aim: &AimPose, eye: Vector3<f32>, world: &W) {
        let end = aim.position + aim.forward * self.config.max_distance;
        let (position, distance) = match world.ray_cast(aim.position, end) {
            Some(hit) => (hit.point, hit.distance),
            None => (end, self.config.max_distance),
        };

        self.crosshair.position = position;
        self.crosshair.scale = distance.max(1.0);
        self.crosshair.rotation = facing_rotation(position - eye);
    }
}

/// Rotation whose forward (-Z) axis points along `direction`.
fn facing_rotation(direction: Vector3<f32>) -> Quaternion<f32> {
    if direction.magnitude2() <= f32::EPSILON {
        return Quaternion::one();
    }
    let forward = direction.normalize();
    let mut up = vec3(0.0, 1.0, 0.0);
    if forward.dot(up).abs() > 0.999 {
        // looking straight up or down; pick a stable alternate up
        up = vec3(0.0, 0.0, 1.0);
    }
    let z = -forward;
    let x = up.cross(z).normalize();
    let y = z.cross(x);
    Quaternion::from(Matrix3::from_cols(x, y, z))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::SurfaceFlags;
    use crate::testing::MockWorld;
    use cgmath::{MetricSpace, Rotation};

    fn aim_forward() -> AimPose {
        AimPose::new(vec3(0.0, 100.0, 0.0), vec3(0.0, 0.0, -1.0))
    }

    #[test]
    fn test_crosshair_sits_on_the_first_hit() {
        let mut world = MockWorld::new();
        world.add_sphere(vec3(0.0, 100.0, -500.0), 50.0, SurfaceFlags::WALL, false);
        let mut system = CrosshairSystem::with_default_config();

        system.update(&aim_forward(), vec3(0.0, 110.0, 0.0), &world);

        let crosshair = system.crosshair();
        assert!(crosshair.position.distance(vec3(0.0, 100.0, -450.0)) < 1e-3);
        assert!((crosshair.scale - 450.0).abs() < 1e-3);
    }

    #[test]
    fn test_crosshair_falls_back_to_max_range() {
        let world = MockWorld::new();
        let mut system = CrosshairSystem::with_default_config();

        system.update(&aim_forward(), vec3(0.0, 110.0, 0.0), &world);

        let crosshair = system.crosshair();
        assert_eq!(crosshair.position, vec3(0.0, 100.0, -10000.0));
        assert_eq!(crosshair.scale, 10000.0);
    }

    #[test]
    fn test_scale_never_drops_below_one() {
        let mut world = MockWorld::new();
        world.add_sphere(vec3(0.0, 100.0, -1.0), 0.5, SurfaceFlags::WALL, false);
        let mut system = CrosshairSystem::with_default_config();

        system.update(&aim_forward(), vec3(0.0, 100.0, 0.0), &world);

        assert_eq!(system.crosshair().scale, 1.0);
    }

    #[test]
    fn test_crosshair_billboards_toward_the_eye() {
        let mut world = MockWorld::new();
        world.add_sphere(vec3(0.0, 100.0, -500.0), 50.0, SurfaceFlags::WALL, false);
        let eye = vec3(30.0, 120.0, 10.0);
        let mut system = CrosshairSystem::with_default_config();

        system.update(&aim_forward(), eye, &world);

        let crosshair = system.crosshair();
        let expected = (crosshair.position - eye).normalize();
        let actual = crosshair.rotation.rotate_vector(vec3(0.0, 0.0, -1.0));
        assert!(expected.dot(actual) > 0.9999);
    }

    #[test]
    fn test_facing_rotation_handles_vertical_direction() {
        let rotation = facing_rotation(vec3(0.0, 1.0, 0.0));
        let forward = rotation.rotate_vector(vec3(0.0, 0.0, -1.0));
        assert!((forward - vec3(0.0, 1.0, 0.0)).magnitude() < 1e-4);
    }
}
