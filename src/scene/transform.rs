//! Local transform component

use bevy_ecs::prelude::*;
use glam::{EulerRot, Quat, Vec3};

/// Euler order used when converting rotations to and from angle triples.
pub const EULER_ORDER: EulerRot = EulerRot::XYZ;

/// Transform of a node relative to its parent
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn from_position_scale(position: Vec3, scale: Vec3) -> Self {
        Self {
            position,
            scale,
            ..Default::default()
        }
    }

    /// Create transform from position, rotation (euler angles in degrees), and scale
    pub fn from_components(position: Vec3, rotation_degrees: Vec3, scale: Vec3) -> Self {
        let mut transform = Self {
            position,
            scale,
            ..Default::default()
        };
        transform.set_euler_degrees(rotation_degrees);
        transform
    }

    /// Rotation decomposed into euler angles, in degrees.
    ///
    /// The quaternion is re-decomposed on every call, so the returned triple
    /// may differ from the one last passed to [`set_euler_degrees`](Self::set_euler_degrees)
    /// while describing the same orientation.
    pub fn euler_degrees(&self) -> Vec3 {
        let (x, y, z) = self.rotation.to_euler(EULER_ORDER);
        Vec3::new(x.to_degrees(), y.to_degrees(), z.to_degrees())
    }

    pub fn set_euler_degrees(&mut self, degrees: Vec3) {
        self.rotation = Quat::from_euler(
            EULER_ORDER,
            degrees.x.to_radians(),
            degrees.y.to_radians(),
            degrees.z.to_radians(),
        );
    }

    /// Whether two transforms describe the same placement within `epsilon`.
    ///
    /// Rotations are compared as orientations, so `q` and `-q` are equal.
    pub fn approx_eq(&self, other: &Transform, epsilon: f32) -> bool {
        self.position.abs_diff_eq(other.position, epsilon)
            && self.scale.abs_diff_eq(other.scale, epsilon)
            && self.rotation.dot(other.rotation).abs() >= 1.0 - epsilon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_identity() {
        let t = Transform::default();
        assert_eq!(t, Transform::IDENTITY);
        assert_eq!(t.euler_degrees(), Vec3::ZERO);
    }

    #[test]
    fn euler_degrees_round_trip() {
        let t = Transform::from_components(Vec3::ZERO, Vec3::new(10.0, 20.0, 30.0), Vec3::ONE);
        let euler = t.euler_degrees();
        assert!(euler.abs_diff_eq(Vec3::new(10.0, 20.0, 30.0), 1e-3));
    }

    #[test]
    fn equivalent_rotations_compare_equal() {
        let a = Transform::from_components(Vec3::ZERO, Vec3::new(0.0, 90.0, 0.0), Vec3::ONE);
        let mut b = a;
        b.rotation = -b.rotation;
        assert!(a.approx_eq(&b, 1e-5));
    }
}
