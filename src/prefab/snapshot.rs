//! Per-node transform snapshots.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::scene::Transform;

/// Local position, euler rotation (degrees) and scale of one node.
///
/// Values are copied verbatim in both directions; angles are not
/// normalized. Reading a snapshot back from a [`Transform`] re-decomposes
/// its quaternion, so an angle triple may come back as a different but
/// equivalent triple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformSnapshot {
    pub position: [f32; 3],
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
}

impl Default for TransformSnapshot {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            rotation: [0.0; 3],
            scale: [1.0; 3],
        }
    }
}

impl TransformSnapshot {
    /// Capture the local transform of a node.
    pub fn capture(transform: &Transform) -> Self {
        Self {
            position: transform.position.to_array(),
            rotation: transform.euler_degrees().to_array(),
            scale: transform.scale.to_array(),
        }
    }

    /// Build the local transform this snapshot describes.
    pub fn to_transform(&self) -> Transform {
        Transform::from_components(
            Vec3::from_array(self.position),
            Vec3::from_array(self.rotation),
            Vec3::from_array(self.scale),
        )
    }

    /// Overwrite `transform` with this snapshot.
    pub fn apply_to(&self, transform: &mut Transform) {
        *transform = self.to_transform();
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position.to_array();
        self
    }

    pub fn with_rotation(mut self, degrees: Vec3) -> Self {
        self.rotation = degrees.to_array();
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale.to_array();
        self
    }

    pub fn is_finite(&self) -> bool {
        self.position
            .iter()
            .chain(&self.rotation)
            .chain(&self.scale)
            .all(|v| v.is_finite())
    }
}

impl From<&Transform> for TransformSnapshot {
    fn from(transform: &Transform) -> Self {
        Self::capture(transform)
    }
}
