//! Scene graph management
//!
//! The live tree is a [`World`] whose entities carry a [`NodeName`], a local
//! [`Transform`] and [`Parent`]/[`Children`] links. Roots of template
//! instances are tagged with [`TemplateLink`].

mod hierarchy;
mod transform;

pub use hierarchy::*;
pub use transform::*;

use bevy_ecs::prelude::*;

/// Display name of a scene node.
#[derive(Component, Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodeName(pub String);

impl NodeName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Marks the root of an instantiated template.
///
/// Holds the identifier the instance was generated from. Nodes below the
/// tagged root belong to the template and are never flattened.
#[derive(Component, Debug, Clone, PartialEq, Eq, Hash)]
pub struct TemplateLink {
    pub template_path: String,
}

impl TemplateLink {
    pub fn new(template_path: impl Into<String>) -> Self {
        Self {
            template_path: template_path.into(),
        }
    }
}

/// Returns the template identifier `entity` was instantiated from, if any.
pub fn template_path_of(world: &World, entity: Entity) -> Option<&str> {
    world
        .get::<TemplateLink>(entity)
        .map(|link| link.template_path.as_str())
}

/// Returns the node name, or an empty string for unnamed nodes.
pub fn name_of(world: &World, entity: Entity) -> &str {
    world.get::<NodeName>(entity).map_or("", NodeName::as_str)
}

/// Returns the local transform, or identity for nodes without one.
pub fn transform_of(world: &World, entity: Entity) -> Transform {
    world.get::<Transform>(entity).copied().unwrap_or_default()
}

/// Overwrites the local transform of `entity`.
pub fn set_transform(world: &mut World, entity: Entity, transform: Transform) {
    world.entity_mut(entity).insert(transform);
}
