//! Template assets: data trees that resolvers turn into live instances.
//!
//! A [`TemplateAsset`] is a self-contained description of a node tree.
//! Instantiating it spawns fresh entities and tags the new root with a
//! [`TemplateLink`]. An asset root may carry [`NestedPrefab`] records, in
//! which case the instance is regenerated from them after placement.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use super::container::NestedPrefab;
use super::error::{PrefabError, PrefabResult};
use super::snapshot::TransformSnapshot;
use crate::scene::{self, children_of, is_alive, set_parent, NodeName, TemplateLink};

/// A stored template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateAsset {
    pub root: TemplateNode,
}

/// A single node within a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateNode {
    pub name: String,
    #[serde(default)]
    pub transform: TransformSnapshot,
    /// Set when this node is itself an instance of another template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    /// Saved nested prefab records carried by this node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested: Option<NestedPrefab>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TemplateNode>,
}

impl TemplateNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: TransformSnapshot::default(),
            template: None,
            nested: None,
            children: Vec::new(),
        }
    }

    pub fn with_transform(mut self, transform: TransformSnapshot) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_child(mut self, child: TemplateNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_nested(mut self, nested: NestedPrefab) -> Self {
        self.nested = Some(nested);
        self
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(TemplateNode::node_count).sum::<usize>()
    }

    fn spawn(&self, world: &mut World, parent: Option<Entity>) -> Entity {
        let entity = world
            .spawn((NodeName::new(self.name.clone()), self.transform.to_transform()))
            .id();
        if let Some(template) = &self.template {
            world.entity_mut(entity).insert(TemplateLink::new(template.clone()));
        }
        if let Some(nested) = &self.nested {
            world.entity_mut(entity).insert(nested.clone());
        }
        if let Some(parent) = parent {
            set_parent(world, entity, parent);
        }
        for child in &self.children {
            child.spawn(world, Some(entity));
        }
        entity
    }

    fn capture(world: &World, entity: Entity) -> Self {
        Self {
            name: scene::name_of(world, entity).to_string(),
            transform: TransformSnapshot::capture(&scene::transform_of(world, entity)),
            template: scene::template_path_of(world, entity).map(str::to_string),
            nested: world.get::<NestedPrefab>(entity).cloned(),
            children: children_of(world, entity)
                .into_iter()
                .map(|child| Self::capture(world, child))
                .collect(),
        }
    }
}

impl TemplateAsset {
    pub fn new(root: TemplateNode) -> Self {
        Self { root }
    }

    /// Capture the live subtree rooted at `root` as a new asset.
    pub fn capture(world: &World, root: Entity) -> PrefabResult<Self> {
        if !is_alive(world, root) {
            return Err(PrefabError::MissingAttachPoint(root));
        }
        let mut root_node = TemplateNode::capture(world, root);
        // The asset root is what gets linked on instantiation.
        root_node.template = None;
        Ok(Self { root: root_node })
    }

    /// Spawn a detached copy of this asset and link its root to `template_path`.
    pub fn instantiate(&self, world: &mut World, template_path: &str) -> Entity {
        let root = self.root.spawn(world, None);
        world.entity_mut(root).insert(TemplateLink::new(template_path));
        root
    }
}
