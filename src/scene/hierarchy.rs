//! Parent-child hierarchy operations.
//!
//! Provides functions for managing node relationships in a [`World`]. All
//! operations keep [`Parent`] and [`Children`] consistent with each other.
//!
//! # Usage
//!
//! ```ignore
//! let group = spawn_group(&mut world, "Props", Some(root));
//! set_parent(&mut world, child, group);
//! despawn_children(&mut world, root);
//! ```

use bevy_ecs::prelude::*;

use super::{NodeName, Transform};

/// Marks an entity as a child of another entity.
///
/// Use [`set_parent`] to set up parent-child relationships (it updates both
/// `Parent` and [`Children`] components).
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parent(pub Entity);

/// Stores the ordered list of child entities.
///
/// Managed by [`set_parent`] and [`remove_parent`]; sibling order is the
/// order children were attached in.
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct Children(pub Vec<Entity>);

/// Returns `true` if `entity` is alive in `world`.
pub fn is_alive(world: &World, entity: Entity) -> bool {
    world.entities().contains(entity)
}

/// Spawns an empty group node with a name and identity transform.
///
/// When `parent` is given the node is attached as its last child.
pub fn spawn_group(world: &mut World, name: impl Into<String>, parent: Option<Entity>) -> Entity {
    let entity = world
        .spawn((NodeName::new(name), Transform::IDENTITY))
        .id();
    if let Some(parent) = parent {
        set_parent(world, entity, parent);
    }
    entity
}

/// Sets `entity` as the last child of `parent`.
///
/// Updates both the [`Parent`] component on `entity` and the [`Children`]
/// component on `parent`. If `entity` already has a different parent,
/// it is removed from the old parent's children first.
///
/// # Panics
///
/// Panics if `entity == parent` (cannot parent to self).
pub fn set_parent(world: &mut World, entity: Entity, parent: Entity) {
    assert_ne!(entity, parent, "cannot set entity as its own parent: {entity}");

    if let Some(old_parent) = world.get::<Parent>(entity).map(|p| p.0) {
        if old_parent == parent {
            return;
        }
        if let Some(mut children) = world.get_mut::<Children>(old_parent) {
            children.0.retain(|&e| e != entity);
        }
    }

    world.entity_mut(entity).insert(Parent(parent));

    if let Some(mut children) = world.get_mut::<Children>(parent) {
        if !children.0.contains(&entity) {
            children.0.push(entity);
        }
    } else {
        world.entity_mut(parent).insert(Children(vec![entity]));
    }
}

/// Removes the parent relationship from `entity`.
///
/// Does nothing if `entity` has no parent.
pub fn remove_parent(world: &mut World, entity: Entity) {
    let Some(parent) = world.entity_mut(entity).take::<Parent>() else {
        return;
    };

    if let Some(mut children) = world.get_mut::<Children>(parent.0) {
        children.0.retain(|&e| e != entity);
    }
}

/// Returns a copy of the children of `entity` in sibling order.
pub fn children_of(world: &World, entity: Entity) -> Vec<Entity> {
    world
        .get::<Children>(entity)
        .map(|c| c.0.clone())
        .unwrap_or_default()
}

/// Despawns an entity and all its descendants recursively.
///
/// First detaches the entity from its parent's children list (if any),
/// then despawns the entity and all its descendants.
pub fn despawn_recursive(world: &mut World, entity: Entity) {
    if !is_alive(world, entity) {
        return;
    }
    remove_parent(world, entity);
    despawn_subtree(world, entity);
}

/// Despawns every descendant of `entity`, leaving `entity` itself alive.
///
/// Returns the number of direct children that were removed.
pub fn despawn_children(world: &mut World, entity: Entity) -> usize {
    let child_entities = world
        .entity_mut(entity)
        .take::<Children>()
        .map(|c| c.0)
        .unwrap_or_default();

    let count = child_entities.len();
    // Reverse sibling order, last child first.
    for child in child_entities.into_iter().rev() {
        despawn_subtree(world, child);
    }
    count
}

fn despawn_subtree(world: &mut World, entity: Entity) {
    let mut pending = vec![entity];
    while let Some(entity) = pending.pop() {
        if !is_alive(world, entity) {
            continue;
        }
        if let Some(children) = world.entity_mut(entity).take::<Children>() {
            pending.extend(children.0);
        }
        world.despawn(entity);
    }
}
