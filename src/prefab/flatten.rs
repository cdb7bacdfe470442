//! Flattening a live tree into group and template records.
//!
//! The walk is depth-first and pre-order. Plain nodes become
//! [`GroupNodeRecord`]s and are descended into; nodes tagged with a
//! [`TemplateLink`](crate::scene::TemplateLink) become
//! [`TemplateInstanceRecord`]s and their subtree is skipped.

use bevy_ecs::prelude::*;

use super::error::{PrefabError, PrefabResult};
use super::records::{GroupNodeRecord, IdAllocator, TemplateInstanceRecord, ROOT_ID};
use super::snapshot::TransformSnapshot;
use crate::scene::{self, children_of, is_alive};

/// Records produced by one flatten pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlattenOutput {
    pub groups: Vec<GroupNodeRecord>,
    pub templates: Vec<TemplateInstanceRecord>,
}

/// Flatten the descendants of `root` into records.
///
/// `root` itself is not recorded; its direct children get parent id
/// [`ROOT_ID`]. Ids are allocated fresh for every call, starting at `1`.
pub fn flatten(world: &World, root: Entity, separator: &str) -> PrefabResult<FlattenOutput> {
    if !is_alive(world, root) {
        return Err(PrefabError::MissingAttachPoint(root));
    }

    let mut ids = IdAllocator::new();
    let mut output = FlattenOutput::default();

    // (node, breadcrumb of its parent, parent id). Children are pushed in
    // reverse so they pop in sibling order.
    let mut stack: Vec<(Entity, String, u32)> = children_of(world, root)
        .into_iter()
        .rev()
        .map(|child| (child, String::new(), ROOT_ID))
        .collect();

    while let Some((node, hierarchy_path, parent_id)) = stack.pop() {
        let transform = TransformSnapshot::capture(&scene::transform_of(world, node));

        if let Some(template_path) = scene::template_path_of(world, node) {
            log::debug!("Template '{template_path}' under {hierarchy_path:?}");
            output.templates.push(TemplateInstanceRecord {
                template_path: template_path.to_string(),
                hierarchy_path,
                parent_id,
                transform,
            });
            continue;
        }

        let name = scene::name_of(world, node);
        let id = ids.next_id();
        let child_path = format!("{hierarchy_path}{separator}{name}");
        output.groups.push(GroupNodeRecord {
            id,
            name: name.to_string(),
            hierarchy_path,
            parent_id,
            transform,
        });

        stack.extend(
            children_of(world, node)
                .into_iter()
                .rev()
                .map(|child| (child, child_path.clone(), id)),
        );
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_PATH_SEPARATOR;
    use crate::scene::{set_parent, spawn_group, NodeName, TemplateLink, Transform};
    use glam::Vec3;

    fn spawn_template(world: &mut World, path: &str, parent: Entity) -> Entity {
        let e = world
            .spawn((NodeName::new("instance"), Transform::IDENTITY, TemplateLink::new(path)))
            .id();
        set_parent(world, e, parent);
        e
    }

    #[test]
    fn empty_root_yields_no_records() {
        let mut world = World::new();
        let root = spawn_group(&mut world, "root", None);

        let out = flatten(&world, root, DEFAULT_PATH_SEPARATOR).unwrap();
        assert!(out.groups.is_empty());
        assert!(out.templates.is_empty());
    }

    #[test]
    fn ids_follow_pre_order() {
        let mut world = World::new();
        let root = spawn_group(&mut world, "root", None);
        let a = spawn_group(&mut world, "A", Some(root));
        spawn_group(&mut world, "A1", Some(a));
        spawn_group(&mut world, "A2", Some(a));
        spawn_group(&mut world, "B", Some(root));

        let out = flatten(&world, root, DEFAULT_PATH_SEPARATOR).unwrap();
        let summary: Vec<_> = out
            .groups
            .iter()
            .map(|g| (g.id, g.name.as_str(), g.parent_id))
            .collect();
        assert_eq!(
            summary,
            vec![(1, "A", 0), (2, "A1", 1), (3, "A2", 1), (4, "B", 0)]
        );
    }

    #[test]
    fn breadcrumbs_use_separator() {
        let mut world = World::new();
        let root = spawn_group(&mut world, "root", None);
        let a = spawn_group(&mut world, "A", Some(root));
        let b = spawn_group(&mut world, "B", Some(a));
        spawn_template(&mut world, "Templates/Box", b);

        let out = flatten(&world, root, "/").unwrap();
        assert_eq!(out.groups[0].hierarchy_path, "");
        assert_eq!(out.groups[1].hierarchy_path, "/A");
        assert_eq!(out.templates[0].hierarchy_path, "/A/B");
    }

    #[test]
    fn template_children_are_not_flattened() {
        let mut world = World::new();
        let root = spawn_group(&mut world, "root", None);
        let instance = spawn_template(&mut world, "Templates/House", root);
        let hidden = spawn_group(&mut world, "Rooms", Some(instance));
        let deeper = spawn_group(&mut world, "Kitchen", Some(hidden));
        spawn_template(&mut world, "Templates/Chair", deeper);

        let out = flatten(&world, root, DEFAULT_PATH_SEPARATOR).unwrap();
        assert!(out.groups.is_empty());
        assert_eq!(out.templates.len(), 1);
        assert_eq!(out.templates[0].template_path, "Templates/House");
    }

    #[test]
    fn transforms_are_captured() {
        let mut world = World::new();
        let root = spawn_group(&mut world, "root", None);
        let a = spawn_group(&mut world, "A", Some(root));
        scene::set_transform(
            &mut world,
            a,
            Transform::from_position_scale(Vec3::new(1.0, 2.0, 3.0), Vec3::splat(0.5)),
        );

        let out = flatten(&world, root, DEFAULT_PATH_SEPARATOR).unwrap();
        assert_eq!(out.groups[0].transform.position, [1.0, 2.0, 3.0]);
        assert_eq!(out.groups[0].transform.scale, [0.5, 0.5, 0.5]);
    }

    #[test]
    fn templates_keep_walk_order() {
        let mut world = World::new();
        let root = spawn_group(&mut world, "root", None);
        let a = spawn_group(&mut world, "A", Some(root));
        spawn_template(&mut world, "First", a);
        spawn_template(&mut world, "Second", root);

        let out = flatten(&world, root, DEFAULT_PATH_SEPARATOR).unwrap();
        let paths: Vec<_> = out.templates.iter().map(|t| t.template_path.as_str()).collect();
        assert_eq!(paths, ["First", "Second"]);
        assert_eq!(out.templates[0].parent_id, 1);
        assert_eq!(out.templates[1].parent_id, ROOT_ID);
    }

    #[test]
    fn deep_chains_do_not_exhaust_the_stack() {
        const DEPTH: u32 = 20_000;
        let mut world = World::new();
        let root = spawn_group(&mut world, "root", None);
        let mut tip = root;
        for _ in 0..DEPTH {
            tip = spawn_group(&mut world, "", Some(tip));
        }

        // Unnamed nodes and no separator keep every breadcrumb empty.
        let out = flatten(&world, root, "").unwrap();
        assert_eq!(out.groups.len(), DEPTH as usize);
        let last = &out.groups[DEPTH as usize - 1];
        assert_eq!((last.id, last.parent_id), (DEPTH, DEPTH - 1));
    }

    #[test]
    fn missing_root_is_an_error() {
        let mut world = World::new();
        let root = world.spawn_empty().id();
        world.despawn(root);

        assert_eq!(
            flatten(&world, root, DEFAULT_PATH_SEPARATOR),
            Err(PrefabError::MissingAttachPoint(root))
        );
    }
}
