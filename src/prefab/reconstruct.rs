//! Rebuilding a live tree from flat records.
//!
//! Reconstruction runs in phases:
//!
//! 1. **Destroy**: every child of the attach point is despawned
//! 2. **Groups**: empty nodes are created parent-first, in any input order
//! 3. **Templates**: instances are generated through the resolver and
//!    attached under their groups
//! 4. **Nested**: instances that carry their own [`NestedPrefab`] are
//!    reconstructed in turn, in their own id space
//!
//! The rebuild is not transactional. Once the destroy phase has run, later
//! failures leave a partially rebuilt tree.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use bevy_ecs::prelude::*;

use super::container::NestedPrefab;
use super::error::{PrefabError, PrefabResult};
use super::records::{GroupNodeRecord, ROOT_ID};
use super::resolver::TemplateResolver;
use crate::scene::{
    self, despawn_children, is_alive, set_parent, spawn_group, Parent, TemplateLink,
};

/// Asked before the destroy phase when confirmation is requested.
///
/// Implementations typically prompt the user and snapshot the tree for
/// undo. Returning `false` cancels the regeneration.
pub trait ConfirmRegenerate {
    fn confirm(&mut self, world: &World, attach_point: Entity) -> bool;
}

impl<F> ConfirmRegenerate for F
where
    F: FnMut(&World, Entity) -> bool,
{
    fn confirm(&mut self, world: &World, attach_point: Entity) -> bool {
        self(world, attach_point)
    }
}

/// Outcome of a reconstruction, including nested containers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconstructReport {
    /// Set when the confirmation collaborator refused; nothing was touched.
    pub cancelled: bool,
    /// Group nodes created, in creation order.
    pub groups: Vec<Entity>,
    /// Template instances placed, in record order.
    pub templates: Vec<Entity>,
    /// Instances whose own nested prefab data was expanded.
    pub nested: Vec<Entity>,
    /// Records that could not be placed.
    pub issues: Vec<PrefabError>,
}

impl ReconstructReport {
    fn cancelled() -> Self {
        Self {
            cancelled: true,
            ..Default::default()
        }
    }

    /// `true` when every record was placed.
    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.issues.is_empty()
    }

    /// Turn the first recorded issue into an error.
    pub fn into_result(mut self) -> PrefabResult<Self> {
        if self.issues.is_empty() {
            Ok(self)
        } else {
            Err(self.issues.swap_remove(0))
        }
    }

    fn push_issue(&mut self, issue: PrefabError) {
        log::warn!("{issue}");
        self.issues.push(issue);
    }
}

/// Replays [`NestedPrefab`] records into a live tree.
#[derive(Clone)]
pub struct Reconstructor {
    resolver: Arc<dyn TemplateResolver>,
    max_nesting_depth: usize,
}

impl Reconstructor {
    pub fn new(resolver: Arc<dyn TemplateResolver>) -> Self {
        Self {
            resolver,
            max_nesting_depth: crate::config::PrefabConfig::default().max_nesting_depth,
        }
    }

    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    pub fn resolver(&self) -> &Arc<dyn TemplateResolver> {
        &self.resolver
    }

    /// Destroy the children of `attach_point` and rebuild them from `container`.
    ///
    /// Passing a `confirmation` requests confirmation: it is asked before
    /// anything is destroyed and may cancel. Nested containers are always
    /// rebuilt without asking again.
    ///
    /// Only a missing attach point is returned as an error. Unplaceable
    /// records are collected in [`ReconstructReport::issues`] and the
    /// remaining records are still placed.
    pub fn reconstruct(
        &self,
        world: &mut World,
        container: &NestedPrefab,
        attach_point: Entity,
        confirmation: Option<&mut dyn ConfirmRegenerate>,
    ) -> PrefabResult<ReconstructReport> {
        if !is_alive(world, attach_point) {
            return Err(PrefabError::MissingAttachPoint(attach_point));
        }

        if let Some(confirmation) = confirmation {
            if !confirmation.confirm(world, attach_point) {
                log::info!("Regeneration of {attach_point} cancelled");
                return Ok(ReconstructReport::cancelled());
            }
        }

        let mut report = ReconstructReport::default();
        let mut chain = Vec::new();
        self.rebuild(world, container, attach_point, &mut chain, &mut report);

        log::info!(
            "Regenerated {attach_point}: {} groups, {} templates, {} nested, {} issues",
            report.groups.len(),
            report.templates.len(),
            report.nested.len(),
            report.issues.len()
        );
        Ok(report)
    }

    fn rebuild(
        &self,
        world: &mut World,
        container: &NestedPrefab,
        attach_point: Entity,
        chain: &mut Vec<String>,
        report: &mut ReconstructReport,
    ) {
        let removed = despawn_children(world, attach_point);
        log::debug!("Destroyed {removed} children of {attach_point}");

        let table = self.build_groups(world, container.group_records(), attach_point, report);

        for record in container.template_records() {
            let Some(&parent) = table.get(&record.parent_id) else {
                report.push_issue(PrefabError::DanglingTemplateParent {
                    template_path: record.template_path.clone(),
                    parent_id: record.parent_id,
                });
                continue;
            };

            let instance = self
                .resolver
                .generate_from(world, &record.template_path)
                .filter(|&e| is_detached_instance(world, e, parent));
            let Some(instance) = instance else {
                report.push_issue(PrefabError::TemplateResolutionFailure {
                    template_path: record.template_path.clone(),
                });
                continue;
            };

            if world.get::<TemplateLink>(instance).is_none() {
                world
                    .entity_mut(instance)
                    .insert(TemplateLink::new(record.template_path.clone()));
            }
            set_parent(world, instance, parent);
            scene::set_transform(world, instance, record.transform.to_transform());
            report.templates.push(instance);
            log::debug!("Placed template '{}' under {parent}", record.template_path);

            let Some(nested) = world.get::<NestedPrefab>(instance).cloned() else {
                continue;
            };
            if chain.contains(&record.template_path) {
                report.push_issue(PrefabError::RecursiveTemplate {
                    template_path: record.template_path.clone(),
                });
                continue;
            }
            if chain.len() >= self.max_nesting_depth {
                report.push_issue(PrefabError::NestingTooDeep {
                    depth: chain.len() + 1,
                });
                continue;
            }

            chain.push(record.template_path.clone());
            self.rebuild(world, &nested, instance, chain, report);
            chain.pop();
            report.nested.push(instance);
        }
    }

    /// Create group nodes parent-first and return the id → entity table.
    fn build_groups(
        &self,
        world: &mut World,
        records: &[GroupNodeRecord],
        attach_point: Entity,
        report: &mut ReconstructReport,
    ) -> HashMap<u32, Entity> {
        let mut table = HashMap::from([(ROOT_ID, attach_point)]);

        let mut waiting: HashMap<u32, Vec<&GroupNodeRecord>> = HashMap::new();
        for record in records {
            waiting.entry(record.parent_id).or_default().push(record);
        }

        let mut queue = VecDeque::from([ROOT_ID]);
        while let Some(parent_id) = queue.pop_front() {
            let Some(children) = waiting.remove(&parent_id) else {
                continue;
            };
            let parent = table[&parent_id];

            for record in children {
                if record.id == ROOT_ID {
                    report.push_issue(PrefabError::ReservedGroupId {
                        name: record.name.clone(),
                    });
                    continue;
                }
                if table.contains_key(&record.id) {
                    report.push_issue(PrefabError::DuplicateGroupId { id: record.id });
                    continue;
                }

                let entity = spawn_group(world, record.name.clone(), Some(parent));
                scene::set_transform(world, entity, record.transform.to_transform());
                table.insert(record.id, entity);
                report.groups.push(entity);
                queue.push_back(record.id);
            }
        }

        let mut unplaced: Vec<&GroupNodeRecord> = waiting.into_values().flatten().collect();
        unplaced.sort_by_key(|record| record.id);
        for record in unplaced {
            report.push_issue(PrefabError::DanglingParentReference {
                id: record.id,
                parent_id: record.parent_id,
            });
        }

        table
    }
}

/// A resolver must hand back a live, unparented entity that is not already
/// part of the chain above `parent`.
fn is_detached_instance(world: &World, instance: Entity, parent: Entity) -> bool {
    if !is_alive(world, instance) || world.get::<Parent>(instance).is_some() {
        return false;
    }
    let mut cursor = Some(parent);
    while let Some(node) = cursor {
        if node == instance {
            return false;
        }
        cursor = world.get::<Parent>(node).map(|p| p.0);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefab::{GroupNodeRecord, TemplateInstanceRecord, TransformSnapshot};
    use crate::scene::{children_of, name_of};

    fn group(id: u32, name: &str, parent_id: u32) -> GroupNodeRecord {
        GroupNodeRecord {
            id,
            name: name.to_string(),
            hierarchy_path: String::new(),
            parent_id,
            transform: TransformSnapshot::default(),
        }
    }

    fn template(path: &str, parent_id: u32) -> TemplateInstanceRecord {
        TemplateInstanceRecord {
            template_path: path.to_string(),
            hierarchy_path: String::new(),
            parent_id,
            transform: TransformSnapshot::default(),
        }
    }

    fn spawn_resolver() -> Arc<dyn TemplateResolver> {
        Arc::new(|world: &mut World, path: &str| {
            Some(world.spawn(scene::NodeName::new(path)).id())
        })
    }

    #[test]
    fn children_may_precede_parents() {
        let mut world = World::new();
        let root = world.spawn_empty().id();
        let container = NestedPrefab::from_records(
            vec![group(3, "C", 2), group(2, "B", 1), group(1, "A", 0)],
            vec![],
        );

        let report = Reconstructor::new(spawn_resolver())
            .reconstruct(&mut world, &container, root, None)
            .unwrap();

        assert!(report.is_complete());
        let a = children_of(&world, root)[0];
        let b = children_of(&world, a)[0];
        let c = children_of(&world, b)[0];
        assert_eq!(
            [name_of(&world, a), name_of(&world, b), name_of(&world, c)],
            ["A", "B", "C"]
        );
    }

    #[test]
    fn cycles_are_reported_as_dangling() {
        let mut world = World::new();
        let root = world.spawn_empty().id();
        let container =
            NestedPrefab::from_records(vec![group(1, "A", 2), group(2, "B", 1)], vec![]);

        let report = Reconstructor::new(spawn_resolver())
            .reconstruct(&mut world, &container, root, None)
            .unwrap();

        assert!(report.groups.is_empty());
        assert_eq!(
            report.issues,
            vec![
                PrefabError::DanglingParentReference { id: 1, parent_id: 2 },
                PrefabError::DanglingParentReference { id: 2, parent_id: 1 },
            ]
        );
    }

    #[test]
    fn duplicate_and_reserved_ids_are_skipped() {
        let mut world = World::new();
        let root = world.spawn_empty().id();
        let container = NestedPrefab::from_records(
            vec![group(1, "A", 0), group(1, "A again", 0), group(0, "Zero", 0)],
            vec![],
        );

        let report = Reconstructor::new(spawn_resolver())
            .reconstruct(&mut world, &container, root, None)
            .unwrap();

        assert_eq!(report.groups.len(), 1);
        assert!(report
            .issues
            .contains(&PrefabError::DuplicateGroupId { id: 1 }));
        assert!(report.issues.contains(&PrefabError::ReservedGroupId {
            name: "Zero".to_string()
        }));
    }

    #[test]
    fn template_under_missing_group_is_reported() {
        let mut world = World::new();
        let root = world.spawn_empty().id();
        let container = NestedPrefab::from_records(vec![], vec![template("Box", 7)]);

        let report = Reconstructor::new(spawn_resolver())
            .reconstruct(&mut world, &container, root, None)
            .unwrap();

        assert_eq!(
            report.issues,
            vec![PrefabError::DanglingTemplateParent {
                template_path: "Box".to_string(),
                parent_id: 7
            }]
        );
    }

    #[test]
    fn resolver_output_gets_linked() {
        let mut world = World::new();
        let root = world.spawn_empty().id();
        let container = NestedPrefab::from_records(vec![], vec![template("Box", 0)]);

        let report = Reconstructor::new(spawn_resolver())
            .reconstruct(&mut world, &container, root, None)
            .unwrap();

        let instance = report.templates[0];
        assert_eq!(scene::template_path_of(&world, instance), Some("Box"));
        assert_eq!(children_of(&world, root), vec![instance]);
    }

    #[test]
    fn reused_entities_from_resolver_are_rejected() {
        let mut world = World::new();
        let root = world.spawn_empty().id();
        let container = NestedPrefab::from_records(
            vec![group(1, "A", 0)],
            vec![template("Root", 0), template("Group", 1), template("Fresh", 1)],
        );

        let resolver: Arc<dyn TemplateResolver> = Arc::new(move |world: &mut World, path: &str| {
            match path {
                "Root" => Some(root),
                "Group" => children_of(world, root).first().copied(),
                _ => Some(world.spawn(scene::NodeName::new(path)).id()),
            }
        });
        let report = Reconstructor::new(resolver)
            .reconstruct(&mut world, &container, root, None)
            .unwrap();

        assert_eq!(report.templates.len(), 1);
        assert_eq!(
            report.issues,
            vec![
                PrefabError::TemplateResolutionFailure {
                    template_path: "Root".to_string()
                },
                PrefabError::TemplateResolutionFailure {
                    template_path: "Group".to_string()
                },
            ]
        );
        let a = children_of(&world, root)[0];
        assert_eq!(children_of(&world, root), vec![a]);
        assert_eq!(name_of(&world, children_of(&world, a)[0]), "Fresh");
    }

    #[test]
    fn refusal_cancels_without_destroying() {
        let mut world = World::new();
        let root = world.spawn_empty().id();
        let existing = spawn_group(&mut world, "Existing", Some(root));
        let container = NestedPrefab::from_records(vec![group(1, "A", 0)], vec![]);

        let mut asked = 0;
        let mut refuse = |_: &World, _: Entity| {
            asked += 1;
            false
        };
        let report = Reconstructor::new(spawn_resolver())
            .reconstruct(&mut world, &container, root, Some(&mut refuse))
            .unwrap();

        assert_eq!(asked, 1);
        assert!(report.cancelled);
        assert!(!report.is_complete());
        assert_eq!(children_of(&world, root), vec![existing]);
    }

    #[test]
    fn missing_attach_point_is_fatal() {
        let mut world = World::new();
        let root = world.spawn_empty().id();
        world.despawn(root);

        let err = Reconstructor::new(spawn_resolver())
            .reconstruct(&mut world, &NestedPrefab::default(), root, None)
            .unwrap_err();
        assert_eq!(err, PrefabError::MissingAttachPoint(root));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn into_result_surfaces_first_issue() {
        let report = ReconstructReport {
            issues: vec![PrefabError::TemplateResolutionFailure {
                template_path: "X".into(),
            }],
            ..Default::default()
        };
        assert!(matches!(
            report.into_result(),
            Err(PrefabError::TemplateResolutionFailure { .. })
        ));
        assert!(ReconstructReport::default().into_result().is_ok());
    }
}
