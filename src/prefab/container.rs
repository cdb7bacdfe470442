//! The [`NestedPrefab`] component.
//!
//! Attached to the root of a tree, it holds the flat records of the tree's
//! descendants. [`NestedPrefab::save`] refreshes the records from the live
//! tree and [`NestedPrefab::generate`] rebuilds the tree from them.
//!
//! ```ignore
//! NestedPrefab::save(&mut world, root)?;
//! let text = world.get::<NestedPrefab>(root).unwrap().to_ron()?;
//!
//! // later, possibly in another session
//! world.entity_mut(root).insert(NestedPrefab::from_ron(&text)?);
//! let report = NestedPrefab::generate(&mut world, root, None)?;
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use super::error::{PrefabError, PrefabResult};
use super::flatten::{flatten, FlattenOutput};
use super::format;
use super::reconstruct::{ConfirmRegenerate, ReconstructReport, Reconstructor};
use super::records::{GroupNodeRecord, TemplateInstanceRecord, ROOT_ID};
use super::resolver::{PackagedTemplateResolver, TemplateResolver};
use crate::config::PrefabConfig;
use crate::scene::is_alive;

/// Saved structure of one tree: its group nodes and template instances.
///
/// The injected resolver is runtime state and is never serialized.
#[derive(Component, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NestedPrefab {
    #[serde(default)]
    group_records: Vec<GroupNodeRecord>,
    #[serde(default)]
    template_records: Vec<TemplateInstanceRecord>,
    #[serde(skip)]
    resolver: Option<Arc<dyn TemplateResolver>>,
}

impl std::fmt::Debug for NestedPrefab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NestedPrefab")
            .field("group_records", &self.group_records)
            .field("template_records", &self.template_records)
            .field("has_resolver", &self.resolver.is_some())
            .finish()
    }
}

impl PartialEq for NestedPrefab {
    fn eq(&self, other: &Self) -> bool {
        self.group_records == other.group_records
            && self.template_records == other.template_records
    }
}

impl NestedPrefab {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(
        group_records: Vec<GroupNodeRecord>,
        template_records: Vec<TemplateInstanceRecord>,
    ) -> Self {
        Self {
            group_records,
            template_records,
            resolver: None,
        }
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn TemplateResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn group_records(&self) -> &[GroupNodeRecord] {
        &self.group_records
    }

    pub fn template_records(&self) -> &[TemplateInstanceRecord] {
        &self.template_records
    }

    pub fn is_empty(&self) -> bool {
        self.group_records.is_empty() && self.template_records.is_empty()
    }

    /// Inject the resolver used when this container is regenerated.
    pub fn set_resolver(&mut self, resolver: Arc<dyn TemplateResolver>) {
        self.resolver = Some(resolver);
    }

    pub fn has_resolver(&self) -> bool {
        self.resolver.is_some()
    }

    /// The injected resolver, installing a [`PackagedTemplateResolver`]
    /// built from `config` when none was set.
    pub fn resolver(&mut self, config: &PrefabConfig) -> Arc<dyn TemplateResolver> {
        Arc::clone(self.resolver.get_or_insert_with(|| {
            log::debug!(
                "No template resolver set, using packaged templates from {}",
                config.template_root.display()
            );
            Arc::new(PackagedTemplateResolver::from_config(config))
        }))
    }

    /// Replace the records with a fresh flatten result.
    pub fn replace(&mut self, output: FlattenOutput) {
        self.group_records = output.groups;
        self.template_records = output.templates;
    }

    /// Check the structural invariants of the records.
    ///
    /// Group ids must be unique and non-zero, and every parent id must be
    /// [`ROOT_ID`] or the id of a group in this container.
    pub fn validate(&self) -> PrefabResult<()> {
        let mut ids = HashSet::with_capacity(self.group_records.len());
        for record in &self.group_records {
            if record.id == ROOT_ID {
                return Err(PrefabError::ReservedGroupId {
                    name: record.name.clone(),
                });
            }
            if !ids.insert(record.id) {
                return Err(PrefabError::DuplicateGroupId { id: record.id });
            }
        }

        let resolves = |parent_id: u32| parent_id == ROOT_ID || ids.contains(&parent_id);
        for record in &self.group_records {
            if !resolves(record.parent_id) {
                return Err(PrefabError::DanglingParentReference {
                    id: record.id,
                    parent_id: record.parent_id,
                });
            }
        }
        for record in &self.template_records {
            if !resolves(record.parent_id) {
                return Err(PrefabError::DanglingTemplateParent {
                    template_path: record.template_path.clone(),
                    parent_id: record.parent_id,
                });
            }
        }
        Ok(())
    }

    pub fn to_ron(&self) -> PrefabResult<String> {
        format::encode(self)
    }

    pub fn from_ron(text: &str) -> PrefabResult<Self> {
        format::decode(text)
    }

    /// Flatten the descendants of `root` into its `NestedPrefab`.
    ///
    /// The component is inserted when `root` has none; an injected resolver
    /// on an existing component is kept. The path separator comes from the
    /// [`PrefabConfig`] resource, or its default when absent.
    pub fn save(world: &mut World, root: Entity) -> PrefabResult<FlattenOutput> {
        let separator = world
            .get_resource::<PrefabConfig>()
            .map(|config| config.path_separator.clone())
            .unwrap_or_else(|| PrefabConfig::default().path_separator);

        let output = flatten(world, root, &separator)?;
        log::info!(
            "Saved {root}: {} groups, {} templates",
            output.groups.len(),
            output.templates.len()
        );

        if let Some(mut container) = world.get_mut::<NestedPrefab>(root) {
            container.replace(output.clone());
        } else {
            let mut container = NestedPrefab::new();
            container.replace(output.clone());
            world.entity_mut(root).insert(container);
        }
        Ok(output)
    }

    /// Rebuild the descendants of `root` from its `NestedPrefab`.
    ///
    /// Passing a `confirmation` requests confirmation before the existing
    /// children are destroyed. Installs the default resolver on the
    /// component when none was injected.
    pub fn generate(
        world: &mut World,
        root: Entity,
        confirmation: Option<&mut dyn ConfirmRegenerate>,
    ) -> PrefabResult<ReconstructReport> {
        if !is_alive(world, root) {
            return Err(PrefabError::MissingAttachPoint(root));
        }
        let config = world
            .get_resource::<PrefabConfig>()
            .cloned()
            .unwrap_or_default();

        let Some(mut container) = world.get_mut::<NestedPrefab>(root) else {
            return Err(PrefabError::MissingContainer(root));
        };
        let resolver = container.resolver(&config);
        let records = NestedPrefab::from_records(
            container.group_records.clone(),
            container.template_records.clone(),
        );

        Reconstructor::new(resolver)
            .with_max_nesting_depth(config.max_nesting_depth)
            .reconstruct(world, &records, root, confirmation)
    }
}
