//! Flat records persisted by a [`NestedPrefab`](super::NestedPrefab).

use serde::{Deserialize, Serialize};

use super::snapshot::TransformSnapshot;

/// Id of the tree root. Never stored as a group record id.
pub const ROOT_ID: u32 = 0;

/// An empty grouping node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupNodeRecord {
    /// Unique, strictly positive id assigned in traversal order.
    pub id: u32,
    pub name: String,
    /// Breadcrumb of ancestor names. Informational only.
    pub hierarchy_path: String,
    /// Id of the containing group, or [`ROOT_ID`].
    pub parent_id: u32,
    pub transform: TransformSnapshot,
}

/// A leaf instance of a template.
///
/// The template's internal structure is not recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateInstanceRecord {
    /// Identifier handed to the template resolver.
    pub template_path: String,
    pub hierarchy_path: String,
    pub parent_id: u32,
    pub transform: TransformSnapshot,
}

/// Allocates group ids for a single flatten pass.
///
/// Starts at [`ROOT_ID`]; the first allocated id is `1`.
#[derive(Debug, Default)]
pub struct IdAllocator {
    current: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next id (pre-increment).
    pub fn next_id(&mut self) -> u32 {
        self.current += 1;
        self.current
    }

    /// Number of ids handed out so far.
    pub fn allocated(&self) -> u32 {
        self.current
    }
}
