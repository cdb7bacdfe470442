//! Error types for saving and regenerating prefab trees.

use std::path::PathBuf;

use bevy_ecs::entity::Entity;
use thiserror::Error;

/// Errors raised while flattening, validating, reconstructing or persisting
/// a nested prefab tree.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PrefabError {
    /// A group record's parent never resolved, so the group and its
    /// descendants could not be placed.
    #[error("group {id} references parent {parent_id}, which never resolved")]
    DanglingParentReference { id: u32, parent_id: u32 },
    /// A template record's parent group was never placed.
    #[error("template '{template_path}' references parent {parent_id}, which never resolved")]
    DanglingTemplateParent { template_path: String, parent_id: u32 },
    /// The resolver produced no instance for a template path.
    #[error("failed to resolve template '{template_path}'")]
    TemplateResolutionFailure { template_path: String },
    /// The root / attach point entity does not exist.
    #[error("attach point {0} does not exist")]
    MissingAttachPoint(Entity),
    /// The entity has no saved prefab data to regenerate from.
    #[error("entity {0} has no nested prefab data")]
    MissingContainer(Entity),
    /// A group record uses the id reserved for the tree root.
    #[error("group '{name}' uses reserved id 0")]
    ReservedGroupId { name: String },
    /// Two group records share the same id.
    #[error("duplicate group id {id}")]
    DuplicateGroupId { id: u32 },
    /// A template contains a nested copy of itself.
    #[error("template '{template_path}' contains itself")]
    RecursiveTemplate { template_path: String },
    /// Nested containers exceed the configured depth.
    #[error("nested prefab depth {depth} exceeds the configured limit")]
    NestingTooDeep { depth: usize },
    /// RON encoding or decoding failed.
    #[error("format error: {0}")]
    Format(String),
    /// Reading or writing a file failed.
    #[error("i/o error on {}: {message}", .path.display())]
    Io { path: PathBuf, message: String },
    /// Configuration could not be parsed.
    #[error("invalid config: {0}")]
    Config(String),
}

impl PrefabError {
    /// Whether reconstruction can carry on past this error.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Self::MissingAttachPoint(_) | Self::MissingContainer(_)
        )
    }
}

pub type PrefabResult<T> = Result<T, PrefabError>;
