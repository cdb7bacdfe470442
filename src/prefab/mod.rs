//! Saving and regenerating trees of nested prefabs.
//!
//! This module provides:
//!
//! - [`flatten`] - walks a live tree into [`GroupNodeRecord`]s and
//!   [`TemplateInstanceRecord`]s
//! - [`Reconstructor`] - replays records into a live tree through a
//!   [`TemplateResolver`]
//! - [`NestedPrefab`] - component holding the records of one tree root,
//!   with `save` / `generate` entry points
//! - [`TemplateLibrary`] / [`PackagedTemplateResolver`] - the two resolver
//!   policies, over [`TemplateAsset`] data
//! - [`format`] - RON persistence

mod asset;
mod container;
mod error;
mod flatten;
pub mod format;
mod reconstruct;
mod records;
mod resolver;
mod snapshot;

pub use asset::{TemplateAsset, TemplateNode};
pub use container::NestedPrefab;
pub use error::{PrefabError, PrefabResult};
pub use flatten::{flatten, FlattenOutput};
pub use reconstruct::{ConfirmRegenerate, ReconstructReport, Reconstructor};
pub use records::{GroupNodeRecord, IdAllocator, TemplateInstanceRecord, ROOT_ID};
pub use resolver::{PackagedTemplateResolver, TemplateLibrary, TemplateResolver};
pub use snapshot::TransformSnapshot;
