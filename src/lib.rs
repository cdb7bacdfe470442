//! Nested prefab trees
//!
//! Saves a scene subtree made of empty group nodes and template instances
//! ("prefabs") as flat, id-addressed records, and regenerates an equivalent
//! subtree from those records later.
//!
//! # Features
//! - Depth-first flattening with ids scoped to one save
//! - Order-independent reconstruction with per-record error reporting
//! - Templates that carry their own saved trees are regenerated recursively
//! - Pluggable template resolution (in-memory library or packaged RON files)
//! - Scene graph built on Bevy ECS
//!
//! # Example
//!
//! ```ignore
//! let library = Arc::new(TemplateLibrary::new());
//! library.insert("Templates/Box", TemplateAsset::new(TemplateNode::new("Box")));
//!
//! world.entity_mut(root).insert(NestedPrefab::new().with_resolver(library));
//! NestedPrefab::save(&mut world, root)?;
//! let report = NestedPrefab::generate(&mut world, root, None)?;
//! ```

pub mod config;
pub mod prefab;
pub mod scene;

// Re-export Bevy ECS prelude for users
pub use bevy_ecs::prelude::*;

pub use config::PrefabConfig;
pub use prefab::{
    NestedPrefab, PrefabError, PrefabResult, ReconstructReport, Reconstructor, TemplateResolver,
};
