//! Template resolution.
//!
//! The reconstructor only ever talks to a [`TemplateResolver`]. Two policies
//! are provided:
//!
//! - [`TemplateLibrary`]: authoring time; clones assets held in memory
//! - [`PackagedTemplateResolver`]: runtime; loads packaged RON assets by
//!   name and spawns them at the origin

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use bevy_ecs::prelude::*;
use parking_lot::{Mutex, RwLock};

use super::asset::TemplateAsset;
use super::error::PrefabResult;
use super::format;
use crate::config::PrefabConfig;
use crate::scene::{self, Transform};

/// Produces fresh template instances from template identifiers.
///
/// Implementations create exactly one new root (with whatever children the
/// template has) and return it detached. Returning `None` means the
/// identifier could not be resolved.
pub trait TemplateResolver: Send + Sync {
    fn generate_from(&self, world: &mut World, template_path: &str) -> Option<Entity>;
}

impl<F> TemplateResolver for F
where
    F: Fn(&mut World, &str) -> Option<Entity> + Send + Sync,
{
    fn generate_from(&self, world: &mut World, template_path: &str) -> Option<Entity> {
        self(world, template_path)
    }
}

/// In-memory template store used while authoring.
///
/// Registration goes through `&self`, so a library can keep receiving
/// assets after being shared with a container.
#[derive(Default)]
pub struct TemplateLibrary {
    assets: RwLock<HashMap<String, Arc<TemplateAsset>>>,
}

impl TemplateLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the asset stored under `path`.
    pub fn insert(&self, path: impl Into<String>, asset: TemplateAsset) {
        let path = path.into();
        log::debug!("Registered template '{path}'");
        self.assets.write().insert(path, Arc::new(asset));
    }

    /// Capture a live subtree and store it under `path`.
    pub fn insert_from_world(
        &self,
        path: impl Into<String>,
        world: &World,
        root: Entity,
    ) -> PrefabResult<()> {
        let asset = TemplateAsset::capture(world, root)?;
        self.insert(path, asset);
        Ok(())
    }

    pub fn get(&self, path: &str) -> Option<Arc<TemplateAsset>> {
        self.assets.read().get(path).cloned()
    }
}

impl TemplateResolver for TemplateLibrary {
    fn generate_from(&self, world: &mut World, template_path: &str) -> Option<Entity> {
        let asset = self.get(template_path)?;
        Some(asset.instantiate(world, template_path))
    }
}

/// Loads packaged templates from a directory of RON files.
///
/// A template named `Props/Crate` resolves to
/// `<root>/Props/Crate.<extension>`. Loaded assets are cached for the
/// lifetime of the resolver.
pub struct PackagedTemplateResolver {
    root: PathBuf,
    extension: String,
    cache: Mutex<HashMap<String, Arc<TemplateAsset>>>,
}

impl PackagedTemplateResolver {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &PrefabConfig) -> Self {
        Self::new(config.template_root.clone(), config.template_extension.clone())
    }

    /// File path a template name maps to.
    pub fn path_for(&self, name: &str) -> PathBuf {
        let path = self.root.join(name);
        if path.extension().is_some_and(|ext| ext == self.extension.as_str()) {
            path
        } else {
            let mut file = path.into_os_string();
            file.push(".");
            file.push(&self.extension);
            PathBuf::from(file)
        }
    }

    /// Load (or fetch from cache) the asset for `name`.
    pub fn load(&self, name: &str) -> PrefabResult<Arc<TemplateAsset>> {
        if let Some(asset) = self.cache.lock().get(name) {
            return Ok(Arc::clone(asset));
        }

        let path = self.path_for(name);
        let asset: Arc<TemplateAsset> = Arc::new(format::load_file(&path)?);
        log::info!("Loaded packaged template '{name}' from {}", path.display());

        self.cache.lock().insert(name.to_string(), Arc::clone(&asset));
        Ok(asset)
    }

    /// Drop all cached assets so the next load reads from disk.
    pub fn clear_cache(&self) {
        self.cache.lock().clear();
    }
}

impl TemplateResolver for PackagedTemplateResolver {
    fn generate_from(&self, world: &mut World, template_path: &str) -> Option<Entity> {
        let asset = match self.load(template_path) {
            Ok(asset) => asset,
            Err(e) => {
                log::warn!("Packaged template '{template_path}' unavailable: {e}");
                return None;
            }
        };
        let root = asset.instantiate(world, template_path);
        scene::set_transform(world, root, Transform::IDENTITY);
        Some(root)
    }
}
