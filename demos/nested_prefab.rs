//! Nested prefab save / regenerate demo.
//!
//! Builds a small level out of groups and template instances, saves it,
//! prints the persisted records and regenerates the level from them.
//!
//! # Usage
//!
//! ```bash
//! # In-memory templates
//! cargo run --example nested_prefab
//!
//! # Write the saved records and ask before regenerating
//! cargo run --example nested_prefab -- --output level.ron --confirm
//!
//! # Load settings from a TOML file
//! cargo run --example nested_prefab -- --config prefab.toml
//! ```

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use glam::Vec3;

use nested_prefab::prefab::{
    format, NestedPrefab, TemplateAsset, TemplateLibrary, TemplateNode, TemplateResolver,
    TransformSnapshot,
};
use nested_prefab::scene::{self, children_of, set_parent, spawn_group, Transform};
use nested_prefab::{Entity, PrefabConfig, PrefabResult, World};

#[derive(Parser, Debug)]
#[command(name = "nested_prefab", about = "Save and regenerate a nested prefab level")]
struct Args {
    /// TOML file with prefab settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the saved records to this RON file
    #[arg(long)]
    output: Option<PathBuf>,

    /// Ask before destroying the level
    #[arg(long)]
    confirm: bool,
}

fn template_library() -> Arc<TemplateLibrary> {
    let library = TemplateLibrary::new();
    library.insert(
        "Templates/Crate",
        TemplateAsset::new(TemplateNode::new("Crate").with_child(TemplateNode::new("Lid"))),
    );
    library.insert(
        "Templates/Tree",
        TemplateAsset::new(
            TemplateNode::new("Tree").with_child(
                TemplateNode::new("Canopy").with_transform(
                    TransformSnapshot::default().with_position(Vec3::new(0.0, 3.0, 0.0)),
                ),
            ),
        ),
    );
    Arc::new(library)
}

fn build_level(world: &mut World, library: &TemplateLibrary) -> Entity {
    let level = spawn_group(world, "Level", None);

    let yard = spawn_group(world, "Yard", Some(level));
    scene::set_transform(world, yard, Transform::from_position(Vec3::new(10.0, 0.0, 0.0)));
    for i in 0..3 {
        if let Some(tree) = library.generate_from(world, "Templates/Tree") {
            set_parent(world, tree, yard);
            scene::set_transform(
                world,
                tree,
                Transform::from_components(
                    Vec3::new(i as f32 * 4.0, 0.0, 0.0),
                    Vec3::new(0.0, i as f32 * 30.0, 0.0),
                    Vec3::ONE,
                ),
            );
        }
    }

    let storage = spawn_group(world, "Storage", Some(level));
    let stack = spawn_group(world, "Stack", Some(storage));
    for i in 0..2 {
        if let Some(crate_instance) = library.generate_from(world, "Templates/Crate") {
            set_parent(world, crate_instance, stack);
            scene::set_transform(
                world,
                crate_instance,
                Transform::from_position(Vec3::new(0.0, i as f32, 0.0)),
            );
        }
    }

    level
}

fn print_tree(world: &World, entity: Entity, depth: usize) {
    let transform = scene::transform_of(world, entity);
    let marker = scene::template_path_of(world, entity)
        .map(|path| format!(" <{path}>"))
        .unwrap_or_default();
    println!(
        "{:indent$}{}{marker} @ {:?}",
        "",
        scene::name_of(world, entity),
        transform.position,
        indent = depth * 2
    );
    for child in children_of(world, entity) {
        print_tree(world, child, depth + 1);
    }
}

/// Prompt on `output` and read a yes/no answer from `input`.
///
/// Any I/O failure counts as a refusal.
fn ask(mut input: impl BufRead, mut output: impl Write, attach_point: Entity) -> bool {
    let prompt = write!(
        output,
        "Regenerating destroys every child of {attach_point}. Continue? [y/N] "
    );
    if prompt.and_then(|()| output.flush()).is_err() {
        return false;
    }
    let mut line = String::new();
    if input.read_line(&mut line).is_err() {
        return false;
    }
    matches!(line.trim(), "y" | "Y" | "yes")
}

fn ask_on_stdin(_: &World, attach_point: Entity) -> bool {
    ask(std::io::stdin().lock(), std::io::stdout(), attach_point)
}

fn main() -> PrefabResult<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => PrefabConfig::load(path)?,
        None => PrefabConfig::default(),
    };

    let library = template_library();
    let mut world = World::new();
    world.insert_resource(config);

    let level = build_level(&mut world, &library);
    world
        .entity_mut(level)
        .insert(NestedPrefab::new().with_resolver(library));

    println!("Original level:");
    print_tree(&world, level, 1);

    NestedPrefab::save(&mut world, level)?;
    if let Some(container) = world.get::<NestedPrefab>(level) {
        container.validate()?;
        match &args.output {
            Some(path) => {
                format::save_file(container, path)?;
                println!("Saved records to {}", path.display());
            }
            None => println!("Saved records:\n{}", container.to_ron()?),
        }
    }

    let mut ask = ask_on_stdin;
    let confirmation: Option<&mut dyn nested_prefab::prefab::ConfirmRegenerate> = if args.confirm {
        Some(&mut ask)
    } else {
        None
    };
    let report = NestedPrefab::generate(&mut world, level, confirmation)?;
    if report.cancelled {
        println!("Regeneration cancelled");
        return Ok(());
    }

    println!("Regenerated level:");
    print_tree(&world, level, 1);
    report.into_result().map(|_| ())
}
