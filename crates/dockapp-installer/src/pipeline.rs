use std::path::PathBuf;

use anyhow::Result;
use dockapp_core::host_build_args;
use tracing::debug;

use crate::engine::Engine;
use crate::fs_utils::create_dir_all_0755;
use crate::options::AppOptions;
use crate::status::StatusSink;

const HOST_BUILD_ARG_KEYS: [&str; 2] = ["HOSTOS=", "HOSTARCH="];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutput {
    pub image_id: String,
    pub container_id: String,
    pub cache_dir: PathBuf,
}

/// Builds the image, runs the container, and copies the egress directory
/// into a fresh cache directory.
///
/// A cache directory created before a failing copy is left on disk.
pub fn run_pipeline(
    options: &AppOptions,
    engine: &dyn Engine,
    sink: &mut dyn StatusSink,
) -> Result<PipelineOutput> {
    let output = run_steps(options, engine, sink);
    options.remove_scratch_id_files();
    output
}

fn run_steps(
    options: &AppOptions,
    engine: &dyn Engine,
    sink: &mut dyn StatusSink,
) -> Result<PipelineOutput> {
    for id_file in [&options.image_id_file, &options.container_id_file] {
        if let Some(parent) = id_file.parent() {
            create_dir_all_0755(parent)?;
        }
    }

    let mut build = options.build.clone();
    build.context = options.build_context();
    build.image_id_file = options.image_id_file.clone();
    build.build_args.retain(|arg| {
        !HOST_BUILD_ARG_KEYS
            .iter()
            .any(|key| arg.starts_with(key))
    });
    build.build_args.extend(host_build_args());
    debug!(context = %build.context, "building app image");
    engine.run_build(&build)?;
    let image_id = options.image_id()?;
    sink.ok(&format!("Image ID: {image_id}"));

    let mut container = options.container.clone();
    container.image = image_id.clone();
    container.args = options.run_args().to_vec();
    container.container_id_file = options.container_id_file.clone();
    debug!(image = %container.image, args = ?container.args, "running app container");
    engine.run_container(&options.run, &container)?;
    let container_id = options.container_id()?;
    sink.ok(&format!("Container ID: {container_id}"));

    let cache_dir = options.cache_dir()?;
    let mut copy = options.copy.clone();
    copy.destination = cache_dir.clone();
    copy.source = format!("{container_id}:{}", options.egress);
    debug!(source = %copy.source, destination = %cache_dir.display(), "copying egress");
    engine.run_copy(&copy)?;
    sink.ok(&format!("App copied to {}", cache_dir.display()));

    Ok(PipelineOutput {
        image_id,
        container_id,
        cache_dir,
    })
}
