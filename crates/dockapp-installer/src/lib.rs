mod engine;
mod finalize;
mod fs_utils;
mod launch;
mod layout;
mod options;
mod pipeline;
mod remove;
mod status;

use std::path::{Path, PathBuf};

use anyhow::Result;
use dockapp_core::AppError;

pub use engine::Engine;
pub use finalize::{classify_package, finalize_install, BinLink, InstallOutcome, PackageKind};
pub use launch::{spawn_app, LaunchOutcome, LaunchRequest};
pub use layout::{default_app_base, next_monotonic_id, AppLayout, APP_BASE_ENV};
pub use options::{
    clean_path, default_id_file, launch_destination, process_temp_dir, resolve_destination,
    AppOptions, AUTO_DESTINATION, DEFAULT_EGRESS,
};
pub use pipeline::{run_pipeline, PipelineOutput};
pub use remove::{links_into, prune_empty_ancestors, read_bin_links, remove_apps, BinLinks};
pub use status::{StatusLevel, StatusSink};

pub const RUN_FILE: &str = "run";
pub const INSTALL_HOOK: &str = "install";
pub const UNINSTALL_HOOK: &str = "uninstall";

/// `app install`: build, run, extract, then materialize under the app base.
pub fn install_app(
    options: &AppOptions,
    engine: &dyn Engine,
    sink: &mut dyn StatusSink,
) -> Result<InstallOutcome> {
    options.validate()?;
    let app_path = options.app_path()?;
    let target = if options.is_default_layout() {
        &app_path
    } else {
        &options.destination
    };
    finalize::ensure_not_installed(target)?;

    let output = run_pipeline(options, engine, sink)?;
    let outcome = finalize_install(options, &output.cache_dir, sink)?;

    if options.launch {
        if let Some(link) = &outcome.link {
            let request = LaunchRequest::new(&link.target, options.layout().base())
                .with_args(options.launch_args())
                .detached(options.detach);
            spawn_app(&request)?;
        }
    }
    Ok(outcome)
}

/// `app launch`: build, run, extract into the destination, then run the entry.
pub fn launch_app(
    options: &AppOptions,
    engine: &dyn Engine,
    sink: &mut dyn StatusSink,
) -> Result<LaunchOutcome> {
    options.validate()?;
    let app_path = options.app_path()?;
    let target = if options.is_default_layout() {
        app_path
    } else {
        options.destination.clone()
    };
    finalize::ensure_not_installed(&target)?;

    let output = run_pipeline(options, engine, sink)?;
    fs_utils::move_dir_or_copy(&output.cache_dir, &target)?;
    let entry = launch_entry(&target)?;
    fs_utils::set_executable(&entry)?;

    let request = LaunchRequest::new(&entry, options.layout().base())
        .with_args(options.launch_args())
        .detached(options.detach);
    spawn_app(&request)
}

/// The single file, else `run`, else the `install` hook.
pub fn launch_entry(dir: &Path) -> Result<PathBuf> {
    match classify_package(dir)? {
        PackageKind::SingleFile(name) => Ok(dir.join(name)),
        PackageKind::RunFile => Ok(dir.join(RUN_FILE)),
        PackageKind::Custom => {
            let hook = dir.join(INSTALL_HOOK);
            if hook.is_file() {
                Ok(hook)
            } else {
                Err(AppError::NoEntryPoint(dir.to_path_buf()).into())
            }
        }
    }
}
