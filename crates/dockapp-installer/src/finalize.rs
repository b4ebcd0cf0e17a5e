use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dockapp_core::{validate_app_name, AppError, SymlinkConflictKind};
use tracing::debug;

use crate::fs_utils::{
    create_dir_all_0755, create_symlink, move_dir_or_copy, remove_link_if_present, set_executable,
};
use crate::launch::{spawn_app, LaunchOutcome, LaunchRequest};
use crate::options::AppOptions;
use crate::status::StatusSink;
use crate::{INSTALL_HOOK, RUN_FILE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageKind {
    /// Exactly one non-directory entry; its name is the app name.
    SingleFile(String),
    RunFile,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinLink {
    pub path: PathBuf,
    pub target: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutcome {
    pub kind: PackageKind,
    pub install_path: PathBuf,
    pub link: Option<BinLink>,
    pub hook: Option<LaunchOutcome>,
}

pub fn classify_package(dir: &Path) -> Result<PackageKind> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))? {
        let entry = entry.with_context(|| format!("failed to iterate {}", dir.display()))?;
        entries.push(entry);
    }

    if let [only] = entries.as_slice() {
        let file_type = only
            .file_type()
            .with_context(|| format!("failed to inspect {}", only.path().display()))?;
        if !file_type.is_dir() {
            return Ok(PackageKind::SingleFile(
                only.file_name().to_string_lossy().into_owned(),
            ));
        }
    }

    if dir.join(RUN_FILE).is_file() {
        return Ok(PackageKind::RunFile);
    }
    Ok(PackageKind::Custom)
}

/// Moves an extracted cache directory into place and exposes it.
pub fn finalize_install(
    options: &AppOptions,
    cache_dir: &Path,
    sink: &mut dyn StatusSink,
) -> Result<InstallOutcome> {
    if !options.is_default_layout() {
        return finalize_custom(options, cache_dir, &options.destination, sink);
    }

    let app_path = options.app_path()?;
    let kind = classify_package(cache_dir)?;
    let (app_name, link_target) = match &kind {
        PackageKind::SingleFile(name) => (name.clone(), app_path.join(name)),
        PackageKind::RunFile => {
            let name = app_path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            (name, app_path.join(RUN_FILE))
        }
        PackageKind::Custom => return finalize_custom(options, cache_dir, &app_path, sink),
    };
    validate_app_name(&app_name)?;

    ensure_not_installed(&app_path)?;
    let link_path = options.layout().bin_link_path(&app_name);
    let replace_link = check_link_slot(&link_path, &link_target)?;

    create_dir_all_0755(&options.bin_path())?;
    if let Some(parent) = app_path.parent() {
        create_dir_all_0755(parent)?;
    }

    move_dir_or_copy(cache_dir, &app_path)?;
    set_executable(&link_target)?;
    if replace_link {
        remove_link_if_present(&link_path)
            .with_context(|| format!("failed to replace link: {}", link_path.display()))?;
    }
    create_symlink(&link_target, &link_path)?;
    debug!(link = %link_path.display(), target = %link_target.display(), "linked app");

    sink.ok(&format!("App installed: {}", link_path.display()));
    Ok(InstallOutcome {
        kind,
        install_path: app_path,
        link: Some(BinLink {
            path: link_path,
            target: link_target,
        }),
        hook: None,
    })
}

fn finalize_custom(
    options: &AppOptions,
    cache_dir: &Path,
    target: &Path,
    sink: &mut dyn StatusSink,
) -> Result<InstallOutcome> {
    ensure_not_installed(target)?;
    if let Some(parent) = target.parent() {
        create_dir_all_0755(parent)?;
    }
    move_dir_or_copy(cache_dir, target)?;

    let hook_path = target.join(INSTALL_HOOK);
    let hook = if hook_path.is_file() {
        set_executable(&hook_path)?;
        let request = LaunchRequest::new(&hook_path, options.layout().base())
            .with_args(options.launch_args())
            .detached(options.detach);
        Some(spawn_app(&request)?)
    } else {
        None
    };

    sink.ok(&format!("App installed: {}", target.display()));
    Ok(InstallOutcome {
        kind: PackageKind::Custom,
        install_path: target.to_path_buf(),
        link: None,
        hook,
    })
}

pub(crate) fn ensure_not_installed(path: &Path) -> Result<()> {
    match fs::symlink_metadata(path) {
        Ok(_) => Err(AppError::AlreadyInstalled(path.to_path_buf()).into()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err).with_context(|| format!("failed to inspect {}", path.display())),
    }
}

/// Returns whether an existing link to `target` must be replaced.
fn check_link_slot(link_path: &Path, target: &Path) -> Result<bool> {
    let metadata = match fs::symlink_metadata(link_path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to inspect {}", link_path.display()))
        }
    };

    if !metadata.file_type().is_symlink() {
        return Err(AppError::SymlinkConflict {
            link: link_path.to_path_buf(),
            kind: SymlinkConflictKind::NotSymlink,
        }
        .into());
    }

    let current = fs::read_link(link_path)
        .with_context(|| format!("failed to read link: {}", link_path.display()))?;
    if current != target {
        return Err(AppError::SymlinkConflict {
            link: link_path.to_path_buf(),
            kind: SymlinkConflictKind::PointsElsewhere,
        }
        .into());
    }
    Ok(true)
}
