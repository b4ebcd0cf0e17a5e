use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dockapp_core::AppError;
use tracing::debug;

use crate::fs_utils::{remove_link_if_present, set_executable};
use crate::launch::{spawn_app, LaunchRequest};
use crate::layout::AppLayout;
use crate::status::StatusSink;
use crate::UNINSTALL_HOOK;

/// Symlinks in the bin directory, keyed by link path, valued by raw target.
pub type BinLinks = BTreeMap<PathBuf, PathBuf>;

/// Removes each source's package, running its uninstaller first.
///
/// Failures are collected per source; the batch always runs to the end.
pub fn remove_apps(layout: &AppLayout, sources: &[String], sink: &mut dyn StatusSink) -> Result<()> {
    let mut links = read_bin_links(&layout.bin_dir())?;
    let pkg_dir = layout.pkg_dir();
    let mut failed = Vec::new();

    for source in sources {
        let app_path = match layout.app_path(source) {
            Ok(app_path) => app_path,
            Err(err) => {
                sink.error(&format!("{source}: {err:#}"));
                failed.push(source.clone());
                continue;
            }
        };

        run_uninstall_hook(layout, &app_path, sink);

        match fs::remove_dir_all(&app_path) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                sink.warn(&format!("App not installed: {source}"));
            }
            Err(err) => {
                sink.error(&format!(
                    "{source}: failed to remove {}: {err}",
                    app_path.display()
                ));
                failed.push(source.clone());
                continue;
            }
        }

        prune_empty_ancestors(app_path.parent(), &pkg_dir);

        for link in links_into(&links, &app_path) {
            match remove_link_if_present(&link) {
                Ok(_) => {
                    debug!(link = %link.display(), "removed app link");
                    links.remove(&link);
                }
                Err(err) => sink.warn(&format!("failed to remove link {}: {err}", link.display())),
            }
        }

        sink.ok(&format!("App removed: {source}"));
    }

    if failed.is_empty() {
        Ok(())
    } else {
        Err(AppError::RemoveFailed { urls: failed }.into())
    }
}

pub fn read_bin_links(bin_dir: &Path) -> Result<BinLinks> {
    let entries = match fs::read_dir(bin_dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(BinLinks::new()),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read bin directory: {}", bin_dir.display()))
        }
    };

    let mut links = BinLinks::new();
    for entry in entries {
        let entry = entry
            .with_context(|| format!("failed to iterate bin directory: {}", bin_dir.display()))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .with_context(|| format!("failed to inspect {}", path.display()))?;
        if !file_type.is_symlink() {
            continue;
        }
        let target = fs::read_link(&path)
            .with_context(|| format!("failed to read link: {}", path.display()))?;
        links.insert(path, target);
    }
    Ok(links)
}

/// Links whose target text contains `app_path` followed by a separator or the end.
pub fn links_into(links: &BinLinks, app_path: &Path) -> Vec<PathBuf> {
    let needle = app_path.to_string_lossy();
    links
        .iter()
        .filter(|(_, target)| target_contains_path(&target.to_string_lossy(), &needle))
        .map(|(link, _)| link.clone())
        .collect()
}

fn target_contains_path(target: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    target.match_indices(needle).any(|(index, _)| {
        target[index + needle.len()..]
            .chars()
            .next()
            .map_or(true, std::path::is_separator)
    })
}

/// Deletes empty directories from `start` upwards, never touching `stop`.
pub fn prune_empty_ancestors(start: Option<&Path>, stop: &Path) {
    let mut current = start;
    while let Some(dir) = current {
        if dir == stop || !dir.starts_with(stop) {
            break;
        }
        if fs::remove_dir(dir).is_err() {
            break;
        }
        debug!(dir = %dir.display(), "pruned empty package dir");
        current = dir.parent();
    }
}

fn run_uninstall_hook(layout: &AppLayout, app_path: &Path, sink: &mut dyn StatusSink) {
    let hook_path = app_path.join(UNINSTALL_HOOK);
    if !hook_path.is_file() {
        return;
    }

    let result = set_executable(&hook_path)
        .and_then(|()| spawn_app(&LaunchRequest::new(&hook_path, layout.base())));
    if let Err(err) = result {
        sink.warn(&format!(
            "uninstaller failed for {}: {err:#}",
            app_path.display()
        ));
    }
}
