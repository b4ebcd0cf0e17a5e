use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

pub fn create_dir_all_0755(path: &Path) -> Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }
    builder
        .create(path)
        .with_context(|| format!("failed to create {}", path.display()))
}

pub fn set_executable(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755))
            .with_context(|| format!("failed to chmod 0755 {}", path.display()))?;
    }

    #[cfg(not(unix))]
    {
        fs::metadata(path).with_context(|| format!("failed to inspect {}", path.display()))?;
    }
    Ok(())
}

/// Removes `path` when it is a symlink or file, including dangling symlinks.
pub fn remove_link_if_present(path: &Path) -> io::Result<bool> {
    match fs::symlink_metadata(path) {
        Ok(_) => {
            fs::remove_file(path)?;
            Ok(true)
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

pub fn create_symlink(target: &Path, link: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(target, link).with_context(|| {
            format!(
                "failed to create symlink {} -> {}",
                link.display(),
                target.display()
            )
        })
    }

    #[cfg(windows)]
    {
        std::os::windows::fs::symlink_file(target, link).with_context(|| {
            format!(
                "failed to create symlink {} -> {}",
                link.display(),
                target.display()
            )
        })
    }

    #[cfg(not(any(unix, windows)))]
    {
        let _ = target;
        Err(anyhow::anyhow!(
            "symlinks are not supported on this platform: {}",
            link.display()
        ))
    }
}

/// Renames `src` to `dst`, copying when the rename crosses filesystems.
pub fn move_dir_or_copy(src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent() {
        create_dir_all_0755(parent)?;
    }

    match fs::rename(src, dst) {
        Ok(()) => Ok(()),
        Err(err) if is_cross_device(&err) => {
            debug!(
                src = %src.display(),
                dst = %dst.display(),
                "rename crosses filesystems, falling back to copy"
            );
            copy_then_remove(src, dst)
        }
        Err(err) => Err(err).with_context(|| {
            format!("failed to move {} to {}", src.display(), dst.display())
        }),
    }
}

/// A failed copy leaves neither a partial `dst` nor a missing `src`.
pub(crate) fn copy_then_remove(src: &Path, dst: &Path) -> Result<()> {
    if let Err(err) = copy_dir_recursive(src, dst) {
        let _ = fs::remove_dir_all(dst);
        return Err(err);
    }
    fs::remove_dir_all(src).with_context(|| format!("failed to clean up {}", src.display()))
}

fn is_cross_device(err: &io::Error) -> bool {
    #[cfg(unix)]
    {
        err.raw_os_error() == Some(libc::EXDEV)
    }

    #[cfg(windows)]
    {
        // ERROR_NOT_SAME_DEVICE
        err.raw_os_error() == Some(17)
    }

    #[cfg(not(any(unix, windows)))]
    {
        let _ = err;
        false
    }
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst).with_context(|| format!("failed to create {}", dst.display()))?;
    for entry in fs::read_dir(src).with_context(|| format!("failed to read {}", src.display()))? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        let metadata = fs::symlink_metadata(&src_path)
            .with_context(|| format!("failed to stat {}", src_path.display()))?;
        if metadata.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
            continue;
        }

        #[cfg(unix)]
        if metadata.file_type().is_symlink() {
            let target = fs::read_link(&src_path)
                .with_context(|| format!("failed to read symlink {}", src_path.display()))?;
            create_symlink(&target, &dst_path)?;
            continue;
        }

        fs::copy(&src_path, &dst_path).with_context(|| {
            format!(
                "failed to copy {} to {}",
                src_path.display(),
                dst_path.display()
            )
        })?;
    }
    Ok(())
}
