use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, Result};
use dockapp_core::{
    split_args, validate_app_name, AppError, BuildOptions, ContainerOptions, CopyOptions,
    RunOptions,
};

use crate::layout::{next_monotonic_id, AppLayout};

pub const DEFAULT_EGRESS: &str = "/egress";
pub const AUTO_DESTINATION: &str = "auto";

static ID_FILE_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// One install or launch invocation.
///
/// The layout is captured when the options are created and cannot be
/// replaced afterwards, so every derived path refers to the same app base.
#[derive(Debug, Clone)]
pub struct AppOptions {
    pub destination: PathBuf,
    pub egress: String,
    pub detach: bool,
    pub launch: bool,
    pub image_id_file: PathBuf,
    pub container_id_file: PathBuf,
    pub build: BuildOptions,
    pub run: RunOptions,
    pub container: ContainerOptions,
    pub copy: CopyOptions,
    args: Vec<String>,
    layout: AppLayout,
}

impl AppOptions {
    pub fn new(layout: AppLayout, args: Vec<String>) -> Result<Self> {
        Ok(Self {
            destination: layout.base().to_path_buf(),
            egress: DEFAULT_EGRESS.to_string(),
            detach: false,
            launch: false,
            image_id_file: default_id_file("image")?,
            container_id_file: default_id_file("container")?,
            build: BuildOptions::default(),
            run: RunOptions::default(),
            container: ContainerOptions::default(),
            copy: CopyOptions::default(),
            args,
            layout,
        })
    }

    pub fn layout(&self) -> &AppLayout {
        &self.layout
    }

    pub fn source(&self) -> Option<&str> {
        split_args(&self.args).source
    }

    pub fn run_args(&self) -> &[String] {
        split_args(&self.args).run_args
    }

    pub fn launch_args(&self) -> &[String] {
        split_args(&self.args).launch_args
    }

    pub fn build_context(&self) -> String {
        self.source().unwrap_or(".").to_string()
    }

    /// True when the cleaned destination is a prefix of the app base.
    pub fn is_default_layout(&self) -> bool {
        let destination = clean_path(&self.destination);
        !destination.as_os_str().is_empty() && self.layout.base().starts_with(&destination)
    }

    pub fn bin_path(&self) -> PathBuf {
        self.layout.bin_dir()
    }

    pub fn app_path(&self) -> Result<PathBuf> {
        self.layout.app_path(&self.build_context())
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        self.layout.allocate_cache_dir()
    }

    pub fn image_id(&self) -> Result<String> {
        read_id_file(&self.image_id_file, "image")
    }

    pub fn container_id(&self) -> Result<String> {
        read_id_file(&self.container_id_file, "container")
    }

    /// Deletes ID files allocated under [`process_temp_dir`], then the
    /// directory once it is empty. Caller-supplied paths are kept.
    pub fn remove_scratch_id_files(&self) {
        let scratch = process_temp_dir();
        for id_file in [&self.image_id_file, &self.container_id_file] {
            if id_file.starts_with(&scratch) {
                let _ = fs::remove_file(id_file);
            }
        }
        let _ = fs::remove_dir(&scratch);
    }

    pub fn validate(&self) -> Result<()> {
        if self.destination.as_os_str().is_empty() {
            return Err(AppError::EmptyDestination.into());
        }
        if self.egress.is_empty() {
            return Err(AppError::EmptyEgress.into());
        }

        let egress_name = Path::new(&self.egress)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();
        validate_app_name(egress_name)?;
        Ok(())
    }
}

/// Resolves a `--destination` value to an absolute path.
///
/// `None` means the app base; `auto` means the app base for install and a
/// fresh temp directory for launch.
pub fn resolve_destination(
    value: Option<&str>,
    layout: &AppLayout,
    for_launch: bool,
) -> Result<PathBuf> {
    match value {
        None => Ok(layout.base().to_path_buf()),
        Some(AUTO_DESTINATION) if for_launch => launch_destination(),
        Some(AUTO_DESTINATION) => Ok(layout.base().to_path_buf()),
        Some("") => Ok(PathBuf::new()),
        Some(path) => {
            let path = Path::new(path);
            if path.is_absolute() {
                return Ok(clean_path(path));
            }
            let cwd = std::env::current_dir().context("failed to resolve current directory")?;
            Ok(clean_path(&cwd.join(path)))
        }
    }
}

pub fn launch_destination() -> Result<PathBuf> {
    Ok(std::env::temp_dir().join(format!("docker-app-launch-{:x}", next_monotonic_id()?)))
}

/// A not-yet-existing ID file path in the process-scoped temp directory.
pub fn default_id_file(kind: &str) -> Result<PathBuf> {
    let sequence = ID_FILE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    Ok(process_temp_dir().join(format!(
        "{kind}-{:x}-{sequence}.id",
        next_monotonic_id()?
    )))
}

pub fn process_temp_dir() -> PathBuf {
    std::env::temp_dir().join(format!("dockapp-{}", std::process::id()))
}

/// Lexically normalizes `.` and `..` components.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !cleaned.pop() && !cleaned.has_root() {
                    cleaned.push("..");
                }
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    cleaned
}

fn read_id_file(path: &Path, kind: &str) -> Result<String> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {kind} ID file: {}", path.display()))?;
    Ok(raw.trim_end().to_string())
}
