use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Context, Result};
use dockapp_core::{make_app_path, PKG_DIR_NAME};
use tracing::debug;

use crate::fs_utils::create_dir_all_0755;

pub const APP_BASE_ENV: &str = "DOCKER_APP_BASE";

static LAST_MONOTONIC_ID: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppLayout {
    base: PathBuf,
}

impl AppLayout {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self::new(default_app_base()?))
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.base.join("bin")
    }

    pub fn pkg_dir(&self) -> PathBuf {
        self.base.join(PKG_DIR_NAME)
    }

    pub fn cache_root(&self) -> PathBuf {
        self.base.join(".cache")
    }

    pub fn bin_link_path(&self, app_name: &str) -> PathBuf {
        self.bin_dir().join(app_name)
    }

    pub fn app_path(&self, source: &str) -> Result<PathBuf> {
        make_app_path(&self.base, source)
    }

    /// Creates a fresh `.cache/<hex-id>` directory with mode 0755.
    pub fn allocate_cache_dir(&self) -> Result<PathBuf> {
        let root = self.cache_root();
        create_dir_all_0755(&root)?;

        loop {
            let dir = root.join(format!("{:x}", next_monotonic_id()?));
            match create_dir_0755(&dir) {
                Ok(()) => {
                    debug!(path = %dir.display(), "allocated cache dir");
                    return Ok(dir);
                }
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(err) => {
                    return Err(err)
                        .with_context(|| format!("failed to create cache dir: {}", dir.display()))
                }
            }
        }
    }
}

pub fn default_app_base() -> Result<PathBuf> {
    if cfg!(windows) {
        return resolve_app_base(
            std::env::var_os(APP_BASE_ENV),
            std::env::var_os("LOCALAPPDATA"),
        );
    }
    resolve_app_base(std::env::var_os(APP_BASE_ENV), std::env::var_os("HOME"))
}

pub(crate) fn resolve_app_base(
    override_base: Option<OsString>,
    home: Option<OsString>,
) -> Result<PathBuf> {
    if let Some(base) = override_base.filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(base));
    }

    let home = home
        .filter(|value| !value.is_empty())
        .ok_or_else(|| anyhow!("neither {APP_BASE_ENV} nor a home directory is set"))?;
    Ok(PathBuf::from(home).join(".docker").join("app"))
}

/// Strictly increasing within the process, seeded from the wall clock.
pub fn next_monotonic_id() -> Result<u64> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system time is before unix epoch")?
        .as_nanos() as u64;

    let mut last = LAST_MONOTONIC_ID.load(Ordering::Relaxed);
    loop {
        let next = now.max(last + 1);
        match LAST_MONOTONIC_ID.compare_exchange(last, next, Ordering::SeqCst, Ordering::Relaxed) {
            Ok(_) => return Ok(next),
            Err(actual) => last = actual,
        }
    }
}

fn create_dir_0755(path: &Path) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }
    builder.create(path)
}
