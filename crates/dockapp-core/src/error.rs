use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymlinkConflictKind {
    NotSymlink,
    PointsElsewhere,
}

/// Failures the app commands classify; engine and I/O errors stay opaque.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("destination must not be empty")]
    EmptyDestination,
    #[error("egress must not be empty")]
    EmptyEgress,
    #[error("invalid app name '{0}': must match ^[A-Za-z0-9][A-Za-z0-9_.+-]+$")]
    InvalidName(String),
    #[error("unsupported URL scheme '{scheme}' in '{url}': supported schemes are file, http, https, git")]
    UnsupportedScheme { scheme: String, url: String },
    #[error("URL has no path: {0}")]
    MissingPath(String),
    #[error("app already installed: {}", .0.display())]
    AlreadyInstalled(PathBuf),
    #[error("{}", symlink_conflict_message(.link, .kind))]
    SymlinkConflict {
        link: PathBuf,
        kind: SymlinkConflictKind,
    },
    #[error("no launchable entry (single file, run or install) in {}", .0.display())]
    NoEntryPoint(PathBuf),
    #[error("{program} exited with status {code}")]
    ChildFailed { program: String, code: i32 },
    #[error("signal received: {name}")]
    SignalInterrupted { name: String, signo: i32 },
    #[error("failed to remove:\n{}", .urls.join("\n"))]
    RemoveFailed { urls: Vec<String> },
}

fn symlink_conflict_message(link: &std::path::Path, kind: &SymlinkConflictKind) -> String {
    match kind {
        SymlinkConflictKind::NotSymlink => {
            format!("cannot create link, file exists and is not a symlink: {}", link.display())
        }
        SymlinkConflictKind::PointsElsewhere => {
            format!("cannot create link, symlink points to another app: {}", link.display())
        }
    }
}
