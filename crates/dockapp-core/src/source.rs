use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use url::Url;

use crate::name::validate_app_name;
use crate::AppError;

pub const PKG_DIR_NAME: &str = "pkg";

const SCHEME_SEPARATOR: &str = "://";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SourceScheme {
    File,
    Http,
    Https,
    Git,
}

impl SourceScheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Http => "http",
            Self::Https => "https",
            Self::Git => "git",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "file" => Some(Self::File),
            "http" => Some(Self::Http),
            "https" => Some(Self::Https),
            "git" => Some(Self::Git),
            _ => None,
        }
    }
}

/// A parsed app source reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUrl {
    scheme: SourceScheme,
    host: String,
    path: String,
}

impl SourceUrl {
    pub fn scheme(&self) -> SourceScheme {
        self.scheme
    }

    /// Host including a non-default port, empty for most `file://` sources.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path.split('/').filter(|segment| !segment.is_empty())
    }

    pub fn app_name(&self) -> Option<&str> {
        self.segments().last()
    }

    /// `<scheme>/<host>/<path...>` relative to the package tree.
    pub fn package_rel_path(&self) -> Result<PathBuf> {
        let Some(app_name) = self.app_name() else {
            return Err(AppError::MissingPath(self.to_string()).into());
        };
        validate_app_name(app_name)?;

        let mut relative = PathBuf::from(self.scheme.as_str());
        if !self.host.is_empty() {
            relative.push(&self.host);
        }
        for segment in self.segments() {
            relative.push(segment);
        }
        Ok(relative)
    }
}

impl fmt::Display for SourceUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}",
            self.scheme.as_str(),
            SCHEME_SEPARATOR,
            self.host,
            self.path
        )
    }
}

pub fn parse_source_url(raw: &str) -> Result<SourceUrl> {
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;
    parse_source_url_in(raw, &cwd)
}

/// Parses `raw`, lifting plain paths to `file://` URLs relative to `cwd`.
pub fn parse_source_url_in(raw: &str, cwd: &Path) -> Result<SourceUrl> {
    let lifted;
    let candidate = if raw.contains(SCHEME_SEPARATOR) {
        raw
    } else {
        lifted = lift_file_path(raw, cwd)?;
        lifted.as_str()
    };

    let url = Url::parse(candidate).with_context(|| format!("invalid URL: {raw}"))?;
    let Some(scheme) = SourceScheme::parse(url.scheme()) else {
        return Err(AppError::UnsupportedScheme {
            scheme: url.scheme().to_string(),
            url: raw.to_string(),
        }
        .into());
    };

    let mut host = url.host_str().unwrap_or_default().to_string();
    if let Some(port) = url.port() {
        host.push_str(&format!(":{port}"));
    }

    Ok(SourceUrl {
        scheme,
        host,
        path: url.path().to_string(),
    })
}

/// `<app_base>/pkg/<scheme>/<host>/<path>` for the source `raw`.
pub fn make_app_path(app_base: &Path, raw: &str) -> Result<PathBuf> {
    let source = parse_source_url(raw)?;
    let relative = source.package_rel_path()?;
    Ok(app_base.join(PKG_DIR_NAME).join(relative))
}

fn lift_file_path(raw: &str, cwd: &Path) -> Result<String> {
    let path = Path::new(raw);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };
    let url = Url::from_file_path(&absolute)
        .map_err(|_| anyhow!("cannot express path as a file URL: {}", absolute.display()))?;
    Ok(url.into())
}
