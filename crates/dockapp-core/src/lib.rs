mod args;
mod error;
mod name;
mod platform;
mod records;
mod source;

pub use args::{split_args, SplitArgs};
pub use error::{AppError, SymlinkConflictKind};
pub use name::{is_valid_app_name, validate_app_name};
pub use platform::{host_arch, host_build_args, host_os};
pub use records::{BuildOptions, ContainerOptions, CopyOptions, RunOptions};
pub use source::{
    make_app_path, parse_source_url, parse_source_url_in, SourceScheme, SourceUrl, PKG_DIR_NAME,
};

#[cfg(test)]
mod tests;
