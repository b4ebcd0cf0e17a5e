use anyhow::Result;
use dockapp_core::{BuildOptions, ContainerOptions, CopyOptions, RunOptions};

/// The build/run/copy capability the app commands delegate to.
///
/// Implementations write the image ID to `BuildOptions::image_id_file` and
/// the container ID to `ContainerOptions::container_id_file`. Errors are
/// surfaced to the user unchanged.
pub trait Engine {
    fn run_build(&self, options: &BuildOptions) -> Result<()>;

    fn run_container(&self, options: &RunOptions, container: &ContainerOptions) -> Result<()>;

    /// Copies `<container>:<path>` from `options.source` into `options.destination`.
    fn run_copy(&self, options: &CopyOptions) -> Result<()>;
}
