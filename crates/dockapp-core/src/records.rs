use std::path::PathBuf;

/// Options handed to the engine's image build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOptions {
    pub context: String,
    pub image_id_file: PathBuf,
    pub file: Option<String>,
    pub tags: Vec<String>,
    pub build_args: Vec<String>,
    pub labels: Vec<String>,
    pub target: Option<String>,
    pub platform: Option<String>,
    pub network: Option<String>,
    pub no_cache: bool,
    pub pull: bool,
    pub quiet: bool,
    pub content_trust: bool,
}

/// Whitelisted `run` flags forwarded to the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub entrypoint: Option<String>,
    pub env: Vec<String>,
    pub env_files: Vec<String>,
    pub privileged: bool,
    pub volumes: Vec<String>,
    pub workdir: Option<String>,
    pub content_trust: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerOptions {
    pub image: String,
    pub args: Vec<String>,
    pub container_id_file: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyOptions {
    pub source: String,
    pub destination: PathBuf,
    pub archive: bool,
    pub follow_link: bool,
}
