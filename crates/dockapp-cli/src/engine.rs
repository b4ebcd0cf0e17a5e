use std::ffi::OsString;
use std::process::Command;

use anyhow::{anyhow, Context, Result};
use dockapp_core::{BuildOptions, ContainerOptions, CopyOptions, RunOptions};
use dockapp_installer::Engine;
use tracing::debug;

/// Drives the `docker` executable (or a compatible one) as a subprocess.
pub(crate) struct DockerEngine {
    program: String,
}

impl DockerEngine {
    pub(crate) fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, args: Vec<OsString>, context_message: &str) -> Result<()> {
        debug!(program = %self.program, ?args, "running engine command");
        let mut command = Command::new(&self.program);
        command.args(&args);
        run_command(&mut command, context_message)
    }
}

impl Engine for DockerEngine {
    fn run_build(&self, options: &BuildOptions) -> Result<()> {
        self.run(build_command_args(options), "engine build failed")
    }

    fn run_container(&self, options: &RunOptions, container: &ContainerOptions) -> Result<()> {
        self.run(run_command_args(options, container), "engine run failed")
    }

    fn run_copy(&self, options: &CopyOptions) -> Result<()> {
        self.run(copy_command_args(options), "engine cp failed")
    }
}

fn run_command(command: &mut Command, context_message: &str) -> Result<()> {
    let status = command
        .status()
        .with_context(|| format!("{context_message}: command failed to start"))?;
    if status.success() {
        return Ok(());
    }
    Err(anyhow!("{context_message}: status={status}"))
}

fn content_trust_flag(content_trust: bool) -> OsString {
    format!("--disable-content-trust={}", !content_trust).into()
}

fn push_value(args: &mut Vec<OsString>, flag: &str, value: &str) {
    args.push(flag.into());
    args.push(value.into());
}

fn push_values(args: &mut Vec<OsString>, flag: &str, values: &[String]) {
    for value in values {
        push_value(args, flag, value);
    }
}

fn push_optional(args: &mut Vec<OsString>, flag: &str, value: Option<&str>) {
    if let Some(value) = value {
        push_value(args, flag, value);
    }
}

fn push_switch(args: &mut Vec<OsString>, flag: &str, enabled: bool) {
    if enabled {
        args.push(flag.into());
    }
}

pub(crate) fn build_command_args(options: &BuildOptions) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["build".into()];
    args.push("--iidfile".into());
    args.push(options.image_id_file.clone().into_os_string());
    push_optional(&mut args, "--file", options.file.as_deref());
    push_values(&mut args, "--tag", &options.tags);
    push_values(&mut args, "--build-arg", &options.build_args);
    push_values(&mut args, "--label", &options.labels);
    push_optional(&mut args, "--target", options.target.as_deref());
    push_optional(&mut args, "--platform", options.platform.as_deref());
    push_optional(&mut args, "--network", options.network.as_deref());
    push_switch(&mut args, "--no-cache", options.no_cache);
    push_switch(&mut args, "--pull", options.pull);
    push_switch(&mut args, "--quiet", options.quiet);
    args.push(content_trust_flag(options.content_trust));
    args.push(options.context.clone().into());
    args
}

pub(crate) fn run_command_args(options: &RunOptions, container: &ContainerOptions) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["run".into()];
    args.push("--cidfile".into());
    args.push(container.container_id_file.clone().into_os_string());
    push_optional(&mut args, "--entrypoint", options.entrypoint.as_deref());
    push_values(&mut args, "--env", &options.env);
    push_values(&mut args, "--env-file", &options.env_files);
    push_switch(&mut args, "--privileged", options.privileged);
    push_values(&mut args, "--volume", &options.volumes);
    push_optional(&mut args, "--workdir", options.workdir.as_deref());
    args.push(content_trust_flag(options.content_trust));
    args.push(container.image.clone().into());
    args.extend(container.args.iter().map(OsString::from));
    args
}

/// `docker cp` copies the egress contents, not the egress directory itself.
pub(crate) fn copy_command_args(options: &CopyOptions) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["cp".into()];
    push_switch(&mut args, "--archive", options.archive);
    push_switch(&mut args, "--follow-link", options.follow_link);
    args.push(format!("{}/.", options.source.trim_end_matches('/')).into());
    args.push(options.destination.clone().into_os_string());
    args
}
