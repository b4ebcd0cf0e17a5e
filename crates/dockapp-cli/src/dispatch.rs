use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use dockapp_core::{AppError, BuildOptions, CopyOptions, RunOptions};
use dockapp_installer::{
    install_app, launch_app, remove_apps, resolve_destination, AppLayout, AppOptions,
    LaunchOutcome, AUTO_DESTINATION,
};
use tracing::debug;

use crate::engine::DockerEngine;
use crate::render::CliStatus;
use crate::{AppArgs, AppCommands, Cli, Commands};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum AppMode {
    Install,
    Launch,
}

pub(crate) fn run_cli(cli: Cli) -> Result<()> {
    let Commands::App { command } = cli.command;
    let engine = DockerEngine::new(&cli.engine);
    match command {
        AppCommands::Install(args) => {
            let layout = AppLayout::from_env()?;
            let options = build_app_options(layout, args, AppMode::Install, cli.content_trust)?;
            let mut status = CliStatus::current(options.build.quiet);
            let outcome = install_app(&options, &engine, &mut status)?;
            debug!(
                install_path = %outcome.install_path.display(),
                kind = ?outcome.kind,
                "app installed"
            );
        }
        AppCommands::Launch(args) => {
            let layout = AppLayout::from_env()?;
            let options = build_app_options(layout, args, AppMode::Launch, cli.content_trust)?;
            let mut status = CliStatus::current(options.build.quiet);
            if let LaunchOutcome::Detached { pid } = launch_app(&options, &engine, &mut status)? {
                debug!(pid, "app detached");
            }
        }
        AppCommands::Remove { urls } => {
            let layout = AppLayout::from_env()?;
            let mut status = CliStatus::current(false);
            remove_apps(&layout, &urls, &mut status)?;
        }
    }

    Ok(())
}

/// Translates parsed flags into the installer's option record.
pub(crate) fn build_app_options(
    layout: AppLayout,
    args: AppArgs,
    mode: AppMode,
    content_trust: bool,
) -> Result<AppOptions> {
    let for_launch = mode == AppMode::Launch;
    let destination = match (mode, args.destination.as_deref()) {
        (AppMode::Launch, None) => Some(AUTO_DESTINATION),
        (_, value) => value,
    };
    let destination = resolve_destination(destination, &layout, for_launch)?;

    let mut options = AppOptions::new(layout, args.args)?;
    options.destination = destination;
    options.egress = args.egress;
    options.detach = args.detach;
    options.launch = args.launch && !for_launch;
    if let Some(path) = args.image_id_file {
        options.image_id_file = PathBuf::from(path);
    }
    if let Some(path) = args.container_id_file {
        options.container_id_file = PathBuf::from(path);
    }

    let build = args.build;
    options.build = BuildOptions {
        file: build.file,
        tags: build.tags,
        build_args: build.build_args,
        labels: build.labels,
        target: build.target,
        platform: build.platform,
        network: build.network,
        no_cache: build.no_cache,
        pull: build.pull,
        quiet: build.quiet,
        content_trust,
        ..BuildOptions::default()
    };

    let run = args.run;
    options.run = RunOptions {
        entrypoint: run.entrypoint,
        env: run.env,
        env_files: run.env_files,
        privileged: run.privileged,
        volumes: run.volumes,
        workdir: run.workdir,
        content_trust,
    };

    options.copy = CopyOptions {
        archive: args.copy.archive,
        follow_link: args.copy.follow_link,
        ..CopyOptions::default()
    };
    Ok(options)
}

pub(crate) fn exit_code_for_error(err: &anyhow::Error) -> ExitCode {
    ExitCode::from(exit_status_for_error(err))
}

/// A child's exit code, `128 + signo` after a signal, otherwise 1.
pub(crate) fn exit_status_for_error(err: &anyhow::Error) -> u8 {
    let code = match err.downcast_ref::<AppError>() {
        Some(AppError::ChildFailed { code, .. }) => *code,
        Some(AppError::SignalInterrupted { signo, .. }) => 128 + *signo,
        _ => 1,
    };
    u8::try_from(code)
        .ok()
        .filter(|code| *code != 0)
        .unwrap_or(1)
}
