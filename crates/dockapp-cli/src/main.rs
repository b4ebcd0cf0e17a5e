mod dispatch;
mod engine;
mod render;

use std::ffi::OsString;
use std::process::ExitCode;

use clap::builder::FalseyValueParser;
use clap::{ArgAction, Args, Command, CommandFactory, FromArgMatches, Parser, Subcommand};
use dockapp_installer::{AUTO_DESTINATION, DEFAULT_EGRESS};

use crate::dispatch::{exit_code_for_error, run_cli};
use crate::render::{current_output_style, render_status_line};

/// Arguments that stay visible in `app launch --help`.
const LAUNCH_VISIBLE_ARGS: [&str; 3] = ["destination", "detach", "quiet"];

#[derive(Parser, Debug)]
#[command(name = "dockapp")]
#[command(about = "Build, install and launch apps produced by container builds", long_about = None)]
struct Cli {
    /// Engine executable used for build, run and cp
    #[arg(long, global = true, env = "DOCKER", default_value = "docker")]
    engine: String,
    /// Verify image signatures on build and run
    #[arg(
        long,
        global = true,
        env = "DOCKER_CONTENT_TRUST",
        action = ArgAction::SetTrue,
        value_parser = FalseyValueParser::new()
    )]
    content_trust: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage container-built apps
    App {
        #[command(subcommand)]
        command: AppCommands,
    },
}

#[derive(Subcommand, Debug)]
enum AppCommands {
    /// Build an app and install it under the app base
    Install(AppArgs),
    /// Build an app into a scratch directory and run it
    Launch(AppArgs),
    /// Remove installed apps
    #[command(visible_aliases = ["rm", "uninstall"])]
    Remove {
        #[arg(required = true, num_args = 1.., value_name = "URL")]
        urls: Vec<String>,
    },
}

#[derive(Args, Debug, Clone)]
struct AppArgs {
    /// Install root; defaults to the app base
    #[arg(long)]
    destination: Option<String>,
    /// Directory inside the container that holds the app
    #[arg(long, default_value = DEFAULT_EGRESS)]
    egress: String,
    /// Start the app without waiting for it
    #[arg(short = 'd', long)]
    detach: bool,
    /// Run the app after installing it
    #[arg(long)]
    launch: bool,
    /// Write the image ID to this file
    #[arg(long, value_name = "FILE")]
    image_id_file: Option<String>,
    /// Write the container ID to this file
    #[arg(long, value_name = "FILE")]
    container_id_file: Option<String>,
    #[command(flatten)]
    build: BuildArgs,
    #[command(flatten)]
    run: RunArgs,
    #[command(flatten)]
    copy: CopyArgs,
    /// Source URL, then the container command and its arguments; arguments
    /// after `--` go to the app
    #[arg(
        required = true,
        num_args = 1..,
        trailing_var_arg = true,
        value_name = "URL [COMMAND] [ARG]..."
    )]
    args: Vec<String>,
}

#[derive(Args, Debug, Clone, Default)]
struct BuildArgs {
    /// Name of the Dockerfile
    #[arg(short = 'f', long, value_name = "PATH")]
    file: Option<String>,
    /// Name and optionally a tag for the image
    #[arg(short = 't', long = "tag", value_name = "NAME")]
    tags: Vec<String>,
    /// Build-time variables
    #[arg(long = "build-arg", value_name = "KEY=VALUE")]
    build_args: Vec<String>,
    /// Image metadata
    #[arg(long = "label", value_name = "KEY=VALUE")]
    labels: Vec<String>,
    /// Build stage to stop at
    #[arg(long)]
    target: Option<String>,
    /// Platform for the build
    #[arg(long)]
    platform: Option<String>,
    /// Networking mode for RUN instructions
    #[arg(long)]
    network: Option<String>,
    /// Do not use cache when building the image
    #[arg(long)]
    no_cache: bool,
    /// Always attempt to pull newer base images
    #[arg(long)]
    pull: bool,
    /// Suppress build output and progress lines
    #[arg(short = 'q', long)]
    quiet: bool,
}

#[derive(Args, Debug, Clone, Default)]
struct RunArgs {
    /// Overwrite the image entrypoint
    #[arg(long)]
    entrypoint: Option<String>,
    /// Set container environment variables
    #[arg(short = 'e', long = "env", value_name = "KEY=VALUE")]
    env: Vec<String>,
    /// Read container environment variables from a file
    #[arg(long = "env-file", value_name = "FILE")]
    env_files: Vec<String>,
    /// Give extended privileges to the container
    #[arg(long)]
    privileged: bool,
    /// Bind mount a volume
    #[arg(short = 'v', long = "volume", value_name = "SPEC")]
    volumes: Vec<String>,
    /// Working directory inside the container
    #[arg(short = 'w', long)]
    workdir: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
struct CopyArgs {
    /// Archive mode (copy all uid/gid information)
    #[arg(short = 'a', long)]
    archive: bool,
    /// Always follow symbol links in the egress path
    #[arg(short = 'L', long)]
    follow_link: bool,
}

/// The command tree with launch-specific presentation applied.
fn cli_command() -> Command {
    Cli::command().mut_subcommand("app", |app| {
        app.mut_subcommand("launch", hide_launch_only_args)
    })
}

fn hide_launch_only_args(launch: Command) -> Command {
    let hidden = launch
        .get_arguments()
        .filter(|arg| !arg.is_positional())
        .map(|arg| arg.get_id().to_string())
        .filter(|id| !LAUNCH_VISIBLE_ARGS.contains(&id.as_str()))
        .collect::<Vec<_>>();

    hidden
        .iter()
        .fold(launch, |command, id| command.mut_arg(id, |arg| arg.hide(true)))
        .mut_arg("destination", |arg| {
            arg.default_value(AUTO_DESTINATION)
                .help("Scratch directory the app runs from")
        })
}

fn parse_cli_from<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let mut command = cli_command();
    let matches = command.try_get_matches_from_mut(args)?;
    Cli::from_arg_matches(&matches).map_err(|err| err.format(&mut command))
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("DOCKAPP_LOG")
        .or_else(|_| tracing_subscriber::EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("off"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> ExitCode {
    let cli = match parse_cli_from(std::env::args_os()) {
        Ok(cli) => cli,
        Err(err) => err.exit(),
    };
    init_tracing();

    match run_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!(
                "{}",
                render_status_line(current_output_style(), "error", &format!("{err:#}"))
            );
            exit_code_for_error(&err)
        }
    }
}
