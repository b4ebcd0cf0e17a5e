use std::io::IsTerminal;

use anstyle::{AnsiColor, Effects, Style};
use dockapp_installer::{StatusLevel, StatusSink};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum OutputStyle {
    Plain,
    Rich,
}

pub(crate) fn current_output_style() -> OutputStyle {
    if std::env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty()) {
        return OutputStyle::Plain;
    }
    resolve_output_style(std::io::stdout().is_terminal())
}

pub(crate) fn resolve_output_style(stdout_is_tty: bool) -> OutputStyle {
    if stdout_is_tty {
        OutputStyle::Rich
    } else {
        OutputStyle::Plain
    }
}

pub(crate) fn render_status_line(style: OutputStyle, status: &str, message: &str) -> String {
    match style {
        OutputStyle::Plain => message.to_string(),
        OutputStyle::Rich => {
            let (badge, badge_style) = match status {
                "ok" => ("[OK]", ok_style()),
                "warn" => ("[WARN]", warn_style()),
                "error" => ("[ERR]", error_style()),
                _ => ("[..]", Style::new()),
            };
            format!(
                "{}{}{} {}",
                badge_style.render(),
                badge,
                badge_style.render_reset(),
                message
            )
        }
    }
}

fn ok_style() -> Style {
    Style::new()
        .fg_color(Some(AnsiColor::BrightGreen.into()))
        .effects(Effects::BOLD)
}

fn warn_style() -> Style {
    Style::new()
        .fg_color(Some(AnsiColor::BrightYellow.into()))
        .effects(Effects::BOLD)
}

fn error_style() -> Style {
    Style::new()
        .fg_color(Some(AnsiColor::BrightRed.into()))
        .effects(Effects::BOLD)
}

/// Prints app milestones; errors go to stderr and survive `--quiet`.
pub(crate) struct CliStatus {
    style: OutputStyle,
    quiet: bool,
}

impl CliStatus {
    pub(crate) fn new(style: OutputStyle, quiet: bool) -> Self {
        Self { style, quiet }
    }

    pub(crate) fn current(quiet: bool) -> Self {
        Self::new(current_output_style(), quiet)
    }

    pub(crate) fn should_print(&self, level: StatusLevel) -> bool {
        level == StatusLevel::Error || !self.quiet
    }
}

impl StatusSink for CliStatus {
    fn status(&mut self, level: StatusLevel, message: &str) {
        if !self.should_print(level) {
            return;
        }
        let line = render_status_line(self.style, level.as_str(), message);
        match level {
            StatusLevel::Error | StatusLevel::Warn => eprintln!("{line}"),
            StatusLevel::Ok => println!("{line}"),
        }
    }
}
