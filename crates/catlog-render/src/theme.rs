use std::env;
use std::io;

use crossterm::style::Color;
use crossterm::tty::IsTty;

use catlog_types::EventKind;

/// Colors used for the table output
pub struct Theme;

impl Theme {
    pub const FAILED: Color = Color::Red;
    pub const ACCEPTED: Color = Color::Green;
    pub const COMMAND: Color = Color::Cyan;
    pub const SESSION: Color = Color::Yellow;
    pub const ELEVATION: Color = Color::Magenta;

    /// Color of the `type` cell; `None` means plain
    pub fn kind(kind: EventKind) -> Option<Color> {
        match kind {
            EventKind::SshFailed | EventKind::WinLogonFailed => Some(Self::FAILED),
            EventKind::SshAccepted | EventKind::WinLogon => Some(Self::ACCEPTED),
            EventKind::SudoCmd => Some(Self::COMMAND),
            EventKind::SudoOpen => Some(Self::SESSION),
            EventKind::Pkexec => Some(Self::ELEVATION),
            _ => None,
        }
    }
}

/// Rendering switches, decided once before anything is written
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderConfig {
    pub color: bool,
}

impl RenderConfig {
    pub fn plain() -> Self {
        Self { color: false }
    }

    pub fn colored() -> Self {
        Self { color: true }
    }

    /// Inspect stdout and the environment
    ///
    /// `disabled` folds together `--no-color` and `color = false` from the
    /// config file.
    pub fn detect(disabled: bool) -> Self {
        Self::resolve(
            disabled,
            io::stdout().is_tty(),
            env::var("TERM").ok().as_deref(),
            env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()),
        )
    }

    pub fn resolve(disabled: bool, is_tty: bool, term: Option<&str>, no_color_env: bool) -> Self {
        let dumb = matches!(term, None | Some("") | Some("dumb"));
        Self {
            color: !disabled && is_tty && !dumb && !no_color_env,
        }
    }
}
