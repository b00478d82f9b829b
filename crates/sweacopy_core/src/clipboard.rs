use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::{Context, Result, bail};
use tracing::{debug, warn};

/// Somewhere text can be copied to.
pub trait ClipboardBackend {
    fn name(&self) -> &'static str;
    fn write_text(&mut self, text: &str) -> Result<()>;
}

/// The platform clipboard through `arboard`.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl ClipboardBackend for SystemClipboard {
    fn name(&self) -> &'static str {
        "system"
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        let mut clipboard = arboard::Clipboard::new().context("clipboard unavailable")?;
        clipboard
            .set_text(text.to_string())
            .context("clipboard write rejected")
    }
}

/// Pipes the text into the platform copy command.
/// - macOS: pbcopy
/// - Linux: xclip, then xsel
///
/// Windows has no candidate: `clip` reads the ANSI code page and mangles
/// Hangul, so only the system clipboard is tried there.
#[derive(Debug, Default)]
pub struct CommandClipboard;

impl CommandClipboard {
    fn candidates() -> &'static [(&'static str, &'static str)] {
        if cfg!(target_os = "macos") {
            &[("pbcopy", "")]
        } else if cfg!(target_os = "windows") {
            &[]
        } else {
            &[
                ("xclip", "-selection clipboard"),
                ("xsel", "--clipboard --input"),
            ]
        }
    }
}

impl ClipboardBackend for CommandClipboard {
    fn name(&self) -> &'static str {
        "command"
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        let mut last_error = None::<String>;
        for (program, args) in Self::candidates() {
            match pipe_into(program, args, text) {
                Ok(()) => return Ok(()),
                Err(error) => last_error = Some(format!("{error:#}")),
            }
        }
        bail!(
            "{}",
            last_error.unwrap_or_else(|| "no clipboard command available".to_string())
        )
    }
}

fn pipe_into(program: &str, args: &str, text: &str) -> Result<()> {
    let mut child = Command::new(program)
        .args(args.split_whitespace())
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("failed to spawn {program}"))?;

    if let Some(mut stdin) = child.stdin.take()
        && let Err(error) = stdin.write_all(text.as_bytes())
    {
        drop(stdin);
        let _ = child.kill();
        let _ = child.wait();
        return Err(error).with_context(|| format!("failed to write to {program}"));
    }

    let status = child
        .wait()
        .with_context(|| format!("failed to wait for {program}"))?;
    if !status.success() {
        bail!("{program} exited with {status}");
    }
    Ok(())
}

/// Best-effort copy: primary backend first, fallback on any failure.
pub struct ClipboardWriter {
    primary: Box<dyn ClipboardBackend>,
    fallback: Box<dyn ClipboardBackend>,
}

impl ClipboardWriter {
    pub fn new(primary: Box<dyn ClipboardBackend>, fallback: Box<dyn ClipboardBackend>) -> Self {
        Self { primary, fallback }
    }

    /// Platform default. On Linux the copy commands go first: an X11 or
    /// Wayland selection owned by this process vanishes when it exits, while
    /// xclip and xsel keep serving it.
    pub fn system() -> Self {
        if cfg!(target_os = "linux") {
            Self::new(Box::new(CommandClipboard), Box::new(SystemClipboard))
        } else {
            Self::new(Box::new(SystemClipboard), Box::new(CommandClipboard))
        }
    }

    /// Names of the primary and fallback backends, in the order tried.
    pub fn backend_names(&self) -> (&'static str, &'static str) {
        (self.primary.name(), self.fallback.name())
    }

    /// Returns whether either backend accepted the text.
    pub fn write(&mut self, text: &str) -> bool {
        match self.primary.write_text(text) {
            Ok(()) => {
                debug!(backend = self.primary.name(), "clipboard written");
                return true;
            }
            Err(error) => {
                debug!(backend = self.primary.name(), "clipboard write failed: {error:#}");
            }
        }

        match self.fallback.write_text(text) {
            Ok(()) => {
                debug!(backend = self.fallback.name(), "clipboard written");
                true
            }
            Err(error) => {
                warn!(backend = self.fallback.name(), "clipboard write failed: {error:#}");
                false
            }
        }
    }
}
