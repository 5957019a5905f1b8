//! Handing things to other programs: the OS opener and the user's editor.

use std::env;
use std::io;
use std::path::Path;
use std::process::{Command, ExitStatus};

use tracing::info;

/// Opens URLs (and anything else the desktop knows how to open).
pub trait Opener {
    fn open(&self, target: &str) -> io::Result<()>;
}

#[derive(Debug, Default)]
pub struct SystemOpener;

impl Opener for SystemOpener {
    fn open(&self, target: &str) -> io::Result<()> {
        info!(target, "opening externally");
        #[cfg(target_os = "macos")]
        Command::new("open").arg(target).spawn()?;
        #[cfg(target_os = "linux")]
        Command::new("xdg-open").arg(target).spawn()?;
        #[cfg(target_os = "windows")]
        Command::new("cmd").args(["/c", "start", "", target]).spawn()?;
        Ok(())
    }
}

/// `override_cmd`, then `$VISUAL`, then `$EDITOR`, then `vi`.
pub fn editor_command(override_cmd: Option<&str>) -> String {
    override_cmd
        .map(str::to_string)
        .or_else(|| env::var("VISUAL").ok())
        .or_else(|| env::var("EDITOR").ok())
        .filter(|cmd| !cmd.trim().is_empty())
        .unwrap_or_else(|| "vi".to_string())
}

/// Build `editor [args..] +line path`. The editor string may carry its own
/// arguments (`code --wait`).
pub fn editor_invocation(editor: &str, path: &Path, line: usize) -> Option<Command> {
    let mut parts = editor.split_whitespace();
    let program = parts.next()?;
    let mut command = Command::new(program);
    command.args(parts).arg(format!("+{}", line.max(1))).arg(path);
    Some(command)
}

/// Run the editor in the foreground and wait for it to exit. The caller is
/// responsible for giving up the terminal first.
pub fn run_editor(editor: &str, path: &Path, line: usize) -> io::Result<ExitStatus> {
    let mut command = editor_invocation(editor, path, line)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty editor command"))?;
    info!(editor, path = %path.display(), line, "launching editor");
    command.status()
}
