use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

const MAX_STDERR_BYTES: usize = 4096;

/// A tool invocation: resolved program plus leading arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl ToolCommand {
    /// Split a shell-style command line and resolve its program.
    ///
    /// Relative programs containing a path separator resolve against `cwd`;
    /// bare names are looked up on `PATH`.
    pub fn parse(raw: &str, cwd: &Path) -> Result<Self> {
        let mut words =
            shell_words::split(raw).with_context(|| format!("parse command line {raw:?}"))?;
        if words.is_empty() {
            return Err(anyhow!("command line is empty"));
        }
        let program = words.remove(0);
        let program = which::which_in(&program, std::env::var_os("PATH"), cwd)
            .with_context(|| format!("resolve program {program:?}"))?;
        Ok(Self {
            program,
            args: words,
        })
    }

    pub fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command
    }
}

/// Run `command` to completion; a non-zero exit is an error carrying stderr.
pub fn run_checked(mut command: Command, label: &str) -> Result<()> {
    tracing::debug!(?command, "spawning {label}");
    let output = command
        .output()
        .with_context(|| format!("spawn {label}"))?;
    if output.status.success() {
        return Ok(());
    }
    let stderr = truncate_bytes(&output.stderr, MAX_STDERR_BYTES);
    Err(anyhow!(
        "{label} failed with status {}: {}",
        exit_status_string(&output.status),
        stderr.trim()
    ))
}

pub fn exit_status_string(status: &ExitStatus) -> String {
    match status.code() {
        Some(code) => code.to_string(),
        None => "signal".to_string(),
    }
}

pub fn truncate_bytes(bytes: &[u8], max_bytes: usize) -> String {
    let text = String::from_utf8_lossy(bytes);
    truncate_string(&text, max_bytes)
}

pub fn truncate_string(text: &str, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text.to_string();
    }
    let mut truncated = String::new();
    for ch in text.chars() {
        if truncated.len() + ch.len_utf8() > max_bytes {
            break;
        }
        truncated.push(ch);
    }
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_string_respects_char_boundaries() {
        assert_eq!(truncate_string("héllo", 2), "h");
        assert_eq!(truncate_string("héllo", 3), "hé");
        assert_eq!(truncate_string("short", 64), "short");
    }

    #[test]
    fn parse_rejects_empty_command() {
        let err = ToolCommand::parse("  ", Path::new(".")).expect_err("empty");
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn parse_rejects_unbalanced_quotes() {
        let err = ToolCommand::parse("wpt 'manifest", Path::new(".")).expect_err("quotes");
        assert!(err.to_string().contains("parse command line"));
    }

    #[cfg(unix)]
    #[test]
    fn parse_resolves_program_on_path_and_keeps_args() {
        let Ok(sh) = which::which("sh") else {
            return;
        };
        let command = ToolCommand::parse("sh -c 'exit 0'", Path::new(".")).expect("parse");
        assert_eq!(command.program, sh);
        assert_eq!(command.args, vec!["-c", "exit 0"]);
        run_checked(command.command(), "sh").expect("exit 0");
    }

    #[cfg(unix)]
    #[test]
    fn run_checked_reports_status_and_stderr() {
        if which::which("sh").is_err() {
            return;
        }
        let command = ToolCommand::parse("sh -c 'echo boom >&2; exit 3'", Path::new("."))
            .expect("parse");
        let err = run_checked(command.command(), "fake tool").expect_err("exit 3");
        let message = err.to_string();
        assert!(message.contains("fake tool failed with status 3"), "{message}");
        assert!(message.contains("boom"), "{message}");
    }
}
