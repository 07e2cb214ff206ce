//! External command execution utilities.
//!
//! Provides the `exec!` macro and the functions behind it for running the
//! site generator and `git`, plus [`CommandError`], which keeps the exit
//! code of a failed tool so it can become the process exit code.

use crate::log;
use regex::Regex;
use std::{
    ffi::OsString,
    io,
    path::Path,
    process::{Command, ExitStatus, Output, Stdio},
    sync::OnceLock,
};
use thiserror::Error;

// ============================================================================
// Macros
// ============================================================================

/// Run an external command with arguments, capturing its output.
///
/// On success the captured output is logged under the command name.
///
/// # Examples
/// ```ignore
/// // Without working directory
/// exec!(["git"]; "status", "-s")?;
///
/// // With working directory
/// exec!(root; ["git"]; "commit", "-m", message)?;
///
/// // With custom filter
/// exec!(filter=&SILENT_FILTER; root; ["git"]; "add", "--all")?;
/// ```
#[macro_export]
macro_rules! exec {
    (filter=$filter:expr; $root:expr; $cmd:expr; $($arg:expr),* $(,)?) => {{
        $crate::utils::exec::exec(
            Some($root),
            &$crate::utils::exec::to_cmd_vec($cmd),
            &$crate::utils::exec::filter_args(&[$($crate::utils::exec::to_os($arg)),*]),
            $filter,
        )
    }};
    ($cmd:expr; $($arg:expr),* $(,)?) => {{
        $crate::utils::exec::exec(
            None,
            &$crate::utils::exec::to_cmd_vec($cmd),
            &$crate::utils::exec::filter_args(&[$($crate::utils::exec::to_os($arg)),*]),
            &$crate::utils::exec::EMPTY_FILTER,
        )
    }};
    ($root:expr; $cmd:expr; $($arg:expr),* $(,)?) => {{
        $crate::utils::exec::exec(
            Some($root),
            &$crate::utils::exec::to_cmd_vec($cmd),
            &$crate::utils::exec::filter_args(&[$($crate::utils::exec::to_os($arg)),*]),
            &$crate::utils::exec::EMPTY_FILTER,
        )
    }};
}

// ============================================================================
// Errors
// ============================================================================

/// Failure to run an external command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("No command configured")]
    Empty,

    #[error("Failed to execute `{name}`")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },

    /// The command ran and exited unsuccessfully. `detail` is the tool's
    /// own output, unmodified apart from surrounding whitespace.
    #[error("{}", describe_failure(.name, .code, .signal, .detail))]
    Failed {
        name: String,
        code: Option<i32>,
        /// Signal that killed the command, unix only.
        signal: Option<i32>,
        detail: String,
    },
}

impl CommandError {
    /// Exit code to report for the failed command.
    ///
    /// A command killed by a signal reports `128 + signal`, as shells do.
    pub const fn code(&self) -> Option<i32> {
        match self {
            Self::Failed { code: Some(code), .. } => Some(*code),
            Self::Failed { signal: Some(signal), .. } => Some(128 + *signal),
            _ => None,
        }
    }

    /// Failure for a command that finished with `status`.
    pub fn failed(name: impl Into<String>, status: ExitStatus, detail: String) -> Self {
        Self::Failed {
            name: name.into(),
            code: status.code(),
            signal: terminating_signal(status),
            detail,
        }
    }

    fn from_output(name: &str, output: &Output) -> Self {
        Self::failed(name, output.status, format_detail(output))
    }
}

#[cfg(unix)]
fn terminating_signal(status: ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn terminating_signal(_status: ExitStatus) -> Option<i32> {
    None
}

fn describe_failure(name: &str, code: &Option<i32>, signal: &Option<i32>, detail: &str) -> String {
    let mut msg = match (code, signal) {
        (Some(code), _) => format!("Command `{name}` failed with exit code {code}"),
        (None, Some(signal)) => format!("Command `{name}` was terminated by signal {signal}"),
        (None, None) => format!("Command `{name}` was terminated by a signal"),
    };
    if !detail.is_empty() {
        msg.push('\n');
        msg.push_str(detail);
    }
    msg
}

// ============================================================================
// Argument Conversion
// ============================================================================

/// Convert to `OsString`.
#[inline]
pub fn to_os<S: Into<OsString>>(s: S) -> OsString {
    s.into()
}

/// Trait for converting to command vector.
pub trait ToCmd {
    fn to_cmd(self) -> Vec<OsString>;
}

impl<const N: usize> ToCmd for [&str; N] {
    #[inline]
    fn to_cmd(self) -> Vec<OsString> {
        self.into_iter().map(OsString::from).collect()
    }
}

impl ToCmd for &[String] {
    #[inline]
    fn to_cmd(self) -> Vec<OsString> {
        self.iter().map(OsString::from).collect()
    }
}

impl ToCmd for &Vec<String> {
    #[inline]
    fn to_cmd(self) -> Vec<OsString> {
        self.iter().map(OsString::from).collect()
    }
}

/// Convert command to `Vec<OsString>`.
#[inline]
pub fn to_cmd_vec<C: ToCmd>(cmd: C) -> Vec<OsString> {
    cmd.to_cmd()
}

/// Filter out empty args.
#[inline]
pub fn filter_args(args: &[OsString]) -> Vec<OsString> {
    args.iter().filter(|a| !a.is_empty()).cloned().collect()
}

// ============================================================================
// Command Execution
// ============================================================================

/// Execute a command, capture its output and fail on non-zero exit.
///
/// # Errors
/// Returns error if the command cannot be started or exits unsuccessfully.
pub fn exec(
    root: Option<&Path>,
    cmd: &[OsString],
    args: &[OsString],
    filter: &'static FilterRule,
) -> Result<Output, CommandError> {
    let (name, output) = capture(root, cmd, args)?;

    if !output.status.success() {
        return Err(CommandError::from_output(&name, &output));
    }

    filter.log(&name, String::from_utf8_lossy(&output.stdout).trim());
    filter.log(&name, String::from_utf8_lossy(&output.stderr).trim());
    Ok(output)
}

/// Execute a command and capture its output without judging the exit status.
///
/// Returns the command name alongside the output. Used for probes whose
/// exit code carries an answer rather than a failure.
pub fn capture(
    root: Option<&Path>,
    cmd: &[OsString],
    args: &[OsString],
) -> Result<(String, Output), CommandError> {
    let (name, mut command) = prepare(root, cmd, args)?;

    let output = command
        .stdin(Stdio::null())
        .output()
        .map_err(|source| CommandError::Spawn {
            name: name.clone(),
            source,
        })?;

    Ok((name, output))
}

/// Run a command in the foreground with inherited stdio and wait for it.
///
/// The child's output goes straight to the terminal, so a failure carries
/// no captured detail.
pub fn run_foreground(
    root: Option<&Path>,
    cmd: &[OsString],
    args: &[OsString],
) -> Result<(), CommandError> {
    let (name, mut command) = prepare(root, cmd, args)?;

    let status = command
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|source| CommandError::Spawn {
            name: name.clone(),
            source,
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(CommandError::failed(name, status, String::new()))
    }
}

/// Prepare a Command from components.
fn prepare(
    root: Option<&Path>,
    cmd: &[OsString],
    args: &[OsString],
) -> Result<(String, Command), CommandError> {
    let (program, rest) = cmd.split_first().ok_or(CommandError::Empty)?;
    let name = program.to_string_lossy().into_owned();

    let mut command = Command::new(program);
    command.args(rest).args(args);

    if let Some(dir) = root {
        command.current_dir(dir);
    }

    Ok((name, command))
}

// ============================================================================
// Output Filtering
// ============================================================================

fn strip_ansi(s: &str) -> std::borrow::Cow<'_, str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*m").expect("valid ANSI regex"));
    re.replace_all(s, "")
}

/// Filter rule for skipping specific prefixes in logged command output.
pub struct FilterRule {
    /// Prefixes to match at the start of output lines.
    pub skip_prefixes: &'static [&'static str],
}

impl FilterRule {
    /// Create a new filter rule with the given prefixes.
    pub const fn new(skip_prefixes: &'static [&'static str]) -> Self {
        Self { skip_prefixes }
    }

    /// Returns true if the line is empty or starts with any skip prefix.
    fn should_skip(&self, line: &str) -> bool {
        line.is_empty() || self.skip_prefixes.iter().any(|p| line.starts_with(p))
    }

    /// Log the lines of `output` that survive the filter.
    fn log(&self, name: &str, output: &str) {
        let lines: Vec<_> = output
            .lines()
            .filter(|line| !self.should_skip(strip_ansi(line).trim()))
            .collect();

        if !lines.is_empty() {
            log!(name; "{}", lines.join("\n"));
        }
    }
}

/// Empty filter (no skipping).
pub const EMPTY_FILTER: FilterRule = FilterRule::new(&[]);

/// Silent filter: skip all output.
pub const SILENT_FILTER: FilterRule = FilterRule::new(&[""]);

/// Join the trimmed stderr and stdout of a failed command.
fn format_detail(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);

    [stderr.trim(), stdout.trim()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// Tests
// ============================================================================
