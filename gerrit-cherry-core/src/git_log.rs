//! History source backed by the `git` executable.
//!
//! Runs `git log` in medium format and parses the stream as it arrives.
//! Commit headers look like `commit <hash> (decorations)` and message lines
//! are indented by four spaces; everything else is metadata.

use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Child, ChildStdout, Command, Stdio};
use std::thread::{self, JoinHandle};

use tracing::debug;

use crate::error::{CherryError, Result};
use crate::record::CommitRecord;
use crate::refs::RefRules;
use crate::source::CommitSource;

const GIT_COMMAND: &str = "git";
const COMMIT_HEADER: &str = "commit ";
const MESSAGE_INDENT: &str = "    ";

/// Runs `git` in a repository and reads its history
#[derive(Debug, Clone, Default)]
pub struct GitLogSource {
    /// Repository path (None = current directory)
    repo_path: Option<PathBuf>,
    ref_rules: RefRules,
    first_parent: bool,
}

impl GitLogSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repo_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.repo_path = Some(path.into());
        self
    }

    pub fn with_ref_rules(mut self, rules: RefRules) -> Self {
        self.ref_rules = rules;
        self
    }

    pub fn first_parent(mut self, enabled: bool) -> Self {
        self.first_parent = enabled;
        self
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(GIT_COMMAND);
        if let Some(ref path) = self.repo_path {
            cmd.arg("-C").arg(path);
        }
        cmd
    }

    /// Rules from `git config`, used when none were set explicitly
    pub fn config_ref_rules(&self) -> Option<RefRules> {
        let output = self
            .command()
            .args(["config", "--get", crate::refs::REF_RULES_CONFIG_KEY])
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }
        RefRules::parse(&String::from_utf8_lossy(&output.stdout))
    }

    /// Fail early when the path is not inside a git repository
    pub fn check_repository(&self) -> Result<()> {
        let output = self
            .command()
            .args(["rev-parse", "--git-dir"])
            .output()
            .map_err(spawn_error)?;
        if output.status.success() {
            Ok(())
        } else {
            Err(CherryError::GitCommand {
                exit_code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }

    /// Resolve a name to a full commit hash with `git rev-parse`
    pub fn resolve(&self, reference: &str) -> Result<String> {
        let mut tried = Vec::new();

        for candidate in self.ref_rules.candidates(reference) {
            let output = self
                .command()
                .args(["rev-parse", "--verify", "--quiet"])
                .arg(format!("{candidate}^{{commit}}"))
                .stderr(Stdio::null())
                .output()
                .map_err(spawn_error)?;

            if output.status.success() {
                let hash = String::from_utf8_lossy(&output.stdout).trim().to_string();
                debug!("Resolved '{}' via {} to {}", reference, candidate, hash);
                return Ok(hash);
            }
            tried.push(candidate);
        }

        Err(CherryError::UnresolvedReference {
            reference: reference.to_string(),
            tried,
        })
    }
}

impl CommitSource for GitLogSource {
    fn commits(&self, reference: &str) -> Result<Vec<CommitRecord>> {
        self.check_repository()?;
        let hash = self.resolve(reference)?;

        let mut cmd = self.command();
        // Pin the output shape against the user's log.* config
        cmd.args([
            "log",
            "--decorate=short",
            "--pretty=medium",
            "--no-abbrev-commit",
            "--no-notes",
            "--no-color",
        ]);
        if self.first_parent {
            cmd.arg("--first-parent");
        }
        cmd.arg(&hash)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = LogProcess::spawn(cmd)?;
        let records = parse_log(BufReader::new(child.stdout()?))?;
        child.finish()?;

        debug!("Read {} commits from git log {}", records.len(), reference);
        Ok(records)
    }
}

/// Owns the `git log` child; reaps it on drop if not finished.
///
/// Stderr is drained on its own thread so a chatty git cannot fill the
/// pipe while stdout is still being read.
struct LogProcess {
    child: Option<Child>,
    stderr: Option<JoinHandle<String>>,
}

impl LogProcess {
    fn spawn(mut cmd: Command) -> Result<Self> {
        let mut child = cmd.spawn().map_err(spawn_error)?;
        let stderr = child.stderr.take().map(|mut pipe| {
            thread::spawn(move || {
                let mut text = String::new();
                let _ = pipe.read_to_string(&mut text);
                text
            })
        });
        Ok(LogProcess {
            child: Some(child),
            stderr,
        })
    }

    fn stdout(&mut self) -> Result<ChildStdout> {
        self.child
            .as_mut()
            .and_then(|child| child.stdout.take())
            .ok_or_else(|| CherryError::Io(std::io::Error::other("git log stdout not captured")))
    }

    /// Wait for exit and turn a failure status into an error
    fn finish(mut self) -> Result<()> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        let status = child.wait()?;
        let stderr = self
            .stderr
            .take()
            .and_then(|reader| reader.join().ok())
            .unwrap_or_default();

        if status.success() {
            Ok(())
        } else {
            Err(CherryError::GitCommand {
                exit_code: status.code().unwrap_or(-1),
                stderr: stderr.trim().to_string(),
            })
        }
    }
}

impl Drop for LogProcess {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        if let Some(reader) = self.stderr.take() {
            let _ = reader.join();
        }
    }
}

fn spawn_error(e: std::io::Error) -> CherryError {
    if e.kind() == std::io::ErrorKind::NotFound {
        CherryError::GitNotFound
    } else {
        CherryError::Io(e)
    }
}

/// Parse medium-format `git log` output into records, newest first
pub fn parse_log<R: BufRead>(mut reader: R) -> Result<Vec<CommitRecord>> {
    let mut records = Vec::new();
    let mut current: Option<(String, String)> = None;
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\n', '\r']);

        if let Some(rest) = line.strip_prefix(COMMIT_HEADER) {
            if let Some((hash, message)) = current.take() {
                records.push(CommitRecord::from_message(hash, &message));
            }
            let hash = rest.split_whitespace().next().unwrap_or_default();
            current = Some((hash.to_string(), String::new()));
        } else if let Some(text) = line.strip_prefix(MESSAGE_INDENT) {
            match current.as_mut() {
                Some((_, message)) => {
                    message.push_str(text);
                    message.push('\n');
                }
                None => {
                    return Err(CherryError::MalformedLog {
                        line: line.to_string(),
                    })
                }
            }
        } else if current.is_none() && !line.trim().is_empty() {
            return Err(CherryError::MalformedLog {
                line: line.to_string(),
            });
        }
    }

    if let Some((hash, message)) = current {
        records.push(CommitRecord::from_message(hash, &message));
    }
    Ok(records)
}
